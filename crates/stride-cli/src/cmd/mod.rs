pub mod assess;
pub mod complete;
pub mod reset;
pub mod show;
pub mod steps;
pub mod sync;
pub mod video;
