pub mod curriculum;
pub mod debounce;
pub mod error;
pub mod evaluate;
pub mod io;
pub mod paths;
pub mod progress;
pub mod reconcile;
pub mod session;
pub mod sync;
pub mod types;

pub use error::{Result, StrideError};
