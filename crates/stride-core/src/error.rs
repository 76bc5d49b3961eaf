use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrideError {
    #[error("unknown track: {0}")]
    UnknownTrack(String),

    #[error("track '{0}' defines no steps")]
    EmptyTrack(String),

    #[error("catalog file not found: {0}")]
    CatalogNotFound(String),

    #[error("duplicate step id '{step}' in track '{track}'")]
    DuplicateStep { track: String, step: String },

    #[error("remote store: {0}")]
    Remote(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StrideError>;
