use thiserror::Error;

#[derive(Debug, Error)]
pub enum StrideError {
    #[error("invalid sprint id '{0}': must be a single directory name")]
    InvalidSprintId(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StrideError>;
