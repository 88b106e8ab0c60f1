use thiserror::Error;

#[derive(Error, Debug)]
pub enum WardenError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("malformed cursor: {0}")]
    MalformedCursor(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("wrong kind for deletion root: {0}")]
    WrongKind(String),

    #[error("upstream failure: {0}")]
    Upstream(String),

    #[error("schema parse failure: {0}")]
    SchemaParse(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, WardenError>;

impl From<serde_json::Error> for WardenError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for WardenError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}
