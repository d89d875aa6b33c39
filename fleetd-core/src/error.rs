use thiserror::Error;

/// Error taxonomy shared by the core services.
///
/// Every failure is surfaced to the boundary layer as one of these variants;
/// nothing is retried internally and nothing is swallowed.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unknown token: {0}")]
    UnknownToken(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backing store is unreachable. The caller may retry with backoff.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<fleetd_model::ModelError> for CoreError {
    fn from(err: fleetd_model::ModelError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
