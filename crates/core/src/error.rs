use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("unknown tracker type: {0}")]
    UnknownTrackerType(String),

    #[error("unknown import strategy: {0}")]
    UnknownStrategy(String),

    #[error("unknown validation mode: {0}")]
    UnknownValidationMode(String),
}
