use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphIndexError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("out of range: {0}")]
    OutOfRange(String),
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl GraphIndexError {
    pub fn invalid_argument<T: Into<String>>(msg: T) -> Self {
        GraphIndexError::InvalidArgument(msg.into())
    }

    pub fn out_of_range<T: Into<String>>(msg: T) -> Self {
        GraphIndexError::OutOfRange(msg.into())
    }

    pub fn schema_mismatch<T: Into<String>>(msg: T) -> Self {
        GraphIndexError::SchemaMismatch(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        GraphIndexError::Serialization(msg.into())
    }
}
