use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Value retrieval failed: {0}")]
    ValueRetrieval(#[from] std::io::Error),

    #[error("Bucket table pool exhausted: all {max_tables} tables are in use")]
    PoolExhausted { max_tables: usize },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Fast field not found: {0}")]
    FieldNotFound(String),

    #[error("Tantivy error: {0}")]
    Tantivy(#[from] tantivy::TantivyError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<Error> for tantivy::TantivyError {
    fn from(err: Error) -> Self {
        match err {
            Error::ValueRetrieval(e) => tantivy::TantivyError::from(e),
            Error::Tantivy(e) => e,
            Error::FieldNotFound(field) => tantivy::TantivyError::FieldNotFound(field),
            Error::InvalidRequest(msg) => tantivy::TantivyError::InvalidArgument(msg),
            other @ Error::PoolExhausted { .. } => {
                tantivy::TantivyError::InternalError(other.to_string())
            }
        }
    }
}
