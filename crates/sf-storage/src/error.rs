use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<StorageError> for sf_core::CoreError {
    fn from(err: StorageError) -> Self {
        sf_core::CoreError::PersistenceError(err.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
