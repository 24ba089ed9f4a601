use thiserror::Error;

use crate::storage::store::StorageAccessError;

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageAccessError),
    #[error("Internal service error: {0}")]
    InternalError(String),
}
