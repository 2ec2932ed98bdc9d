//! Contact store errors.

use thiserror::Error;

/// Errors produced by the contact store and its collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Phone number already submitted: {0}")]
    DuplicatePhone(String),

    #[error("Contact not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Storage(format!("JSON serialization error: {}", e))
    }
}
