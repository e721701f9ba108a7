//! Session storage errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}
