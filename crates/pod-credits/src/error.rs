//! Application error types.

use thiserror::Error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Podcore error: {0}")]
    Podcore(#[from] podcore_client::PodcoreError),

    #[error("Session error: {0}")]
    Session(#[from] session_store::SessionError),

    #[error("Flow error: {0}")]
    Flow(#[from] payment_flow::FlowError),
}

/// Result type alias for application errors.
pub type AppResult<T> = Result<T, AppError>;
