//! Workflow error types.

use podcore_client::PodcoreError;
use session_store::SessionError;
use thiserror::Error;

/// Errors surfaced by the payment reconciliation workflow.
///
/// `PaymentStatusCheckFailed` and `UserRefreshFailed` are transient: the
/// workflow logs and retries (or falls back to cached data) instead of
/// propagating them past the flow boundary.
#[derive(Error, Debug)]
pub enum FlowError {
    /// No token or user in the session; caller should send the user to login.
    #[error("Not logged in")]
    AuthMissing,

    /// The backend rejected the payment session or returned no redirect URL.
    #[error("Payment creation failed: {0}")]
    PaymentCreationFailed(String),

    /// A single status poll failed; retried on the next tick.
    #[error("Payment status check failed: {0}")]
    PaymentStatusCheckFailed(#[from] PodcoreError),

    /// User refresh failed; the cached record stays in place.
    #[error("User refresh failed: {0}")]
    UserRefreshFailed(PodcoreError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}
