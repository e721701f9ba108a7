//! Events emitted toward the view layer.

use podcore_client::{PaymentRecord, UserAccount};

/// Workflow notifications for the UI seam.
///
/// Notices are transient; none of them block further interaction.
#[derive(Debug, Clone)]
pub enum FlowEvent {
    /// Informational toast.
    Notice(String),
    /// Error toast; the view stays usable.
    ErrorNotice(String),
    /// The caller should open this external payment page.
    RedirectRequested { url: String },
    /// The cached user record was replaced.
    UserUpdated(UserAccount),
    /// Payment history refreshed, newest first.
    PaymentsUpdated(Vec<PaymentRecord>),
    /// A polled payment settled and credits were refreshed.
    PaymentSettled { payment_id: i64 },
    /// The poller gave up; the payment stays pending and resumable.
    PollExhausted { payment_id: i64 },
}
