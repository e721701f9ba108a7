//! Session state types.

use chrono::{DateTime, Utc};
use podcore_client::UserAccount;
use serde::{Deserialize, Serialize};

/// Schema version for migrations.
pub(crate) const DATA_VERSION: u32 = 1;

/// Marker for a payment the user was redirected away to complete.
///
/// Written immediately before handing out the redirect URL and consumed
/// exactly once when the return is detected. Holding the redirect URL here
/// lets an interrupted session resume the external payment page without
/// creating a second session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingPayment {
    pub payment_id: i64,
    pub redirect_url: String,
    pub started_at: DateTime<Utc>,
}

impl PendingPayment {
    pub fn new(payment_id: i64, redirect_url: impl Into<String>) -> Self {
        Self {
            payment_id,
            redirect_url: redirect_url.into(),
            started_at: Utc::now(),
        }
    }
}

/// Persistent session contents.
///
/// One record per session; everything the original client kept as loose
/// key/value pairs lives here as typed fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub version: u32,
    pub user: Option<UserAccount>,
    pub auth_token: Option<String>,
    pub pending_payment: Option<PendingPayment>,
    pub last_location: Option<String>,
    pub location_id: Option<i64>,
    pub location_name: Option<String>,
    pub pod_name: Option<String>,
    pub old_passcode: Option<String>,
}

impl Default for SessionData {
    fn default() -> Self {
        Self {
            version: DATA_VERSION,
            user: None,
            auth_token: None,
            pending_payment: None,
            last_location: None,
            location_id: None,
            location_name: None,
            pod_name: None,
            old_passcode: None,
        }
    }
}
