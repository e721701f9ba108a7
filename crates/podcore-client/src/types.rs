//! Podcore API types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Generic record envelope returned by every podcore endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordsResponse<T> {
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
}

/// Authoritative user account record.
///
/// Credit fields arrive as numbers or numeric strings depending on the
/// backend version; anything unparseable is treated as absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub user_name: Option<String>,
    pub user_phone: Option<String>,
    pub user_email: Option<String>,
    pub user_address: Option<String>,
    pub user_type: Option<String>,
    pub user_flatno: Option<String>,
    pub user_dropcode: Option<String>,
    pub user_pickupcode: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub user_credit_limit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub user_credit_used: Option<f64>,
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

/// Supported payment vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentVendor {
    Razorpay,
    Paytm,
    Phonepe,
}

impl PaymentVendor {
    /// Wire name used in query parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentVendor::Razorpay => "razorpay",
            PaymentVendor::Paytm => "paytm",
            PaymentVendor::Phonepe => "phonepe",
        }
    }
}

impl std::fmt::Display for PaymentVendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentVendor::Razorpay => write!(f, "Razorpay"),
            PaymentVendor::Paytm => write!(f, "Paytm"),
            PaymentVendor::Phonepe => write!(f, "PhonePe"),
        }
    }
}

/// Settlement status of a payment record.
///
/// The backend reports free-form status strings; only `pending` and
/// `success` carry meaning for reconciliation, everything else is kept
/// verbatim as a terminal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PaymentStatus {
    Pending,
    Success,
    Other(String),
}

impl PaymentStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, PaymentStatus::Pending)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PaymentStatus::Success)
    }
}

impl From<String> for PaymentStatus {
    fn from(s: String) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "pending" => PaymentStatus::Pending,
            "success" => PaymentStatus::Success,
            _ => PaymentStatus::Other(s),
        }
    }
}

impl From<PaymentStatus> for String {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => "pending".into(),
            PaymentStatus::Success => "success".into(),
            PaymentStatus::Other(s) => s,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Success => write!(f, "success"),
            PaymentStatus::Other(s) => write!(f, "{}", s),
        }
    }
}

/// A payment session record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub payment_amount: Option<f64>,
    pub payment_vendor: Option<PaymentVendor>,
    pub payment_status: PaymentStatus,
    /// External payment-page URL; present on freshly created sessions.
    pub payment_url: Option<String>,
    pub client_reference_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Parameters for opening a new payment session.
#[derive(Debug, Clone)]
pub struct CreatePayment {
    pub client_reference_id: String,
    pub amount: f64,
    pub vendor: PaymentVendor,
    pub user_id: i64,
    pub user_phone: String,
    /// Credits to be granted once the payment settles.
    pub credit_amount: f64,
}

/// A locker reservation, as shown in history views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub id: i64,
    pub reservation_status: String,
    pub reservation_type: Option<String>,
    pub drop_code: Option<String>,
    pub pickup_code: Option<String>,
    pub package_description: Option<String>,
    pub pod_name: Option<String>,
    pub created_by_name: Option<String>,
    pub reservation_awbno: Option<String>,
    pub location_name: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A user enrolled at a location, as listed in the site-admin view.
///
/// `id` is the enrollment record; `user_id` points at the account itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationUser {
    pub id: i64,
    pub user_id: Option<i64>,
    pub user_name: Option<String>,
    pub user_phone: Option<String>,
    pub user_email: Option<String>,
    pub user_flatno: Option<String>,
    pub user_type: Option<String>,
}

/// Parameters for enrolling a new user.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub user_address: String,
    pub user_flatno: String,
}

/// A location the user has pods at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLocation {
    pub id: i64,
    pub location_name: Option<String>,
    pub location_address: Option<String>,
    pub location_pincode: Option<String>,
}

/// A pod (locker bank) record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PodRecord {
    pub id: i64,
    pub pod_name: String,
    pub pod_access_code: Option<String>,
    pub pod_numtotaldoors: Option<u32>,
    pub pod_status: Option<String>,
    pub location_id: Option<i64>,
}

/// A single door within a pod.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorRecord {
    pub door_number: u32,
    pub door_availability: Option<String>,
    pub door_status: Option<String>,
    pub door_access_code: Option<String>,
}

impl DoorRecord {
    /// A door that can take a new reservation.
    pub fn is_free(&self) -> bool {
        self.door_availability.as_deref() == Some("available")
            || self.door_status.as_deref() == Some("free")
    }
}
