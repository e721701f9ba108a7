//! Podcore HTTP client.

use crate::error::PodcoreError;
use crate::types::*;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Podcore REST API client.
///
/// The bearer token is stored using `SecretString` to prevent accidental
/// exposure in logs or debug output.
#[derive(Clone)]
pub struct PodcoreClient {
    client: Client,
    base_url: String,
    token: SecretString,
}

impl PodcoreClient {
    /// Create a new podcore client.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PodcoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            token: SecretString::new(token.into()),
        })
    }

    /// Reload the authoritative account record for a user.
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: i64) -> Result<UserAccount, PodcoreError> {
        let response = self
            .get("/users/")
            .query(&[("record_id", user_id.to_string())])
            .send()
            .await?;

        self.handle_response::<RecordsResponse<UserAccount>>(response)
            .await?
            .records
            .into_iter()
            .next()
            .ok_or(PodcoreError::NotFound)
    }

    /// Fetch a user's payment history, newest first.
    #[instrument(skip(self))]
    pub async fn list_payments(&self, user_id: i64) -> Result<Vec<PaymentRecord>, PodcoreError> {
        let response = self
            .get("/payments/")
            .query(&[("user_id", user_id.to_string())])
            .send()
            .await?;

        let mut records = self
            .handle_response::<RecordsResponse<PaymentRecord>>(response)
            .await?
            .records;

        // The backend returns records in insertion order; sort here.
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    /// Poll a single payment record by id.
    #[instrument(skip(self))]
    pub async fn get_payment(&self, payment_id: i64) -> Result<PaymentRecord, PodcoreError> {
        let response = self
            .get("/payments/")
            .query(&[("record_id", payment_id.to_string())])
            .send()
            .await?;

        self.handle_response::<RecordsResponse<PaymentRecord>>(response)
            .await?
            .records
            .into_iter()
            .next()
            .ok_or(PodcoreError::NotFound)
    }

    /// Open a new payment session.
    ///
    /// The returned record carries the external payment-page URL in
    /// `payment_url` when the session was created successfully.
    #[instrument(skip(self, params), fields(vendor = %params.vendor, amount = params.amount))]
    pub async fn create_payment(
        &self,
        params: &CreatePayment,
    ) -> Result<PaymentRecord, PodcoreError> {
        let response = self
            .client
            .post(format!("{}/payments/", self.base_url))
            .header("Authorization", format!("Bearer {}", self.token.expose_secret()))
            .query(&[
                ("client_reference_id", params.client_reference_id.clone()),
                ("payment_amount", params.amount.to_string()),
                ("payment_vendor", params.vendor.as_str().to_string()),
                ("user_id", params.user_id.to_string()),
                ("user_phone", params.user_phone.clone()),
                ("credit_amount", params.credit_amount.to_string()),
            ])
            .send()
            .await?;

        self.handle_response::<RecordsResponse<PaymentRecord>>(response)
            .await?
            .records
            .into_iter()
            .next()
            .ok_or(PodcoreError::NotFound)
    }

    /// Fetch reservation history for a location, optionally filtered by
    /// phone number (site admins see the whole location).
    #[instrument(skip(self))]
    pub async fn list_reservations(
        &self,
        location_id: i64,
        user_phone: Option<&str>,
    ) -> Result<Vec<ReservationRecord>, PodcoreError> {
        let mut request = self
            .get("/adhoc/reservations/")
            .query(&[("location_id", location_id.to_string())]);
        if let Some(phone) = user_phone {
            request = request.query(&[("user_phone", phone)]);
        }
        let response = request.send().await?;

        self.handle_response::<RecordsResponse<ReservationRecord>>(response)
            .await
            .map(|r| r.records)
    }

    /// List the users enrolled at a location. Only customer accounts are
    /// returned; operator and admin records are filtered out.
    #[instrument(skip(self))]
    pub async fn list_location_users(
        &self,
        location_id: i64,
    ) -> Result<Vec<LocationUser>, PodcoreError> {
        let response = self
            .get("/users/locations/")
            .query(&[("location_id", location_id.to_string())])
            .send()
            .await?;

        let records = self
            .handle_response::<RecordsResponse<LocationUser>>(response)
            .await?
            .records;

        Ok(records
            .into_iter()
            .filter(|user| matches!(user.user_type.as_deref(), Some("User") | Some("Customer")))
            .collect())
    }

    /// Enroll a new user at the caller's location.
    #[instrument(skip(self, params), fields(phone = %params.user_phone))]
    pub async fn register_user(&self, params: &RegisterUser) -> Result<UserAccount, PodcoreError> {
        let response = self
            .client
            .post(format!("{}/users/", self.base_url))
            .header("Authorization", format!("Bearer {}", self.token.expose_secret()))
            .query(&[
                ("user_name", params.user_name.as_str()),
                ("user_email", params.user_email.as_str()),
                ("user_phone", params.user_phone.as_str()),
                ("user_address", params.user_address.as_str()),
                ("user_flatno", params.user_flatno.as_str()),
            ])
            .send()
            .await?;

        self.handle_response::<RecordsResponse<UserAccount>>(response)
            .await?
            .records
            .into_iter()
            .next()
            .ok_or(PodcoreError::NotFound)
    }

    /// Remove a user record.
    #[instrument(skip(self))]
    pub async fn remove_user(&self, user_id: i64) -> Result<(), PodcoreError> {
        let response = self
            .client
            .delete(format!("{}/users/", self.base_url))
            .header("Authorization", format!("Bearer {}", self.token.expose_secret()))
            .query(&[("record_id", user_id.to_string())])
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Change the user's locker passcode.
    ///
    /// Callers keep the superseded pickup code around so doors reserved
    /// under it can still be opened.
    #[instrument(skip(self, new_passcode))]
    pub async fn change_passcode(
        &self,
        user_phone: &str,
        new_passcode: &str,
    ) -> Result<(), PodcoreError> {
        let response = self
            .client
            .post(format!("{}/adhoc/generate_user_code/", self.base_url))
            .header("Authorization", format!("Bearer {}", self.token.expose_secret()))
            .query(&[
                ("user_phone", user_phone),
                ("change_code", "False"),
                ("new_passcode", new_passcode),
            ])
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Whether the location has at least one free door for a new reservation.
    #[instrument(skip(self))]
    pub async fn has_free_door(&self, location_id: i64) -> Result<bool, PodcoreError> {
        let response = self
            .get("/doors/")
            .query(&[("location_id", location_id.to_string())])
            .send()
            .await?;

        let records = self
            .handle_response::<RecordsResponse<DoorRecord>>(response)
            .await?
            .records;

        Ok(records.iter().any(DoorRecord::is_free))
    }

    /// List the adhoc-mode pods at a location.
    #[instrument(skip(self))]
    pub async fn list_location_pods(
        &self,
        location_id: i64,
    ) -> Result<Vec<PodRecord>, PodcoreError> {
        let response = self
            .get("/pods/")
            .query(&[
                ("location_id", location_id.to_string()),
                ("pod_mode", "adhoc".to_string()),
            ])
            .send()
            .await?;

        self.handle_response::<RecordsResponse<PodRecord>>(response)
            .await
            .map(|r| r.records)
    }

    /// List the locations a user has access to.
    #[instrument(skip(self))]
    pub async fn list_user_locations(
        &self,
        user_id: i64,
    ) -> Result<Vec<UserLocation>, PodcoreError> {
        let response = self
            .get("/locations/")
            .query(&[("user_id", user_id.to_string())])
            .send()
            .await?;

        self.handle_response::<RecordsResponse<UserLocation>>(response)
            .await
            .map(|r| r.records)
    }

    /// Look up a pod by name.
    #[instrument(skip(self))]
    pub async fn get_pod(&self, pod_name: &str) -> Result<PodRecord, PodcoreError> {
        let response = self
            .get("/pods/")
            .query(&[("pod_name", pod_name.to_string())])
            .send()
            .await?;

        self.handle_response::<RecordsResponse<PodRecord>>(response)
            .await?
            .records
            .into_iter()
            .next()
            .ok_or(PodcoreError::NotFound)
    }

    /// List the doors of a pod with their availability and access codes.
    #[instrument(skip(self))]
    pub async fn list_pod_doors(&self, pod_id: i64) -> Result<Vec<DoorRecord>, PodcoreError> {
        let response = self
            .get("/doors/")
            .query(&[("pod_id", pod_id.to_string())])
            .send()
            .await?;

        self.handle_response::<RecordsResponse<DoorRecord>>(response)
            .await
            .map(|r| r.records)
    }

    /// Health check - returns true if the API is reachable.
    pub async fn health_check(&self) -> bool {
        self.client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .header("Authorization", format!("Bearer {}", self.token.expose_secret()))
    }

    /// Handle HTTP response, converting errors appropriately.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, PodcoreError> {
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            debug!("Response body: {}", log_snippet(&body));
            serde_json::from_str(&body).map_err(PodcoreError::from)
        } else {
            Err(self.extract_error(response).await)
        }
    }

    /// Extract error information from a failed response.
    async fn extract_error(&self, response: reqwest::Response) -> PodcoreError {
        let status = response.status();

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                warn!("Rate limit exceeded");
                PodcoreError::RateLimit
            }
            StatusCode::UNAUTHORIZED => {
                warn!("Authentication failed");
                PodcoreError::Unauthorized
            }
            _ => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".into());
                PodcoreError::Api {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }
}

/// Truncate a response body for logging without cutting inside a
/// multi-byte character.
pub(crate) fn log_snippet(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
