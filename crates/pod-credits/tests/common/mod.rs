//! Common test utilities for integration tests.

use payment_flow::FlowConfig;
use podcore_client::PodcoreClient;
use session_store::SessionStore;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

/// Start a mock podcore server.
pub async fn mock_podcore_server() -> MockServer {
    MockServer::start().await
}

/// Create a podcore client configured for a mock server.
pub fn test_podcore_client(mock_server: &MockServer) -> Arc<PodcoreClient> {
    Arc::new(
        PodcoreClient::new(mock_server.uri(), "test-token", Duration::from_secs(5)).unwrap(),
    )
}

/// Open a session pre-populated with a logged-in user owing credits.
pub async fn logged_in_session(dir: &TempDir) -> Arc<SessionStore> {
    let session = SessionStore::open(dir.path().join("session.json"))
        .await
        .unwrap();
    session.set_auth_token("test-token").await.unwrap();
    session
        .set_user(
            serde_json::from_value(serde_json::json!({
                "id": 42,
                "user_name": "Asha",
                "user_phone": "+919900112233",
                "user_credit_limit": 100,
                "user_credit_used": 150
            }))
            .unwrap(),
        )
        .await
        .unwrap();
    session
}

/// Workflow timing tuned for wall-clock tests.
pub fn fast_flow_config() -> FlowConfig {
    FlowConfig {
        poll_interval: Duration::from_millis(20),
        poll_max_attempts: 6,
        refresh_interval: Duration::from_millis(50),
        settle_delay: Duration::from_millis(5),
    }
}

/// The standard user payload served by the mock backend.
pub fn user_records_body(credit_used: i64) -> serde_json::Value {
    serde_json::json!({
        "records": [{
            "id": 42,
            "user_name": "Asha",
            "user_phone": "+919900112233",
            "user_credit_limit": 100,
            "user_credit_used": credit_used
        }]
    })
}

pub fn payment_records_body(status: &str, url: Option<&str>) -> serde_json::Value {
    serde_json::json!({
        "records": [{
            "id": 9,
            "payment_amount": 75.0,
            "payment_vendor": "razorpay",
            "payment_status": status,
            "payment_url": url,
            "created_at": "2025-06-01T10:00:00Z"
        }]
    })
}
