//! Typed, file-persisted session state for the pod credits client.
//!
//! Replaces the original client's loose key/value pairs with one session
//! record whose pending-payment marker has an explicit lifecycle: written
//! before the external redirect, consumed exactly once on return.

mod error;
mod store;
mod types;

pub use error::SessionError;
pub use store::SessionStore;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use podcore_client::UserAccount;
    use tempfile::TempDir;

    fn test_user(id: i64) -> UserAccount {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "user_name": "Asha",
            "user_phone": "+919900112233",
            "user_credit_limit": 100,
            "user_credit_used": 150
        }))
        .unwrap()
    }

    async fn open_store(dir: &TempDir) -> std::sync::Arc<SessionStore> {
        SessionStore::open(dir.path().join("session.json")).await.unwrap()
    }

    #[tokio::test]
    async fn test_fresh_session_when_file_missing() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        assert!(!store.is_logged_in().await);
        assert!(store.user().await.is_none());
        assert!(store.pending_payment().await.is_none());
    }

    #[tokio::test]
    async fn test_user_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        store.set_user(test_user(42)).await.unwrap();
        assert!(store.is_logged_in().await);
        assert_eq!(store.user().await.unwrap().id, 42);

        store.clear_user().await.unwrap();
        assert!(!store.is_logged_in().await);
    }

    #[tokio::test]
    async fn test_pending_payment_consumed_exactly_once() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        store
            .begin_pending_payment(PendingPayment::new(9, "https://pay.example.com/9"))
            .await
            .unwrap();

        let first = store.take_pending_payment().await.unwrap();
        assert_eq!(first.unwrap().payment_id, 9);

        let second = store.take_pending_payment().await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_pending_payment_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");

        {
            let store = SessionStore::open(path.clone()).await.unwrap();
            store.set_auth_token("token-abc").await.unwrap();
            store
                .begin_pending_payment(PendingPayment::new(9, "https://pay.example.com/9"))
                .await
                .unwrap();
        }

        let reopened = SessionStore::open(path).await.unwrap();
        assert_eq!(reopened.auth_token().await.as_deref(), Some("token-abc"));

        let pending = reopened.pending_payment().await.unwrap();
        assert_eq!(pending.payment_id, 9);
        assert_eq!(pending.redirect_url, "https://pay.example.com/9");
    }

    #[tokio::test]
    async fn test_location_and_pod_keys() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        store.set_location(5, "HSR Layout").await.unwrap();
        store.set_last_location("HSR Layout").await.unwrap();
        store.set_pod_name("HSR-01").await.unwrap();
        store.set_old_passcode("1234").await.unwrap();

        assert_eq!(store.location_id().await, Some(5));
        assert_eq!(store.location_name().await.as_deref(), Some("HSR Layout"));
        assert_eq!(store.last_location().await.as_deref(), Some("HSR Layout"));
        assert_eq!(store.pod_name().await.as_deref(), Some("HSR-01"));
        assert_eq!(store.old_passcode().await.as_deref(), Some("1234"));

        store.clear_pod_name().await.unwrap();
        assert!(store.pod_name().await.is_none());
    }

    #[tokio::test]
    async fn test_clear_resets_everything() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir).await;

        store.set_user(test_user(42)).await.unwrap();
        store.set_auth_token("token").await.unwrap();
        store
            .begin_pending_payment(PendingPayment::new(9, "https://pay.example.com/9"))
            .await
            .unwrap();

        store.clear().await.unwrap();

        assert!(!store.is_logged_in().await);
        assert!(store.auth_token().await.is_none());
        assert!(store.pending_payment().await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not json").unwrap();

        let result = SessionStore::open(path).await;
        assert!(matches!(result, Err(SessionError::Serialization(_))));
    }
}
