//! File-persisted session store.
//!
//! The localStorage analog of the original client: a single typed session
//! record that survives process restarts, so a payment started in a
//! previous run is still discoverable after the external redirect.

use crate::error::SessionError;
use crate::types::*;
use podcore_client::UserAccount;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Typed session store backed by a JSON file.
pub struct SessionStore {
    data: RwLock<SessionData>,
    storage_path: PathBuf,
}

impl SessionStore {
    /// Open the session store, loading existing state if available.
    ///
    /// A missing file yields a fresh session; unreadable contents are an
    /// error rather than silently discarded.
    pub async fn open(storage_path: PathBuf) -> Result<Arc<Self>, SessionError> {
        let data = match fs::read(&storage_path).await {
            Ok(bytes) => {
                let data: SessionData = serde_json::from_slice(&bytes)?;
                info!("Loaded session from {}", storage_path.display());
                data
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No session file at {}, starting fresh", storage_path.display());
                SessionData::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Arc::new(Self {
            data: RwLock::new(data),
            storage_path,
        }))
    }

    /// Whether a user record is present (the login check).
    pub async fn is_logged_in(&self) -> bool {
        self.data.read().await.user.is_some()
    }

    /// Cached user record.
    pub async fn user(&self) -> Option<UserAccount> {
        self.data.read().await.user.clone()
    }

    /// Replace the cached user record with a freshly fetched one.
    pub async fn set_user(&self, user: UserAccount) -> Result<(), SessionError> {
        let mut data = self.data.write().await;
        data.user = Some(user);
        self.persist(&data).await
    }

    pub async fn clear_user(&self) -> Result<(), SessionError> {
        let mut data = self.data.write().await;
        data.user = None;
        self.persist(&data).await
    }

    pub async fn auth_token(&self) -> Option<String> {
        self.data.read().await.auth_token.clone()
    }

    pub async fn set_auth_token(&self, token: impl Into<String>) -> Result<(), SessionError> {
        let mut data = self.data.write().await;
        data.auth_token = Some(token.into());
        self.persist(&data).await
    }

    /// Peek at the pending payment without consuming it.
    pub async fn pending_payment(&self) -> Option<PendingPayment> {
        self.data.read().await.pending_payment.clone()
    }

    /// Record a payment redirect that is about to happen.
    pub async fn begin_pending_payment(
        &self,
        pending: PendingPayment,
    ) -> Result<(), SessionError> {
        let mut data = self.data.write().await;
        if let Some(existing) = &data.pending_payment {
            warn!(
                "Replacing pending payment {} with {}",
                existing.payment_id, pending.payment_id
            );
        }
        data.pending_payment = Some(pending);
        self.persist(&data).await
    }

    /// Consume the pending payment marker.
    ///
    /// Returns the marker at most once; subsequent calls see `None` until a
    /// new redirect is recorded.
    pub async fn take_pending_payment(&self) -> Result<Option<PendingPayment>, SessionError> {
        let mut data = self.data.write().await;
        let taken = data.pending_payment.take();
        if taken.is_some() {
            self.persist(&data).await?;
        }
        Ok(taken)
    }

    pub async fn last_location(&self) -> Option<String> {
        self.data.read().await.last_location.clone()
    }

    pub async fn set_last_location(&self, name: impl Into<String>) -> Result<(), SessionError> {
        let mut data = self.data.write().await;
        data.last_location = Some(name.into());
        self.persist(&data).await
    }

    pub async fn location_id(&self) -> Option<i64> {
        self.data.read().await.location_id
    }

    pub async fn set_location(
        &self,
        location_id: i64,
        location_name: impl Into<String>,
    ) -> Result<(), SessionError> {
        let mut data = self.data.write().await;
        data.location_id = Some(location_id);
        data.location_name = Some(location_name.into());
        self.persist(&data).await
    }

    pub async fn location_name(&self) -> Option<String> {
        self.data.read().await.location_name.clone()
    }

    pub async fn pod_name(&self) -> Option<String> {
        self.data.read().await.pod_name.clone()
    }

    pub async fn set_pod_name(&self, pod_name: impl Into<String>) -> Result<(), SessionError> {
        let mut data = self.data.write().await;
        data.pod_name = Some(pod_name.into());
        self.persist(&data).await
    }

    pub async fn clear_pod_name(&self) -> Result<(), SessionError> {
        let mut data = self.data.write().await;
        data.pod_name = None;
        self.persist(&data).await
    }

    pub async fn old_passcode(&self) -> Option<String> {
        self.data.read().await.old_passcode.clone()
    }

    pub async fn set_old_passcode(&self, passcode: impl Into<String>) -> Result<(), SessionError> {
        let mut data = self.data.write().await;
        data.old_passcode = Some(passcode.into());
        self.persist(&data).await
    }

    /// Drop everything, including the persisted file contents.
    pub async fn clear(&self) -> Result<(), SessionError> {
        let mut data = self.data.write().await;
        *data = SessionData::default();
        info!("Session cleared");
        self.persist(&data).await
    }

    async fn persist(&self, data: &SessionData) -> Result<(), SessionError> {
        if let Some(parent) = self.storage_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(data)?;
        fs::write(&self.storage_path, bytes).await?;
        debug!("Session persisted to {}", self.storage_path.display());
        Ok(())
    }
}
