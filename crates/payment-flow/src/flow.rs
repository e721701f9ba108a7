//! The credits view workflow.
//!
//! Coordinates balance display, payment session creation, redirect-return
//! reconciliation, status polling and the background refresh loop against
//! the podcore backend. All timers run as cooperative tokio tasks owned by
//! [`CreditsFlow`]; `shutdown` cancels them and waits for exit, so no state
//! update can land after teardown.

use crate::backend::PodBackend;
use crate::balance::CreditSummary;
use crate::config::FlowConfig;
use crate::error::FlowError;
use crate::events::FlowEvent;
use crate::poll::{poll_until, wait_cancelled, PollConfig, PollOutcome};
use chrono::{DateTime, Utc};
use podcore_client::{CreatePayment, PaymentRecord, PaymentVendor};
use session_store::{PendingPayment, SessionStore};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Human-readable reference id sent with a payment creation request:
/// the user id followed by the timestamp as DDMMYYYYHHMMSS.
pub fn client_reference_id(user_id: i64, now: DateTime<Utc>) -> String {
    format!("{}{}", user_id, now.format("%d%m%Y%H%M%S"))
}

/// Payment reconciliation workflow for one mounted credits view.
pub struct CreditsFlow {
    backend: Arc<dyn PodBackend>,
    session: Arc<SessionStore>,
    config: FlowConfig,
    events: mpsc::UnboundedSender<FlowEvent>,
    cancel: watch::Sender<bool>,
    focus: Notify,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl CreditsFlow {
    /// Create a flow and the event receiver the view layer listens on.
    pub fn new(
        backend: Arc<dyn PodBackend>,
        session: Arc<SessionStore>,
        config: FlowConfig,
    ) -> (Arc<Self>, mpsc::UnboundedReceiver<FlowEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let (cancel, _) = watch::channel(false);

        let flow = Arc::new(Self {
            backend,
            session,
            config,
            events,
            cancel,
            focus: Notify::new(),
            tasks: Mutex::new(Vec::new()),
        });

        (flow, receiver)
    }

    /// Derived credit figures from the cached user record.
    pub async fn credit_summary(&self) -> Result<CreditSummary, FlowError> {
        let user = self.session.user().await.ok_or(FlowError::AuthMissing)?;
        Ok(CreditSummary::of(&user))
    }

    /// Activate the view: run return-reconciliation once, then keep the
    /// poller and the periodic refresh running until `shutdown`.
    pub async fn mount(self: &Arc<Self>) -> Result<(), FlowError> {
        if self.session.auth_token().await.is_none() || !self.session.is_logged_in().await {
            return Err(FlowError::AuthMissing);
        }

        let mut tasks = self.tasks.lock().await;
        tasks.push(tokio::spawn(self.clone().reconcile_and_poll()));
        tasks.push(tokio::spawn(self.clone().refresh_loop()));
        debug!("Credits flow mounted");
        Ok(())
    }

    /// Signal that the window regained focus; triggers an immediate refresh.
    pub fn notify_focus(&self) {
        self.focus.notify_one();
    }

    /// Tear the view down: cancel both loops and wait for them to exit.
    pub async fn shutdown(&self) {
        let _ = self.cancel.send(true);
        let mut tasks = self.tasks.lock().await;
        for handle in tasks.drain(..) {
            if let Err(e) = handle.await {
                debug!("Flow task ended abnormally: {}", e);
            }
        }
        debug!("Credits flow shut down");
    }

    /// Start (or resume) a payment for the outstanding balance.
    ///
    /// Returns the external payment-page URL. While a payment is pending its
    /// stored redirect is resumed and no second session is created.
    #[instrument(skip(self))]
    pub async fn start_payment(&self, vendor: PaymentVendor) -> Result<String, FlowError> {
        if self.session.auth_token().await.is_none() {
            return Err(FlowError::AuthMissing);
        }
        let user = self.session.user().await.ok_or(FlowError::AuthMissing)?;

        if let Some(pending) = self.session.pending_payment().await {
            info!("Resuming pending payment {}", pending.payment_id);
            self.emit(FlowEvent::RedirectRequested {
                url: pending.redirect_url.clone(),
            });
            return Ok(pending.redirect_url);
        }

        let summary = CreditSummary::of(&user);
        if !summary.can_pay() {
            return Err(FlowError::PaymentCreationFailed(
                "no outstanding balance to pay".into(),
            ));
        }

        let params = CreatePayment {
            client_reference_id: client_reference_id(user.id, Utc::now()),
            amount: summary.amount_payable,
            vendor,
            user_id: user.id,
            user_phone: user.user_phone.clone().unwrap_or_default(),
            credit_amount: summary.credits_owed(),
        };

        let record = match self.backend.create_payment(&params).await {
            Ok(record) => record,
            Err(e) => {
                warn!("Payment creation failed: {}", e);
                self.emit(FlowEvent::ErrorNotice(
                    "Could not start the payment. Please try again.".into(),
                ));
                return Err(FlowError::PaymentCreationFailed(e.to_string()));
            }
        };

        let Some(url) = record.payment_url.clone() else {
            warn!("Payment {} created without a redirect URL", record.id);
            self.emit(FlowEvent::ErrorNotice(
                "Could not start the payment. Please try again.".into(),
            ));
            return Err(FlowError::PaymentCreationFailed(
                "backend returned no redirect URL".into(),
            ));
        };

        // Persist the marker before navigating away; in-memory state does
        // not survive the external redirect.
        self.session
            .begin_pending_payment(PendingPayment::new(record.id, url.clone()))
            .await?;

        info!(
            "Created payment {} for {:.2} via {}",
            record.id, summary.amount_payable, vendor
        );
        self.emit(FlowEvent::RedirectRequested { url: url.clone() });
        Ok(url)
    }

    /// Runs once at mount: detect a return from the payment redirect,
    /// refresh, and poll whichever payment is still pending.
    async fn reconcile_and_poll(self: Arc<Self>) {
        let pending = match self.session.take_pending_payment().await {
            Ok(pending) => pending,
            Err(e) => {
                warn!("Could not read pending-payment marker: {}", e);
                None
            }
        };

        let mut cancel = self.cancel.subscribe();

        if let Some(pending) = &pending {
            info!("Detected return from payment {}", pending.payment_id);
            self.emit(FlowEvent::Notice(
                "Payment received, reconciliation in progress...".into(),
            ));

            // Give the backend a moment to record the settlement.
            tokio::select! {
                _ = sleep(self.config.settle_delay) => {}
                _ = wait_cancelled(&mut cancel) => return,
            }

            self.refresh_user().await;
        }

        let payments = self.refresh_payments().await;
        if self.is_cancelled() {
            return;
        }

        // Poll the payment we just returned from, or a pending record left
        // over from a previous session.
        let poll_target = match &pending {
            Some(pending) => Some(pending.payment_id),
            None => payments
                .as_ref()
                .and_then(|records| records.first())
                .filter(|record| record.payment_status.is_pending())
                .map(|record| record.id),
        };

        if let Some(payment_id) = poll_target {
            self.poll_payment(payment_id).await;
        }
    }

    /// Bounded status poll for one payment.
    async fn poll_payment(self: &Arc<Self>, payment_id: i64) {
        let config = PollConfig {
            interval: self.config.poll_interval,
            max_attempts: self.config.poll_max_attempts,
        };
        let backend = self.backend.clone();

        let outcome = poll_until(config, self.cancel.subscribe(), |attempt| {
            let backend = backend.clone();
            async move {
                match backend.get_payment(payment_id).await {
                    Ok(record) if record.payment_status.is_success() => Some(record),
                    Ok(record) => {
                        debug!(
                            "Payment {} still {} (attempt {})",
                            payment_id, record.payment_status, attempt
                        );
                        None
                    }
                    Err(e) => {
                        // Transient miss; the tick still consumed an attempt.
                        let e = FlowError::PaymentStatusCheckFailed(e);
                        warn!("{} (attempt {})", e, attempt);
                        None
                    }
                }
            }
        })
        .await;

        match outcome {
            PollOutcome::Resolved(record) => {
                if self.is_cancelled() {
                    return;
                }
                info!("Payment {} settled", record.id);
                if let Err(e) = self.session.take_pending_payment().await {
                    warn!("Could not clear pending-payment marker: {}", e);
                }
                self.refresh_user().await;
                self.refresh_payments().await;
                self.emit(FlowEvent::PaymentSettled {
                    payment_id: record.id,
                });
            }
            PollOutcome::Exhausted => {
                // The record stays pending and resumable by the user.
                debug!("Poll budget exhausted for payment {}", payment_id);
                self.emit(FlowEvent::PollExhausted { payment_id });
            }
            PollOutcome::Cancelled => {}
        }
    }

    /// Periodic user/history refresh, also woken by window focus.
    async fn refresh_loop(self: Arc<Self>) {
        let mut cancel = self.cancel.subscribe();

        loop {
            tokio::select! {
                _ = sleep(self.config.refresh_interval) => {}
                _ = self.focus.notified() => {
                    debug!("Focus regained, refreshing");
                }
                _ = wait_cancelled(&mut cancel) => break,
            }

            self.refresh_user().await;
            self.refresh_payments().await;
        }
    }

    /// Re-fetch the authoritative user record. Failure keeps the cache.
    async fn refresh_user(&self) -> bool {
        let Some(user) = self.session.user().await else {
            return false;
        };

        match self.backend.get_user(user.id).await {
            Ok(fresh) => {
                if self.is_cancelled() {
                    return false;
                }
                if let Err(e) = self.session.set_user(fresh.clone()).await {
                    warn!("Could not cache refreshed user: {}", e);
                }
                self.emit(FlowEvent::UserUpdated(fresh));
                true
            }
            Err(e) => {
                let e = FlowError::UserRefreshFailed(e);
                debug!("{}, keeping cached record", e);
                false
            }
        }
    }

    /// Re-fetch payment history. Failure keeps the previous view.
    async fn refresh_payments(&self) -> Option<Vec<PaymentRecord>> {
        let user = self.session.user().await?;

        match self.backend.list_payments(user.id).await {
            Ok(records) => {
                if self.is_cancelled() {
                    return None;
                }
                self.emit(FlowEvent::PaymentsUpdated(records.clone()));
                Some(records)
            }
            Err(e) => {
                debug!("Payment history refresh failed: {}", e);
                None
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    fn emit(&self, event: FlowEvent) {
        // A dropped receiver just means nobody is rendering anymore.
        let _ = self.events.send(event);
    }
}
