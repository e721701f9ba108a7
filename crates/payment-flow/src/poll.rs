//! Cancellable bounded polling.
//!
//! Generic "create remote job, poll for completion" helper: fixed interval,
//! fixed attempt budget, cancellation via a watch channel. Every tick
//! consumes one attempt, whether the check succeeded, missed, or failed.

use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::debug;

/// Poll timing parameters.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

/// Terminal state of a polling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The success predicate matched.
    Resolved(T),
    /// The attempt budget ran out without a match.
    Exhausted,
    /// Cancelled before resolution.
    Cancelled,
}

/// Run `attempt` once per tick until it yields a value, the budget is
/// exhausted, or `cancel` flips to true. Cancellation wins over a tick that
/// is still waiting out its interval.
pub async fn poll_until<T, F, Fut>(
    config: PollConfig,
    mut cancel: watch::Receiver<bool>,
    mut attempt: F,
) -> PollOutcome<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for n in 1..=config.max_attempts {
        tokio::select! {
            _ = sleep(config.interval) => {}
            _ = wait_cancelled(&mut cancel) => return PollOutcome::Cancelled,
        }

        if let Some(value) = attempt(n).await {
            return PollOutcome::Resolved(value);
        }
        debug!("Poll attempt {}/{} unresolved", n, config.max_attempts);
    }

    PollOutcome::Exhausted
}

/// Resolve once the watch value is true. A dropped sender counts as
/// cancellation so orphaned pollers wind down.
pub(crate) async fn wait_cancelled(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow() {
            return;
        }
        if cancel.changed().await.is_err() {
            return;
        }
    }
}
