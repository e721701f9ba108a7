//! Workflow configuration.

use serde::Deserialize;
use std::time::Duration;

/// Timing knobs for the reconciliation workflow.
///
/// The poll budget (attempts x interval) is a heuristic settlement window,
/// not a contract with the payment vendor; tune it per deployment.
#[derive(Debug, Clone, Deserialize)]
pub struct FlowConfig {
    /// Interval between status poll ticks.
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// Maximum poll attempts before the poller gives up.
    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: u32,

    /// Interval for the background user/history refresh.
    #[serde(default = "default_refresh_interval", with = "humantime_serde")]
    pub refresh_interval: Duration,

    /// Grace period after a redirect return before the first refresh,
    /// giving the backend time to record the settlement.
    #[serde(default = "default_settle_delay", with = "humantime_serde")]
    pub settle_delay: Duration,
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_poll_max_attempts() -> u32 {
    6
}

fn default_refresh_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_settle_delay() -> Duration {
    Duration::from_secs(2)
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            poll_max_attempts: default_poll_max_attempts(),
            refresh_interval: default_refresh_interval(),
            settle_delay: default_settle_delay(),
        }
    }
}
