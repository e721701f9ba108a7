//! Payment reconciliation workflow for the pod credits view.
//!
//! Coordinates three concerns against the podcore payment API: computing
//! the amount owed from the cached user record, creating a payment session
//! and handing out the external redirect, and detecting the return from
//! that redirect followed by bounded settlement polling.
//!
//! ```text
//! cached user -> derived balance -> create session -> external redirect
//!      ^                                                    |
//!      +-- refresh <- bounded poll <- return detection <----+
//! ```

mod backend;
mod balance;
mod config;
mod error;
mod events;
mod flow;
mod poll;

pub use backend::PodBackend;
pub use balance::{amount_payable, balance_credits, CreditSummary, BALANCE_MARKUP};
pub use config::FlowConfig;
pub use error::FlowError;
pub use events::FlowEvent;
pub use flow::{client_reference_id, CreditsFlow};
pub use poll::{poll_until, PollConfig, PollOutcome};
