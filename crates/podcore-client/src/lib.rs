//! Podcore REST client for the pod (parcel locker) platform.

mod client;
mod error;
mod types;

pub use client::PodcoreClient;
pub use error::PodcoreError;
pub use types::*;
