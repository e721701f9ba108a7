//! Pod credits reconciliation agent - main entry point.

mod config;
mod error;

use crate::config::Config;
use crate::error::AppResult;
use anyhow::Context;
use payment_flow::{CreditsFlow, FlowEvent};
use podcore_client::PodcoreClient;
use session_store::SessionStore;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_logging(&config.app.log_level);

    info!("Starting pod credits agent...");

    // Open the persisted session
    let session = SessionStore::open(config.session.storage_path.clone()).await?;

    let Some(token) = session.auth_token().await else {
        error!("No auth token in session - log in through the pod app first");
        return Err(payment_flow::FlowError::AuthMissing.into());
    };
    let Some(user) = session.user().await else {
        error!("No user record in session - log in through the pod app first");
        return Err(payment_flow::FlowError::AuthMissing.into());
    };

    // Initialize the backend client
    let client = Arc::new(
        PodcoreClient::new(&config.podcore.base_url, token, config.podcore.timeout)
            .context("Failed to create podcore client")?,
    );

    if client.health_check().await {
        info!("Podcore API healthy at {}", config.podcore.base_url);
    } else {
        warn!("Podcore health check failed - will retry on requests");
    }

    info!(
        "Session loaded for {} ({})",
        user.user_name.as_deref().unwrap_or("unknown"),
        user.user_phone.as_deref().unwrap_or("no phone")
    );

    let (flow, mut events) = CreditsFlow::new(client, session, config.flow.clone());

    let summary = flow.credit_summary().await?;
    info!(
        "Credits - available: {}, used: {}, total: {}",
        summary.available, summary.used, summary.total
    );

    if summary.can_pay() {
        info!(
            "Outstanding balance: {:.2} payable via {}",
            summary.amount_payable, config.app.vendor
        );
        if config.app.auto_pay {
            match flow.start_payment(config.app.vendor).await {
                Ok(url) => info!("Complete the payment in your browser: {}", url),
                Err(e) => error!("Could not start payment: {}", e),
            }
        }
    }

    flow.mount().await?;
    info!("Watching for payment settlement and balance changes...");

    // Main event loop
    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                log_event(&event);
            }
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    flow.shutdown().await;
    info!("Shutting down...");
    Ok(())
}

fn log_event(event: &FlowEvent) {
    match event {
        FlowEvent::Notice(text) => info!("{}", text),
        FlowEvent::ErrorNotice(text) => warn!("{}", text),
        FlowEvent::RedirectRequested { url } => {
            info!("Payment page ready: {}", url);
        }
        FlowEvent::UserUpdated(user) => {
            let summary = payment_flow::CreditSummary::of(user);
            info!(
                "Balance refreshed - available: {}, payable: {:.2}",
                summary.available, summary.amount_payable
            );
        }
        FlowEvent::PaymentsUpdated(records) => {
            info!("Payment history: {} records", records.len());
        }
        FlowEvent::PaymentSettled { payment_id } => {
            info!("Payment {} settled, credits updated", payment_id);
        }
        FlowEvent::PollExhausted { payment_id } => {
            warn!(
                "Payment {} still pending after polling - resume it from the app",
                payment_id
            );
        }
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
