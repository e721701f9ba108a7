//! End-to-end reconciliation tests against a mock podcore backend.

mod common;

use common::*;
use payment_flow::{CreditsFlow, FlowError, FlowEvent};
use podcore_client::PaymentVendor;
use session_store::PendingPayment;
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

async fn wait_for<F>(
    events: &mut tokio::sync::mpsc::UnboundedReceiver<FlowEvent>,
    pred: F,
) -> FlowEvent
where
    F: Fn(&FlowEvent) -> bool,
{
    timeout(Duration::from_secs(5), async {
        loop {
            let event = events.recv().await.expect("event channel closed");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

#[tokio::test]
async fn test_return_from_redirect_settles_end_to_end() {
    let server = mock_podcore_server().await;
    let dir = TempDir::new().unwrap();
    let session = logged_in_session(&dir).await;

    // The user was redirected away in a previous run.
    session
        .begin_pending_payment(PendingPayment::new(9, "https://pay.example.com/9"))
        .await
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/users/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_records_body(0)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/payments/"))
        .and(query_param("user_id", "42"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(payment_records_body("success", None)),
        )
        .mount(&server)
        .await;

    // First two status polls still see "pending", then settlement lands.
    Mock::given(method("GET"))
        .and(path("/payments/"))
        .and(query_param("record_id", "9"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(payment_records_body("pending", None)),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/payments/"))
        .and(query_param("record_id", "9"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(payment_records_body("success", None)),
        )
        .mount(&server)
        .await;

    let client = test_podcore_client(&server);
    let (flow, mut events) = CreditsFlow::new(client, session.clone(), fast_flow_config());
    flow.mount().await.unwrap();

    wait_for(&mut events, |e| matches!(e, FlowEvent::Notice(_))).await;
    assert!(session.pending_payment().await.is_none());

    let settled = wait_for(&mut events, |e| {
        matches!(e, FlowEvent::PaymentSettled { .. })
    })
    .await;
    assert!(matches!(settled, FlowEvent::PaymentSettled { payment_id: 9 }));

    // The settlement refresh picked up the cleared balance.
    assert_eq!(session.user().await.unwrap().user_credit_used, Some(0.0));

    flow.shutdown().await;
}

#[tokio::test]
async fn test_start_payment_end_to_end() {
    let server = mock_podcore_server().await;
    let dir = TempDir::new().unwrap();
    let session = logged_in_session(&dir).await;

    Mock::given(method("POST"))
        .and(path("/payments/"))
        .and(query_param("payment_vendor", "razorpay"))
        .and(query_param("payment_amount", "75"))
        .and(query_param("credit_amount", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payment_records_body(
            "pending",
            Some("https://pay.example.com/session/9"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_podcore_client(&server);
    let (flow, _events) = CreditsFlow::new(client, session.clone(), fast_flow_config());

    let url = flow.start_payment(PaymentVendor::Razorpay).await.unwrap();
    assert_eq!(url, "https://pay.example.com/session/9");

    // The marker was persisted before the redirect was handed out, so a
    // second attempt resumes instead of creating another session.
    let again = flow.start_payment(PaymentVendor::Razorpay).await.unwrap();
    assert_eq!(again, url);
}

#[tokio::test]
async fn test_poller_leaves_record_pending_after_budget() {
    let server = mock_podcore_server().await;
    let dir = TempDir::new().unwrap();
    let session = logged_in_session(&dir).await;

    Mock::given(method("GET"))
        .and(path("/users/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_records_body(150)))
        .mount(&server)
        .await;

    // History reveals a pending payment from a previous session; it never
    // settles within the polling window.
    Mock::given(method("GET"))
        .and(path("/payments/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(payment_records_body("pending", None)),
        )
        .mount(&server)
        .await;

    let client = test_podcore_client(&server);
    let (flow, mut events) = CreditsFlow::new(client, session, fast_flow_config());
    flow.mount().await.unwrap();

    let exhausted = wait_for(&mut events, |e| {
        matches!(e, FlowEvent::PollExhausted { .. })
    })
    .await;
    assert!(matches!(
        exhausted,
        FlowEvent::PollExhausted { payment_id: 9 }
    ));

    flow.shutdown().await;
}

#[tokio::test]
async fn test_mount_without_session_is_auth_missing() {
    let server = mock_podcore_server().await;
    let dir = TempDir::new().unwrap();
    let session = session_store::SessionStore::open(dir.path().join("session.json"))
        .await
        .unwrap();

    let client = test_podcore_client(&server);
    let (flow, _events) = CreditsFlow::new(client, session, fast_flow_config());

    assert!(matches!(flow.mount().await, Err(FlowError::AuthMissing)));
}
