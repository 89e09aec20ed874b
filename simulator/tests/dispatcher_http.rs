//! Dispatcher reporting over real HTTP against a mock dispatcher

mod common;

use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{Value, json};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::test_state;
use simulator::{DispatcherReporter, HttpDispatchTransport, ReportOutcome, SimulatorError};

fn transport() -> HttpDispatchTransport {
    HttpDispatchTransport::new(Duration::from_secs(2)).unwrap()
}

#[tokio::test]
async fn test_completion_update_is_posted_to_command() {
    let dispatcher = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/command"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Status": "success", "Message": "updated"})))
        .expect(1)
        .mount(&dispatcher)
        .await;

    let reporter = DispatcherReporter::new(transport(), &dispatcher.uri(), test_state(42, 1, 1)).unwrap();
    let outcome = reporter.report(Some(Utc::now())).await.unwrap();
    assert_eq!(outcome, ReportOutcome::Sent { acknowledged: true });

    let requests = dispatcher.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let envelope: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(envelope["Command"], "UpdateItem");
    assert_eq!(envelope["Data"]["SID"], 42);
    assert_eq!(envelope["Data"]["MachineID"], "integration-machine");
    assert!(envelope["Data"]["DtCompleted"].is_string());
}

#[tokio::test]
async fn test_progress_with_nothing_completed_never_connects() {
    let dispatcher = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&dispatcher)
        .await;

    let reporter = DispatcherReporter::new(transport(), &dispatcher.uri(), test_state(42, 5, 5)).unwrap();
    assert!(matches!(reporter.report(None).await, Ok(ReportOutcome::Skipped(_))));
    assert!(dispatcher.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_server_error_is_protocol_error() {
    let dispatcher = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/command"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&dispatcher)
        .await;

    let reporter = DispatcherReporter::new(transport(), &dispatcher.uri(), test_state(42, 1, 1)).unwrap();
    let result = reporter.report(Some(Utc::now())).await;

    assert!(matches!(result, Err(SimulatorError::ProtocolError { .. })));
}

#[tokio::test]
async fn test_unreachable_dispatcher_is_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let reporter = DispatcherReporter::new(transport(), &format!("http://127.0.0.1:{port}"), test_state(42, 1, 1)).unwrap();
    let result = reporter.report(Some(Utc::now())).await;

    assert!(matches!(result, Err(SimulatorError::TransportError { .. })));
}

#[tokio::test]
async fn test_periodic_reports_until_cancelled() {
    let dispatcher = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/command"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Status": "Success", "Message": ""})))
        .mount(&dispatcher)
        .await;

    let state = test_state(42, 1, 100);
    let stop = Utc::now();
    state.record_generation(stop - ChronoDuration::seconds(5), stop).await;

    let reporter = DispatcherReporter::new(transport(), &dispatcher.uri(), state).unwrap();
    let cancel = CancellationToken::new();

    let canceller = {
        let cancel = cancel.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(350)).await;
            cancel.cancel();
        }
    };
    tokio::join!(reporter.run_periodic(Duration::from_millis(100), cancel.clone()), canceller);

    let requests = dispatcher.received_requests().await.unwrap();
    assert!(!requests.is_empty());
    for request in requests {
        let envelope: Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(envelope["Data"]["Availability"], "busy");
        assert!(envelope["Data"]["DtEstimate"].is_string());
    }
}
