//! End-to-end tests against a mock engine: submit, poll to terminal,
//! relay logs, extract outputs.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wfrun::engine::types::ExecutionHandle;
use wfrun::engine::EngineClient;
use wfrun::error::Error;
use wfrun::observe::logs::LogRelay;
use wfrun::observe::{RetryPolicy, StatusPoller};
use wfrun::run::{run, RunConfig};
use wfrun::Phase;

fn client_for(server: &MockServer) -> EngineClient {
    EngineClient::new(
        server.uri(),
        Some("test-token".to_string()),
        Duration::from_secs(5),
        false,
    )
    .unwrap()
}

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        multiplier: 2.0,
    }
}

fn run_config(server: &MockServer) -> RunConfig {
    RunConfig {
        host: server.uri(),
        namespace: "ci".into(),
        template: "build-app".into(),
        kind: "WorkflowTemplate".into(),
        parameters: vec![("branch".into(), "main".into())],
        labels: vec![],
        names_of_interest: vec![],
        poll_interval: Duration::from_millis(10),
        max_wait: Duration::from_secs(5),
        tail_lines: 50,
        retry: fast_retry(),
    }
}

fn workflow_body(phase: &str, outputs: serde_json::Value) -> serde_json::Value {
    json!({
        "metadata": {"name": "build-app-x7", "namespace": "ci"},
        "status": {"phase": phase, "outputs": outputs}
    })
}

#[tokio::test]
async fn full_run_polls_to_success_and_extracts_outputs() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/workflows/ci/submit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {"name": "build-app-x7", "namespace": "ci"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    // First poll sees Running, every later poll sees Succeeded.
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows/ci/build-app-x7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(workflow_body("Running", json!({}))),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows/ci/build-app-x7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(workflow_body(
            "Succeeded",
            json!({"parameters": [
                {"name": "app_build_version", "value": "1.2.3"},
                {"name": "test_version", "value": "9"}
            ]}),
        )))
        .mount(&server)
        .await;

    // Overlapping tail windows across the two pulls.
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows/ci/build-app-x7/log"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a\nb\n"))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows/ci/build-app-x7/log"))
        .respond_with(ResponseTemplate::new(200).set_body_string("b\nc\n"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut lines = Vec::new();
    let result = run(&client, &run_config(&server), |line| {
        lines.push(line.to_string())
    })
    .await
    .unwrap();

    assert_eq!(result.phase, Phase::Succeeded);
    assert_eq!(result.handle.name, "build-app-x7");
    assert_eq!(
        result.url,
        format!("{}/workflows/ci/build-app-x7", server.uri())
    );
    assert_eq!(result.parameters["app_build_version"], "1.2.3");
    assert_eq!(result.parameters["test_version"], "9");
    assert_eq!(lines, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn names_of_interest_restrict_extraction() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/workflows/ci/submit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "metadata": {"name": "build-app-x7", "namespace": "ci"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows/ci/build-app-x7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(workflow_body(
            "Succeeded",
            json!({"parameters": [
                {"name": "app_build_version", "value": "1.2.3"},
                {"name": "test_version", "value": "9"}
            ]}),
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows/ci/build-app-x7/log"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut cfg = run_config(&server);
    cfg.names_of_interest = vec!["app_build_version".into()];
    let result = run(&client, &cfg, |_| {}).await.unwrap();

    assert_eq!(result.parameters.len(), 1);
    assert_eq!(result.parameters["app_build_version"], "1.2.3");
}

#[tokio::test]
async fn transient_status_failure_is_retried_to_terminal() {
    let server = MockServer::start().await;
    let handle = ExecutionHandle {
        name: "build-app-x7".into(),
        namespace: "ci".into(),
    };

    Mock::given(method("GET"))
        .and(path("/api/v1/workflows/ci/build-app-x7"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows/ci/build-app-x7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(workflow_body("Succeeded", json!({}))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows/ci/build-app-x7/log"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let poller = StatusPoller::with_retry(
        Duration::from_millis(10),
        Duration::from_secs(5),
        fast_retry(),
    );
    let mut relay = LogRelay::new(50);
    let status = poller
        .observe(&client, &handle, &mut relay, |_| {})
        .await
        .unwrap();

    assert_eq!(status.phase, Phase::Succeeded);
}

#[tokio::test]
async fn exhausted_retries_surface_transport_error() {
    let server = MockServer::start().await;
    let handle = ExecutionHandle {
        name: "build-app-x7".into(),
        namespace: "ci".into(),
    };

    Mock::given(method("GET"))
        .and(path("/api/v1/workflows/ci/build-app-x7"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let poller = StatusPoller::with_retry(
        Duration::from_millis(10),
        Duration::from_secs(5),
        fast_retry(),
    );
    let mut relay = LogRelay::new(50);
    let err = poller
        .observe(&client, &handle, &mut relay, |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn timeout_carries_last_observed_status() {
    let server = MockServer::start().await;
    let handle = ExecutionHandle {
        name: "build-app-x7".into(),
        namespace: "ci".into(),
    };

    Mock::given(method("GET"))
        .and(path("/api/v1/workflows/ci/build-app-x7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(workflow_body("Running", json!({}))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows/ci/build-app-x7/log"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let poller = StatusPoller::new(Duration::from_millis(10), Duration::from_millis(50));
    let mut relay = LogRelay::new(50);
    let err = poller
        .observe(&client, &handle, &mut relay, |_| {})
        .await
        .unwrap_err();

    match err {
        Error::Timeout { last, waited } => {
            assert_eq!(last.phase, Phase::Running);
            assert!(waited >= Duration::from_millis(50));
        }
        other => panic!("expected Timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn rejected_submission_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/workflows/ci/submit"))
        .respond_with(ResponseTemplate::new(400).set_body_string("template not found"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = run(&client, &run_config(&server), |_| {}).await.unwrap_err();

    match err {
        Error::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "template not found");
        }
        other => panic!("expected Rejected, got {:?}", other),
    }
}

#[tokio::test]
async fn denied_credentials_at_submission_are_transport_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/workflows/ci/submit"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = run(&client, &run_config(&server), |_| {}).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}

#[tokio::test]
async fn vanished_execution_is_not_retried() {
    let server = MockServer::start().await;
    let handle = ExecutionHandle {
        name: "gone".into(),
        namespace: "ci".into(),
    };

    Mock::given(method("GET"))
        .and(path("/api/v1/workflows/ci/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let poller = StatusPoller::with_retry(
        Duration::from_millis(10),
        Duration::from_secs(5),
        fast_retry(),
    );
    let mut relay = LogRelay::new(50);
    let err = poller
        .observe(&client, &handle, &mut relay, |_| {})
        .await
        .unwrap_err();

    match err {
        Error::NotFound { namespace, name } => {
            assert_eq!(namespace, "ci");
            assert_eq!(name, "gone");
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn failed_log_fetch_does_not_abort_observation() {
    let server = MockServer::start().await;
    let handle = ExecutionHandle {
        name: "build-app-x7".into(),
        namespace: "ci".into(),
    };

    Mock::given(method("GET"))
        .and(path("/api/v1/workflows/ci/build-app-x7"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(workflow_body("Succeeded", json!({}))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/workflows/ci/build-app-x7/log"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let poller = StatusPoller::new(Duration::from_millis(10), Duration::from_secs(5));
    let mut relay = LogRelay::new(50);
    let status = poller
        .observe(&client, &handle, &mut relay, |_| {})
        .await
        .unwrap();

    assert_eq!(status.phase, Phase::Succeeded);
}

#[tokio::test]
async fn validation_failure_happens_before_any_network_call() {
    let server = MockServer::start().await;

    // No mocks mounted: any request would 404 and the strict expect(0)
    // below would flag it.
    Mock::given(method("POST"))
        .and(path("/api/v1/workflows/ci/submit"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut cfg = run_config(&server);
    cfg.template = String::new();
    let err = run(&client, &cfg, |_| {}).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}
