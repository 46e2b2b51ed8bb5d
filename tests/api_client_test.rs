//! Integration tests for the remote task client
//!
//! Every test runs the client against a mockito HTTP server. Retry delays
//! are kept at a few milliseconds so the exhausted-retry paths stay fast.

use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use taskprobe::domain::models::{Config, RATE_LIMITED_TASK_ID};
use taskprobe::{
    ApiError, Availability, Cancellation, PollError, PollSettings, RemoteTaskClient, Submission,
    TaskPoller, TaskStatus,
};

fn test_config(base_url: &str, max_retries: u32) -> Config {
    let mut config = Config::default();
    config.api.base_url = base_url.to_string();
    config.api.auth_token = Some("test-token".to_string());
    config.api.request_timeout_ms = 5_000;
    config.admin.base_url = base_url.to_string();
    config.retry.max_retries = max_retries;
    config.retry.retry_delay_ms = 5;
    config
}

fn client_for(server: &Server, max_retries: u32) -> RemoteTaskClient {
    RemoteTaskClient::new(&test_config(&server.url(), max_retries)).expect("Failed to create client")
}

#[tokio::test]
async fn test_submit_task_success() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/sessions")
        .match_header("authorization", "Bearer test-token")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({
            "prompt": "Fix the login bug",
            "snapshot_id": null
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({"session_id": "task-123", "url": "https://tasks.test/task-123"}).to_string())
        .create_async()
        .await;

    let client = client_for(&server, 3);
    let submission = client.submit_task("Fix the login bug").await.unwrap();

    mock.assert_async().await;
    match submission {
        Submission::Accepted(handle) => {
            assert_eq!(handle.task_id, "task-123");
            assert_eq!(handle.url.as_deref(), Some("https://tasks.test/task-123"));
        }
        Submission::RateLimited => panic!("Expected accepted submission"),
    }
}

#[tokio::test]
async fn test_submit_sends_description_unmodified() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/sessions")
        .match_body(Matcher::Json(json!({"prompt": "   ", "snapshot_id": "snap-1"})))
        .with_status(200)
        .with_body(json!({"session_id": "task-blank"}).to_string())
        .create_async()
        .await;

    let mut config = test_config(&server.url(), 0);
    config.api.snapshot_id = Some("snap-1".to_string());
    let client = RemoteTaskClient::new(&config).unwrap();

    let submission = client.submit_task("   ").await.unwrap();

    mock.assert_async().await;
    assert_eq!(submission.task_id(), "task-blank");
}

#[tokio::test]
async fn test_submit_rate_limited_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/sessions")
        .with_status(429)
        .with_body("Too Many Requests")
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, 3);
    let submission = client.submit_task("anything").await.unwrap();

    mock.assert_async().await;
    assert!(submission.is_rate_limited());
    assert_eq!(submission.task_id(), RATE_LIMITED_TASK_ID);
}

#[tokio::test]
async fn test_server_error_retried_until_budget_exhausted() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/sessions")
        .with_status(500)
        .with_body("Internal Server Error")
        .expect(4)
        .create_async()
        .await;

    let client = client_for(&server, 3);
    let err = client.submit_task("flaky").await.unwrap_err();

    mock.assert_async().await;
    match err {
        ApiError::Status { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "Internal Server Error");
        }
        other => panic!("Expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_each_call_gets_a_fresh_retry_budget() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/sessions/task-1")
        .with_status(503)
        .expect(6)
        .create_async()
        .await;

    let client = client_for(&server, 2);
    assert!(client.get_task_status("task-1").await.is_err());
    assert!(client.get_task_status("task-1").await.is_err());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/sessions")
        .with_status(400)
        .with_body(r#"{"error": "prompt too long"}"#)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, 3);
    let err = client.submit_task("x").await.unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_get_task_status_completed() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/sessions/task-42")
        .match_header("authorization", "Bearer test-token")
        .with_status(200)
        .with_body(json!({"status": "completed", "result": {"answer": 42}}).to_string())
        .create_async()
        .await;

    let client = client_for(&server, 0);
    let snapshot = client.get_task_status("task-42").await.unwrap();

    mock.assert_async().await;
    assert_eq!(snapshot.task_id, "task-42");
    assert_eq!(snapshot.status, TaskStatus::Completed);
    assert_eq!(snapshot.result, Some(json!({"answer": 42})));
}

#[tokio::test]
async fn test_get_task_status_unknown_status_string() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/v1/sessions/task-7")
        .with_status(200)
        .with_body(json!({"status": "blocked_on_user"}).to_string())
        .create_async()
        .await;

    let client = client_for(&server, 0);
    let snapshot = client.get_task_status("task-7").await.unwrap();

    assert_eq!(snapshot.status, TaskStatus::Other);
    assert!(!snapshot.status.is_terminal());
}

#[tokio::test]
async fn test_get_task_status_404_is_not_found() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/sessions/missing")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, 3);
    let snapshot = client.get_task_status("missing").await.unwrap();

    mock.assert_async().await;
    assert_eq!(snapshot.status, TaskStatus::NotFound);
    assert_eq!(snapshot.task_id, "missing");
}

#[tokio::test]
async fn test_task_id_is_sent_as_one_path_segment() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/sessions/a%2Fb%3Fc%23d")
        .with_status(200)
        .with_body(json!({"status": "processing"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, 0);
    let snapshot = client.get_task_status("a/b?c#d").await.unwrap();

    mock.assert_async().await;
    assert_eq!(snapshot.task_id, "a/b?c#d");
    assert_eq!(snapshot.status, TaskStatus::Processing);
}

#[tokio::test]
async fn test_poll_structured_failure_detail() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/v1/sessions/task-5")
        .with_status(200)
        .with_body(json!({"status": "failed", "error": {"message": "boom", "code": 7}}).to_string())
        .create_async()
        .await;

    let client = Arc::new(client_for(&server, 0));
    let poller = TaskPoller::new(client, PollSettings::new(Duration::from_millis(10), Duration::from_secs(5)));

    let err = poller.poll_until_terminal("task-5").await.unwrap_err();

    match err {
        PollError::TaskFailed { task_id, detail } => {
            assert_eq!(task_id, "task-5");
            assert!(detail.contains("boom"), "detail {detail}");
        }
        other => panic!("Expected TaskFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_poll_surfaces_exhausted_status_retries() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/sessions/task-6")
        .with_status(500)
        .with_body("Internal Server Error")
        .expect(3)
        .create_async()
        .await;

    let client = Arc::new(client_for(&server, 2));
    let poller = TaskPoller::new(client, PollSettings::new(Duration::from_millis(10), Duration::from_secs(5)));

    let err = poller.poll_until_terminal("task-6").await.unwrap_err();

    mock.assert_async().await;
    match err {
        PollError::Api(ApiError::Status { status, body }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "Internal Server Error");
        }
        other => panic!("Expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limited_id_never_reaches_network() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let delete_mock = server
        .mock("DELETE", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server, 3);
    let snapshot = client.get_task_status(RATE_LIMITED_TASK_ID).await.unwrap();
    let cancellation = client.cancel_task(RATE_LIMITED_TASK_ID).await.unwrap();

    mock.assert_async().await;
    delete_mock.assert_async().await;
    assert_eq!(snapshot.status, TaskStatus::Completed);
    assert!(snapshot.result.is_some());
    assert_eq!(cancellation, Cancellation::AlreadyGone);
}

#[tokio::test]
async fn test_cancel_task() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/v1/sessions/task-9")
        .with_status(200)
        .with_body("this body is ignored")
        .create_async()
        .await;

    let client = client_for(&server, 0);
    let outcome = client.cancel_task("task-9").await.unwrap();

    mock.assert_async().await;
    assert_eq!(outcome, Cancellation::Cancelled);
}

#[tokio::test]
async fn test_cancel_missing_task_is_already_gone() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/v1/sessions/gone")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, 3);
    let outcome = client.cancel_task("gone").await.unwrap();

    mock.assert_async().await;
    assert_eq!(outcome, Cancellation::AlreadyGone);
}

#[tokio::test]
async fn test_get_metrics_available() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/metrics")
        .with_status(200)
        .with_body(json!({"tasks_completed": 12}).to_string())
        .create_async()
        .await;

    let client = client_for(&server, 0);
    let metrics = client.get_metrics().await.unwrap();

    mock.assert_async().await;
    assert_eq!(metrics, Availability::Available(json!({"tasks_completed": 12})));
}

#[tokio::test]
async fn test_get_metrics_404_is_unavailable_without_retry() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/metrics")
        .with_status(404)
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server, 3);
    let metrics = client.get_metrics().await.unwrap();

    mock.assert_async().await;
    assert!(!metrics.is_available());
}

#[tokio::test]
async fn test_get_logs_uses_configured_endpoint() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/audit-logs")
        .with_status(200)
        .with_body("")
        .create_async()
        .await;

    let mut config = test_config(&server.url(), 0);
    config.observability.logs_endpoint = "/audit-logs".to_string();
    let client = RemoteTaskClient::new(&config).unwrap();
    let logs = client.get_logs().await.unwrap();

    mock.assert_async().await;
    assert_eq!(logs, Availability::Available(serde_json::Value::Null));
}

#[tokio::test]
async fn test_get_logs_server_error_propagates_after_retries() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/logs")
        .with_status(502)
        .expect(2)
        .create_async()
        .await;

    let client = client_for(&server, 1);
    let err = client.get_logs().await.unwrap_err();

    mock.assert_async().await;
    assert_eq!(err.status().map(|s| s.as_u16()), Some(502));
}

#[tokio::test]
async fn test_get_admin_status_uses_admin_base_url() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/v1/status")
        .with_status(200)
        .with_body(json!({"healthy": true}).to_string())
        .create_async()
        .await;

    let client = client_for(&server, 0);
    let status = client.get_admin_status().await.unwrap();

    mock.assert_async().await;
    assert_eq!(status.into_option(), Some(json!({"healthy": true})));
}

#[tokio::test]
async fn test_get_admin_status_unresolvable_host_is_unavailable() {
    let mut config = test_config("http://127.0.0.1:9", 0);
    config.admin.base_url = "http://admin.taskprobe.invalid".to_string();
    let client = RemoteTaskClient::new(&config).unwrap();

    let status = client.get_admin_status().await.unwrap();

    assert_eq!(status, Availability::Unavailable);
}
