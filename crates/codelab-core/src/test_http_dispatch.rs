//! Dispatcher scenarios over real HTTP against the mock execution server

use axum::http::StatusCode;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use crate::dispatcher::{ExecutionDispatcher, PollPolicy};
use crate::endpoint::EndpointDescriptor;
use crate::language::Language;
use crate::protocol::{encode_text, ExecutionRequest, SubmissionResponse, WireStatus};
use crate::report::Outcome;
use crate::test_utils::{MockExecutionServer, MockReply};
use crate::transport::HttpTransport;

fn finished(id: u32, description: &str, stdout: &str) -> MockReply {
    MockReply::Json(SubmissionResponse {
        status: Some(WireStatus {
            id,
            description: Some(description.to_string()),
        }),
        stdout: Some(encode_text(stdout)),
        ..Default::default()
    })
}

fn pending(id: u32) -> MockReply {
    MockReply::Json(SubmissionResponse {
        status: Some(WireStatus {
            id,
            description: Some("Processing".to_string()),
        }),
        ..Default::default()
    })
}

fn token(value: &str) -> MockReply {
    MockReply::Json(SubmissionResponse {
        token: Some(value.to_string()),
        ..Default::default()
    })
}

fn primary(url: String) -> EndpointDescriptor {
    let mut auth = BTreeMap::new();
    auth.insert("X-RapidAPI-Key".to_string(), "demo".to_string());
    EndpointDescriptor::primary(url, auth)
}

fn dispatcher(endpoints: Vec<EndpointDescriptor>, max_attempts: u32) -> ExecutionDispatcher {
    let transport = HttpTransport::new().with_timeout(Duration::from_secs(5));
    ExecutionDispatcher::new(endpoints, Arc::new(transport)).with_poll_policy(PollPolicy {
        max_attempts,
        interval: Duration::from_millis(10),
    })
}

#[tokio::test]
async fn test_synchronous_result_over_http() {
    let server = MockExecutionServer::start(vec![finished(3, "Accepted", "Hello, World!\n")], vec![]).await;

    let request = ExecutionRequest::new(Language::Java, 62, "public class Main {}");
    let result = dispatcher(vec![primary(server.address())], 10)
        .dispatch(&request)
        .await;

    assert_eq!(result.outcome, Outcome::Succeeded);
    assert!(result.report.contains("✅ Execution Accepted:"));
    assert!(result.report.contains("Hello, World!"));

    let requests = server.get_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query.as_deref(), Some("wait=true"));
    assert_eq!(requests[0].api_key.as_deref(), Some("demo"));
    assert_eq!(requests[0].content_type.as_deref(), Some("application/json"));
    let body = requests[0].body.clone().unwrap();
    assert_eq!(body.language_id, 62);
    assert_eq!(body.source_code, encode_text("public class Main {}"));

    server.shutdown().await;
}

#[tokio::test]
async fn test_http_500_falls_back_and_polls_alternate() {
    let failing = MockExecutionServer::start(vec![MockReply::Status(StatusCode::INTERNAL_SERVER_ERROR)], vec![]).await;
    let alternate = MockExecutionServer::start(
        vec![token("abc-123")],
        vec![pending(1), finished(3, "Accepted", "42\n")],
    )
    .await;

    let request = ExecutionRequest::new(Language::Cpp, 54, "int main() { return 0; }");
    let result = dispatcher(
        vec![
            primary(failing.address()),
            EndpointDescriptor::alternate(alternate.address()),
        ],
        10,
    )
    .dispatch(&request)
    .await;

    assert_eq!(result.outcome, Outcome::Succeeded);
    assert!(result.report.lines()[0].contains("HTTP 500"));
    assert!(result.report.lines()[1].starts_with("🔄 Trying alternative endpoint"));
    assert!(result.report.contains("42"));

    let alt_requests = alternate.get_requests();
    let polls: Vec<_> = alt_requests.iter().filter(|r| r.method == "GET").collect();
    assert_eq!(polls.len(), 2);
    assert!(polls.iter().all(|r| r.path == "/submissions/abc-123"));
    assert!(alt_requests.iter().all(|r| r.api_key.is_none()));

    failing.shutdown().await;
    alternate.shutdown().await;
}

#[tokio::test]
async fn test_poll_budget_over_http() {
    let server = MockExecutionServer::start(
        vec![token("slow")],
        vec![pending(1), pending(2), pending(2), pending(2)],
    )
    .await;

    let request = ExecutionRequest::new(Language::Mysql, 82, "SELECT 1;");
    let result = dispatcher(vec![primary(server.address())], 3)
        .dispatch(&request)
        .await;

    assert_eq!(result.outcome, Outcome::TimedOut);
    let polls = server
        .get_requests()
        .iter()
        .filter(|r| r.method == "GET")
        .count();
    assert_eq!(polls, 3);

    server.shutdown().await;
}

#[tokio::test]
async fn test_unreachable_endpoints_are_exhausted() {
    // Bind and drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let request = ExecutionRequest::new(Language::Java, 62, "class Broken {");
    let result = dispatcher(vec![primary(dead.clone()), EndpointDescriptor::alternate(dead)], 10)
        .dispatch(&request)
        .await;

    assert_eq!(result.outcome, Outcome::Exhausted);
    assert!(result.report.contains("Mismatched braces: 1 open, 0 close"));
    assert!(result.report.contains("Missing main method"));
}

#[tokio::test]
async fn test_probe_over_http() {
    let down = MockExecutionServer::start_with(vec![], vec![], false).await;
    let up = MockExecutionServer::start(vec![], vec![]).await;

    let dispatcher = dispatcher(
        vec![primary(down.address()), EndpointDescriptor::alternate(up.address())],
        1,
    );
    let reachable = dispatcher.probe().await.map(|e| e.url.clone());
    assert_eq!(reachable, Some(up.address()));

    down.shutdown().await;
    up.shutdown().await;
}
