// src/test_utils/mock_execution_server.rs
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use crate::protocol::{SubmissionBody, SubmissionResponse};

#[derive(Debug, Clone)]
pub enum MockReply {
    Json(SubmissionResponse),
    Status(StatusCode),
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub query: Option<String>,
    pub api_key: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<SubmissionBody>,
}

#[derive(Clone)]
struct MockServerState {
    submits: Arc<Mutex<VecDeque<MockReply>>>,
    polls: Arc<Mutex<VecDeque<MockReply>>>,
    languages_up: bool,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

fn reply(next: Option<MockReply>) -> Result<Json<SubmissionResponse>, StatusCode> {
    match next {
        Some(MockReply::Json(resp)) => Ok(Json(resp)),
        Some(MockReply::Status(code)) => Err(code),
        None => {
            log::error!("Mock execution server ran out of responses!");
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

async fn submit_handler(
    State(state): State<MockServerState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    Json(body): Json<SubmissionBody>,
) -> Result<Json<SubmissionResponse>, StatusCode> {
    log::debug!("Mock execution server received submission: {:?}", body);
    state.requests.lock().unwrap().push(RecordedRequest {
        method: "POST",
        path: "/submissions".to_string(),
        query,
        api_key: header(&headers, "x-rapidapi-key"),
        content_type: header(&headers, "content-type"),
        body: Some(body),
    });
    let next = state.submits.lock().unwrap().pop_front();
    reply(next)
}

async fn poll_handler(
    State(state): State<MockServerState>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> Result<Json<SubmissionResponse>, StatusCode> {
    state.requests.lock().unwrap().push(RecordedRequest {
        method: "GET",
        path: format!("/submissions/{}", token),
        query: None,
        api_key: header(&headers, "x-rapidapi-key"),
        content_type: header(&headers, "content-type"),
        body: None,
    });
    let next = state.polls.lock().unwrap().pop_front();
    reply(next)
}

async fn languages_handler(State(state): State<MockServerState>) -> StatusCode {
    if state.languages_up {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

pub struct MockExecutionServer {
    addr: SocketAddr,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    pub recorded_requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockExecutionServer {
    pub async fn start(submits: Vec<MockReply>, polls: Vec<MockReply>) -> Self {
        Self::start_with(submits, polls, true).await
    }

    pub async fn start_with(submits: Vec<MockReply>, polls: Vec<MockReply>, languages_up: bool) -> Self {
        let state = MockServerState {
            submits: Arc::new(Mutex::new(VecDeque::from(submits))),
            polls: Arc::new(Mutex::new(VecDeque::from(polls))),
            languages_up,
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let recorded_requests = state.requests.clone();

        let app = Router::new()
            .route("/submissions", post(submit_handler))
            .route("/submissions/{token}", get(poll_handler))
            .route("/languages", get(languages_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap_or_else(|e| {
            panic!("Failed to bind mock server to 127.0.0.1:0. Error: {}", e);
        });
        let addr = listener.local_addr().unwrap();
        log::info!("Mock execution server listening on {}", addr);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap_or_else(|e| {
                    log::error!("Mock execution server error: {}", e);
                });
        });

        MockExecutionServer {
            addr,
            shutdown_tx,
            recorded_requests,
        }
    }

    pub fn address(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.recorded_requests.lock().unwrap().clone()
    }

    pub async fn shutdown(self) {
        if self.shutdown_tx.send(()).is_err() {
            log::warn!("Mock execution server shutdown signal already sent or receiver dropped.");
        }
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    }
}
