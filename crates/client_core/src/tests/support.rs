//! Local stand-in for the prediction service.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::Value;
use tokio::{net::TcpListener, sync::Mutex};

pub(crate) type CannedResponse = (StatusCode, String);

pub(crate) fn ok_json(body: Value) -> CannedResponse {
    (StatusCode::OK, body.to_string())
}

pub(crate) fn status_json(status: StatusCode, body: Value) -> CannedResponse {
    (status, body.to_string())
}

fn not_found() -> CannedResponse {
    (StatusCode::NOT_FOUND, "<h1>Not Found</h1>".to_string())
}

#[derive(Clone)]
pub(crate) struct Canned {
    pub model_info: CannedResponse,
    pub predict: CannedResponse,
    pub predict_batch: CannedResponse,
    pub example: CannedResponse,
    pub health: CannedResponse,
}

impl Default for Canned {
    fn default() -> Self {
        Self {
            model_info: not_found(),
            predict: not_found(),
            predict_batch: not_found(),
            example: not_found(),
            health: not_found(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct RecordedRequest {
    pub path: &'static str,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone)]
struct ServiceState {
    canned: Arc<Canned>,
    received: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ServiceState {
    async fn record(&self, path: &'static str, headers: &HeaderMap, body: &str) {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        self.received.lock().await.push(RecordedRequest {
            path,
            content_type,
            body: serde_json::from_str(body).ok(),
        });
    }
}

pub(crate) struct MockService {
    pub url: String,
    received: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.received.lock().await.clone()
    }
}

fn respond((status, body): CannedResponse) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    (status, [(header::CONTENT_TYPE, "application/json")], body)
}

async fn model_info(
    State(state): State<ServiceState>,
    headers: HeaderMap,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    state.record("/api/model/info", &headers, "").await;
    respond(state.canned.model_info.clone())
}

async fn predict(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    state.record("/api/predict", &headers, &body).await;
    respond(state.canned.predict.clone())
}

async fn predict_batch(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    state.record("/api/predict/batch", &headers, &body).await;
    respond(state.canned.predict_batch.clone())
}

async fn example(
    State(state): State<ServiceState>,
    headers: HeaderMap,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    state.record("/api/example", &headers, "").await;
    respond(state.canned.example.clone())
}

async fn health(
    State(state): State<ServiceState>,
    headers: HeaderMap,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    state.record("/api/health", &headers, "").await;
    respond(state.canned.health.clone())
}

pub(crate) async fn spawn_service(canned: Canned) -> anyhow::Result<MockService> {
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = ServiceState {
        canned: Arc::new(canned),
        received: received.clone(),
    };
    let app = Router::new()
        .route("/api/model/info", get(model_info))
        .route("/api/predict", post(predict))
        .route("/api/predict/batch", post(predict_batch))
        .route("/api/example", get(example))
        .route("/api/health", get(health))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(MockService {
        url: format!("http://{addr}"),
        received,
    })
}

/// A server URL nothing is listening on.
pub(crate) async fn unreachable_url() -> anyhow::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}
