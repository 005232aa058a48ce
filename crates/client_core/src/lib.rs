use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::protocol::{
    BatchPredictRequest, BatchPredictResponse, ExampleResponse, HealthResponse, ModelInfoResponse,
    PredictRequest, PredictResponse,
};
use tracing::debug;
use url::Url;

pub mod controller;
pub mod error;
pub mod host;
pub mod input;
pub mod render;

pub use controller::{ControllerEvent, RequestController};
pub use error::ClientError;
pub use host::{HostUpdate, RecordingViewHost, ViewHost};

const MODEL_INFO_PATH: &str = "/model/info";
const PREDICT_PATH: &str = "/predict";
const PREDICT_BATCH_PATH: &str = "/predict/batch";
const EXAMPLE_PATH: &str = "/example";
const HEALTH_PATH: &str = "/health";

/// The prediction service's HTTP contract.
#[async_trait]
pub trait PredictionApi: Send + Sync {
    async fn model_info(&self) -> Result<ModelInfoResponse, ClientError>;
    async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, ClientError>;
    async fn predict_batch(
        &self,
        request: &BatchPredictRequest,
    ) -> Result<BatchPredictResponse, ClientError>;
    async fn example(&self) -> Result<ExampleResponse, ClientError>;
    async fn health(&self) -> Result<HealthResponse, ClientError>;
}

pub struct HttpPredictionApi {
    http: Client,
    api_base: String,
}

impl HttpPredictionApi {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(server_url, None)
    }

    pub fn with_timeout(server_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ClientError::HttpClient)?;
        Ok(Self {
            http,
            api_base: api_base_url(server_url)?,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base)
    }

    async fn get<T: DeserializeOwned>(&self, path: &'static str) -> Result<T, ClientError> {
        let res = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: path,
                source,
            })?;
        decode_body(path, res).await
    }

    async fn post<B, T>(&self, path: &'static str, body: &B) -> Result<T, ClientError>
    where
        B: serde::Serialize + Sync,
        T: DeserializeOwned,
    {
        let res = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: path,
                source,
            })?;
        decode_body(path, res).await
    }
}

#[async_trait]
impl PredictionApi for HttpPredictionApi {
    async fn model_info(&self) -> Result<ModelInfoResponse, ClientError> {
        self.get(MODEL_INFO_PATH).await
    }

    async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse, ClientError> {
        self.post(PREDICT_PATH, request).await
    }

    async fn predict_batch(
        &self,
        request: &BatchPredictRequest,
    ) -> Result<BatchPredictResponse, ClientError> {
        self.post(PREDICT_BATCH_PATH, request).await
    }

    async fn example(&self) -> Result<ExampleResponse, ClientError> {
        self.get(EXAMPLE_PATH).await
    }

    async fn health(&self) -> Result<HealthResponse, ClientError> {
        self.get(HEALTH_PATH).await
    }
}

/// `http://host:port` (optionally with a path prefix) -> `http://host:port/api`.
pub fn api_base_url(server_url: &str) -> Result<String, ClientError> {
    let trimmed = server_url.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|err| ClientError::InvalidServerUrl {
        url: server_url.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ClientError::InvalidServerUrl {
            url: server_url.to_string(),
            reason: format!("unsupported scheme `{}`", parsed.scheme()),
        });
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ClientError::InvalidServerUrl {
            url: server_url.to_string(),
            reason: "query strings and fragments are not allowed".to_string(),
        });
    }
    Ok(format!("{trimmed}/api"))
}

// Error statuses still carry `{ success: false, error }` bodies, so the
// status code is only kept for diagnostics.
async fn decode_body<T: DeserializeOwned>(
    endpoint: &'static str,
    res: Response,
) -> Result<T, ClientError> {
    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| ClientError::Transport { endpoint, source })?;
    debug!(endpoint, status = status.as_u16(), bytes = body.len(), "response received");
    serde_json::from_str(&body).map_err(|source| ClientError::InvalidResponse {
        endpoint,
        status: status.as_u16(),
        source,
    })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
