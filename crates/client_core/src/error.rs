use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url `{url}`: {reason}")]
    InvalidServerUrl { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    HttpClient(#[source] reqwest::Error),
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("unreadable response from {endpoint} (status {status}): {source}")]
    InvalidResponse {
        endpoint: &'static str,
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}
