use thiserror::Error;

/// Rejections raised while turning user text into a request payload.
/// None of these ever reach the network.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("input is empty")]
    Empty,
    #[error("invalid numeric token `{token}`")]
    InvalidNumber { token: String },
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("batch input must be a JSON array of inputs")]
    NotASequence,
}
