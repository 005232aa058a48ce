use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictRequest {
    pub input: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPredictRequest {
    pub inputs: Value,
}

/// Body of `POST /api/predict`, for both 2xx and error statuses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `POST /api/predict/batch`, for both 2xx and error statuses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchPredictResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Field values are kept as raw JSON: servers report them as numbers or
/// strings depending on how the model was loaded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_size: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

/// Capability fields are optional extras and never fail the decode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_info: Option<ModelInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_input_types: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_support: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleExample {
    pub input: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchExample {
    pub inputs: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExampleResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_size: Option<Value>,
    pub single_prediction: SingleExample,
    pub batch_prediction: BatchExample,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub service: String,
}
