//! View models for the result, model-info, and input regions.

use serde_json::Value;
use shared::{
    domain::Flow,
    protocol::{BatchPredictResponse, ExampleResponse, ModelInfoResponse, PredictResponse},
};

pub const UNKNOWN: &str = "Unknown";
pub const ERROR_TITLE: &str = "Error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelInfoView {
    pub input_size: String,
    pub device: String,
    pub model_type: String,
    pub parameters: String,
    pub supported_input_types: Option<String>,
    pub batch_support: Option<String>,
}

impl ModelInfoView {
    pub fn from_response(response: &ModelInfoResponse) -> Self {
        let info = response.model_info.clone().unwrap_or_default();
        Self {
            input_size: display_field(info.input_size.as_ref()),
            device: display_field(info.device.as_ref()),
            model_type: display_field(info.model_type.as_ref()),
            parameters: info
                .parameters
                .as_ref()
                .filter(|value| is_present(value))
                .map(group_thousands)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            supported_input_types: response
                .supported_input_types
                .as_ref()
                .and_then(input_types_text),
            batch_support: response.batch_support.as_ref().and_then(batch_support_text),
        }
    }

    /// Label/value pairs in display order.
    pub fn lines(&self) -> Vec<(&'static str, &str)> {
        let mut lines = vec![
            ("Input Size", self.input_size.as_str()),
            ("Device", self.device.as_str()),
            ("Model Type", self.model_type.as_str()),
            ("Parameters", self.parameters.as_str()),
        ];
        if let Some(types) = &self.supported_input_types {
            lines.push(("Supported Inputs", types.as_str()));
        }
        if let Some(batch) = &self.batch_support {
            lines.push(("Batch Support", batch.as_str()));
        }
        lines
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionView {
    pub title: &'static str,
    pub batch_size: Option<String>,
    pub shape: String,
    pub payload_label: &'static str,
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub title: String,
    pub message: String,
}

impl ErrorView {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            title: ERROR_TITLE.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultView {
    Success(PredictionView),
    Error(ErrorView),
}

impl ResultView {
    pub fn is_error(&self) -> bool {
        matches!(self, ResultView::Error(_))
    }
}

/// Interprets a single-prediction body. `Err` carries the message for the
/// error view.
pub fn single_prediction_view(response: &PredictResponse) -> Result<PredictionView, String> {
    if !response.success {
        return Err(failure_message(Flow::Single, response.error.as_deref()));
    }
    let shape = response
        .shape
        .as_deref()
        .ok_or_else(|| missing_shape(Flow::Single))?;
    Ok(PredictionView {
        title: "Prediction Successful",
        batch_size: None,
        shape: format_shape(shape),
        payload_label: "Prediction",
        payload: pretty_json(response.prediction.as_ref().unwrap_or(&Value::Null)),
    })
}

pub fn batch_prediction_view(response: &BatchPredictResponse) -> Result<PredictionView, String> {
    if !response.success {
        return Err(failure_message(Flow::Batch, response.error.as_deref()));
    }
    let shape = response
        .shape
        .as_deref()
        .ok_or_else(|| missing_shape(Flow::Batch))?;
    Ok(PredictionView {
        title: "Batch Prediction Successful",
        batch_size: Some(
            response
                .batch_size
                .map(|size| size.to_string())
                .unwrap_or_else(|| UNKNOWN.to_string()),
        ),
        shape: format_shape(shape),
        payload_label: "Predictions",
        payload: pretty_json(response.predictions.as_ref().unwrap_or(&Value::Null)),
    })
}

/// Pretty-printed texts for the single and batch input areas. Both must be
/// present or neither area is filled.
pub fn example_input_texts(example: &ExampleResponse) -> Result<(String, String), String> {
    let single = &example.single_prediction.input;
    let batch = &example.batch_prediction.inputs;
    if single.is_null() {
        return Err("example is missing single_prediction.input".to_string());
    }
    if batch.is_null() {
        return Err("example is missing batch_prediction.inputs".to_string());
    }
    Ok((pretty_json(single), pretty_json(batch)))
}

pub fn failure_message(flow: Flow, server_error: Option<&str>) -> String {
    match server_error {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => flow.failure_label().to_string(),
    }
}

pub fn format_shape(shape: &[u64]) -> String {
    let dims = shape
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{dims}]")
}

pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Formats a count with `,` separators. Non-numeric values are shown as-is.
pub fn group_thousands(value: &Value) -> String {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                group_integer_digits(&int.to_string())
            } else if let Some(int) = number.as_u64() {
                group_integer_digits(&int.to_string())
            } else {
                let text = number.to_string();
                match text.split_once('.') {
                    Some((int_part, fraction)) => {
                        format!("{}.{fraction}", group_integer_digits(int_part))
                    }
                    None => text,
                }
            }
        }
        other => scalar_text(other),
    }
}

fn group_integer_digits(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}

fn missing_shape(flow: Flow) -> String {
    format!("{}: response is missing the output shape", flow.failure_label())
}

// Empty strings, zero, false, and null all read as "not reported".
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn input_types_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(types) => {
            let names: Vec<String> = types
                .iter()
                .filter(|value| is_present(value))
                .map(scalar_text)
                .collect();
            (!names.is_empty()).then(|| names.join(", "))
        }
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

fn batch_support_text(value: &Value) -> Option<String> {
    match value {
        Value::Bool(supported) => Some(if *supported { "yes" } else { "no" }.to_string()),
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

fn display_field(value: Option<&Value>) -> String {
    value
        .filter(|value| is_present(value))
        .map(scalar_text)
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
