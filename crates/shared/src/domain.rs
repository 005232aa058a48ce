use std::fmt;

use serde::{Deserialize, Serialize};

/// An independent prediction cycle. Each flow owns its own input area,
/// loading indicator, and result region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Single,
    Batch,
}

impl Flow {
    pub fn as_str(self) -> &'static str {
        match self {
            Flow::Single => "single",
            Flow::Batch => "batch",
        }
    }

    /// Message used when a failure carries no text of its own.
    pub fn failure_label(self) -> &'static str {
        match self {
            Flow::Single => "Prediction failed",
            Flow::Batch => "Batch prediction failed",
        }
    }
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}
