//! Prints controller regions to the terminal.

use std::{
    collections::{HashMap, HashSet},
    io::{self, Write},
    sync::{Mutex, MutexGuard},
};

use client_core::{
    render::{ModelInfoView, ResultView},
    ViewHost,
};
use shared::domain::Flow;

#[derive(Default)]
struct RegionState {
    loading: HashSet<Flow>,
    failed: HashSet<Flow>,
    inputs: HashMap<Flow, String>,
    model_info_shown: bool,
}

/// Results and model info go to stdout, loading chatter to stderr. Only the
/// latest state of each region is kept for read-back.
#[derive(Default)]
pub struct TerminalViewHost {
    state: Mutex<RegionState>,
}

impl TerminalViewHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RegionState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn input_text(&self, flow: Flow) -> Option<String> {
        self.state().inputs.get(&flow).cloned()
    }

    pub fn has_model_info(&self) -> bool {
        self.state().model_info_shown
    }

    pub fn result_failed(&self, flow: Flow) -> bool {
        self.state().failed.contains(&flow)
    }
}

fn region_name(flow: Flow) -> &'static str {
    match flow {
        Flow::Single => "prediction",
        Flow::Batch => "batch prediction",
    }
}

pub fn format_result(view: &ResultView) -> String {
    match view {
        ResultView::Success(success) => {
            let mut out = format!("== {} ==\n", success.title);
            if let Some(batch_size) = &success.batch_size {
                out.push_str(&format!("Batch Size: {batch_size}\n"));
            }
            out.push_str(&format!("Output Shape: {}\n", success.shape));
            out.push_str(&format!("{}:\n{}\n", success.payload_label, success.payload));
            out
        }
        ResultView::Error(error) => format!("== {} ==\n{}\n", error.title, error.message),
    }
}

pub fn format_model_info(view: &ModelInfoView) -> String {
    let mut out = String::from("== Model ==\n");
    for (label, value) in view.lines() {
        out.push_str(&format!("{label}: {value}\n"));
    }
    out
}

fn print_stdout(text: &str) {
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{text}");
}

impl ViewHost for TerminalViewHost {
    fn set_loading(&self, flow: Flow, visible: bool) {
        let mut state = self.state();
        if visible {
            if state.loading.insert(flow) {
                eprintln!("Running {}...", region_name(flow));
            }
        } else {
            state.loading.remove(&flow);
        }
    }

    fn clear_result(&self, flow: Flow) {
        self.state().failed.remove(&flow);
    }

    fn render_result(&self, flow: Flow, view: ResultView) {
        print_stdout(&format_result(&view));
        let mut state = self.state();
        if view.is_error() {
            state.failed.insert(flow);
        } else {
            state.failed.remove(&flow);
        }
    }

    fn render_model_info(&self, view: ModelInfoView) {
        print_stdout(&format_model_info(&view));
        self.state().model_info_shown = true;
    }

    fn set_input_text(&self, flow: Flow, text: String) {
        print_stdout(&format!("== Example {} input ==\n{text}\n", flow));
        self.state().inputs.insert(flow, text);
    }
}
