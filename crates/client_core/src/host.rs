//! Output regions driven by the controller.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use shared::domain::Flow;

use crate::render::{ModelInfoView, ResultView};

/// The regions a host exposes. Every method replaces what the region shows;
/// calling one redundantly is harmless.
pub trait ViewHost: Send + Sync {
    fn set_loading(&self, flow: Flow, visible: bool);
    fn clear_result(&self, flow: Flow);
    fn render_result(&self, flow: Flow, view: ResultView);
    fn render_model_info(&self, view: ModelInfoView);
    fn set_input_text(&self, flow: Flow, text: String);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostUpdate {
    Loading { flow: Flow, visible: bool },
    ResultCleared { flow: Flow },
    Result { flow: Flow, view: ResultView },
    ModelInfo(ModelInfoView),
    InputText { flow: Flow, text: String },
}

#[derive(Default)]
struct RecordedRegions {
    updates: Vec<HostUpdate>,
    loading: HashMap<Flow, bool>,
    results: HashMap<Flow, ResultView>,
    inputs: HashMap<Flow, String>,
    model_info: Option<ModelInfoView>,
}

/// Keeps the current content of every region plus the ordered update log.
#[derive(Default)]
pub struct RecordingViewHost {
    regions: Mutex<RecordedRegions>,
}

impl RecordingViewHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn regions(&self) -> MutexGuard<'_, RecordedRegions> {
        self.regions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn updates(&self) -> Vec<HostUpdate> {
        self.regions().updates.clone()
    }

    pub fn is_loading(&self, flow: Flow) -> bool {
        self.regions().loading.get(&flow).copied().unwrap_or(false)
    }

    pub fn result(&self, flow: Flow) -> Option<ResultView> {
        self.regions().results.get(&flow).cloned()
    }

    pub fn input_text(&self, flow: Flow) -> Option<String> {
        self.regions().inputs.get(&flow).cloned()
    }

    pub fn model_info(&self) -> Option<ModelInfoView> {
        self.regions().model_info.clone()
    }
}

impl ViewHost for RecordingViewHost {
    fn set_loading(&self, flow: Flow, visible: bool) {
        let mut regions = self.regions();
        regions.loading.insert(flow, visible);
        regions.updates.push(HostUpdate::Loading { flow, visible });
    }

    fn clear_result(&self, flow: Flow) {
        let mut regions = self.regions();
        regions.results.remove(&flow);
        regions.updates.push(HostUpdate::ResultCleared { flow });
    }

    fn render_result(&self, flow: Flow, view: ResultView) {
        let mut regions = self.regions();
        regions.results.insert(flow, view.clone());
        regions.updates.push(HostUpdate::Result { flow, view });
    }

    fn render_model_info(&self, view: ModelInfoView) {
        let mut regions = self.regions();
        regions.model_info = Some(view.clone());
        regions.updates.push(HostUpdate::ModelInfo(view));
    }

    fn set_input_text(&self, flow: Flow, text: String) {
        let mut regions = self.regions();
        regions.inputs.insert(flow, text.clone());
        regions.updates.push(HostUpdate::InputText { flow, text });
    }
}
