//! Request orchestration for the single, batch, example, and model-info flows.

use std::sync::Arc;

use serde_json::Value;
use shared::{
    domain::{Flow, FlowState},
    protocol::{BatchPredictRequest, HealthResponse, PredictRequest},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::{
    error::ClientError,
    host::ViewHost,
    input::{normalize_single_input, parse_batch_input},
    render::{
        batch_prediction_view, example_input_texts, single_prediction_view, ErrorView,
        ModelInfoView, PredictionView, ResultView,
    },
    PredictionApi,
};

const MODEL_INFO_FAILURE: &str = "Failed to load model information";
const EXAMPLE_FAILURE: &str = "Failed to load example input";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// An error with no owning region.
    Notification(String),
    FlowStateChanged { flow: Flow, state: FlowState },
    StaleResponseDiscarded { flow: Flow, generation: u64 },
}

#[derive(Default)]
struct FlowSlot {
    generation: u64,
    state: FlowState,
}

pub struct RequestController {
    api: Arc<dyn PredictionApi>,
    host: Arc<dyn ViewHost>,
    single: Mutex<FlowSlot>,
    batch: Mutex<FlowSlot>,
    events: broadcast::Sender<ControllerEvent>,
}

impl RequestController {
    pub fn new(api: Arc<dyn PredictionApi>, host: Arc<dyn ViewHost>) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            api,
            host,
            single: Mutex::new(FlowSlot::default()),
            batch: Mutex::new(FlowSlot::default()),
            events,
        }
    }

    /// Startup hook: fills the model-info region.
    pub async fn start(&self) {
        self.load_model_info().await;
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn flow_state(&self, flow: Flow) -> FlowState {
        self.slot(flow).lock().await.state
    }

    pub async fn check_health(&self) -> Result<HealthResponse, ClientError> {
        let health = self.api.health().await?;
        info!(
            status = %health.status,
            model_loaded = health.model_loaded,
            "prediction service health"
        );
        Ok(health)
    }

    pub async fn load_model_info(&self) {
        match self.api.model_info().await {
            Ok(response) => {
                let view = ModelInfoView::from_response(&response);
                debug!(device = %view.device, model_type = %view.model_type, "model info loaded");
                self.host.render_model_info(view);
            }
            Err(err) => {
                error!("failed to load model info: {err}");
                self.show_error(MODEL_INFO_FAILURE, None);
            }
        }
    }

    pub async fn submit_single_prediction(&self, raw_input: &str) {
        let flow = Flow::Single;
        let generation = self.begin(flow).await;

        let outcome = match normalize_single_input(raw_input) {
            Ok(input) => self.request_single(input).await,
            Err(err) => {
                error!(%flow, "rejected prediction input: {err}");
                Err(format!("{}: {err}", flow.failure_label()))
            }
        };

        self.finish(flow, generation, outcome).await;
    }

    pub async fn submit_batch_prediction(&self, raw_input: &str) {
        let flow = Flow::Batch;
        let generation = self.begin(flow).await;

        let outcome = match parse_batch_input(raw_input) {
            Ok(inputs) => self.request_batch(inputs).await,
            Err(err) => {
                error!(%flow, "rejected batch input: {err}");
                Err(format!("{}: {err}", flow.failure_label()))
            }
        };

        self.finish(flow, generation, outcome).await;
    }

    /// Replaces both input areas with the server's example payloads. On any
    /// failure neither area is touched.
    pub async fn load_example(&self) {
        let texts = match self.api.example().await {
            Ok(example) => example_input_texts(&example),
            Err(err) => Err(err.to_string()),
        };

        match texts {
            Ok((single, batch)) => {
                self.host.set_input_text(Flow::Single, single);
                self.host.set_input_text(Flow::Batch, batch);
                debug!("example inputs loaded");
            }
            Err(err) => {
                error!("failed to load example: {err}");
                self.show_error(EXAMPLE_FAILURE, None);
            }
        }
    }

    pub fn show_loading(&self, flow: Flow) {
        self.host.set_loading(flow, true);
    }

    pub fn hide_loading(&self, flow: Flow) {
        self.host.set_loading(flow, false);
    }

    /// With a region, renders an error block there; without one, publishes a
    /// notification for whoever subscribed to controller events.
    pub fn show_error(&self, message: &str, region: Option<Flow>) {
        match region {
            Some(flow) => self
                .host
                .render_result(flow, ResultView::Error(ErrorView::new(message))),
            None => {
                warn!("notification: {message}");
                let _ = self
                    .events
                    .send(ControllerEvent::Notification(message.to_string()));
            }
        }
    }

    async fn request_single(&self, input: Value) -> Result<PredictionView, String> {
        match self.api.predict(&PredictRequest { input }).await {
            Ok(response) => single_prediction_view(&response).inspect_err(|message| {
                debug!(flow = %Flow::Single, "server reported failure: {message}");
            }),
            Err(err) => {
                error!(flow = %Flow::Single, "prediction request failed: {err}");
                Err(format!("{}: {err}", Flow::Single.failure_label()))
            }
        }
    }

    async fn request_batch(&self, inputs: Value) -> Result<PredictionView, String> {
        match self.api.predict_batch(&BatchPredictRequest { inputs }).await {
            Ok(response) => batch_prediction_view(&response).inspect_err(|message| {
                debug!(flow = %Flow::Batch, "server reported failure: {message}");
            }),
            Err(err) => {
                error!(flow = %Flow::Batch, "batch prediction request failed: {err}");
                Err(format!("{}: {err}", Flow::Batch.failure_label()))
            }
        }
    }

    fn slot(&self, flow: Flow) -> &Mutex<FlowSlot> {
        match flow {
            Flow::Single => &self.single,
            Flow::Batch => &self.batch,
        }
    }

    async fn begin(&self, flow: Flow) -> u64 {
        let mut slot = self.slot(flow).lock().await;
        slot.generation += 1;
        self.show_loading(flow);
        self.host.clear_result(flow);
        self.set_state(&mut slot, flow, FlowState::Loading);
        debug!(%flow, generation = slot.generation, "submission started");
        slot.generation
    }

    // The slot lock is held while rendering so a newer submission cannot
    // interleave between the generation check and the region update.
    async fn finish(&self, flow: Flow, generation: u64, outcome: Result<PredictionView, String>) {
        let mut slot = self.slot(flow).lock().await;
        if slot.generation != generation {
            debug!(%flow, generation, current = slot.generation, "discarding stale response");
            let _ = self
                .events
                .send(ControllerEvent::StaleResponseDiscarded { flow, generation });
            return;
        }

        match outcome {
            Ok(view) => {
                self.host.render_result(flow, ResultView::Success(view));
                self.set_state(&mut slot, flow, FlowState::Success);
            }
            Err(message) => {
                self.show_error(&message, Some(flow));
                self.set_state(&mut slot, flow, FlowState::Error);
            }
        }
        self.hide_loading(flow);
        self.set_state(&mut slot, flow, FlowState::Idle);
    }

    fn set_state(&self, slot: &mut FlowSlot, flow: Flow, state: FlowState) {
        slot.state = state;
        let _ = self
            .events
            .send(ControllerEvent::FlowStateChanged { flow, state });
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
