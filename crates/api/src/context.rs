//! Application Context
//!
//! Built once at startup and shared read-only by every handler.

use crate::config::{AssistantSettings, ForecastSettings, Settings};
use anyhow::Context;
use assistant::{Narrator, OpenAiClient};
use inference_engine::{load_model, ForecastEngine, InferenceError, SalesModel};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Instant;
use storage::{load_csv, ArtifactSource, SalesTable};
use tracing::{error, info};

pub struct AppContext {
    pub table: SalesTable,
    pub engine: ForecastEngine,
    pub narrator: Narrator,
    pub forecast: ForecastSettings,
    pub telemetry: Option<PrometheusHandle>,
    pub version: String,
    pub start_time: Instant,
}

impl AppContext {
    /// Assemble a context from loaded artifacts
    pub fn new(
        table: SalesTable,
        model: Arc<dyn SalesModel>,
        narrator: Narrator,
        forecast: ForecastSettings,
    ) -> Result<Self, InferenceError> {
        let engine = ForecastEngine::new(model, forecast.error_margin)?;
        Ok(Self {
            table,
            engine,
            narrator,
            forecast,
            telemetry: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        })
    }

    pub fn with_telemetry(mut self, handle: PrometheusHandle) -> Self {
        self.telemetry = Some(handle);
        self
    }

    pub fn model(&self) -> &dyn SalesModel {
        self.engine.model().as_ref()
    }

    /// Fetch artifacts if needed, then load the table, model and chat backend
    pub async fn load(settings: &Settings) -> anyhow::Result<Self> {
        let artifacts = &settings.artifacts;

        let features_path = ArtifactSource::new(&artifacts.features_path, artifacts.features_url.clone())
            .ensure_local()
            .await
            .context("fetching feature table")?;
        let model_path = ArtifactSource::new(&artifacts.model_path, artifacts.model_url.clone())
            .ensure_local()
            .await
            .context("fetching model")?;

        let table = load_csv(&features_path)
            .with_context(|| format!("loading {}", features_path.display()))?;
        let model = load_model(&model_path, artifacts.importances_path.as_deref())
            .with_context(|| format!("loading {}", model_path.display()))?;

        let narrator = build_narrator(&settings.assistant);
        let context = Self::new(table, model, narrator, settings.forecast.clone())
            .context("model does not match the feature schema")?;

        info!(
            "Context ready: {} rows, {} stores, model {}",
            context.table.len(),
            context.table.store_ids().len(),
            context.model().name()
        );
        Ok(context)
    }
}

fn build_narrator(settings: &AssistantSettings) -> Narrator {
    let Some(api_key) = settings.api_key.clone() else {
        error!("OPENAI_API_KEY is not set! Narration endpoints will answer 503");
        return Narrator::disabled();
    };

    let client = match &settings.api_base {
        Some(base) => OpenAiClient::with_endpoint(
            base.clone(),
            api_key,
            settings.model.clone(),
            settings.temperature,
        ),
        None => OpenAiClient::new(api_key, settings.model.clone(), settings.temperature),
    };
    Narrator::new(Arc::new(client))
}
