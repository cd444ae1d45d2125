//! Narration Pass-Through

use crate::prompts::{
    chart_prompt, feature_importance_prompt, forecast_summary_prompt, ChartQuestion,
    ForecastSummaryRequest, ImportanceSummaryRequest,
};
use crate::types::{ChatRequest, LlmClient, LlmError};
use std::sync::Arc;
use tracing::{debug, info};

/// Validates narration payloads and relays them to the configured backend
#[derive(Clone, Default)]
pub struct Narrator {
    client: Option<Arc<dyn LlmClient>>,
}

impl Narrator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        info!("Narration enabled via {}", client.provider_name());
        Self {
            client: Some(client),
        }
    }

    /// A narrator that rejects every call with `NotConfigured`
    pub fn disabled() -> Self {
        Self { client: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    async fn relay(&self, request: ChatRequest) -> Result<String, LlmError> {
        let client = self.client.as_ref().ok_or(LlmError::NotConfigured)?;
        debug!("Relaying {} messages to {}", request.messages.len(), client.provider_name());
        client.complete(request).await
    }

    pub async fn explain_chart(&self, payload: &ChartQuestion) -> Result<String, LlmError> {
        self.relay(chart_prompt(payload)?).await
    }

    pub async fn summarize_forecast(
        &self,
        payload: &ForecastSummaryRequest,
    ) -> Result<String, LlmError> {
        self.relay(forecast_summary_prompt(payload)?).await
    }

    pub async fn summarize_importances(
        &self,
        payload: &ImportanceSummaryRequest,
    ) -> Result<String, LlmError> {
        self.relay(feature_importance_prompt(payload)?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::FeatureWeight;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        seen: Mutex<Vec<ChatRequest>>,
    }

    #[async_trait]
    impl LlmClient for RecordingClient {
        async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
            self.seen.lock().unwrap().push(request);
            Ok("Sales peak in December.".to_string())
        }

        fn provider_name(&self) -> &str {
            "recording"
        }
    }

    fn importance_payload() -> ImportanceSummaryRequest {
        ImportanceSummaryRequest {
            actionable: vec![FeatureWeight {
                feature: "Profit_Margin".into(),
                importance: 0.2,
            }],
            conceptual: vec![],
        }
    }

    #[tokio::test]
    async fn test_relays_to_client() {
        let client = Arc::new(RecordingClient::default());
        let narrator = Narrator::new(client.clone());

        let reply = narrator.summarize_importances(&importance_payload()).await.unwrap();
        assert_eq!(reply, "Sales peak in December.");

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].max_tokens, 150);
    }

    #[tokio::test]
    async fn test_invalid_payload_never_reaches_client() {
        let client = Arc::new(RecordingClient::default());
        let narrator = Narrator::new(client.clone());

        let result = narrator.explain_chart(&ChartQuestion::default()).await;
        assert!(matches!(result, Err(LlmError::InvalidRequest(_))));
        assert!(client.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disabled_narrator() {
        let narrator = Narrator::disabled();
        assert!(!narrator.is_enabled());
        assert!(matches!(
            narrator.summarize_importances(&importance_payload()).await,
            Err(LlmError::NotConfigured)
        ));
    }
}
