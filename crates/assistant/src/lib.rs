//! Forecast Narration Assistant
//!
//! Turns chart data, forecast totals and feature importances into a prompt
//! and relays it to a chat-completion API. No text is generated locally.

mod narrator;
mod openai;
mod prompts;
mod types;

pub use narrator::Narrator;
pub use openai::OpenAiClient;
pub use prompts::{
    chart_prompt, feature_importance_prompt, forecast_summary_prompt, format_top_features,
    ChartQuestion, FeatureWeight, ForecastSummary, ForecastSummaryRequest, ImportanceSummaryRequest,
};
pub use types::{ChatMessage, ChatRequest, ChatRole, LlmClient, LlmError};
