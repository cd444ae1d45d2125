//! Prompt Assembly

use crate::types::{ChatMessage, ChatRequest, LlmError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

const CHART_TOKENS: u32 = 200;
const SUMMARY_TOKENS: u32 = 150;

const CHART_SYSTEM_PROMPT: &str = "You are an assistant for data charts.";

/// `/api/chat` payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChartQuestion {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default, rename = "chartType")]
    pub chart_type: Option<String>,
    #[serde(default, rename = "chartData")]
    pub chart_data: Option<Value>,
}

/// Totals shown on the forecast card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    #[serde(rename = "totalPredicted")]
    pub total_predicted: f64,
    pub weeks: u32,
    pub confidence_low: f64,
    pub confidence_high: f64,
}

/// `/ai_summary` payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForecastSummaryRequest {
    #[serde(default)]
    pub store: Option<Value>,
    #[serde(default, rename = "forecastSummary")]
    pub forecast_summary: Option<ForecastSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub feature: String,
    #[serde(default)]
    pub importance: f64,
}

/// `/ai_feature_importance` payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImportanceSummaryRequest {
    #[serde(default)]
    pub actionable: Vec<FeatureWeight>,
    #[serde(default)]
    pub conceptual: Vec<FeatureWeight>,
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

/// Dollar amount with thousands separators and no cents when whole
fn currency(amount: f64) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    let whole = rounded.trunc().abs() as u64;
    let digits = whole.to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let cents = ((rounded.abs() - whole as f64) * 100.0).round() as u64;
    let sign = if rounded < 0.0 { "-" } else { "" };
    if cents == 0 {
        format!("{}${}", sign, grouped)
    } else {
        format!("{}${}.{:02}", sign, grouped, cents)
    }
}

/// Question about a chart, answered with the chart data attached
pub fn chart_prompt(payload: &ChartQuestion) -> Result<ChatRequest, LlmError> {
    let question = payload.question.as_deref().filter(|q| !q.trim().is_empty());
    let data = payload.chart_data.as_ref().filter(|d| !is_blank(d));
    let (Some(question), Some(data)) = (question, data) else {
        return Err(LlmError::InvalidRequest(
            "Missing question or chartData".to_string(),
        ));
    };

    Ok(ChatRequest {
        messages: vec![
            ChatMessage::system(CHART_SYSTEM_PROMPT),
            ChatMessage::user(format!("{} Data: {}", question, data)),
        ],
        max_tokens: CHART_TOKENS,
    })
}

/// Plain-language summary of a forecast total and its confidence range
pub fn forecast_summary_prompt(payload: &ForecastSummaryRequest) -> Result<ChatRequest, LlmError> {
    let forecast = payload
        .forecast_summary
        .as_ref()
        .ok_or_else(|| LlmError::InvalidRequest("missing forecastSummary".to_string()))?;

    let subject = match &payload.store {
        Some(Value::Number(n)) => format!("store #{}", n),
        Some(Value::String(s)) if !s.is_empty() => format!("store #{}", s),
        _ => "this store".to_string(),
    };

    let prompt = format!(
        "Summarize this sales forecast for {} for presentation:\n\
         - Total sales: {} over {} weeks.\n\
         - 95% confidence range: {} – {}.\n\
         Explain it to someone with no prior knowledge of data analysis.",
        subject,
        currency(forecast.total_predicted),
        forecast.weeks,
        currency(forecast.confidence_low),
        currency(forecast.confidence_high),
    );

    Ok(ChatRequest {
        messages: vec![ChatMessage::user(prompt)],
        max_tokens: SUMMARY_TOKENS,
    })
}

/// Top three features as `name (xx.x%)`, or `None`
pub fn format_top_features(features: &[FeatureWeight]) -> String {
    let mut sorted: Vec<&FeatureWeight> = features.iter().collect();
    sorted.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(Ordering::Equal)
    });

    let top: Vec<String> = sorted
        .iter()
        .take(3)
        .map(|f| format!("{} ({:.1}%)", f.feature, f.importance * 100.0))
        .collect();

    if top.is_empty() {
        "None".to_string()
    } else {
        top.join(", ")
    }
}

/// Explain which inputs drive the model and what a manager could change
pub fn feature_importance_prompt(
    payload: &ImportanceSummaryRequest,
) -> Result<ChatRequest, LlmError> {
    if payload.actionable.is_empty() && payload.conceptual.is_empty() {
        return Err(LlmError::InvalidRequest(
            "Missing actionable and/or conceptual data".to_string(),
        ));
    }

    let prompt = format!(
        "You are a data assistant. Below are top feature importances from an ML model predicting liquor sales:\n\
         - Actionable features: {}\n\
         - Conceptual (context) features: {}\n\n\
         Provide a brief plain-English summary explaining how these influence predictions \
         and suggest any actions a store manager could take.",
        format_top_features(&payload.actionable),
        format_top_features(&payload.conceptual),
    );

    Ok(ChatRequest {
        messages: vec![ChatMessage::user(prompt)],
        max_tokens: SUMMARY_TOKENS,
    })
}
