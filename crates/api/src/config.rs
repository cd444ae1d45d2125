//! Service Configuration
//!
//! Layered with the `config` crate: built-in defaults, then
//! `config/default.toml`, then the file named by `FORECAST_CONFIG`, then
//! `FORECAST__SECTION__KEY` environment variables.

use crate::rate_limit::RateLimitConfig;
use config::{Config, ConfigError, Environment, File};
use inference_engine::{DEFAULT_ERROR_MARGIN, DEFAULT_HORIZON};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerSettings {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Model and feature table locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactSettings {
    pub model_path: PathBuf,
    pub model_url: Option<String>,
    pub features_path: PathBuf,
    pub features_url: Option<String>,
    /// JSON array of importances aligned with the feature schema
    pub importances_path: Option<PathBuf>,
}

impl Default for ArtifactSettings {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model.onnx"),
            model_url: None,
            features_path: PathBuf::from("features.csv"),
            features_url: None,
            importances_path: None,
        }
    }
}

/// Forecast and analytics parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastSettings {
    /// Half-width of the uncertainty band (historical MAE)
    pub error_margin: f64,
    pub default_horizon: usize,
    /// Requests asking for more months are clamped to this
    pub max_horizon: usize,
    pub holdout_rows: usize,
    pub default_compare_points: usize,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            error_margin: DEFAULT_ERROR_MARGIN,
            default_horizon: DEFAULT_HORIZON,
            max_horizon: 60,
            holdout_rows: analytics::DEFAULT_HOLDOUT_ROWS,
            default_compare_points: analytics::DEFAULT_COMPARE_POINTS,
        }
    }
}

/// Chat-completion backend
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    /// Falls back to `OPENAI_API_KEY` when unset
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub api_base: Option<String>,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            api_base: None,
        }
    }
}

/// Logging output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub artifacts: ArtifactSettings,
    pub forecast: ForecastSettings,
    pub assistant: AssistantSettings,
    pub rate_limit: RateLimitConfig,
    pub log: LogSettings,
}

impl Settings {
    /// Load settings from files and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(File::with_name("config/default").required(false));

        if let Ok(path) = std::env::var("FORECAST_CONFIG") {
            builder = builder.add_source(File::with_name(&path).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix("FORECAST")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins"),
            )
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;
        settings.apply_key_fallback(std::env::var("OPENAI_API_KEY").ok());
        Ok(settings)
    }

    fn apply_key_fallback(&mut self, env_key: Option<String>) {
        let missing = self
            .assistant
            .api_key
            .as_deref()
            .map_or(true, |k| k.trim().is_empty());
        if missing {
            self.assistant.api_key = env_key.filter(|k| !k.trim().is_empty());
        }
    }
}
