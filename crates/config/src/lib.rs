//! Configuration loading, validation, and management for Parley.
//!
//! Loads configuration from `~/.parley/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use parley_core::completion::{DEFAULT_SEPARATOR, SUPPORTED_MODELS, SamplingConfig};
use parley_core::persona::{DemoProfile, Persona, ProfileTable, SHOE_LA_LA};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.parley/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Completion API key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the completion API; the model id and `/complete` are appended
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model selected when a session starts
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Models offered by the model selector
    #[serde(default = "default_models")]
    pub models: Vec<String>,

    /// Demo profile the chat starts with
    #[serde(default = "default_demo")]
    pub demo: String,

    /// Sampling parameters sent with every completion
    #[serde(default)]
    pub sampling: SamplingSettings,

    /// Where feedback snapshots go
    #[serde(default)]
    pub feedback: FeedbackConfig,

    /// Extra demo profiles, merged over the built-in ones
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub demos: HashMap<String, DemoProfile>,
}

fn default_base_url() -> String {
    "https://api.ai21.com/studio/v1".into()
}
fn default_model() -> String {
    SUPPORTED_MODELS[0].into()
}
fn default_models() -> Vec<String> {
    SUPPORTED_MODELS.iter().map(|m| m.to_string()).collect()
}
fn default_demo() -> String {
    SHOE_LA_LA.into()
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("models", &self.models)
            .field("demo", &self.demo)
            .field("sampling", &self.sampling)
            .field("feedback", &self.feedback)
            .field("demos", &self.demos.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingSettings {
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default)]
    pub top_k_return: u32,

    /// Example separator, also sent as a stop sequence
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_max_tokens() -> u32 {
    50
}
fn default_temperature() -> f32 {
    0.8
}
fn default_top_p() -> f32 {
    0.9
}
fn default_separator() -> String {
    DEFAULT_SEPARATOR.into()
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k_return: 0,
            separator: default_separator(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackConfig {
    /// "file" or "memory"
    #[serde(default = "default_feedback_backend")]
    pub backend: String,

    /// JSONL file for the "file" backend (default: ~/.parley/feedback.jsonl)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

fn default_feedback_backend() -> String {
    "file".into()
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            backend: default_feedback_backend(),
            path: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.parley/config.toml).
    ///
    /// Environment variables override the file:
    /// - `PARLEY_API_KEY` (highest priority), then `AI21_API_KEY`
    /// - `PARLEY_MODEL`, `PARLEY_DEMO`, `PARLEY_BASE_URL`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("PARLEY_API_KEY").or_else(|| lookup("AI21_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(model) = lookup("PARLEY_MODEL") {
            self.default_model = model;
        }
        if let Some(demo) = lookup("PARLEY_DEMO") {
            self.demo = demo;
        }
        if let Some(url) = lookup("PARLEY_BASE_URL") {
            self.base_url = url;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".parley")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.sampling;
        if !(0.0..=2.0).contains(&s.temperature) {
            return Err(ConfigError::ValidationError(
                "sampling.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if s.top_p <= 0.0 || s.top_p > 1.0 {
            return Err(ConfigError::ValidationError(
                "sampling.top_p must be in (0.0, 1.0]".into(),
            ));
        }
        if s.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "sampling.max_tokens must be > 0".into(),
            ));
        }
        if s.separator.is_empty() {
            return Err(ConfigError::ValidationError(
                "sampling.separator must not be empty".into(),
            ));
        }
        if !self.models.contains(&self.default_model) {
            return Err(ConfigError::ValidationError(format!(
                "default_model '{}' is not in models {:?}",
                self.default_model, self.models
            )));
        }
        if !matches!(self.feedback.backend.as_str(), "file" | "memory") {
            return Err(ConfigError::ValidationError(format!(
                "feedback.backend must be \"file\" or \"memory\", got '{}'",
                self.feedback.backend
            )));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Whether `model` may be picked in the model selector.
    pub fn is_known_model(&self, model: &str) -> bool {
        self.models.iter().any(|m| m == model)
    }

    /// Built-in demo profiles with the configured ones merged over them.
    pub fn profile_table(&self) -> ProfileTable {
        let mut table = ProfileTable::builtin();
        table.merge(self.demos.clone());
        table
    }

    /// Sampling options for a chat with `persona`.
    pub fn sampling_for(&self, persona: &Persona) -> SamplingConfig {
        let s = &self.sampling;
        SamplingConfig {
            num_results: 1,
            max_tokens: s.max_tokens,
            temperature: s.temperature,
            top_k_return: s.top_k_return,
            top_p: s.top_p,
            stop_sequences: SamplingConfig::turn_stops(persona, &s.separator),
        }
    }

    /// Resolved path of the JSONL feedback log.
    pub fn feedback_path(&self) -> PathBuf {
        self.feedback
            .path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| Self::config_dir().join("feedback.jsonl"))
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            default_model: default_model(),
            models: default_models(),
            demo: default_demo(),
            sampling: SamplingSettings::default(),
            feedback: FeedbackConfig::default(),
            demos: HashMap::new(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_model, "j1-jumbo");
        assert_eq!(config.demo, "shoe_la_la");
        assert_eq!(config.models.len(), 4);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_model, config.default_model);
        assert_eq!(parsed.sampling.max_tokens, config.sampling.max_tokens);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            sampling: SamplingSettings {
                temperature: 5.0,
                ..SamplingSettings::default()
            },
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_default_model_rejected() {
        let config = AppConfig {
            default_model: "gpt-4o".into(),
            ..AppConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("gpt-4o"));
    }

    #[test]
    fn unknown_feedback_backend_rejected() {
        let mut config = AppConfig::default();
        config.feedback.backend = "postgres".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.default_model, "j1-jumbo");
    }

    #[test]
    fn file_with_custom_demo_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_model = "j1-large"
demo = "bakery"

[sampling]
max_tokens = 80

[demos.bakery]
participants = ["Baker", "Guest"]
greeting = "Fresh bread today!"
background = "Baker runs a small bakery.\n"
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.default_model, "j1-large");
        assert_eq!(config.sampling.max_tokens, 80);
        assert!((config.sampling.temperature - 0.8).abs() < f32::EPSILON);

        let table = config.profile_table();
        assert!(table.contains("shoe_la_la"));
        let persona = table.persona(&config.demo);
        assert_eq!(persona.bot_name, "Baker");
        assert_eq!(persona.user_name, "Guest");
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "models = 3").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_take_priority() {
        let mut config = AppConfig {
            api_key: Some("from-file".into()),
            ..AppConfig::default()
        };
        config.apply_env(|key| match key {
            "AI21_API_KEY" => Some("ai21-key".into()),
            "PARLEY_MODEL" => Some("j1-grande".into()),
            _ => None,
        });
        assert_eq!(config.api_key.as_deref(), Some("ai21-key"));
        assert_eq!(config.default_model, "j1-grande");
        assert_eq!(config.demo, "shoe_la_la");
    }

    #[test]
    fn sampling_for_persona_builds_stop_sequences() {
        let mut config = AppConfig::default();
        config.sampling.separator = "###".into();
        let sampling = config.sampling_for(&Persona::generic());
        assert_eq!(sampling.num_results, 1);
        assert_eq!(sampling.stop_sequences, vec!["Bot:", "User:", "###"]);
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("super-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("j1-jumbo"));
        assert!(toml_str.contains("api.ai21.com"));
    }
}
