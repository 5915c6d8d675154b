//! Configuration loading, validation, and management for Veilroute.
//!
//! Loads configuration from a TOML file with environment variable
//! overrides. Validates all settings at startup. The name-detection
//! heuristics (deny-list, introducer words) live here because they are
//! expected to be tuned against production traffic, not recompiled.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Environment variable overriding the classifier API key.
pub const ENV_API_KEY: &str = "VEILROUTE_API_KEY";
/// Environment variable overriding the classifier base URL.
pub const ENV_BASE_URL: &str = "VEILROUTE_BASE_URL";
/// Environment variable overriding the classifier model.
pub const ENV_MODEL: &str = "VEILROUTE_MODEL";

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Classifier backend settings
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// PII masking heuristics
    #[serde(default)]
    pub masking: MaskingConfig,

    /// Router behavior
    #[serde(default)]
    pub router: RouterConfig,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Backend name (e.g., "openai", "ollama")
    #[serde(default = "default_backend")]
    pub backend: String,

    /// Base URL; defaults per backend when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// API key; prefer the environment variable in deployments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total attempt budget (first try included)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            base_url: None,
            api_key: None,
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Tunable name-detection heuristics. `None` means "use the built-in
/// defaults" from the privacy crate.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MaskingConfig {
    /// Capitalized words never treated as part of a person name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny_list: Option<Vec<String>>,

    /// Words that introduce a person ("for", "to", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub introducers: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Number of most-recent history turns included in classifier input
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
        }
    }
}

fn default_backend() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_attempts() -> u32 {
    3
}
fn default_history_window() -> usize {
    10
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("classifier", &self.classifier)
            .field("masking", &self.masking)
            .field("router", &self.router)
            .finish()
    }
}

impl std::fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("backend", &self.backend)
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_attempts", &self.max_attempts)
            .finish()
    }
}

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl AppConfig {
    /// Load configuration from a TOML file, apply environment overrides,
    /// and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&raw)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply `VEILROUTE_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(ENV_API_KEY) {
            if !key.is_empty() {
                self.classifier.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var(ENV_BASE_URL) {
            if !url.is_empty() {
                self.classifier.base_url = Some(url);
            }
        }
        if let Ok(model) = std::env::var(ENV_MODEL) {
            if !model.is_empty() {
                self.classifier.model = model;
            }
        }
    }

    /// Validate settings; called at startup so misconfiguration fails fast.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.classifier.model.trim().is_empty() {
            return Err(ConfigError::Invalid("classifier.model must not be empty".into()));
        }
        if self.classifier.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "classifier.timeout_secs must be at least 1".into(),
            ));
        }
        if self.classifier.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "classifier.max_attempts must be at least 1".into(),
            ));
        }
        if self.router.history_window == 0 {
            return Err(ConfigError::Invalid(
                "router.history_window must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.router.history_window, 10);
        assert_eq!(config.classifier.max_attempts, 3);
    }

    #[test]
    fn loads_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[classifier]
backend = "ollama"
model = "llama3.2"
timeout_secs = 10

[masking]
deny_list = ["training", "incident"]

[router]
history_window = 6
"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.classifier.backend, "ollama");
        assert_eq!(config.classifier.model, "llama3.2");
        assert_eq!(config.classifier.timeout_secs, 10);
        assert_eq!(config.router.history_window, 6);
        assert_eq!(
            config.masking.deny_list.as_deref(),
            Some(["training".to_string(), "incident".to_string()].as_slice())
        );
        assert!(config.masking.introducers.is_none());
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut config = AppConfig::default();
        config.classifier.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_attempts_rejected() {
        let mut config = AppConfig::default();
        config.classifier.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_redacts_api_key() {
        let mut config = AppConfig::default();
        config.classifier.api_key = Some("sk-super-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
