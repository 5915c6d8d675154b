//! OpenAI-compatible classifier backend.
//!
//! Works with OpenAI, OpenRouter, Ollama, vLLM, and any endpoint exposing
//! a `/chat/completions` route. Sends the masked block as a single user
//! message under the classification prompt and returns the raw assistant
//! text — interpretation belongs to the decision parser.

use crate::prompt::classification_prompt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use veilroute_config::ClassifierConfig;
use veilroute_core::{Classifier, ClassifierError};

const DEFAULT_TEMPERATURE: f32 = 0.0;
const DEFAULT_MAX_TOKENS: u32 = 512;

/// An OpenAI-compatible intent classifier.
pub struct HttpClassifier {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl HttpClassifier {
    /// Create a new classifier backend.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| ClassifierError::NotConfigured(format!("HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            client,
        })
    }

    /// Create an OpenAI backend (convenience constructor).
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, ClassifierError> {
        Self::new("openai", "https://api.openai.com/v1", api_key, model)
    }

    /// Create an Ollama backend (convenience constructor).
    pub fn ollama(base_url: Option<&str>, model: impl Into<String>) -> Result<Self, ClassifierError> {
        Self::new(
            "ollama",
            base_url.unwrap_or("http://localhost:11434/v1"),
            "ollama", // Ollama doesn't need a real key
            model,
        )
    }

    /// Build the backend named by the configuration.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        match config.backend.as_str() {
            "openai" => {
                let api_key = config.api_key.clone().ok_or_else(|| {
                    ClassifierError::NotConfigured("openai backend requires an API key".into())
                })?;
                match &config.base_url {
                    Some(url) => Self::new("openai", url, api_key, config.model.clone()),
                    None => Self::openai(api_key, config.model.clone()),
                }
            }
            "ollama" => Self::ollama(config.base_url.as_deref(), config.model.clone()),
            // Any other name is treated as a generic OpenAI-compatible
            // endpoint and must say where it lives.
            other => {
                let base_url = config.base_url.clone().ok_or_else(|| {
                    ClassifierError::NotConfigured(format!(
                        "backend '{other}' requires classifier.base_url"
                    ))
                })?;
                Self::new(
                    other,
                    base_url,
                    config.api_key.clone().unwrap_or_default(),
                    config.model.clone(),
                )
            }
        }
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn classify(&self, masked_input: &str) -> Result<String, ClassifierError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = ApiRequest {
            model: self.model.clone(),
            messages: vec![ApiMessage {
                role: "user".into(),
                content: classification_prompt(masked_input),
            }],
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            stream: false,
        };

        debug!(backend = %self.name, model = %self.model, "Sending classification request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassifierError::Timeout(e.to_string())
                } else {
                    ClassifierError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ClassifierError::RateLimited { retry_after_secs: 5 });
        }

        if status == 401 || status == 403 {
            return Err(ClassifierError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Classifier backend returned error");
            return Err(ClassifierError::Api {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response.json().await.map_err(|e| ClassifierError::Api {
            status_code: 200,
            message: format!("Failed to parse response: {e}"),
        })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ClassifierError::Api {
                status_code: 200,
                message: "No choices in response".into(),
            })?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

// ── Wire types ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
