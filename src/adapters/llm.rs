use crate::domain::ports::Generator;
use crate::utils::error::{HelpDeskError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:11434/api/generate";
pub const DEFAULT_MODEL: &str = "llama3.2:1b";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_NEW_TOKENS: u32 = 150;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorSettings {
    pub endpoint: String,
    pub model: String,
    pub temperature: f64,
    pub max_new_tokens: u32,
    pub timeout: Duration,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Completion client for an Ollama-compatible `/api/generate` endpoint.
pub struct OllamaGenerator {
    client: Client,
    settings: GeneratorSettings,
}

impl OllamaGenerator {
    pub fn new(settings: GeneratorSettings) -> Result<Self> {
        let client = Client::builder().timeout(settings.timeout).build()?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.settings.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: self.settings.temperature,
                num_predict: self.settings.max_new_tokens,
            },
        };

        tracing::debug!(
            "Requesting completion from {} (model: {})",
            self.settings.endpoint,
            self.settings.model
        );
        let response = self
            .client
            .post(&self.settings.endpoint)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Generator response status: {}", status);
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(HelpDeskError::GenerationError {
                message: format!("{} returned {}: {}", self.settings.endpoint, status, body.trim()),
            });
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.response)
    }
}
