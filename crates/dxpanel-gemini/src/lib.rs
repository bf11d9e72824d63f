//! # dxpanel-gemini
//!
//! A `Generator` backed by the Gemini `generateContent` REST endpoint.
//!
//! Each call is one blocking POST with the client-wide timeout. Non-success
//! statuses, transport errors and responses without candidate text all
//! surface as `PanelError`; the engine turns them into error analyses or the
//! fallback verdict.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use dxpanel_config::GeneratorSettings;
use dxpanel_contracts::error::{PanelError, PanelResult};
use dxpanel_core::traits::Generator;

const API_KEY_HEADER: &str = "x-goog-api-key";

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_k: u32,
    top_p: f64,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────────────

pub struct GeminiGenerator {
    endpoint: String,
    model: String,
    api_key: String,
    timeout_secs: u64,
    generation_config: GenerationConfig,
    client: reqwest::blocking::Client,
}

impl GeminiGenerator {
    /// Build a client from settings, reading the API key from the
    /// environment variable the settings name.
    pub fn from_settings(settings: &GeneratorSettings) -> PanelResult<Self> {
        let api_key = std::env::var(&settings.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| PanelError::ConfigError {
                reason: format!("environment variable {} is not set", settings.api_key_env),
            })?;
        Self::with_api_key(settings, api_key)
    }

    pub fn with_api_key(settings: &GeneratorSettings, api_key: impl Into<String>) -> PanelResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| PanelError::ConfigError {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            endpoint: settings.endpoint.clone(),
            model: settings.model.clone(),
            api_key: api_key.into(),
            timeout_secs: settings.timeout_secs,
            generation_config: GenerationConfig {
                temperature: settings.temperature,
                top_k: settings.top_k,
                top_p: settings.top_p,
                max_output_tokens: settings.max_output_tokens,
            },
            client,
        })
    }

    fn request_body<'a>(&self, prompt: &'a str) -> GenerateRequest<'a> {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: self.generation_config.clone(),
        }
    }

    fn call_error(&self, e: reqwest::Error) -> PanelError {
        if e.is_timeout() {
            PanelError::GenerationTimeout {
                seconds: self.timeout_secs,
            }
        } else {
            PanelError::GenerationFailed {
                reason: e.to_string(),
            }
        }
    }
}

/// First candidate's first text part.
fn extract_text(response: GenerateResponse) -> PanelResult<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or_else(|| PanelError::GenerationFailed {
            reason: "response contained no candidate text".to_string(),
        })
}

impl Generator for GeminiGenerator {
    fn generate(&self, prompt: &str) -> PanelResult<String> {
        debug!(model = %self.model, prompt_bytes = prompt.len(), "sending generation request");

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .map_err(|e| self.call_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            warn!(model = %self.model, %status, "generation request rejected");
            return Err(PanelError::GenerationFailed {
                reason: format!("HTTP {status}: {}", body.chars().take(300).collect::<String>()),
            });
        }

        let parsed: GenerateResponse = response.json().map_err(|e| self.call_error(e))?;
        let text = extract_text(parsed)?;
        debug!(model = %self.model, response_bytes = text.len(), "generation response received");
        Ok(text)
    }

    fn model_identifier(&self) -> &str {
        &self.model
    }
}
