//! Generator client — one attempt against an OpenAI-compatible or Ollama
//! upstream.
//!
//! The client makes exactly ONE call per `generate`; retry, backoff, and
//! fallback policy belong to the pipeline so timing and exhaustion are
//! testable independently of transport. The client is an explicit injected
//! dependency — there is no lazily initialized global handle. "No upstream
//! configured" is a first-class state ([`GeneratorProvider::None`]), not a
//! null hiding in process state.

use std::time::Instant;

use reqwest::Client;
use serde_json::json;
use tracing::warn;

use atlas_core::config::GeneratorConfig;

use crate::error::GenError;
use crate::types::{GenRequest, GenResponse};

/// Seam for test substitution: anything that can make one generation
/// attempt.
#[allow(async_fn_in_trait)]
pub trait GenerateText {
    /// Make exactly one generation attempt.
    async fn generate(&self, request: &GenRequest) -> Result<GenResponse, GenError>;

    /// Whether an upstream is configured at all. When false the pipeline
    /// skips straight to fallback without burning retries.
    fn is_available(&self) -> bool {
        true
    }
}

/// Provider backend for scenario generation.
#[derive(Debug, Clone)]
pub enum GeneratorProvider {
    /// OpenAI-compatible API (also works with Anthropic, Together, etc.).
    OpenAiCompatible {
        /// API root, e.g. `https://api.openai.com`.
        base_url: String,
        /// Bearer token.
        api_key: String,
    },
    /// Ollama running locally.
    Ollama {
        /// API root, e.g. `http://localhost:11434`.
        base_url: String,
    },
    /// No upstream available — all calls return `Unavailable`, sending the
    /// pipeline to fallback content.
    None,
}

/// HTTP client for the generative upstream.
pub struct GeneratorClient {
    provider: GeneratorProvider,
    http: Client,
    model: String,
}

impl GeneratorClient {
    /// Create a new generator client.
    #[must_use]
    pub fn new(provider: GeneratorProvider, model: impl Into<String>) -> Self {
        Self {
            provider,
            http: Client::new(),
            model: model.into(),
        }
    }

    /// Create a client with no upstream (all calls fail → fallback).
    #[must_use]
    pub fn none() -> Self {
        Self {
            provider: GeneratorProvider::None,
            http: Client::new(),
            model: String::new(),
        }
    }

    /// Build a client from configuration. An unknown provider name is
    /// treated as "none" so a typo degrades to fallback content instead of
    /// failing requests.
    #[must_use]
    pub fn from_config(config: &GeneratorConfig) -> Self {
        let provider = match config.provider.as_str() {
            "openai" => GeneratorProvider::OpenAiCompatible {
                base_url: config.base_url.clone(),
                api_key: config.api_key.clone(),
            },
            "ollama" => GeneratorProvider::Ollama {
                base_url: config.base_url.clone(),
            },
            "none" => GeneratorProvider::None,
            other => {
                warn!("Unknown generator provider '{other}', running without upstream");
                GeneratorProvider::None
            }
        };
        Self::new(provider, config.model.clone())
    }

    /// Generate using Ollama's API.
    async fn generate_ollama(
        &self,
        base_url: &str,
        request: &GenRequest,
    ) -> Result<GenResponse, GenError> {
        let url = format!("{base_url}/api/generate");
        let body = json!({
            "model": self.model,
            "prompt": format!("{}\n\n{}", request.system, request.user),
            "stream": false,
            "format": "json",
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens,
            }
        });

        let start = Instant::now();
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .timeout(std::time::Duration::from_millis(request.timeout_ms))
            .send()
            .await
            .map_err(|e| map_send_error(e, request.timeout_ms))?;

        #[allow(clippy::cast_possible_truncation)]
        let latency_ms = start.elapsed().as_millis() as u64;

        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            warn!("Ollama returned HTTP {status}: {detail}");
            return Err(GenError::RequestFailed(format!("HTTP {status}")));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| GenError::ParseError(e.to_string()))?;

        Ok(GenResponse {
            text: json["response"].as_str().unwrap_or("").to_string(),
            latency_ms,
            model: self.model.clone(),
        })
    }

    /// Generate using an OpenAI-compatible API.
    async fn generate_openai(
        &self,
        base_url: &str,
        api_key: &str,
        request: &GenRequest,
    ) -> Result<GenResponse, GenError> {
        let url = format!("{base_url}/v1/chat/completions");
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "response_format": { "type": "json_object" },
        });

        let start = Instant::now();
        let resp = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .timeout(std::time::Duration::from_millis(request.timeout_ms))
            .send()
            .await
            .map_err(|e| map_send_error(e, request.timeout_ms))?;

        #[allow(clippy::cast_possible_truncation)]
        let latency_ms = start.elapsed().as_millis() as u64;

        if !resp.status().is_success() {
            let status = resp.status();
            warn!("Generator API returned HTTP {status}");
            return Err(GenError::RequestFailed(format!("HTTP {status}")));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| GenError::ParseError(e.to_string()))?;

        Ok(GenResponse {
            text: json["choices"][0]["message"]["content"]
                .as_str()
                .unwrap_or("")
                .to_string(),
            latency_ms,
            model: self.model.clone(),
        })
    }
}

impl GenerateText for GeneratorClient {
    async fn generate(&self, request: &GenRequest) -> Result<GenResponse, GenError> {
        match &self.provider {
            GeneratorProvider::None => Err(GenError::Unavailable(
                "No generator provider configured".into(),
            )),
            GeneratorProvider::Ollama { base_url } => {
                self.generate_ollama(base_url, request).await
            }
            GeneratorProvider::OpenAiCompatible { base_url, api_key } => {
                self.generate_openai(base_url, api_key, request).await
            }
        }
    }

    fn is_available(&self) -> bool {
        !matches!(self.provider, GeneratorProvider::None)
    }
}

/// Map a reqwest send error, preserving the configured timeout in the
/// `Timeout` variant.
fn map_send_error(err: reqwest::Error, timeout_ms: u64) -> GenError {
    if err.is_timeout() {
        GenError::Timeout(timeout_ms)
    } else {
        GenError::from(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_client_is_unavailable() {
        let client = GeneratorClient::none();
        assert!(!client.is_available());
    }

    #[tokio::test]
    async fn none_client_fails_fast() {
        let client = GeneratorClient::none();
        let request = GenRequest::scenario("system", "user");
        let err = client.generate(&request).await.expect_err("should fail");
        assert!(matches!(err, GenError::Unavailable(_)));
    }

    #[test]
    fn unknown_provider_degrades_to_none() {
        let config = GeneratorConfig {
            provider: "quantum".to_string(),
            ..GeneratorConfig::default()
        };
        let client = GeneratorClient::from_config(&config);
        assert!(!client.is_available());
    }

    #[test]
    fn known_providers_are_available() {
        let config = GeneratorConfig {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            ..GeneratorConfig::default()
        };
        assert!(GeneratorClient::from_config(&config).is_available());
    }
}
