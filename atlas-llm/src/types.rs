//! Core types for generation requests, responses, and scenario results.

use atlas_core::types::EmotionVector;
use serde::{Deserialize, Serialize};

/// A request to the generative upstream.
#[derive(Debug, Clone, Serialize)]
pub struct GenRequest {
    /// System prompt (narrator persona, rules, output contract).
    pub system: String,
    /// User prompt (place context, profile summary, instructions).
    pub user: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Temperature (0.0 = deterministic, 1.0 = creative).
    pub temperature: f32,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl GenRequest {
    /// Create a scenario-generation request with production defaults.
    #[must_use]
    pub fn scenario(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: 400,
            temperature: 0.8,
            timeout_ms: 10_000,
        }
    }

    /// Set the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the output token limit.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// A raw response from the generative upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct GenResponse {
    /// The generated text, expected (but not guaranteed) to be JSON.
    pub text: String,
    /// Latency in milliseconds.
    pub latency_ms: u64,
    /// Which model produced it.
    pub model: String,
}

// ---------------------------------------------------------------------------
// Wire shape — what the model is asked to return
// ---------------------------------------------------------------------------

/// The loose JSON shape the model is instructed to produce.
///
/// Parsing this is deliberately permissive — the structural gate in
/// `validate` decides what is acceptable, so a shape mismatch becomes a
/// retryable error instead of a panic.
#[derive(Debug, Clone, Deserialize)]
pub struct RawScenario {
    /// Narrative text.
    #[serde(default)]
    pub scenario: String,
    /// Offered choices.
    #[serde(default)]
    pub choices: Vec<RawChoice>,
    /// Tone label.
    #[serde(default)]
    pub tone: Option<String>,
}

/// One choice as returned by the model.
#[derive(Debug, Clone, Deserialize)]
pub struct RawChoice {
    /// Display text.
    #[serde(default)]
    pub text: String,
    /// Emotion scores, any JSON shape — normalized later.
    #[serde(default)]
    pub emotions: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Accepted result
// ---------------------------------------------------------------------------

/// One sanitized, normalized choice offered to the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioChoice {
    /// Stable positional id ("a".."d").
    pub id: String,
    /// Sanitized display text.
    pub text: String,
    /// Normalized emotion scores this choice would fold into the profile.
    pub emotions: EmotionVector,
}

/// A scenario ready to show: sanitized text, 2–4 choices, a tone label,
/// and whether it actually came from the upstream.
///
/// Ephemeral — never persisted; only a chosen option's emotion vector
/// survives into the place profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    /// Narrative text.
    pub scenario: String,
    /// Ordered choices.
    pub choices: Vec<ScenarioChoice>,
    /// Tone label (one short word).
    pub tone: String,
    /// False when this is static fallback content.
    pub generated: bool,
}
