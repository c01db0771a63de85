//! Configuration for the atlas core and its collaborators.
//!
//! Maps directly to `atlas.toml`; every field has a serde default so a
//! partial file (or none at all) yields a working configuration.

use serde::{Deserialize, Serialize};

/// Top-level atlas configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AtlasConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Emotion aggregation tuning.
    #[serde(default)]
    pub aggregate: AggregateTuning,
    /// Cache sizing and TTLs.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Generative upstream settings.
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Scenario validation and sanitization bounds.
    #[serde(default)]
    pub scenario: ScenarioConfig,
}

impl AtlasConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `AtlasError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::AtlasError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Whether scenario generation is enabled (off = fallback-only).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: "info".to_string(),
        }
    }
}

/// Tuning for the adaptive-rate profile merge.
///
/// The defaults are the production constants; see `aggregate` for the
/// formula.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateTuning {
    /// Learning rate for a never-visited place.
    #[serde(default = "default_base_rate")]
    pub base_rate: f32,
    /// Floor below which the rate never drops.
    #[serde(default = "default_min_rate")]
    pub min_rate: f32,
    /// Visit-count damping factor.
    #[serde(default = "default_visit_damping")]
    pub visit_damping: f32,
}

impl Default for AggregateTuning {
    fn default() -> Self {
        Self {
            base_rate: 0.15,
            min_rate: 0.05,
            visit_damping: 0.1,
        }
    }
}

/// Cache sizing and TTLs, one block per named cache instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Scenario cache: entries.
    #[serde(default = "default_200")]
    pub scenario_capacity: usize,
    /// Scenario cache: seconds a generated (or fallback) result is reused.
    #[serde(default = "default_300")]
    pub scenario_ttl_secs: u64,
    /// Profile cache: entries.
    #[serde(default = "default_500")]
    pub profile_capacity: usize,
    /// Profile cache: seconds a store read is reused.
    #[serde(default = "default_60")]
    pub profile_ttl_secs: u64,
    /// Overview snapshot: seconds the ranked listing is reused.
    #[serde(default = "default_30")]
    pub overview_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            scenario_capacity: 200,
            scenario_ttl_secs: 300,
            profile_capacity: 500,
            profile_ttl_secs: 60,
            overview_ttl_secs: 30,
        }
    }
}

/// Generative upstream configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Provider: "openai", "ollama", "none".
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Base URL for the generator API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key for hosted providers.
    #[serde(default)]
    pub api_key: String,
    /// Hard timeout for any single generation attempt, in milliseconds.
    #[serde(default = "default_10000")]
    pub request_timeout_ms: u64,
    /// Max retries after the first attempt before falling back.
    #[serde(default = "default_2")]
    pub max_retries: u32,
    /// Base backoff delay between attempts, in milliseconds. The delay
    /// before retry *n* (counted from 0) is `backoff_base_ms * 2^n`.
    #[serde(default = "default_500_u64")]
    pub backoff_base_ms: u64,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum output tokens.
    #[serde(default = "default_400")]
    pub max_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: String::new(),
            request_timeout_ms: 10_000,
            max_retries: 2,
            backoff_base_ms: 500,
            temperature: 0.8,
            max_tokens: 400,
        }
    }
}

/// Scenario validation and sanitization bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Minimum number of choices a valid scenario carries.
    #[serde(default = "default_2_usize")]
    pub min_choices: usize,
    /// Maximum number of choices a valid scenario carries.
    #[serde(default = "default_4_usize")]
    pub max_choices: usize,
    /// Maximum characters any free-text field may reach after sanitization.
    #[serde(default = "default_500_usize")]
    pub max_text_length: usize,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            min_choices: 2,
            max_choices: 4,
            max_text_length: 500,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_provider() -> String { "openai".to_string() }
fn default_base_url() -> String { "https://api.openai.com".to_string() }
fn default_model() -> String { "gpt-4o-mini".to_string() }
fn default_base_rate() -> f32 { 0.15 }
fn default_min_rate() -> f32 { 0.05 }
fn default_visit_damping() -> f32 { 0.1 }
fn default_temperature() -> f32 { 0.8 }
fn default_2() -> u32 { 2 }
fn default_2_usize() -> usize { 2 }
fn default_4_usize() -> usize { 4 }
fn default_30() -> u64 { 30 }
fn default_60() -> u64 { 60 }
fn default_200() -> usize { 200 }
fn default_300() -> u64 { 300 }
fn default_400() -> u32 { 400 }
fn default_500() -> usize { 500 }
fn default_500_u64() -> u64 { 500 }
fn default_500_usize() -> usize { 500 }
fn default_10000() -> u64 { 10_000 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = AtlasConfig::from_toml("").expect("empty config should parse");
        assert!(config.general.enabled);
        assert!((config.aggregate.base_rate - 0.15).abs() < 1e-6);
        assert_eq!(config.generator.max_retries, 2);
        assert_eq!(config.scenario.max_text_length, 500);
    }

    #[test]
    fn partial_toml_overrides_one_section() {
        let config = AtlasConfig::from_toml(
            r#"
            [cache]
            scenario_ttl_secs = 120

            [generator]
            provider = "ollama"
            base_url = "http://localhost:11434"
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.cache.scenario_ttl_secs, 120);
        assert_eq!(config.cache.scenario_capacity, 200); // untouched default
        assert_eq!(config.generator.provider, "ollama");
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = AtlasConfig::from_toml("[cache\nbroken").expect_err("should fail");
        assert!(matches!(err, crate::AtlasError::Config(_)));
    }
}
