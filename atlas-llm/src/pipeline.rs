//! Scenario pipeline — retry, backoff, validation, fallback, caching.
//!
//! Per request the pipeline walks an explicit attempt-indexed state
//! machine:
//!
//! ```text
//! BUILD_PROMPT → CALL(attempt) → valid ────────────────▶ DONE
//!                     │
//!                     └ error / invalid content
//!                         │ attempt < max: sleep base·2ⁿ, CALL(attempt+1)
//!                         └ exhausted ─────────────────▶ FALLBACK
//! ```
//!
//! Backoff is applied only between attempts — never before the first call
//! and never after exhaustion. Invalid content and transport errors are
//! indistinguishable to the loop. The caller can never observe a failure:
//! the result is either accepted generated content or fallback content,
//! and either way it is cached under the place key so a flapping upstream
//! is not hammered.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use atlas_core::cache::BoundedCache;
use atlas_core::config::{AtlasConfig, GeneratorConfig, ScenarioConfig};
use atlas_core::types::{Emotion, EmotionVector, PlaceKey, PlaceProfile};

use crate::client::GenerateText;
use crate::error::GenError;
use crate::fallback::fallback_scenario;
use crate::prompt::{PromptEngine, PromptId};
use crate::sanitize::sanitize;
use crate::types::{GenRequest, ScenarioResult};
use crate::validate;

/// Max characters of a place name or region woven into a prompt.
const PROMPT_NAME_MAX: usize = 80;

/// Retry and backoff policy for generation attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt (2 ⇒ three total attempts).
    pub max_retries: u32,
    /// Base backoff delay; the delay before retry *n* (from 0) is
    /// `backoff_base * 2^n`.
    pub backoff_base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Build from generator configuration.
    #[must_use]
    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
        }
    }

    /// Total number of calls the policy allows.
    #[must_use]
    pub fn total_attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delay before the given retry (0-indexed): `base * 2^retry`.
    #[must_use]
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        self.backoff_base * 2u32.saturating_pow(retry)
    }
}

/// Orchestrates scenario generation against an injected upstream.
pub struct ScenarioPipeline<G> {
    generator: G,
    policy: RetryPolicy,
    bounds: ScenarioConfig,
    prompts: PromptEngine,
    timeout_ms: u64,
    enabled: bool,
    cache: Arc<BoundedCache<ScenarioResult>>,
}

impl<G: GenerateText> ScenarioPipeline<G> {
    /// Create a pipeline with the built-in prompt templates.
    #[must_use]
    pub fn new(generator: G, config: &AtlasConfig) -> Self {
        Self::with_prompts(generator, config, PromptEngine::builtin())
    }

    /// Create a pipeline with explicit prompt templates.
    #[must_use]
    pub fn with_prompts(generator: G, config: &AtlasConfig, prompts: PromptEngine) -> Self {
        let cache = Arc::new(BoundedCache::new(
            config.cache.scenario_capacity,
            Duration::from_secs(config.cache.scenario_ttl_secs),
        ));
        Self {
            generator,
            policy: RetryPolicy::from_config(&config.generator),
            bounds: config.scenario.clone(),
            prompts,
            timeout_ms: config.generator.request_timeout_ms,
            enabled: config.general.enabled,
            cache,
        }
    }

    /// Handle to the scenario cache, for registry registration.
    #[must_use]
    pub fn cache_handle(&self) -> Arc<BoundedCache<ScenarioResult>> {
        Arc::clone(&self.cache)
    }

    /// Drop the cached scenario for a place (after its profile changed).
    pub fn invalidate(&self, key: &PlaceKey) {
        self.cache.remove(key.as_str());
    }

    /// Produce a scenario for a place. Infallible: the result is either
    /// accepted generated content or fallback content.
    ///
    /// A cache hit skips prompt construction, the network call, and
    /// validation entirely and returns the previously accepted (or
    /// previously chosen fallback) result unchanged for the TTL window.
    pub async fn scenario_for(&self, profile: &PlaceProfile, key: &PlaceKey) -> ScenarioResult {
        if let Some(hit) = self.cache.get(key.as_str()) {
            debug!(place = %key, "scenario cache hit");
            return hit;
        }
        let result = self.run(profile, key).await;
        self.cache.insert(key.as_str(), result.clone());
        result
    }

    /// The uncached path: attempts, backoff, fallback.
    async fn run(&self, profile: &PlaceProfile, key: &PlaceKey) -> ScenarioResult {
        if !self.enabled || !self.generator.is_available() {
            debug!(place = %key, "generator disabled or unavailable, serving fallback");
            return fallback_scenario(&profile.name, key);
        }

        let request = match self.build_request(profile) {
            Ok(request) => request,
            Err(e) => {
                warn!(place = %key, error = %e, "prompt construction failed, serving fallback");
                return fallback_scenario(&profile.name, key);
            }
        };

        let request_id = Uuid::new_v4();
        let mut last_error: Option<GenError> = None;
        for attempt in 0..self.policy.total_attempts() {
            if attempt > 0 {
                let delay = self.policy.delay_before_retry(attempt - 1);
                debug!(%request_id, attempt, ?delay, "backing off before retry");
                tokio::time::sleep(delay).await;
            }

            match self.attempt(&request).await {
                Ok(result) => {
                    debug!(%request_id, place = %key, attempt, "accepted generated scenario");
                    return result;
                }
                Err(e) => {
                    warn!(%request_id, place = %key, attempt, error = %e, "generation attempt failed");
                    last_error = Some(e);
                }
            }
        }

        let exhausted = GenError::RetriesExhausted {
            attempts: self.policy.total_attempts(),
            last_error: last_error.map_or_else(String::new, |e| e.to_string()),
        };
        warn!(place = %key, error = %exhausted, "serving fallback scenario");
        fallback_scenario(&profile.name, key)
    }

    /// One CALL state: upstream call, parse, structural gate.
    async fn attempt(&self, request: &GenRequest) -> Result<ScenarioResult, GenError> {
        let response = self.generator.generate(request).await?;
        let raw = validate::parse_raw(&response.text)?;
        validate::accept(&raw, &self.bounds)
    }

    /// BUILD_PROMPT state: render templates conditioned on the profile.
    fn build_request(&self, profile: &PlaceProfile) -> Result<GenRequest, GenError> {
        let id = if profile.visit_count == 0 {
            PromptId::ScenarioFirstVisit
        } else {
            PromptId::Scenario
        };

        // Place names and regions originate from player input and geodata;
        // they are sanitized before they can steer the prompt.
        let place = sanitize(&profile.name, PROMPT_NAME_MAX);
        let region_clause = profile.region.as_ref().map_or_else(String::new, |r| {
            let region = sanitize(r, PROMPT_NAME_MAX);
            if region.is_empty() { String::new() } else { format!(", {region}") }
        });
        let summary = profile_summary(&profile.emotions);
        let visits = profile.visit_count.to_string();

        let vars = [
            ("place", place.as_str()),
            ("region_clause", region_clause.as_str()),
            ("profile_summary", summary.as_str()),
            ("dominant", profile.dominant.name()),
            ("visit_count", visits.as_str()),
        ];
        let (system, user) = self.prompts.render(id, &vars)?;
        let tpl = self
            .prompts
            .get(id)
            .ok_or_else(|| GenError::Config(format!("prompt template '{id}' not loaded")))?;

        Ok(GenRequest::scenario(system, user)
            .with_timeout(self.timeout_ms)
            .with_max_tokens(tpl.max_tokens)
            .with_temperature(tpl.temperature))
    }
}

/// "warmth 0.62, loneliness 0.41, ..." — the profile as prompt text.
fn profile_summary(vector: &EmotionVector) -> String {
    Emotion::ALL
        .iter()
        .map(|&dim| format!("{dim} {:.2}", vector.get(dim)))
        .collect::<Vec<_>>()
        .join(", ")
}
