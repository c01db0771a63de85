//! `GameService` — the operations the routing layer calls.
//!
//! One service instance per process, shared across requests. It owns the
//! profile and overview caches, the scenario pipeline (which owns its own
//! cache), and the registry that names all three for diagnostics.
//!
//! Error policy: generation can never fail (the pipeline resolves to
//! fallback internally); only store failures surface, and callers are
//! expected to show a generic retry prompt rather than detail.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use atlas_core::aggregate;
use atlas_core::cache::{BoundedCache, CacheRegistry, NamedCacheStats};
use atlas_core::config::AtlasConfig;
use atlas_core::error::{AtlasError, Result};
use atlas_core::types::{
    Coordinates, EmotionVector, PlaceKey, PlaceProfile, ProfileSummary,
};
use atlas_llm::client::GenerateText;
use atlas_llm::pipeline::ScenarioPipeline;
use atlas_llm::types::ScenarioResult;

use crate::display::mood_color;
use crate::rules::{self, PlaceRuling};
use crate::store::ProfileStore;

/// What the player gets back after a choice is folded in.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceOutcome {
    /// The updated profile.
    pub profile: PlaceProfile,
    /// Display color derived from the new dominant mood.
    pub color: &'static str,
}

/// The game-facing service: store + pipeline + caches.
pub struct GameService<S, G> {
    store: S,
    pipeline: ScenarioPipeline<G>,
    profile_cache: Arc<BoundedCache<PlaceProfile>>,
    overview_cache: Arc<BoundedCache<Vec<ProfileSummary>>>,
    registry: CacheRegistry,
}

impl<S: ProfileStore, G: GenerateText> GameService<S, G> {
    /// Wire a service from its collaborators and configuration.
    #[must_use]
    pub fn new(store: S, generator: G, config: &AtlasConfig) -> Self {
        let pipeline = ScenarioPipeline::new(generator, config);
        let profile_cache = Arc::new(BoundedCache::new(
            config.cache.profile_capacity,
            Duration::from_secs(config.cache.profile_ttl_secs),
        ));
        // Capacity one: the overview is a singleton whole-dataset snapshot.
        let overview_cache = Arc::new(BoundedCache::new(
            1,
            Duration::from_secs(config.cache.overview_ttl_secs),
        ));

        let registry = CacheRegistry::new();
        registry.register("scenarios", pipeline.cache_handle());
        registry.register("profiles", profile_cache.clone());
        registry.register("overview", overview_cache.clone());

        Self {
            store,
            pipeline,
            profile_cache,
            overview_cache,
            registry,
        }
    }

    /// Validate a candidate place name against the chain position.
    #[must_use]
    pub fn validate_place(
        &self,
        name: &str,
        previous: Option<&str>,
        used: &HashSet<PlaceKey>,
    ) -> PlaceRuling {
        rules::validate_place(name, previous, used)
    }

    /// Produce a scenario for a place, plus the profile snapshot it was
    /// conditioned on.
    ///
    /// The profile read goes through the profile cache; the scenario
    /// itself is cached inside the pipeline. A place seen for the first
    /// time gets a fresh default profile — it is not persisted until the
    /// player actually makes a choice.
    ///
    /// # Errors
    /// Only store failures, or a name that normalizes to nothing.
    pub async fn generate_scenario(
        &self,
        name: &str,
        region: Option<String>,
        coords: Option<Coordinates>,
    ) -> Result<(ScenarioResult, PlaceProfile)> {
        let key = PlaceKey::new(name);
        if key.is_empty() {
            return Err(AtlasError::InvalidPlace(name.to_string()));
        }

        let profile = self.profile_for(&key, name, region, coords).await?;
        let scenario = self.pipeline.scenario_for(&profile, &key).await;
        Ok((scenario, profile))
    }

    /// Fold a chosen option's emotion vector into the place profile and
    /// write it through.
    ///
    /// On success the scenario and profile caches for this key are
    /// invalidated and the overview snapshot is dropped, so the next read
    /// sees the new collective state.
    ///
    /// # Errors
    /// Only store failures, or a name that normalizes to nothing. A store
    /// write failure means the merge was lost; the caller shows a generic
    /// retry prompt (availability over strict profile consistency).
    pub async fn submit_choice(
        &self,
        name: &str,
        choice_id: &str,
        emotions: &EmotionVector,
    ) -> Result<ChoiceOutcome> {
        let key = PlaceKey::new(name);
        if key.is_empty() {
            return Err(AtlasError::InvalidPlace(name.to_string()));
        }

        let mut profile = match self.store.get(&key).await? {
            Some(profile) => profile,
            None => aggregate::default_profile(name.trim(), None, None),
        };
        aggregate::apply_choice(&mut profile, emotions, Utc::now());
        debug!(
            place = %key,
            choice = choice_id,
            dominant = %profile.dominant,
            visits = profile.visit_count,
            "choice folded into profile"
        );

        self.store.put(&key, &profile).await?;

        self.profile_cache.remove(key.as_str());
        self.pipeline.invalidate(&key);
        self.overview_cache.clear();

        Ok(ChoiceOutcome {
            color: mood_color(profile.dominant),
            profile,
        })
    }

    /// Read a profile, or `None` for an unknown place.
    ///
    /// # Errors
    /// Only store failures.
    pub async fn read_profile(&self, name: &str) -> Result<Option<PlaceProfile>> {
        let key = PlaceKey::new(name);
        if key.is_empty() {
            return Ok(None);
        }
        if let Some(profile) = self.profile_cache.get(key.as_str()) {
            return Ok(Some(profile));
        }
        let found = self.store.get(&key).await?;
        if let Some(profile) = &found {
            self.profile_cache.insert(key.as_str(), profile.clone());
        }
        Ok(found)
    }

    /// Ranked profile summaries for the overview map, behind the
    /// capacity-one snapshot cache.
    ///
    /// # Errors
    /// Only store failures.
    pub async fn overview(&self, limit: usize) -> Result<Vec<ProfileSummary>> {
        let cache_key = format!("top{limit}");
        if let Some(snapshot) = self.overview_cache.get(&cache_key) {
            return Ok(snapshot);
        }
        let ranked = self.store.list_top_by_visits(limit).await?;
        let summaries: Vec<ProfileSummary> = ranked.iter().map(ProfileSummary::from).collect();
        self.overview_cache.insert(cache_key, summaries.clone());
        Ok(summaries)
    }

    /// Diagnostic counters for every named cache.
    #[must_use]
    pub fn cache_stats(&self) -> Vec<NamedCacheStats> {
        self.registry.snapshot()
    }

    /// Read a profile through the cache, or a fresh default for a place
    /// with no record yet.
    async fn profile_for(
        &self,
        key: &PlaceKey,
        name: &str,
        region: Option<String>,
        coords: Option<Coordinates>,
    ) -> Result<PlaceProfile> {
        if let Some(profile) = self.profile_cache.get(key.as_str()) {
            return Ok(profile);
        }
        let profile = match self.store.get(key).await? {
            Some(profile) => profile,
            None => aggregate::default_profile(name.trim(), region, coords),
        };
        self.profile_cache.insert(key.as_str(), profile.clone());
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::types::Mood;
    use atlas_llm::client::GeneratorClient;

    use crate::store::MemoryProfileStore;

    fn service() -> GameService<MemoryProfileStore, GeneratorClient> {
        // No upstream: every scenario is fallback content, which is all
        // the service-level logic needs.
        GameService::new(
            MemoryProfileStore::new(),
            GeneratorClient::none(),
            &AtlasConfig::default(),
        )
    }

    #[tokio::test]
    async fn unknown_place_gets_default_snapshot_without_persisting() {
        let service = service();
        let (scenario, profile) = service
            .generate_scenario("Oslo", Some("Norway".into()), None)
            .await
            .expect("generate");

        assert!(!scenario.generated);
        assert_eq!(profile.visit_count, 0);
        assert_eq!(profile.dominant, Mood::Neutral);
        assert!(service.store.is_empty(), "profile not written until a choice");
    }

    #[tokio::test]
    async fn submit_choice_creates_and_updates_the_profile() {
        let service = service();
        let choice = EmotionVector::new(1.0, 0.0, 0.0, 0.0, 0.8);

        let outcome = service
            .submit_choice("Oslo", "a", &choice)
            .await
            .expect("submit");

        assert_eq!(outcome.profile.visit_count, 1);
        assert_eq!(outcome.profile.dominant, Mood::Warmth);
        assert_eq!(outcome.color, mood_color(Mood::Warmth));

        let stored = service
            .read_profile("oslo")
            .await
            .expect("read")
            .expect("present");
        assert_eq!(stored, outcome.profile);
    }

    #[tokio::test]
    async fn key_normalization_unifies_spellings() {
        let service = service();
        let choice = EmotionVector::new(0.0, 0.0, 1.0, 0.0, 0.0);

        service.submit_choice("  New   York ", "a", &choice).await.expect("submit");
        service.submit_choice("new york", "b", &choice).await.expect("submit");

        let profile = service
            .read_profile("NEW YORK")
            .await
            .expect("read")
            .expect("present");
        assert_eq!(profile.visit_count, 2);
    }

    #[tokio::test]
    async fn empty_name_is_rejected() {
        let service = service();
        let err = service
            .generate_scenario("   ", None, None)
            .await
            .expect_err("should reject");
        assert!(matches!(err, AtlasError::InvalidPlace(_)));

        assert!(service.read_profile(" ").await.expect("read").is_none());
    }

    #[tokio::test]
    async fn submit_invalidates_cached_profile() {
        let service = service();
        let choice = EmotionVector::new(1.0, 0.0, 0.0, 0.0, 0.0);

        // Warm the profile cache with the default snapshot.
        service.generate_scenario("Oslo", None, None).await.expect("generate");
        service.submit_choice("Oslo", "a", &choice).await.expect("submit");

        // The next read must see the merged profile, not the cached default.
        let profile = service
            .read_profile("Oslo")
            .await
            .expect("read")
            .expect("present");
        assert_eq!(profile.visit_count, 1);
    }

    #[tokio::test]
    async fn overview_snapshot_refreshes_after_a_choice() {
        let service = service();
        let choice = EmotionVector::new(1.0, 0.0, 0.0, 0.0, 0.0);

        service.submit_choice("Oslo", "a", &choice).await.expect("submit");
        let first = service.overview(10).await.expect("overview");
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].visit_count, 1);

        service.submit_choice("Oslo", "a", &choice).await.expect("submit");
        let second = service.overview(10).await.expect("overview");
        assert_eq!(second[0].visit_count, 2, "snapshot was invalidated");
    }

    #[tokio::test]
    async fn cache_stats_names_all_three_caches() {
        let service = service();
        service.generate_scenario("Oslo", None, None).await.expect("generate");

        let stats = service.cache_stats();
        let names: Vec<&str> = stats.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["overview", "profiles", "scenarios"]);

        let scenarios = &stats[2];
        assert_eq!(scenarios.stats.size, 1, "scenario was cached");
    }
}
