//! The profile store boundary.
//!
//! Durable storage is an external collaborator: one record per place
//! identity, upsert semantics, keys pre-normalized by [`PlaceKey`]. The
//! trait is the narrow interface the service depends on; the in-memory
//! implementation serves development and tests. Store failures are the
//! only errors the service surfaces to callers.

use atlas_core::error::Result;
use atlas_core::types::{PlaceKey, PlaceProfile};
use dashmap::DashMap;

/// Durable storage for place profiles, keyed by normalized identity.
#[allow(async_fn_in_trait)]
pub trait ProfileStore {
    /// Read a profile, if the place has one.
    async fn get(&self, key: &PlaceKey) -> Result<Option<PlaceProfile>>;

    /// Upsert a profile.
    async fn put(&self, key: &PlaceKey, profile: &PlaceProfile) -> Result<()>;

    /// The `limit` most-visited profiles, descending by visit count.
    async fn list_top_by_visits(&self, limit: usize) -> Result<Vec<PlaceProfile>>;
}

/// In-memory profile store backed by a concurrent map.
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: DashMap<PlaceKey, PlaceProfile>,
}

impl MemoryProfileStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored profiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl ProfileStore for MemoryProfileStore {
    async fn get(&self, key: &PlaceKey) -> Result<Option<PlaceProfile>> {
        Ok(self.profiles.get(key).map(|entry| entry.value().clone()))
    }

    async fn put(&self, key: &PlaceKey, profile: &PlaceProfile) -> Result<()> {
        self.profiles.insert(key.clone(), profile.clone());
        Ok(())
    }

    async fn list_top_by_visits(&self, limit: usize) -> Result<Vec<PlaceProfile>> {
        let mut all: Vec<PlaceProfile> = self
            .profiles
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        // Descending by visits; name breaks ties so the ranking is stable.
        all.sort_by(|a, b| {
            b.visit_count
                .cmp(&a.visit_count)
                .then_with(|| a.name.cmp(&b.name))
        });
        all.truncate(limit);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::aggregate::default_profile;

    fn profile(name: &str, visits: u32) -> PlaceProfile {
        let mut p = default_profile(name, None, None);
        p.visit_count = visits;
        p
    }

    #[tokio::test]
    async fn get_of_unknown_place_is_none() {
        let store = MemoryProfileStore::new();
        let found = store.get(&PlaceKey::new("nowhere")).await.expect("get");
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = MemoryProfileStore::new();
        let key = PlaceKey::new("Oslo");
        let p = profile("Oslo", 3);

        store.put(&key, &p).await.expect("put");
        let found = store.get(&key).await.expect("get").expect("present");
        assert_eq!(found, p);
    }

    #[tokio::test]
    async fn put_is_an_upsert() {
        let store = MemoryProfileStore::new();
        let key = PlaceKey::new("Oslo");

        store.put(&key, &profile("Oslo", 1)).await.expect("put");
        store.put(&key, &profile("Oslo", 2)).await.expect("put");

        assert_eq!(store.len(), 1);
        let found = store.get(&key).await.expect("get").expect("present");
        assert_eq!(found.visit_count, 2);
    }

    #[tokio::test]
    async fn top_by_visits_ranks_and_limits() {
        let store = MemoryProfileStore::new();
        for (name, visits) in [("Oslo", 5), ("Lima", 9), ("Dakar", 1), ("Quito", 9)] {
            store
                .put(&PlaceKey::new(name), &profile(name, visits))
                .await
                .expect("put");
        }

        let top = store.list_top_by_visits(3).await.expect("list");
        assert_eq!(top.len(), 3);
        // Lima and Quito tie at 9; names break the tie alphabetically.
        assert_eq!(top[0].name, "Lima");
        assert_eq!(top[1].name, "Quito");
        assert_eq!(top[2].name, "Oslo");
    }
}
