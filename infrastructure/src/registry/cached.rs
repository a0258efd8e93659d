//! Cached model registry.
//!
//! Serves [`ModelRegistry`] reads from a snapshot fetched out of band
//! from a [`CatalogSource`]. Expiry is explicit: callers check
//! [`is_expired`](CachedModelRegistry::is_expired) and call
//! [`refresh`](CachedModelRegistry::refresh) at a point where awaiting is
//! acceptable — the read path never blocks on the network. Time comes
//! from an injected [`Clock`], so expiry is deterministic under test.

use super::clock::Clock;
use async_trait::async_trait;
use flare_domain::{ModelId, ModelInfo, ModelRegistry};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::info;

/// Errors from a catalog fetch
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog fetch failed: {0}")]
    Fetch(String),
}

/// Upstream source of the model catalog
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<ModelInfo>, CatalogError>;
}

struct CacheState {
    entries: Vec<ModelInfo>,
    fetched_at: Option<Instant>,
}

/// Registry backed by a refreshable catalog snapshot
pub struct CachedModelRegistry {
    source: Arc<dyn CatalogSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    state: RwLock<CacheState>,
}

impl CachedModelRegistry {
    pub fn new(source: Arc<dyn CatalogSource>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            source,
            clock,
            ttl,
            state: RwLock::new(CacheState {
                entries: Vec::new(),
                fetched_at: None,
            }),
        }
    }

    /// Whether the snapshot is missing or older than the TTL
    pub fn is_expired(&self) -> bool {
        let state = self.state.read().expect("registry lock poisoned");
        match state.fetched_at {
            None => true,
            Some(at) => self.clock.now().duration_since(at) >= self.ttl,
        }
    }

    /// Fetch the catalog and replace the snapshot
    pub async fn refresh(&self) -> Result<(), CatalogError> {
        let entries = self.source.fetch().await?;
        info!("Model catalog refreshed: {} models", entries.len());
        let mut state = self.state.write().expect("registry lock poisoned");
        state.entries = entries;
        state.fetched_at = Some(self.clock.now());
        Ok(())
    }

    /// Refresh only when expired; returns whether a fetch happened
    pub async fn refresh_if_expired(&self) -> Result<bool, CatalogError> {
        if self.is_expired() {
            self.refresh().await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Current snapshot
    pub fn get(&self) -> Vec<ModelInfo> {
        self.state
            .read()
            .expect("registry lock poisoned")
            .entries
            .clone()
    }
}

impl ModelRegistry for CachedModelRegistry {
    fn contains(&self, id: &ModelId) -> bool {
        self.state
            .read()
            .expect("registry lock poisoned")
            .entries
            .iter()
            .any(|e| &e.id == id)
    }

    fn supports_temperature(&self, id: &ModelId) -> bool {
        self.state
            .read()
            .expect("registry lock poisoned")
            .entries
            .iter()
            .find(|e| &e.id == id)
            .map(|e| e.supports_temperature)
            .unwrap_or(false)
    }

    fn models(&self) -> Vec<ModelInfo> {
        self.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // ==================== Test Mocks ====================

    struct ManualClock {
        now: Mutex<Instant>,
    }

    impl ManualClock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                now: Mutex::new(Instant::now()),
            })
        }

        fn advance(&self, by: Duration) {
            let mut now = self.now.lock().unwrap();
            *now += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            *self.now.lock().unwrap()
        }
    }

    struct FixedCatalog {
        fetches: Mutex<usize>,
    }

    impl FixedCatalog {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                fetches: Mutex::new(0),
            })
        }

        fn fetch_count(&self) -> usize {
            *self.fetches.lock().unwrap()
        }
    }

    #[async_trait]
    impl CatalogSource for FixedCatalog {
        async fn fetch(&self) -> Result<Vec<ModelInfo>, CatalogError> {
            *self.fetches.lock().unwrap() += 1;
            Ok(vec![ModelInfo::new("mistral")])
        }
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_starts_expired_and_empty() {
        let registry = CachedModelRegistry::new(
            FixedCatalog::new(),
            ManualClock::new(),
            Duration::from_secs(300),
        );
        assert!(registry.is_expired());
        assert!(!registry.contains(&ModelId::new("mistral")));
    }

    #[tokio::test]
    async fn test_refresh_populates_snapshot() {
        let registry = CachedModelRegistry::new(
            FixedCatalog::new(),
            ManualClock::new(),
            Duration::from_secs(300),
        );
        registry.refresh().await.unwrap();
        assert!(!registry.is_expired());
        assert!(registry.contains(&ModelId::new("mistral")));
        assert_eq!(registry.models().len(), 1);
    }

    #[tokio::test]
    async fn test_expiry_follows_the_injected_clock() {
        let clock = ManualClock::new();
        let registry = CachedModelRegistry::new(
            FixedCatalog::new(),
            Arc::clone(&clock) as Arc<dyn Clock>,
            Duration::from_secs(300),
        );
        registry.refresh().await.unwrap();
        assert!(!registry.is_expired());

        clock.advance(Duration::from_secs(299));
        assert!(!registry.is_expired());

        clock.advance(Duration::from_secs(1));
        assert!(registry.is_expired());
    }

    #[tokio::test]
    async fn test_refresh_if_expired_skips_fresh_snapshot() {
        let clock = ManualClock::new();
        let catalog = FixedCatalog::new();
        let registry = CachedModelRegistry::new(
            Arc::clone(&catalog) as Arc<dyn CatalogSource>,
            Arc::clone(&clock) as Arc<dyn Clock>,
            Duration::from_secs(300),
        );

        assert!(registry.refresh_if_expired().await.unwrap());
        assert!(!registry.refresh_if_expired().await.unwrap());
        assert_eq!(catalog.fetch_count(), 1);

        clock.advance(Duration::from_secs(301));
        assert!(registry.refresh_if_expired().await.unwrap());
        assert_eq!(catalog.fetch_count(), 2);
    }
}
