//! Per-call resolution cache
//!
//! Memoizes `(model, key value)` lookups for the lifetime of one expand call
//! tree so the same reference is never fetched twice. Each slot is a
//! [`OnceCell`], which also collapses concurrent lookups of the same pair into
//! a single provider call. Failed lookups leave their slot empty.

use crate::config::HydrateConfig;
use lru::LruCache;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    model: String,
    value: String,
}

impl CacheKey {
    fn new(model: &str, value: &Value) -> Self {
        Self {
            model: model.to_lowercase(),
            // JSON rendering keeps `1` and `"1"` distinct
            value: value.to_string(),
        }
    }
}

pub(crate) type Slot = Arc<OnceCell<Option<Value>>>;

/// Memoized `(model, key value) -> entity` lookups for one call tree.
///
/// A resolved `None` ("no match") is cached as well.
pub struct ResolutionCache {
    slots: Mutex<LruCache<CacheKey, Slot>>,
}

impl ResolutionCache {
    /// Unbounded cache.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(LruCache::unbounded()),
        }
    }

    /// Cache holding at most `capacity` entries (least recently used evicted first).
    /// A capacity of zero yields an unbounded cache.
    pub fn with_capacity(capacity: usize) -> Self {
        match NonZeroUsize::new(capacity) {
            Some(cap) => Self {
                slots: Mutex::new(LruCache::new(cap)),
            },
            None => Self::new(),
        }
    }

    pub fn from_config(config: &HydrateConfig) -> Self {
        match config.cache_capacity {
            Some(capacity) => Self::with_capacity(capacity),
            None => Self::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<CacheKey, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The slot for a pair, created empty on first use.
    pub(crate) fn slot(&self, model: &str, key: &Value) -> Slot {
        let mut slots = self.lock();
        slots
            .get_or_insert(CacheKey::new(model, key), || Arc::new(OnceCell::new()))
            .clone()
    }

    /// Resolved entry for a pair: `Some(entity_or_none)` on a hit, `None` on a miss.
    pub fn get(&self, model: &str, key: &Value) -> Option<Option<Value>> {
        let mut slots = self.lock();
        slots
            .get(&CacheKey::new(model, key))
            .and_then(|slot| slot.get().cloned())
    }

    /// Store a resolved entry unless the pair is already resolved.
    pub fn insert(&self, model: &str, key: &Value, entity: Option<Value>) {
        let slot = self.slot(model, key);
        let _ = slot.set(entity);
    }

    /// Number of resolved entries.
    pub fn len(&self) -> usize {
        self.lock()
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl Default for ResolutionCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ResolutionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionCache")
            .field("resolved", &self.len())
            .finish()
    }
}
