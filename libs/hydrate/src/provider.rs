//! Provider trait for custom lookup implementations
//!
//! A provider maps a key value to the entity it identifies, typically by
//! querying a database or a remote API. Each registered model carries one.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::future::Future;

/// Outcome of a provider lookup.
///
/// * `Ok(Some(entity))` - resolved
/// * `Ok(None)` - no match; the reference is left as is
/// * `Err(_)` - lookup failed; handled according to the configured policy
pub type ProviderResult = anyhow::Result<Option<Value>>;

/// Trait for resolving a key value to an entity.
///
/// Closures of the form `Fn(Value) -> impl Future<Output = ProviderResult>`
/// implement this trait, so most callers never name it:
///
/// ```rust
/// use friendly_hydrate::{ModelConfig, ModelRegistry};
/// use serde_json::{json, Value};
///
/// let mut registry = ModelRegistry::new();
/// registry
///     .create_model(
///         ModelConfig::new("author")
///             .key("id")
///             .provider(|key: Value| async move {
///                 anyhow::Ok(Some(json!({ "id": key, "name": "Steve McConnel" })))
///             }),
///     )
///     .unwrap();
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Resolve a key value (or, for keyless models, the whole reference).
    async fn provide(&self, key: &Value) -> ProviderResult;
}

#[async_trait]
impl<F, Fut> Provider for F
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = ProviderResult> + Send + 'static,
{
    async fn provide(&self, key: &Value) -> ProviderResult {
        (self)(key.clone()).await
    }
}

/// In-memory provider backed by a fixed table of entities.
///
/// Entries are keyed by the key value's string form: string keys by their
/// content, everything else by its JSON rendering (so `19237` and `"19237"`
/// address the same entity).
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    entities: Map<String, Value>,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object of `key -> entity`.
    pub fn from_map(entities: Map<String, Value>) -> Self {
        Self { entities }
    }

    pub fn insert(&mut self, key: impl Into<String>, entity: Value) -> &mut Self {
        self.entities.insert(key.into(), entity);
        self
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    fn lookup_key(key: &Value) -> String {
        match key {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[async_trait]
impl Provider for StaticProvider {
    async fn provide(&self, key: &Value) -> ProviderResult {
        Ok(self.entities.get(&Self::lookup_key(key)).cloned())
    }
}
