//! The hydration entry point.
//!
//! [`Hydrator`] pairs a frozen [`ModelRegistry`] with a [`HydrateConfig`]. The
//! traversal engines live in `expand.rs` and `collapse.rs` as further `impl`
//! blocks on this type.

use crate::cache::ResolutionCache;
use crate::config::HydrateConfig;
use crate::error::{Error, Result};
use crate::model::Model;
use crate::registry::ModelRegistry;
use serde_json::Value;
use std::sync::Arc;

/// Expands and collapses documents against a model registry.
///
/// Cheap to clone; the registry is shared.
#[derive(Debug, Clone)]
pub struct Hydrator {
    pub(crate) registry: Arc<ModelRegistry>,
    pub(crate) config: HydrateConfig,
}

impl Hydrator {
    pub fn new(registry: impl Into<Arc<ModelRegistry>>) -> Self {
        Self::with_config(registry, HydrateConfig::default())
    }

    /// Build a hydrator with explicit settings.
    ///
    /// `require_key` is enforced at registration, so build the registry with
    /// [`ModelRegistry::from_config`]. Keyless models already present in a
    /// registry that does not enforce it are reported here.
    pub fn with_config(registry: impl Into<Arc<ModelRegistry>>, config: HydrateConfig) -> Self {
        let registry = registry.into();
        if config.require_key && !registry.requires_key() {
            for model in registry.models().filter(|m| m.is_keyless()) {
                tracing::warn!(
                    model = %model.name(),
                    "Keyless model registered without require_key enforcement"
                );
            }
        }
        Self { registry, config }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn config(&self) -> &HydrateConfig {
        &self.config
    }

    /// A fresh cache sized per this hydrator's configuration, for callers that
    /// chain several [`expand_with_cache`](Self::expand_with_cache) calls.
    pub fn new_cache(&self) -> ResolutionCache {
        ResolutionCache::from_config(&self.config)
    }

    /// Validate call arguments and resolve the target model.
    pub(crate) fn begin(
        &self,
        operation: &'static str,
        model_name: &str,
        document: &Value,
    ) -> Result<Arc<Model>> {
        if model_name.trim().is_empty() {
            return Err(Error::MissingModelName);
        }
        if document.is_null() {
            return Err(Error::MissingDocument(operation));
        }
        self.registry.get_model(model_name)
    }

    /// Candidate child fields for one document: the model's children and their
    /// aliases, plus the addressing path itself when one is used.
    pub(crate) fn candidate_keys(&self, model: &Model, path: Option<&str>) -> Result<Vec<String>> {
        let mut keys = self.registry.child_keys(model)?;
        if let Some(path) = path {
            if !keys.iter().any(|k| k == path) {
                keys.push(path.to_string());
            }
        }
        Ok(keys)
    }
}

/// Trim a caller-supplied path; blank paths address the whole document.
pub(crate) fn normalize_path(path: Option<&str>) -> Option<&str> {
    path.map(str::trim).filter(|p| !p.is_empty())
}
