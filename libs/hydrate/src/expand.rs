//! Expansion: replace foreign-key references with the entities they identify.
//!
//! One call expands exactly one level of children. Child fields of a document
//! are resolved one at a time in declaration order; the elements of an
//! array-valued child, and the elements of a collection, are resolved
//! concurrently. Every provider call goes through the call's
//! [`ResolutionCache`].

use crate::cache::ResolutionCache;
use crate::config::ProviderErrorPolicy;
use crate::error::{Error, Result};
use crate::hydrator::{normalize_path, Hydrator};
use crate::model::Model;
use crate::path::{self, Field};
use futures::future::{try_join_all, BoxFuture, FutureExt};
use serde_json::Value;
use std::sync::Arc;

impl Hydrator {
    /// Expand the children of `document` (or of the substructure at `path`).
    ///
    /// The caller's document is never modified. With a `path`, the result is a
    /// copy of the full document with only that substructure replaced; a path
    /// that does not resolve leaves the copy unchanged.
    pub async fn expand(
        &self,
        model_name: &str,
        document: &Value,
        path: Option<&str>,
    ) -> Result<Value> {
        let cache = self.new_cache();
        self.expand_with_cache(model_name, document, path, &cache)
            .await
    }

    /// [`expand`](Self::expand) against a caller-owned cache, so chained calls
    /// (e.g. hydrating a second level from the first call's result) share lookups.
    pub async fn expand_with_cache(
        &self,
        model_name: &str,
        document: &Value,
        path: Option<&str>,
        cache: &ResolutionCache,
    ) -> Result<Value> {
        let model = self.begin("expand", model_name, document)?;

        let Some(path) = normalize_path(path) else {
            if self.config.verbose {
                tracing::debug!(model = %model.name(), "Expanding model");
            }
            return self.expand_value(&model, document.clone(), None, cache).await;
        };

        let mut result = document.clone();
        let subset = match path::lookup(&result, path) {
            Field::Present(subset) => subset.clone(),
            _ => {
                if self.config.verbose {
                    tracing::debug!(model = %model.name(), path, "Nothing to expand at path");
                }
                return Ok(result);
            }
        };

        if self.config.verbose {
            tracing::debug!(model = %model.name(), path, "Expanding model at path");
        }
        let expanded = self.expand_value(&model, subset, Some(path), cache).await?;
        path::set(&mut result, path, expanded);
        Ok(result)
    }

    /// Expand a single document, or every element of a collection under the
    /// same cache. Results keep input order.
    fn expand_value<'a>(
        &'a self,
        model: &'a Arc<Model>,
        data: Value,
        path: Option<&'a str>,
        cache: &'a ResolutionCache,
    ) -> BoxFuture<'a, Result<Value>> {
        async move {
            match data {
                Value::Array(items) => {
                    if self.config.verbose {
                        tracing::debug!(
                            model = %model.name(),
                            count = items.len(),
                            "Expanding collection"
                        );
                    }
                    let expanded = try_join_all(
                        items
                            .into_iter()
                            .map(|item| self.expand_value(model, item, None, cache)),
                    )
                    .await?;
                    Ok(Value::Array(expanded))
                }
                other => self.expand_document(model, other, path, cache).await,
            }
        }
        .boxed()
    }

    async fn expand_document(
        &self,
        model: &Model,
        mut data: Value,
        path: Option<&str>,
        cache: &ResolutionCache,
    ) -> Result<Value> {
        let keys = self.candidate_keys(model, path)?;

        // Sequential across keys: each field settles before the next starts.
        for key in &keys {
            let child = match path::lookup(&data, key) {
                Field::Absent => continue,
                Field::Null => {
                    if self.config.verbose {
                        tracing::debug!(model = %model.name(), field = %key, "Child is null, skipping");
                    }
                    continue;
                }
                Field::Present(child) => child.clone(),
            };

            let child_model = self.registry.get_model(key)?;
            if self.config.verbose {
                tracing::debug!(
                    model = %model.name(),
                    child_model = %child_model.name(),
                    field = %key,
                    "Found child"
                );
            }

            let resolved = match child {
                Value::Array(references) => {
                    let resolved = try_join_all(
                        references
                            .into_iter()
                            .map(|reference| self.resolve_reference(&child_model, reference, cache)),
                    )
                    .await?;
                    Value::Array(resolved)
                }
                reference => self.resolve_reference(&child_model, reference, cache).await?,
            };

            path::set(&mut data, key, resolved);
        }

        Ok(data)
    }

    /// Resolve one reference through the cache, falling back to the reference
    /// itself when it cannot be resolved.
    async fn resolve_reference(
        &self,
        model: &Model,
        reference: Value,
        cache: &ResolutionCache,
    ) -> Result<Value> {
        let Some(key_value) = self.key_value(model, &reference) else {
            return Ok(reference);
        };

        let slot = cache.slot(model.name(), &key_value);
        if let Some(hit) = slot.get() {
            if self.config.verbose {
                tracing::debug!(model = %model.name(), key = %key_value, "Object found in cache");
            }
            return Ok(self.apply(model, reference, &key_value, hit.clone()));
        }

        let outcome = slot
            .get_or_try_init(|| async {
                if self.config.verbose {
                    tracing::debug!(model = %model.name(), key = %key_value, "Calling provider");
                }
                model.provider().provide(&key_value).await
            })
            .await;

        match outcome {
            Ok(entity) => Ok(self.apply(model, reference, &key_value, entity.clone())),
            Err(err) => match self.config.on_provider_error {
                ProviderErrorPolicy::Skip => {
                    if self.config.log_errors {
                        tracing::error!(
                            model = %model.name(),
                            key = %key_value,
                            error = %err,
                            "Provider was unable to resolve an object for child, skipping child"
                        );
                    }
                    Ok(reference)
                }
                ProviderErrorPolicy::Abort => Err(Error::Provider {
                    model: model.name().to_string(),
                    key: key_value.to_string(),
                    source: err,
                }),
            },
        }
    }

    /// The value handed to the provider: `reference[key]` for an object
    /// reference to a keyed model, otherwise the reference itself.
    fn key_value(&self, model: &Model, reference: &Value) -> Option<Value> {
        match (model.key(), reference) {
            (Some(key), Value::Object(fields)) => match fields.get(key) {
                Some(value) if !value.is_null() => Some(value.clone()),
                _ => {
                    if self.config.log_errors {
                        tracing::warn!(
                            model = %model.name(),
                            key_field = key,
                            "Reference has no key field, leaving it unresolved"
                        );
                    }
                    None
                }
            },
            _ => Some(reference.clone()),
        }
    }

    fn apply(&self, model: &Model, reference: Value, key: &Value, entity: Option<Value>) -> Value {
        match entity {
            Some(entity) => entity,
            None => {
                if self.config.log_errors {
                    tracing::warn!(
                        model = %model.name(),
                        key = %key,
                        "Provider returned no match, keeping reference"
                    );
                }
                reference
            }
        }
    }
}
