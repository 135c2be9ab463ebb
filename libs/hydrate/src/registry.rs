//! Model registry
//!
//! Holds every model a [`Hydrator`](crate::Hydrator) can resolve. The registry
//! is mutated during setup only; once handed to a hydrator it is shared
//! read-only behind an `Arc`.

use crate::config::HydrateConfig;
use crate::error::{Error, Result};
use crate::model::{dedup, Model, ModelConfig};
use crate::path;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of models, keyed by lower-cased name.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: HashMap<String, Arc<Model>>,
    /// lower-cased alias -> model name
    aliases: HashMap<String, String>,
    /// registration order, for stable iteration
    order: Vec<String>,
    require_key: bool,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty registry enforcing the registration rules in `config`.
    pub fn from_config(config: &HydrateConfig) -> Self {
        Self::new().with_require_key(config.require_key)
    }

    pub fn requires_key(&self) -> bool {
        self.require_key
    }

    /// Reject models registered without a `key`.
    pub fn with_require_key(mut self, require_key: bool) -> Self {
        self.require_key = require_key;
        self
    }

    /// Validate and register a model.
    ///
    /// On error the registry is left unchanged.
    pub fn create_model(&mut self, config: ModelConfig) -> Result<()> {
        let name = match config.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_lowercase(),
            _ => return Err(Error::Config("A model name was not provided.".to_string())),
        };

        if self.models.contains_key(&name) {
            return Err(Error::DuplicateModel(name));
        }

        let provider = config.provider.ok_or_else(|| {
            Error::Config(format!("A model provider was not provided for: {name}"))
        })?;

        let key = match config.key {
            Some(key) if key.is_empty() => {
                return Err(Error::Config(format!("A model key must not be empty for: {name}")))
            }
            Some(key) => Some(key),
            None if self.require_key => {
                return Err(Error::Config(format!("A model key was not provided for: {name}")))
            }
            None => None,
        };

        let children = dedup(config.children);
        let aliases = dedup(config.aliases);
        let collapsables = dedup(config.collapsables);

        self.check_aliases(&name, &aliases)?;

        let model = Model {
            name: name.clone(),
            key,
            children,
            aliases,
            collapsables,
            provider,
        };

        for alias in &model.aliases {
            let lower = alias.to_lowercase();
            if lower != name {
                self.aliases.insert(lower, name.clone());
            }
        }
        self.order.push(name.clone());
        self.models.insert(name, Arc::new(model));
        Ok(())
    }

    /// A new model's name and aliases must not collide with any existing
    /// model's name or alias.
    fn check_aliases(&self, name: &str, aliases: &[String]) -> Result<()> {
        if let Some(existing) = self.aliases.get(name) {
            return Err(Error::AmbiguousAlias {
                alias: name.to_string(),
                existing: existing.clone(),
            });
        }

        let mut seen: Vec<String> = Vec::with_capacity(aliases.len());
        for alias in aliases {
            let lower = alias.to_lowercase();
            if lower.is_empty() {
                return Err(Error::Config(format!("Empty alias declared for: {name}")));
            }
            if lower == name || seen.contains(&lower) {
                continue;
            }
            if let Some(existing) = self.aliases.get(&lower) {
                return Err(Error::AmbiguousAlias {
                    alias: alias.clone(),
                    existing: existing.clone(),
                });
            }
            if self.models.contains_key(&lower) {
                return Err(Error::AmbiguousAlias {
                    alias: alias.clone(),
                    existing: lower,
                });
            }
            seen.push(lower);
        }
        Ok(())
    }

    /// Case-insensitive lookup by name, then by alias.
    ///
    /// A dotted/bracketed path resolves by its final non-index segment, so a
    /// model can be addressed by the field it sits under (`inner.book`).
    pub fn get_model(&self, name: &str) -> Result<Arc<Model>> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::MissingModelName);
        }

        let target = if path::is_path(name) {
            path::last_name_segment(name).ok_or_else(|| Error::ModelNotFound(name.to_string()))?
        } else {
            name
        };
        let lower = target.to_lowercase();

        if let Some(model) = self.models.get(&lower) {
            return Ok(Arc::clone(model));
        }

        self.aliases
            .get(&lower)
            .and_then(|model_name| self.models.get(model_name))
            .cloned()
            .ok_or_else(|| Error::ModelNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get_model(name).is_ok()
    }

    /// Models in registration order.
    pub fn models(&self) -> impl Iterator<Item = &Arc<Model>> {
        self.order.iter().filter_map(|name| self.models.get(name))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Candidate document fields for a model's children: each declared child
    /// followed by that child's aliases, deduplicated in declaration order.
    ///
    /// Fails if a declared child is not registered.
    pub fn child_keys(&self, model: &Model) -> Result<Vec<String>> {
        let mut keys: Vec<String> = Vec::new();
        for child in &model.children {
            let child_model = self.get_model(child)?;
            if !keys.contains(child) {
                keys.push(child.clone());
            }
            for alias in &child_model.aliases {
                if !keys.contains(alias) {
                    keys.push(alias.clone());
                }
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn model(name: &str) -> ModelConfig {
        ModelConfig::new(name)
            .key("id")
            .provider(|_key: Value| async move { anyhow::Ok(None::<Value>) })
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut registry = ModelRegistry::new();
        registry.create_model(model("Book")).unwrap();

        assert_eq!(registry.get_model("book").unwrap().name(), "book");
        assert_eq!(registry.get_model("BOOK").unwrap().name(), "book");
        assert_eq!(registry.get_model("bOoK").unwrap().name(), "book");
    }

    #[test]
    fn test_lookup_by_alias_and_path() {
        let mut registry = ModelRegistry::new();
        registry
            .create_model(model("author").aliases(["authors", "Writer"]))
            .unwrap();

        assert_eq!(registry.get_model("authors").unwrap().name(), "author");
        assert_eq!(registry.get_model("WRITER").unwrap().name(), "author");
        assert_eq!(registry.get_model("inner.author").unwrap().name(), "author");
        assert_eq!(registry.get_model("shelf.authors[1]").unwrap().name(), "author");
        assert!(matches!(
            registry.get_model("publisher"),
            Err(Error::ModelNotFound(_))
        ));
        assert!(matches!(registry.get_model(""), Err(Error::MissingModelName)));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = ModelRegistry::new();
        registry.create_model(model("book")).unwrap();
        let err = registry.create_model(model("BOOK")).unwrap_err();
        assert!(matches!(err, Error::DuplicateModel(name) if name == "book"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_missing_fields_rejected() {
        let mut registry = ModelRegistry::new();

        let err = registry.create_model(ModelConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err = registry
            .create_model(ModelConfig::new("book").key("id"))
            .unwrap_err();
        assert!(err.to_string().contains("provider"));

        let err = registry.create_model(model("  ")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        assert!(registry.is_empty());
    }

    #[test]
    fn test_require_key() {
        let keyless = || {
            ModelConfig::new("tag").provider(|_key: Value| async move { anyhow::Ok(None::<Value>) })
        };

        let mut lenient = ModelRegistry::new();
        lenient.create_model(keyless()).unwrap();
        assert!(lenient.get_model("tag").unwrap().is_keyless());

        let mut strict = ModelRegistry::new().with_require_key(true);
        let err = strict.create_model(keyless()).unwrap_err();
        assert!(err.to_string().contains("key"));
    }

    #[test]
    fn test_from_config_applies_require_key() {
        let config = HydrateConfig {
            require_key: true,
            ..HydrateConfig::default()
        };
        let mut registry = ModelRegistry::from_config(&config);
        assert!(registry.requires_key());

        let err = registry
            .create_model(ModelConfig::new("tag").provider(|_key: Value| async move {
                anyhow::Ok(None::<Value>)
            }))
            .unwrap_err();
        assert!(matches!(err, Error::Config(message) if message.contains("key")));
        registry.create_model(model("book")).unwrap();

        assert!(!ModelRegistry::from_config(&HydrateConfig::default()).requires_key());
    }

    #[test]
    fn test_ambiguous_alias_rejected() {
        let mut registry = ModelRegistry::new();
        registry.create_model(model("author").aliases(["writer"])).unwrap();

        let err = registry
            .create_model(model("editor").aliases(["Writer"]))
            .unwrap_err();
        assert!(matches!(err, Error::AmbiguousAlias { existing, .. } if existing == "author"));

        // alias equal to an existing model name
        let err = registry
            .create_model(model("reviewer").aliases(["author"]))
            .unwrap_err();
        assert!(matches!(err, Error::AmbiguousAlias { .. }));

        // name equal to an existing alias
        let err = registry.create_model(model("writer")).unwrap_err();
        assert!(matches!(err, Error::AmbiguousAlias { .. }));

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_sets_are_deduplicated() {
        let mut registry = ModelRegistry::new();
        registry
            .create_model(
                model("book")
                    .children(["author", "author"])
                    .aliases(["books", "books", "book"])
                    .collapsables(["title", "title"]),
            )
            .unwrap();
        let book = registry.get_model("book").unwrap();
        assert_eq!(book.children(), ["author"]);
        assert_eq!(book.aliases(), ["books", "book"]);
        assert_eq!(book.collapsables(), ["title"]);
    }

    #[test]
    fn test_child_keys_include_child_aliases() {
        let mut registry = ModelRegistry::new();
        registry
            .create_model(model("book").children(["author", "publisher"]))
            .unwrap();
        registry
            .create_model(model("author").aliases(["authors", "author"]))
            .unwrap();
        registry.create_model(model("publisher")).unwrap();

        let book = registry.get_model("book").unwrap();
        assert_eq!(
            registry.child_keys(&book).unwrap(),
            vec!["author", "authors", "publisher"]
        );

        let names: Vec<&str> = registry.models().map(|m| m.name()).collect();
        assert_eq!(names, vec!["book", "author", "publisher"]);
    }

    #[test]
    fn test_child_keys_fail_on_unregistered_child() {
        let mut registry = ModelRegistry::new();
        registry.create_model(model("book").children(["author"])).unwrap();
        let book = registry.get_model("book").unwrap();
        assert!(matches!(
            registry.child_keys(&book),
            Err(Error::ModelNotFound(_))
        ));
    }
}
