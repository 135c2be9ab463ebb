//! Model definitions
//!
//! A [`Model`] names a document type, the field its identifier lives under, the
//! child models it may contain and how its instances collapse back to stubs.

use crate::error::{Error, Result};
use crate::provider::Provider;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Registration input for a model.
///
/// Built either with the builder methods or from a JSON definition via
/// [`ModelConfig::from_json`]; the provider is always attached in code.
#[derive(Clone, Default)]
pub struct ModelConfig {
    pub name: Option<String>,
    pub key: Option<String>,
    pub children: Vec<String>,
    pub aliases: Vec<String>,
    pub collapsables: Vec<String>,
    pub provider: Option<Arc<dyn Provider>>,
}

impl ModelConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn collapsables<I, S>(mut self, collapsables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collapsables = collapsables.into_iter().map(Into::into).collect();
        self
    }

    pub fn provider(mut self, provider: impl Provider + 'static) -> Self {
        self.provider = Some(Arc::new(provider));
        self
    }

    pub fn shared_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Parse a model definition of the form
    /// `{"name": ..., "key": ..., "children": ..., "aliases": ..., "collapsables": ...}`.
    ///
    /// `children`, `aliases` and `collapsables` accept a single string or an
    /// array of strings. The provider is left unset.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::Config("model definition must be a JSON object".to_string()))?;

        let name = match obj.get("name") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(Error::Config("model name must be a string.".to_string())),
        };

        let key = match obj.get("key") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(Error::Config("model key must be a string.".to_string())),
        };

        Ok(Self {
            name,
            key,
            children: string_list(obj.get("children"), "children")?,
            aliases: string_list(obj.get("aliases"), "aliases")?,
            collapsables: string_list(obj.get("collapsables"), "collapsables")?,
            provider: None,
        })
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("children", &self.children)
            .field("aliases", &self.aliases)
            .field("collapsables", &self.collapsables)
            .field("provider", &self.provider.is_some())
            .finish()
    }
}

/// Accept a string or an array of strings; anything else is a config error.
fn string_list(value: Option<&Value>, field: &str) -> Result<Vec<String>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(s)) => Ok(vec![s.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| Error::Config(format!("{field} must be an array of strings.")))
            })
            .collect(),
        Some(_) => Err(Error::Config(format!(
            "{field} must be a string or an array of strings."
        ))),
    }
}

/// Deduplicate while keeping first-occurrence order.
pub(crate) fn dedup(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

/// A registered model.
pub struct Model {
    pub(crate) name: String,
    pub(crate) key: Option<String>,
    pub(crate) children: Vec<String>,
    pub(crate) aliases: Vec<String>,
    pub(crate) collapsables: Vec<String>,
    pub(crate) provider: Arc<dyn Provider>,
}

impl Model {
    /// Lower-cased primary name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn children(&self) -> &[String] {
        &self.children
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn collapsables(&self) -> &[String] {
        &self.collapsables
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    pub fn is_keyless(&self) -> bool {
        self.key.is_none()
    }

    /// Fields kept when an instance of this model is collapsed: the key field
    /// (if any) followed by the collapsables.
    pub fn collapsed_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::with_capacity(1 + self.collapsables.len());
        if let Some(key) = &self.key {
            fields.push(key);
        }
        for c in &self.collapsables {
            if !fields.contains(&c.as_str()) {
                fields.push(c);
            }
        }
        fields
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("children", &self.children)
            .field("aliases", &self.aliases)
            .field("collapsables", &self.collapsables)
            .finish_non_exhaustive()
    }
}
