//! Collapse: project resolved children back down to key-bearing stubs.
//!
//! The structural inverse of expansion with respect to the key field. No
//! providers are called and nothing is cached.

use crate::error::Result;
use crate::hydrator::{normalize_path, Hydrator};
use crate::model::Model;
use crate::path::{self, Field};
use serde_json::{Map, Value};

impl Hydrator {
    /// Collapse the children of `document` (or of the substructure at `path`)
    /// to their key field plus the child model's collapsables.
    pub fn collapse(&self, model_name: &str, document: &Value, path: Option<&str>) -> Result<Value> {
        let model = self.begin("collapse", model_name, document)?;

        let Some(path) = normalize_path(path) else {
            if self.config.verbose {
                tracing::debug!(model = %model.name(), "Collapsing model");
            }
            return self.collapse_value(&model, document.clone(), None);
        };

        let mut result = document.clone();
        let subset = match path::lookup(&result, path) {
            Field::Present(subset) => subset.clone(),
            _ => return Ok(result),
        };

        if self.config.verbose {
            tracing::debug!(model = %model.name(), path, "Collapsing model at path");
        }
        let collapsed = self.collapse_value(&model, subset, Some(path))?;
        path::set(&mut result, path, collapsed);
        Ok(result)
    }

    fn collapse_value(&self, model: &Model, data: Value, path: Option<&str>) -> Result<Value> {
        match data {
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.collapse_value(model, item, None))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            other => self.collapse_document(model, other, path),
        }
    }

    fn collapse_document(&self, model: &Model, mut data: Value, path: Option<&str>) -> Result<Value> {
        let keys = self.candidate_keys(model, path)?;

        for key in &keys {
            let Some(child) = path::lookup(&data, key).value().cloned() else {
                continue;
            };

            let child_model = self.registry.get_model(key)?;
            let fields = child_model.collapsed_fields();
            if fields.is_empty() {
                if self.config.log_errors {
                    tracing::warn!(
                        model = %model.name(),
                        child_model = %child_model.name(),
                        field = %key,
                        "Child model has no key or collapsables, leaving child unmodified"
                    );
                }
                continue;
            }

            if self.config.verbose {
                tracing::debug!(
                    model = %model.name(),
                    field = %key,
                    collapsables = %fields.join(","),
                    "Collapsing child"
                );
            }

            let collapsed = match child {
                Value::Array(items) => Value::Array(
                    items
                        .into_iter()
                        .map(|item| project(item, &fields))
                        .collect(),
                ),
                other => project(other, &fields),
            };
            path::set(&mut data, key, collapsed);
        }

        Ok(data)
    }
}

/// Keep only `fields` of an object; scalars are already collapsed.
fn project(value: Value, fields: &[&str]) -> Value {
    match value {
        Value::Object(mut source) => {
            let mut picked = Map::new();
            for field in fields {
                if let Some(v) = source.remove(*field) {
                    picked.insert((*field).to_string(), v);
                }
            }
            Value::Object(picked)
        }
        other => other,
    }
}
