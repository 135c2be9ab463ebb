//! Model definitions and fixture tables loaded from JSON files.
//!
//! `models.json` is an array of model definitions (see
//! [`ModelConfig::from_json`]). `fixtures.json` maps model names to entity
//! tables, `{"author": {"19237": {...}}}`; each model is served by a
//! [`StaticProvider`] over its table, or an empty one when it has none.

use anyhow::{bail, Context};
use friendly_hydrate::{HydrateConfig, ModelConfig, ModelRegistry, StaticProvider};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub fn read_json(path: &Path) -> anyhow::Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

pub fn load_registry(
    models: &Path,
    fixtures: Option<&Path>,
    config: &HydrateConfig,
) -> anyhow::Result<ModelRegistry> {
    let definitions = read_json(models)?;
    let fixtures = fixtures.map(read_json).transpose()?;
    build_registry(&definitions, fixtures, config)
}

pub fn build_registry(
    definitions: &Value,
    fixtures: Option<Value>,
    config: &HydrateConfig,
) -> anyhow::Result<ModelRegistry> {
    let definitions = definitions
        .as_array()
        .context("Model definitions must be a JSON array")?;

    let mut tables = match fixtures {
        Some(fixtures) => fixture_tables(fixtures)?,
        None => HashMap::new(),
    };

    let mut registry = ModelRegistry::from_config(config);
    for (index, definition) in definitions.iter().enumerate() {
        let config = ModelConfig::from_json(definition)
            .with_context(|| format!("Invalid model definition at index {index}"))?;
        let name = config.name.as_deref().unwrap_or_default().trim().to_lowercase();
        let provider = tables.remove(&name).unwrap_or_default();

        tracing::debug!(model = %name, fixtures = provider.len(), "Registering model");
        registry
            .create_model(config.provider(provider))
            .with_context(|| format!("Failed to register model at index {index}"))?;
    }

    for name in tables.keys() {
        tracing::warn!(model = %name, "Fixtures provided for a model that is not defined");
    }

    tracing::info!(models = registry.len(), "Model registry loaded");
    Ok(registry)
}

fn fixture_tables(fixtures: Value) -> anyhow::Result<HashMap<String, StaticProvider>> {
    let Value::Object(models) = fixtures else {
        bail!("Fixtures must be a JSON object mapping model names to entity tables");
    };

    models
        .into_iter()
        .map(|(name, table)| match table {
            Value::Object(entities) => Ok((name.to_lowercase(), StaticProvider::from_map(entities))),
            _ => bail!("Fixture table for model '{name}' must be a JSON object"),
        })
        .collect()
}
