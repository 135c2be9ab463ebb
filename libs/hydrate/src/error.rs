//! Error types for model registration and document hydration

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Hydration errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid model configuration: {0}")]
    Config(String),

    #[error("A model with this name already exists: {0}")]
    DuplicateModel(String),

    #[error("Alias '{alias}' is already claimed by model: {existing}")]
    AmbiguousAlias { alias: String, existing: String },

    #[error("A model name was not provided.")]
    MissingModelName,

    #[error("No data was provided to {0}.")]
    MissingDocument(&'static str),

    #[error("Unable to find a matching model for: {0}")]
    ModelNotFound(String),

    #[error("Provider for model {model} failed for key {key}: {source}")]
    Provider {
        model: String,
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
