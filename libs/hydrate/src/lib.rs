//! Model-driven hydration of JSON documents
//!
//! Register [`Model`]s describing how a document type refers to child document
//! types through key fields, each with an async [`Provider`] that looks an
//! entity up by key. A [`Hydrator`] then walks a document and replaces every
//! reference with the resolved entity ([`Hydrator::expand`]), or projects
//! resolved entities back down to key stubs ([`Hydrator::collapse`]).
//!
//! # Example
//!
//! ```rust
//! use friendly_hydrate::{Hydrator, ModelConfig, ModelRegistry, StaticProvider};
//! use serde_json::{json, Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # tokio::runtime::Runtime::new()?.block_on(async {
//! let mut authors = StaticProvider::new();
//! authors.insert("19237", json!({"id": 19237, "name": "Steve McConnel"}));
//!
//! let mut registry = ModelRegistry::new();
//! registry.create_model(
//!     ModelConfig::new("book")
//!         .key("id")
//!         .children(["author"])
//!         .provider(|_id: Value| async move { anyhow::Ok(None::<Value>) }),
//! )?;
//! registry.create_model(ModelConfig::new("author").key("id").provider(authors))?;
//!
//! let hydrator = Hydrator::new(registry);
//! let book = hydrator.expand("book", &json!({"id": 1, "author": 19237}), None).await?;
//! assert_eq!(book["author"]["name"], "Steve McConnel");
//!
//! let stub = hydrator.collapse("book", &book, None)?;
//! assert_eq!(stub, json!({"id": 1, "author": {"id": 19237}}));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # })
//! # }
//! ```

pub mod cache;
pub mod collapse;
pub mod config;
pub mod error;
pub mod expand;
pub mod hydrator;
pub mod model;
pub mod path;
pub mod provider;
pub mod registry;

pub use cache::ResolutionCache;
pub use config::{HydrateConfig, ProviderErrorPolicy};
pub use error::{Error, Result};
pub use hydrator::Hydrator;
pub use model::{Model, ModelConfig};
pub use path::Field;
pub use provider::{Provider, ProviderResult, StaticProvider};
pub use registry::ModelRegistry;
