#![allow(dead_code)]

use async_trait::async_trait;
use friendly_hydrate::{
    HydrateConfig, Hydrator, ModelConfig, ModelRegistry, Provider, ProviderResult, StaticProvider,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared record of provider activity, as `start:<model>:<key>` / `end:<model>:<key>`.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, event: String) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    /// Number of provider invocations for a model.
    pub fn calls(&self, model: &str) -> usize {
        let prefix = format!("start:{model}:");
        self.events().iter().filter(|e| e.starts_with(&prefix)).count()
    }

    /// Number of provider invocations for a model and key.
    pub fn calls_for(&self, model: &str, key: &Value) -> usize {
        let event = format!("start:{model}:{key}");
        self.events().iter().filter(|e| **e == event).count()
    }
}

/// Table-backed provider that logs calls, can fail for chosen keys and can
/// delay chosen keys.
pub struct MockProvider {
    model: &'static str,
    table: StaticProvider,
    failing: Vec<Value>,
    delays: Vec<(Value, u64)>,
    log: CallLog,
}

impl MockProvider {
    pub fn new(model: &'static str, log: &CallLog) -> Self {
        Self {
            model,
            table: StaticProvider::new(),
            failing: Vec::new(),
            delays: Vec::new(),
            log: log.clone(),
        }
    }

    pub fn entity(mut self, key: &str, entity: Value) -> Self {
        self.table.insert(key, entity);
        self
    }

    pub fn failing(mut self, key: Value) -> Self {
        self.failing.push(key);
        self
    }

    pub fn delay(mut self, key: Value, millis: u64) -> Self {
        self.delays.push((key, millis));
        self
    }
}

#[async_trait]
impl Provider for MockProvider {
    async fn provide(&self, key: &Value) -> ProviderResult {
        self.log.push(format!("start:{}:{}", self.model, key));
        if let Some((_, millis)) = self.delays.iter().find(|(k, _)| k == key) {
            tokio::time::sleep(Duration::from_millis(*millis)).await;
        }
        let result = if self.failing.contains(key) {
            Err(anyhow::anyhow!("lookup failed for {key}"))
        } else {
            self.table.provide(key).await
        };
        self.log.push(format!("end:{}:{}", self.model, key));
        result
    }
}

pub fn steve() -> Value {
    json!({"id": 19237, "name": "Steve McConnel", "born": 1962})
}

pub fn bob() -> Value {
    json!({"id": 16030, "name": "Robert C. Martin", "born": 1952})
}

pub fn microsoft_press() -> Value {
    json!({"code": "MSP", "name": "Microsoft Press", "city": "Redmond"})
}

/// Library models:
///
/// - `book{key: id, children: [author, publisher, tag], aliases: [books], collapsables: [title]}`
/// - `author{key: id, aliases: [authors]}`: 19237 and 16030 resolve, 404 fails, others miss
/// - `publisher{key: code, collapsables: [name]}`
/// - `tag`: keyless, no collapsables; resolves whole references
pub fn library_registry(log: &CallLog) -> ModelRegistry {
    library_registry_with(log, |author| author)
}

/// [`library_registry`] with a hook to customize the author provider.
pub fn library_registry_with(
    log: &CallLog,
    author: impl FnOnce(MockProvider) -> MockProvider,
) -> ModelRegistry {
    let mut registry = ModelRegistry::new();

    registry
        .create_model(
            ModelConfig::new("book")
                .key("id")
                .children(["author", "publisher", "tag"])
                .aliases(["books"])
                .collapsables(["title"])
                .provider(
                    MockProvider::new("book", log)
                        .entity("1", json!({"id": 1, "title": "Code Complete", "author": 19237}))
                        .entity("2", json!({"id": 2, "title": "Clean Code", "author": 16030})),
                ),
        )
        .unwrap();

    registry
        .create_model(
            ModelConfig::new("author")
                .key("id")
                .aliases(["authors"])
                .provider(author(
                    MockProvider::new("author", log)
                        .entity("19237", steve())
                        .entity("16030", bob())
                        .failing(json!(404)),
                )),
        )
        .unwrap();

    registry
        .create_model(
            ModelConfig::new("publisher")
                .key("code")
                .collapsables(["name"])
                .provider(MockProvider::new("publisher", log).entity("MSP", microsoft_press())),
        )
        .unwrap();

    registry
        .create_model(ModelConfig::new("tag").provider(|reference: Value| async move {
            anyhow::Ok(Some(json!({"label": reference, "resolved": true})))
        }))
        .unwrap();

    registry
}

pub fn library(log: &CallLog) -> Hydrator {
    Hydrator::new(library_registry(log))
}

pub fn library_with_config(log: &CallLog, config: HydrateConfig) -> Hydrator {
    Hydrator::with_config(library_registry(log), config)
}
