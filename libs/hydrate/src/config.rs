//! Hydration configuration
//!
//! The logging toggles only affect the diagnostic side channel; they never
//! change what expand or collapse return.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What expand does when a provider call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderErrorPolicy {
    /// Log the failure and keep the unresolved reference.
    #[default]
    Skip,
    /// Fail the whole expand call.
    Abort,
}

impl FromStr for ProviderErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            other => Err(format!(
                "invalid provider error policy '{other}' (expected 'skip' or 'abort')"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydrateConfig {
    /// Emit debug-level traversal events.
    pub verbose: bool,
    /// Emit provider failures, no-match results and non-collapsable children.
    pub log_errors: bool,
    pub on_provider_error: ProviderErrorPolicy,
    /// Upper bound on entries held by a per-call resolution cache (`None` = unbounded).
    pub cache_capacity: Option<usize>,
    /// Reject models registered without a `key`. Applied by
    /// [`ModelRegistry::from_config`](crate::ModelRegistry::from_config).
    pub require_key: bool,
}

impl Default for HydrateConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_errors: true,
            on_provider_error: ProviderErrorPolicy::Skip,
            cache_capacity: None,
            require_key: false,
        }
    }
}

impl HydrateConfig {
    pub const ENV_VERBOSE: &'static str = "FRIENDLY_VERBOSE";
    pub const ENV_LOG_ERRORS: &'static str = "FRIENDLY_LOG_ERRORS";
    pub const ENV_ON_PROVIDER_ERROR: &'static str = "FRIENDLY_ON_PROVIDER_ERROR";
    pub const ENV_CACHE_CAPACITY: &'static str = "FRIENDLY_CACHE_CAPACITY";
    pub const ENV_REQUIRE_KEY: &'static str = "FRIENDLY_REQUIRE_KEY";

    /// Defaults overridden by `FRIENDLY_*` environment variables.
    ///
    /// Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// This config overridden by `FRIENDLY_*` environment variables, e.g. on
    /// top of values loaded from a file.
    pub fn apply_env(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply `FRIENDLY_*` overrides read through `var`.
    pub fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(v) = var(Self::ENV_VERBOSE).and_then(|v| parse_bool(&v)) {
            self.verbose = v;
        }
        if let Some(v) = var(Self::ENV_LOG_ERRORS).and_then(|v| parse_bool(&v)) {
            self.log_errors = v;
        }
        if let Some(v) = var(Self::ENV_ON_PROVIDER_ERROR).and_then(|v| v.parse().ok()) {
            self.on_provider_error = v;
        }
        if let Some(v) = var(Self::ENV_CACHE_CAPACITY).and_then(|v| v.trim().parse().ok()) {
            self.cache_capacity = Some(v);
        }
        if let Some(v) = var(Self::ENV_REQUIRE_KEY).and_then(|v| parse_bool(&v)) {
            self.require_key = v;
        }
        self
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
