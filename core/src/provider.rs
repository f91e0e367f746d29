//! One-shot narrative → policy resolution.
//!
//! RULE: A provider is invoked once, before the engine is built.
//! The engine never holds a provider and never re-resolves mid-run.

use crate::policy::PolicyParameters;
use anyhow::Context;
use std::path::PathBuf;

pub trait PolicyProvider {
    fn resolve(&self, narrative: &str) -> anyhow::Result<PolicyParameters>;
}

/// Returns the same parameters whatever the narrative says.
#[derive(Debug, Clone, Default)]
pub struct FixedPolicy(pub PolicyParameters);

impl PolicyProvider for FixedPolicy {
    fn resolve(&self, _narrative: &str) -> anyhow::Result<PolicyParameters> {
        Ok(self.0.clone())
    }
}

/// Reads translator output that was written to disk ahead of the run.
#[derive(Debug, Clone)]
pub struct JsonFilePolicy {
    pub path: PathBuf,
}

impl JsonFilePolicy {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PolicyProvider for JsonFilePolicy {
    fn resolve(&self, narrative: &str) -> anyhow::Result<PolicyParameters> {
        let params = PolicyParameters::load(&self.path)
            .with_context(|| format!("Cannot load policy from {}", self.path.display()))?;
        log::info!(
            "Resolved policy from {} ({} chars of narrative)",
            self.path.display(),
            narrative.len()
        );
        Ok(params)
    }
}
