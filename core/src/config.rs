use crate::{
    error::{SimError, SimResult},
    types::Tick,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_SPAWN_PROB: f64 = 0.3;
/// Same planar units as node coordinates (metres for projected maps).
pub const DEFAULT_SPAWN_BIAS_RADIUS: f64 = 500.0;
pub const DEFAULT_SNAPSHOT_INTERVAL: Tick = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Per-tick probability that one resource spawns.
    pub spawn_prob: f64,
    /// Radius around a player that a biased spawn lands within.
    pub spawn_bias_radius: f64,
    /// Candidate resource values; one is drawn uniformly per spawn.
    pub resource_values: Vec<f64>,
    /// Ticks between snapshot log lines.
    pub snapshot_interval: Tick,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            spawn_prob:        DEFAULT_SPAWN_PROB,
            spawn_bias_radius: DEFAULT_SPAWN_BIAS_RADIUS,
            resource_values:   vec![1.0],
            snapshot_interval: DEFAULT_SNAPSHOT_INTERVAL,
        }
    }
}

impl SimConfig {
    /// Load from a JSON file. Missing keys take their defaults.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        let config: SimConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Config with spawning switched off. Used by scenario tests that
    /// place resources by hand.
    pub fn without_spawns() -> Self {
        Self {
            spawn_prob: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(0.0..=1.0).contains(&self.spawn_prob) {
            return Err(SimError::InvalidConfig(format!(
                "spawn_prob must be in [0, 1], got {}",
                self.spawn_prob
            )));
        }
        if !self.spawn_bias_radius.is_finite() || self.spawn_bias_radius < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "spawn_bias_radius must be finite and >= 0, got {}",
                self.spawn_bias_radius
            )));
        }
        if self.resource_values.is_empty() {
            return Err(SimError::InvalidConfig(
                "resource_values must not be empty".into(),
            ));
        }
        if let Some(bad) = self
            .resource_values
            .iter()
            .find(|v| !v.is_finite() || **v <= 0.0)
        {
            return Err(SimError::InvalidConfig(format!(
                "resource values must be positive, got {bad}"
            )));
        }
        if self.snapshot_interval == 0 {
            return Err(SimError::InvalidConfig(
                "snapshot_interval must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let c = SimConfig::default();
        assert_eq!(c.spawn_prob, 0.3);
        assert_eq!(c.spawn_bias_radius, 500.0);
        assert_eq!(c.resource_values, vec![1.0]);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let c: SimConfig = serde_json::from_str(r#"{"spawn_prob": 0.9}"#).unwrap();
        assert_eq!(c.spawn_prob, 0.9);
        assert_eq!(c.spawn_bias_radius, DEFAULT_SPAWN_BIAS_RADIUS);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let bad_prob = SimConfig { spawn_prob: 1.5, ..SimConfig::default() };
        assert!(bad_prob.validate().is_err());

        let no_values = SimConfig { resource_values: vec![], ..SimConfig::default() };
        assert!(no_values.validate().is_err());

        let zero_value = SimConfig { resource_values: vec![1.0, 0.0], ..SimConfig::default() };
        assert!(zero_value.validate().is_err());
    }
}
