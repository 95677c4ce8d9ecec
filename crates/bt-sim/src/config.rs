//! Simulation configuration loaded from YAML.

use std::path::Path;

use anyhow::{ensure, Context, Result};
use bt_runtime::{PoolConfig, RunnerConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of guard agents to spawn.
    pub agents: u64,

    /// Ticks to simulate.
    pub ticks: u64,

    /// Fixed step published to every tree.
    pub dt_seconds: f32,

    /// Drives threat sightings; equal seeds replay the same run.
    pub seed: u64,

    /// Seconds a guard lingers at each waypoint.
    pub linger_seconds: f32,

    pub pool: PoolConfig,

    pub runner: RunnerConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            agents: 64,
            ticks: 600,
            dt_seconds: 1.0 / 30.0,
            seed: 0,
            linger_seconds: 1.0,
            pool: PoolConfig::default(),
            runner: RunnerConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.dt_seconds.is_finite() && self.dt_seconds > 0.0,
            "dt_seconds must be positive, got {}",
            self.dt_seconds
        );
        ensure!(
            self.linger_seconds >= 0.0,
            "linger_seconds must not be negative, got {}",
            self.linger_seconds
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "agents: 4\nrunner:\n  think_every_ticks: 3\n";
        let config: SimConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.agents, 4);
        assert_eq!(config.ticks, SimConfig::default().ticks);
        assert_eq!(config.runner.think_every_ticks, 3);
        assert_eq!(config.runner.think_offset_ticks, 0);
        assert_eq!(config.pool.max_free_per_prototype, 64);
    }

    #[test]
    fn rejects_non_positive_step() {
        let config = SimConfig {
            dt_seconds: 0.0,
            ..SimConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
