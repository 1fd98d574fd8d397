//! Scenario loading - seeds a Manager from a YAML description

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use crate::manager::Manager;

fn default_dt() -> f64 {
    1.0 / 60.0
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub seed: u64,
    /// Time delta handed to processors each tick. Units are the
    /// scenario's business; the core is agnostic.
    #[serde(default = "default_dt")]
    pub dt: f64,
    #[serde(default)]
    pub ticks: Option<u64>,
    /// Entities to seed explicitly, component bag per entity.
    #[serde(default)]
    pub entities: Vec<ScenarioEntity>,
    /// Optional batch-spawn block used by the demo runner.
    #[serde(default)]
    pub spawn: Option<SpawnConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioEntity {
    #[serde(default)]
    pub components: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpawnConfig {
    pub particles: u64,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    /// Build a Manager seeded with the scenario's explicit entities.
    pub fn build_manager(&self) -> Manager {
        let mut manager = Manager::new();
        for entity in &self.entities {
            manager.spawn(entity.components.clone());
        }
        manager
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(120)
    }
}
