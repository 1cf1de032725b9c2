//! Session configuration loaded from TOML.

use std::{
    fs,
    path::{Path, PathBuf},
};

use dread_core::{
    config::{BehaviorConfig, PopulationConfig, SchedulerConfig, SpawnerConfig, TensionConfig},
    EnemyTypeSpec, HorrorEventSpec, SpawnAnchor,
};
use dread_world::WorldConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a session configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read session config at {}", path.display())]
    Io {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The contents are not a valid session config.
    #[error("failed to parse session config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Every tunable of a session plus its level data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed every random stream of the session derives from.
    pub seed: u64,
    /// Tension scalar tuning.
    pub tension: TensionConfig,
    /// Population ceiling and cadence.
    pub population: PopulationConfig,
    /// Horror event scheduler tuning.
    pub scheduler: SchedulerConfig,
    /// Anchor spawner tuning.
    pub spawner: SpawnerConfig,
    /// Per-enemy behaviour tuning.
    pub behavior: BehaviorConfig,
    /// Enemy catalog.
    pub enemy_types: Vec<EnemyTypeSpec>,
    /// Horror event catalog.
    pub horror_events: Vec<HorrorEventSpec>,
    /// Spawn anchors placed in the level.
    pub anchors: Vec<SpawnAnchor>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            tension: TensionConfig::default(),
            population: PopulationConfig::default(),
            scheduler: SchedulerConfig::default(),
            spawner: SpawnerConfig::default(),
            behavior: BehaviorConfig::default(),
            enemy_types: vec![EnemyTypeSpec::default()],
            horror_events: Vec::new(),
            anchors: Vec::new(),
        }
    }
}

impl SessionConfig {
    /// Parses a configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses the configuration stored at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub(crate) fn world_config(&self) -> WorldConfig {
        WorldConfig {
            tension: self.tension.clone(),
            population: self.population.clone(),
            behavior: self.behavior.clone(),
            enemy_types: self.enemy_types.clone(),
            horror_events: self.horror_events.clone(),
            anchors: self.anchors.clone(),
            seed: self.seed,
        }
    }
}
