// src/infra/config.rs — Configuration loading (TOML)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::infra::errors::DedupError;
use crate::infra::paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dedup: DedupConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub sweep: SweepConfig,
}

/// Tunables for a dedup run. The threshold is deliberately a parameter:
/// teams pick their own production value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub threshold: f32,
    pub neighbors: usize,
    pub batch_size: usize,
    pub delete_batch_size: usize,
    /// 0 = scan every embedded entry
    pub max_scan: usize,
    pub concurrency: usize,
    /// Highest rank first.
    pub status_ranking: Vec<String>,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            threshold: 0.95,
            neighbors: 5,
            batch_size: 500,
            delete_batch_size: 500,
            max_scan: 0,
            concurrency: 4,
            status_ranking: vec!["approved".into(), "pending".into(), "rejected".into()],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database file; defaults to the data directory.
    pub database: Option<String>,
}

impl StorageConfig {
    pub fn database_path(&self) -> PathBuf {
        self.database
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(paths::db_path)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    pub thresholds: Vec<f32>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![0.90, 0.92, 0.94, 0.95, 0.96],
        }
    }
}

impl Config {
    /// Load config from file, falling back to defaults.
    pub fn load() -> Result<Self, DedupError> {
        let path = paths::config_file_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, DedupError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| DedupError::Config(format!("{}: {e}", path.display())))
    }
}
