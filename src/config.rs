use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::warmup::WarmupParams;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AccelConfig {
    pub logging: LoggingConfig,
    pub graph: GraphConfig,
    pub warmup: WarmupConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GraphConfig {
    /// Directory holding `nodes.json` and `relationships.json`.
    pub data_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WarmupConfig {
    pub labels: Vec<String>,
    pub types: Vec<String>,
    pub load_indexes: bool,
    pub subgraph_depth: i64,
    /// Cron expression recorded on the cache; informational only.
    pub schedule: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub fuzzy_distance: usize,
    pub suggest_limit: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        let data_dir = default_nornicdb_dir()
            .join("graph")
            .to_string_lossy()
            .into_owned();
        Self { data_dir }
    }
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            types: Vec::new(),
            load_indexes: true,
            subgraph_depth: 2,
            schedule: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fuzzy_distance: 2,
            suggest_limit: 10,
        }
    }
}

impl WarmupConfig {
    /// Preload parameters equivalent to this section.
    pub fn params(&self) -> WarmupParams {
        WarmupParams {
            labels: self.labels.clone(),
            types: self.types.clone(),
            load_indexes: self.load_indexes,
        }
    }
}

/// Returns `~/.nornicdb/`, or `./.nornicdb/` when no home directory is known.
pub fn default_nornicdb_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".nornicdb")
}

/// Returns the default config file path: `~/.nornicdb/accel.toml`
pub fn default_config_path() -> PathBuf {
    default_nornicdb_dir().join("accel.toml")
}

impl AccelConfig {
    /// Load config from the default TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            AccelConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    /// (NORNICDB_DATA_DIR, NORNICDB_LOG_LEVEL, NORNICDB_WARMUP_SCHEDULE).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("NORNICDB_DATA_DIR") {
            self.graph.data_dir = val;
        }
        if let Ok(val) = std::env::var("NORNICDB_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("NORNICDB_WARMUP_SCHEDULE") {
            self.warmup.schedule = Some(val);
        }
    }

    /// Resolve the graph data directory, expanding `~` if needed.
    pub fn resolved_data_dir(&self) -> PathBuf {
        expand_tilde(&self.graph.data_dir)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
