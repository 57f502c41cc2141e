//! Service configuration: optional YAML file, then environment overrides.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::calc::{CalcSettings, DiceAverage};
use crate::data::DEFAULT_DATA_DIR;
use crate::parallel::WorkerPool;

pub const DEFAULT_CONFIG_PATH: &str = "config/datasheets.yaml";
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub bind: String,
    pub data_dir: PathBuf,
    /// Worker threads for per-weapon calculations; 0 = Rayon default.
    pub workers: usize,
    pub dice_average: DiceAverage,
    pub default_save_roll: i32,
    pub default_hit_modifier: i32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            workers: 0,
            dice_average: DiceAverage::HalfFaces,
            default_save_roll: 3,
            default_hit_modifier: 0,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Read(std::io::Error),
    Parse(serde_yaml::Error),
    Env { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(err) => write!(f, "failed to read config file: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config YAML: {err}"),
            Self::Env { key, value } => write!(f, "invalid {key} '{value}'"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    /// Reads `path` if it exists; a missing file means defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::debug!("(AppConfig.from_file) {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path).map_err(ConfigError::Read)?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(ConfigError::Parse)
    }

    /// Config file named by `DATASHEETS_CONFIG` (or the default path), then env overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("DATASHEETS_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("DATASHEETS_BIND") {
            self.bind = bind;
        }
        if let Some(dir) = lookup("DATASHEETS_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = lookup("DATASHEETS_WORKERS") {
            self.workers = raw.trim().parse().map_err(|_| ConfigError::Env {
                key: "DATASHEETS_WORKERS",
                value: raw.clone(),
            })?;
        }
        Ok(())
    }

    pub fn worker_pool(&self) -> WorkerPool {
        WorkerPool::with_workers(self.workers)
    }

    /// Calculator settings for a request, falling back to configured defaults.
    pub fn calc_settings(&self, hit_modifier: Option<i32>, save_roll: Option<i32>) -> CalcSettings {
        CalcSettings::clamped(
            hit_modifier.unwrap_or(self.default_hit_modifier),
            save_roll.unwrap_or(self.default_save_roll),
            self.dice_average,
        )
    }
}
