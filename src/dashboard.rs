//! Loaded tables plus configuration, shared by the HTTP routes and the CLI.

use crate::config::AppConfig;
use crate::data::{load_tables, DataError, Tables};
use crate::parallel::WorkerPool;

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub config: AppConfig,
    pub tables: Tables,
    /// RFC 3339 time the tables were read.
    pub loaded_at: String,
    pool: WorkerPool,
}

impl Dashboard {
    pub fn open(config: AppConfig) -> Result<Self, DataError> {
        let tables = load_tables(&config.data_dir)?;
        Ok(Self::with_tables(config, tables))
    }

    pub fn with_tables(config: AppConfig, tables: Tables) -> Self {
        let pool = config.worker_pool();
        Self {
            config,
            tables,
            loaded_at: chrono::Utc::now().to_rfc3339(),
            pool,
        }
    }

    /// Worker threads built once from `config.workers`.
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }
}
