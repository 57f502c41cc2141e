//! Rayon thread pool configuration for per-weapon calculations.
//!
//! A [WorkerPool] builds its dedicated threads once; clones share them. Use
//! [WorkerPool::install] to evaluate a unit's weapons on those threads, or
//! rely on Rayon's global pool (all CPU cores) with zero workers.

use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};

/// Worker threads that evaluate weapons in parallel.
#[derive(Debug, Clone, Default)]
pub struct WorkerPool {
    /// Dedicated pool. `None` means the global Rayon pool.
    pool: Option<Arc<ThreadPool>>,
}

impl WorkerPool {
    pub fn default_workers() -> Self {
        Self::default()
    }

    /// Build a dedicated pool of `n` threads. If it cannot be built the
    /// global pool is used instead.
    pub fn with_workers(n: usize) -> Self {
        if n == 0 {
            return Self::default();
        }
        match ThreadPoolBuilder::new()
            .num_threads(n)
            .thread_name(|index| format!("datasheets-calc-{index}"))
            .build()
        {
            Ok(pool) => Self {
                pool: Some(Arc::new(pool)),
            },
            Err(err) => {
                log::warn!("(WorkerPool.with_workers) falling back to global pool: {err}");
                Self::default()
            }
        }
    }

    /// Thread count of the pool closures run on.
    pub fn threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}
