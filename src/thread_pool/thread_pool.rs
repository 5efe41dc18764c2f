//! Kernel thread pool
//!
//! The particle kernels are rayon parallel iterators. By default they run on
//! rayon's global pool; a session can instead own a dedicated pool so its
//! kernels do not compete with other rayon users.

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::SimulationResult;

/// Where the simulation kernels execute
#[derive(Debug, Default)]
pub struct KernelPool {
    /// None = rayon global pool
    pool: Option<ThreadPool>,
}

impl KernelPool {
    /// Run kernels on rayon's global pool
    pub fn global() -> Self {
        Self { pool: None }
    }

    /// Build a dedicated pool. `0` picks one thread per core minus one for
    /// the caller's thread.
    pub fn with_threads(threads: usize) -> SimulationResult<Self> {
        let threads = if threads == 0 {
            num_cpus::get().saturating_sub(1).max(1)
        } else {
            threads
        };

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|idx| format!("particle-worker-{}", idx))
            .build()?;

        log::debug!("[KernelPool] created dedicated pool with {} threads", threads);
        Ok(Self { pool: Some(pool) })
    }

    pub fn from_config(worker_threads: Option<usize>) -> SimulationResult<Self> {
        match worker_threads {
            Some(threads) => Self::with_threads(threads),
            None => Ok(Self::global()),
        }
    }

    pub fn is_dedicated(&self) -> bool {
        self.pool.is_some()
    }

    pub fn thread_count(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Run `op` so that rayon iterators inside it use this pool
    pub fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}
