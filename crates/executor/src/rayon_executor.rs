//! Rayon-based parallel executor.

use crate::Executor;
use rayon::prelude::*;

/// A parallel executor using rayon's global work-stealing thread pool.
///
/// To bound the number of concurrent renders, configure the global pool
/// before the first batch runs:
///
/// ```ignore
/// rayon::ThreadPoolBuilder::new()
///     .num_threads(4)
///     .build_global()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct RayonExecutor {
    /// Cached thread count for reporting via `parallelism()`.
    num_threads: usize,
}

impl RayonExecutor {
    pub fn new() -> Self {
        Self {
            num_threads: rayon::current_num_threads(),
        }
    }
}

impl Default for RayonExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor for RayonExecutor {
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static,
    {
        // Indexed parallel collect keeps input order.
        items.into_par_iter().map(f).collect()
    }

    fn parallelism(&self) -> usize {
        self.num_threads
    }

    fn name(&self) -> &'static str {
        "RayonExecutor"
    }
}
