//! Thread pool management for the data-parallel passes
//!
//! Per-pixel and per-point loops run on a process-wide rayon pool. Until
//! [`init_thread_pool`] is called they use rayon's global pool.

use fitfield_core::{Error, Result};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::OnceLock;

static GLOBAL_THREAD_POOL: OnceLock<ThreadPool> = OnceLock::new();

/// Thread pool configuration for parallel processing
#[derive(Debug, Clone)]
pub struct ThreadPoolConfig {
    /// Number of threads to use (None = automatic)
    pub num_threads: Option<usize>,
    /// Thread stack size in bytes
    pub stack_size: Option<usize>,
    /// Thread name prefix
    pub thread_name_prefix: String,
    /// When disabled the pool runs a single thread (useful for debugging)
    pub enabled: bool,
}

impl ThreadPoolConfig {
    fn new() -> Self {
        Self {
            num_threads: None,
            stack_size: None,
            thread_name_prefix: String::new(),
            enabled: true,
        }
    }

    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = Some(num_threads);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl Default for ThreadPoolConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: "fitfield".to_string(),
            ..Self::new()
        }
    }
}

/// Initialize the global thread pool. Later calls are ignored.
pub fn init_thread_pool(config: ThreadPoolConfig) -> Result<()> {
    if GLOBAL_THREAD_POOL.get().is_some() {
        return Ok(());
    }

    let mut builder = ThreadPoolBuilder::new();

    if !config.enabled {
        builder = builder.num_threads(1);
    } else if let Some(num_threads) = config.num_threads {
        builder = builder.num_threads(num_threads);
    }

    if let Some(stack_size) = config.stack_size {
        builder = builder.stack_size(stack_size);
    }

    if !config.thread_name_prefix.is_empty() {
        let prefix = config.thread_name_prefix.clone();
        builder = builder.thread_name(move |index| format!("{}-{}", prefix, index));
    }

    let pool = builder
        .build()
        .map_err(|e| Error::Algorithm(format!("Failed to create thread pool: {}", e)))?;

    tracing::info!(threads = pool.current_num_threads(), "thread pool initialized");

    GLOBAL_THREAD_POOL
        .set(pool)
        .map_err(|_| Error::Algorithm("Thread pool already initialized".to_string()))?;

    Ok(())
}

/// Run `op` inside the configured pool
pub fn execute_parallel<F, R>(op: F) -> R
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    match GLOBAL_THREAD_POOL.get() {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

/// Parallel map preserving order
pub fn parallel_map<T, U, F>(data: &[T], f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    execute_parallel(|| data.par_iter().map(f).collect())
}

/// Apply `f` to every row of a row-major slice and reduce the per-row results.
///
/// `reduce_op` must be associative and commutative.
pub fn parallel_rows_reduce<T, U, F, R>(
    data: &mut [T],
    width: usize,
    identity: U,
    f: F,
    reduce_op: R,
) -> U
where
    T: Send,
    U: Clone + Send + Sync,
    F: Fn(usize, &mut [T]) -> U + Sync + Send,
    R: Fn(U, U) -> U + Sync + Send,
{
    if width == 0 || data.is_empty() {
        return identity;
    }
    execute_parallel(|| {
        data.par_chunks_mut(width)
            .enumerate()
            .map(|(y, row)| f(y, row))
            .reduce(|| identity.clone(), reduce_op)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_map() {
        let data: Vec<i32> = (0..1000).collect();
        let doubled = parallel_map(&data, |x| x * 2);
        assert_eq!(doubled[999], 1998);
        assert!(doubled.iter().enumerate().all(|(i, v)| *v == 2 * i as i32));
    }

    #[test]
    fn test_rows_reduce() {
        let mut grid = vec![0u32; 12];
        let max_row = parallel_rows_reduce(
            &mut grid,
            4,
            0usize,
            |y, row| {
                row.fill(y as u32);
                y
            },
            usize::max,
        );
        assert_eq!(max_row, 2);
        assert_eq!(grid[4..8], [1, 1, 1, 1]);
    }

    #[test]
    fn test_rows_reduce_empty() {
        let mut grid: Vec<u8> = Vec::new();
        assert_eq!(parallel_rows_reduce(&mut grid, 0, 7, |_, _| 1, |a, b| a + b), 7);
    }

    #[test]
    fn test_config_defaults() {
        let config = ThreadPoolConfig::default().with_threads(2).with_enabled(false);
        assert_eq!(config.num_threads, Some(2));
        assert!(!config.enabled);
        assert_eq!(config.thread_name_prefix, "fitfield");
    }
}
