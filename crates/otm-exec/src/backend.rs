//! Execution backend trait with serial and thread-pool implementations.
//!
//! Every kernel dispatch is a single-level parallel-for over a dense index
//! space (points or nodes). Work items never depend on each other within
//! one dispatch, and each dispatch returns only after every item finished,
//! so consecutive dispatches are separated by a full barrier.

use rayon::prelude::*;

/// Trait for data-parallel execution strategies.
///
/// # Implementations
/// - [`SerialBackend`]: Sequential reference (always available)
/// - [`RayonBackend`]: rayon work-stealing pool
pub trait ExecutionBackend: Send + Sync {
    /// Returns the backend name (e.g., "serial", "rayon").
    fn name(&self) -> &str;

    /// Returns true if items may run concurrently.
    fn is_parallel(&self) -> bool;

    /// Evaluate `f(i)` for every `i` in `0..count`, collecting results in index order.
    ///
    /// This is the gather primitive: each index owns exactly one output slot.
    fn map<T, F>(&self, count: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Send + Sync;

    /// Apply `f(i, &mut items[i])` to every item.
    fn for_each_mut<T, F>(&self, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Send + Sync;

    /// Overwrite every item with `value`.
    fn fill<T>(&self, items: &mut [T], value: T)
    where
        T: Copy + Send + Sync,
    {
        self.for_each_mut(items, |_, item| *item = value);
    }
}

/// Sequential reference backend.
///
/// Used for:
/// - Correctness validation (parallel results should match within tolerance)
/// - Small problems where thread dispatch isn't worthwhile
#[derive(Debug, Clone, Copy, Default)]
pub struct SerialBackend;

impl SerialBackend {
    /// Creates a new serial backend.
    pub fn new() -> Self {
        Self
    }
}

impl ExecutionBackend for SerialBackend {
    fn name(&self) -> &str {
        "serial"
    }

    fn is_parallel(&self) -> bool {
        false
    }

    fn map<T, F>(&self, count: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Send + Sync,
    {
        (0..count).map(f).collect()
    }

    fn for_each_mut<T, F>(&self, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Send + Sync,
    {
        for (i, item) in items.iter_mut().enumerate() {
            f(i, item);
        }
    }
}

/// Thread-pool backend built on rayon.
///
/// Runs on the global rayon pool unless constructed with
/// [`RayonBackend::with_threads`], which owns a dedicated pool.
pub struct RayonBackend {
    pool: Option<rayon::ThreadPool>,
}

impl RayonBackend {
    /// Creates a backend running on the global rayon pool.
    pub fn new() -> Self {
        Self { pool: None }
    }

    /// Creates a backend with a dedicated pool of `threads` workers.
    pub fn with_threads(threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("otm-worker-{i}"))
            .build()?;
        Ok(Self { pool: Some(pool) })
    }

    /// Number of worker threads available to this backend.
    pub fn threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl Default for RayonBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionBackend for RayonBackend {
    fn name(&self) -> &str {
        "rayon"
    }

    fn is_parallel(&self) -> bool {
        true
    }

    fn map<T, F>(&self, count: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Send + Sync,
    {
        self.install(|| (0..count).into_par_iter().map(f).collect())
    }

    fn for_each_mut<T, F>(&self, items: &mut [T], f: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Send + Sync,
    {
        self.install(|| {
            items
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, item)| f(i, item))
        });
    }
}
