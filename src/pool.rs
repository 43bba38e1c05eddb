//! Fork-join worker pools.
//!
//! Each engine owns one [`WorkerPool`]. The rayon pool behind it is built on
//! first use and dropped on [`WorkerPool::shutdown`]; the next call builds a
//! fresh one. If the pool cannot be built, work runs on the calling thread.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};

/// Number of workers to use when none is configured.
pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Builds the thread pool for a named pool with the given worker count.
type PoolBuild = fn(&'static str, usize) -> Result<ThreadPool, ThreadPoolBuildError>;

fn build_pool(name: &'static str, workers: usize) -> Result<ThreadPool, ThreadPoolBuildError> {
    ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(move |i| format!("{}-{}", name, i))
        .build()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PoolState {
    /// Not built yet, or shut down
    Idle,
    Running,
    /// Building failed; running inline until the next shutdown
    Degraded,
}

/// A lazily created, fixed-size fork-join pool.
pub struct WorkerPool {
    name: &'static str,
    workers: usize,
    pool: Option<ThreadPool>,
    state: PoolState,
    build: PoolBuild,
}

impl WorkerPool {
    /// `workers == 0` means one worker per available CPU.
    pub fn new(name: &'static str, workers: usize) -> Self {
        Self::with_builder(name, workers, build_pool)
    }

    fn with_builder(name: &'static str, workers: usize, build: PoolBuild) -> Self {
        let workers = if workers == 0 {
            default_worker_count()
        } else {
            workers
        };
        Self {
            name,
            workers,
            pool: None,
            state: PoolState::Idle,
            build,
        }
    }

    /// Number of segments work is split into.
    pub fn worker_count(&self) -> usize {
        self.workers
    }

    /// True while a thread pool is alive.
    pub fn is_running(&self) -> bool {
        self.state == PoolState::Running
    }

    /// True if building the pool failed and work runs inline.
    pub fn is_degraded(&self) -> bool {
        self.state == PoolState::Degraded
    }

    /// Drop the thread pool. The next call to [`WorkerPool::run`] rebuilds it.
    pub fn shutdown(&mut self) {
        if self.pool.take().is_some() {
            log::info!("{} pool stopped", self.name);
        }
        self.state = PoolState::Idle;
    }

    fn ensure_pool(&mut self) -> Option<&ThreadPool> {
        if self.workers <= 1 || self.state == PoolState::Degraded {
            return None;
        }
        if self.pool.is_none() {
            match (self.build)(self.name, self.workers) {
                Ok(pool) => {
                    log::info!("{} pool started with {} workers", self.name, self.workers);
                    self.pool = Some(pool);
                    self.state = PoolState::Running;
                }
                Err(e) => {
                    log::warn!(
                        "Failed to start {} pool ({}), running single-threaded",
                        self.name,
                        e
                    );
                    self.state = PoolState::Degraded;
                    return None;
                }
            }
        }
        self.pool.as_ref()
    }

    /// Run `task` once per item and block until all have finished.
    ///
    /// A panicking task does not affect the others. Returns the number of
    /// tasks that panicked.
    pub fn run<T, F>(&mut self, items: Vec<T>, task: F) -> usize
    where
        T: Send,
        F: Fn(T) + Sync,
    {
        let failed = AtomicUsize::new(0);
        let guarded = |item: T| {
            if panic::catch_unwind(AssertUnwindSafe(|| task(item))).is_err() {
                failed.fetch_add(1, Ordering::Relaxed);
            }
        };

        match self.ensure_pool() {
            Some(pool) => pool.scope(|scope| {
                for item in items {
                    let guarded = &guarded;
                    scope.spawn(move |_| guarded(item));
                }
            }),
            None => items.into_iter().for_each(guarded),
        }

        failed.into_inner()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("name", &self.name)
            .field("workers", &self.workers)
            .field("state", &self.state)
            .finish()
    }
}
