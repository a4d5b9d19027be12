use crate::errors::{Error, Result};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use tracing::debug;

/// The result of one task together with the path it ran on.
#[derive(Debug)]
pub struct TaskReport<T> {
    pub path: PathBuf,
    pub result: Result<T>,
}

/// A bounded pool of worker threads running one independent task per path.
///
/// The pool never cancels, times out or retries a task. Paths that do not
/// fit into a free worker wait in the pool's queue. A task that panics is
/// reported as [`Error::Panicked`] against its path.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
}

impl WorkerPool {
    /// Builds a pool with exactly `max_workers` threads.
    pub fn new(max_workers: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(max_workers)
            .thread_name(|i| format!("treesub-worker-{i}"))
            .build()?;
        Ok(Self { pool })
    }

    pub fn size(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Submits `task` for every path and returns the reports as the tasks
    /// finish.
    ///
    /// Reports arrive in completion order, which has nothing to do with the
    /// order of `paths`. The iterator ends after the last task has reported.
    pub fn run<T, F>(&self, paths: Vec<PathBuf>, task: Arc<F>) -> Completions<T>
    where
        T: Send + 'static,
        F: Fn(&Path) -> Result<T> + Send + Sync + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let submitted = paths.len();

        for path in paths {
            let tx = tx.clone();
            let task = Arc::clone(&task);
            self.pool.spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| task(&path)))
                    .unwrap_or_else(|payload| {
                        Err(Error::Panicked(panic_message(payload.as_ref())))
                    });
                // The receiver only goes away if the caller stopped listening.
                let _ = tx.send(TaskReport { path, result });
            });
        }
        debug!(submitted, workers = self.size(), "submitted tasks to worker pool");

        Completions { rx }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Task reports in completion order. See [`WorkerPool::run`].
pub struct Completions<T> {
    rx: Receiver<TaskReport<T>>,
}

impl<T> Iterator for Completions<T> {
    type Item = TaskReport<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rx.recv().ok()
    }
}
