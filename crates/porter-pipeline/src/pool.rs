//! Bounded worker pool on the tokio runtime.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Spawns tasks that run at most `size` at a time.
///
/// Submission never waits: each task acquires its permit after it has been
/// spawned, so a task aborted while still queued for a permit never starts.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    permits: Arc<Semaphore>,
    size: usize,
}

impl WorkerPool {
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(size)),
            size,
        }
    }

    /// Maximum number of task bodies running at once.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Spawn `task`; its body starts once a permit is free.
    pub fn submit<F, T>(&self, task: F) -> JoinHandle<T>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let permits = Arc::clone(&self.permits);
        tokio::spawn(async move {
            // The semaphore is never closed, so acquisition only waits
            let _permit = permits.acquire_owned().await;
            task.await
        })
    }
}
