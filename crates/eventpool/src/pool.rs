//! Fixed-size pool of [`Worker`]s sharing one [`TaskQueue`].
//!
//! The only way to stop the workers is to close the queue: each worker drains
//! what is left and exits. The pool handle must then be consumed with
//! [`WorkerPool::await_completion`] (or [`WorkerPool::shutdown`], which closes
//! the queue first) so that no task is abandoned mid-flight.

use std::fmt::{self, Display};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::future::join_all;

use crate::error::{Error, Result};
use crate::handler::TaskHandler;
use crate::queue::TaskQueue;
use crate::worker::{Worker, WorkerReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    Initializing,
    /// Queue open, workers consuming.
    Running,
    /// Queue closed, workers still consuming buffered tasks.
    Draining,
    /// Every worker has exited.
    Terminated,
}

impl Display for PoolState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self {
            PoolState::Initializing => "initializing",
            PoolState::Running => "running",
            PoolState::Draining => "draining",
            PoolState::Terminated => "terminated",
        };
        f.write_str(state)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PoolReport {
    pub workers: Vec<WorkerReport>,
}

impl PoolReport {
    pub fn processed(&self) -> usize {
        self.workers.iter().map(|w| w.processed).sum()
    }

    pub fn failed(&self) -> usize {
        self.workers.iter().map(|w| w.failed).sum()
    }
}

#[derive(Debug)]
pub struct WorkerPool {
    workers: Vec<Worker>,
    queue: Arc<TaskQueue>,
    active: Arc<AtomicUsize>,
}

impl WorkerPool {
    /// Launch `num_workers` workers, all bound to `queue`. Must be called
    /// from within a Tokio runtime.
    pub fn start(
        num_workers: usize,
        queue: Arc<TaskQueue>,
        handler: Arc<dyn TaskHandler>,
    ) -> Result<Self> {
        if num_workers == 0 {
            return Err(Error::InvalidArgument("worker pool needs at least one worker"));
        }

        tracing::debug!("Worker pool {}", PoolState::Initializing);
        let active = Arc::new(AtomicUsize::new(num_workers));

        // Workers are numbered from 1 in diagnostics
        let workers = (1..=num_workers)
            .map(|id| {
                Worker::spawn(
                    id,
                    Arc::clone(&queue),
                    Arc::clone(&handler),
                    Arc::clone(&active),
                )
            })
            .collect::<Vec<_>>();

        tracing::info!("Started {} workers", num_workers);
        Ok(Self {
            workers,
            queue,
            active,
        })
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Number of workers that have not exited yet.
    pub fn active_workers(&self) -> usize {
        self.active.load(Ordering::Acquire)
    }

    pub fn queue(&self) -> &Arc<TaskQueue> {
        &self.queue
    }

    pub fn state(&self) -> PoolState {
        if self.active_workers() == 0 {
            PoolState::Terminated
        } else if self.queue.is_closed() {
            PoolState::Draining
        } else {
            PoolState::Running
        }
    }

    /// Wait until every worker has reported completion. Only returns once the
    /// queue has been closed by someone and drained.
    ///
    /// All workers are joined even if one of them panicked; the first panic is
    /// returned as [`Error::WorkerPanicked`].
    pub async fn await_completion(self) -> Result<PoolReport> {
        let results = join_all(self.workers.into_iter().map(Worker::join)).await;

        let mut report = PoolReport::default();
        let mut first_err = None;
        for result in results {
            match result {
                Ok(worker) => report.workers.push(worker),
                Err(err) => {
                    first_err.get_or_insert(err);
                }
            }
        }

        tracing::info!(
            "Worker pool {}: {} tasks processed, {} failed",
            PoolState::Terminated,
            report.processed(),
            report.failed()
        );

        match first_err {
            Some(err) => Err(err),
            None => Ok(report),
        }
    }

    /// Close the shared queue, let the workers drain it and wait for them.
    pub async fn shutdown(self) -> Result<PoolReport> {
        self.queue.close();
        tracing::debug!("Worker pool {}", self.state());
        self.await_completion().await
    }
}
