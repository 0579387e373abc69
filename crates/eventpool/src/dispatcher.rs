use std::sync::Arc;

use crate::allocator::IdAllocator;
use crate::config::DispatcherConfig;
use crate::error::Result;
use crate::handler::{SimulatedWork, TaskHandler};
use crate::ingest::Ingestor;
use crate::pool::{PoolReport, PoolState, WorkerPool};
use crate::queue::TaskQueue;

/// The assembled system: one allocator and one queue, shared by an
/// [`Ingestor`] on the producing side and a [`WorkerPool`] on the consuming
/// side.
///
/// Must be stopped with [`Dispatcher::shutdown`].
#[derive(Debug)]
pub struct Dispatcher {
    ingestor: Ingestor,
    pool: Option<WorkerPool>,
}

impl Dispatcher {
    /// Create the queue and start the workers. Events can be submitted as
    /// soon as this returns. Must be called from within a Tokio runtime.
    pub fn start(config: &DispatcherConfig, handler: Arc<dyn TaskHandler>) -> Result<Self> {
        config.validate()?;

        let queue = Arc::new(TaskQueue::new(config.capacity, config.enqueue_policy()?)?);
        let pool = WorkerPool::start(config.workers, Arc::clone(&queue), handler)?;
        let ingestor = Ingestor::new(Arc::new(IdAllocator::new()), queue);

        tracing::info!(
            "Dispatcher started: {} workers, queue capacity {}, {:?} on full queue",
            config.workers,
            config.capacity,
            config.backpressure
        );
        Ok(Self {
            ingestor,
            pool: Some(pool),
        })
    }

    /// [`Dispatcher::start`] with the simulated-work handler.
    pub fn with_simulated_work(config: &DispatcherConfig) -> Result<Self> {
        let handler = Arc::new(SimulatedWork::new(config.work_duration()));
        Self::start(config, handler)
    }

    pub fn ingestor(&self) -> Ingestor {
        self.ingestor.clone()
    }

    pub fn state(&self) -> PoolState {
        self.pool
            .as_ref()
            .map_or(PoolState::Terminated, WorkerPool::state)
    }

    /// Stop intake, close the queue, let the workers drain it and wait for
    /// all of them to finish.
    pub async fn shutdown(mut self) -> Result<PoolReport> {
        self.ingestor.stop_intake();

        let Some(pool) = self.pool.take() else {
            return Ok(PoolReport::default());
        };

        tracing::info!(
            "Shutting down, draining {} buffered tasks",
            self.ingestor.queue().len()
        );
        pool.shutdown().await
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        if self.pool.is_some() {
            tracing::warn!("Dispatcher dropped without shutdown; buffered tasks may be lost");
            self.ingestor.stop_intake();
            self.ingestor.queue().close();
        }
    }
}
