use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::task::{spawn_blocking, JoinHandle};

use crate::error::{Error, Result};
use crate::handler::TaskHandler;
use crate::queue::TaskQueue;

/// What a worker did before the queue closed on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub processed: usize,
    pub failed: usize,
}

/// A long-lived consumer of a [`TaskQueue`], running on its own blocking
/// thread until the queue is closed and drained.
#[derive(Debug)]
pub struct Worker {
    id: usize,
    join_handle: JoinHandle<WorkerReport>,
}

impl Worker {
    /// Start a worker. `active` is decremented exactly once when the worker
    /// exits, whether it finished normally or its handler panicked.
    pub(crate) fn spawn(
        id: usize,
        queue: Arc<TaskQueue>,
        handler: Arc<dyn TaskHandler>,
        active: Arc<AtomicUsize>,
    ) -> Self {
        let join_handle = spawn_blocking(move || {
            let _done = Completion(active);
            run(id, &queue, handler.as_ref())
        });
        Self { id, join_handle }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }

    pub(crate) async fn join(self) -> Result<WorkerReport> {
        let id = self.id;
        self.join_handle.await.map_err(|err| {
            tracing::error!("Worker {} did not exit cleanly: {}", id, err);
            Error::WorkerPanicked { worker_id: id }
        })
    }
}

struct Completion(Arc<AtomicUsize>);

impl Drop for Completion {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

fn run(id: usize, queue: &TaskQueue, handler: &dyn TaskHandler) -> WorkerReport {
    tracing::trace!("Worker {} started", id);

    let mut report = WorkerReport {
        worker_id: id,
        ..Default::default()
    };

    while let Some(task) = queue.dequeue_blocking() {
        match handler.handle(id, &task) {
            Ok(()) => report.processed += 1,
            Err(err) => {
                tracing::error!("Worker {} failed on task {}: {:#}", id, task.id(), err);
                report.failed += 1;
            }
        }
    }

    tracing::debug!(
        "Worker {} stopped after {} tasks ({} failed)",
        id,
        report.processed + report.failed,
        report.failed
    );
    report
}
