use std::thread::sleep;
use std::time::Duration;

use crate::task::Task;

/// Trait representing the processing a worker applies to every task it
/// dequeues. Runs on the worker's own blocking thread.
///
/// An `Err` is logged by the worker and the task is dropped; it is not
/// retried and the worker keeps going.
pub trait TaskHandler
where
    Self: Send + Sync + 'static,
{
    fn handle(&self, worker_id: usize, task: &Task) -> anyhow::Result<()>;
}

/// Reports the task and pauses for a fixed amount of time.
#[derive(Debug, Clone)]
pub struct SimulatedWork {
    duration: Duration,
}

impl SimulatedWork {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl Default for SimulatedWork {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl TaskHandler for SimulatedWork {
    fn handle(&self, worker_id: usize, task: &Task) -> anyhow::Result<()> {
        tracing::info!(
            "Worker {} processing task {} with data: {}",
            worker_id,
            task.id(),
            task.payload()
        );
        sleep(self.duration);
        Ok(())
    }
}

/// Turns a plain function or closure into a [`TaskHandler`].
pub struct FnHandler<F>
where
    F: Fn(usize, &Task) -> anyhow::Result<()>,
{
    op: F,
}

impl<F> FnHandler<F>
where
    F: Fn(usize, &Task) -> anyhow::Result<()> + Send + Sync + 'static,
{
    pub fn new(op: F) -> Self {
        Self { op }
    }
}

impl<F> From<F> for FnHandler<F>
where
    F: Fn(usize, &Task) -> anyhow::Result<()> + Send + Sync + 'static,
{
    fn from(op: F) -> Self {
        Self::new(op)
    }
}

impl<F> TaskHandler for FnHandler<F>
where
    F: Fn(usize, &Task) -> anyhow::Result<()> + Send + Sync + 'static,
{
    fn handle(&self, worker_id: usize, task: &Task) -> anyhow::Result<()> {
        (self.op)(worker_id, task)
    }
}
