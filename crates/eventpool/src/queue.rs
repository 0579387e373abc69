//! Bounded, multi-producer/multi-consumer FIFO of [`Task`]s.
//!
//! Producers are suspended (or refused, depending on the [`EnqueuePolicy`])
//! while the queue holds `capacity` tasks; consumers are suspended while it is
//! empty. Closing the queue stops intake, but everything already buffered is
//! still handed out before consumers observe the closed signal.

use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use flume::{Receiver, RecvTimeoutError, SendTimeoutError, Sender, TrySendError};

use crate::error::{Error, Result};
use crate::task::{Task, TaskId};

/// What a producer does when the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnqueuePolicy {
    /// Wait for as long as it takes for a consumer to make room.
    #[default]
    Block,
    /// Wait at most the given duration, then give up with [`Error::QueueFull`].
    Timeout(Duration),
    /// Fail with [`Error::QueueFull`] straight away.
    Reject,
}

/// Outcome of a bounded wait on [`TaskQueue::dequeue_timeout`].
#[derive(Debug, PartialEq, Eq)]
pub enum Dequeued {
    Task(Task),
    TimedOut,
    Closed,
}

#[derive(Debug)]
pub struct TaskQueue {
    // `None` once closed. The receiver lives as long as the queue, so sends
    // can only ever fail because of the capacity bound.
    sender: RwLock<Option<Sender<Task>>>,
    receiver: Receiver<Task>,
    capacity: usize,
    policy: EnqueuePolicy,
}

impl TaskQueue {
    pub fn new(capacity: usize, policy: EnqueuePolicy) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidArgument("queue capacity must be at least 1"));
        }

        let (sender, receiver) = flume::bounded(capacity);
        Ok(Self {
            sender: RwLock::new(Some(sender)),
            receiver,
            capacity,
            policy,
        })
    }

    fn sender(&self) -> Result<Sender<Task>> {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(Error::QueueClosed)
    }

    /// Append a task, suspending the caller according to the queue's policy
    /// while the queue is full.
    pub async fn enqueue(&self, task: Task) -> Result<()> {
        let sender = self.sender()?;
        let id = task.id();

        let sent = match self.policy {
            EnqueuePolicy::Block => sender.send_async(task).await.map_err(|_| Error::QueueClosed),
            EnqueuePolicy::Timeout(wait) => {
                match tokio::time::timeout(wait, sender.send_async(task)).await {
                    Ok(sent) => sent.map_err(|_| Error::QueueClosed),
                    Err(_) => Err(self.full()),
                }
            }
            EnqueuePolicy::Reject => sender.try_send(task).map_err(|e| self.map_try_send(e)),
        };

        self.log_enqueue(id, &sent);
        sent
    }

    /// Same as [`TaskQueue::enqueue`], for callers outside of an async context.
    pub fn enqueue_blocking(&self, task: Task) -> Result<()> {
        let sender = self.sender()?;
        let id = task.id();

        let sent = match self.policy {
            EnqueuePolicy::Block => sender.send(task).map_err(|_| Error::QueueClosed),
            EnqueuePolicy::Timeout(wait) => sender.send_timeout(task, wait).map_err(|e| match e {
                SendTimeoutError::Timeout(_) => self.full(),
                SendTimeoutError::Disconnected(_) => Error::QueueClosed,
            }),
            EnqueuePolicy::Reject => sender.try_send(task).map_err(|e| self.map_try_send(e)),
        };

        self.log_enqueue(id, &sent);
        sent
    }

    /// Wait for the next task. `None` means the queue was closed and every
    /// buffered task has been handed out.
    pub async fn dequeue(&self) -> Option<Task> {
        self.receiver.recv_async().await.ok()
    }

    /// Blocking flavour of [`TaskQueue::dequeue`], meant for worker threads.
    pub fn dequeue_blocking(&self) -> Option<Task> {
        self.receiver.recv().ok()
    }

    pub fn dequeue_timeout(&self, timeout: Duration) -> Dequeued {
        match self.receiver.recv_timeout(timeout) {
            Ok(task) => Dequeued::Task(task),
            Err(RecvTimeoutError::Timeout) => Dequeued::TimedOut,
            Err(RecvTimeoutError::Disconnected) => Dequeued::Closed,
        }
    }

    /// Stop accepting tasks. Already buffered tasks are still delivered, and
    /// producers suspended inside `enqueue` at this point are let through.
    pub fn close(&self) {
        let sender = self
            .sender
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if sender.is_some() {
            tracing::info!("Task queue closed with {} tasks buffered", self.len());
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> EnqueuePolicy {
        self.policy
    }

    fn full(&self) -> Error {
        Error::QueueFull {
            capacity: self.capacity,
        }
    }

    fn map_try_send(&self, err: TrySendError<Task>) -> Error {
        match err {
            TrySendError::Full(_) => self.full(),
            TrySendError::Disconnected(_) => Error::QueueClosed,
        }
    }

    fn log_enqueue(&self, id: TaskId, sent: &Result<()>) {
        match sent {
            Ok(()) => tracing::trace!("Task {} enqueued ({}/{})", id, self.len(), self.capacity),
            Err(Error::QueueFull { .. }) => {
                tracing::warn!("Task {} refused, queue full ({:?})", id, self.policy)
            }
            Err(err) => tracing::error!("Failed to enqueue task {}: {}", id, err),
        }
    }
}
