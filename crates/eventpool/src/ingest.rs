use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::allocator::IdAllocator;
use crate::error::{Error, Result};
use crate::queue::TaskQueue;
use crate::task::{Event, TaskId};

/// Acknowledgment for an accepted event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub id: TaskId,
}

/// Entry point for events: assigns each one an id and hands it to the queue.
///
/// Cheap to clone; all clones share the same allocator, queue and intake
/// switch.
#[derive(Debug, Clone)]
pub struct Ingestor {
    allocator: Arc<IdAllocator>,
    queue: Arc<TaskQueue>,
    accepting: Arc<AtomicBool>,
}

impl Ingestor {
    pub fn new(allocator: Arc<IdAllocator>, queue: Arc<TaskQueue>) -> Self {
        Self {
            allocator,
            queue,
            accepting: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Accept an event. Waits for room in the queue according to the queue's
    /// [`EnqueuePolicy`](crate::queue::EnqueuePolicy).
    ///
    /// An id taken by an event whose enqueue then fails is not reused.
    pub async fn handle(&self, event: Event) -> Result<Ack> {
        if !self.is_accepting() {
            return Err(Error::ShuttingDown);
        }

        let id = self.allocator.next();
        let task = event.into_task(id);
        tracing::debug!("Accepted {}", task);

        self.queue.enqueue(task).await?;
        Ok(Ack { id })
    }

    /// Refuse every event from now on, without touching the queue.
    pub fn stop_intake(&self) {
        if self.accepting.swap(false, Ordering::AcqRel) {
            tracing::info!("Event intake stopped");
        }
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::Acquire)
    }

    pub fn queue(&self) -> &Arc<TaskQueue> {
        &self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::EnqueuePolicy;
    use crate::task::DEFAULT_PAYLOAD;
    use std::time::Duration;

    fn ingestor(capacity: usize, policy: EnqueuePolicy) -> Ingestor {
        let queue = Arc::new(TaskQueue::new(capacity, policy).unwrap());
        Ingestor::new(Arc::new(IdAllocator::new()), queue)
    }

    #[tokio::test]
    async fn test_sequential_acks() {
        let ingestor = ingestor(10, EnqueuePolicy::Block);
        for expected in 1..=5 {
            let ack = ingestor.handle(Event::default()).await.unwrap();
            assert_eq!(ack, Ack { id: expected });
        }

        let first = ingestor.queue().dequeue().await.unwrap();
        assert_eq!(first.id(), 1);
        assert_eq!(first.payload(), DEFAULT_PAYLOAD);
    }

    #[tokio::test]
    async fn test_full_queue_is_reported() {
        let ingestor = ingestor(1, EnqueuePolicy::Timeout(Duration::from_millis(20)));
        ingestor.handle(Event::from("a")).await.unwrap();

        let err = ingestor.handle(Event::from("b")).await.unwrap_err();
        assert!(matches!(err, Error::QueueFull { capacity: 1 }));
    }

    #[tokio::test]
    async fn test_stop_intake_refuses_without_taking_ids() {
        let allocator = Arc::new(IdAllocator::new());
        let queue = Arc::new(TaskQueue::new(4, EnqueuePolicy::Block).unwrap());
        let ingestor = Ingestor::new(Arc::clone(&allocator), queue);

        ingestor.handle(Event::default()).await.unwrap();
        let clone = ingestor.clone();
        clone.stop_intake();

        assert!(!ingestor.is_accepting());
        assert!(matches!(
            ingestor.handle(Event::default()).await,
            Err(Error::ShuttingDown)
        ));
        assert_eq!(allocator.last(), 1);
    }

    #[tokio::test]
    async fn test_closed_queue_is_reported() {
        let ingestor = ingestor(4, EnqueuePolicy::Block);
        ingestor.queue().close();
        assert!(matches!(
            ingestor.handle(Event::default()).await,
            Err(Error::QueueClosed)
        ));
    }
}
