//! # `eventpool`
//!
//! Event ingestion backed by a bounded task queue and a fixed pool of workers.
//!
//! Every accepted event gets a unique, increasing id from an [`IdAllocator`],
//! becomes a [`Task`] and is pushed onto a [`TaskQueue`]. A [`WorkerPool`] of
//! blocking workers pulls tasks off the queue in FIFO order and runs them
//! through a [`TaskHandler`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use eventpool::{Dispatcher, DispatcherConfig, Event};
//!
//! # async fn run() -> eventpool::Result<()> {
//! let dispatcher = Dispatcher::with_simulated_work(&DispatcherConfig::default())?;
//! let ingestor = dispatcher.ingestor();
//!
//! let ack = ingestor.handle(Event::from("disk full")).await?;
//! println!("Event {} added to queue", ack.id);
//!
//! // Stop intake, drain the queue and wait for every worker.
//! let report = dispatcher.shutdown().await?;
//! println!("{} tasks processed", report.processed());
//! # Ok(())
//! # }
//! ```

pub mod allocator;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod ingest;
pub mod pool;
pub mod queue;
pub mod task;
pub mod worker;

pub use allocator::IdAllocator;
pub use config::{Backpressure, DispatcherConfig};
pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use handler::{FnHandler, SimulatedWork, TaskHandler};
pub use ingest::{Ack, Ingestor};
pub use pool::{PoolReport, PoolState, WorkerPool};
pub use queue::{Dequeued, EnqueuePolicy, TaskQueue};
pub use task::{Event, Task, TaskId};
pub use worker::WorkerReport;
