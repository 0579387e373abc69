use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("Queue full: {capacity} tasks buffered")]
    QueueFull { capacity: usize },

    #[error("Queue closed")]
    QueueClosed,

    #[error("Intake stopped, shutting down")]
    ShuttingDown,

    #[error("Worker {worker_id} panicked")]
    WorkerPanicked { worker_id: usize },

    #[error("Serde JSON error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::InvalidArgument("test");
        assert_eq!(error.to_string(), "Invalid argument: test");

        let error = Error::QueueFull { capacity: 100 };
        assert_eq!(error.to_string(), "Queue full: 100 tasks buffered");

        let error = Error::QueueClosed;
        assert_eq!(error.to_string(), "Queue closed");

        let error = Error::ShuttingDown;
        assert_eq!(error.to_string(), "Intake stopped, shutting down");

        let error = Error::WorkerPanicked { worker_id: 3 };
        assert_eq!(error.to_string(), "Worker 3 panicked");

        let error = Error::Serde(serde_json::from_str::<u32>("nope").unwrap_err());
        assert!(error.to_string().starts_with("Serde JSON error: "));
    }
}
