use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::queue::EnqueuePolicy;

pub const DEFAULT_CAPACITY: usize = 100;
pub const DEFAULT_WORKERS: usize = 5;
pub const DEFAULT_WORK_MILLIS: u64 = 1_000;

/// How producers react to a full queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum Backpressure {
    #[default]
    Block,
    Timeout,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
#[serde(default)]
pub struct DispatcherConfig {
    /// Number of tasks the queue buffers before producers are held back.
    #[cfg_attr(
        feature = "clap",
        arg(long, env = "EVENTPOOL_CAPACITY", default_value_t = DEFAULT_CAPACITY)
    )]
    pub capacity: usize,

    /// Number of workers consuming the queue.
    #[cfg_attr(
        feature = "clap",
        arg(short, long, env = "EVENTPOOL_WORKERS", default_value_t = DEFAULT_WORKERS)
    )]
    pub workers: usize,

    /// Simulated processing time per task, in milliseconds.
    #[cfg_attr(
        feature = "clap",
        arg(long, env = "EVENTPOOL_WORK_MILLIS", default_value_t = DEFAULT_WORK_MILLIS)
    )]
    pub work_millis: u64,

    #[cfg_attr(
        feature = "clap",
        arg(long, value_enum, env = "EVENTPOOL_BACKPRESSURE", default_value_t = Backpressure::Block)
    )]
    pub backpressure: Backpressure,

    /// Upper bound on the wait for room, with `--backpressure timeout`.
    #[cfg_attr(feature = "clap", arg(long, env = "EVENTPOOL_ENQUEUE_TIMEOUT_MILLIS"))]
    pub enqueue_timeout_millis: Option<u64>,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            workers: DEFAULT_WORKERS,
            work_millis: DEFAULT_WORK_MILLIS,
            backpressure: Backpressure::Block,
            enqueue_timeout_millis: None,
        }
    }
}

impl DispatcherConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidArgument("capacity must be at least 1"));
        }
        if self.workers == 0 {
            return Err(Error::InvalidArgument("workers must be at least 1"));
        }
        self.enqueue_policy().map(|_| ())
    }

    pub fn enqueue_policy(&self) -> Result<EnqueuePolicy> {
        match (self.backpressure, self.enqueue_timeout_millis) {
            (Backpressure::Block, _) => Ok(EnqueuePolicy::Block),
            (Backpressure::Reject, _) => Ok(EnqueuePolicy::Reject),
            (Backpressure::Timeout, Some(millis)) => {
                Ok(EnqueuePolicy::Timeout(Duration::from_millis(millis)))
            }
            (Backpressure::Timeout, None) => Err(Error::InvalidArgument(
                "timeout backpressure needs an enqueue timeout",
            )),
        }
    }

    pub fn work_duration(&self) -> Duration {
        Duration::from_millis(self.work_millis)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DispatcherConfig::default();
        assert_eq!(config.capacity, 100);
        assert_eq!(config.workers, 5);
        assert_eq!(config.work_duration(), Duration::from_secs(1));
        assert_eq!(config.enqueue_policy().unwrap(), EnqueuePolicy::Block);
    }

    #[test]
    fn test_config_deserialization() {
        let config = r#"
		{
			"capacity": 2,
			"backpressure": "timeout",
			"enqueue_timeout_millis": 250
		}
		"#;

        let config = DispatcherConfig::from_json(config).unwrap();
        assert_eq!(config.capacity, 2);
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert_eq!(
            config.enqueue_policy().unwrap(),
            EnqueuePolicy::Timeout(Duration::from_millis(250))
        );
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            DispatcherConfig::from_json(r#"{ "workers": 0 }"#),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            DispatcherConfig::from_json(r#"{ "backpressure": "timeout" }"#),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            DispatcherConfig::from_json(r#"{ "backpressure": "sometimes" }"#),
            Err(Error::Serde(_))
        ));
    }
}
