use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

pub type TaskId = u64;

/// Payload used for events that arrive without one.
pub const DEFAULT_PAYLOAD: &str = "Event received";

/// One unit of enqueued work. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id: TaskId,
    payload: String,
}

impl Task {
    pub fn new(id: TaskId, payload: impl Into<String>) -> Self {
        Self {
            id,
            payload: payload.into(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task {} ({})", self.id, self.payload)
    }
}

/// Something happened and should be turned into a [`Task`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub payload: Option<String>,
}

impl Event {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: Some(payload.into()),
        }
    }

    pub(crate) fn into_task(self, id: TaskId) -> Task {
        Task::new(id, self.payload.unwrap_or_else(|| DEFAULT_PAYLOAD.to_string()))
    }
}

impl From<String> for Event {
    fn from(payload: String) -> Self {
        Self::new(payload)
    }
}

impl From<&str> for Event {
    fn from(payload: &str) -> Self {
        Self::new(payload)
    }
}
