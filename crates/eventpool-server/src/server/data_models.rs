use eventpool::{Ack, Event, TaskId};
use serde::{Deserialize, Serialize};

/// Body of `POST /event`. The body itself is optional.
#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct EventRequest {
    pub payload: Option<String>,
}

impl From<EventRequest> for Event {
    fn from(request: EventRequest) -> Self {
        Event {
            payload: request.payload,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq)]
pub struct EventAck {
    pub id: TaskId,
    pub message: String,
}

impl From<Ack> for EventAck {
    fn from(ack: Ack) -> Self {
        Self {
            id: ack.id,
            message: format!("Event {} added to queue", ack.id),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
