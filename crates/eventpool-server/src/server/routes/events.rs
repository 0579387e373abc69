use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::Span;

use crate::server::data_models::{EventAck, EventRequest};
use crate::server::state::ServerState;
use crate::server::ServerError;

/// `POST /event`. An empty body is a plain "an event occurred".
pub async fn submit_event(
    State(server_state): State<Arc<ServerState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<EventAck>), ServerError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        EventRequest::default()
    } else {
        serde_json::from_slice::<EventRequest>(&body)?
    };

    let start = Instant::now();
    let ack = server_state.ingestor.handle(request.into()).await?;
    Span::current().record("task_id", ack.id);

    tracing::trace!(
        "Event {} enqueued in {} ms",
        ack.id,
        start.elapsed().as_millis()
    );

    Ok((StatusCode::OK, Json(ack.into())))
}
