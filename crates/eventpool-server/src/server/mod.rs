mod init;
mod state;
pub mod data_models;
pub mod routes;
pub mod utils;

pub use init::{init_router, RouterArgs};
pub use state::ServerState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::server::data_models::ErrorResponse;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Internal server error: `{0}`")]
    InternalError(#[from] anyhow::Error),

    #[error("Invalid event: {0}")]
    InvalidEvent(#[from] serde_json::Error),

    #[error("Too many requests: {0}")]
    TooManyRequestsError(eventpool::Error),

    #[error("Service unavailable: {0}")]
    Unavailable(eventpool::Error),
}

impl From<eventpool::Error> for ServerError {
    fn from(err: eventpool::Error) -> Self {
        use eventpool::Error::*;

        match err {
            QueueFull { .. } => ServerError::TooManyRequestsError(err),
            QueueClosed | ShuttingDown => ServerError::Unavailable(err),
            other => ServerError::InternalError(other.into()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::InvalidEvent(_) => StatusCode::BAD_REQUEST,
            ServerError::TooManyRequestsError(_) => StatusCode::TOO_MANY_REQUESTS,
            ServerError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
