use axum::extract::MatchedPath;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info_span;

use crate::server::routes::{default, events};
use crate::server::state::ServerState;

#[derive(Debug, Args)]
pub struct RouterArgs {
    /// Upper bound on how long a single request may take, in seconds.
    #[clap(long, env = "EVENTPOOL_REQUEST_TIMEOUT_SECS", default_value = "15")]
    pub request_timeout_secs: u64,
}

pub fn init_router(args: &RouterArgs, state: ServerState) -> Router {
    let state = Arc::new(state);

    Router::new()
        .route("/event", post(events::submit_event))
        .route("/health", get(default::health_check))
        .with_state(state)
        .layer((
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    // Log the matched route's path (with placeholders not filled in).
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str);
                    tracing::debug!("{}", request.uri());

                    info_span!(
                        "http_request",
                        method = ?request.method(),
                        matched_path,
                        task_id = tracing::field::Empty,
                    )
                }),
            TimeoutLayer::new(Duration::from_secs(args.request_timeout_secs)),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, StatusCode};
    use eventpool::{Dispatcher, DispatcherConfig, EnqueuePolicy, IdAllocator, Ingestor, TaskQueue};
    use tower::ServiceExt;

    use crate::server::data_models::EventAck;

    fn args() -> RouterArgs {
        RouterArgs {
            request_timeout_secs: 5,
        }
    }

    fn post_event(body: &'static str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/event")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    async fn read_ack(response: axum::response::Response) -> EventAck {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let queue = Arc::new(TaskQueue::new(1, EnqueuePolicy::Block).unwrap());
        let state = ServerState::new(Ingestor::new(Arc::new(IdAllocator::new()), queue));
        let router = init_router(&args(), state);

        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_post_event_acknowledges_ids_in_order() {
        let config = DispatcherConfig {
            work_millis: 1,
            ..Default::default()
        };
        let dispatcher = Dispatcher::with_simulated_work(&config).unwrap();
        let router = init_router(&args(), ServerState::new(dispatcher.ingestor()));

        let response = router.clone().oneshot(post_event("")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            read_ack(response).await,
            EventAck {
                id: 1,
                message: "Event 1 added to queue".to_string()
            }
        );

        let response = router
            .clone()
            .oneshot(post_event(r#"{ "payload": "disk full" }"#))
            .await
            .unwrap();
        assert_eq!(read_ack(response).await.id, 2);

        let report = dispatcher.shutdown().await.unwrap();
        assert_eq!(report.processed(), 2);

        // Intake is stopped once shutdown has begun.
        let response = router.oneshot(post_event("")).await.unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_malformed_event_is_rejected() {
        let queue = Arc::new(TaskQueue::new(1, EnqueuePolicy::Block).unwrap());
        let state = ServerState::new(Ingestor::new(Arc::new(IdAllocator::new()), queue));
        let router = init_router(&args(), state);

        let response = router.oneshot(post_event("{ not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_full_queue_is_too_many_requests() {
        let queue = Arc::new(TaskQueue::new(1, EnqueuePolicy::Reject).unwrap());
        let state = ServerState::new(Ingestor::new(Arc::new(IdAllocator::new()), queue));
        let router = init_router(&args(), state);

        let response = router.clone().oneshot(post_event("")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Nobody is consuming, so the second event finds the queue full.
        let response = router.oneshot(post_event("")).await.unwrap();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }
}
