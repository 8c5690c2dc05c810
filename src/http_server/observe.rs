//! Request logging
//!
//! One REQUEST_COMPLETE line per request, tagged with a fresh request id
//! that is also returned in the `x-request-id` response header.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::observability::{log_event_with_fields, Event, MetricsRegistry};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware counting and logging every request
pub async fn log_request(
    State(metrics): State<Arc<MetricsRegistry>>,
    req: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let request_id = Uuid::new_v4().to_string();
    let method = req.method().to_string();
    let path = req.uri().path().to_string();

    metrics.increment_requests();
    let mut response = next.run(req).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    log_event_with_fields(
        Event::RequestComplete,
        &[
            ("duration_ms", &started.elapsed().as_millis().to_string()),
            ("method", &method),
            ("path", &path),
            ("request_id", &request_id),
            ("status", response.status().as_str()),
        ],
    );

    response
}
