//! Request Middleware
//!
//! Tags each response with an `x-request-id` and logs one `HTTP_REQUEST`
//! event per request.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::observability::{Logger, MetricsRegistry};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn track_request(
    State(metrics): State<Arc<MetricsRegistry>>,
    request: Request,
    next: Next,
) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    metrics.increment_requests();

    let mut response = next.run(request).await;
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        metrics.increment_not_found();
    } else if status.is_client_error() {
        metrics.increment_rejected();
    }

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    let elapsed_ms = started.elapsed().as_millis().to_string();
    let status_field = status.as_u16().to_string();
    let fields: [(&str, &str); 5] = [
        ("elapsed_ms", &elapsed_ms),
        ("method", &method),
        ("path", &path),
        ("request_id", &request_id),
        ("status", &status_field),
    ];

    if status.is_server_error() {
        Logger::error("HTTP_REQUEST", &fields);
    } else if status.is_client_error() {
        Logger::warn("HTTP_REQUEST", &fields);
    } else {
        Logger::info("HTTP_REQUEST", &fields);
    }

    response
}
