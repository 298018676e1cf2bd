//! Gateway middleware

pub mod rate_limit;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use stmindex_common::metrics::RequestMetrics;

/// Record request count and latency per route
pub async fn track_metrics(request: Request, next: Next) -> Response {
    // Use the route template so path parameters don't explode cardinality
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let method = request.method().to_string();

    let tracker = RequestMetrics::start(&method, &endpoint);
    let response = next.run(request).await;
    tracker.finish(response.status().as_u16());

    response
}
