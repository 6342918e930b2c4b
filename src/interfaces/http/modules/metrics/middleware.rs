//! HTTP request metrics
//!
//! - `campus_coffee_http_requests_total{method, path, status}` counter
//! - `campus_coffee_http_request_duration_seconds{method, path}` histogram
//!
//! `path` is the route template (`/api/pos/{id}`), so ids never become label
//! values. Unmatched requests are folded into a single `unmatched` label.

use std::time::Instant;

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};

pub const HTTP_REQUESTS_TOTAL: &str = "campus_coffee_http_requests_total";
pub const HTTP_REQUEST_DURATION: &str = "campus_coffee_http_request_duration_seconds";

fn path_label(request: &Request<Body>) -> String {
    request
        .extensions()
        .get::<MatchedPath>()
        .map(|mp| mp.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}

pub async fn http_metrics_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().to_string();
    let path = path_label(&request);

    let start = Instant::now();
    let response = next.run(request).await;
    let elapsed = start.elapsed().as_secs_f64();

    let status = response.status().as_u16().to_string();

    metrics::counter!(HTTP_REQUESTS_TOTAL, "method" => method.clone(), "path" => path.clone(), "status" => status)
        .increment(1);
    metrics::histogram!(HTTP_REQUEST_DURATION, "method" => method, "path" => path)
        .record(elapsed);

    response
}
