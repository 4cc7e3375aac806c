//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::extract::MatchedPath;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "photoid_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "photoid_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "photoid_http_requests_in_flight";

    // Processing metrics
    pub const PHOTOS_PROCESSED_TOTAL: &str = "photoid_photos_processed_total";
    pub const PHOTOS_FAILED_TOTAL: &str = "photoid_photos_failed_total";
    pub const DOWNLOAD_DURATION_SECONDS: &str = "photoid_download_duration_seconds";
    pub const BG_REMOVAL_DURATION_SECONDS: &str = "photoid_bg_removal_duration_seconds";
    pub const RENDER_DURATION_SECONDS: &str = "photoid_render_duration_seconds";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record a photo that was returned to the caller.
pub fn record_photo_processed(branch: &str, format: &str) {
    let labels = [
        ("branch", branch.to_string()),
        ("format", format.to_string()),
    ];
    counter!(names::PHOTOS_PROCESSED_TOTAL, &labels).increment(1);
}

/// Record a failed photo request.
pub fn record_photo_failed(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::PHOTOS_FAILED_TOTAL, &labels).increment(1);
}

/// Record download duration.
pub fn record_download_duration(duration_secs: f64) {
    histogram!(names::DOWNLOAD_DURATION_SECONDS).record(duration_secs);
}

/// Record background removal duration.
pub fn record_bg_removal_duration(duration_secs: f64) {
    histogram!(names::BG_REMOVAL_DURATION_SECONDS).record(duration_secs);
}

/// Record detect/crop/encode duration.
pub fn record_render_duration(duration_secs: f64) {
    histogram!(names::RENDER_DURATION_SECONDS).record(duration_secs);
}

/// Label for the route that served a request.
///
/// Unrouted paths collapse into one label so scanners cannot inflate
/// cardinality.
fn route_label(matched: Option<&MatchedPath>) -> String {
    matched
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string())
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = route_label(request.extensions().get::<MatchedPath>());
    let start = Instant::now();

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_label_for_unmatched_path() {
        assert_eq!(route_label(None), "unmatched");
    }
}
