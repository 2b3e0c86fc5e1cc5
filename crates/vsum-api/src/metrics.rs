//! Prometheus metrics for the API server.

use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "vsum_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "vsum_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "vsum_http_requests_in_flight";

    // Analysis metrics
    pub const ANALYSES_TOTAL: &str = "vsum_analyses_total";
    pub const UPLOAD_DURATION_SECONDS: &str = "vsum_upload_duration_seconds";
    pub const MODEL_DURATION_SECONDS: &str = "vsum_model_duration_seconds";
    pub const WEB_SEARCHES_TOTAL: &str = "vsum_web_searches_total";
    pub const UPLOAD_BYTES: &str = "vsum_upload_bytes";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record the outcome of one analysis request.
pub fn record_analysis(outcome: &str) {
    let labels = [("outcome", outcome.to_string())];
    counter!(names::ANALYSES_TOTAL, &labels).increment(1);
}

/// Record upload plus processing wait duration.
pub fn record_upload_duration(duration_secs: f64) {
    histogram!(names::UPLOAD_DURATION_SECONDS).record(duration_secs);
}

/// Record the model call duration, tool rounds included.
pub fn record_model_duration(model: &str, duration_secs: f64) {
    let labels = [("model", model.to_string())];
    histogram!(names::MODEL_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record web searches the model requested.
pub fn record_web_searches(count: u32) {
    counter!(names::WEB_SEARCHES_TOTAL).increment(u64::from(count));
}

/// Record the size of an accepted upload.
pub fn record_upload_bytes(bytes: usize) {
    histogram!(names::UPLOAD_BYTES).record(bytes as f64);
}

/// Collapse unknown paths so scanners cannot blow up label cardinality.
fn sanitize_path(path: &str) -> String {
    match path {
        "/" | "/analyze" | "/download" | "/api/analyze" | "/health" | "/healthz" | "/ready"
        | "/metrics" => path.to_string(),
        _ => "other".to_string(),
    }
}

/// Holds one unit of the in-flight gauge until dropped.
///
/// The middleware future is dropped when a client disconnects mid-request,
/// so the decrement cannot live after the `.await`.
struct InFlightGuard;

impl InFlightGuard {
    fn new() -> Self {
        gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);
        Self
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    let in_flight = InFlightGuard::new();
    let response = next.run(request).await;
    drop(in_flight);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/api/analyze"), "/api/analyze");
        assert_eq!(sanitize_path("/"), "/");
        assert_eq!(sanitize_path("/wp-admin/setup.php"), "other");
    }

    #[test]
    fn test_in_flight_gauge_released_on_drop() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let gauge_line = |value: u32| format!("{} {}\n", names::HTTP_REQUESTS_IN_FLIGHT, value);

        ::metrics::with_local_recorder(&recorder, || {
            let outer = InFlightGuard::new();
            let inner = InFlightGuard::new();
            assert!(handle.render().contains(&gauge_line(2)));

            // A disconnected client drops the request future mid-flight
            drop(inner);
            assert!(handle.render().contains(&gauge_line(1)));
            drop(outer);
        });

        assert!(handle.render().contains(&gauge_line(0)));
    }
}
