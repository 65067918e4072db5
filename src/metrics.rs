use crate::error::app_error::AppError;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::ContentType;
use rocket::request::Request;
use rocket::{Data, Response, State, routes};
use std::time::Instant;
use tracing::warn;

/// Request metrics recorder owning its own registry; injected through
/// managed state rather than living in process globals.
pub struct Metrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration: HistogramVec,
    active_requests: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total number of HTTP requests processed, partitioned by status code, method, and path"),
            &["code", "method", "path"],
        )?;
        let request_duration = HistogramVec::new(
            HistogramOpts::new("http_request_duration_seconds", "Duration of HTTP requests in seconds"),
            &["code", "method", "path"],
        )?;
        let active_requests = IntGauge::new("http_requests_active", "Number of active HTTP requests")?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;
        registry.register(Box::new(active_requests.clone()))?;

        Ok(Metrics {
            registry,
            requests_total,
            request_duration,
            active_requests,
        })
    }

    pub fn record_request(&self, status: u16, method: &str, path: &str, latency_secs: f64) {
        let code = status.to_string();
        self.requests_total.with_label_values(&[&code, method, path]).inc();
        self.request_duration.with_label_values(&[&code, method, path]).observe(latency_secs);
    }

    pub fn request_started(&self) {
        self.active_requests.inc();
    }

    pub fn request_finished(&self) {
        self.active_requests.dec();
    }

    /// Renders the registry in the Prometheus text exposition format.
    pub fn gather(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

struct RequestTimer(Option<Instant>);

/// Fairing recording request counts, latency, and the in-flight gauge.
pub struct MetricsFairing;

#[rocket::async_trait]
impl Fairing for MetricsFairing {
    fn info(&self) -> Info {
        Info {
            name: "Request Metrics",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        request.local_cache(|| RequestTimer(Some(Instant::now())));
        if let Some(metrics) = request.rocket().state::<Metrics>() {
            metrics.request_started();
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let Some(metrics) = request.rocket().state::<Metrics>() else {
            return;
        };
        metrics.request_finished();

        let latency = request
            .local_cache(|| RequestTimer(None))
            .0
            .map(|start| start.elapsed().as_secs_f64())
            .unwrap_or(0.0);

        // Label by route pattern where one matched, to keep cardinality
        // bounded; unmatched requests fall under their raw path.
        let path = request
            .route()
            .map(|route| route.uri.as_str().to_string())
            .unwrap_or_else(|| request.uri().path().to_string());

        metrics.record_request(response.status().code, request.method().as_str(), &path, latency);
    }
}

#[rocket::get("/metrics")]
pub async fn metrics_endpoint(metrics: &State<Metrics>) -> Result<(ContentType, String), AppError> {
    metrics.gather().map(|body| (ContentType::Plain, body)).map_err(|e| {
        warn!(error = %e, "failed to encode metrics");
        AppError::BadRequest("Failed to encode metrics".to_string())
    })
}

pub fn routes() -> Vec<rocket::Route> {
    routes![metrics_endpoint]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_exposes_counters_and_histograms() {
        let metrics = Metrics::new().expect("registry builds");
        metrics.record_request(200, "GET", "/api/v1/todos", 0.042);
        metrics.record_request(404, "GET", "/api/v1/todos/<id>", 0.003);

        let body = metrics.gather().expect("encodes");
        assert!(body.contains("http_requests_total"));
        assert!(body.contains("http_request_duration_seconds"));
        assert!(body.contains(r#"code="200""#));
        assert!(body.contains(r#"code="404""#));
    }

    #[test]
    fn in_flight_gauge_tracks_start_and_finish() {
        let metrics = Metrics::new().expect("registry builds");
        metrics.request_started();
        metrics.request_started();
        metrics.request_finished();

        let body = metrics.gather().expect("encodes");
        assert!(body.contains("http_requests_active 1"));
    }

    #[test]
    fn separate_recorders_do_not_share_state() {
        let a = Metrics::new().expect("registry builds");
        let b = Metrics::new().expect("registry builds");
        a.record_request(200, "GET", "/health", 0.001);

        assert!(!b.gather().expect("encodes").contains("http_requests_total{"));
    }
}
