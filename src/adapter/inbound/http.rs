//! Prometheus exposition endpoint.
//!
//! Serves the queue collector at the configured telemetry path together with
//! process metrics and scrape handler metrics, plus a small landing page at
//! `/`.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use tracing::error;

use crate::application::QueueCollector;
use crate::error::Result;

struct HttpState {
    collector: Arc<QueueCollector>,
    registry: Registry,
    requests: IntCounterVec,
    in_flight: IntGauge,
    landing: String,
}

/// Build the exporter router.
///
/// # Errors
///
/// Returns an error if the process or handler metrics cannot be registered.
pub fn router(collector: Arc<QueueCollector>, telemetry_path: &str) -> Result<Router> {
    let registry = Registry::new();
    let requests = IntCounterVec::new(
        Opts::new(
            "promhttp_metric_handler_requests_total",
            "Total number of scrapes by HTTP status code.",
        ),
        &["code"],
    )?;
    registry.register(Box::new(requests.clone()))?;
    for code in ["200", "500", "503"] {
        requests.with_label_values(&[code]);
    }
    let in_flight = IntGauge::new(
        "promhttp_metric_handler_requests_in_flight",
        "Current number of scrapes being served.",
    )?;
    registry.register(Box::new(in_flight.clone()))?;

    #[cfg(target_os = "linux")]
    registry.register(Box::new(
        prometheus::process_collector::ProcessCollector::for_self(),
    ))?;

    let state = Arc::new(HttpState {
        collector,
        registry,
        requests,
        in_flight,
        landing: landing_page(telemetry_path),
    });

    Ok(Router::new()
        .route(telemetry_path, get(metrics))
        .route("/", get(landing))
        .fallback(not_found)
        .with_state(state))
}

/// Decrements the in-flight gauge when the scrape ends, even if cancelled.
struct InFlight<'a>(&'a IntGauge);

impl<'a> InFlight<'a> {
    fn enter(gauge: &'a IntGauge) -> Self {
        gauge.inc();
        Self(gauge)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.dec();
    }
}

async fn metrics(State(state): State<Arc<HttpState>>) -> Response {
    let _in_flight = InFlight::enter(&state.in_flight);
    let mut families = state.collector.collect().await;
    families.extend(state.registry.gather());

    let encoder = TextEncoder::new();
    let mut body = Vec::new();
    match encoder.encode(&families, &mut body) {
        Ok(()) => {
            state.requests.with_label_values(&["200"]).inc();
            (
                [(header::CONTENT_TYPE, encoder.format_type().to_string())],
                body,
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            state.requests.with_label_values(&["500"]).inc();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("error encoding metrics: {e}"),
            )
                .into_response()
        }
    }
}

async fn landing(State(state): State<Arc<HttpState>>) -> Html<String> {
    Html(state.landing.clone())
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "404 page not found\n")
}

fn landing_page(telemetry_path: &str) -> String {
    format!(
        "<html>\n\
         <head><title>MQ Exporter</title></head>\n\
         <body>\n\
         <h1>MQ Exporter</h1>\n\
         <p><a href=\"{telemetry_path}\">Metrics</a></p>\n\
         </body>\n\
         </html>\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landing_page_links_telemetry_path() {
        let page = landing_page("/custom/metrics");
        assert!(page.contains("<a href=\"/custom/metrics\">Metrics</a>"));
        assert!(page.contains("<title>MQ Exporter</title>"));
    }
}
