//! Prometheus metrics for the hotel services.
//!
//! - recorder installation and the `/metrics` handler
//! - HTTP request middleware
//! - [`HotelMetrics`] for catalogue and similarity-search operations
//!
//! ```rust,ignore
//! observability::init_metrics()?;
//! let app = Router::new()
//!     .route("/metrics", get(observability::metrics_handler))
//!     .layer(axum::middleware::from_fn(observability::metrics_middleware));
//! ```

pub mod hotels;
pub mod middleware;

pub use hotels::{HotelMetrics, SearchOutcome, SearchTimer};
pub use middleware::metrics_middleware;

pub use metrics::{counter, gauge, histogram};

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

pub const APP_INFO: &str = "app_info";

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the global Prometheus recorder. Later calls return the same handle.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new()
            .set_buckets_for_metric(
                metrics_exporter_prometheus::Matcher::Suffix("duration_seconds".to_string()),
                &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0],
            )?
            .install_recorder()?;

        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();
        Ok(handle)
    })
}

/// Publish a constant `app_info` gauge labelled with the binary's identity.
pub fn record_app_info(name: &'static str, version: &'static str) {
    gauge!(APP_INFO, "name" => name, "version" => version).set(1.0);
}

pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for `/metrics`
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_gauge!(APP_INFO, "Build information, always 1");

    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP requests answered with 4xx or 5xx"
    );

    describe_counter!(
        hotels::SIMILAR_SEARCHES_TOTAL,
        "Similar-hotel lookups by outcome"
    );
    describe_counter!(
        hotels::CANDIDATES_SKIPPED_TOTAL,
        "Index hits dropped because the hotel record was gone"
    );
    describe_histogram!(
        hotels::QUERY_DURATION_SECONDS,
        "Vector index KNN query duration in seconds"
    );
    describe_counter!(
        hotels::HOTEL_WRITES_TOTAL,
        "Hotel create/update/delete operations"
    );
    describe_counter!(hotels::EMBEDDINGS_TOTAL, "Texts embedded by provider");
    describe_gauge!(
        hotels::HOTELS_LOADED,
        "Hotels inserted by the last fixture load"
    );
    describe_counter!(
        hotels::POSSIBLE_DUPLICATES_TOTAL,
        "Similar hotels whose name nearly matches the source hotel"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_info_carries_version_label() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || record_app_info("hotels_api", "0.1.0"));

        let rendered = handle.render();
        assert!(rendered.contains(r#"app_info{name="hotels_api",version="0.1.0"} 1"#));
    }
}
