//! Hotel catalogue and similarity-search metrics.

use metrics::{counter, gauge, histogram};
use std::time::Instant;

pub const SIMILAR_SEARCHES_TOTAL: &str = "hotel_similar_searches_total";
pub const CANDIDATES_SKIPPED_TOTAL: &str = "hotel_similar_candidates_skipped_total";
pub const QUERY_DURATION_SECONDS: &str = "hotel_similarity_query_duration_seconds";
pub const HOTEL_WRITES_TOTAL: &str = "hotel_writes_total";
pub const EMBEDDINGS_TOTAL: &str = "hotel_embeddings_total";
pub const HOTELS_LOADED: &str = "hotels_loaded_last_run";
pub const POSSIBLE_DUPLICATES_TOTAL: &str = "hotel_similar_possible_duplicates_total";

/// How a similar-hotel lookup ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SearchOutcome {
    /// At least one neighbor returned
    Found,
    /// Query ran but nothing survived hydration
    Empty,
    /// Source hotel had no usable embedding
    NoEmbedding,
    NotFound,
    Failed,
}

pub struct HotelMetrics;

impl HotelMetrics {
    pub fn record_similar_search(outcome: SearchOutcome) {
        let outcome: &'static str = outcome.into();
        counter!(SIMILAR_SEARCHES_TOTAL, "outcome" => outcome).increment(1);
    }

    pub fn record_candidates_skipped(count: usize) {
        if count > 0 {
            counter!(CANDIDATES_SKIPPED_TOTAL).increment(count as u64);
        }
    }

    pub fn record_write(operation: &'static str) {
        counter!(HOTEL_WRITES_TOTAL, "operation" => operation).increment(1);
    }

    pub fn record_embeddings(provider: &'static str, count: usize) {
        counter!(EMBEDDINGS_TOTAL, "provider" => provider).increment(count as u64);
    }

    /// A neighbor whose name nearly matches the source hotel's
    pub fn record_possible_duplicate() {
        counter!(POSSIBLE_DUPLICATES_TOTAL).increment(1);
    }

    pub fn set_hotels_loaded(count: usize) {
        gauge!(HOTELS_LOADED).set(count as f64);
    }
}

/// Records [`QUERY_DURATION_SECONDS`] when stopped or dropped.
pub struct SearchTimer {
    start: Instant,
    stopped: bool,
}

impl SearchTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            stopped: false,
        }
    }

    /// Record and return the elapsed milliseconds. A second call is a no-op.
    pub fn stop(&mut self) -> u64 {
        if self.stopped {
            return 0;
        }
        self.stopped = true;

        let elapsed = self.start.elapsed();
        histogram!(QUERY_DURATION_SECONDS).record(elapsed.as_secs_f64());
        elapsed.as_millis() as u64
    }
}

impl Drop for SearchTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    fn render_with<F: FnOnce()>(f: F) -> String {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, f);
        handle.render()
    }

    #[test]
    fn test_similar_search_outcome_label() {
        let rendered = render_with(|| {
            HotelMetrics::record_similar_search(SearchOutcome::NoEmbedding);
            HotelMetrics::record_similar_search(SearchOutcome::Found);
            HotelMetrics::record_similar_search(SearchOutcome::Found);
        });

        assert!(rendered.contains(r#"hotel_similar_searches_total{outcome="no_embedding"} 1"#));
        assert!(rendered.contains(r#"hotel_similar_searches_total{outcome="found"} 2"#));
    }

    #[test]
    fn test_zero_skips_are_not_recorded() {
        let rendered = render_with(|| HotelMetrics::record_candidates_skipped(0));
        assert!(!rendered.contains(CANDIDATES_SKIPPED_TOTAL));

        let rendered = render_with(|| HotelMetrics::record_candidates_skipped(2));
        assert!(rendered.contains("hotel_similar_candidates_skipped_total 2"));
    }

    #[test]
    fn test_search_timer_records_once() {
        let rendered = render_with(|| {
            let mut timer = SearchTimer::start();
            timer.stop();
            drop(timer);
        });

        assert!(rendered.contains("hotel_similarity_query_duration_seconds_count 1"));
    }

    #[test]
    fn test_possible_duplicates_counted() {
        let rendered = render_with(|| {
            HotelMetrics::record_possible_duplicate();
            HotelMetrics::record_possible_duplicate();
        });

        assert!(rendered.contains("hotel_similar_possible_duplicates_total 2"));
    }
}
