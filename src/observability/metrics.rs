//! Metrics collection.
//!
//! # Metrics
//! - `strata_requests_total` (counter): exchanges by method, status class
//! - `strata_request_duration_seconds` (histogram): time to response head and body
//! - `strata_transport_failures_total` (counter): exchanges with no response, by method
//! - `strata_unmatched_responses_total` (counter): responses no rule handled, by status class

use std::time::Instant;

/// `"2xx"` style label for a status code.
pub fn status_class(status: u16) -> &'static str {
    match status / 100 {
        1 => "1xx",
        2 => "2xx",
        3 => "3xx",
        4 => "4xx",
        5 => "5xx",
        _ => "other",
    }
}

pub fn record_request(method: &str, status: u16, started: Instant) {
    let method = method.to_string();
    metrics::counter!(
        "strata_requests_total",
        "method" => method.clone(),
        "status_class" => status_class(status),
    )
    .increment(1);
    metrics::histogram!("strata_request_duration_seconds", "method" => method)
        .record(started.elapsed().as_secs_f64());
}

pub fn record_transport_failure(method: &str) {
    metrics::counter!("strata_transport_failures_total", "method" => method.to_string()).increment(1);
}

pub fn record_unmatched(status: u16) {
    metrics::counter!("strata_unmatched_responses_total", "status_class" => status_class(status))
        .increment(1);
}
