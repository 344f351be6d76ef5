use once_cell::sync::Lazy;
use prometheus::{register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder};

// Prometheus metrics (default registry)
pub static CATALOG_OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "catalog_operations_total",
        "Catalog operations by name and outcome",
        &["op", "outcome"]
    )
    .expect("register catalog_operations_total")
});

pub static CATALOG_FALLBACK_READS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "catalog_fallback_reads_total",
        "Reads answered from the seed collection instead of the backend",
        &["backend"]
    )
    .expect("register catalog_fallback_reads_total")
});

pub static CONTACT_SUBMISSIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "contact_submissions_total",
        "Accepted contact form submissions"
    )
    .expect("register contact_submissions_total")
});

pub static CONTACT_RATE_LIMITED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "contact_rate_limited_total",
        "Contact submissions rejected by the rate limiter"
    )
    .expect("register contact_rate_limited_total")
});

pub fn record_operation(op: &str, outcome: &str) {
    CATALOG_OPERATIONS_TOTAL.with_label_values(&[op, outcome]).inc();
}

pub fn record_fallback(backend: &str) {
    CATALOG_FALLBACK_READS_TOTAL.with_label_values(&[backend]).inc();
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
