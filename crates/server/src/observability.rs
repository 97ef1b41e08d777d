use once_cell::sync::Lazy;
use prometheus::{register_int_counter, Encoder, IntCounter, TextEncoder};

// Prometheus metrics (default registry)
pub static CUSTOMER_MUTATIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "customer_manager_customer_mutations_total",
        "Customer creates, updates, deletes and purchase appends"
    )
    .expect("register customer_mutations_total")
});

pub static ORDER_MUTATIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "customer_manager_order_mutations_total",
        "Order creates, updates and deletes"
    )
    .expect("register order_mutations_total")
});

pub static VALIDATION_REJECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "customer_manager_validation_rejections_total",
        "Requests rejected by field validation"
    )
    .expect("register validation_rejections_total")
});

pub static STORE_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "customer_manager_store_errors_total",
        "Key-value store operations that failed"
    )
    .expect("register store_errors_total")
});

/// Touch every counter so they appear in the exposition before first use.
pub fn init_metrics() {
    Lazy::force(&CUSTOMER_MUTATIONS_TOTAL);
    Lazy::force(&ORDER_MUTATIONS_TOTAL);
    Lazy::force(&VALIDATION_REJECTIONS_TOTAL);
    Lazy::force(&STORE_ERRORS_TOTAL);
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
