//! Metrics module for subscriptions-core.
//! Provides Prometheus metrics for lifecycle operations, the transaction
//! ledger, and notification dispatch.

use once_cell::sync::Lazy;
use prometheus::{
    histogram_opts, opts, register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec,
    IntCounterVec, TextEncoder,
};
use std::sync::OnceLock;

/// Store operation duration histogram
pub static STORE_OP_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        histogram_opts!(
            "subscriptions_store_op_duration_seconds",
            "Store operation duration"
        ),
        &["operation"]
    )
    .expect("Failed to register STORE_OP_DURATION")
});

/// Lifecycle operations counter (setup, activate, deactivate, ...)
pub static SUBSCRIPTION_OPERATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Ledger rows recorded, split by paid flag
pub static TRANSACTIONS_RECORDED_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Notification dispatch counter by event and outcome
pub static NOTIFICATIONS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Call once at startup.
pub fn init_metrics() {
    SUBSCRIPTION_OPERATIONS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "subscriptions_operations_total",
                "Total lifecycle operations by operation type"
            ),
            &["operation"]
        )
        .expect("Failed to register SUBSCRIPTION_OPERATIONS_TOTAL")
    });

    TRANSACTIONS_RECORDED_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "subscriptions_transactions_recorded_total",
                "Total ledger transactions recorded by paid flag"
            ),
            &["paid"]
        )
        .expect("Failed to register TRANSACTIONS_RECORDED_TOTAL")
    });

    NOTIFICATIONS_TOTAL.get_or_init(|| {
        register_int_counter_vec!(
            opts!(
                "subscriptions_notifications_total",
                "Total notifications dispatched by event and status"
            ),
            &["event", "status"]
        )
        .expect("Failed to register NOTIFICATIONS_TOTAL")
    });

    // Force initialization of lazy statics
    let _ = &*STORE_OP_DURATION;
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Failed to convert metrics to string")
}

/// Record a lifecycle operation.
pub fn record_subscription_operation(operation: &str) {
    if let Some(counter) = SUBSCRIPTION_OPERATIONS_TOTAL.get() {
        counter.with_label_values(&[operation]).inc();
    }
}

/// Record a ledger transaction.
pub fn record_transaction_recorded(paid: bool) {
    if let Some(counter) = TRANSACTIONS_RECORDED_TOTAL.get() {
        counter
            .with_label_values(&[if paid { "true" } else { "false" }])
            .inc();
    }
}

/// Record a notification dispatch outcome.
pub fn record_notification(event: &str, status: &str) {
    if let Some(counter) = NOTIFICATIONS_TOTAL.get() {
        counter.with_label_values(&[event, status]).inc();
    }
}
