//! Metrics exposure integration tests for subscriptions-core.

mod common;

use common::{test_user, TestHarness};
use rust_decimal::Decimal;
use subscriptions_core::models::SetupOptions;
use subscriptions_core::services::get_metrics;

#[tokio::test]
async fn metrics_export_covers_lifecycle_activity() {
    let harness = TestHarness::spawn().await;
    let (_, cost) = harness.monthly_tier("Premium", Decimal::from(10)).await;

    let subscription = harness
        .service
        .setup_subscription(
            test_user(),
            cost.cost_id,
            &SetupOptions {
                record_transaction: true,
                ..SetupOptions::default()
            },
        )
        .await
        .unwrap();
    harness
        .service
        .deactivate(subscription.subscription_id, false)
        .await
        .unwrap();

    // Counters are process-global and shared across tests, so only the
    // presence of each family is asserted, never its value.
    let exported = get_metrics();
    assert!(exported.contains("subscriptions_operations_total"));
    assert!(exported.contains("subscriptions_store_op_duration_seconds"));
    assert!(exported.contains("subscriptions_transactions_recorded_total"));
    assert!(exported.contains("subscriptions_notifications_total"));
}
