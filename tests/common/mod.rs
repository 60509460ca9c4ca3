//! Test helper module for subscriptions-core integration tests.
//!
//! Wires the lifecycle service to the in-memory store, group provider, and a
//! recording notification handler.

#![allow(dead_code)]

use rust_decimal::Decimal;
use std::sync::Arc;
use subscriptions_core::config::{NotificationBindings, SubscriptionsConfig};
use subscriptions_core::models::{CreatePlan, CreatePlanCost, Plan, PlanCost, RecurrenceUnit};
use subscriptions_core::services::{
    init_metrics, CatalogStore, HandlerRegistry, MemoryGroups, MemoryStore, Notifier,
    RecordingHandler, SubscriptionService,
};
use uuid::Uuid;

// Test constants for subscriber identities
pub const TEST_USER_ID: &str = "11111111-1111-1111-1111-111111111111";
pub const OTHER_USER_ID: &str = "22222222-2222-2222-2222-222222222222";

pub fn test_user() -> Uuid {
    Uuid::parse_str(TEST_USER_ID).unwrap()
}

pub fn other_user() -> Uuid {
    Uuid::parse_str(OTHER_USER_ID).unwrap()
}

/// Test harness wrapping a fully wired [`SubscriptionService`].
pub struct TestHarness {
    pub service: SubscriptionService,
    pub store: Arc<MemoryStore>,
    pub groups: Arc<MemoryGroups>,
    pub notices: Arc<RecordingHandler>,
    notifier: Notifier,
    config: SubscriptionsConfig,
}

impl TestHarness {
    /// Spawn a harness with every event bound to the recording handler.
    pub async fn spawn() -> Self {
        Self::with_config(SubscriptionsConfig {
            notifications: NotificationBindings::all("recording"),
            ..SubscriptionsConfig::default()
        })
        .await
    }

    pub async fn with_config(config: SubscriptionsConfig) -> Self {
        init_metrics();

        let store = Arc::new(MemoryStore::new());
        let groups = Arc::new(MemoryGroups::new());
        let notices = Arc::new(RecordingHandler::new());

        let mut registry = HandlerRegistry::new();
        registry.register("recording", notices.clone());
        let notifier = Notifier::new(registry, config.notifications.clone())
            .expect("notification bindings should resolve");

        let service = SubscriptionService::new(
            store.clone(),
            store.clone(),
            groups.clone(),
            notifier.clone(),
            &config,
        );

        Self {
            service,
            store,
            groups,
            notices,
            notifier,
            config,
        }
    }

    /// Point the service at a default cost tier for deactivation fallback.
    pub fn with_default_cost(&mut self, cost_id: Uuid) {
        self.config.default_cost_id = Some(cost_id);
        self.service = SubscriptionService::new(
            self.store.clone(),
            self.store.clone(),
            self.groups.clone(),
            self.notifier.clone(),
            &self.config,
        );
    }

    /// Create a plan with a single cost tier.
    pub async fn create_plan_with_cost(
        &self,
        name: &str,
        group: Option<&str>,
        grace_period: u32,
        unit: RecurrenceUnit,
        period: u32,
        cost: Decimal,
    ) -> (Plan, PlanCost) {
        let plan = self
            .store
            .create_plan(&CreatePlan {
                name: name.to_string(),
                slug: None,
                description: None,
                group: group.map(str::to_string),
                tag_ids: Vec::new(),
                grace_period,
                feature_ref: None,
            })
            .await
            .expect("Failed to create plan");
        let cost = self
            .store
            .create_cost(&CreatePlanCost {
                plan_id: plan.plan_id,
                slug: None,
                recurrence_period: period,
                recurrence_unit: unit,
                cost,
            })
            .await
            .expect("Failed to create cost tier");
        (plan, cost)
    }

    /// Shorthand for a monthly tier on a fresh plan.
    pub async fn monthly_tier(&self, name: &str, cost: Decimal) -> (Plan, PlanCost) {
        self.create_plan_with_cost(name, None, 0, RecurrenceUnit::Month, 1, cost)
            .await
    }
}
