//! Subscription lifecycle orchestration.
//!
//! [`SubscriptionService`] ties the catalog, the subscription store, group
//! membership, and notification dispatch together. It owns the state
//! transitions (setup, activate, deactivate) and the ledger writes; billing
//! runs and payment capture stay in the host and drive it through these
//! methods.

use crate::config::SubscriptionsConfig;
use crate::error::AppError;
use crate::models::{
    ActivateOptions, CreateSubscription, CreateTransaction, ListSubscriptionsFilter, Plan,
    PlanCost, SetupOptions, Subscription, SubscriptionEvent, SubscriptionTransaction,
};
use crate::services::groups::GroupProvider;
use crate::services::metrics::{record_subscription_operation, record_transaction_recorded};
use crate::services::notifications::Notifier;
use crate::services::store::{CatalogStore, SubscriptionStore};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Orchestrates subscription state transitions and the transaction ledger.
#[derive(Clone)]
pub struct SubscriptionService {
    catalog: Arc<dyn CatalogStore>,
    store: Arc<dyn SubscriptionStore>,
    groups: Arc<dyn GroupProvider>,
    notifier: Notifier,
    default_cost_id: Option<Uuid>,
}

impl SubscriptionService {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        store: Arc<dyn SubscriptionStore>,
        groups: Arc<dyn GroupProvider>,
        notifier: Notifier,
        config: &SubscriptionsConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            groups,
            notifier,
            default_cost_id: config.default_cost_id,
        }
    }

    /// Create (or reuse) a subscription for a user on a cost tier.
    ///
    /// Honors the dedupe flags before touching the row, optionally records an
    /// initial unpaid transaction, and activates the subscription when
    /// `options.active` is set. Emits the `new` event for freshly created
    /// rows.
    #[instrument(skip(self, options), fields(user_id = %user_id, cost_id = %cost_id))]
    pub async fn setup_subscription(
        &self,
        user_id: Uuid,
        cost_id: Uuid,
        options: &SetupOptions,
    ) -> Result<Subscription, AppError> {
        // Resolve the tier first so dedupe never runs for a bogus cost id
        self.get_cost_required(cost_id).await?;

        if options.no_multiple_subscription {
            self.deactivate_previous_internal(user_id, options.del_multiple_subscription, None)
                .await?;
        }

        let existing = if options.reuse {
            let filter = ListSubscriptionsFilter {
                user_id: Some(user_id),
                cost_id: Some(cost_id),
                active: None,
            };
            self.store
                .list_subscriptions(&filter)
                .await?
                .into_iter()
                .next()
        } else {
            None
        };

        let mut subscription = match existing {
            Some(subscription) => {
                debug!(
                    subscription_id = %subscription.subscription_id,
                    "Reusing existing subscription"
                );
                subscription
            }
            None => {
                let input = CreateSubscription {
                    user_id,
                    cost_id,
                    extra_cost_ids: Vec::new(),
                    reference: None,
                    quantity: 1,
                    active: options.active,
                    cancelled: false,
                };
                let created = self.store.create_subscription(&input).await?;
                info!(subscription_id = %created.subscription_id, "Subscription created");
                self.notifier
                    .notify(&created, SubscriptionEvent::New, serde_json::Value::Null)
                    .await?;
                created
            }
        };

        if options.record_transaction {
            self.record_transaction(
                subscription.subscription_id,
                None,
                options.subscription_date,
                false,
            )
            .await?;
        }

        if options.active {
            let activate = ActivateOptions {
                subscription_date: options.subscription_date,
                mark_transaction_paid: options.mark_transaction_paid,
                no_multiple_subscription: false,
                del_multiple_subscription: false,
                is_trialing: false,
            };
            subscription = self
                .activate(subscription.subscription_id, &activate)
                .await?;
        }

        record_subscription_operation("setup");
        Ok(subscription)
    }

    /// Activate a subscription and open its billing period.
    ///
    /// Stamps `date_billing_start` with the given date (or now), computes
    /// `date_billing_next` from the tier's recurrence, and pushes
    /// `date_billing_end` past it by the plan's grace period. Grants the
    /// plan's access group and emits the `activate` event.
    #[instrument(skip(self, options), fields(subscription_id = %subscription_id))]
    pub async fn activate(
        &self,
        subscription_id: Uuid,
        options: &ActivateOptions,
    ) -> Result<Subscription, AppError> {
        let mut subscription = self.get_subscription_required(subscription_id).await?;

        if options.no_multiple_subscription {
            // The row being activated is exempt from its own dedupe sweep
            self.deactivate_previous_internal(
                subscription.user_id,
                options.del_multiple_subscription,
                Some(subscription_id),
            )
            .await?;
        }

        let cost = self.get_cost_required(subscription.cost_id).await?;
        let plan = self.get_plan_required(cost.plan_id).await?;

        let current = options.subscription_date.unwrap_or_else(Utc::now);
        let next = cost.next_billing_datetime(current);

        subscription.active = true;
        subscription.cancelled = false;
        subscription.due = false;
        subscription.is_trialing = options.is_trialing;
        subscription.date_billing_start = Some(current);
        subscription.date_billing_next = next;
        subscription.date_billing_end =
            next.map(|n| n + Duration::days(i64::from(plan.grace_period)));

        match plan.group.as_deref() {
            Some(group) => self.groups.add_user(group, subscription.user_id).await?,
            None => debug!("Plan has no access group, skipping grant"),
        }

        if options.mark_transaction_paid {
            self.store.mark_transactions_paid(subscription_id).await?;
        }

        let updated = self.store.update_subscription(&subscription).await?;
        record_subscription_operation("activate");
        info!(date_billing_next = ?updated.date_billing_next, "Subscription activated");
        self.notifier
            .notify(&updated, SubscriptionEvent::Activate, serde_json::Value::Null)
            .await?;
        Ok(updated)
    }

    /// Deactivate a subscription.
    ///
    /// Clears the active, due, and trialing flags, marks the row cancelled,
    /// stamps `date_billing_last`, and revokes the plan's access group. When
    /// `activate_default` is set and a default cost tier is configured, the
    /// user is moved onto it afterwards.
    #[instrument(skip(self), fields(subscription_id = %subscription_id))]
    pub async fn deactivate(
        &self,
        subscription_id: Uuid,
        activate_default: bool,
    ) -> Result<Subscription, AppError> {
        let updated = self.deactivate_only(subscription_id).await?;
        if activate_default {
            self.activate_default_subscription(updated.user_id).await?;
        }
        Ok(updated)
    }

    /// Deactivate all of a user's active subscriptions, optionally deleting
    /// the rows. Returns the number of subscriptions swept.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn deactivate_previous_subscriptions(
        &self,
        user_id: Uuid,
        delete: bool,
    ) -> Result<u64, AppError> {
        self.deactivate_previous_internal(user_id, delete, None)
            .await
    }

    /// Put the user on the configured default cost tier, if any.
    ///
    /// Returns `Ok(None)` when no default tier is configured. An existing
    /// subscription on the default tier is reused rather than duplicated.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn activate_default_subscription(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Subscription>, AppError> {
        let Some(cost_id) = self.default_cost_id else {
            debug!("No default cost tier configured, skipping");
            return Ok(None);
        };
        let options = SetupOptions {
            reuse: true,
            ..SetupOptions::default()
        };
        let subscription = self.setup_subscription(user_id, cost_id, &options).await?;
        Ok(Some(subscription))
    }

    /// Append a transaction to the ledger.
    ///
    /// `amount` defaults to the subscription's total tier cost, main tier
    /// plus extras. `transaction_date` defaults to now.
    #[instrument(skip(self), fields(subscription_id = %subscription_id, paid = paid))]
    pub async fn record_transaction(
        &self,
        subscription_id: Uuid,
        amount: Option<Decimal>,
        transaction_date: Option<DateTime<Utc>>,
        paid: bool,
    ) -> Result<SubscriptionTransaction, AppError> {
        let subscription = self.get_subscription_required(subscription_id).await?;

        let amount = match amount {
            Some(amount) => amount,
            None => self.total_tier_cost(&subscription).await?,
        };
        let input = CreateTransaction {
            user_id: subscription.user_id,
            subscription_id,
            date_transaction: transaction_date.unwrap_or_else(Utc::now),
            amount,
            paid,
        };
        let transaction = self.store.create_transaction(&input).await?;
        record_transaction_recorded(paid);
        Ok(transaction)
    }

    /// Mark every transaction of a subscription paid. Returns the number of
    /// rows updated.
    #[instrument(skip(self), fields(subscription_id = %subscription_id))]
    pub async fn mark_transactions_paid(&self, subscription_id: Uuid) -> Result<u64, AppError> {
        self.store.mark_transactions_paid(subscription_id).await
    }

    /// Combined cost of the subscription's extra tiers, excluding the main
    /// tier even when it is listed among the extras.
    pub async fn extra_tier_total(
        &self,
        subscription: &Subscription,
    ) -> Result<Decimal, AppError> {
        let mut total = Decimal::ZERO;
        for cost_id in &subscription.extra_cost_ids {
            if *cost_id == subscription.cost_id {
                continue;
            }
            total += self.get_cost_required(*cost_id).await?.cost;
        }
        Ok(total)
    }

    /// Main tier cost plus [`Self::extra_tier_total`].
    pub async fn total_tier_cost(
        &self,
        subscription: &Subscription,
    ) -> Result<Decimal, AppError> {
        let cost = self.get_cost_required(subscription.cost_id).await?;
        Ok(cost.cost + self.extra_tier_total(subscription).await?)
    }

    /// Dispatch an event for a subscription through the notifier.
    ///
    /// Returns `Ok(true)` when a handler was invoked, `Ok(false)` when the
    /// event is unbound.
    #[instrument(skip(self, extra), fields(subscription_id = %subscription_id, event = event.as_str()))]
    pub async fn notify(
        &self,
        subscription_id: Uuid,
        event: SubscriptionEvent,
        extra: serde_json::Value,
    ) -> Result<bool, AppError> {
        let subscription = self.get_subscription_required(subscription_id).await?;
        self.notifier.notify(&subscription, event, extra).await
    }

    /// Pro-rated balance for the unused remainder of the current period.
    pub async fn unused_balance(&self, subscription_id: Uuid) -> Result<Decimal, AppError> {
        let subscription = self.get_subscription_required(subscription_id).await?;
        let cost = self.get_cost_required(subscription.cost_id).await?;
        Ok(subscription.unused_daily_balance(&cost, Utc::now()))
    }

    /// Pro-rated balance for the elapsed part of the current period.
    pub async fn used_balance(&self, subscription_id: Uuid) -> Result<Decimal, AppError> {
        let subscription = self.get_subscription_required(subscription_id).await?;
        let cost = self.get_cost_required(subscription.cost_id).await?;
        Ok(subscription.used_daily_balance(&cost, Utc::now()))
    }

    /// Short description of the subscription, e.g. "Premium per month".
    pub async fn description(&self, subscription_id: Uuid) -> Result<String, AppError> {
        let subscription = self.get_subscription_required(subscription_id).await?;
        let cost = self.get_cost_required(subscription.cost_id).await?;
        let plan = self.get_plan_required(cost.plan_id).await?;
        Ok(subscription.description(&plan, &cost))
    }

    /// Deactivation without the default-tier fallback. Shared by the public
    /// deactivate and the dedupe sweep so the two never recurse into each
    /// other.
    async fn deactivate_only(&self, subscription_id: Uuid) -> Result<Subscription, AppError> {
        let mut subscription = self.get_subscription_required(subscription_id).await?;
        let cost = self.get_cost_required(subscription.cost_id).await?;
        let plan = self.get_plan_required(cost.plan_id).await?;

        subscription.active = false;
        subscription.cancelled = true;
        subscription.due = false;
        subscription.is_trialing = false;
        subscription.date_billing_last = Some(Utc::now());

        if let Some(group) = plan.group.as_deref() {
            self.groups
                .remove_user(group, subscription.user_id)
                .await?;
        }

        let updated = self.store.update_subscription(&subscription).await?;
        record_subscription_operation("deactivate");
        info!("Subscription deactivated");
        self.notifier
            .notify(
                &updated,
                SubscriptionEvent::Deactivate,
                serde_json::Value::Null,
            )
            .await?;
        Ok(updated)
    }

    async fn deactivate_previous_internal(
        &self,
        user_id: Uuid,
        delete: bool,
        exclude: Option<Uuid>,
    ) -> Result<u64, AppError> {
        let filter = ListSubscriptionsFilter {
            user_id: Some(user_id),
            cost_id: None,
            active: Some(true),
        };
        let mut swept = 0;
        for subscription in self.store.list_subscriptions(&filter).await? {
            if exclude == Some(subscription.subscription_id) {
                continue;
            }
            self.deactivate_only(subscription.subscription_id).await?;
            if delete {
                self.store
                    .delete_subscription(subscription.subscription_id)
                    .await?;
            }
            swept += 1;
        }
        Ok(swept)
    }

    async fn get_subscription_required(
        &self,
        subscription_id: Uuid,
    ) -> Result<Subscription, AppError> {
        self.store
            .get_subscription(subscription_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!(
                    "Subscription {} not found",
                    subscription_id
                ))
            })
    }

    async fn get_cost_required(&self, cost_id: Uuid) -> Result<PlanCost, AppError> {
        self.catalog.get_cost(cost_id).await?.ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Cost tier {} not found", cost_id))
        })
    }

    async fn get_plan_required(&self, plan_id: Uuid) -> Result<Plan, AppError> {
        self.catalog
            .get_plan(plan_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Plan {} not found", plan_id)))
    }
}
