//! In-memory store backing tests and lightweight embeddings.
//!
//! Implements both store traits over a shared map guarded by an async
//! `RwLock`. Production hosts bind their own storage instead.

use crate::error::AppError;
use crate::models::{
    CreatePlan, CreatePlanCost, CreatePlanList, CreatePlanListDetail, CreateSubscription,
    CreateTransaction, ListPlansFilter, ListSubscriptionsFilter, ListTransactionsFilter, Plan,
    PlanCost, PlanList, PlanListDetail, PlanTag, Subscription, SubscriptionTransaction,
    UpdatePlan, UpdatePlanCost, UpdatePlanList,
};
use crate::services::metrics::STORE_OP_DURATION;
use crate::services::store::{CatalogStore, SubscriptionStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

#[derive(Default)]
struct Inner {
    tags: HashMap<Uuid, PlanTag>,
    plans: HashMap<Uuid, Plan>,
    costs: HashMap<Uuid, PlanCost>,
    plan_lists: HashMap<Uuid, PlanList>,
    plan_list_details: HashMap<Uuid, PlanListDetail>,
    subscriptions: HashMap<Uuid, Subscription>,
    transactions: HashMap<Uuid, SubscriptionTransaction>,
}

impl Inner {
    fn plan_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> bool {
        self.plans
            .values()
            .any(|p| p.slug.as_deref() == Some(slug) && Some(p.plan_id) != exclude)
    }

    fn cost_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> bool {
        self.costs
            .values()
            .any(|c| c.slug.as_deref() == Some(slug) && Some(c.cost_id) != exclude)
    }

    fn list_slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> bool {
        self.plan_lists
            .values()
            .any(|l| l.slug.as_deref() == Some(slug) && Some(l.list_id) != exclude)
    }
}

/// In-memory implementation of [`CatalogStore`] and [`SubscriptionStore`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    #[instrument(skip(self))]
    async fn create_tag(&self, tag: &str) -> Result<PlanTag, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["create_tag"])
            .start_timer();

        let mut inner = self.inner.write().await;
        if inner.tags.values().any(|t| t.tag == tag) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Tag '{}' already exists",
                tag
            )));
        }

        let tag = PlanTag {
            tag_id: Uuid::new_v4(),
            tag: tag.to_string(),
        };
        inner.tags.insert(tag.tag_id, tag.clone());

        timer.observe_duration();
        Ok(tag)
    }

    async fn get_tag(&self, tag_id: Uuid) -> Result<Option<PlanTag>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["get_tag"])
            .start_timer();
        let tag = self.inner.read().await.tags.get(&tag_id).cloned();
        timer.observe_duration();
        Ok(tag)
    }

    async fn list_tags(&self) -> Result<Vec<PlanTag>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["list_tags"])
            .start_timer();
        let mut tags: Vec<PlanTag> = self.inner.read().await.tags.values().cloned().collect();
        tags.sort_by(|a, b| a.tag.cmp(&b.tag));
        timer.observe_duration();
        Ok(tags)
    }

    #[instrument(skip(self), fields(tag_id = %tag_id))]
    async fn delete_tag(&self, tag_id: Uuid) -> Result<(), AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["delete_tag"])
            .start_timer();

        let mut inner = self.inner.write().await;
        inner
            .tags
            .remove(&tag_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Tag {} not found", tag_id)))?;
        for plan in inner.plans.values_mut() {
            plan.tag_ids.retain(|id| *id != tag_id);
        }

        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    async fn create_plan(&self, input: &CreatePlan) -> Result<Plan, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["create_plan"])
            .start_timer();
        input.validate()?;

        let mut inner = self.inner.write().await;
        if let Some(slug) = input.slug.as_deref() {
            if inner.plan_slug_taken(slug, None) {
                return Err(AppError::Conflict(anyhow::anyhow!(
                    "Plan with slug '{}' already exists",
                    slug
                )));
            }
        }

        let now = Utc::now();
        let plan = Plan {
            plan_id: Uuid::new_v4(),
            name: input.name.clone(),
            slug: input.slug.clone(),
            description: input.description.clone(),
            group: input.group.clone(),
            tag_ids: input.tag_ids.clone(),
            grace_period: input.grace_period,
            feature_ref: input.feature_ref.clone(),
            created_utc: now,
            updated_utc: now,
        };
        inner.plans.insert(plan.plan_id, plan.clone());

        timer.observe_duration();
        Ok(plan)
    }

    async fn get_plan(&self, plan_id: Uuid) -> Result<Option<Plan>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["get_plan"])
            .start_timer();
        let plan = self.inner.read().await.plans.get(&plan_id).cloned();
        timer.observe_duration();
        Ok(plan)
    }

    async fn list_plans(&self, filter: &ListPlansFilter) -> Result<Vec<Plan>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["list_plans"])
            .start_timer();
        let mut plans: Vec<Plan> = self
            .inner
            .read()
            .await
            .plans
            .values()
            .filter(|p| match filter.tag_id {
                Some(tag_id) => p.tag_ids.contains(&tag_id),
                None => true,
            })
            .cloned()
            .collect();
        plans.sort_by(|a, b| a.name.cmp(&b.name));
        timer.observe_duration();
        Ok(plans)
    }

    #[instrument(skip(self, update), fields(plan_id = %plan_id))]
    async fn update_plan(&self, plan_id: Uuid, update: &UpdatePlan) -> Result<Plan, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["update_plan"])
            .start_timer();
        update.validate()?;

        let mut inner = self.inner.write().await;
        if let Some(slug) = update.slug.as_deref() {
            if inner.plan_slug_taken(slug, Some(plan_id)) {
                return Err(AppError::Conflict(anyhow::anyhow!(
                    "Plan with slug '{}' already exists",
                    slug
                )));
            }
        }

        let plan = inner
            .plans
            .get_mut(&plan_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Plan {} not found", plan_id)))?;

        if let Some(name) = &update.name {
            plan.name = name.clone();
        }
        if let Some(slug) = &update.slug {
            plan.slug = Some(slug.clone());
        }
        if let Some(description) = &update.description {
            plan.description = Some(description.clone());
        }
        if let Some(group) = &update.group {
            plan.group = Some(group.clone());
        }
        if let Some(tag_ids) = &update.tag_ids {
            plan.tag_ids = tag_ids.clone();
        }
        if let Some(grace_period) = update.grace_period {
            plan.grace_period = grace_period;
        }
        if let Some(feature_ref) = &update.feature_ref {
            plan.feature_ref = Some(feature_ref.clone());
        }
        plan.updated_utc = Utc::now();
        let plan = plan.clone();

        timer.observe_duration();
        Ok(plan)
    }

    #[instrument(skip(self), fields(plan_id = %plan_id))]
    async fn delete_plan(&self, plan_id: Uuid) -> Result<(), AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["delete_plan"])
            .start_timer();

        let mut inner = self.inner.write().await;
        inner
            .plans
            .remove(&plan_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Plan {} not found", plan_id)))?;

        // Cascade: tiers, their subscriptions, and plan list entries
        let cost_ids: Vec<Uuid> = inner
            .costs
            .values()
            .filter(|c| c.plan_id == plan_id)
            .map(|c| c.cost_id)
            .collect();
        inner.costs.retain(|_, c| c.plan_id != plan_id);
        inner
            .subscriptions
            .retain(|_, s| !cost_ids.contains(&s.cost_id));
        inner.plan_list_details.retain(|_, d| d.plan_id != plan_id);

        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self, input), fields(plan_id = %input.plan_id))]
    async fn create_cost(&self, input: &CreatePlanCost) -> Result<PlanCost, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["create_cost"])
            .start_timer();
        input.validate()?;

        let mut inner = self.inner.write().await;
        if !inner.plans.contains_key(&input.plan_id) {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Plan {} not found",
                input.plan_id
            )));
        }
        if let Some(slug) = input.slug.as_deref() {
            if inner.cost_slug_taken(slug, None) {
                return Err(AppError::Conflict(anyhow::anyhow!(
                    "Cost tier with slug '{}' already exists",
                    slug
                )));
            }
        }

        let now = Utc::now();
        let cost = PlanCost {
            cost_id: Uuid::new_v4(),
            plan_id: input.plan_id,
            slug: input.slug.clone(),
            recurrence_period: input.recurrence_period,
            recurrence_unit: input.recurrence_unit,
            cost: input.cost,
            created_utc: now,
            updated_utc: now,
        };
        inner.costs.insert(cost.cost_id, cost.clone());

        timer.observe_duration();
        Ok(cost)
    }

    async fn get_cost(&self, cost_id: Uuid) -> Result<Option<PlanCost>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["get_cost"])
            .start_timer();
        let cost = self.inner.read().await.costs.get(&cost_id).cloned();
        timer.observe_duration();
        Ok(cost)
    }

    async fn list_costs(&self, plan_id: Uuid) -> Result<Vec<PlanCost>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["list_costs"])
            .start_timer();
        let mut costs: Vec<PlanCost> = self
            .inner
            .read()
            .await
            .costs
            .values()
            .filter(|c| c.plan_id == plan_id)
            .cloned()
            .collect();
        costs.sort_by_key(|c| (c.recurrence_unit, c.recurrence_period, c.cost));
        timer.observe_duration();
        Ok(costs)
    }

    #[instrument(skip(self, update), fields(cost_id = %cost_id))]
    async fn update_cost(
        &self,
        cost_id: Uuid,
        update: &UpdatePlanCost,
    ) -> Result<PlanCost, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["update_cost"])
            .start_timer();
        update.validate()?;

        let mut inner = self.inner.write().await;
        if let Some(slug) = update.slug.as_deref() {
            if inner.cost_slug_taken(slug, Some(cost_id)) {
                return Err(AppError::Conflict(anyhow::anyhow!(
                    "Cost tier with slug '{}' already exists",
                    slug
                )));
            }
        }

        let cost = inner.costs.get_mut(&cost_id).ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Cost tier {} not found", cost_id))
        })?;

        if let Some(slug) = &update.slug {
            cost.slug = Some(slug.clone());
        }
        if let Some(period) = update.recurrence_period {
            cost.recurrence_period = period;
        }
        if let Some(unit) = update.recurrence_unit {
            cost.recurrence_unit = unit;
        }
        if let Some(amount) = update.cost {
            cost.cost = amount;
        }
        cost.updated_utc = Utc::now();
        let cost = cost.clone();

        timer.observe_duration();
        Ok(cost)
    }

    #[instrument(skip(self), fields(cost_id = %cost_id))]
    async fn delete_cost(&self, cost_id: Uuid) -> Result<(), AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["delete_cost"])
            .start_timer();

        let mut inner = self.inner.write().await;
        inner.costs.remove(&cost_id).ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Cost tier {} not found", cost_id))
        })?;
        // Cascade: subscriptions on this tier; their transactions stay
        inner.subscriptions.retain(|_, s| s.cost_id != cost_id);

        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self, input))]
    async fn create_plan_list(&self, input: &CreatePlanList) -> Result<PlanList, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["create_plan_list"])
            .start_timer();
        input.validate()?;

        let mut inner = self.inner.write().await;
        if let Some(slug) = input.slug.as_deref() {
            if inner.list_slug_taken(slug, None) {
                return Err(AppError::Conflict(anyhow::anyhow!(
                    "Plan list with slug '{}' already exists",
                    slug
                )));
            }
        }

        let now = Utc::now();
        let list = PlanList {
            list_id: Uuid::new_v4(),
            title: input.title.clone(),
            slug: input.slug.clone(),
            subtitle: input.subtitle.clone(),
            header: input.header.clone(),
            footer: input.footer.clone(),
            active: input.active,
            created_utc: now,
            updated_utc: now,
        };
        inner.plan_lists.insert(list.list_id, list.clone());

        timer.observe_duration();
        Ok(list)
    }

    async fn get_plan_list(&self, list_id: Uuid) -> Result<Option<PlanList>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["get_plan_list"])
            .start_timer();
        let list = self.inner.read().await.plan_lists.get(&list_id).cloned();
        timer.observe_duration();
        Ok(list)
    }

    async fn list_plan_lists(&self) -> Result<Vec<PlanList>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["list_plan_lists"])
            .start_timer();
        let mut lists: Vec<PlanList> = self
            .inner
            .read()
            .await
            .plan_lists
            .values()
            .cloned()
            .collect();
        lists.sort_by_key(|l| l.created_utc);
        timer.observe_duration();
        Ok(lists)
    }

    #[instrument(skip(self, update), fields(list_id = %list_id))]
    async fn update_plan_list(
        &self,
        list_id: Uuid,
        update: &UpdatePlanList,
    ) -> Result<PlanList, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["update_plan_list"])
            .start_timer();
        update.validate()?;

        let mut inner = self.inner.write().await;
        if let Some(slug) = update.slug.as_deref() {
            if inner.list_slug_taken(slug, Some(list_id)) {
                return Err(AppError::Conflict(anyhow::anyhow!(
                    "Plan list with slug '{}' already exists",
                    slug
                )));
            }
        }

        let list = inner.plan_lists.get_mut(&list_id).ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Plan list {} not found", list_id))
        })?;

        if let Some(title) = &update.title {
            list.title = Some(title.clone());
        }
        if let Some(slug) = &update.slug {
            list.slug = Some(slug.clone());
        }
        if let Some(subtitle) = &update.subtitle {
            list.subtitle = Some(subtitle.clone());
        }
        if let Some(header) = &update.header {
            list.header = Some(header.clone());
        }
        if let Some(footer) = &update.footer {
            list.footer = Some(footer.clone());
        }
        if let Some(active) = update.active {
            list.active = active;
        }
        list.updated_utc = Utc::now();
        let list = list.clone();

        timer.observe_duration();
        Ok(list)
    }

    #[instrument(skip(self), fields(list_id = %list_id))]
    async fn delete_plan_list(&self, list_id: Uuid) -> Result<(), AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["delete_plan_list"])
            .start_timer();

        let mut inner = self.inner.write().await;
        inner.plan_lists.remove(&list_id).ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Plan list {} not found", list_id))
        })?;
        inner.plan_list_details.retain(|_, d| d.list_id != list_id);

        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self, input), fields(list_id = %input.list_id, plan_id = %input.plan_id))]
    async fn create_plan_list_detail(
        &self,
        input: &CreatePlanListDetail,
    ) -> Result<PlanListDetail, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["create_plan_list_detail"])
            .start_timer();
        input.validate()?;

        let mut inner = self.inner.write().await;
        if !inner.plans.contains_key(&input.plan_id) {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Plan {} not found",
                input.plan_id
            )));
        }
        if !inner.plan_lists.contains_key(&input.list_id) {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Plan list {} not found",
                input.list_id
            )));
        }

        let detail = PlanListDetail {
            detail_id: Uuid::new_v4(),
            plan_id: input.plan_id,
            list_id: input.list_id,
            html_content: input.html_content.clone(),
            subscribe_button_text: input
                .subscribe_button_text
                .clone()
                .or_else(|| Some("Subscribe".to_string())),
            order: input.order.unwrap_or(1),
            created_utc: Utc::now(),
        };
        inner
            .plan_list_details
            .insert(detail.detail_id, detail.clone());

        timer.observe_duration();
        Ok(detail)
    }

    async fn list_plan_list_details(
        &self,
        list_id: Uuid,
    ) -> Result<Vec<PlanListDetail>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["list_plan_list_details"])
            .start_timer();
        let mut details: Vec<PlanListDetail> = self
            .inner
            .read()
            .await
            .plan_list_details
            .values()
            .filter(|d| d.list_id == list_id)
            .cloned()
            .collect();
        details.sort_by_key(|d| (d.order, d.created_utc));
        timer.observe_duration();
        Ok(details)
    }

    #[instrument(skip(self), fields(detail_id = %detail_id))]
    async fn delete_plan_list_detail(&self, detail_id: Uuid) -> Result<(), AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["delete_plan_list_detail"])
            .start_timer();

        let mut inner = self.inner.write().await;
        inner.plan_list_details.remove(&detail_id).ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Plan list entry {} not found", detail_id))
        })?;

        timer.observe_duration();
        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    #[instrument(skip(self, input), fields(user_id = %input.user_id, cost_id = %input.cost_id))]
    async fn create_subscription(
        &self,
        input: &CreateSubscription,
    ) -> Result<Subscription, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["create_subscription"])
            .start_timer();
        input.validate()?;

        let mut inner = self.inner.write().await;
        if !inner.costs.contains_key(&input.cost_id) {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Cost tier {} not found",
                input.cost_id
            )));
        }

        let now = Utc::now();
        let subscription = Subscription {
            subscription_id: Uuid::new_v4(),
            user_id: input.user_id,
            cost_id: input.cost_id,
            extra_cost_ids: input.extra_cost_ids.clone(),
            reference: input.reference.clone(),
            quantity: input.quantity,
            date_billing_start: None,
            date_billing_end: None,
            date_billing_last: None,
            date_billing_next: None,
            active: input.active,
            is_trialing: false,
            due: false,
            cancelled: input.cancelled,
            created_utc: now,
            updated_utc: now,
        };
        inner
            .subscriptions
            .insert(subscription.subscription_id, subscription.clone());

        timer.observe_duration();
        Ok(subscription)
    }

    async fn get_subscription(
        &self,
        subscription_id: Uuid,
    ) -> Result<Option<Subscription>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["get_subscription"])
            .start_timer();
        let subscription = self
            .inner
            .read()
            .await
            .subscriptions
            .get(&subscription_id)
            .cloned();
        timer.observe_duration();
        Ok(subscription)
    }

    async fn list_subscriptions(
        &self,
        filter: &ListSubscriptionsFilter,
    ) -> Result<Vec<Subscription>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["list_subscriptions"])
            .start_timer();
        let mut subscriptions: Vec<Subscription> = self
            .inner
            .read()
            .await
            .subscriptions
            .values()
            .filter(|s| {
                filter.user_id.map_or(true, |user_id| s.user_id == user_id)
                    && filter.cost_id.map_or(true, |cost_id| s.cost_id == cost_id)
                    && filter.active.map_or(true, |active| s.active == active)
            })
            .cloned()
            .collect();
        subscriptions.sort_by_key(|s| (s.user_id, s.date_billing_start));
        timer.observe_duration();
        Ok(subscriptions)
    }

    #[instrument(skip(self, subscription), fields(subscription_id = %subscription.subscription_id))]
    async fn update_subscription(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["update_subscription"])
            .start_timer();

        let mut inner = self.inner.write().await;
        if !inner
            .subscriptions
            .contains_key(&subscription.subscription_id)
        {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Subscription {} not found",
                subscription.subscription_id
            )));
        }

        let mut updated = subscription.clone();
        updated.updated_utc = Utc::now();
        inner
            .subscriptions
            .insert(updated.subscription_id, updated.clone());

        timer.observe_duration();
        Ok(updated)
    }

    #[instrument(skip(self), fields(subscription_id = %subscription_id))]
    async fn delete_subscription(&self, subscription_id: Uuid) -> Result<(), AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["delete_subscription"])
            .start_timer();

        let mut inner = self.inner.write().await;
        inner.subscriptions.remove(&subscription_id).ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!(
                "Subscription {} not found",
                subscription_id
            ))
        })?;

        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self, input), fields(subscription_id = %input.subscription_id))]
    async fn create_transaction(
        &self,
        input: &CreateTransaction,
    ) -> Result<SubscriptionTransaction, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["create_transaction"])
            .start_timer();

        let transaction = SubscriptionTransaction {
            transaction_id: Uuid::new_v4(),
            user_id: input.user_id,
            subscription_id: input.subscription_id,
            date_transaction: input.date_transaction,
            amount: input.amount,
            paid: input.paid,
        };
        self.inner
            .write()
            .await
            .transactions
            .insert(transaction.transaction_id, transaction.clone());

        timer.observe_duration();
        Ok(transaction)
    }

    async fn get_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<Option<SubscriptionTransaction>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["get_transaction"])
            .start_timer();
        let transaction = self
            .inner
            .read()
            .await
            .transactions
            .get(&transaction_id)
            .cloned();
        timer.observe_duration();
        Ok(transaction)
    }

    async fn list_transactions(
        &self,
        filter: &ListTransactionsFilter,
    ) -> Result<Vec<SubscriptionTransaction>, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["list_transactions"])
            .start_timer();
        let mut transactions: Vec<SubscriptionTransaction> = self
            .inner
            .read()
            .await
            .transactions
            .values()
            .filter(|t| {
                filter.user_id.map_or(true, |user_id| t.user_id == user_id)
                    && filter
                        .subscription_id
                        .map_or(true, |id| t.subscription_id == id)
            })
            .cloned()
            .collect();
        transactions.sort_by(|a, b| {
            b.date_transaction
                .cmp(&a.date_transaction)
                .then(a.user_id.cmp(&b.user_id))
        });
        timer.observe_duration();
        Ok(transactions)
    }

    #[instrument(skip(self), fields(subscription_id = %subscription_id))]
    async fn mark_transactions_paid(&self, subscription_id: Uuid) -> Result<u64, AppError> {
        let timer = STORE_OP_DURATION
            .with_label_values(&["mark_transactions_paid"])
            .start_timer();

        let mut inner = self.inner.write().await;
        let mut updated = 0;
        for transaction in inner
            .transactions
            .values_mut()
            .filter(|t| t.subscription_id == subscription_id)
        {
            transaction.paid = true;
            updated += 1;
        }

        timer.observe_duration();
        Ok(updated)
    }
}
