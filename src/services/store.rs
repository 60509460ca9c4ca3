//! Storage traits binding the lifecycle to host persistence.
//!
//! Hosts implement these against their own storage; `MemoryStore` is the
//! in-crate reference implementation. Implementations validate inputs,
//! enforce slug uniqueness, and keep the listing orders documented on each
//! method.

use crate::error::AppError;
use crate::models::{
    CreatePlan, CreatePlanCost, CreatePlanList, CreatePlanListDetail, CreateSubscription,
    CreateTransaction, ListPlansFilter, ListSubscriptionsFilter, ListTransactionsFilter, Plan,
    PlanCost, PlanList, PlanListDetail, PlanTag, Subscription, SubscriptionTransaction,
    UpdatePlan, UpdatePlanCost, UpdatePlanList,
};
use async_trait::async_trait;
use uuid::Uuid;

/// Storage for the plan catalog: tags, plans, cost tiers, and plan lists.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Creates a tag. Tag names are unique; duplicates are a conflict.
    async fn create_tag(&self, tag: &str) -> Result<PlanTag, AppError>;

    async fn get_tag(&self, tag_id: Uuid) -> Result<Option<PlanTag>, AppError>;

    /// Tags ordered by name.
    async fn list_tags(&self) -> Result<Vec<PlanTag>, AppError>;

    /// Deletes a tag and detaches it from every plan.
    async fn delete_tag(&self, tag_id: Uuid) -> Result<(), AppError>;

    /// Creates a plan. Slugs are unique; duplicates are a conflict.
    async fn create_plan(&self, input: &CreatePlan) -> Result<Plan, AppError>;

    async fn get_plan(&self, plan_id: Uuid) -> Result<Option<Plan>, AppError>;

    /// Plans ordered by name.
    async fn list_plans(&self, filter: &ListPlansFilter) -> Result<Vec<Plan>, AppError>;

    async fn update_plan(&self, plan_id: Uuid, update: &UpdatePlan) -> Result<Plan, AppError>;

    /// Deletes a plan together with its cost tiers and plan list entries.
    async fn delete_plan(&self, plan_id: Uuid) -> Result<(), AppError>;

    /// Creates a cost tier. Slugs are unique; duplicates are a conflict.
    async fn create_cost(&self, input: &CreatePlanCost) -> Result<PlanCost, AppError>;

    async fn get_cost(&self, cost_id: Uuid) -> Result<Option<PlanCost>, AppError>;

    /// Cost tiers of a plan ordered by (unit, period, cost).
    async fn list_costs(&self, plan_id: Uuid) -> Result<Vec<PlanCost>, AppError>;

    async fn update_cost(
        &self,
        cost_id: Uuid,
        update: &UpdatePlanCost,
    ) -> Result<PlanCost, AppError>;

    async fn delete_cost(&self, cost_id: Uuid) -> Result<(), AppError>;

    /// Creates a plan list. Slugs are unique; duplicates are a conflict.
    async fn create_plan_list(&self, input: &CreatePlanList) -> Result<PlanList, AppError>;

    async fn get_plan_list(&self, list_id: Uuid) -> Result<Option<PlanList>, AppError>;

    /// Plan lists in creation order.
    async fn list_plan_lists(&self) -> Result<Vec<PlanList>, AppError>;

    async fn update_plan_list(
        &self,
        list_id: Uuid,
        update: &UpdatePlanList,
    ) -> Result<PlanList, AppError>;

    /// Deletes a plan list together with its entries.
    async fn delete_plan_list(&self, list_id: Uuid) -> Result<(), AppError>;

    async fn create_plan_list_detail(
        &self,
        input: &CreatePlanListDetail,
    ) -> Result<PlanListDetail, AppError>;

    /// Entries of a plan list, lowest display order first.
    async fn list_plan_list_details(
        &self,
        list_id: Uuid,
    ) -> Result<Vec<PlanListDetail>, AppError>;

    async fn delete_plan_list_detail(&self, detail_id: Uuid) -> Result<(), AppError>;
}

/// Storage for subscriptions and their transaction ledger.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn create_subscription(
        &self,
        input: &CreateSubscription,
    ) -> Result<Subscription, AppError>;

    async fn get_subscription(
        &self,
        subscription_id: Uuid,
    ) -> Result<Option<Subscription>, AppError>;

    /// Subscriptions ordered by (user, billing start).
    async fn list_subscriptions(
        &self,
        filter: &ListSubscriptionsFilter,
    ) -> Result<Vec<Subscription>, AppError>;

    /// Persists the full subscription row; the row must exist.
    async fn update_subscription(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, AppError>;

    /// Removes the subscription row. Its transactions stay in the ledger.
    async fn delete_subscription(&self, subscription_id: Uuid) -> Result<(), AppError>;

    async fn create_transaction(
        &self,
        input: &CreateTransaction,
    ) -> Result<SubscriptionTransaction, AppError>;

    async fn get_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<Option<SubscriptionTransaction>, AppError>;

    /// Transactions newest first, then by user.
    async fn list_transactions(
        &self,
        filter: &ListTransactionsFilter,
    ) -> Result<Vec<SubscriptionTransaction>, AppError>;

    /// Flips the paid flag on every transaction of the subscription.
    /// Returns the number of rows touched.
    async fn mark_transactions_paid(&self, subscription_id: Uuid) -> Result<u64, AppError>;
}
