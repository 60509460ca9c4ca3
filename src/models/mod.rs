//! Domain models for subscriptions-core.

mod cost;
mod plan;
mod plan_list;
mod subscription;
mod transaction;

pub use cost::{CreatePlanCost, PlanCost, RecurrenceUnit, UpdatePlanCost};
pub use plan::{display_tags, CreatePlan, ListPlansFilter, Plan, PlanTag, UpdatePlan};
pub use plan_list::{
    CreatePlanList, CreatePlanListDetail, PlanList, PlanListDetail, UpdatePlanList,
};
pub use subscription::{
    ActivateOptions, CreateSubscription, ListSubscriptionsFilter, SetupOptions, Subscription,
    SubscriptionEvent,
};
pub use transaction::{CreateTransaction, ListTransactionsFilter, SubscriptionTransaction};
