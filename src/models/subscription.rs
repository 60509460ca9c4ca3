//! User subscription model and lifecycle options.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Plan, PlanCost};

/// Lifecycle events a subscription can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionEvent {
    Processing,
    Expired,
    Overdue,
    New,
    Activate,
    Deactivate,
    PaymentError,
    PaymentSuccess,
}

impl SubscriptionEvent {
    pub const ALL: [SubscriptionEvent; 8] = [
        SubscriptionEvent::Processing,
        SubscriptionEvent::Expired,
        SubscriptionEvent::Overdue,
        SubscriptionEvent::New,
        SubscriptionEvent::Activate,
        SubscriptionEvent::Deactivate,
        SubscriptionEvent::PaymentError,
        SubscriptionEvent::PaymentSuccess,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionEvent::Processing => "processing",
            SubscriptionEvent::Expired => "expired",
            SubscriptionEvent::Overdue => "overdue",
            SubscriptionEvent::New => "new",
            SubscriptionEvent::Activate => "activate",
            SubscriptionEvent::Deactivate => "deactivate",
            SubscriptionEvent::PaymentError => "payment_error",
            SubscriptionEvent::PaymentSuccess => "payment_success",
        }
    }

    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "processing" => Some(SubscriptionEvent::Processing),
            "expired" => Some(SubscriptionEvent::Expired),
            "overdue" => Some(SubscriptionEvent::Overdue),
            "new" => Some(SubscriptionEvent::New),
            "activate" => Some(SubscriptionEvent::Activate),
            "deactivate" => Some(SubscriptionEvent::Deactivate),
            "payment_error" => Some(SubscriptionEvent::PaymentError),
            "payment_success" => Some(SubscriptionEvent::PaymentSuccess),
            _ => None,
        }
    }
}

/// A user's subscription to a cost tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub subscription_id: Uuid,
    pub user_id: Uuid,
    pub cost_id: Uuid,
    /// Extra cost tiers billed together with the main tier.
    pub extra_cost_ids: Vec<Uuid>,
    /// External system reference.
    pub reference: Option<String>,
    pub quantity: i32,
    pub date_billing_start: Option<DateTime<Utc>>,
    pub date_billing_end: Option<DateTime<Utc>>,
    pub date_billing_last: Option<DateTime<Utc>>,
    pub date_billing_next: Option<DateTime<Utc>>,
    pub active: bool,
    pub is_trialing: bool,
    pub due: bool,
    pub cancelled: bool,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Subscription {
    /// Pro-rated balance for the unused remainder of the current period.
    ///
    /// Whole days until the next billing date times the tier's daily cost,
    /// rounded to cents. Zero when the next billing date is unset or past.
    pub fn unused_daily_balance(&self, cost: &PlanCost, now: DateTime<Utc>) -> Decimal {
        match self.date_billing_next {
            Some(next) if next > now => {
                let days_left = (next - now).num_days();
                (Decimal::from(days_left) * cost.daily_cost()).round_dp(2)
            }
            _ => Decimal::ZERO,
        }
    }

    /// Pro-rated balance for the elapsed part of the current period.
    ///
    /// Zero when the billing start date is unset or in the future.
    pub fn used_daily_balance(&self, cost: &PlanCost, now: DateTime<Utc>) -> Decimal {
        match self.date_billing_start {
            Some(start) if now > start => {
                let days_used = (now - start).num_days();
                (Decimal::from(days_used) * cost.daily_cost()).round_dp(2)
            }
            _ => Decimal::ZERO,
        }
    }

    /// Short description, e.g. "Premium per month".
    pub fn description(&self, plan: &Plan, cost: &PlanCost) -> String {
        format!("{} {}", plan.name, cost.frequency_text())
    }
}

/// Options for setting up a subscription on a cost tier.
#[derive(Debug, Clone)]
pub struct SetupOptions {
    /// Activate the subscription immediately after creation.
    pub active: bool,
    /// Billing start instant; defaults to now.
    pub subscription_date: Option<DateTime<Utc>>,
    /// Deactivate all other active subscriptions of the user first.
    pub no_multiple_subscription: bool,
    /// Also delete the deactivated rows.
    pub del_multiple_subscription: bool,
    /// Record an initial (unpaid) transaction.
    pub record_transaction: bool,
    /// Mark outstanding transactions paid on activation.
    pub mark_transaction_paid: bool,
    /// Reuse an existing row for the same (user, tier) pair.
    pub reuse: bool,
}

impl Default for SetupOptions {
    fn default() -> Self {
        Self {
            active: true,
            subscription_date: None,
            no_multiple_subscription: false,
            del_multiple_subscription: false,
            record_transaction: false,
            mark_transaction_paid: true,
            reuse: false,
        }
    }
}

/// Options for activating a subscription.
#[derive(Debug, Clone)]
pub struct ActivateOptions {
    /// Billing start instant; defaults to now.
    pub subscription_date: Option<DateTime<Utc>>,
    /// Mark outstanding transactions paid.
    pub mark_transaction_paid: bool,
    /// Deactivate the user's other active subscriptions first.
    pub no_multiple_subscription: bool,
    /// Also delete the deactivated rows.
    pub del_multiple_subscription: bool,
    /// Flag the subscription as a trial.
    pub is_trialing: bool,
}

impl Default for ActivateOptions {
    fn default() -> Self {
        Self {
            subscription_date: None,
            mark_transaction_paid: true,
            no_multiple_subscription: false,
            del_multiple_subscription: false,
            is_trialing: false,
        }
    }
}

/// Input for creating a subscription row.
#[derive(Debug, Clone, Validate)]
pub struct CreateSubscription {
    pub user_id: Uuid,
    pub cost_id: Uuid,
    pub extra_cost_ids: Vec<Uuid>,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub active: bool,
    pub cancelled: bool,
}

impl CreateSubscription {
    pub fn new(user_id: Uuid, cost_id: Uuid) -> Self {
        Self {
            user_id,
            cost_id,
            extra_cost_ids: Vec::new(),
            reference: None,
            quantity: 1,
            active: true,
            cancelled: false,
        }
    }
}

/// Filter parameters for listing subscriptions.
#[derive(Debug, Clone, Default)]
pub struct ListSubscriptionsFilter {
    pub user_id: Option<Uuid>,
    pub cost_id: Option<Uuid>,
    pub active: Option<bool>,
}
