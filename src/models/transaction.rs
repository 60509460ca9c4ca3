//! Subscription transaction model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A billing event recorded against a subscription. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionTransaction {
    pub transaction_id: Uuid,
    pub user_id: Uuid,
    pub subscription_id: Uuid,
    pub date_transaction: DateTime<Utc>,
    pub amount: Decimal,
    pub paid: bool,
}

/// Input for recording a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransaction {
    pub user_id: Uuid,
    pub subscription_id: Uuid,
    pub date_transaction: DateTime<Utc>,
    pub amount: Decimal,
    pub paid: bool,
}

/// Filter parameters for listing transactions.
#[derive(Debug, Clone, Default)]
pub struct ListTransactionsFilter {
    pub user_id: Option<Uuid>,
    pub subscription_id: Option<Uuid>,
}
