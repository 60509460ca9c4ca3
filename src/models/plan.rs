//! Subscription plan and tag models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A tag attached to subscription plans. Tag names are unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanTag {
    pub tag_id: Uuid,
    pub tag: String,
}

/// Subscription plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub plan_id: Uuid,
    pub name: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    /// Identity-provider group granted while a subscription on this plan
    /// is active.
    pub group: Option<String>,
    pub tag_ids: Vec<Uuid>,
    /// Days past the end of the billing window before the subscription
    /// expires.
    pub grace_period: u32,
    /// Key into the configured feature catalog.
    pub feature_ref: Option<String>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Tag names joined for display, truncated past three entries.
pub fn display_tags(tags: &[PlanTag]) -> String {
    let shown = tags
        .iter()
        .take(3)
        .map(|t| t.tag.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    if tags.len() > 3 {
        format!("{}, ...", shown)
    } else {
        shown
    }
}

/// Input for creating a plan.
#[derive(Debug, Clone, Validate)]
pub struct CreatePlan {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(max = 128))]
    pub slug: Option<String>,
    #[validate(length(max = 512))]
    pub description: Option<String>,
    pub group: Option<String>,
    pub tag_ids: Vec<Uuid>,
    pub grace_period: u32,
    pub feature_ref: Option<String>,
}

/// Input for updating a plan. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdatePlan {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[validate(length(max = 128))]
    pub slug: Option<String>,
    #[validate(length(max = 512))]
    pub description: Option<String>,
    pub group: Option<String>,
    pub tag_ids: Option<Vec<Uuid>>,
    pub grace_period: Option<u32>,
    pub feature_ref: Option<String>,
}

/// Filter parameters for listing plans.
#[derive(Debug, Clone, Default)]
pub struct ListPlansFilter {
    pub tag_id: Option<Uuid>,
}
