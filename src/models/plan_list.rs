//! Plan list models for grouping plans on display pages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A display list of subscription plans.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanList {
    pub list_id: Uuid,
    pub title: Option<String>,
    pub slug: Option<String>,
    pub subtitle: Option<String>,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub active: bool,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Presentation details for one plan on a plan list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanListDetail {
    pub detail_id: Uuid,
    pub plan_id: Uuid,
    pub list_id: Uuid,
    pub html_content: Option<String>,
    pub subscribe_button_text: Option<String>,
    /// Lower numbers display first.
    pub order: u32,
    pub created_utc: DateTime<Utc>,
}

/// Input for creating a plan list.
#[derive(Debug, Clone, Validate)]
pub struct CreatePlanList {
    pub title: Option<String>,
    #[validate(length(max = 128))]
    pub slug: Option<String>,
    pub subtitle: Option<String>,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub active: bool,
}

impl Default for CreatePlanList {
    fn default() -> Self {
        Self {
            title: None,
            slug: None,
            subtitle: None,
            header: None,
            footer: None,
            active: true,
        }
    }
}

/// Input for updating a plan list. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdatePlanList {
    pub title: Option<String>,
    #[validate(length(max = 128))]
    pub slug: Option<String>,
    pub subtitle: Option<String>,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub active: Option<bool>,
}

/// Input for adding a plan to a plan list.
#[derive(Debug, Clone, Validate)]
pub struct CreatePlanListDetail {
    pub plan_id: Uuid,
    pub list_id: Uuid,
    pub html_content: Option<String>,
    /// Defaults to "Subscribe" when unset.
    #[validate(length(max = 128))]
    pub subscribe_button_text: Option<String>,
    /// Defaults to 1 when unset. Lower numbers display first.
    pub order: Option<u32>,
}
