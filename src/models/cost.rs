//! Cost tier model and billing recurrence arithmetic.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Average days per month in the Gregorian calendar. Absorbs short months
/// and leap years when advancing by whole months.
const DAYS_PER_MONTH: f64 = 30.4368;

/// Average days per year in the Gregorian calendar.
const DAYS_PER_YEAR: f64 = 365.2425;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Billing recurrence unit for cost tiers.
///
/// Ordering follows billing frequency, `Once` first. Listings sort on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceUnit {
    Once,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl RecurrenceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceUnit::Once => "once",
            RecurrenceUnit::Second => "second",
            RecurrenceUnit::Minute => "minute",
            RecurrenceUnit::Hour => "hour",
            RecurrenceUnit::Day => "day",
            RecurrenceUnit::Week => "week",
            RecurrenceUnit::Month => "month",
            RecurrenceUnit::Year => "year",
        }
    }

    /// Parses a unit name. Unknown names are an error, never a fallback.
    pub fn from_string(s: &str) -> Option<Self> {
        match s {
            "once" => Some(RecurrenceUnit::Once),
            "second" => Some(RecurrenceUnit::Second),
            "minute" => Some(RecurrenceUnit::Minute),
            "hour" => Some(RecurrenceUnit::Hour),
            "day" => Some(RecurrenceUnit::Day),
            "week" => Some(RecurrenceUnit::Week),
            "month" => Some(RecurrenceUnit::Month),
            "year" => Some(RecurrenceUnit::Year),
            _ => None,
        }
    }

    /// Day length of one unit, for units of at least a day.
    fn unit_days(&self) -> Option<Decimal> {
        match self {
            RecurrenceUnit::Day => Some(Decimal::ONE),
            RecurrenceUnit::Week => Some(Decimal::from(7)),
            RecurrenceUnit::Month => Some(Decimal::new(304_368, 4)),
            RecurrenceUnit::Year => Some(Decimal::new(3_652_425, 4)),
            _ => None,
        }
    }

    fn plural_text(&self) -> &'static str {
        match self {
            RecurrenceUnit::Once => "one-time",
            RecurrenceUnit::Second => "seconds",
            RecurrenceUnit::Minute => "minutes",
            RecurrenceUnit::Hour => "hours",
            RecurrenceUnit::Day => "days",
            RecurrenceUnit::Week => "weeks",
            RecurrenceUnit::Month => "months",
            RecurrenceUnit::Year => "years",
        }
    }
}

/// Cost and billing frequency for a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanCost {
    pub cost_id: Uuid,
    pub plan_id: Uuid,
    pub slug: Option<String>,
    pub recurrence_period: u32,
    pub recurrence_unit: RecurrenceUnit,
    pub cost: Decimal,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl PlanCost {
    /// Next billing instant after `current` for this tier's recurrence rule.
    ///
    /// Sub-week units advance exactly. Months add 30.4368 days per period and
    /// years 365.2425 days, so short months and leap years never drift the
    /// schedule. `once` tiers never recur.
    pub fn next_billing_datetime(&self, current: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let period = i64::from(self.recurrence_period);
        match self.recurrence_unit {
            RecurrenceUnit::Once => None,
            RecurrenceUnit::Second => Some(current + Duration::seconds(period)),
            RecurrenceUnit::Minute => Some(current + Duration::minutes(period)),
            RecurrenceUnit::Hour => Some(current + Duration::hours(period)),
            RecurrenceUnit::Day => Some(current + Duration::days(period)),
            RecurrenceUnit::Week => Some(current + Duration::weeks(period)),
            RecurrenceUnit::Month => Some(
                current + average_days(DAYS_PER_MONTH * self.recurrence_period as f64),
            ),
            RecurrenceUnit::Year => Some(
                current + average_days(DAYS_PER_YEAR * self.recurrence_period as f64),
            ),
        }
    }

    /// Cost per day of this tier; zero for `once` and sub-day units.
    pub fn daily_cost(&self) -> Decimal {
        match self.recurrence_unit.unit_days() {
            Some(days) => self.cost / (days * Decimal::from(self.recurrence_period)),
            None => Decimal::ZERO,
        }
    }

    /// Human-readable recurrence unit, e.g. "per month".
    pub fn unit_text(&self) -> &'static str {
        match self.recurrence_unit {
            RecurrenceUnit::Once => "one-time",
            RecurrenceUnit::Second => "per second",
            RecurrenceUnit::Minute => "per minute",
            RecurrenceUnit::Hour => "per hour",
            RecurrenceUnit::Day => "per day",
            RecurrenceUnit::Week => "per week",
            RecurrenceUnit::Month => "per month",
            RecurrenceUnit::Year => "per year",
        }
    }

    /// Human-readable billing frequency, e.g. "every 3 months".
    pub fn frequency_text(&self) -> String {
        if self.recurrence_unit == RecurrenceUnit::Once {
            return "one-time".to_string();
        }
        if self.recurrence_period == 1 {
            return self.unit_text().to_string();
        }
        format!(
            "every {} {}",
            self.recurrence_period,
            self.recurrence_unit.plural_text()
        )
    }
}

/// Fractional-day offset at millisecond precision.
fn average_days(days: f64) -> Duration {
    Duration::milliseconds((days * MILLIS_PER_DAY).round() as i64)
}

/// Input for creating a cost tier.
#[derive(Debug, Clone, Validate)]
pub struct CreatePlanCost {
    pub plan_id: Uuid,
    #[validate(length(max = 128))]
    pub slug: Option<String>,
    #[validate(range(min = 1))]
    pub recurrence_period: u32,
    pub recurrence_unit: RecurrenceUnit,
    pub cost: Decimal,
}

/// Input for updating a cost tier.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdatePlanCost {
    #[validate(length(max = 128))]
    pub slug: Option<String>,
    #[validate(range(min = 1))]
    pub recurrence_period: Option<u32>,
    pub recurrence_unit: Option<RecurrenceUnit>,
    pub cost: Option<Decimal>,
}
