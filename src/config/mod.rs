use crate::error::AppError;
use crate::models::SubscriptionEvent;
use config::{Config as Cfg, File};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Library configuration: notification bindings, the default cost tier,
/// and the plan feature catalog.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SubscriptionsConfig {
    /// Cost tier set up for a user when a subscription is deactivated with
    /// the default fallback enabled.
    #[serde(default)]
    pub default_cost_id: Option<Uuid>,
    #[serde(default)]
    pub notifications: NotificationBindings,
    /// Feature sets keyed by reference name. The `default` entry serves
    /// plans without a `feature_ref`.
    #[serde(default)]
    pub features: HashMap<String, Value>,
}

/// Handler name bound to each lifecycle event. Unset events are not notified.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct NotificationBindings {
    #[serde(default)]
    pub processing: Option<String>,
    #[serde(default)]
    pub expired: Option<String>,
    #[serde(default)]
    pub overdue: Option<String>,
    #[serde(default)]
    pub new: Option<String>,
    #[serde(default)]
    pub activate: Option<String>,
    #[serde(default)]
    pub deactivate: Option<String>,
    #[serde(default)]
    pub payment_error: Option<String>,
    #[serde(default)]
    pub payment_success: Option<String>,
}

impl NotificationBindings {
    /// Handler name configured for the event, if any.
    pub fn handler_name(&self, event: SubscriptionEvent) -> Option<&str> {
        let name = match event {
            SubscriptionEvent::Processing => &self.processing,
            SubscriptionEvent::Expired => &self.expired,
            SubscriptionEvent::Overdue => &self.overdue,
            SubscriptionEvent::New => &self.new,
            SubscriptionEvent::Activate => &self.activate,
            SubscriptionEvent::Deactivate => &self.deactivate,
            SubscriptionEvent::PaymentError => &self.payment_error,
            SubscriptionEvent::PaymentSuccess => &self.payment_success,
        };
        name.as_deref()
    }

    /// Binds every event to the same handler name.
    pub fn all(name: &str) -> Self {
        let name = Some(name.to_string());
        Self {
            processing: name.clone(),
            expired: name.clone(),
            overdue: name.clone(),
            new: name.clone(),
            activate: name.clone(),
            deactivate: name.clone(),
            payment_error: name.clone(),
            payment_success: name,
        }
    }
}

impl SubscriptionsConfig {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let config = Cfg::builder()
            .add_source(File::with_name("subscriptions").required(false))
            .add_source(config::Environment::with_prefix("SUBS").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Feature set for a plan reference. A missing reference resolves to
    /// nothing; plans without a reference get the `default` entry.
    pub fn features_for(&self, feature_ref: Option<&str>) -> Option<&Value> {
        match feature_ref {
            Some(r) => self.features.get(r),
            None => self.features.get("default"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_handler_name_per_event() {
        let bindings = NotificationBindings {
            activate: Some("email".to_string()),
            ..Default::default()
        };
        assert_eq!(
            bindings.handler_name(SubscriptionEvent::Activate),
            Some("email")
        );
        assert_eq!(bindings.handler_name(SubscriptionEvent::Expired), None);
    }

    #[test]
    fn test_all_binds_every_event() {
        let bindings = NotificationBindings::all("log");
        for event in SubscriptionEvent::ALL {
            assert_eq!(bindings.handler_name(event), Some("log"));
        }
    }

    #[test]
    fn test_features_for_falls_back_to_default() {
        let mut features = HashMap::new();
        features.insert("default".to_string(), json!({"seats": 1}));
        features.insert("team".to_string(), json!({"seats": 10}));
        let config = SubscriptionsConfig {
            features,
            ..Default::default()
        };

        assert_eq!(
            config.features_for(Some("team")),
            Some(&json!({"seats": 10}))
        );
        assert_eq!(config.features_for(None), Some(&json!({"seats": 1})));
        assert_eq!(config.features_for(Some("missing")), None);
    }
}
