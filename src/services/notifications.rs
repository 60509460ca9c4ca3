//! Notification dispatch.
//!
//! Lifecycle events are routed to named handlers through
//! [`NotificationBindings`]. An event with no binding is silently skipped; a
//! binding that names an unregistered handler is a configuration fault and
//! fails [`Notifier::new`]. Transport (email, SMS, webhooks) lives behind
//! [`NotificationHandler`] in the host.

use crate::config::NotificationBindings;
use crate::error::AppError;
use crate::models::{Subscription, SubscriptionEvent};
use crate::services::metrics::record_notification;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Event payload handed to a [`NotificationHandler`].
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionNotice {
    pub event: SubscriptionEvent,
    pub subscription: Subscription,
    /// Caller-supplied context, passed through untouched.
    pub extra: serde_json::Value,
}

/// Delivers a notice to a subscriber. Implementations own the transport.
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    async fn send(&self, notice: &SubscriptionNotice) -> Result<(), AppError>;
}

/// Named handlers available for event bindings.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn NotificationHandler>>,
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, handler: Arc<dyn NotificationHandler>) {
        self.handlers.insert(name.to_string(), handler);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn NotificationHandler>> {
        self.handlers.get(name).cloned()
    }
}

/// Resolves event bindings and dispatches notices.
#[derive(Debug, Clone)]
pub struct Notifier {
    registry: HandlerRegistry,
    bindings: NotificationBindings,
}

impl Notifier {
    /// Build a notifier, verifying every bound handler name up front.
    pub fn new(
        registry: HandlerRegistry,
        bindings: NotificationBindings,
    ) -> Result<Self, AppError> {
        let mut missing: Vec<&str> = SubscriptionEvent::ALL
            .iter()
            .filter_map(|event| bindings.handler_name(*event))
            .filter(|name| registry.get(name).is_none())
            .collect();
        missing.sort_unstable();
        missing.dedup();
        if !missing.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "Unknown notification handlers: {}",
                missing.join(", ")
            )));
        }

        Ok(Self { registry, bindings })
    }

    /// Dispatch an event for a subscription.
    ///
    /// Returns `Ok(true)` when a handler was invoked, `Ok(false)` when the
    /// event has no binding. Handler failures propagate to the caller.
    #[instrument(skip(self, subscription, extra), fields(
        subscription_id = %subscription.subscription_id,
        event = event.as_str()
    ))]
    pub async fn notify(
        &self,
        subscription: &Subscription,
        event: SubscriptionEvent,
        extra: serde_json::Value,
    ) -> Result<bool, AppError> {
        let Some(name) = self.bindings.handler_name(event) else {
            debug!("No handler bound for event, skipping");
            return Ok(false);
        };
        let handler = self.registry.get(name).ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!(
                "Notification handler '{}' is not registered",
                name
            ))
        })?;

        let notice = SubscriptionNotice {
            event,
            subscription: subscription.clone(),
            extra,
        };
        match handler.send(&notice).await {
            Ok(()) => {
                record_notification(event.as_str(), "sent");
                info!(handler = name, "Notification dispatched");
                Ok(true)
            }
            Err(err) => {
                record_notification(event.as_str(), "error");
                Err(err)
            }
        }
    }
}

/// Handler that writes notices to the log. Useful as a default binding.
#[derive(Debug, Default)]
pub struct LogHandler;

#[async_trait]
impl NotificationHandler for LogHandler {
    async fn send(&self, notice: &SubscriptionNotice) -> Result<(), AppError> {
        info!(
            event = notice.event.as_str(),
            subscription_id = %notice.subscription.subscription_id,
            user_id = %notice.subscription.user_id,
            extra = %notice.extra,
            "Subscription notice"
        );
        Ok(())
    }
}

/// Handler that captures notices for assertions.
#[derive(Default)]
pub struct RecordingHandler {
    notices: Mutex<Vec<SubscriptionNotice>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<SubscriptionNotice> {
        self.notices.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.notices.lock().await.len()
    }
}

#[async_trait]
impl NotificationHandler for RecordingHandler {
    async fn send(&self, notice: &SubscriptionNotice) -> Result<(), AppError> {
        self.notices.lock().await.push(notice.clone());
        Ok(())
    }
}
