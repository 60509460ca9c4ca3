//! Services module for subscriptions-core.

pub mod groups;
pub mod lifecycle;
pub mod memory;
pub mod metrics;
pub mod notifications;
pub mod store;

pub use groups::{GroupProvider, MemoryGroups};
pub use lifecycle::SubscriptionService;
pub use memory::MemoryStore;
pub use metrics::{
    get_metrics, init_metrics, record_notification, record_subscription_operation,
    record_transaction_recorded,
};
pub use notifications::{
    HandlerRegistry, LogHandler, NotificationHandler, Notifier, RecordingHandler,
    SubscriptionNotice,
};
pub use store::{CatalogStore, SubscriptionStore};
