//! Subscriptions Core - plan catalog, billing lifecycle, and transaction ledger.

pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod services;
