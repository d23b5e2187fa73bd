//! Outbound delivery of pushed company names.

pub mod webhook;

pub use webhook::{WebhookConfig, WebhookError, WebhookNotifier};
