//! Leadwatch domain core.
//!
//! Pure building blocks shared by the store, the sync engine and the HTTP
//! surface. Nothing in this crate touches the database or the network; the
//! two external collaborators (snapshot source and webhook notifier) are
//! described here as traits and implemented elsewhere.

pub mod change_log;
pub mod error;
pub mod notify;
pub mod pagination;
pub mod push;
pub mod reconcile;
pub mod snapshot;
pub mod source;
pub mod types;
