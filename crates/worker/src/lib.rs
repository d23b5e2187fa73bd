//! Scheduled reconciliation.
//!
//! Runs a full pass against the snapshot source on a fixed interval until
//! cancelled. Passes never overlap: the loop awaits each pass before the
//! next tick, and the store's sync lock serializes it against manual passes
//! started through the API.

pub mod config;
pub mod scheduler;

pub use config::WorkerConfig;
pub use scheduler::SyncScheduler;
