//! Reconciliation and push engine.
//!
//! Applies the pure plans from `leadwatch_core` to the store:
//!
//! - [`reconciler`] runs the campaign and lead diffs and records sync runs
//! - [`push_tracker`] delivers company names and maintains the pushed set
//! - [`fetch`] pulls complete snapshots from a [`SnapshotSource`] before
//!   anything is written
//!
//! [`SnapshotSource`]: leadwatch_core::source::SnapshotSource

pub mod error;
pub mod fetch;
pub mod push_tracker;
pub mod reconciler;

pub use error::{PushError, RecordFailure, SyncError};
pub use push_tracker::PushTracker;
pub use reconciler::{CampaignChanges, LeadChanges, PassReport, Reconciler};
