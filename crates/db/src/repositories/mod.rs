//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Reads and single-statement writes accept any `PgExecutor`, so the same
//! method runs against the pool or inside a transaction. Multi-statement
//! writes take `&mut PgConnection`.

pub mod campaign_repo;
pub mod change_log_repo;
pub mod lead_repo;
pub mod lock_repo;
pub mod pushed_company_repo;
pub mod sync_run_repo;

pub use campaign_repo::CampaignRepo;
pub use change_log_repo::ChangeLogRepo;
pub use lead_repo::LeadRepo;
pub use lock_repo::LockRepo;
pub use pushed_company_repo::PushedCompanyRepo;
pub use sync_run_repo::SyncRunRepo;
