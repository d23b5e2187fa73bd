//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - Insert/patch DTOs where the table takes writes other than snapshots

pub mod campaign;
pub mod change_log;
pub mod lead;
pub mod pushed_company;
pub mod sync_run;
