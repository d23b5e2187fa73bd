pub mod campaigns;
pub mod change_log;
pub mod sync;
