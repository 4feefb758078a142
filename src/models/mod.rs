pub mod file_entry;
pub mod operation;
pub mod snapshot;
pub mod volume;
