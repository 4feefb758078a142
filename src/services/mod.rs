pub mod cache;
pub mod file_service;
pub mod prober;
pub mod refresh_timer;
pub mod safety;
pub mod scheduler;
pub mod volume_service;
