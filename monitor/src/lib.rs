pub mod config;
pub mod error;
pub mod runner;
pub mod snapshot_log;

pub use config::AppConfig;
pub use error::MonitorError;
pub use runner::{CycleReport, Monitor};
pub use snapshot_log::SnapshotLog;
