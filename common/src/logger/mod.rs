mod init;
mod macros;
mod slow;
mod trace_id;

pub use init::init_logger;
pub use macros::{asset_span, cycle_span};
pub use slow::warn_if_slow;
pub use trace_id::TraceId;
