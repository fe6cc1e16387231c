pub mod error;
pub mod rolling_window;
pub mod source;
pub mod stats;
pub mod types;

pub use error::MarketError;
pub use rolling_window::{SampleStore, SampleWindow};
pub use source::{DataSource, FetchError};
pub use stats::{AssetSignals, Deviation, DeviationRecord, StatsEngine, compute_deviation};
pub use types::{AssetId, Sample};
