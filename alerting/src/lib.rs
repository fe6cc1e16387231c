pub mod daily_reset;
pub mod eligibility;
pub mod engine;
pub mod format;
pub mod notifier;
pub mod state;
pub mod types;

pub use daily_reset::{DailyPurge, PurgeAction};
pub use engine::AnomalyEvaluator;
pub use notifier::{LogNotifier, Notifier, NotifyError, PurgeReport};
pub use state::CooldownTracker;
pub use types::{
    AlertBatch, AlertCandidate, CooldownCoupling, Direction, EvaluatorConfig, Horizon, LocalZone,
    QuietHours,
};
