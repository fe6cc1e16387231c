pub mod scanner;
pub mod slack;

pub use scanner::{RequestParameters, ScannerSource};
pub use slack::{SlackClient, SlackNotifier};
