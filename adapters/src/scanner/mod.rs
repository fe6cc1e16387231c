//! Screener data source.
//!
//! Polls a screener scan endpoint (POST with a fixed JSON payload) and turns
//! the returned table into [`market::Sample`]s.

pub mod client;
pub mod errors;
pub mod parser;
pub mod source;
pub mod types;

pub use client::ScannerClient;
pub use errors::ScannerError;
pub use parser::parse_samples;
pub use source::ScannerSource;
pub use types::*;
