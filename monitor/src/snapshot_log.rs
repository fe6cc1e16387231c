//! Append-only CSV record of every polled batch.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use market::Sample;
use serde::Serialize;
use tracing::{debug, error};

#[derive(Debug, Serialize)]
struct SnapshotRow<'a> {
    timestamp: DateTime<Utc>,
    asset: &'a str,
    price: f64,
    short_change: Option<f64>,
    long_change: Option<f64>,
}

impl<'a> From<&'a Sample> for SnapshotRow<'a> {
    fn from(s: &'a Sample) -> Self {
        Self {
            timestamp: s.ts,
            asset: &s.asset,
            price: s.price,
            short_change: s.short_change,
            long_change: s.long_change,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SnapshotLog {
    path: PathBuf,
}

impl SnapshotLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write failures are logged and otherwise ignored.
    pub fn append(&self, batch: &[Sample]) {
        if batch.is_empty() {
            return;
        }
        match self.try_append(batch) {
            Ok(()) => debug!(rows = batch.len(), path = %self.path.display(), "snapshot rows written"),
            Err(e) => error!(error = %e, path = %self.path.display(), "failed to write snapshot rows"),
        }
    }

    fn try_append(&self, batch: &[Sample]) -> Result<(), csv::Error> {
        let file_exists = self.path.exists();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(!file_exists)
            .from_writer(file);

        for sample in batch {
            wtr.serialize(SnapshotRow::from(sample))?;
        }
        wtr.flush()?;
        Ok(())
    }
}
