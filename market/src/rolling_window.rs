use std::collections::{HashMap, VecDeque};

use crate::error::MarketError;
use crate::types::{AssetId, Sample};

/// Bounded, time-ordered history of samples for a single asset.
///
/// Holds at most `capacity` samples; once full, every push evicts the
/// oldest entry first (FIFO).
#[derive(Debug, Clone)]
pub struct SampleWindow {
    /// Samples ordered by insertion, which is also time order
    samples: VecDeque<Sample>,

    capacity: usize,
}

impl SampleWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest one when the window is full.
    ///
    /// A sample whose timestamp precedes the last recorded one is rejected
    /// and the window is left untouched. Equal timestamps are accepted.
    pub fn push(&mut self, sample: Sample) -> Result<(), MarketError> {
        if let Some(last) = self.samples.back() {
            if sample.ts < last.ts {
                return Err(MarketError::CapacityInvariantViolation {
                    asset: sample.asset,
                    last: last.ts,
                    offered: sample.ts,
                });
            }
        }

        if self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);

        Ok(())
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.back()
    }

    pub fn oldest(&self) -> Option<&Sample> {
        self.samples.front()
    }

    pub fn get(&self, idx: usize) -> Option<&Sample> {
        self.samples.get(idx)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Sample> + ExactSizeIterator {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Owner of every asset's [`SampleWindow`].
///
/// Each window is bounded to `2 × rolling_window_size` so the stats engine
/// always has a full baseline plus headroom behind the latest sample.
#[derive(Debug)]
pub struct SampleStore {
    rolling_window_size: usize,
    windows: HashMap<AssetId, SampleWindow>,
}

impl SampleStore {
    pub fn new(rolling_window_size: usize) -> Self {
        Self {
            rolling_window_size: rolling_window_size.max(1),
            windows: HashMap::new(),
        }
    }

    pub fn rolling_window_size(&self) -> usize {
        self.rolling_window_size
    }

    /// Bound applied to every window.
    pub fn window_capacity(&self) -> usize {
        self.rolling_window_size * 2
    }

    /// Record a sample into its asset's window, creating the window on first sight.
    pub fn ingest(&mut self, sample: Sample) -> Result<(), MarketError> {
        let capacity = self.window_capacity();
        self.windows
            .entry(sample.asset.clone())
            .or_insert_with(|| SampleWindow::new(capacity))
            .push(sample)
    }

    /// Read-only view of an asset's history, oldest first.
    pub fn snapshot(&self, asset: &str) -> Option<&SampleWindow> {
        self.windows.get(asset)
    }

    pub fn assets(&self) -> impl Iterator<Item = &AssetId> {
        self.windows.keys()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}
