//! Gap-based clustering of bracketed records into burst groups.

use chrono::{Duration, NaiveDateTime};
use serde::Serialize;

use crate::record::{chronological_cmp, ImageRecord};

/// Default gap tolerance between consecutive AEB frames, in seconds.
///
/// The camera fires a bracket in rapid succession, so even with a slow
/// shutter the frames land within a few seconds of each other, while
/// unrelated shots at the same spot are much further apart.
pub const DEFAULT_MAX_GAP_SECS: i64 = 5;

#[derive(Debug, Clone)]
pub struct GroupConfig {
    /// Maximum time between consecutive frames of one bracket burst.
    pub max_gap: Duration,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            max_gap: Duration::seconds(DEFAULT_MAX_GAP_SECS),
        }
    }
}

impl GroupConfig {
    pub fn with_max_gap_secs(secs: i64) -> Self {
        Self {
            max_gap: Duration::seconds(secs),
        }
    }
}

/// One shutter-release bracket burst, members in capture order.
#[derive(Debug, Clone, Serialize)]
pub struct BracketGroup {
    pub images: Vec<ImageRecord>,
}

impl BracketGroup {
    fn new(images: Vec<ImageRecord>) -> Self {
        debug_assert!(!images.is_empty());
        Self { images }
    }

    /// Capture time of the first frame.
    pub fn start_time(&self) -> NaiveDateTime {
        self.images[0].timestamp
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Elapsed time from the first to the last frame.
    pub fn span(&self) -> Duration {
        match self.images.last() {
            Some(last) => last.timestamp - self.images[0].timestamp,
            None => Duration::zero(),
        }
    }
}

/// Partition bracketed records into burst groups.
///
/// Records are sorted by capture time (exposure offset, then path on ties)
/// and walked once; a gap larger than `config.max_gap` between consecutive
/// frames closes the current group. Every bracketed input record lands in
/// exactly one group; a lone frame becomes a singleton group. Groups come
/// out in chronological order of their first frame.
pub fn build_groups(mut records: Vec<ImageRecord>, config: &GroupConfig) -> Vec<BracketGroup> {
    records.retain(|record| record.is_bracketed);
    records.sort_by(chronological_cmp);

    let mut groups = Vec::new();
    let mut current: Vec<ImageRecord> = Vec::new();

    for record in records {
        if let Some(last) = current.last() {
            if record.timestamp - last.timestamp > config.max_gap {
                groups.push(BracketGroup::new(std::mem::take(&mut current)));
            }
        }
        current.push(record);
    }

    if !current.is_empty() {
        groups.push(BracketGroup::new(current));
    }

    groups
}
