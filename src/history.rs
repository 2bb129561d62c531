//! Snapshot-based undo history for the envelope pair.
//!
//! Every entry is a full copy of both arrays, so restoring is a wholesale
//! replacement rather than a patch. Depth is unbounded unless a limit is
//! configured, in which case the oldest entries are discarded first.

use std::collections::VecDeque;

use crate::envelope::EnvelopePair;

/// Immutable copy of the envelope pair at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    positive: Vec<f64>,
    negative: Vec<f64>,
}

impl HistoryEntry {
    pub fn capture(envelopes: &EnvelopePair) -> Self {
        HistoryEntry {
            positive: envelopes.positive.clone(),
            negative: envelopes.negative.clone(),
        }
    }

    pub fn into_pair(self) -> EnvelopePair {
        EnvelopePair::new(self.positive, self.negative)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryStack {
    entries: VecDeque<HistoryEntry>,
    limit: Option<usize>,
}

impl HistoryStack {
    /// Unbounded history.
    pub fn new() -> Self {
        Self::default()
    }

    /// History holding at most `limit` entries.
    pub fn with_limit(limit: Option<usize>) -> Self {
        HistoryStack {
            entries: VecDeque::new(),
            limit,
        }
    }

    /// Push a deep copy of `envelopes`.
    pub fn snapshot(&mut self, envelopes: &EnvelopePair) {
        if self.limit == Some(0) {
            return;
        }
        self.entries.push_back(HistoryEntry::capture(envelopes));
        if let Some(limit) = self.limit {
            while self.entries.len() > limit {
                self.entries.pop_front();
            }
        }
    }

    /// Pop the newest entry and replace `envelopes` with it.
    /// Returns false (leaving `envelopes` untouched) when empty.
    pub fn undo(&mut self, envelopes: &mut EnvelopePair) -> bool {
        match self.entries.pop_back() {
            Some(entry) => {
                *envelopes = entry.into_pair();
                true
            }
            None => false,
        }
    }

    /// Snapshot the current state, then replace it with a copy of `baseline`.
    pub fn reset(&mut self, envelopes: &mut EnvelopePair, baseline: &EnvelopePair) {
        self.snapshot(envelopes);
        *envelopes = baseline.clone();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
