use catsaw_types::{StatusSnapshot, StreamState};

use crate::filter::FilterState;

/// Running counters behind the status line
#[derive(Debug)]
pub struct StatusAggregator {
    /// Drops since the last visible activity
    suppressed: u64,

    /// Drops over the whole session
    suppressed_total: u64,

    /// Whether drops in a batch cut short by freeze-on-match go into the total
    count_before_freeze: bool,

    batch_dropped: u64,
    batch_rendered: bool,
}

impl StatusAggregator {
    pub fn new(count_suppressed_before_freeze: bool) -> Self {
        Self {
            suppressed: 0,
            suppressed_total: 0,
            count_before_freeze: count_suppressed_before_freeze,
            batch_dropped: 0,
            batch_rendered: false,
        }
    }

    pub fn begin_batch(&mut self) {
        self.batch_dropped = 0;
        self.batch_rendered = false;
    }

    /// Count one dropped record
    pub fn record_drop(&mut self) {
        self.suppressed += 1;
        self.batch_dropped += 1;
    }

    /// Note a rendered record; the first one in a batch resets the live count
    pub fn record_render(&mut self) {
        if !self.batch_rendered {
            self.batch_rendered = true;
            self.suppressed = 0;
        }
    }

    /// Close the batch, `froze` when it was cut short by freeze-on-match
    pub fn end_batch(&mut self, froze: bool) {
        if !froze || self.count_before_freeze {
            self.suppressed_total += self.batch_dropped;
        }
        self.batch_dropped = 0;
    }

    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }

    pub fn suppressed_total(&self) -> u64 {
        self.suppressed_total
    }

    pub fn snapshot(&self, state: StreamState, filter: &FilterState, buffered: usize) -> StatusSnapshot {
        StatusSnapshot {
            state,
            suppressed: self.suppressed,
            suppressed_total: self.suppressed_total,
            buffered,
            identity_label: filter.identity_label(),
            highlight_label: filter.highlight_label(),
            level_label: filter.level_label(),
            freeze_on_match: filter.freeze_on_match,
        }
    }
}

impl Default for StatusAggregator {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catsaw_types::Severity;

    #[test]
    fn test_first_render_resets_live_count() {
        let mut status = StatusAggregator::default();
        status.begin_batch();
        status.record_drop();
        status.record_drop();
        assert_eq!(status.suppressed(), 2);
        status.record_render();
        assert_eq!(status.suppressed(), 0);
        status.record_drop();
        status.record_render();
        // Only the first render of a batch resets
        assert_eq!(status.suppressed(), 1);
        status.end_batch(false);
        assert_eq!(status.suppressed_total(), 3);
    }

    #[test]
    fn test_count_accumulates_across_silent_batches() {
        let mut status = StatusAggregator::default();
        for _ in 0..3 {
            status.begin_batch();
            status.record_drop();
            status.end_batch(false);
        }
        assert_eq!(status.suppressed(), 3);
        assert_eq!(status.suppressed_total(), 3);
    }

    #[test]
    fn test_frozen_batch_total_is_configurable() {
        let mut counted = StatusAggregator::new(true);
        let mut excluded = StatusAggregator::new(false);
        for status in [&mut counted, &mut excluded] {
            status.begin_batch();
            status.record_drop();
            status.record_drop();
            status.record_render();
            status.end_batch(true);
        }
        assert_eq!(counted.suppressed_total(), 2);
        assert_eq!(excluded.suppressed_total(), 0);
    }

    #[test]
    fn test_snapshot_labels() {
        let status = StatusAggregator::default();
        let mut filter = FilterState::new();
        filter.min_level = Some(Severity::Error);
        filter.freeze_on_match = true;

        let snapshot = status.snapshot(StreamState::Paused, &filter, 4);
        assert_eq!(snapshot.state, StreamState::Paused);
        assert_eq!(snapshot.buffered, 4);
        assert_eq!(snapshot.level_label.as_deref(), Some("≥Error"));
        assert!(snapshot.identity_label.is_none());
        assert!(snapshot.freeze_on_match);
    }
}
