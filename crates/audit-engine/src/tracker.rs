//! Per-Channel Sequence Tracking
//!
//! Each channel numbers its record groups independently. The tracker keeps
//! the running sequence state for one channel during the forward pass and
//! holds the deduplicated sequence set that the end-of-stream reconciliation
//! walks to tell reordering apart from genuine loss.

use std::collections::BTreeSet;

/// Outcome of observing one record.
#[derive(Debug, Clone, Copy)]
pub struct Observation {
    /// This was the first record seen on the channel
    pub first_record: bool,
    /// Signed jump relative to the previous sequence number, when the jump
    /// was not the consecutive `+1`. Fires on every non-consecutive jump,
    /// including benign out-of-order re-delivery; reconciliation decides
    /// later whether anything was actually lost.
    pub gap: Option<i64>,
    /// Size of the group this record closed, when the sequence changed
    pub closed_group: Option<u64>,
}

/// A genuinely missing span found by reconciliation
#[derive(Debug, Clone, Copy)]
pub struct DroppedSpan {
    /// Count of missing group identifiers
    pub missing: u64,
    /// The observed sequence number the span ends before
    pub before_seq: u32,
}

/// Sequence state for one channel.
///
/// `observe` must be called exactly once per record, in record order. It is
/// not idempotent: replaying a position mutates `previous_seq` again.
#[derive(Debug)]
pub struct SequenceTracker {
    previous_seq: u32,
    first_seq: Option<u32>,
    records_seen: u64,
    last_position: Option<usize>,
    seen: BTreeSet<u32>,
    gap_count: u64,
    current_group_size: u64,
}

impl SequenceTracker {
    pub fn new() -> Self {
        Self {
            previous_seq: 0,
            first_seq: None,
            records_seen: 0,
            last_position: None,
            seen: BTreeSet::new(),
            gap_count: 0,
            current_group_size: 0,
        }
    }

    /// Step the tracker over one record.
    pub fn observe(&mut self, position: usize, seq: u32) -> Observation {
        let first_record = self.last_position.is_none();
        if first_record {
            self.first_seq = Some(seq);
        }

        // previous_seq starts at 0, so a stream opening on anything other
        // than sequence 0 or 1 already counts as a live jump.
        let delta = i64::from(seq) - i64::from(self.previous_seq);
        let gap = if seq != self.previous_seq && delta != 1 {
            self.gap_count += 1;
            Some(delta)
        } else {
            None
        };

        let closed_group = if !first_record && seq != self.previous_seq {
            let size = self.current_group_size;
            self.current_group_size = 0;
            Some(size)
        } else {
            None
        };

        self.seen.insert(seq);
        self.previous_seq = seq;
        self.last_position = Some(position);
        self.records_seen += 1;
        self.current_group_size += 1;

        Observation {
            first_record,
            gap,
            closed_group,
        }
    }

    /// Reconciliation walk: adjacent pairs of the deduplicated ascending
    /// sequence set. A pair differing by more than one means groups were
    /// genuinely dropped; a live jump with no counterpart here was mere
    /// reordering.
    pub fn dropped_spans(&self) -> Vec<DroppedSpan> {
        self.seen
            .iter()
            .zip(self.seen.iter().skip(1))
            .filter_map(|(&lo, &hi)| {
                let diff = u64::from(hi) - u64::from(lo);
                (diff > 1).then_some(DroppedSpan {
                    missing: diff - 1,
                    before_seq: hi,
                })
            })
            .collect()
    }

    /// Flush the still-open group at end-of-stream, if any
    pub fn take_open_group(&mut self) -> Option<u64> {
        if self.current_group_size == 0 {
            return None;
        }
        let size = self.current_group_size;
        self.current_group_size = 0;
        Some(size)
    }

    /// Number of records observed on this channel
    pub fn records_seen(&self) -> u64 {
        self.records_seen
    }

    /// Position of the last record observed, `None` if the channel was
    /// never touched
    pub fn last_position(&self) -> Option<usize> {
        self.last_position
    }

    /// First sequence number observed
    pub fn first_seq(&self) -> Option<u32> {
        self.first_seq
    }

    /// Live jumps counted during the forward pass
    pub fn gap_count(&self) -> u64 {
        self.gap_count
    }

    /// Count of distinct sequence numbers observed
    pub fn distinct_sequences(&self) -> usize {
        self.seen.len()
    }
}

impl Default for SequenceTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(tracker: &mut SequenceTracker, seqs: &[u32]) -> Vec<Observation> {
        seqs.iter()
            .enumerate()
            .map(|(pos, &seq)| tracker.observe(pos, seq))
            .collect()
    }

    #[test]
    fn test_consecutive_sequence_is_clean() {
        let mut tracker = SequenceTracker::new();
        let observations = feed(&mut tracker, &[1, 2, 3, 4]);
        assert!(observations.iter().all(|o| o.gap.is_none()));
        assert_eq!(tracker.gap_count(), 0);
        assert!(tracker.dropped_spans().is_empty());
    }

    #[test]
    fn test_true_loss_seen_live_and_reconciled() {
        let mut tracker = SequenceTracker::new();
        let observations = feed(&mut tracker, &[1, 2, 5, 6]);
        assert_eq!(observations[2].gap, Some(3));
        assert_eq!(tracker.gap_count(), 1);

        let spans = tracker.dropped_spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].missing, 2); // identifiers 3 and 4
        assert_eq!(spans[0].before_seq, 5);
    }

    #[test]
    fn test_reordering_is_not_loss() {
        let mut tracker = SequenceTracker::new();
        let observations = feed(&mut tracker, &[1, 3, 2, 4]);
        // every non-consecutive jump fires live, including the 3->2 one
        assert_eq!(observations[1].gap, Some(2));
        assert_eq!(observations[2].gap, Some(-1));
        assert_eq!(observations[3].gap, Some(2));
        assert_eq!(tracker.gap_count(), 3);
        // dedup+sort yields [1,2,3,4]: nothing was lost
        assert!(tracker.dropped_spans().is_empty());
    }

    #[test]
    fn test_first_record_with_high_sequence_is_a_live_jump() {
        let mut tracker = SequenceTracker::new();
        let observation = tracker.observe(0, 7);
        assert!(observation.first_record);
        assert_eq!(observation.gap, Some(7));
    }

    #[test]
    fn test_duplicate_sequences_do_not_reconcile_as_loss() {
        let mut tracker = SequenceTracker::new();
        feed(&mut tracker, &[1, 1, 2, 2, 3]);
        assert_eq!(tracker.gap_count(), 0);
        assert!(tracker.dropped_spans().is_empty());
        assert_eq!(tracker.distinct_sequences(), 3);
    }

    #[test]
    fn test_group_sizes_close_on_sequence_change() {
        let mut tracker = SequenceTracker::new();
        let observations = feed(&mut tracker, &[1, 1, 1, 2, 2]);
        let closed: Vec<u64> = observations.iter().filter_map(|o| o.closed_group).collect();
        assert_eq!(closed, vec![3]);
        assert_eq!(tracker.take_open_group(), Some(2));
        assert_eq!(tracker.take_open_group(), None);
    }

    #[test]
    fn test_untouched_channel_state() {
        let tracker = SequenceTracker::new();
        assert_eq!(tracker.records_seen(), 0);
        assert_eq!(tracker.last_position(), None);
        assert!(tracker.dropped_spans().is_empty());
    }
}
