//! Analyzer Strategies
//!
//! The two audit modes share one engine shape and differ only in record
//! type and rule set. `EventAnalyzer` checks per-channel group sequencing
//! and stream boundary conditions; `IntervalAnalyzer` checks physical
//! plausibility of accumulation intervals.

use crate::error::AuditError;
use crate::ledger::{ErrorDetail, ErrorKind, Ledger};
use crate::record::{
    Channel, EventRecord, GroupCloseAction, GroupCloseReason, GroupOpenReason, IntervalRecord,
    Position,
};
use crate::source::RecordSource;
use crate::stats::{Histogram, HistogramConfig};
use crate::tracker::SequenceTracker;
use tracing::{info, warn};

/// Rule set strategy for one audit mode
pub trait Analyzer {
    type Record;

    /// Evaluate rules against one record, in record order
    fn observe(&mut self, position: usize, record: &Self::Record, ledger: &mut Ledger);

    /// End-of-stream pass. Runs after the cursor is exhausted; may re-read
    /// prior positions through the source.
    fn finalize(
        &mut self,
        source: &mut dyn RecordSource<Record = Self::Record>,
        ledger: &mut Ledger,
    ) -> Result<(), AuditError>;
}

/// Event-mode analyzer: per-channel sequence tracking, group boundary
/// rules, and the gap reconciliation pass.
pub struct EventAnalyzer {
    trackers: [SequenceTracker; 5],
    histograms: [Histogram; 5],
}

impl EventAnalyzer {
    pub fn new() -> Self {
        Self::with_histogram(HistogramConfig::default())
    }

    /// Create with custom group-size histogram binning
    pub fn with_histogram(config: HistogramConfig) -> Self {
        Self {
            trackers: std::array::from_fn(|_| SequenceTracker::new()),
            histograms: std::array::from_fn(|_| Histogram::new(config)),
        }
    }

    /// Sequence tracker for one channel
    pub fn tracker(&self, channel: Channel) -> &SequenceTracker {
        &self.trackers[channel.index()]
    }

    /// Records-per-group histograms, one per channel
    pub fn histograms(&self) -> impl Iterator<Item = (Channel, &Histogram)> {
        Channel::ALL
            .iter()
            .map(|&channel| (channel, &self.histograms[channel.index()]))
    }
}

impl Default for EventAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for EventAnalyzer {
    type Record = EventRecord;

    fn observe(&mut self, position: usize, record: &EventRecord, ledger: &mut Ledger) {
        let index = record.channel.index();
        let observation = self.trackers[index].observe(position, record.sequence);

        if observation.first_record && record.open_reason != GroupOpenReason::RunStart {
            warn!(
                "first group on {} was not opened by a run start (reason {})",
                record.channel,
                record.open_reason.code()
            );
            ledger.record(
                Position::Record(position),
                ErrorDetail::event(
                    ErrorKind::FirstGroupOpenInvalid,
                    Some(record.open_reason.code()),
                    Some(record.channel),
                ),
            );
        }

        if let Some(delta) = observation.gap {
            warn!(
                "sequence jump on {} at record {}: {} after {}",
                record.channel,
                position,
                record.sequence,
                i64::from(record.sequence) - delta
            );
            ledger.record(
                Position::Record(position),
                ErrorDetail::event(ErrorKind::SequenceGap, Some(delta), Some(record.channel)),
            );
        }

        if let Some(size) = observation.closed_group {
            self.histograms[index].record(size);
        }
    }

    fn finalize(
        &mut self,
        source: &mut dyn RecordSource<Record = EventRecord>,
        ledger: &mut Ledger,
    ) -> Result<(), AuditError> {
        for channel in Channel::ALL {
            let index = channel.index();
            // a channel never touched gets no findings at all
            let Some(last_position) = self.trackers[index].last_position() else {
                continue;
            };

            for span in self.trackers[index].dropped_spans() {
                warn!(
                    "{} group(s) dropped on {} before sequence {}",
                    span.missing, channel, span.before_seq
                );
                ledger.record(
                    Position::Unattributed,
                    ErrorDetail::event(
                        ErrorKind::GroupDropped,
                        Some(span.missing as i64),
                        Some(channel),
                    ),
                );
            }

            if let Some(size) = self.trackers[index].take_open_group() {
                self.histograms[index].record(size);
            }

            let record = source.fetch(last_position)?;
            if record.close_reason == GroupCloseReason::Full {
                info!("last group on {} closed because it was full", channel);
                ledger.record(
                    Position::Record(last_position),
                    ErrorDetail::event(ErrorKind::LastGroupFull, None, Some(channel)),
                );
            } else if record.close_action != GroupCloseAction::RunStop {
                warn!(
                    "last group on {} was not closed by a run stop (action {})",
                    channel,
                    record.close_action.code()
                );
                ledger.record(
                    Position::Record(last_position),
                    ErrorDetail::event(
                        ErrorKind::LastGroupCloseInvalid,
                        Some(record.close_action.code()),
                        Some(channel),
                    ),
                );
            }
        }
        Ok(())
    }
}

/// Interval-mode analyzer: physical plausibility rules, no cross-record
/// state and no finalization pass.
#[derive(Debug, Default)]
pub struct IntervalAnalyzer;

impl IntervalAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for IntervalAnalyzer {
    type Record = IntervalRecord;

    fn observe(&mut self, position: usize, record: &IntervalRecord, ledger: &mut Ledger) {
        if record.livetime < 0.0 {
            warn!("negative livetime {} at row {}", record.livetime, position);
            ledger.record(
                Position::Record(position),
                ErrorDetail::interval(
                    ErrorKind::NegativeLivetime,
                    record.livetime,
                    record.start,
                    record.stop,
                ),
            );
        }
        if record.livetime > record.elapsed() {
            warn!(
                "livetime {} exceeds elapsed interval {} at row {}",
                record.livetime,
                record.elapsed(),
                position
            );
            ledger.record(
                Position::Record(position),
                ErrorDetail::interval(
                    ErrorKind::LivetimeExceedsInterval,
                    record.livetime,
                    record.start,
                    record.stop,
                ),
            );
        }
    }

    fn finalize(
        &mut self,
        _source: &mut dyn RecordSource<Record = IntervalRecord>,
        _ledger: &mut Ledger,
    ) -> Result<(), AuditError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn event(channel: Channel, sequence: u32) -> EventRecord {
        EventRecord {
            channel,
            sequence,
            open_reason: GroupOpenReason::RunStart,
            close_action: GroupCloseAction::RunStop,
            close_reason: GroupCloseReason::RunStop,
        }
    }

    fn run_events(records: Vec<EventRecord>) -> (EventAnalyzer, Ledger) {
        let mut analyzer = EventAnalyzer::new();
        let mut ledger = Ledger::new();
        for (position, record) in records.iter().enumerate() {
            analyzer.observe(position, record, &mut ledger);
        }
        let mut source = MemorySource::new(records);
        analyzer.finalize(&mut source, &mut ledger).unwrap();
        (analyzer, ledger)
    }

    #[test]
    fn test_clean_stream_has_no_findings() {
        let records = (1..=4).map(|s| event(Channel::Dpu0, s)).collect();
        let (_, ledger) = run_events(records);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_dropped_groups_found_live_and_reconciled() {
        let records = [1, 2, 5, 6]
            .iter()
            .map(|&s| event(Channel::Dpu1, s))
            .collect();
        let (_, ledger) = run_events(records);
        assert_eq!(ledger.kind_count(ErrorKind::SequenceGap), 1);
        assert_eq!(ledger.kind_count(ErrorKind::GroupDropped), 1);
        assert_eq!(
            ledger.kind_positions(ErrorKind::GroupDropped),
            &[Position::Unattributed]
        );
        // missing identifiers 3 and 4
        let details = ledger.details_at(Position::Unattributed);
        assert!(matches!(
            details[0],
            ErrorDetail::Event {
                kind: ErrorKind::GroupDropped,
                value: Some(2),
                channel: Some(Channel::Dpu1),
            }
        ));
    }

    #[test]
    fn test_reordering_reconciles_to_no_loss() {
        let records = [1, 3, 2, 4]
            .iter()
            .map(|&s| event(Channel::Dpu2, s))
            .collect();
        let (_, ledger) = run_events(records);
        assert!(ledger.kind_count(ErrorKind::SequenceGap) > 0);
        assert_eq!(ledger.kind_count(ErrorKind::GroupDropped), 0);
    }

    #[test]
    fn test_first_group_open_reason_checked_per_channel() {
        let mut bad_open = event(Channel::Aux0, 1);
        bad_open.open_reason = GroupOpenReason::BufferCycle;
        let records = vec![bad_open, event(Channel::Aux0, 2), event(Channel::Aux1, 1)];
        let (_, ledger) = run_events(records);
        assert_eq!(ledger.kind_count(ErrorKind::FirstGroupOpenInvalid), 1);
        assert_eq!(
            ledger.kind_positions(ErrorKind::FirstGroupOpenInvalid),
            &[Position::Record(0)]
        );
    }

    #[test]
    fn test_full_close_reason_suppresses_close_invalid() {
        let mut last = event(Channel::Dpu0, 2);
        last.close_action = GroupCloseAction::Abort;
        last.close_reason = GroupCloseReason::Full;
        let records = vec![event(Channel::Dpu0, 1), last];
        let (_, ledger) = run_events(records);
        assert_eq!(ledger.kind_count(ErrorKind::LastGroupFull), 1);
        assert_eq!(ledger.kind_count(ErrorKind::LastGroupCloseInvalid), 0);
        assert_eq!(
            ledger.kind_positions(ErrorKind::LastGroupFull),
            &[Position::Record(1)]
        );
    }

    #[test]
    fn test_unexpected_close_action_flagged() {
        let mut last = event(Channel::Dpu0, 2);
        last.close_action = GroupCloseAction::Timeout;
        let records = vec![event(Channel::Dpu0, 1), last];
        let (_, ledger) = run_events(records);
        assert_eq!(ledger.kind_count(ErrorKind::LastGroupCloseInvalid), 1);
        let details = ledger.details_at(Position::Record(1));
        assert!(matches!(
            details[0],
            ErrorDetail::Event {
                kind: ErrorKind::LastGroupCloseInvalid,
                value: Some(2),
                ..
            }
        ));
    }

    #[test]
    fn test_untouched_channels_are_skipped() {
        let records = vec![event(Channel::Dpu0, 1)];
        let (analyzer, ledger) = run_events(records);
        assert!(ledger.is_empty());
        assert_eq!(analyzer.tracker(Channel::Aux1).records_seen(), 0);
    }

    #[test]
    fn test_group_size_histogram_fills() {
        let records = [1, 1, 1, 2, 2].iter().map(|&s| event(Channel::Dpu0, s)).collect();
        let (analyzer, _) = run_events(records);
        let (_, histogram) = analyzer
            .histograms()
            .find(|(channel, _)| *channel == Channel::Dpu0)
            .unwrap();
        // one group of three records, one residual group of two
        assert_eq!(histogram.entries(), 2);
    }

    #[test]
    fn test_negative_livetime_rule() {
        let mut analyzer = IntervalAnalyzer::new();
        let mut ledger = Ledger::new();
        let record = IntervalRecord {
            start: 0.0,
            stop: 10.0,
            livetime: -5.0,
        };
        analyzer.observe(0, &record, &mut ledger);
        assert_eq!(ledger.kind_count(ErrorKind::NegativeLivetime), 1);
        assert_eq!(ledger.kind_count(ErrorKind::LivetimeExceedsInterval), 0);
    }

    #[test]
    fn test_unphysical_livetime_rule() {
        let mut analyzer = IntervalAnalyzer::new();
        let mut ledger = Ledger::new();
        let record = IntervalRecord {
            start: 0.0,
            stop: 10.0,
            livetime: 12.0,
        };
        analyzer.observe(0, &record, &mut ledger);
        assert_eq!(ledger.kind_count(ErrorKind::NegativeLivetime), 0);
        assert_eq!(ledger.kind_count(ErrorKind::LivetimeExceedsInterval), 1);
    }

    #[test]
    fn test_both_interval_rules_can_fire_on_one_row() {
        let mut analyzer = IntervalAnalyzer::new();
        let mut ledger = Ledger::new();
        // stop before start: elapsed is negative, livetime is negative too
        let record = IntervalRecord {
            start: 10.0,
            stop: 0.0,
            livetime: -1.0,
        };
        analyzer.observe(0, &record, &mut ledger);
        assert_eq!(ledger.details_at(Position::Record(0)).len(), 2);
    }
}
