//! Error Ledger
//!
//! Keyed accumulator over data-quality findings: every finding is indexed
//! both by its error kind and by the record position it was observed at.
//! Findings are only ever appended during a run.

use crate::record::{Channel, Position};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Kinds of data-quality findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Non-consecutive sequence jump seen in playback order
    SequenceGap,
    /// Groups genuinely missing after end-of-stream reconciliation
    GroupDropped,
    /// First group on a channel was not opened by a run start
    FirstGroupOpenInvalid,
    /// Last group on a channel was not closed by a run stop
    LastGroupCloseInvalid,
    /// Last group on a channel closed because it filled up
    LastGroupFull,
    /// Interval livetime is negative
    NegativeLivetime,
    /// Interval livetime exceeds the elapsed interval
    LivetimeExceedsInterval,
}

impl ErrorKind {
    /// Stable wire code used in reports
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::SequenceGap => "SEQUENCE_GAP",
            ErrorKind::GroupDropped => "GROUP_DROPPED",
            ErrorKind::FirstGroupOpenInvalid => "FIRST_GROUP_OPEN_INVALID",
            ErrorKind::LastGroupCloseInvalid => "LAST_GROUP_CLOSE_INVALID",
            ErrorKind::LastGroupFull => "LAST_GROUP_FULL",
            ErrorKind::NegativeLivetime => "NEGATIVE_LIVETIME",
            ErrorKind::LivetimeExceedsInterval => "LIVETIME_EXCEEDS_INTERVAL",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// One typed finding. Exactly one shape is active per analyzer mode.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorDetail {
    /// Event-mode finding: optional numeric value plus the channel it
    /// is attributed to
    Event {
        kind: ErrorKind,
        value: Option<i64>,
        channel: Option<Channel>,
    },
    /// Interval-mode finding: the offending interval fields
    Interval {
        kind: ErrorKind,
        livetime: f64,
        tstart: f64,
        tstop: f64,
    },
}

impl ErrorDetail {
    /// Event-mode constructor
    pub fn event(kind: ErrorKind, value: Option<i64>, channel: Option<Channel>) -> Self {
        ErrorDetail::Event {
            kind,
            value,
            channel,
        }
    }

    /// Interval-mode constructor
    pub fn interval(kind: ErrorKind, livetime: f64, tstart: f64, tstop: f64) -> Self {
        ErrorDetail::Interval {
            kind,
            livetime,
            tstart,
            tstop,
        }
    }

    /// The kind of this finding
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorDetail::Event { kind, .. } | ErrorDetail::Interval { kind, .. } => *kind,
        }
    }
}

/// Accumulator for findings, co-indexed by kind and by position.
///
/// Invariant: every recorded detail appears in exactly one `by_position`
/// entry, and each kind's occurrence list in `by_kind` has one position per
/// detail of that kind. Both indexes preserve insertion order within a key.
#[derive(Debug, Default)]
pub struct Ledger {
    by_kind: BTreeMap<ErrorKind, Vec<Position>>,
    by_position: BTreeMap<Position, Vec<ErrorDetail>>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finding at the given position
    pub fn record(&mut self, position: Position, detail: ErrorDetail) {
        self.by_kind.entry(detail.kind()).or_default().push(position);
        self.by_position.entry(position).or_default().push(detail);
    }

    /// Occurrence count for one kind
    pub fn kind_count(&self, kind: ErrorKind) -> usize {
        self.by_kind.get(&kind).map_or(0, Vec::len)
    }

    /// Positions recorded for one kind, in insertion order
    pub fn kind_positions(&self, kind: ErrorKind) -> &[Position] {
        self.by_kind.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// Distinct kinds with their occurrence positions
    pub fn kinds(&self) -> impl Iterator<Item = (ErrorKind, &[Position])> {
        self.by_kind
            .iter()
            .map(|(kind, positions)| (*kind, positions.as_slice()))
    }

    /// Positions with findings, ascending, sentinel bucket first
    pub fn positions(&self) -> impl Iterator<Item = (Position, &[ErrorDetail])> {
        self.by_position
            .iter()
            .map(|(position, details)| (*position, details.as_slice()))
    }

    /// Details recorded at one position, in insertion order
    pub fn details_at(&self, position: Position) -> &[ErrorDetail] {
        self.by_position.get(&position).map_or(&[], Vec::as_slice)
    }

    /// Number of distinct positions carrying findings
    pub fn positions_with_errors(&self) -> usize {
        self.by_position.len()
    }

    /// Total number of findings across all kinds
    pub fn total_findings(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.is_empty()
    }
}
