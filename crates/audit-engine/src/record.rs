//! Record Model for Audited Streams

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical acquisition channel carrying an independently numbered sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Dpu0,
    Dpu1,
    Dpu2,
    Aux0,
    Aux1,
}

impl Channel {
    /// All channels, in index order
    pub const ALL: [Channel; 5] = [
        Channel::Dpu0,
        Channel::Dpu1,
        Channel::Dpu2,
        Channel::Aux0,
        Channel::Aux1,
    ];

    /// Stable index in 0..5
    pub fn index(self) -> usize {
        match self {
            Channel::Dpu0 => 0,
            Channel::Dpu1 => 1,
            Channel::Dpu2 => 2,
            Channel::Aux0 => 3,
            Channel::Aux1 => 4,
        }
    }

    /// Stable display name
    pub fn name(self) -> &'static str {
        match self {
            Channel::Dpu0 => "Dpu0",
            Channel::Dpu1 => "Dpu1",
            Channel::Dpu2 => "Dpu2",
            Channel::Aux0 => "Aux0",
            Channel::Aux1 => "Aux1",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a group was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOpenReason {
    /// Opened because the run started (the expected reason for a first group)
    RunStart,
    /// Opened as the continuation of a closed predecessor
    Continuation,
    /// Opened after a buffer cycle
    BufferCycle,
}

impl GroupOpenReason {
    /// Numeric wire code used in reports
    pub fn code(self) -> i64 {
        match self {
            GroupOpenReason::RunStart => 0,
            GroupOpenReason::Continuation => 1,
            GroupOpenReason::BufferCycle => 2,
        }
    }
}

/// How a group was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupCloseAction {
    /// Closed because the run stopped (the expected action for a last group)
    RunStop,
    /// Closed by an abort
    Abort,
    /// Closed by a timeout
    Timeout,
}

impl GroupCloseAction {
    /// Numeric wire code used in reports
    pub fn code(self) -> i64 {
        match self {
            GroupCloseAction::RunStop => 0,
            GroupCloseAction::Abort => 1,
            GroupCloseAction::Timeout => 2,
        }
    }
}

/// Why a group was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupCloseReason {
    /// Closed because the run stopped
    RunStop,
    /// Closed because the group filled up
    Full,
    /// Closed by a timeout
    Timeout,
}

impl GroupCloseReason {
    /// Numeric wire code used in reports
    pub fn code(self) -> i64 {
        match self {
            GroupCloseReason::RunStop => 0,
            GroupCloseReason::Full => 1,
            GroupCloseReason::Timeout => 2,
        }
    }
}

/// Event-oriented record: one measurement event with its group bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub channel: Channel,
    pub sequence: u32,
    pub open_reason: GroupOpenReason,
    pub close_action: GroupCloseAction,
    pub close_reason: GroupCloseReason,
}

/// Row-oriented record: one accumulation interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalRecord {
    pub start: f64,
    pub stop: f64,
    pub livetime: f64,
}

impl IntervalRecord {
    /// Elapsed wall time of the interval
    pub fn elapsed(&self) -> f64 {
        self.stop - self.start
    }
}

/// Position of a finding within one run.
///
/// `Unattributed` is the sentinel for findings not tied to a single record
/// (reconciled gaps spanning multiple records); it sorts before all record
/// positions so it forms its own leading bucket in position-ordered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    Unattributed,
    Record(usize),
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Unattributed => f.write_str("unattributed"),
            Position::Record(index) => write!(f, "{}", index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_indexes_are_stable() {
        for (i, channel) in Channel::ALL.iter().enumerate() {
            assert_eq!(channel.index(), i);
        }
    }

    #[test]
    fn test_sentinel_position_sorts_first() {
        let mut positions = vec![
            Position::Record(7),
            Position::Unattributed,
            Position::Record(0),
        ];
        positions.sort();
        assert_eq!(positions[0], Position::Unattributed);
        assert_eq!(positions[1], Position::Record(0));
    }

    #[test]
    fn test_interval_elapsed() {
        let record = IntervalRecord {
            start: 100.0,
            stop: 130.0,
            livetime: 25.0,
        };
        assert!((record.elapsed() - 30.0).abs() < f64::EPSILON);
    }
}
