//! Measurement Stream Audit Engine
//!
//! Offline data-quality gate for ordered streams of measurement records.
//! Detects missing, duplicated, or out-of-order sequence identifiers,
//! physically impossible field combinations, and improper stream boundary
//! conditions, and aggregates everything into an error ledger that the
//! report builder renders as a bounded summary.
//!
//! The engine runs entirely in memory against any [`RecordSource`]; file
//! formats and report rendering live in collaborator crates.

mod analyzer;
mod error;
mod ledger;
mod record;
mod report;
mod source;
mod stats;
mod tracker;
mod validator;

pub use analyzer::{Analyzer, EventAnalyzer, IntervalAnalyzer};
pub use error::AuditError;
pub use ledger::{ErrorDetail, ErrorKind, Ledger};
pub use record::{
    Channel, EventRecord, GroupCloseAction, GroupCloseReason, GroupOpenReason, IntervalRecord,
    Position,
};
pub use report::{KindSummary, PositionRow, Report, ReportBuilder, ReportConfig, ReportMode};
pub use source::{MemorySource, RecordSource, SourceError};
pub use stats::{Histogram, HistogramConfig};
pub use tracker::{DroppedSpan, Observation, SequenceTracker};
pub use validator::StreamValidator;
