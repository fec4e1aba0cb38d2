//! Report Construction
//!
//! Converts ledger contents into a bounded, ordered snapshot. The two audit
//! modes truncate differently: event mode caps the number of position rows
//! outright, while interval mode suppresses rows per kind incrementally.
//! The policies are intentionally not unified.

use crate::ledger::{ErrorDetail, ErrorKind, Ledger};
use crate::record::Position;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which analyzer mode produced the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportMode {
    Event,
    Interval,
}

/// Report configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Per-kind occurrence limit and position-row cap
    pub truncation_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            truncation_limit: 500,
        }
    }
}

/// Summary row for one error kind
#[derive(Debug, Clone, Serialize)]
pub struct KindSummary {
    pub kind: ErrorKind,
    pub count: usize,
    pub truncated: bool,
}

/// All findings reported at one position
#[derive(Debug, Clone, Serialize)]
pub struct PositionRow {
    pub position: Position,
    pub details: Vec<ErrorDetail>,
}

/// Bounded, read-only snapshot of one run's findings
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub mode: ReportMode,
    pub records_processed: u64,
    pub positions_with_errors: usize,
    /// Whether the position listing below is incomplete
    pub truncated: bool,
    pub error_summary: Vec<KindSummary>,
    pub positions: Vec<PositionRow>,
}

/// Builds `Report` values from a populated ledger
pub struct ReportBuilder {
    mode: ReportMode,
    truncation_limit: usize,
}

impl ReportBuilder {
    pub fn new(mode: ReportMode, config: ReportConfig) -> Self {
        Self {
            mode,
            truncation_limit: config.truncation_limit,
        }
    }

    pub fn event(config: ReportConfig) -> Self {
        Self::new(ReportMode::Event, config)
    }

    pub fn interval(config: ReportConfig) -> Self {
        Self::new(ReportMode::Interval, config)
    }

    pub fn build(&self, ledger: &Ledger, records_processed: u64) -> Report {
        let error_summary: Vec<KindSummary> = ledger
            .kinds()
            .map(|(kind, positions)| KindSummary {
                kind,
                count: positions.len(),
                truncated: positions.len() > self.truncation_limit,
            })
            .collect();

        let (positions, truncated) = match self.mode {
            ReportMode::Event => self.capped_rows(ledger),
            ReportMode::Interval => self.per_kind_rows(ledger),
        };

        Report {
            mode: self.mode,
            records_processed,
            positions_with_errors: ledger.positions_with_errors(),
            truncated,
            error_summary,
            positions,
        }
    }

    /// Event mode: first N position rows in ascending position order,
    /// independent of which kinds occur there.
    fn capped_rows(&self, ledger: &Ledger) -> (Vec<PositionRow>, bool) {
        let rows = ledger
            .positions()
            .take(self.truncation_limit)
            .map(|(position, details)| PositionRow {
                position,
                details: details.to_vec(),
            })
            .collect();
        (rows, ledger.positions_with_errors() > self.truncation_limit)
    }

    /// Interval mode: walking rows in ascending position order, a row is
    /// emitted only while at least one of its kinds is still under the
    /// limit; emission counters advance only for emitted rows.
    fn per_kind_rows(&self, ledger: &Ledger) -> (Vec<PositionRow>, bool) {
        let mut emitted: BTreeMap<ErrorKind, usize> = BTreeMap::new();
        let mut rows = Vec::new();

        for (position, details) in ledger.positions() {
            let write_row = details
                .iter()
                .any(|d| emitted.get(&d.kind()).copied().unwrap_or(0) < self.truncation_limit);
            if !write_row {
                continue;
            }
            for detail in details {
                *emitted.entry(detail.kind()).or_insert(0) += 1;
            }
            rows.push(PositionRow {
                position,
                details: details.to_vec(),
            });
        }

        let truncated = ledger
            .kinds()
            .any(|(_, positions)| positions.len() > self.truncation_limit);
        (rows, truncated)
    }
}
