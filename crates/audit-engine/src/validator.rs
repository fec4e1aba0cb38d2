//! Stream Validator
//!
//! Drives the record cursor over one run: per-record rule dispatch in strict
//! source order, then the analyzer's end-of-stream pass. Single-threaded by
//! construction; sequence detection depends on processing order.

use crate::analyzer::Analyzer;
use crate::error::AuditError;
use crate::ledger::Ledger;
use crate::source::RecordSource;
use tracing::{debug, info};

/// Orchestrator for one audit run. Owns the analyzer and the ledger for the
/// run's duration; one `run` call per validator.
pub struct StreamValidator<A: Analyzer> {
    analyzer: A,
    ledger: Ledger,
    records_processed: u64,
}

impl<A: Analyzer> StreamValidator<A> {
    pub fn new(analyzer: A) -> Self {
        Self {
            analyzer,
            ledger: Ledger::new(),
            records_processed: 0,
        }
    }

    /// Consume every record exactly once, in source order, then run the
    /// analyzer's finalization pass.
    ///
    /// A source that yields zero records is a setup failure
    /// (`AuditError::EmptySource`), not a clean validation.
    pub fn run(
        &mut self,
        source: &mut dyn RecordSource<Record = A::Record>,
    ) -> Result<u64, AuditError> {
        let mut position = 0usize;
        while let Some(record) = source.next_record()? {
            if position % 10_000 == 0 {
                debug!("processing record {}", position);
            }
            self.analyzer.observe(position, &record, &mut self.ledger);
            position += 1;
        }

        if position == 0 {
            return Err(AuditError::EmptySource);
        }
        self.records_processed = position as u64;

        self.analyzer.finalize(source, &mut self.ledger)?;

        info!(
            "audit complete: {} records, {} findings at {} positions",
            self.records_processed,
            self.ledger.total_findings(),
            self.ledger.positions_with_errors()
        );
        Ok(self.records_processed)
    }

    /// The populated ledger
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Records consumed by `run`
    pub fn records_processed(&self) -> u64 {
        self.records_processed
    }

    /// The analyzer, for mode-specific post-run state (histograms, trackers)
    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }
}
