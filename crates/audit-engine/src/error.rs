//! Audit Run Errors

use crate::source::SourceError;
use thiserror::Error;

/// Setup failures that abort a run.
///
/// Data-quality findings are never errors at this level: they are recorded
/// in the ledger and processing continues.
#[derive(Debug, Error)]
pub enum AuditError {
    /// The source opened but yielded zero records
    #[error("record source yielded no records")]
    EmptySource,

    /// The source failed while reading or re-reading a record
    #[error("record source failed: {0}")]
    Source(#[from] SourceError),
}
