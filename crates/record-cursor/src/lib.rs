//! File-Backed Record Cursors
//!
//! Concrete record sources for the audit engine. Records are carried as
//! JSON Lines, one record per line; files are buffered fully into memory so
//! the finalization pass can re-read arbitrary positions.

mod jsonl;

pub use jsonl::{JsonlEventSource, JsonlIntervalSource, JsonlSource};
