//! Audit Report Rendering
//!
//! Renders a [`Report`] as a hierarchical XML document: an error summary
//! keyed by kind, a position summary (`eventSummary` or `rowSummary`
//! depending on the audit mode), and, for event mode, the per-channel
//! records-per-group statistics.

mod xml;

pub use xml::XmlElement;

use audit_engine::{Channel, ErrorDetail, Histogram, Position, Report, ReportMode};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors while writing a rendered report
#[derive(Debug, Error)]
pub enum ReportWriteError {
    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// One report plus optional ancillary statistics, ready to render
pub struct ReportDocument<'a> {
    report: &'a Report,
    group_sizes: Vec<(Channel, &'a Histogram)>,
}

impl<'a> ReportDocument<'a> {
    pub fn new(report: &'a Report) -> Self {
        Self {
            report,
            group_sizes: Vec::new(),
        }
    }

    /// Attach per-channel group-size histograms (event mode)
    pub fn with_group_sizes(
        mut self,
        histograms: impl IntoIterator<Item = (Channel, &'a Histogram)>,
    ) -> Self {
        self.group_sizes = histograms.into_iter().collect();
        self
    }

    /// Render the full XML document
    pub fn render(&self) -> String {
        let mut root = XmlElement::new("auditReport");
        root.child(error_summary(self.report));
        root.child(position_summary(self.report));
        if !self.group_sizes.is_empty() {
            root.child(group_size_summary(&self.group_sizes));
        }
        root.render_document()
    }

    /// Render and write to a file
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), ReportWriteError> {
        fs::write(path, self.render())?;
        Ok(())
    }
}

fn error_summary(report: &Report) -> XmlElement {
    let mut summary = XmlElement::new("errorSummary");
    for row in &report.error_summary {
        let mut kind = XmlElement::new("errorType");
        kind.attr("code", row.kind.code());
        kind.attr("quantity", row.count);
        kind.attr("truncated", row.truncated);
        summary.child(kind);
    }
    summary
}

fn position_summary(report: &Report) -> XmlElement {
    let (summary_name, row_name, position_name, sentinel) = match report.mode {
        ReportMode::Event => ("eventSummary", "errorEvent", "eventNumber", "noEvt"),
        ReportMode::Interval => ("rowSummary", "errorRow", "rowNumber", "noRow"),
    };

    let mut summary = XmlElement::new(summary_name);
    summary.attr("processedRecords", report.records_processed);
    summary.attr("errorPositions", report.positions_with_errors);
    summary.attr("truncated", report.truncated);

    for position_row in &report.positions {
        let mut row = XmlElement::new(row_name);
        match position_row.position {
            Position::Record(index) => row.attr(position_name, index),
            Position::Unattributed => row.attr(position_name, sentinel),
        };
        for detail in &position_row.details {
            row.child(detail_element(detail));
        }
        summary.child(row);
    }
    summary
}

fn detail_element(detail: &ErrorDetail) -> XmlElement {
    let mut element = XmlElement::new("error");
    match detail {
        ErrorDetail::Event {
            kind,
            value,
            channel,
        } => {
            element.attr("code", kind.code());
            if let Some(value) = value {
                element.attr("value", value);
            }
            if let Some(channel) = channel {
                element.attr("channel", channel.name());
            }
        }
        ErrorDetail::Interval {
            kind,
            livetime,
            tstart,
            tstop,
        } => {
            element.attr("code", kind.code());
            element.attr("livetime", livetime);
            element.attr("tstart", tstart);
            element.attr("tstop", tstop);
        }
    }
    element
}

fn group_size_summary(histograms: &[(Channel, &Histogram)]) -> XmlElement {
    let mut summary = XmlElement::new("groupSizes");
    for (channel, histogram) in histograms {
        let mut channel_element = XmlElement::new("channel");
        channel_element.attr("name", channel.name());
        channel_element.attr("entries", histogram.entries());
        if histogram.overflow() > 0 {
            channel_element.attr("overflow", histogram.overflow());
        }
        for (lo, hi, count) in histogram.nonzero_bins() {
            let mut bin = XmlElement::new("bin");
            bin.attr("lo", lo);
            bin.attr("hi", hi);
            bin.attr("count", count);
            channel_element.child(bin);
        }
        summary.child(channel_element);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit_engine::{ErrorKind, Ledger, ReportBuilder, ReportConfig};

    fn interval_report() -> Report {
        let mut ledger = Ledger::new();
        ledger.record(
            Position::Record(3),
            ErrorDetail::interval(ErrorKind::NegativeLivetime, -5.0, 0.0, 10.0),
        );
        ReportBuilder::interval(ReportConfig::default()).build(&ledger, 20)
    }

    #[test]
    fn test_interval_document_shape() {
        let report = interval_report();
        let rendered = ReportDocument::new(&report).render();

        assert!(rendered.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(rendered.contains("<auditReport>"));
        assert!(rendered.contains(
            "<errorType code=\"NEGATIVE_LIVETIME\" quantity=\"1\" truncated=\"false\"/>"
        ));
        assert!(rendered
            .contains("<rowSummary processedRecords=\"20\" errorPositions=\"1\" truncated=\"false\">"));
        assert!(rendered.contains("<errorRow rowNumber=\"3\">"));
        assert!(rendered.contains(
            "<error code=\"NEGATIVE_LIVETIME\" livetime=\"-5\" tstart=\"0\" tstop=\"10\"/>"
        ));
    }

    #[test]
    fn test_event_document_uses_event_vocabulary() {
        let mut ledger = Ledger::new();
        ledger.record(
            Position::Record(7),
            ErrorDetail::event(ErrorKind::SequenceGap, Some(3), Some(Channel::Dpu1)),
        );
        ledger.record(
            Position::Unattributed,
            ErrorDetail::event(ErrorKind::GroupDropped, Some(2), Some(Channel::Dpu1)),
        );
        let report = ReportBuilder::event(ReportConfig::default()).build(&ledger, 100);
        let rendered = ReportDocument::new(&report).render();

        assert!(rendered.contains("<eventSummary"));
        assert!(rendered.contains("<errorEvent eventNumber=\"noEvt\">"));
        assert!(rendered.contains("<errorEvent eventNumber=\"7\">"));
        assert!(rendered
            .contains("<error code=\"SEQUENCE_GAP\" value=\"3\" channel=\"Dpu1\"/>"));
    }

    #[test]
    fn test_group_sizes_rendered_when_attached() {
        let report = {
            let ledger = Ledger::new();
            ReportBuilder::event(ReportConfig::default()).build(&ledger, 10)
        };
        let mut histogram = Histogram::new(audit_engine::HistogramConfig::default());
        histogram.record(3);
        histogram.record(3);

        let rendered = ReportDocument::new(&report)
            .with_group_sizes([(Channel::Dpu0, &histogram)])
            .render();
        assert!(rendered.contains("<groupSizes>"));
        assert!(rendered.contains("<channel name=\"Dpu0\" entries=\"2\">"));
        assert!(rendered.contains("count=\"2\""));
    }

    #[test]
    fn test_write_to_file() {
        let report = interval_report();
        let dir = std::env::temp_dir().join("report-writer-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("report.xml");
        ReportDocument::new(&report).write_to(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("<auditReport>"));
        std::fs::remove_file(&path).unwrap();
    }
}
