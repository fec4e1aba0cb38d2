//! Event Stream Audit Entry Point

use anyhow::{Context, Result};
use audit_cli::init_logging;
use audit_engine::{
    EventAnalyzer, HistogramConfig, ReportBuilder, ReportConfig, StreamValidator,
};
use clap::Parser;
use record_cursor::JsonlEventSource;
use report_writer::ReportDocument;
use std::path::PathBuf;
use tracing::info;

/// Audit an event-oriented record stream for sequence and boundary anomalies
#[derive(Parser, Debug)]
#[command(name = "event-audit")]
#[command(about = "Audit an event record stream and write an XML error report")]
struct Cli {
    /// Input record file (JSON Lines, one event record per line)
    input: PathBuf,

    /// Output XML report path
    output: PathBuf,

    /// Per-kind occurrence limit and position-row cap in the report
    #[arg(long, default_value_t = 500)]
    truncation_limit: usize,

    /// Number of bins in the records-per-group histograms
    #[arg(long, default_value_t = 100)]
    histogram_bins: usize,

    /// Optional JSON copy of the report
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    info!("event-audit v{}", env!("CARGO_PKG_VERSION"));
    let mut source = JsonlEventSource::open(&cli.input)
        .with_context(|| format!("opening record file {}", cli.input.display()))?;

    let analyzer = EventAnalyzer::with_histogram(HistogramConfig {
        bins: cli.histogram_bins,
        ..HistogramConfig::default()
    });
    let mut validator = StreamValidator::new(analyzer);
    validator.run(&mut source).context("audit run failed")?;

    let report = ReportBuilder::event(ReportConfig {
        truncation_limit: cli.truncation_limit,
    })
    .build(validator.ledger(), validator.records_processed());

    ReportDocument::new(&report)
        .with_group_sizes(validator.analyzer().histograms())
        .write_to(&cli.output)
        .with_context(|| format!("writing report to {}", cli.output.display()))?;

    if let Some(json_path) = &cli.json {
        let json = serde_json::to_string_pretty(&report).context("serializing report")?;
        std::fs::write(json_path, json)
            .with_context(|| format!("writing report to {}", json_path.display()))?;
    }

    info!("report written to {}", cli.output.display());
    Ok(())
}
