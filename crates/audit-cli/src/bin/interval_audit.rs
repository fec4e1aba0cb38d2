//! Interval Stream Audit Entry Point

use anyhow::{Context, Result};
use audit_cli::init_logging;
use audit_engine::{IntervalAnalyzer, ReportBuilder, ReportConfig, StreamValidator};
use clap::Parser;
use record_cursor::JsonlIntervalSource;
use report_writer::ReportDocument;
use std::path::PathBuf;
use tracing::info;

/// Audit an interval record stream for physically impossible field values
#[derive(Parser, Debug)]
#[command(name = "interval-audit")]
#[command(about = "Audit an interval record stream and write an XML error report")]
struct Cli {
    /// Input record file (JSON Lines, one interval record per line)
    input: PathBuf,

    /// Output XML report path
    output: PathBuf,

    /// Per-kind occurrence limit for report rows
    #[arg(long, default_value_t = 500)]
    truncation_limit: usize,

    /// Optional JSON copy of the report
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    info!("interval-audit v{}", env!("CARGO_PKG_VERSION"));
    let mut source = JsonlIntervalSource::open(&cli.input)
        .with_context(|| format!("opening record file {}", cli.input.display()))?;

    let mut validator = StreamValidator::new(IntervalAnalyzer::new());
    validator.run(&mut source).context("audit run failed")?;

    let report = ReportBuilder::interval(ReportConfig {
        truncation_limit: cli.truncation_limit,
    })
    .build(validator.ledger(), validator.records_processed());

    ReportDocument::new(&report)
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
