//! `countfire report` command handler

use std::io::Write;

use serde::Serialize;

use countfire_core::config::CountfireConfig;
use countfire_engine::{CounterReport, ScanStats, TallyPipeline};

use crate::cli::ReportArgs;
use crate::commands::{ingest_input, input_label, write_counters};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `report` command.
pub fn execute(
    args: ReportArgs,
    config: &CountfireConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = build_report(&args, config)?;
    writer.render(&report)
}

/// Count the input and collect the per-node counters. No rule is evaluated.
pub fn build_report(args: &ReportArgs, config: &CountfireConfig) -> Result<CountReport, CliError> {
    let mut pipeline = TallyPipeline::from_config(config)?;
    let stats = ingest_input(&mut pipeline, args.input.as_deref())?;

    Ok(CountReport {
        source: input_label(args.input.as_deref()),
        stats,
        counters: pipeline.report(),
    })
}

/// Counter report for one input.
#[derive(Serialize)]
pub struct CountReport {
    /// Input file path or `<stdin>`
    pub source: String,
    /// Line statistics
    pub stats: ScanStats,
    /// Per counting node, depth-first
    pub counters: Vec<CounterReport>,
}

impl Render for CountReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        write_counters(w, &self.source, &self.stats, &self.counters)
    }
}
