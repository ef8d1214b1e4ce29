//! `countfire run` command handler
//!
//! Rule wiring is checked against unprepared actions first, then actions
//! are prepared (skipped with `--dry-run`), all before any input is read.
//! Rules are evaluated once, against the final counters.

use std::io::Write;

use serde::Serialize;
use tracing::info;

use countfire_core::config::CountfireConfig;
use countfire_engine::{
    ActionRegistry, CounterReport, FiredKey, RuleBinding, ScanStats, TallyPipeline,
};

use crate::cli::RunArgs;
use crate::commands::{ingest_input, input_label, unprepared_bindings, write_counters};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
pub fn execute(args: RunArgs, config: &CountfireConfig, writer: &OutputWriter) -> Result<(), CliError> {
    let report = build_report(&args, config)?;
    writer.render(&report)
}

/// Count the input, then fire (or dry-run) every configured rule.
pub fn build_report(args: &RunArgs, config: &CountfireConfig) -> Result<RunReport, CliError> {
    let mut pipeline = TallyPipeline::from_config(config)?;

    let unprepared = unprepared_bindings(&pipeline, config)?;

    let bindings = if args.dry_run {
        unprepared
    } else {
        let registry = ActionRegistry::prepare_for_rules(config)?;
        RuleBinding::all_from_config(&config.rules, &registry)?
    };

    let stats = ingest_input(&mut pipeline, args.input.as_deref())?;

    let summary = if args.dry_run {
        pipeline.dry_run(&bindings)?
    } else {
        pipeline.fire(&bindings)?
    };
    info!(
        fired = summary.fired.len(),
        dry_run = args.dry_run,
        "rule evaluation complete"
    );

    Ok(RunReport {
        source: input_label(args.input.as_deref()),
        stats,
        counters: pipeline.report(),
        dry_run: args.dry_run,
        fired: summary.fired,
    })
}

/// Result of one `run`.
#[derive(Serialize)]
pub struct RunReport {
    /// Input file path or `<stdin>`
    pub source: String,
    /// Line statistics
    pub stats: ScanStats,
    /// Per counting node, depth-first
    pub counters: Vec<CounterReport>,
    /// Whether actions were skipped
    pub dry_run: bool,
    /// Keys that fired (or would fire)
    pub fired: Vec<FiredKey>,
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        write_counters(w, &self.source, &self.stats, &self.counters)?;
        writeln!(w)?;

        let heading = if self.dry_run {
            "Would fire (dry run):".yellow().bold()
        } else {
            "Fired:".green().bold()
        };

        if self.fired.is_empty() {
            writeln!(w, "{} {}", heading, "none".dimmed())?;
            return Ok(());
        }

        writeln!(w, "{} {}", heading, self.fired.len())?;
        writeln!(
            w,
            "  {:<20} {:<12} {:<16} {:>8}  {}",
            "RULE", "COUNTER", "ACTION", "COUNT", "KEY"
        )?;
        for fired in &self.fired {
            writeln!(
                w,
                "  {:<20} {:<12} {:<16} {:>8}  {}",
                fired.rule, fired.counter, fired.action, fired.count, fired.key
            )?;
        }

        Ok(())
    }
}
