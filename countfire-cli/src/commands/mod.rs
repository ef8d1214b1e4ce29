//! Command handlers -- one module per subcommand

pub mod config;
pub mod report;
pub mod run;

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use countfire_core::config::CountfireConfig;
use countfire_engine::{ActionRegistry, CounterReport, RuleBinding, ScanStats, TallyPipeline};

use crate::error::CliError;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "countfire.toml";

/// Label used for reports when no config file was found.
pub const DEFAULTS_LABEL: &str = "(built-in defaults)";

/// Label used for reports when reading stdin.
pub const STDIN_LABEL: &str = "<stdin>";

/// Resolve which config file to load.
///
/// An explicit path is always used (and must exist). Without one,
/// `./countfire.toml` is used only if present.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            default.exists().then_some(default)
        }
    }
}

/// Human-readable label for the config source.
pub fn config_label(path: Option<&Path>) -> String {
    path.map_or_else(|| DEFAULTS_LABEL.to_owned(), |p| p.display().to_string())
}

/// Load the configuration from `path`, or fall back to defaults + env overrides.
pub fn load_config(path: Option<&Path>) -> Result<CountfireConfig, CliError> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            Ok(CountfireConfig::load(path)?)
        }
        None => {
            let mut config = CountfireConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Bind every rule to an unprepared action and check its counters exist.
///
/// Catches unknown action kinds, operators and counter names without
/// acquiring any action resource. The returned bindings can be dry-run
/// but not fired.
pub fn unprepared_bindings(
    pipeline: &TallyPipeline,
    config: &CountfireConfig,
) -> Result<Vec<RuleBinding>, CliError> {
    let registry = ActionRegistry::unprepared_for_rules(config)?;
    let bindings = RuleBinding::all_from_config(&config.rules, &registry)?;
    pipeline.check_bindings(&bindings)?;
    Ok(bindings)
}

/// Human-readable label for the input source.
pub fn input_label(input: Option<&Path>) -> String {
    input.map_or_else(|| STDIN_LABEL.to_owned(), |p| p.display().to_string())
}

/// Feed every line of `input` (or stdin) through the pipeline.
pub fn ingest_input(
    pipeline: &mut TallyPipeline,
    input: Option<&Path>,
) -> Result<ScanStats, CliError> {
    let stats = match input {
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::Input {
                path: path.to_path_buf(),
                source,
            })?;
            pipeline.ingest_reader(BufReader::new(file))?
        }
        None => pipeline.ingest_reader(std::io::stdin().lock())?,
    };
    Ok(stats)
}

/// Shared text rendering for scan statistics and per-node counters.
pub(crate) fn write_counters(
    w: &mut dyn Write,
    source: &str,
    stats: &ScanStats,
    counters: &[CounterReport],
) -> std::io::Result<()> {
    use colored::Colorize;

    writeln!(w, "Input: {}", source.bold())?;
    writeln!(
        w,
        "  Lines: {} read, {} matched, {} unmatched",
        stats.lines_read, stats.lines_matched, stats.lines_unmatched
    )?;

    if counters.is_empty() {
        writeln!(w)?;
        writeln!(w, "No counting nodes in the parser tree.")?;
        return Ok(());
    }

    for counter in counters {
        writeln!(w)?;
        writeln!(
            w,
            "[{}] {} keys, {} total",
            counter.node.cyan().bold(),
            counter.distinct_keys,
            counter.total
        )?;
        if counter.entries.is_empty() {
            writeln!(w, "  (no matches)")?;
            continue;
        }
        writeln!(w, "  {:>8}  {}", "COUNT", "KEY")?;
        for entry in &counter.entries {
            writeln!(w, "  {:>8}  {}", entry.count, entry.key)?;
        }
    }

    Ok(())
}
