//! `countfire config` command handler

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use countfire_core::config::CountfireConfig;
use countfire_engine::TallyPipeline;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::commands::{config_label, load_config, unprepared_bindings};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Sections accepted by `config show --section`.
pub const SECTIONS: [&str; 4] = ["general", "parser", "rules", "actions"];

/// Execute the `config` command.
pub fn execute(
    args: ConfigArgs,
    config_path: Option<&Path>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer),
        ConfigAction::Show { section } => execute_show(config_path, section, writer),
    }
}

/// Execute the config validate subcommand.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails.
fn execute_validate(config_path: Option<&Path>, writer: &OutputWriter) -> Result<(), CliError> {
    let report = validate(config_path);
    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Load the configuration and check everything that can be checked
/// without touching action resources: field values, pattern compilation,
/// capture group counts, duplicate node names, action kinds, and
/// rule counters naming counting nodes.
pub fn validate(config_path: Option<&Path>) -> ConfigValidationReport {
    info!(source = %config_label(config_path), "validating configuration");

    let result = load_config(config_path).and_then(|config| check_wiring(&config));

    ConfigValidationReport {
        source: config_label(config_path),
        valid: result.is_ok(),
        errors: result.err().map(|e| vec![e.to_string()]).unwrap_or_default(),
    }
}

fn check_wiring(config: &CountfireConfig) -> Result<(), CliError> {
    let pipeline = TallyPipeline::from_config(config)?;
    unprepared_bindings(&pipeline, config)?;
    Ok(())
}

/// Execute the config show subcommand.
fn execute_show(
    config_path: Option<&Path>,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let config = load_config(config_path)?;
    let report = show(&config, config_label(config_path), section)?;
    writer.render(&report)
}

/// Build the effective configuration report, optionally limited to one section.
///
/// # Errors
///
/// Returns `CliError::Command` if the section name is unknown.
pub fn show(
    config: &CountfireConfig,
    source: String,
    section: Option<String>,
) -> Result<ConfigReport, CliError> {
    let full = toml::to_string_pretty(config)
        .map_err(|e| CliError::Command(format!("failed to serialize config: {e}")))?;

    let Some(section) = section else {
        return Ok(ConfigReport {
            source,
            section: None,
            config_toml: full,
        });
    };

    if !SECTIONS.contains(&section.as_str()) {
        return Err(CliError::Command(format!(
            "unknown section: {} (expected: {})",
            section,
            SECTIONS.join(", ")
        )));
    }

    let table: toml::Table = toml::from_str(&full)
        .map_err(|e| CliError::Command(format!("failed to re-read config: {e}")))?;

    let config_toml = match table.get(&section) {
        Some(value) => {
            let mut only = toml::Table::new();
            only.insert(section.clone(), value.clone());
            toml::to_string_pretty(&only)
                .map_err(|e| CliError::Command(format!("failed to serialize section: {e}")))?
        }
        None if section == "parser" => "# no [parser] section, amavis preset is used\n".to_owned(),
        None => format!("# [{section}] is empty\n"),
    };

    Ok(ConfigReport {
        source,
        section: Some(section),
        config_toml,
    })
}

/// Configuration display report.
///
/// The `config_toml` field is skipped during JSON serialization (only used for text rendering).
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Serialized TOML configuration
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}
