use clap::Parser;
use colored::Colorize;
use tracing::info;

use countfire_cli::cli::{Cli, Commands};
use countfire_cli::commands;
use countfire_cli::error::CliError;
use countfire_cli::logging::init_tracing;
use countfire_cli::output::OutputWriter;
use countfire_core::config::{CountfireConfig, GeneralConfig};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{} {e}", "error:".red().bold());
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);
    let config_path = commands::resolve_config_path(cli.config.as_deref());

    match cli.command {
        Commands::Config(args) => {
            // 설정 자체가 검사 대상이므로 로깅은 기본값으로 초기화
            let mut general = GeneralConfig::default();
            if let Some(level) = cli.log_level {
                general.log_level = level;
            }
            init_logging(&general)?;
            commands::config::execute(args, config_path.as_deref(), &writer)
        }
        Commands::Run(args) => {
            let config = load(config_path.as_deref(), cli.log_level)?;
            commands::run::execute(args, &config, &writer)
        }
        Commands::Report(args) => {
            let config = load(config_path.as_deref(), cli.log_level)?;
            commands::report::execute(args, &config, &writer)
        }
    }
}

/// 설정 로드 후 `--log-level`을 적용하고 로깅을 초기화합니다.
fn load(
    config_path: Option<&std::path::Path>,
    log_level: Option<String>,
) -> Result<CountfireConfig, CliError> {
    let mut config = commands::load_config(config_path)?;
    if let Some(level) = log_level {
        config.general.log_level = level;
        config.validate()?;
    }

    init_logging(&config.general)?;
    info!(
        config = %commands::config_label(config_path),
        rules = config.rules.len(),
        "countfire starting"
    );
    Ok(config)
}

fn init_logging(general: &GeneralConfig) -> Result<(), CliError> {
    init_tracing(general).map_err(|e| CliError::Command(format!("{e:#}")))
}
