//! tracing subscriber setup. Logs go to stderr; stdout is reserved for reports.

use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use countfire_core::config::GeneralConfig;

/// Install the global subscriber. `RUST_LOG` wins over `config.log_level`.
pub fn init_tracing(config: &GeneralConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .with_context(|| format!("invalid log level '{}'", config.log_level))?;

    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.log_format.as_str() {
        "json" => registry.with(layer.json()).try_init(),
        "pretty" => registry.with(layer.pretty()).try_init(),
        other => bail!("unknown log format '{other}', expected 'json' or 'pretty'"),
    };
    installed.with_context(|| format!("failed to install {} log output", config.log_format))
}
