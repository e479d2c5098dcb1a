//! woofd — the woof heartbeat monitor daemon.
//!
//! Loads the configuration, resumes each watch from the status file (if
//! one is configured), serves kick endpoints and the status page, and
//! writes a status snapshot on SIGHUP and at shutdown.
//!
//! # Usage
//!
//! ```text
//! woofd /etc/woof/woof.toml
//! woofd config.json --listen 0.0.0.0:8080 --log-format json
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

mod daemon;

const DEFAULT_LOG_FILTER: &str = "info,woofd=debug,woof_watch=debug";

#[derive(Parser)]
#[command(name = "woofd", about = "woof heartbeat monitor daemon", version)]
struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension).
    #[arg(default_value = "config.json")]
    config: PathBuf,

    /// Listen address, overriding the configuration file.
    #[arg(long)]
    listen: Option<String>,

    /// Log output format.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }

    daemon::run(&cli.config, cli.listen).await
}
