use clap::Parser;
use globrouter::cli::{run_cli, Cli};
use globrouter::logging::{init_logging, LogConfig};

fn main() -> anyhow::Result<()> {
    let mut config = LogConfig::from_env();
    if std::env::var("GLOBR_LOG_LEVEL").is_err() {
        config.log_level = "warn".to_string();
    }
    init_logging(&config)?;
    run_cli(Cli::parse())
}
