use clap::Parser;
use tracing_subscriber::EnvFilter;

use quill::commands;
use quill::config::{Cli, Config};
use quill::error::AppError;

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = Config::load(&cli).map_err(|e| AppError::Internal(e.to_string()))?;
    commands::dispatch(cli.command, &config).await
}
