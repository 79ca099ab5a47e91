use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::{Command, Config};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let config = Config::load();

    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match config.command {
        Command::Summary { file, json } => commands::summary(&file, json).await,
        Command::Report { file, format } => commands::report(&file, format).await,
        Command::Validate { file } => commands::validate_file(&file).await,
        Command::Translate {
            file,
            vertex,
            fragment,
        } => commands::translate(&file, vertex, fragment).await,
        Command::Compose {
            manifest,
            target,
            strategy,
            summary,
        } => commands::compose(&manifest, target, strategy, summary).await,
    }
}
