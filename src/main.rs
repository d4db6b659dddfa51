//! tablefetch CLI entry point.

use clap::Parser;
use std::process::ExitCode;

use tablefetch::cli::{commands, display, load_config, Cli, CliContext};
use tablefetch::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            display::report_error(&err, cli.json);
            return ExitCode::FAILURE;
        }
    };

    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => Some(logger),
        Err(err) => {
            eprintln!("warning: logging disabled: {err:#}");
            None
        }
    };

    let result = match CliContext::new(config).await {
        Ok(ctx) => commands::dispatch(&ctx, cli.command, cli.json).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            display::report_error(&err, cli.json);
            ExitCode::FAILURE
        }
    }
}
