//! taskprobe CLI entry point.

use anyhow::Context;
use clap::Parser;

use taskprobe::cli::{self, Cli};
use taskprobe::infrastructure::config::ConfigLoader;
use taskprobe::infrastructure::logging::{LoggerImpl, SecretScrubber};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    let loaded = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match loaded.context("Failed to load configuration") {
        Ok(config) => config,
        Err(err) => cli::handle_error(&err, json, &SecretScrubber::new()),
    };

    let mut scrubber = SecretScrubber::new();
    if let Some(token) = &config.api.auth_token {
        scrubber = scrubber.with_secret(token.clone());
    }

    let logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => cli::handle_error(&err, json, &scrubber),
    };

    if let Err(err) = cli::commands::execute(cli.command, &config, &scrubber, json).await {
        // Flush file logs before exiting
        drop(logger);
        cli::handle_error(&err, json, &scrubber);
    }
}
