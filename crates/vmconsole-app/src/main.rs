//! vmconsole: multiplexed remote consoles from the command line.

mod cli;
mod console;
mod renderer;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;
use vmconsole_common::ConfigError;
use vmconsole_config::schema::LoggingConfig;
use vmconsole_config::ConsoleConfig;
use vmconsole_mux::{ControlDispatcher, HttpControlClient, OpenRequest};

use crate::cli::{Args, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();

    let mut config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(token) = &args.token {
        config.proxy.token = token.clone();
    }

    init_logging(args.log_level.as_deref(), &config);
    tracing::debug!(proxy = ?config.proxy, "configuration loaded");

    match run(args.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "vmconsole failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(args: &Args) -> Result<ConsoleConfig, ConfigError> {
    match &args.config {
        Some(path) => vmconsole_config::load_config_from(path),
        None => vmconsole_config::load_config(),
    }
}

/// `RUST_LOG` wins, then `--log-level`, then `logging.level` from the config.
fn init_logging(level_override: Option<&str>, config: &ConsoleConfig) {
    let directive = match level_override {
        Some(level) => LoggingConfig {
            level: level.to_string(),
        }
        .directive(),
        None => config.logging.directive(),
    };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Command, config: &ConsoleConfig) -> vmconsole_common::Result<()> {
    match command {
        Command::Shell { name } => console::run_console(config, OpenRequest::shell(name)).await,
        Command::Host => console::run_console(config, OpenRequest::host()).await,
        Command::Display { name, port } => {
            console::run_console(config, OpenRequest::graphical(name, port)).await
        }
        Command::Action { name, verb } => {
            let client =
                HttpControlClient::new(config.proxy.api_url.clone(), config.proxy.token.clone())?;
            let message = client.dispatch(&name, verb).await?;
            println!("{message}");
            Ok(())
        }
    }
}
