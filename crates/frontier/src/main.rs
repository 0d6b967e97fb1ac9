mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use frontier_core::Controller;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let mut cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);
    cli.global.output = config::output_format(&cli.global, &config::load_config_or_default());

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a radio connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global).await,

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "frontier", &mut std::io::stdout());
            Ok(())
        }

        // All other commands talk to the radio
        cmd => {
            let mut controller_config = config::resolve_controller_config(&cli.global)?;
            controller_config.poll_interval = match &cmd {
                Command::Watch(args) => args
                    .interval
                    .map_or(controller_config.poll_interval, Duration::from_secs)
                    .max(Duration::from_secs(1)),
                _ => Duration::ZERO,
            };

            let controller = Controller::new(controller_config);
            controller.connect().await?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &controller, &cli.global).await;
            controller.shutdown().await;
            result
        }
    }
}
