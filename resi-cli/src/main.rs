mod cli;
mod commands;
mod config;
mod error;
mod output;

use crate::{
    cli::{Args, Commands},
    commands::CommandExecutor,
    config::AppConfig,
    error::Result,
};
use clap::Parser;
use std::process;
use tracing::{Level, error};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(args).await {
        error!("Application error: {}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = AppConfig::load(args.config.as_deref())?
        .with_credentials(args.username.clone(), args.password.clone());

    let executor = CommandExecutor::new(config, args.output);

    match args.command {
        Commands::Check => executor.check().await,
        Commands::Encoders => executor.list_encoders().await,
        Commands::EncoderProfiles => executor.list_encoder_profiles().await,
        Commands::EventProfiles => executor.list_event_profiles().await,
        Commands::Status { encoder_id, force } => executor.status(&encoder_id, force).await,
        Commands::Start {
            encoder_id,
            event_profile,
            encoder_profile,
            no_verify,
        } => {
            executor
                .start(&encoder_id, &event_profile, &encoder_profile, no_verify)
                .await
        }
        Commands::Stop {
            encoder_id,
            no_verify,
        } => executor.stop(&encoder_id, no_verify).await,
        Commands::Watch {
            encoder_id,
            interval,
        } => executor.watch(&encoder_id, interval).await,
        Commands::Config => executor.show_config(),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}
