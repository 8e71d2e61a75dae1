mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::config::Operator;
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("🚀 BioSIMI CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let command_result = match cli.command {
        Commands::Share(args) => {
            info!("Dispatching to 'share' command.");
            commands::compose::run(args, Operator::Share)
        }
        Commands::Combine(args) => {
            info!("Dispatching to 'combine' command.");
            commands::compose::run(args, Operator::Combine)
        }
        Commands::Connect(args) => {
            info!("Dispatching to 'connect' command.");
            commands::compose::run(args, Operator::Connect)
        }
        Commands::Inspect(args) => commands::inspect::run(args),
        Commands::Rename(args) => {
            info!("Dispatching to 'rename' command.");
            commands::rename::run(args)
        }
        Commands::Convert(args) => {
            info!("Dispatching to 'convert' command.");
            commands::convert::run(args)
        }
        Commands::Edit(args) => {
            info!("Dispatching to 'edit' command.");
            commands::edit::run(args)
        }
        Commands::Reduce(args) => {
            info!("Dispatching to 'reduce' command.");
            commands::reduce::run(args)
        }
    };

    match &command_result {
        Ok(_) => info!("✅ Command completed successfully."),
        Err(e) => error!("❌ Command failed: {}", e),
    }

    command_result
}
