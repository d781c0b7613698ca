//! relaylog CLI
//!
//! Command-line interface for sending messages through a relaylog pipeline

use clap::{Parser, Subcommand};
use relaylog_core::diagnostics::{self, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "relaylog")]
#[command(about = "relaylog - Runtime-configurable logging pipelines", long_about = None)]
struct Cli {
    /// Print relaylog's own diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log messages through a pipeline
    Send(commands::send::SendArgs),
    /// Print the targets and rules a pipeline ends up with
    ShowConfig(commands::show::ShowConfigArgs),
}

fn main() {
    let cli = Cli::parse();
    if cli.verbose {
        diagnostics::init(Profile::Development);
    }

    let result = match cli.command {
        Commands::Send(args) => commands::send::execute(args),
        Commands::ShowConfig(args) => commands::show::execute(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
