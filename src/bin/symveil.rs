//! Symveil CLI - collision-safe symbol obfuscation for Objective-C targets.

use clap::Parser;
use console::style;

mod cli;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Obfuscate(args) => cli::obfuscate_command(args),
        Commands::PrintDefaultConfig => cli::print_default_config(),
        Commands::InitConfig(args) => cli::init_config(args),
        Commands::ValidateConfig(args) => cli::validate_config(args),
    };

    if let Err(error) = result {
        eprintln!("{} {error}", style("error:").red().bold());
        std::process::exit(1);
    }
}
