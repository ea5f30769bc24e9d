//! CLI Argument Structures
//!
//! This module contains all CLI argument definitions and command structures
//! used by the symveil binary.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Collision-safe symbol obfuscation for Objective-C targets
#[derive(Parser)]
#[command(name = "symveil")]
#[command(version = VERSION)]
#[command(about = "Symveil - collision-safe symbol obfuscation for Objective-C targets")]
#[command(long_about = "
Rename the internal identifiers of an application target into unrecognizable
names and emit a header of preprocessor macros that performs the substitution
at build time. System frameworks, public headers, properties, setters, and
Interface-Builder-referenced classes are never renamed.

Common Usage:

  # Obfuscate the first target of a project manifest
  symveil obfuscate -p project.yml -o generated_names.h

  # Pick a target and pin the generator seed for a reproducible header
  symveil obfuscate -p project.yml -t App -o generated_names.h --seed 42

  # Write a starter configuration, then validate an edited one
  symveil init-config
  symveil validate-config symveil.yml

Import the emitted header from the target's .pch file to apply the renames.
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a project target and emit the macro header
    Obfuscate(ObfuscateArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Initialize a configuration file with defaults
    #[command(name = "init-config")]
    InitConfig(InitConfigArgs),

    /// Validate a symveil configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),
}

/// Arguments for the obfuscate command
#[derive(Args)]
pub struct ObfuscateArgs {
    /// Path to the project manifest
    #[arg(short, long)]
    pub project: PathBuf,

    /// Target name in the project manifest (first target when omitted)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Path of the emitted macro header
    #[arg(short, long)]
    pub output: PathBuf,

    /// Configuration file (defaults are used when omitted)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Fix the generator seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop emitting once the output reaches this many bytes
    #[arg(long)]
    pub max_output_bytes: Option<u64>,

    /// Write the run summary as JSON to this path
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

/// Arguments for the init-config command
#[derive(Args)]
pub struct InitConfigArgs {
    /// Where to write the configuration file
    #[arg(short, long, default_value = "symveil.yml")]
    pub output: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the validate-config command
#[derive(Args)]
pub struct ValidateConfigArgs {
    /// Configuration file to validate
    pub config: PathBuf,
}
