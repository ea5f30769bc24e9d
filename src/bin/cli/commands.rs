//! Command execution logic for the symveil CLI.

use std::path::Path;

use console::style;
use tracing::info;

use symveil::core::config::SymveilConfig;
use symveil::core::errors::{Result, SymveilError};
use symveil::core::pipeline::{ObfuscationPipeline, RunSummary};
use symveil::frontend::clang::ClangFrontend;
use symveil::obfuscate::emitter::FileSink;
use symveil::project::manifest::ProjectManifest;

use super::args::{InitConfigArgs, ObfuscateArgs, ValidateConfigArgs};

/// Run one full obfuscation pass and write the macro header.
pub fn obfuscate_command(args: ObfuscateArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SymveilConfig::from_yaml_file(path)?,
        None => SymveilConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.obfuscation.seed = Some(seed);
    }
    if let Some(max_bytes) = args.max_output_bytes {
        config.output.max_bytes = Some(max_bytes);
    }
    config.validate()?;

    let manifest = ProjectManifest::from_yaml_file(&args.project)?;
    let root = args
        .project
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let files = manifest.resolve(root, args.target.as_deref())?;

    info!(project = %args.project.display(), "starting obfuscation run");

    let frontend = ClangFrontend::new(&config.frontend);
    let max_bytes = config.output.max_bytes;
    let mut sink = FileSink::create(&args.output, max_bytes)?;
    let pipeline = ObfuscationPipeline::new(config, frontend)?;
    let summary = pipeline.run(&files, &mut sink)?;

    if let Some(summary_path) = &args.summary {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(SymveilError::from)?;
        std::fs::write(summary_path, json).map_err(|e| {
            SymveilError::io(
                format!("failed to write run summary: {}", summary_path.display()),
                e,
            )
        })?;
    }

    print_summary(&args.output, &summary, sink.bytes_written());
    Ok(())
}

fn print_summary(output: &Path, summary: &RunSummary, bytes_written: u64) {
    println!(
        "{} {}",
        style("Macro header:").bold(),
        style(output.display()).cyan()
    );
    println!(
        "  {} scanned, {} skipped (vendor {}, UI {}, failed {})",
        summary.files_scanned,
        summary.files_skipped_vendor + summary.files_skipped_ui + summary.files_failed,
        summary.files_skipped_vendor,
        summary.files_skipped_ui,
        summary.files_failed,
    );
    println!(
        "  {} candidates, {} macros emitted ({} bytes), seed {}",
        summary.candidates,
        style(summary.macros_emitted).green(),
        bytes_written,
        summary.seed,
    );
    if summary.sink_exhausted {
        println!(
            "  {}",
            style("output capacity reached; header is partial").yellow()
        );
    }
}

/// Print the default configuration as YAML.
pub fn print_default_config() -> Result<()> {
    print!("{}", SymveilConfig::default_yaml()?);
    Ok(())
}

/// Write a starter configuration file.
pub fn init_config(args: InitConfigArgs) -> Result<()> {
    if args.output.exists() && !args.force {
        return Err(SymveilError::config(format!(
            "{} already exists (use --force to overwrite)",
            args.output.display()
        )));
    }
    SymveilConfig::default().to_yaml_file(&args.output)?;
    println!(
        "{} {}",
        style("Wrote configuration to").green(),
        args.output.display()
    );
    Ok(())
}

/// Load and validate a configuration file.
pub fn validate_config(args: ValidateConfigArgs) -> Result<()> {
    let config = SymveilConfig::from_yaml_file(&args.config)?;
    config.validate()?;
    println!(
        "{} {}",
        style("Configuration valid:").green().bold(),
        args.config.display()
    );
    Ok(())
}
