//! The analysis pipeline that orchestrates one obfuscation run.
//!
//! Stages run strictly in sequence: blacklist construction, UI-bound name
//! collection, classification, emission. The blacklist and exclusion inputs
//! are immutable once built; the candidate table is written by the single
//! classification pass and then only read by the emitter. A run either
//! completes, or aborts on a fatal error before any macro is written.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::core::config::SymveilConfig;
use crate::core::errors::Result;
use crate::frontend::common::DeclarationSource;
use crate::obfuscate::blacklist::Blacklist;
use crate::obfuscate::classifier::Classifier;
use crate::obfuscate::emitter::{Emitter, MacroSink};
use crate::obfuscate::exclusions::ui_bound_names;
use crate::obfuscate::generator::{IdentifierGenerator, UniqueNamer, WordDictionary};
use crate::project::manifest::FileSets;

/// One obfuscation run over one project/target pair.
pub struct ObfuscationPipeline<S> {
    config: SymveilConfig,
    frontend: S,
}

impl<S: DeclarationSource> ObfuscationPipeline<S> {
    /// Create a pipeline; the configuration is validated up front.
    pub fn new(config: SymveilConfig, frontend: S) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, frontend })
    }

    /// The active configuration.
    pub fn config(&self) -> &SymveilConfig {
        &self.config
    }

    /// Run the full analysis and write macro blocks into the sink.
    pub fn run(&self, files: &FileSets, sink: &mut dyn MacroSink) -> Result<RunSummary> {
        let started_at = Utc::now();
        let timer = Instant::now();
        let obfuscation = &self.config.obfuscation;

        let system_args = obfuscation
            .platform
            .base_compile_args(&self.config.frontend.sdk_version);
        let project_args = self.project_compile_args(files);

        let blacklist = Blacklist::build(
            &self.frontend,
            &obfuscation.platform.system_import_source(),
            &system_args,
            &files.public_headers,
            &project_args,
            &obfuscation.blacklist_overrides,
        )?;
        info!(symbols = blacklist.len(), "blacklist ready");

        let ui_bound = ui_bound_names(
            files.renameable_files(),
            &obfuscation.vendor_dirs,
            &obfuscation.ui_resource_extensions,
            &obfuscation.ui_bound_overrides,
        );
        info!(names = ui_bound.len(), "UI-bound names collected");

        let dictionary = match &obfuscation.dictionary_path {
            Some(path) => WordDictionary::from_file(path)?,
            None => WordDictionary::embedded(),
        };
        let seed = obfuscation
            .seed
            .unwrap_or_else(IdentifierGenerator::entropy_seed);
        let generator = IdentifierGenerator::new(dictionary, obfuscation.word_count, seed)?;

        let ui_bound_count = ui_bound.len();
        let mut classifier = Classifier::new(
            obfuscation,
            &blacklist,
            ui_bound,
            UniqueNamer::new(generator),
        );
        classifier.classify_files(&self.frontend, files.renameable_files(), &project_args)?;
        let outcome = classifier.finish();
        info!(
            candidates = outcome.candidates.len(),
            scanned = outcome.stats.files_scanned,
            "classification finished"
        );

        let emitter = Emitter::new(self.config.output.padding_width);
        let emit = emitter.emit(&outcome.candidates, &outcome.exclusions, sink)?;

        Ok(RunSummary {
            started_at,
            duration_secs: timer.elapsed().as_secs_f64(),
            seed,
            blacklist_symbols: blacklist.len(),
            ui_bound_names: ui_bound_count,
            files_scanned: outcome.stats.files_scanned,
            files_skipped_vendor: outcome.stats.files_skipped_vendor,
            files_skipped_ui: outcome.stats.files_skipped_ui,
            files_failed: outcome.stats.files_failed,
            candidates: outcome.candidates.len(),
            macros_emitted: emit.emitted,
            dropped_properties: emit.dropped_property,
            dropped_setters: emit.dropped_setter,
            dropped_ui: emit.dropped_ui,
            sink_exhausted: emit.sink_exhausted,
        })
    }

    /// Compile arguments for indexing project translation units: platform
    /// base flags, configured extras, and an include flag per header dir.
    fn project_compile_args(&self, files: &FileSets) -> Vec<String> {
        let mut args = self
            .config
            .obfuscation
            .platform
            .base_compile_args(&self.config.frontend.sdk_version);
        args.extend(self.config.frontend.extra_compile_args.iter().cloned());
        args.extend(
            files
                .include_dirs()
                .into_iter()
                .map(|dir| format!("-I{}", dir.display())),
        );
        args
    }
}

/// Serializable summary of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration in seconds
    pub duration_secs: f64,
    /// Generator seed used (recorded for reproducibility)
    pub seed: u64,
    /// Number of blacklisted symbol names
    pub blacklist_symbols: usize,
    /// Number of UI-bound names
    pub ui_bound_names: usize,
    /// Files whose declarations were classified
    pub files_scanned: usize,
    /// Files skipped under vendored directories
    pub files_skipped_vendor: usize,
    /// Files skipped as UI-bound implementations
    pub files_skipped_ui: usize,
    /// Files that failed to index
    pub files_failed: usize,
    /// Candidate table size before emitter filtering
    pub candidates: usize,
    /// Macro blocks written
    pub macros_emitted: usize,
    /// Candidates dropped by the property-name gate
    pub dropped_properties: usize,
    /// Candidates dropped by the setter-stem gate
    pub dropped_setters: usize,
    /// Candidates dropped by the UI-bound gate
    pub dropped_ui: usize,
    /// Whether the sink ran out of capacity before the table was exhausted
    pub sink_exhausted: bool,
}
