//! # Symveil: Collision-Safe Symbol Obfuscation Engine
//!
//! Symveil renames the internal identifiers of an Objective-C application
//! target (classes, protocols, methods, functions, properties, globals) into
//! unrecognizable names and emits a single header of preprocessor macros that
//! maps the original names to the generated ones. The build substitutes the
//! names at preprocessing time; no source file is ever rewritten.
//!
//! The crate is organized around a single sequential pipeline:
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       CLI / Library API                    │
//! ├────────────────────────────────────────────────────────────┤
//! │ Blacklist   │ Exclusion   │ Classification │ Macro         │
//! │ Builder     │ Sets        │ Engine         │ Emitter       │
//! ├────────────────────────────────────────────────────────────┤
//! │ Declaration frontend (clang / replay) │ Project resolver   │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! Symbol names declared by system frameworks or exported through the
//! project's public headers are never renamed; properties, globals, UI-bound
//! class names, and setter selectors gate emission so that getter/setter
//! pairs and Interface-Builder references stay intact.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use symveil::core::config::SymveilConfig;
//! use symveil::core::pipeline::ObfuscationPipeline;
//! use symveil::frontend::clang::ClangFrontend;
//! use symveil::obfuscate::emitter::FileSink;
//! use symveil::project::manifest::ProjectManifest;
//!
//! fn main() -> symveil::Result<()> {
//!     let config = SymveilConfig::default();
//!     let manifest = ProjectManifest::from_yaml_file("project.yml")?;
//!     let files = manifest.resolve(std::path::Path::new("."), Some("App"))?;
//!
//!     let frontend = ClangFrontend::new(&config.frontend);
//!     let mut sink = FileSink::create("generated_names.h", None)?;
//!     let pipeline = ObfuscationPipeline::new(config, frontend)?;
//!     let summary = pipeline.run(&files, &mut sink)?;
//!
//!     println!("{} macros emitted", summary.macros_emitted);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(unsafe_code)]
#![allow(clippy::module_name_repetitions)]

// Core orchestration and shared infrastructure
pub mod core {
    //! Configuration, error taxonomy, and the analysis pipeline.

    pub mod config;
    pub mod errors;
    pub mod pipeline;
}

// Declaration frontends (external compiler collaborators)
pub mod frontend {
    //! Declaration records and the sources that produce them.

    pub mod clang;
    pub mod common;
    pub mod replay;
}

// Symbol classification and macro generation
pub mod obfuscate {
    //! The obfuscation engine: blacklist, exclusions, classification, emission.

    pub mod blacklist;
    pub mod classifier;
    pub mod emitter;
    pub mod exclusions;
    pub mod generator;
}

// Project descriptor resolution
pub mod project {
    //! Project manifest resolution into renameable file sets.

    pub mod manifest;
}

// Re-export primary types for convenience
pub use crate::core::config::SymveilConfig;
pub use crate::core::errors::{Result, SymveilError};
pub use crate::core::pipeline::{ObfuscationPipeline, RunSummary};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
