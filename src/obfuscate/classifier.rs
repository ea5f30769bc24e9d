//! The classification engine: one walk over every in-scope declaration.
//!
//! For each file in the union of implementation sources and internal
//! headers, the classifier decides whether the file participates at all
//! (vendored and UI-bound files do not), then dispatches every declaration
//! by kind to build the candidate rename table and feed the emitter-gating
//! exclusion sets. First classification of a descriptor wins; later
//! declarations with the same descriptor are no-ops.

use std::collections::HashSet;
use std::path::Path;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::core::config::ObfuscationConfig;
use crate::core::errors::Result;
use crate::frontend::common::{DeclKind, Declaration, DeclarationSource};
use crate::obfuscate::blacklist::Blacklist;
use crate::obfuscate::exclusions::{in_vendor_dir, two_segment_base, ExclusionSets};
use crate::obfuscate::generator::{NameStyle, UniqueNamer};

/// Ordered mapping from original descriptor to generated replacement.
///
/// Insertion order carries no meaning; it only makes duplicate-key probes
/// cheap and keeps runs reproducible under a fixed seed.
pub type CandidateTable = IndexMap<String, String>;

/// Per-run classification counters.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClassifyStats {
    /// Files whose declarations were classified
    pub files_scanned: usize,
    /// Files skipped because they live under a vendored directory
    pub files_skipped_vendor: usize,
    /// Files skipped because their base name is UI-bound
    pub files_skipped_ui: usize,
    /// Files that failed to produce a declaration sequence
    pub files_failed: usize,
}

/// Everything the classification pass produces.
#[derive(Debug)]
pub struct ClassificationOutcome {
    /// Candidate rename table, pending emitter filtering
    pub candidates: CandidateTable,
    /// Exclusion sets, now including property names and setter stems
    pub exclusions: ExclusionSets,
    /// Classification counters
    pub stats: ClassifyStats,
}

/// Walks declaration sequences and accumulates candidates and exclusions.
pub struct Classifier<'a> {
    config: &'a ObfuscationConfig,
    blacklist: &'a Blacklist,
    namer: UniqueNamer,
    candidates: CandidateTable,
    exclusions: ExclusionSets,
    stats: ClassifyStats,
}

impl<'a> Classifier<'a> {
    /// Create a classifier over the given blacklist and UI-bound names.
    pub fn new(
        config: &'a ObfuscationConfig,
        blacklist: &'a Blacklist,
        ui_bound_names: HashSet<String>,
        namer: UniqueNamer,
    ) -> Self {
        Self {
            config,
            blacklist,
            namer,
            candidates: CandidateTable::new(),
            exclusions: ExclusionSets::with_ui_bound(ui_bound_names),
            stats: ClassifyStats::default(),
        }
    }

    /// Classify every declaration in every given file.
    ///
    /// Per-file parse failures are logged and skipped; only generator
    /// exhaustion propagates as an error.
    pub fn classify_files<'f>(
        &mut self,
        frontend: &dyn DeclarationSource,
        files: impl IntoIterator<Item = &'f Path>,
        compile_args: &[String],
    ) -> Result<()> {
        for file in files {
            if in_vendor_dir(file, &self.config.vendor_dirs) {
                self.stats.files_skipped_vendor += 1;
                continue;
            }

            // A screen's own implementation file is exempt wholesale:
            // Interface Builder references its class name as a string.
            if let Some((base, _)) = two_segment_base(file) {
                if self.exclusions.ui_bound_names.contains(base) {
                    debug!(file = %file.display(), "skipping UI-bound file");
                    self.stats.files_skipped_ui += 1;
                    continue;
                }
            }

            match frontend.file_declarations(file, compile_args) {
                Ok(declarations) => {
                    self.stats.files_scanned += 1;
                    for declaration in &declarations {
                        self.classify_declaration(declaration)?;
                    }
                }
                Err(e) => {
                    warn!(file = %file.display(), error = %e, "failed to index file, skipping");
                    self.stats.files_failed += 1;
                }
            }
        }
        Ok(())
    }

    /// Classify a single declaration record.
    pub fn classify_declaration(&mut self, declaration: &Declaration) -> Result<()> {
        if declaration.descriptor.is_empty() || self.is_blacklisted(declaration) {
            return Ok(());
        }

        match declaration.kind {
            DeclKind::InterfaceOrProtocol => {
                self.insert_candidate(&declaration.descriptor, NameStyle::TitleCase)?;
            }
            DeclKind::Method => {
                for piece in declaration.descriptor.split(':') {
                    self.classify_selector_piece(piece)?;
                }
            }
            DeclKind::PropertyOrIvar | DeclKind::GlobalVariable => {
                // A class or method sharing this exact name must not be
                // half-renamed, so the descriptor gates emission instead.
                self.exclusions
                    .property_names
                    .insert(declaration.descriptor.clone());
            }
            DeclKind::Function => {
                self.insert_candidate(&declaration.descriptor, NameStyle::LowerCamel)?;
            }
            DeclKind::Other => {}
        }
        Ok(())
    }

    fn classify_selector_piece(&mut self, piece: &str) -> Result<()> {
        if piece.is_empty() {
            return Ok(());
        }

        let config = self.config;
        if let Some(stem) = piece.strip_prefix(config.setter_prefix.as_str()) {
            // Setters are never renamed directly; the stem suppresses the
            // matching getter (and anything else sharing it) at emission.
            self.exclusions.setter_stems.insert(stem.to_lowercase());
            return Ok(());
        }

        let style = if piece.starts_with(config.initializer_prefix.as_str()) {
            NameStyle::InitializerLike(config.initializer_prefix.as_str())
        } else {
            NameStyle::LowerCamel
        };
        self.insert_candidate(piece, style)
    }

    fn insert_candidate(&mut self, key: &str, style: NameStyle<'_>) -> Result<()> {
        if self.candidates.contains_key(key) {
            return Ok(());
        }
        let replacement = self.namer.next_unique(style)?;
        self.candidates.insert(key.to_string(), replacement);
        Ok(())
    }

    /// The whole descriptor, and every selector piece of a keyword selector,
    /// must clear the blacklist; any hit excludes the whole declaration.
    fn is_blacklisted(&self, declaration: &Declaration) -> bool {
        if self.blacklist.contains(&declaration.descriptor) {
            return true;
        }
        declaration.is_keyword_selector()
            && declaration
                .selector_pieces()
                .any(|piece| self.blacklist.contains(piece))
    }

    /// Finish classification and hand the results to the emitter.
    pub fn finish(mut self) -> ClassificationOutcome {
        // Descriptor decomposition on malformed input can leave an
        // empty-string artifact behind.
        self.candidates.shift_remove("");
        ClassificationOutcome {
            candidates: self.candidates,
            exclusions: self.exclusions,
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::replay::ReplaySource;
    use crate::obfuscate::generator::{IdentifierGenerator, WordDictionary};
    use std::path::PathBuf;

    fn test_namer() -> UniqueNamer {
        UniqueNamer::new(IdentifierGenerator::new(WordDictionary::embedded(), 3, 99).unwrap())
    }

    fn classify(
        declarations: Vec<Declaration>,
        blacklist: &Blacklist,
        ui_bound: HashSet<String>,
    ) -> ClassificationOutcome {
        let config = ObfuscationConfig::default();
        let mut classifier = Classifier::new(&config, blacklist, ui_bound, test_namer());
        for declaration in &declarations {
            classifier.classify_declaration(declaration).unwrap();
        }
        classifier.finish()
    }

    #[test]
    fn test_interface_becomes_title_case_candidate() {
        let outcome = classify(
            vec![Declaration::new(DeclKind::InterfaceOrProtocol, "Foo", "Foo.m")],
            &Blacklist::default(),
            HashSet::new(),
        );
        let replacement = &outcome.candidates["Foo"];
        assert!(replacement.chars().next().unwrap().is_uppercase());
    }

    #[test]
    fn test_setter_pieces_become_stems_not_candidates() {
        let outcome = classify(
            vec![Declaration::new(DeclKind::Method, "setBar:", "Foo.m")],
            &Blacklist::default(),
            HashSet::new(),
        );
        assert!(outcome.candidates.is_empty());
        assert!(outcome.exclusions.setter_stems.contains("bar"));
    }

    #[test]
    fn test_initializer_piece_keeps_prefix() {
        let outcome = classify(
            vec![Declaration::new(DeclKind::Method, "initWithName:", "Foo.m")],
            &Blacklist::default(),
            HashSet::new(),
        );
        assert!(outcome.candidates["initWithName"].starts_with("initWith"));
    }

    #[test]
    fn test_properties_and_globals_gate_instead_of_renaming() {
        let outcome = classify(
            vec![
                Declaration::new(DeclKind::PropertyOrIvar, "bar", "Foo.m"),
                Declaration::new(DeclKind::GlobalVariable, "bar2", "Foo.m"),
            ],
            &Blacklist::default(),
            HashSet::new(),
        );
        assert!(outcome.candidates.is_empty());
        assert!(outcome.exclusions.property_names.contains("bar"));
        assert!(outcome.exclusions.property_names.contains("bar2"));
    }

    #[test]
    fn test_blacklisted_piece_excludes_whole_method() {
        let blacklist = Blacklist::from_names(["forKey"]);
        let outcome = classify(
            vec![Declaration::new(
                DeclKind::Method,
                "updateValue:forKey:context:",
                "Foo.m",
            )],
            &blacklist,
            HashSet::new(),
        );
        assert!(outcome.candidates.is_empty());
    }

    #[test]
    fn test_first_classification_wins() {
        let config = ObfuscationConfig::default();
        let blacklist = Blacklist::default();
        let mut classifier = Classifier::new(&config, &blacklist, HashSet::new(), test_namer());
        classifier
            .classify_declaration(&Declaration::new(DeclKind::Function, "tick", "a.m"))
            .unwrap();
        let outcome_first = classifier.candidates["tick"].clone();
        classifier
            .classify_declaration(&Declaration::new(DeclKind::Function, "tick", "b.m"))
            .unwrap();
        let outcome = classifier.finish();
        assert_eq!(outcome.candidates["tick"], outcome_first);
        assert_eq!(outcome.candidates.len(), 1);
    }

    #[test]
    fn test_generated_replacements_are_pairwise_distinct() {
        // A dictionary this small guarantees raw collisions; the namer must
        // still hand every descriptor its own replacement.
        let generator = IdentifierGenerator::new(
            WordDictionary::from_words(["oak", "elm", "ash", "fir"]),
            2,
            5,
        )
        .unwrap();
        let config = ObfuscationConfig::default();
        let blacklist = Blacklist::default();
        let mut classifier = Classifier::new(
            &config,
            &blacklist,
            HashSet::new(),
            UniqueNamer::new(generator),
        );

        for name in ["alpha", "beta", "gamma", "delta", "epsilon", "zeta"] {
            classifier
                .classify_declaration(&Declaration::new(DeclKind::Function, name, "a.m"))
                .unwrap();
        }
        let outcome = classifier.finish();
        let values: HashSet<&String> = outcome.candidates.values().collect();
        assert_eq!(values.len(), outcome.candidates.len());
    }

    #[test]
    fn test_vendored_and_ui_files_are_skipped() {
        let frontend = ReplaySource::new()
            .with_file(
                "App/Login.m",
                vec![Declaration::new(DeclKind::Function, "login_go", "App/Login.m")],
            )
            .with_file(
                "Pods/Vendor.m",
                vec![Declaration::new(DeclKind::Function, "vendor_fn", "Pods/Vendor.m")],
            )
            .with_file(
                "App/LoginView.m",
                vec![Declaration::new(
                    DeclKind::InterfaceOrProtocol,
                    "LoginView",
                    "App/LoginView.m",
                )],
            );

        let config = ObfuscationConfig::default();
        let blacklist = Blacklist::default();
        let ui_bound: HashSet<String> = ["LoginView".to_string()].into();
        let mut classifier = Classifier::new(&config, &blacklist, ui_bound, test_namer());

        let files = [
            PathBuf::from("App/Login.m"),
            PathBuf::from("Pods/Vendor.m"),
            PathBuf::from("App/LoginView.m"),
        ];
        classifier
            .classify_files(&frontend, files.iter().map(PathBuf::as_path), &[])
            .unwrap();
        let outcome = classifier.finish();

        assert!(outcome.candidates.contains_key("login_go"));
        assert!(!outcome.candidates.contains_key("vendor_fn"));
        assert!(!outcome.candidates.contains_key("LoginView"));
        assert_eq!(outcome.stats.files_scanned, 1);
        assert_eq!(outcome.stats.files_skipped_vendor, 1);
        assert_eq!(outcome.stats.files_skipped_ui, 1);
    }

    #[test]
    fn test_parse_failures_skip_the_file() {
        let frontend = ReplaySource::new().with_file(
            "App/Ok.m",
            vec![Declaration::new(DeclKind::Function, "fine", "App/Ok.m")],
        );

        let config = ObfuscationConfig::default();
        let blacklist = Blacklist::default();
        let mut classifier = Classifier::new(&config, &blacklist, HashSet::new(), test_namer());
        let files = [PathBuf::from("App/Ok.m"), PathBuf::from("App/Broken.m")];
        classifier
            .classify_files(&frontend, files.iter().map(PathBuf::as_path), &[])
            .unwrap();
        let outcome = classifier.finish();

        assert!(outcome.candidates.contains_key("fine"));
        assert_eq!(outcome.stats.files_failed, 1);
    }

    #[test]
    fn test_trailing_colon_piece_leaves_no_empty_key() {
        let outcome = classify(
            vec![Declaration::new(DeclKind::Method, "refreshToken:", "a.m")],
            &Blacklist::default(),
            HashSet::new(),
        );
        assert!(outcome.candidates.contains_key("refreshToken"));
        assert!(!outcome.candidates.contains_key(""));
    }
}
