//! Blacklist construction: names that must never be renamed.
//!
//! Three sources, unioned once per run: every symbol declared by the
//! synthetic system-import unit, every symbol the project exports through
//! its public headers, and the manual override list. Renaming anything in
//! the first two sets would break linking or the project's API surface, so
//! a failure to index the synthetic unit aborts the run.

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use tracing::{info, warn};

use crate::core::errors::{Result, SymveilError};
use crate::frontend::common::{DeclKind, Declaration, DeclarationSource};

/// Immutable set of symbol names excluded from renaming.
#[derive(Debug, Default)]
pub struct Blacklist {
    names: HashSet<String>,
}

impl Blacklist {
    /// Build the blacklist for one project analysis.
    ///
    /// `system_import_source` is the platform-representative import block;
    /// failing to index it is fatal. Individual public headers that fail to
    /// index are skipped with a warning; a public set often carries
    /// non-Objective-C headers the frontend cannot digest, and missing one
    /// header only widens the rename surface it was guarding.
    pub fn build(
        frontend: &dyn DeclarationSource,
        system_import_source: &str,
        system_compile_args: &[String],
        public_headers: &BTreeSet<PathBuf>,
        project_compile_args: &[String],
        overrides: &[String],
    ) -> Result<Self> {
        let system_declarations = frontend
            .source_declarations(system_import_source, system_compile_args)
            .map_err(|e| {
                SymveilError::blacklist(format!("system import unit did not index: {e}"))
            })?;

        let mut names = HashSet::new();
        absorb_declarations(&mut names, &system_declarations);
        info!(symbols = names.len(), "indexed system frameworks");

        for header in public_headers {
            match frontend.file_declarations(header, project_compile_args) {
                Ok(declarations) => absorb_declarations(&mut names, &declarations),
                Err(e) => warn!(header = %header.display(), error = %e, "skipping public header"),
            }
        }

        names.extend(overrides.iter().cloned());
        names.remove("");

        Ok(Self { names })
    }

    /// Whether a symbol name is excluded from renaming.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of excluded names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the blacklist is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn from_names<I: IntoIterator<Item = S>, S: Into<String>>(names: I) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

/// Method descriptors contribute one entry per selector piece; every other
/// kind contributes its whole descriptor.
fn absorb_declarations(names: &mut HashSet<String>, declarations: &[Declaration]) {
    for declaration in declarations {
        match declaration.kind {
            DeclKind::Method => {
                for piece in declaration.selector_pieces() {
                    names.insert(piece.to_string());
                }
            }
            _ => {
                names.insert(declaration.descriptor.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::replay::ReplaySource;
    use std::path::Path;

    fn decl(kind: DeclKind, descriptor: &str) -> Declaration {
        Declaration::new(kind, descriptor, "system.h")
    }

    #[test]
    fn test_method_selectors_split_into_pieces() {
        let mut names = HashSet::new();
        absorb_declarations(
            &mut names,
            &[decl(DeclKind::Method, "setValue:forKey:")],
        );
        assert!(names.contains("setValue"));
        assert!(names.contains("forKey"));
        assert!(!names.contains("setValue:forKey:"));
    }

    #[test]
    fn test_build_unions_all_three_sources() {
        let frontend = ReplaySource::new()
            .with_synthetic_unit(vec![
                decl(DeclKind::InterfaceOrProtocol, "NSString"),
                decl(DeclKind::Method, "stringWithFormat:"),
            ])
            .with_file(
                "include/Public.h",
                vec![decl(DeclKind::Function, "pub_entry_point")],
            );

        let public_headers: BTreeSet<PathBuf> = [PathBuf::from("include/Public.h")].into();
        let blacklist = Blacklist::build(
            &frontend,
            "#import <Foundation/Foundation.h>",
            &[],
            &public_headers,
            &[],
            &["appSecret".to_string()],
        )
        .unwrap();

        assert!(blacklist.contains("NSString"));
        assert!(blacklist.contains("stringWithFormat"));
        assert!(blacklist.contains("pub_entry_point"));
        assert!(blacklist.contains("appSecret"));
        assert!(!blacklist.contains(""));
    }

    #[test]
    fn test_failed_synthetic_unit_is_fatal() {
        let frontend = ReplaySource::new(); // no synthetic unit recorded
        let err = Blacklist::build(
            &frontend,
            "#import <Foundation/Foundation.h>",
            &[],
            &BTreeSet::new(),
            &[],
            &[],
        )
        .unwrap_err();

        assert!(matches!(err, SymveilError::Blacklist { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_unreadable_public_header_is_skipped() {
        let frontend = ReplaySource::new().with_synthetic_unit(vec![decl(
            DeclKind::InterfaceOrProtocol,
            "NSObject",
        )]);

        let public_headers: BTreeSet<PathBuf> = [PathBuf::from("include/Broken.h")].into();
        let blacklist = Blacklist::build(
            &frontend,
            "#import <Foundation/Foundation.h>",
            &[],
            &public_headers,
            &[],
            &[],
        )
        .unwrap();

        assert!(blacklist.contains("NSObject"));
        assert!(
            frontend
                .file_declarations(Path::new("include/Broken.h"), &[])
                .is_err()
        );
    }
}
