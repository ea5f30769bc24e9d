//! Declaration records and the frontend contract.
//!
//! The engine never parses Objective-C or C itself; it consumes flat
//! sequences of [`Declaration`] records produced by a compiler frontend
//! behind the [`DeclarationSource`] trait. Method descriptors are
//! colon-segmented selector strings (`initWithName:age:`), everything else
//! is a plain identifier.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::Result;

/// The selector keyword delimiter in method descriptors.
pub const SELECTOR_DELIMITER: char = ':';

/// Kind of a declared symbol, as reported by the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclKind {
    /// `@interface` or `@protocol` name
    InterfaceOrProtocol,
    /// Class or instance method (selector descriptor)
    Method,
    /// `@property` or instance variable
    PropertyOrIvar,
    /// Free C function
    Function,
    /// File-scope or global variable
    GlobalVariable,
    /// Any other declaration kind (typedefs, enums, parameters, ...)
    Other,
}

/// One declaration observed in a translation unit.
///
/// Read-only from the engine's perspective; each record is consumed once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Declaration kind
    pub kind: DeclKind,
    /// Symbol descriptor (selector string for methods)
    pub descriptor: String,
    /// Path of the file the declaration originated from
    #[serde(default)]
    pub source_file: PathBuf,
}

impl Declaration {
    /// Create a declaration record.
    pub fn new(kind: DeclKind, descriptor: impl Into<String>, source_file: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            descriptor: descriptor.into(),
            source_file: source_file.into(),
        }
    }

    /// Split the descriptor into selector pieces.
    ///
    /// A descriptor without a colon yields itself as the single piece, so
    /// plain identifiers and unary selectors go through the same path.
    pub fn selector_pieces(&self) -> impl Iterator<Item = &str> {
        self.descriptor.split(SELECTOR_DELIMITER)
    }

    /// Whether the descriptor is a multi-keyword selector.
    pub fn is_keyword_selector(&self) -> bool {
        self.descriptor.contains(SELECTOR_DELIMITER)
    }
}

/// A compiler frontend that yields declaration sequences.
///
/// One pass per file; the returned sequence is finite and not restartable.
/// Implementations: [`crate::frontend::clang::ClangFrontend`] (shells out to
/// the platform compiler) and [`crate::frontend::replay::ReplaySource`]
/// (replays pre-computed records).
pub trait DeclarationSource {
    /// Index one on-disk translation unit.
    fn file_declarations(&self, file: &Path, compile_args: &[String]) -> Result<Vec<Declaration>>;

    /// Index a synthetic in-memory translation unit.
    fn source_declarations(&self, source: &str, compile_args: &[String]) -> Result<Vec<Declaration>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_pieces_on_keyword_selector() {
        let decl = Declaration::new(DeclKind::Method, "initWithName:age:", "Person.m");
        let pieces: Vec<&str> = decl.selector_pieces().collect();
        assert_eq!(pieces, vec!["initWithName", "age", ""]);
        assert!(decl.is_keyword_selector());
    }

    #[test]
    fn test_selector_pieces_on_plain_identifier() {
        let decl = Declaration::new(DeclKind::Function, "checksum", "util.c");
        let pieces: Vec<&str> = decl.selector_pieces().collect();
        assert_eq!(pieces, vec!["checksum"]);
        assert!(!decl.is_keyword_selector());
    }

    #[test]
    fn test_declaration_roundtrips_through_json() {
        let decl = Declaration::new(DeclKind::PropertyOrIvar, "userName", "User.h");
        let json = serde_json::to_string(&decl).unwrap();
        let back: Declaration = serde_json::from_str(&json).unwrap();
        assert_eq!(back, decl);
    }
}
