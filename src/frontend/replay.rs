//! Replay frontend: declaration records from a pre-computed manifest.
//!
//! Lets the engine run without a compiler on the machine (indexing can be
//! done elsewhere and shipped as JSON) and gives tests a frontend whose
//! output is exact. Files absent from the manifest behave like per-file
//! parse failures, which the pipeline recovers from by skipping.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{Result, SymveilError};
use crate::frontend::common::{Declaration, DeclarationSource};

/// Serialized form of a replay manifest.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ReplayManifest {
    /// Declarations of the synthetic system-import unit
    #[serde(default)]
    synthetic_unit: Option<Vec<Declaration>>,
    /// Declarations per source file
    #[serde(default)]
    files: HashMap<PathBuf, Vec<Declaration>>,
}

/// Declaration source that replays recorded declaration sequences.
#[derive(Debug, Default)]
pub struct ReplaySource {
    manifest: ReplayManifest,
}

impl ReplaySource {
    /// Create an empty replay source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a replay manifest from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SymveilError::io(format!("failed to read replay manifest: {}", path.display()), e)
        })?;
        let manifest: ReplayManifest = serde_json::from_str(&content)?;
        Ok(Self { manifest })
    }

    /// Record the declarations of one file.
    pub fn with_file(mut self, file: impl Into<PathBuf>, declarations: Vec<Declaration>) -> Self {
        self.manifest.files.insert(file.into(), declarations);
        self
    }

    /// Record the declarations of the synthetic system-import unit.
    pub fn with_synthetic_unit(mut self, declarations: Vec<Declaration>) -> Self {
        self.manifest.synthetic_unit = Some(declarations);
        self
    }
}

impl DeclarationSource for ReplaySource {
    fn file_declarations(&self, file: &Path, _compile_args: &[String]) -> Result<Vec<Declaration>> {
        self.manifest
            .files
            .get(file)
            .cloned()
            .ok_or_else(|| {
                SymveilError::parse_in_file(
                    "no recorded declarations for file",
                    file.display().to_string(),
                )
            })
    }

    fn source_declarations(&self, _source: &str, _compile_args: &[String]) -> Result<Vec<Declaration>> {
        self.manifest
            .synthetic_unit
            .clone()
            .ok_or_else(|| SymveilError::parse("no recorded synthetic translation unit"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::common::DeclKind;

    #[test]
    fn test_replay_returns_recorded_declarations() {
        let source = ReplaySource::new().with_file(
            "App.m",
            vec![Declaration::new(DeclKind::Function, "app_main", "App.m")],
        );

        let decls = source
            .file_declarations(Path::new("App.m"), &[])
            .unwrap();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].descriptor, "app_main");
    }

    #[test]
    fn test_missing_file_is_a_parse_failure() {
        let source = ReplaySource::new();
        let err = source
            .file_declarations(Path::new("Missing.m"), &[])
            .unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_missing_synthetic_unit_is_a_parse_failure() {
        let source = ReplaySource::new();
        assert!(source.source_declarations("#import <A/A.h>", &[]).is_err());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("replay.json");
        std::fs::write(
            &path,
            r#"{
                "synthetic_unit": [
                    {"kind": "interface_or_protocol", "descriptor": "NSObject"}
                ],
                "files": {
                    "App/Main.m": [
                        {"kind": "function", "descriptor": "main_entry", "source_file": "App/Main.m"}
                    ]
                }
            }"#,
        )
        .unwrap();

        let source = ReplaySource::from_json_file(&path).unwrap();
        let synthetic = source.source_declarations("", &[]).unwrap();
        assert_eq!(synthetic[0].descriptor, "NSObject");
        let decls = source.file_declarations(Path::new("App/Main.m"), &[]).unwrap();
        assert_eq!(decls[0].kind, DeclKind::Function);
    }

    #[test]
    fn test_manifest_roundtrip() {
        let manifest = ReplayManifest {
            synthetic_unit: Some(vec![Declaration::new(
                DeclKind::InterfaceOrProtocol,
                "NSString",
                "Foundation.h",
            )]),
            files: HashMap::from([(
                PathBuf::from("A.m"),
                vec![Declaration::new(DeclKind::Method, "run", "A.m")],
            )]),
        };
        let json = serde_json::to_string(&manifest).unwrap();
        let back: ReplayManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.files.len(), 1);
        assert_eq!(back.synthetic_unit.unwrap()[0].descriptor, "NSString");
    }
}
