//! Project manifest resolution.
//!
//! A project descriptor is a YAML file listing targets, each with three glob
//! lists resolved relative to the manifest's directory: public headers
//! (the API surface visible to consumers, never renamed), internal headers,
//! and implementation sources (both renameable).
//!
//! ```yaml
//! name: MyApp
//! targets:
//!   - name: App
//!     public_headers: ["include/**/*.h"]
//!     internal_headers: ["App/**/*.h"]
//!     sources: ["App/**/*.m", "App/**/*.c"]
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use tracing::info;
use walkdir::WalkDir;

use crate::core::errors::{Result, SymveilError};

/// A project descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectManifest {
    /// Project name
    pub name: String,
    /// Buildable targets
    #[serde(default)]
    pub targets: Vec<Target>,
}

/// One target's file-set globs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// Target name
    pub name: String,
    /// Headers exported to consumers; indexed for the blacklist
    #[serde(default)]
    pub public_headers: Vec<String>,
    /// Project-private headers; renameable
    #[serde(default)]
    pub internal_headers: Vec<String>,
    /// Implementation sources; renameable
    #[serde(default)]
    pub sources: Vec<String>,
}

/// The three resolved file sets of one target.
#[derive(Debug, Clone, Default)]
pub struct FileSets {
    /// Public headers (never renamed)
    pub public_headers: BTreeSet<PathBuf>,
    /// Internal headers (renameable)
    pub internal_headers: BTreeSet<PathBuf>,
    /// Implementation sources (renameable)
    pub sources: BTreeSet<PathBuf>,
}

impl FileSets {
    /// The files the classification engine walks: sources and internal
    /// headers, deduplicated, in a stable sorted order.
    pub fn renameable_files(&self) -> impl Iterator<Item = &Path> {
        self.sources
            .union(&self.internal_headers)
            .map(PathBuf::as_path)
    }

    /// Parent directories of every header, for `-I` include flags.
    pub fn include_dirs(&self) -> BTreeSet<PathBuf> {
        self.public_headers
            .iter()
            .chain(&self.internal_headers)
            .filter_map(|header| header.parent().map(Path::to_path_buf))
            .collect()
    }
}

impl ProjectManifest {
    /// Load a manifest from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SymveilError::project(format!(
                "failed to read project manifest {}: {e}",
                path.display()
            ))
        })?;
        serde_yaml::from_str(&content).map_err(|e| {
            SymveilError::project(format!(
                "malformed project manifest {}: {e}",
                path.display()
            ))
        })
    }

    /// Resolve one target's globs into concrete file sets under `root`.
    ///
    /// With no target name, the first target is used.
    pub fn resolve(&self, root: &Path, target: Option<&str>) -> Result<FileSets> {
        let target = match target {
            Some(name) => self
                .targets
                .iter()
                .find(|t| t.name == name)
                .ok_or_else(|| {
                    SymveilError::project_element("no matching target in manifest", name)
                })?,
            None => self.targets.first().ok_or_else(|| {
                SymveilError::project(format!("manifest '{}' declares no targets", self.name))
            })?,
        };

        let sets = FileSets {
            public_headers: expand_globs(root, &target.public_headers, "public_headers")?,
            internal_headers: expand_globs(root, &target.internal_headers, "internal_headers")?,
            sources: expand_globs(root, &target.sources, "sources")?,
        };
        info!(
            target = %target.name,
            public = sets.public_headers.len(),
            internal = sets.internal_headers.len(),
            sources = sets.sources.len(),
            "resolved project file sets"
        );
        Ok(sets)
    }
}

fn expand_globs(root: &Path, patterns: &[String], field: &str) -> Result<BTreeSet<PathBuf>> {
    if patterns.is_empty() {
        return Ok(BTreeSet::new());
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            SymveilError::project_element(format!("invalid glob '{pattern}': {e}"), field)
        })?;
        builder.add(glob);
    }
    let matcher = builder.build().map_err(|e| {
        SymveilError::project_element(format!("could not compile globs: {e}"), field)
    })?;

    let mut files = BTreeSet::new();
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if matcher.is_match(relative) {
            files.insert(entry.path().to_path_buf());
        }
    }
    Ok(files)
}
