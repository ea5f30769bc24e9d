//! Auxiliary exclusion sets that gate macro emission.
//!
//! UI-bound names come from resource-file base names: an Interface-Builder
//! archive references its class by string, which a preprocessor macro cannot
//! rewrite, so both the class name and its implementation file are exempt.
//! Property names and setter stems are collected during classification and
//! carried here because they gate the emitter, not the classifier.

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

/// The three exclusion sets consulted at emission time.
#[derive(Debug, Default)]
pub struct ExclusionSets {
    /// Base names of UI resource files plus the manual override list
    pub ui_bound_names: HashSet<String>,
    /// Descriptors of properties, ivars, and globals; never renamed, and any
    /// candidate sharing the exact descriptor is suppressed
    pub property_names: HashSet<String>,
    /// Lowercased setter stems; suppress candidates whose lowercase form matches
    pub setter_stems: HashSet<String>,
}

impl ExclusionSets {
    /// Create exclusion sets seeded with the UI-bound names.
    pub fn with_ui_bound(ui_bound_names: HashSet<String>) -> Self {
        Self {
            ui_bound_names,
            property_names: HashSet::new(),
            setter_stems: HashSet::new(),
        }
    }
}

/// Collect UI-bound base names from the in-scope file paths.
///
/// A file participates when its name splits into exactly two dot-separated
/// segments and the second is one of the configured UI resource extensions.
/// Vendored files contribute nothing.
pub fn ui_bound_names<'a>(
    files: impl IntoIterator<Item = &'a Path>,
    vendor_dirs: &[String],
    resource_extensions: &[String],
    manual_overrides: &[String],
) -> HashSet<String> {
    let mut names: HashSet<String> = manual_overrides.iter().cloned().collect();

    for file in files {
        if in_vendor_dir(file, vendor_dirs) {
            continue;
        }
        if let Some((base, extension)) = two_segment_base(file) {
            if resource_extensions.iter().any(|e| e == extension) {
                debug!(file = %file.display(), base, "found UI resource");
                names.insert(base.to_string());
            }
        }
    }

    names
}

/// Split a file name into its two dot-separated segments, if it has exactly
/// two. `LoginView.xib` yields `("LoginView", "xib")`; `a.b.c` and `Makefile`
/// yield nothing.
pub fn two_segment_base(path: &Path) -> Option<(&str, &str)> {
    let name = path.file_name()?.to_str()?;
    let mut segments = name.split('.');
    let base = segments.next()?;
    let extension = segments.next()?;
    if segments.next().is_some() || base.is_empty() {
        return None;
    }
    Some((base, extension))
}

/// Whether any path component names a configured vendored directory.
pub fn in_vendor_dir(path: &Path, vendor_dirs: &[String]) -> bool {
    path.components()
        .any(|component| vendor_dirs.iter().any(|dir| component.as_os_str() == dir.as_str()))
}
