//! Clang-backed declaration frontend.
//!
//! Shells out to the platform `clang` executable with
//! `-fsyntax-only -Xclang -ast-dump=json` and deserializes the emitted AST
//! dump into flat [`Declaration`] sequences. The dump includes declarations
//! pulled in through imports; the blacklist stage is what keeps those from
//! ever being renamed.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use tracing::debug;

use crate::core::config::FrontendConfig;
use crate::core::errors::{Result, SymveilError};
use crate::frontend::common::{DeclKind, Declaration, DeclarationSource};

/// Declaration source backed by the `clang` executable.
#[derive(Debug, Clone)]
pub struct ClangFrontend {
    executable: PathBuf,
    extra_args: Vec<String>,
}

impl ClangFrontend {
    /// Create a frontend from the configured executable and extra arguments.
    pub fn new(config: &FrontendConfig) -> Self {
        Self {
            executable: config.clang_executable.clone(),
            extra_args: config.extra_compile_args.clone(),
        }
    }

    fn dump_ast(&self, file: &Path, compile_args: &[String]) -> Result<Value> {
        let output = Command::new(&self.executable)
            .args(compile_args)
            .args(&self.extra_args)
            .arg("-fsyntax-only")
            .arg("-Xclang")
            .arg("-ast-dump=json")
            .arg(file)
            .output()
            .map_err(|e| {
                SymveilError::parse_in_file(
                    format!("failed to spawn {}: {e}", self.executable.display()),
                    file.display().to_string(),
                )
            })?;

        // clang still emits a usable dump for units with recoverable
        // diagnostics; only an empty dump counts as a parse failure.
        if output.stdout.is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SymveilError::parse_in_file(
                format!(
                    "clang produced no AST dump (status {}): {}",
                    output.status,
                    first_line(&stderr)
                ),
                file.display().to_string(),
            ));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            SymveilError::parse_in_file(
                format!("malformed AST dump: {e}"),
                file.display().to_string(),
            )
        })
    }
}

impl DeclarationSource for ClangFrontend {
    fn file_declarations(&self, file: &Path, compile_args: &[String]) -> Result<Vec<Declaration>> {
        let root = self.dump_ast(file, compile_args)?;
        let mut declarations = Vec::new();
        let mut current_file = file.to_path_buf();
        collect_declarations(&root, &mut current_file, &mut declarations);
        debug!(
            file = %file.display(),
            count = declarations.len(),
            "indexed translation unit"
        );
        Ok(declarations)
    }

    fn source_declarations(&self, source: &str, compile_args: &[String]) -> Result<Vec<Declaration>> {
        let mut unit = tempfile::Builder::new()
            .prefix("symveil-unit-")
            .suffix(".m")
            .tempfile()
            .map_err(|e| SymveilError::io("failed to create synthetic translation unit", e))?;
        unit.write_all(source.as_bytes())
            .map_err(|e| SymveilError::io("failed to write synthetic translation unit", e))?;
        self.file_declarations(unit.path(), compile_args)
    }
}

/// Walk an AST-dump node tree, tracking the current source file.
///
/// The dump only repeats `loc.file` when it changes, so the walker threads
/// the last seen file down through the recursion.
fn collect_declarations(node: &Value, current_file: &mut PathBuf, out: &mut Vec<Declaration>) {
    if let Some(file) = node
        .get("loc")
        .and_then(|loc| loc.get("file"))
        .and_then(Value::as_str)
    {
        *current_file = PathBuf::from(file);
    }

    let implicit = node
        .get("isImplicit")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if !implicit {
        if let (Some(kind), Some(name)) = (
            node.get("kind").and_then(Value::as_str),
            node.get("name").and_then(Value::as_str),
        ) {
            if let Some(kind) = classify_node_kind(kind) {
                out.push(Declaration::new(kind, name, current_file.clone()));
            }
        }
    }

    if let Some(children) = node.get("inner").and_then(Value::as_array) {
        for child in children {
            collect_declarations(child, current_file, out);
        }
    }
}

fn classify_node_kind(kind: &str) -> Option<DeclKind> {
    match kind {
        "ObjCInterfaceDecl" | "ObjCProtocolDecl" => Some(DeclKind::InterfaceOrProtocol),
        "ObjCMethodDecl" => Some(DeclKind::Method),
        "ObjCPropertyDecl" | "ObjCIvarDecl" => Some(DeclKind::PropertyOrIvar),
        "FunctionDecl" => Some(DeclKind::Function),
        "VarDecl" => Some(DeclKind::GlobalVariable),
        other if other.ends_with("Decl") => Some(DeclKind::Other),
        _ => None,
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("").trim_end()
}
