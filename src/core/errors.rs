//! Error types for the symveil library.
//!
//! Structured error types that preserve context and enable proper error
//! propagation throughout the obfuscation pipeline. Per-file parse failures
//! are recoverable and surface as skips; configuration and blacklist
//! construction failures abort a run before any macro is written.

use std::io;

use thiserror::Error;

/// Main result type for symveil operations.
pub type Result<T> = std::result::Result<T, SymveilError>;

/// Comprehensive error type for all symveil operations.
#[derive(Error, Debug)]
pub enum SymveilError {
    /// I/O related errors (file operations, subprocess spawning, etc.)
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
        /// Configuration field that caused the error
        field: Option<String>,
    },

    /// A single translation unit failed to produce a declaration sequence.
    ///
    /// Recovered locally during classification: the file is logged and
    /// skipped. Only fatal when the synthetic system-import unit fails,
    /// which is reported as [`SymveilError::Blacklist`] instead.
    #[error("Parse failure: {message}")]
    Parse {
        /// Error description
        message: String,
        /// File path where the failure occurred
        file_path: Option<String>,
    },

    /// The blacklist could not be constructed.
    ///
    /// Always fatal: an incomplete blacklist risks renaming platform API
    /// names, which silently breaks linking against system frameworks.
    #[error("Blacklist construction failed: {message}")]
    Blacklist {
        /// Error description
        message: String,
    },

    /// Project descriptor or target resolution errors
    #[error("Project error: {message}")]
    Project {
        /// Error description
        message: String,
        /// Manifest element that caused the error
        element: Option<String>,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error description
        message: String,
        /// Underlying serialization error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal {
        /// Error description
        message: String,
        /// Additional context
        context: Option<String>,
    },
}

impl SymveilError {
    /// Create a new I/O error with context
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: None,
        }
    }

    /// Create a new configuration error with field context
    pub fn config_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a new parse failure
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            file_path: None,
        }
    }

    /// Create a new parse failure with file context
    pub fn parse_in_file(message: impl Into<String>, file_path: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            file_path: Some(file_path.into()),
        }
    }

    /// Create a new blacklist construction error
    pub fn blacklist(message: impl Into<String>) -> Self {
        Self::Blacklist {
            message: message.into(),
        }
    }

    /// Create a new project resolution error
    pub fn project(message: impl Into<String>) -> Self {
        Self::Project {
            message: message.into(),
            element: None,
        }
    }

    /// Create a new project resolution error naming the offending element
    pub fn project_element(message: impl Into<String>, element: impl Into<String>) -> Self {
        Self::Project {
            message: message.into(),
            element: Some(element.into()),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            context: None,
        }
    }

    /// Add context to an existing error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        if let Self::Internal { context: ctx, .. } = &mut self {
            *ctx = Some(context.into());
        }
        self
    }

    /// Whether this error aborts a run rather than skipping a file.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Parse { .. })
    }
}

impl From<io::Error> for SymveilError {
    fn from(err: io::Error) -> Self {
        Self::io("I/O operation failed", err)
    }
}

impl From<serde_json::Error> for SymveilError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: format!("JSON serialization failed: {err}"),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_yaml::Error> for SymveilError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: format!("YAML serialization failed: {err}"),
            source: Some(Box::new(err)),
        }
    }
}

/// Result extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<SymveilError>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.into().with_context(f()))
    }
}
