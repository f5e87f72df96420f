//! Error types and handling for kubesupv
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`manifest`]: Manifest parsing and validation errors
//! - [`fs`]: File system errors
//! - [`hook`]: Lifecycle script errors
//! - [`record`]: Install record errors
//! - [`template`]: Template rendering errors

pub mod fs;
pub mod hook;
pub mod manifest;
pub mod record;
pub mod template;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for kubesupv operations
#[derive(Error, Diagnostic, Debug)]
pub enum SupvError {
    // Manifest errors
    #[error("Failed to parse manifest '{path}': {reason}")]
    #[diagnostic(
        code(kubesupv::manifest::parse_failed),
        help("The package source must contain a valid manifest.yaml")
    )]
    ManifestParseFailed { path: String, reason: String },

    #[error("Invalid manifest '{path}': {message}")]
    #[diagnostic(code(kubesupv::manifest::invalid))]
    ManifestInvalid { path: String, message: String },

    #[error("Unsupported file type '{file_type}' for '{src}'")]
    #[diagnostic(
        code(kubesupv::manifest::unsupported_type),
        help("Supported file types: file, dir, template")
    )]
    UnsupportedFileType { file_type: String, src: String },

    #[error("Invalid values: {message}")]
    #[diagnostic(
        code(kubesupv::values::invalid),
        help("Values must be a YAML mapping; --set expects key.path=value")
    )]
    ValuesInvalid { message: String },

    // File system errors
    #[error("File not found: {path}")]
    #[diagnostic(code(kubesupv::fs::not_found))]
    FileNotFound { path: String },

    #[error("Failed to read file '{path}': {reason}")]
    #[diagnostic(code(kubesupv::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file '{path}': {reason}")]
    #[diagnostic(code(kubesupv::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(kubesupv::fs::io_error))]
    IoError { message: String },

    // Template errors
    #[error("Failed to render template '{src}': {reason}")]
    #[diagnostic(code(kubesupv::template::render_failed))]
    RenderFailed { src: String, reason: String },

    // Hook errors
    #[error("Script '{script}' failed: {reason}{}", script_output(.output))]
    #[diagnostic(code(kubesupv::hook::script_failed))]
    ScriptFailed {
        script: String,
        reason: String,
        output: String,
    },

    // Record errors
    #[error("Install record '{path}' error: {reason}")]
    #[diagnostic(code(kubesupv::record::failed))]
    RecordFailed { path: String, reason: String },

    #[error("Install record '{path}' belongs to '{found}', expected '{expected}'")]
    #[diagnostic(
        code(kubesupv::record::name_mismatch),
        help("The record directory may be corrupted; inspect the file manually")
    )]
    RecordNameMismatch {
        path: String,
        found: String,
        expected: String,
    },

    #[error("Package '{name}' has no install record to upgrade from")]
    #[diagnostic(
        code(kubesupv::record::need_install_record),
        help("Run 'kubesupv install' to perform a fresh installation")
    )]
    NeedInstallRecord { name: String },

    #[error("Package '{name}' has {count} modified or missing file(s)")]
    #[diagnostic(
        code(kubesupv::record::verify_failed),
        help("Re-run 'kubesupv install' with the same package to restore them")
    )]
    VerifyFailed { name: String, count: usize },

    #[error("Package '{name}' not found")]
    #[diagnostic(
        code(kubesupv::package::not_found),
        help("Run 'kubesupv list' to see installed packages")
    )]
    PackageNotFound { name: String },

    #[error("{}", join_messages(.errors))]
    #[diagnostic(code(kubesupv::multiple))]
    Multiple { errors: Vec<SupvError> },
}

fn script_output(output: &str) -> String {
    let output = output.trim_end();
    if output.is_empty() {
        String::new()
    } else {
        format!(", output: {output}")
    }
}

fn join_messages(errors: &[SupvError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl SupvError {
    /// Combine an optional primary error with a secondary one.
    ///
    /// Nested `Multiple` values are flattened so the caller always sees one
    /// message per line.
    pub fn combine(first: Option<SupvError>, second: SupvError) -> SupvError {
        let mut errors = Vec::new();
        for err in first.into_iter().chain(std::iter::once(second)) {
            match err {
                SupvError::Multiple { errors: inner } => errors.extend(inner),
                other => errors.push(other),
            }
        }
        if errors.len() == 1 {
            errors.remove(0)
        } else {
            SupvError::Multiple { errors }
        }
    }
}

impl From<std::io::Error> for SupvError {
    fn from(err: std::io::Error) -> Self {
        SupvError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for SupvError {
    fn from(err: serde_yaml::Error) -> Self {
        SupvError::ValuesInvalid {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SupvError {
    fn from(err: serde_json::Error) -> Self {
        SupvError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<tera::Error> for SupvError {
    fn from(err: tera::Error) -> Self {
        SupvError::RenderFailed {
            src: String::new(),
            reason: crate::template::error_chain(&err),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, SupvError>;
