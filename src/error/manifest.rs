//! Manifest errors

use std::path::Path;

use super::SupvError;

/// Creates a manifest parse failed error
pub fn parse_failed(path: &Path, reason: impl ToString) -> SupvError {
    SupvError::ManifestParseFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Creates an invalid manifest error
pub fn invalid(path: &Path, message: impl Into<String>) -> SupvError {
    SupvError::ManifestInvalid {
        path: path.display().to_string(),
        message: message.into(),
    }
}

/// Creates an unsupported file type error
pub fn unsupported_type(file_type: impl ToString, src: impl Into<String>) -> SupvError {
    SupvError::UnsupportedFileType {
        file_type: file_type.to_string(),
        src: src.into(),
    }
}
