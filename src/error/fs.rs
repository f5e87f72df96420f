//! File system errors

use std::path::Path;

use super::SupvError;

/// Creates a file not found error
pub fn not_found(path: &Path) -> SupvError {
    SupvError::FileNotFound {
        path: path.display().to_string(),
    }
}

/// Creates a file read failed error
pub fn read_failed(path: &Path, reason: impl ToString) -> SupvError {
    SupvError::FileReadFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Creates a file write failed error
pub fn write_failed(path: &Path, reason: impl ToString) -> SupvError {
    SupvError::FileWriteFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> SupvError {
    SupvError::IoError {
        message: message.into(),
    }
}
