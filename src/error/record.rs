//! Install record errors

use super::SupvError;

/// Creates a record failed error
pub fn failed(path: impl Into<String>, reason: impl ToString) -> SupvError {
    SupvError::RecordFailed {
        path: path.into(),
        reason: reason.to_string(),
    }
}

/// Creates a record name mismatch error
pub fn name_mismatch(
    path: impl Into<String>,
    found: impl Into<String>,
    expected: impl Into<String>,
) -> SupvError {
    SupvError::RecordNameMismatch {
        path: path.into(),
        found: found.into(),
        expected: expected.into(),
    }
}

/// Creates a package not found error
pub fn package_not_found(name: impl Into<String>) -> SupvError {
    SupvError::PackageNotFound { name: name.into() }
}

/// Creates a need install record error
pub fn need_install_record(name: impl Into<String>) -> SupvError {
    SupvError::NeedInstallRecord { name: name.into() }
}

/// Creates a verification failed error
pub fn verify_failed(name: impl Into<String>, count: usize) -> SupvError {
    SupvError::VerifyFailed {
        name: name.into(),
        count,
    }
}
