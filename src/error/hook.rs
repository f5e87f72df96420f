//! Lifecycle script errors

use super::SupvError;

/// Creates a script failed error carrying the captured output
pub fn script_failed(
    script: impl Into<String>,
    reason: impl Into<String>,
    output: impl Into<String>,
) -> SupvError {
    SupvError::ScriptFailed {
        script: script.into(),
        reason: reason.into(),
        output: output.into(),
    }
}
