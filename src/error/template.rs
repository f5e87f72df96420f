//! Template rendering errors

use super::SupvError;

/// Creates a render failed error
pub fn render_failed(src: impl Into<String>, reason: impl Into<String>) -> SupvError {
    SupvError::RenderFailed {
        src: src.into(),
        reason: reason.into(),
    }
}
