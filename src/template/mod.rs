//! Template rendering for `template` file entries
//!
//! Templates are Tera documents rendered against the package identity, the
//! destination root and the merged values:
//!
//! ```text
//! server: {{ Values.apiServer | default(value="127.0.0.1") }}
//! version: {{ .Version }}
//! ```
//!
//! A leading dot before a context name (`.Values`) is accepted for
//! manifests written in the dotted-root style.

pub mod functions;

use std::path::Path;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;
use tera::Tera;

use crate::error::{Result, template as template_error};
use crate::values::Values;

/// Expression and statement tags
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{.*?\}\}|\{%.*?%\}").expect("tag regex is valid"));

/// A dot that starts an identifier rather than following one
static DOTTED_ROOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(^|[^\w.)\]"'])\.([A-Za-z_])"#).expect("dotted root regex is valid")
});

/// Data visible to a template
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RenderContext<'a> {
    pub name: &'a str,
    pub version: &'a str,
    pub root: String,
    pub values: &'a Values,
}

impl<'a> RenderContext<'a> {
    pub fn new(name: &'a str, version: &'a str, root: &Path, values: &'a Values) -> Self {
        Self {
            name,
            version,
            root: root.display().to_string(),
            values,
        }
    }
}

/// Template engine with the host function library registered
#[derive(Clone, Debug)]
pub struct Renderer {
    tera: Tera,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer {
    pub fn new() -> Self {
        let mut tera = Tera::default();
        // Manifests render configuration, never markup.
        tera.autoescape_on(vec![]);
        functions::register(&mut tera);
        Self { tera }
    }

    /// Render `source`, naming it `name` in errors
    pub fn render(&self, name: &str, source: &str, context: &RenderContext<'_>) -> Result<String> {
        let mut tera = self.tera.clone();
        tera.add_raw_template(name, &strip_dotted_roots(source))
            .map_err(|e| template_error::render_failed(name, error_chain(&e)))?;

        let context = tera::Context::from_serialize(context)
            .map_err(|e| template_error::render_failed(name, error_chain(&e)))?;

        tera.render(name, &context)
            .map_err(|e| template_error::render_failed(name, error_chain(&e)))
    }
}

/// Rewrite `.Name` to `Name` inside template tags
fn strip_dotted_roots(source: &str) -> String {
    TAG_RE
        .replace_all(source, |tag: &Captures<'_>| {
            DOTTED_ROOT_RE
                .replace_all(&tag[0], "${1}${2}")
                .into_owned()
        })
        .into_owned()
}

/// Tera reports the interesting part of an error in its source chain
pub(crate) fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
