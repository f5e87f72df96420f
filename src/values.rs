//! Package values: deep merge and caller overrides
//!
//! Values are generic key/value trees (`serde_json::Value`). Manifests carry
//! defaults, callers supply overrides from YAML files and `--set` flags.

use std::path::Path;

use serde_json::{Map, Value};

use crate::error::{Result, SupvError, fs as fs_error};

/// A mapping of value names to value trees
pub type Values = Map<String, Value>;

/// Merge `overrides` over `base`.
///
/// Nested mappings are merged key by key; any other conflict is won by
/// `overrides`. Neither input is modified.
pub fn merge(base: &Values, overrides: &Values) -> Values {
    let mut merged = base.clone();
    for (key, value) in overrides {
        let combined = match (merged.get(key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => {
                Value::Object(merge(existing, incoming))
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), combined);
    }
    merged
}

/// Read a YAML values file into a mapping.
///
/// An empty document yields an empty mapping.
pub fn read_values(path: &Path) -> Result<Values> {
    let content = std::fs::read_to_string(path).map_err(|e| fs_error::read_failed(path, e))?;
    parse_values(&content).map_err(|e| SupvError::ValuesInvalid {
        message: format!("{}: {}", path.display(), e),
    })
}

/// Parse a YAML document into a mapping.
pub fn parse_values(content: &str) -> Result<Values> {
    if content.trim().is_empty() {
        return Ok(Values::new());
    }
    let value: Value = serde_yaml::from_str(content)?;
    match value {
        Value::Null => Ok(Values::new()),
        Value::Object(map) => Ok(map),
        other => Err(SupvError::ValuesInvalid {
            message: format!("expected a mapping, got {}", type_name(&other)),
        }),
    }
}

/// Parse a `key.path=value` assignment into a nested mapping.
///
/// The right-hand side is read as a YAML scalar, so `true` and `3` keep their
/// types while anything unparseable stays a string.
pub fn parse_set(assignment: &str) -> Result<Values> {
    let (key, raw) = assignment
        .split_once('=')
        .ok_or_else(|| SupvError::ValuesInvalid {
            message: format!("'{assignment}' is not in key=value form"),
        })?;

    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|s| s.trim().is_empty()) {
        return Err(SupvError::ValuesInvalid {
            message: format!("'{key}' is not a valid key path"),
        });
    }

    let mut value = serde_yaml::from_str::<Value>(raw)
        .ok()
        .filter(|v| !v.is_object() && !v.is_array())
        .unwrap_or_else(|| Value::String(raw.to_string()));

    for segment in segments.iter().skip(1).rev() {
        let mut map = Values::new();
        map.insert((*segment).to_string(), value);
        value = Value::Object(map);
    }

    let mut root = Values::new();
    root.insert(segments[0].to_string(), value);
    Ok(root)
}

/// Build caller values from values files and `--set` assignments.
///
/// Files merge left to right, then assignments in order.
pub fn collect(files: &[impl AsRef<Path>], assignments: &[String]) -> Result<Values> {
    let mut values = Values::new();
    for file in files {
        values = merge(&values, &read_values(file.as_ref())?);
    }
    for assignment in assignments {
        values = merge(&values, &parse_set(assignment)?);
    }
    Ok(values)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}
