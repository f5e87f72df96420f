//! Host function library available inside templates
//!
//! Filters transform a piped value (`{{ data | b64enc }}`); functions are
//! called with named arguments (`{{ file_read(path="/etc/hostname") }}`).

use std::collections::HashMap;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value, json};
use tera::Tera;

use crate::path_utils;
use crate::values;

type Args = HashMap<String, Value>;

/// Register every host filter and function on `tera`
pub fn register(tera: &mut Tera) {
    tera.register_filter("b64enc", b64enc_filter);
    tera.register_filter("b64dec", b64dec_filter);
    tera.register_filter("json_decode", json_decode_filter);
    tera.register_filter("path_base", path_base_filter);
    tera.register_filter("path_dir", path_dir_filter);
    tera.register_filter("path_ext", path_ext_filter);
    tera.register_filter("path_clean", path_clean_filter);
    tera.register_filter("trim_prefix", trim_prefix_filter);
    tera.register_filter("trim_suffix", trim_suffix_filter);

    tera.register_function("file_read", file_read_fn);
    tera.register_function("file_exists", file_exists_fn);
    tera.register_function("file_is_dir", file_is_dir_fn);
    tera.register_function("file_stat", file_stat_fn);
    tera.register_function("file_read_dir", file_read_dir_fn);
    tera.register_function("path_join", path_join_fn);
    tera.register_function("path_split", path_split_fn);
    tera.register_function("merge", merge_fn);
    tera.register_function("shell", shell_fn);
}

fn as_str<'a>(value: &'a Value, what: &str) -> tera::Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("{what} expects a string, got {value}")))
}

fn required_str<'a>(args: &'a Args, name: &str, function: &str) -> tera::Result<&'a str> {
    let value = args.get(name).ok_or_else(|| {
        tera::Error::msg(format!("{function} requires the '{name}' argument"))
    })?;
    as_str(value, function)
}

fn string_list(value: &Value, what: &str) -> tera::Result<Vec<String>> {
    value
        .as_array()
        .ok_or_else(|| tera::Error::msg(format!("{what} expects a list")))?
        .iter()
        .map(|v| match v {
            Value::String(s) => Ok(s.clone()),
            other => Ok(other.to_string()),
        })
        .collect()
}

// Encoding

fn b64enc_filter(value: &Value, _args: &Args) -> tera::Result<Value> {
    Ok(Value::String(STANDARD.encode(as_str(value, "b64enc")?)))
}

fn b64dec_filter(value: &Value, _args: &Args) -> tera::Result<Value> {
    let bytes = STANDARD
        .decode(as_str(value, "b64dec")?)
        .map_err(|e| tera::Error::msg(format!("b64dec: {e}")))?;
    String::from_utf8(bytes)
        .map(Value::String)
        .map_err(|e| tera::Error::msg(format!("b64dec: {e}")))
}

fn json_decode_filter(value: &Value, _args: &Args) -> tera::Result<Value> {
    serde_json::from_str(as_str(value, "json_decode")?)
        .map_err(|e| tera::Error::msg(format!("json_decode: {e}")))
}

// Paths

/// Last element of a slash-separated path
pub(crate) fn base(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return "/".to_string();
    }
    trimmed.rsplit('/').next().unwrap_or(trimmed).to_string()
}

/// All but the last element of a slash-separated path
pub(crate) fn dir(path: &str) -> String {
    let (dir, _) = split(path);
    path_utils::clean(&dir)
}

/// Extension of the last element, including the dot
pub(crate) fn ext(path: &str) -> String {
    let last = path.rsplit('/').next().unwrap_or(path);
    last.rfind('.')
        .map(|i| last[i..].to_string())
        .unwrap_or_default()
}

/// Split after the final slash into directory and file parts
pub(crate) fn split(path: &str) -> (String, String) {
    match path.rfind('/') {
        Some(i) => (path[..=i].to_string(), path[i + 1..].to_string()),
        None => (String::new(), path.to_string()),
    }
}

fn path_base_filter(value: &Value, _args: &Args) -> tera::Result<Value> {
    Ok(Value::String(base(as_str(value, "path_base")?)))
}

fn path_dir_filter(value: &Value, _args: &Args) -> tera::Result<Value> {
    Ok(Value::String(dir(as_str(value, "path_dir")?)))
}

fn path_ext_filter(value: &Value, _args: &Args) -> tera::Result<Value> {
    Ok(Value::String(ext(as_str(value, "path_ext")?)))
}

fn path_clean_filter(value: &Value, _args: &Args) -> tera::Result<Value> {
    Ok(Value::String(path_utils::clean(as_str(value, "path_clean")?)))
}

fn path_join_fn(args: &Args) -> tera::Result<Value> {
    let parts = args
        .get("parts")
        .ok_or_else(|| tera::Error::msg("path_join requires the 'parts' argument"))?;
    let joined = string_list(parts, "path_join")?
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        return Ok(Value::String(String::new()));
    }
    Ok(Value::String(path_utils::clean(&joined)))
}

fn path_split_fn(args: &Args) -> tera::Result<Value> {
    let (dir, file) = split(required_str(args, "path", "path_split")?);
    Ok(json!([dir, file]))
}

// Strings

fn trim_prefix_filter(value: &Value, args: &Args) -> tera::Result<Value> {
    let s = as_str(value, "trim_prefix")?;
    let prefix = required_str(args, "prefix", "trim_prefix")?;
    Ok(Value::String(s.strip_prefix(prefix).unwrap_or(s).to_string()))
}

fn trim_suffix_filter(value: &Value, args: &Args) -> tera::Result<Value> {
    let s = as_str(value, "trim_suffix")?;
    let suffix = required_str(args, "suffix", "trim_suffix")?;
    Ok(Value::String(s.strip_suffix(suffix).unwrap_or(s).to_string()))
}

// Files

fn file_read_fn(args: &Args) -> tera::Result<Value> {
    let path = required_str(args, "path", "file_read")?;
    std::fs::read_to_string(path)
        .map(Value::String)
        .map_err(|e| tera::Error::msg(format!("file_read '{path}': {e}")))
}

fn file_exists_fn(args: &Args) -> tera::Result<Value> {
    let path = required_str(args, "path", "file_exists")?;
    Ok(Value::Bool(Path::new(path).exists()))
}

fn file_is_dir_fn(args: &Args) -> tera::Result<Value> {
    let path = required_str(args, "path", "file_is_dir")?;
    Ok(Value::Bool(Path::new(path).is_dir()))
}

fn file_stat_fn(args: &Args) -> tera::Result<Value> {
    let path = required_str(args, "path", "file_stat")?;
    let metadata =
        std::fs::metadata(path).map_err(|e| tera::Error::msg(format!("file_stat '{path}': {e}")))?;
    Ok(json!({
        "name": base(path),
        "size": metadata.len(),
        "mode": metadata.permissions().mode() & 0o7777,
        "is_dir": metadata.is_dir(),
    }))
}

fn file_read_dir_fn(args: &Args) -> tera::Result<Value> {
    let path = required_str(args, "path", "file_read_dir")?;
    let entries = std::fs::read_dir(path)
        .map_err(|e| tera::Error::msg(format!("file_read_dir '{path}': {e}")))?;
    let mut names = entries
        .map(|entry| entry.map(|e| e.file_name().to_string_lossy().into_owned()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| tera::Error::msg(format!("file_read_dir '{path}': {e}")))?;
    names.sort();
    Ok(json!(names))
}

// Values

fn merge_fn(args: &Args) -> tera::Result<Value> {
    let as_map = |name: &str| -> tera::Result<Map<String, Value>> {
        match args.get(name) {
            None | Some(Value::Null) => Ok(Map::new()),
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(other) => Err(tera::Error::msg(format!(
                "merge expects '{name}' to be a mapping, got {other}"
            ))),
        }
    };
    let merged = values::merge(&as_map("base")?, &as_map("override")?);
    Ok(Value::Object(merged))
}

// Commands

fn shell_fn(args: &Args) -> tera::Result<Value> {
    let cmd = required_str(args, "cmd", "shell")?;
    let cmd_args = match args.get("args") {
        Some(value) => string_list(value, "shell")?,
        None => Vec::new(),
    };

    let output = Command::new(cmd)
        .args(&cmd_args)
        .output()
        .map_err(|e| tera::Error::msg(format!("shell '{cmd}': {e}")))?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));

    if output.status.success() {
        Ok(Value::String(combined))
    } else {
        Err(tera::Error::msg(format!(
            "shell '{cmd}' {}: {combined}",
            output.status
        )))
    }
}
