//! Constant tables from the command line and JSON files.

use crate::error::{Error, Result};
use filter_expr::{ConstantTable, Value};
use std::fs;
use std::path::Path;

/// Builds the constant table: `file` first, then `defines` on top.
pub fn load_constants(defines: &[String], file: Option<&Path>) -> Result<ConstantTable> {
    let mut constants = match file {
        Some(path) => read_constants_file(path)?,
        None => ConstantTable::new(),
    };

    for define in defines {
        let (name, value) = parse_define(define)?;
        constants.insert(name, value);
    }

    Ok(constants)
}

/// Splits `NAME=VALUE`. The value is always a string.
pub fn parse_define(define: &str) -> Result<(&str, &str)> {
    match define.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim(), value)),
        _ => Err(Error::InvalidDefine(define.to_string())),
    }
}

pub fn read_constants_file(path: &Path) -> Result<ConstantTable> {
    let content = fs::read_to_string(path).map_err(|e| Error::ReadConstants {
        path: path.to_path_buf(),
        source: e,
    })?;

    let json: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| Error::ParseConstants {
            path: path.to_path_buf(),
            source: e,
        })?;

    let serde_json::Value::Object(entries) = json else {
        return Err(Error::ConstantsNotObject(path.to_path_buf()));
    };

    let mut constants = ConstantTable::new();
    for (name, value) in &entries {
        constants.insert(name.as_str(), json_to_value(name, value)?);
    }
    Ok(constants)
}

fn json_to_value(name: &str, json: &serde_json::Value) -> Result<Value> {
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => Ok(Value::Number(n.as_f64().unwrap_or(f64::NAN))),
        serde_json::Value::String(s) => Ok(Value::String(s.clone())),
        serde_json::Value::Array(items) => {
            let values: Result<Vec<_>> = items.iter().map(|v| json_to_value(name, v)).collect();
            Ok(Value::Array(values?))
        }
        serde_json::Value::Object(_) => Err(Error::UnsupportedConstant(name.to_string())),
    }
}
