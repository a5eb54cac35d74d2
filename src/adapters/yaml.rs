// SPDX-License-Identifier: MIT OR Apache-2.0

//! YAML adapter turning configuration text or files into the raw
//! configuration tree.

use crate::domain::errors::{Result, WiringError};
use crate::domain::raw::{RawMap, RawValue};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Maximum allowed size for a YAML configuration file (10MB).
/// Prevents accidentally feeding the parser something enormous.
const MAX_CONFIG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Parses YAML text into a [`RawValue`].
///
/// Mapping order is preserved, non-string keys are skipped, and
/// sequences are rejected: no part of the configuration schema is
/// list-shaped.
///
/// # Examples
///
/// ```
/// use rediswire::adapters::yaml::from_yaml_str;
///
/// let raw = from_yaml_str("host: 127.0.0.1\nsession: true\n").unwrap();
/// let map = raw.as_map().unwrap();
/// assert!(map.contains_key("session"));
/// ```
pub fn from_yaml_str(content: &str) -> Result<RawValue> {
    let value: serde_yaml::Value = serde_yaml::from_str(content).map_err(|e| {
        WiringError::malformed("", format!("failed to parse YAML: {}", e))
    })?;
    convert(&value, "")
}

/// Reads and parses a YAML configuration file.
///
/// The path is canonicalized first and the file is size-capped at
/// 10MB before it is read.
pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<RawValue> {
    let canonical = path.as_ref().canonicalize()?;
    let metadata = fs::metadata(&canonical)?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(WiringError::malformed(
            canonical.display().to_string(),
            format!(
                "configuration file too large: {} bytes (max {} bytes)",
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        ));
    }
    let content = fs::read_to_string(&canonical)?;
    from_yaml_str(&content)
}

fn convert(value: &serde_yaml::Value, path: &str) -> Result<RawValue> {
    match value {
        serde_yaml::Value::Null => Ok(RawValue::Null),
        serde_yaml::Value::Bool(b) => Ok(RawValue::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(RawValue::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(RawValue::Float(f))
            } else {
                Err(WiringError::malformed(
                    path,
                    format!("number {} out of range", n),
                ))
            }
        }
        serde_yaml::Value::String(s) => Ok(RawValue::Str(s.clone())),
        serde_yaml::Value::Sequence(_) => Err(WiringError::malformed(
            path,
            "sequences are not valid configuration values",
        )),
        serde_yaml::Value::Mapping(mapping) => {
            let mut map = RawMap::new();
            for (key, value) in mapping {
                let Some(key) = key.as_str() else {
                    debug!(path, "skipping non-string mapping key");
                    continue;
                };
                let child_path = if path.is_empty() {
                    key.to_string()
                } else {
                    format!("{}.{}", path, key)
                };
                map.insert(key, convert(value, &child_path)?);
            }
            Ok(RawValue::Map(map))
        }
        serde_yaml::Value::Tagged(tagged) => convert(&tagged.value, path),
    }
}
