// src/cli/handlers/commons.rs

// Shared helpers used by multiple handlers.

use anyhow::{Result, anyhow};
use colored::Colorize;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::models::{LoadedProfile, ProfileAttributes, PropertySchema};

/// Replaces the values of secure properties with a fixed mask for display.
pub fn masked_attributes(
    profile: &LoadedProfile,
    schema: &BTreeMap<String, PropertySchema>,
) -> ProfileAttributes {
    profile
        .profile
        .iter()
        .map(|(key, value)| {
            let is_secure = schema.get(key).is_some_and(|prop| prop.secure);
            let shown = if is_secure && !value.is_null() {
                Value::String("********".to_string())
            } else {
                value.clone()
            };
            (key.clone(), shown)
        })
        .collect()
}

/// Renders a JSON value without quoting plain strings.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Parses a `key=value` assignment. The value is read as JSON when it parses
/// (numbers, booleans, arrays), otherwise kept as a string.
pub fn parse_assignment(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!(t!("set.error.bad_assignment"), raw = raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(anyhow!(t!("set.error.bad_assignment"), raw = raw));
    }
    let value = serde_json::from_str::<Value>(value)
        .ok()
        .filter(|v| !v.is_object())
        .unwrap_or_else(|| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

/// Prints one profile's attributes as an aligned two-column list.
pub fn print_attributes(attributes: &ProfileAttributes) {
    let width = attributes.keys().map(String::len).max().unwrap_or(0);
    for (key, value) in attributes {
        println!("  {:<width$}  {}", key.blue(), display_value(value), width = width);
    }
}
