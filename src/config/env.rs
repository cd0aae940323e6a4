use std::env::VarError;
use std::time::Duration;

use humantime::parse_duration;

use crate::error::ConfigError;

/// Reads `key`, treating unset and blank values alike, and converts it with
/// `convert`.
fn read<T>(
    key: &'static str,
    convert: impl FnOnce(&str) -> std::result::Result<T, String>,
) -> std::result::Result<Option<T>, ConfigError> {
    let value = match std::env::var(key) {
        Ok(value) => value,
        Err(VarError::NotPresent) => return Ok(None),
        Err(err @ VarError::NotUnicode(_)) => {
            return Err(ConfigError::InvalidField {
                field: key,
                message: err.to_string(),
            });
        }
    };
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    convert(value)
        .map(Some)
        .map_err(|message| ConfigError::InvalidField { field: key, message })
}

pub(super) fn env_string(key: &'static str) -> std::result::Result<Option<String>, ConfigError> {
    read(key, |v| Ok(v.to_string()))
}

pub(super) fn env_bool(key: &'static str) -> std::result::Result<Option<bool>, ConfigError> {
    read(key, |v| match v.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got {other:?}")),
    })
}

pub(super) fn env_duration(
    key: &'static str,
) -> std::result::Result<Option<Duration>, ConfigError> {
    read(key, |v| match v.parse::<u64>() {
        Ok(millis) => Ok(Duration::from_millis(millis)),
        Err(_) => parse_duration(v).map_err(|err| err.to_string()),
    })
}
