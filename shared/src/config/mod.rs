//! Environment configuration helpers.
//!
//! Both services read their settings from environment variables with defaults.
//! These helpers keep the parsing and error reporting consistent between them.

use reqwest::Url;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable was set but could not be parsed.
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        /// The environment variable name.
        key: String,
        /// The raw value that failed to parse.
        value: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Reads a string variable, falling back to `default` when unset.
#[must_use]
pub fn string_var(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Reads and parses a variable, falling back to `default` when unset.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if the variable is set but does not parse.
pub fn parse_var<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, std::env::var(key).ok(), default)
}

/// Reads a duration given in whole seconds.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if the variable is set but is not a
/// non-negative integer.
pub fn secs_var(key: &str, default_secs: u64) -> Result<Duration, ConfigError> {
    parse_var(key, default_secs).map(Duration::from_secs)
}

/// Reads an absolute URL.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if the value (or the default) is not a
/// valid absolute URL.
pub fn url_var(key: &str, default: &str) -> Result<Url, ConfigError> {
    parse_url(key, &string_var(key, default))
}

pub(crate) fn parse_value<T>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key: key.to_string(),
            reason: e.to_string(),
            value,
        }),
    }
}

pub(crate) fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::Invalid {
        key: key.to_string(),
        value: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.cannot_be_a_base() {
        return Err(ConfigError::Invalid {
            key: key.to_string(),
            value: raw.to_string(),
            reason: "URL cannot be used as a base".to_string(),
        });
    }

    Ok(url)
}
