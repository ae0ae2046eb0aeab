//! Environment lookup helpers shared by the config resolvers.

use crate::error::ConfigError;

/// Read an environment variable, treating unset and empty values as absent.
pub(crate) fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(val) if val.trim().is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("failed to read {key}: {e}"),
        }),
    }
}

pub(crate) fn parse_string_env(key: &str, default: String) -> Result<String, ConfigError> {
    Ok(optional_env(key)?.unwrap_or(default))
}

pub(crate) fn parse_u64_env(key: &str, default: u64) -> Result<u64, ConfigError> {
    optional_env(key)?
        .map(|s| {
            s.trim().parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("must be a non-negative integer: {e}"),
            })
        })
        .transpose()
        .map(|v| v.unwrap_or(default))
}

pub(crate) fn parse_u32_env(key: &str, default: u32) -> Result<u32, ConfigError> {
    let value = parse_u64_env(key, u64::from(default))?;
    u32::try_from(value).map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("{value} is out of range"),
    })
}
