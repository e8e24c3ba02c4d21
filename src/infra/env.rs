use std::time::Duration;

use crate::domain::ConfigError;

/// Reads an environment variable, treating unset and blank values alike.
pub(crate) fn read_env_var(name: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(error) => Err(ConfigError::invalid(format!(
            "{name} could not be read: {error}"
        ))),
    }
}

pub(crate) fn parse_timeout_seconds(name: &str, value: &str) -> Result<Duration, ConfigError> {
    let parsed = value.trim().parse::<u64>().map_err(|_| {
        ConfigError::invalid(format!("{name} must be a positive integer in seconds"))
    })?;
    if parsed == 0 {
        return Err(ConfigError::invalid(format!(
            "{name} must be greater than 0 seconds"
        )));
    }
    Ok(Duration::from_secs(parsed))
}

pub(crate) fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::invalid(format!(
            "{name} must be one of: true,false,1,0,yes,no,on,off"
        ))),
    }
}

pub(crate) fn parse_number<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::invalid(format!("{name} must be a non-negative integer")))
}
