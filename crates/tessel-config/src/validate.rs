//! Post-merge configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::HostConfig;

/// Log levels accepted in `logging.level`.
pub const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Output formats accepted in `logging.format`.
pub const VALID_FORMATS: [&str; 4] = ["pretty", "compact", "json", "full"];

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &HostConfig) -> ConfigResult<()> {
    validate_paths(config)?;
    validate_logging(config)?;
    validate_plugins(config)?;
    Ok(())
}

fn validate_paths(config: &HostConfig) -> ConfigResult<()> {
    validate_dir_name("paths.plugins_dir", &config.paths.plugins_dir)?;
    validate_dir_name("paths.plugin_data_dir", &config.paths.plugin_data_dir)?;
    Ok(())
}

fn validate_dir_name(field: &str, name: &str) -> ConfigResult<()> {
    if name.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: field.to_owned(),
            message: "directory name must not be empty".to_owned(),
        });
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ConfigError::ValidationError {
            field: field.to_owned(),
            message: format!("'{name}' must be a single directory name, not a path"),
        });
    }
    Ok(())
}

fn validate_logging(config: &HostConfig) -> ConfigResult<()> {
    if !VALID_LEVELS.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                VALID_LEVELS.join(", ")
            ),
        });
    }

    if !VALID_FORMATS.contains(&config.logging.format.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                VALID_FORMATS.join(", ")
            ),
        });
    }

    Ok(())
}

fn validate_plugins(config: &HostConfig) -> ConfigResult<()> {
    if let Some(blank) = config.plugins.disabled.iter().find(|n| n.trim().is_empty()) {
        return Err(ConfigError::ValidationError {
            field: "plugins.disabled".to_owned(),
            message: format!("plugin names must not be blank, got {blank:?}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate(&HostConfig::default()).is_ok());
    }

    #[test]
    fn empty_level_rejected() {
        let mut config = HostConfig::default();
        config.logging.level = String::new();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn unknown_format_rejected() {
        let mut config = HostConfig::default();
        config.logging.format = "xml".to_owned();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::ValidationError { field, .. }) if field == "logging.format"
        ));
    }

    #[test]
    fn dir_names_with_separators_rejected() {
        let mut config = HostConfig::default();
        config.paths.plugin_data_dir = "../escape".to_owned();
        assert!(validate(&config).is_err());

        let mut config = HostConfig::default();
        config.paths.plugins_dir = "a\\b".to_owned();
        assert!(validate(&config).is_err());

        let mut config = HostConfig::default();
        config.paths.plugins_dir = "..".to_owned();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn blank_disabled_entry_rejected() {
        let mut config = HostConfig::default();
        config.plugins.disabled = vec!["ok".to_owned(), "  ".to_owned()];
        assert!(validate(&config).is_err());
    }
}
