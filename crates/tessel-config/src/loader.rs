//! Config file discovery and layered loading.
//!
//! Implements the `HostConfig::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Resolve the tessel home (override, `TESSEL_HOME`, then `~/.tessel`)
//! 3. Merge `<home>/config.toml` (user)
//! 4. Apply env var fallbacks for fields the user file left unset
//! 5. Deserialize merged tree → `HostConfig`
//! 6. Validate

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::merge::{deep_merge, get_path, set_path};
use crate::types::HostConfig;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Environment variable naming the tessel home directory.
pub const HOME_ENV: &str = "TESSEL_HOME";

/// Environment variable supplying a fallback `logging.level`.
pub const LOG_ENV: &str = "TESSEL_LOG";

/// Load the host configuration with layered precedence.
///
/// `home_override` is used as the tessel home directory itself, bypassing
/// `TESSEL_HOME` and `~/.tessel`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the user file is malformed or the merged
/// configuration fails validation.
pub fn load(home_override: Option<&Path>) -> ConfigResult<HostConfig> {
    let env_vars = collect_env_vars();
    load_with_env(home_override, &env_vars)
}

/// [`load`] with an explicit environment instead of the process environment.
///
/// # Errors
///
/// Same as [`load`].
pub fn load_with_env(
    home_override: Option<&Path>,
    env_vars: &HashMap<String, String>,
) -> ConfigResult<HostConfig> {
    // 1. Parse embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    // 2. Resolve home.
    let home = resolve_home(home_override, env_vars)?;

    // 3. User config.
    let user_path = home.join("config.toml");
    let user = try_load_file(&user_path)?;
    if let Some(overlay) = &user {
        deep_merge(&mut merged, overlay);
        info!(path = %user_path.display(), "loaded user config");
    }

    // 4. Env fallbacks.
    let env_count = apply_env_fallbacks(&mut merged, user.as_ref(), env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    // 5. Deserialize.
    let mut config: HostConfig =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;
    if config.paths.home.is_none() {
        config.paths.home = Some(home);
    }

    // 6. Validate.
    validate::validate(&config)?;
    Ok(config)
}

/// Load a config from a specific file path (no layering, no env fallbacks).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
/// validation.
pub fn load_file(path: &Path) -> ConfigResult<HostConfig> {
    let Some(value) = try_load_file(path)? else {
        return Err(ConfigError::ReadError {
            path: path.display().to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
    };
    let config: HostConfig =
        value
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: path.display().to_string(),
                source: e,
            })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Try to load a file, returning `None` if the file doesn't exist.
///
/// Uses a single read operation to avoid TOCTOU races (no separate
/// exists/metadata checks before reading).
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    let value: toml::Value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(Some(value))
}

fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(k, _)| k.starts_with("TESSEL_"))
        .collect()
}

fn resolve_home(
    home_override: Option<&Path>,
    env_vars: &HashMap<String, String>,
) -> ConfigResult<PathBuf> {
    if let Some(h) = home_override {
        return Ok(h.to_path_buf());
    }
    if let Some(h) = env_vars.get(HOME_ENV).filter(|h| !h.trim().is_empty()) {
        return Ok(PathBuf::from(h));
    }
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".tessel"))
        .ok_or(ConfigError::NoHomeDir)
}

/// Fill fields from the environment when the user file did not set them.
/// Returns the number of fields applied.
fn apply_env_fallbacks(
    merged: &mut toml::Value,
    user: Option<&toml::Value>,
    env_vars: &HashMap<String, String>,
) -> usize {
    let mut applied: usize = 0;
    let fallbacks = [(LOG_ENV, "logging.level")];
    for (var, field) in fallbacks {
        let user_set = user.is_some_and(|u| get_path(u, field).is_some());
        if user_set {
            continue;
        }
        let Some(value) = env_vars.get(var).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
            continue;
        };
        if set_path(merged, field, toml::Value::from(value.to_ascii_lowercase())) {
            debug!(var, field, "using environment fallback");
            applied = applied.saturating_add(1);
        }
    }
    applied
}
