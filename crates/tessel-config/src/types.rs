//! Host configuration types.
//!
//! Every struct implements [`Default`] so a bare `[section]` header (or no
//! file at all) yields a working configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level HostConfig
// ---------------------------------------------------------------------------

/// Root configuration for a tessel plugin host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Where plugin packages and plugin data live.
    pub paths: PathsSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
    /// Plugin activation policy.
    pub plugins: PluginsSection,
}

impl HostConfig {
    /// Directory scanned for plugin packages, if a home is known.
    #[must_use]
    pub fn plugins_dir(&self) -> Option<PathBuf> {
        self.paths.home.as_deref().map(|h| h.join(&self.paths.plugins_dir))
    }

    /// Root under which each plugin gets its data folder, if a home is known.
    #[must_use]
    pub fn plugin_data_root(&self) -> Option<PathBuf> {
        self.paths
            .home
            .as_deref()
            .map(|h| h.join(&self.paths.plugin_data_dir))
    }

    /// The resolved tessel home directory.
    #[must_use]
    pub fn home(&self) -> Option<&Path> {
        self.paths.home.as_deref()
    }
}

// ---------------------------------------------------------------------------
// PathsSection
// ---------------------------------------------------------------------------

/// Filesystem layout under the tessel home directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    /// Tessel home. Filled in by the loader when not set explicitly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<PathBuf>,
    /// Name of the directory holding plugin packages.
    pub plugins_dir: String,
    /// Name of the directory holding per-plugin data folders.
    pub plugin_data_dir: String,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            home: None,
            plugins_dir: "plugins".to_owned(),
            plugin_data_dir: "plugin-data".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging and tracing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Global log level filter (`"trace"`, `"debug"`, `"info"`, `"warn"`,
    /// `"error"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"`, or `"full"`.
    pub format: String,
    /// Per-crate tracing directives (e.g. `["tessel_plugins=debug"]`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// PluginsSection
// ---------------------------------------------------------------------------

/// Plugin activation policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsSection {
    /// Plugins the host loads but never enables.
    pub disabled: Vec<String>,
}

impl PluginsSection {
    /// Whether `name` is on the disabled list (ASCII case-insensitive).
    #[must_use]
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled.iter().any(|d| d.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config: HostConfig = toml::from_str("").unwrap();
        assert_eq!(config, HostConfig::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.paths.plugins_dir, "plugins");
    }

    #[test]
    fn bare_section_headers_use_defaults() {
        let config: HostConfig = toml::from_str("[paths]\n[logging]\n[plugins]\n").unwrap();
        assert_eq!(config, HostConfig::default());
    }

    #[test]
    fn derived_dirs_need_home() {
        let mut config = HostConfig::default();
        assert!(config.plugins_dir().is_none());
        assert!(config.plugin_data_root().is_none());

        config.paths.home = Some(PathBuf::from("/home/user/.tessel"));
        assert_eq!(
            config.plugins_dir(),
            Some(PathBuf::from("/home/user/.tessel/plugins"))
        );
        assert_eq!(
            config.plugin_data_root(),
            Some(PathBuf::from("/home/user/.tessel/plugin-data"))
        );
    }

    #[test]
    fn disabled_list_is_case_insensitive() {
        let section = PluginsSection {
            disabled: vec!["Greeter".to_owned()],
        };
        assert!(section.is_disabled("greeter"));
        assert!(section.is_disabled("GREETER"));
        assert!(!section.is_disabled("other"));
    }
}
