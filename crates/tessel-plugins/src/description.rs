//! Plugin description types.
//!
//! A [`PluginDescription`] is the descriptive metadata a host reads from a
//! plugin's manifest before loading it. Locating and reading the manifest file
//! is the host's job; this module only models and validates the result.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PluginError, PluginResult};

/// Descriptive metadata for a plugin.
///
/// Deserializes from the usual manifest keys:
///
/// ```yaml
/// name: Greeter
/// version: 1.2.0
/// main: greeter::Plugin
/// authors: [alice]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescription {
    /// Plugin name. Used for the data folder and the command prefix.
    pub name: String,
    /// Version string. Numeric manifest values (`version: 1.0`) are accepted.
    #[serde(deserialize_with = "scalar_string")]
    pub version: String,
    /// Entry point symbol, if the loader needs one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    /// Optional one-line description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Authors, in manifest order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<String>,
    /// Project website.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Logger prefix; falls back to the plugin name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

impl PluginDescription {
    /// Create a description with just a name and version.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidDescription`] if the name is not valid.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> PluginResult<Self> {
        let desc = Self {
            name: name.into(),
            version: version.into(),
            main: None,
            description: None,
            authors: Vec::new(),
            website: None,
            prefix: None,
        };
        desc.validate()?;
        Ok(desc)
    }

    /// Parse and validate a description from a YAML manifest body.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidDescription`] if the document is not
    /// valid YAML, lacks required keys, or names the plugin badly.
    pub fn from_yaml(content: &str) -> PluginResult<Self> {
        let desc: Self = serde_yaml::from_str(content)
            .map_err(|e| PluginError::InvalidDescription(e.to_string()))?;
        desc.validate()?;
        Ok(desc)
    }

    /// Set the logger prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the authors.
    #[must_use]
    pub fn with_authors(mut self, authors: Vec<String>) -> Self {
        self.authors = authors;
        self
    }

    /// The plugin name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name plus version qualifier, e.g. `"Greeter v1.2.0"`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} v{}", self.name, self.version)
    }

    /// The prefix used for log lines from this plugin.
    #[must_use]
    pub fn log_prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(&self.name)
    }

    /// Check whether a string is usable as a plugin name.
    ///
    /// Names made only of dots are rejected since they double as directory
    /// names.
    #[must_use]
    pub fn is_valid_name(name: &str) -> bool {
        !name.trim().is_empty()
            && !name.chars().all(|c| c == '.')
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '.' | '-'))
    }

    fn validate(&self) -> PluginResult<()> {
        if !Self::is_valid_name(&self.name) {
            return Err(PluginError::InvalidDescription(format!(
                "plugin name must be non-empty and contain only [A-Za-z0-9 _.-], got: {:?}",
                self.name
            )));
        }
        if self.version.trim().is_empty() {
            return Err(PluginError::InvalidDescription(format!(
                "plugin {} has an empty version",
                self.name
            )));
        }
        Ok(())
    }
}

fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_yaml::Value::deserialize(deserializer)? {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number, got {other:?}"
        ))),
    }
}

impl fmt::Display for PluginDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name())
    }
}
