//! On-disk formats for plugin configuration documents.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::error::{PluginError, PluginResult};

/// Serialization format of a configuration document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML (`.yml`, `.yaml`).
    #[default]
    Yaml,
    /// JSON (`.json`).
    Json,
}

impl ConfigFormat {
    /// Pick the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnsupportedConfigFormat`] for any other extension.
    pub fn detect(path: &Path) -> PluginResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("yml" | "yaml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(PluginError::UnsupportedConfigFormat(path.to_path_buf())),
        }
    }

    /// Parse a document body. An empty body is an empty mapping.
    ///
    /// `origin` is only used in error messages.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::ConfigParse`] if the body is malformed or its top
    /// level is not a mapping.
    pub fn parse(self, content: &str, origin: &Path) -> PluginResult<Mapping> {
        if content.trim().is_empty() {
            return Ok(Mapping::new());
        }
        let parse_err = |message: String| PluginError::ConfigParse {
            path: origin.to_path_buf(),
            message,
        };
        let value: Value = match self {
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| parse_err(e.to_string()))?,
            Self::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?,
        };
        match value {
            Value::Null => Ok(Mapping::new()),
            Value::Mapping(map) => Ok(map),
            other => Err(parse_err(format!(
                "top level must be a mapping, got {}",
                kind_name(&other)
            ))),
        }
    }

    /// Serialize a mapping for writing to `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::ConfigSerialize`] if the mapping cannot be
    /// represented (e.g. sequence keys in JSON).
    pub fn serialize(self, document: &Mapping, destination: &Path) -> PluginResult<String> {
        let result = match self {
            Self::Yaml => serde_yaml::to_string(document).map_err(|e| e.to_string()),
            Self::Json => serde_json::to_string_pretty(document)
                .map(|mut s| {
                    s.push('\n');
                    s
                })
                .map_err(|e| e.to_string()),
        };
        result.map_err(|message| PluginError::ConfigSerialize {
            path: destination.to_path_buf(),
            message,
        })
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_by_extension() {
        assert_eq!(
            ConfigFormat::detect(Path::new("config.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::detect(Path::new("config.YAML")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::detect(Path::new("config.json")).unwrap(),
            ConfigFormat::Json
        );
        assert!(matches!(
            ConfigFormat::detect(Path::new("config.ini")),
            Err(PluginError::UnsupportedConfigFormat(_))
        ));
    }

    #[test]
    fn empty_body_is_empty_mapping() {
        let origin = Path::new("config.yml");
        assert!(ConfigFormat::Yaml.parse("", origin).unwrap().is_empty());
        assert!(ConfigFormat::Yaml.parse("\n  \n", origin).unwrap().is_empty());
        assert!(ConfigFormat::Yaml.parse("~", origin).unwrap().is_empty());
    }

    #[test]
    fn scalar_top_level_rejected() {
        let err = ConfigFormat::Yaml
            .parse("just a string", Path::new("config.yml"))
            .unwrap_err();
        assert!(err.to_string().contains("top level must be a mapping"));
    }

    #[test]
    fn yaml_preserves_native_types() {
        let map = ConfigFormat::Yaml
            .parse(
                "count: 3\nratio: 0.5\nflag: true\nname: x\nlist: [1, 2]\nnested:\n  k: v\n",
                Path::new("config.yml"),
            )
            .unwrap();
        assert_eq!(map.get("count"), Some(&Value::from(3)));
        assert_eq!(map.get("ratio"), Some(&Value::from(0.5)));
        assert_eq!(map.get("flag"), Some(&Value::Bool(true)));
        assert!(map.get("list").unwrap().is_sequence());
        assert!(map.get("nested").unwrap().is_mapping());
    }

    #[test]
    fn json_parse_and_serialize() {
        let origin = Path::new("config.json");
        let map = ConfigFormat::Json
            .parse(r#"{"a": 1, "b": {"c": "d"}}"#, origin)
            .unwrap();
        let text = ConfigFormat::Json.serialize(&map, origin).unwrap();
        let again = ConfigFormat::Json.parse(&text, origin).unwrap();
        assert_eq!(map, again);
    }

    #[test]
    fn json_rejects_non_string_keys() {
        let mut map = Mapping::new();
        map.insert(Value::Sequence(vec![Value::from(1)]), Value::from("one"));
        assert!(matches!(
            ConfigFormat::Json.serialize(&map, Path::new("config.json")),
            Err(PluginError::ConfigSerialize { .. })
        ));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let err = ConfigFormat::Yaml
            .parse("a: [unclosed", Path::new("config.yml"))
            .unwrap_err();
        assert!(matches!(err, PluginError::ConfigParse { .. }));
    }
}
