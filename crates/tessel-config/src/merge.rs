//! Deep merge of TOML values.
//!
//! The merge operates on raw [`toml::Value`] trees rather than deserialized
//! structs, so a key missing from an overlay never resets the base value.

/// Recursively deep-merge `overlay` into `base`.
///
/// - Tables merge recursively per-field.
/// - Scalars and arrays from the overlay **replace** the base value.
pub fn deep_merge(base: &mut toml::Value, overlay: &toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                if let Some(base_val) = base_table.get_mut(key) {
                    deep_merge(base_val, overlay_val);
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
        },
    }
}

/// Look up a dotted path (e.g. `"logging.level"`) in a TOML tree.
#[must_use]
pub fn get_path<'a>(value: &'a toml::Value, path: &str) -> Option<&'a toml::Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.as_table()?.get(segment))
}

/// Set a dotted path, creating intermediate tables.
///
/// Returns `false` if a non-table value sits on the way.
pub fn set_path(value: &mut toml::Value, path: &str, new: toml::Value) -> bool {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else {
        return false;
    };
    let mut current = value;
    for segment in segments {
        let Some(table) = current.as_table_mut() else {
            return false;
        };
        current = table
            .entry(segment)
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
    }
    let Some(table) = current.as_table_mut() else {
        return false;
    };
    table.insert(last.to_owned(), new);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn overlay_scalar_replaces() {
        let mut base = parse("[logging]\nlevel = \"info\"\nformat = \"compact\"\n");
        deep_merge(&mut base, &parse("[logging]\nlevel = \"debug\"\n"));
        assert_eq!(get_path(&base, "logging.level").unwrap().as_str(), Some("debug"));
        assert_eq!(get_path(&base, "logging.format").unwrap().as_str(), Some("compact"));
    }

    #[test]
    fn overlay_array_replaces() {
        let mut base = parse("[plugins]\ndisabled = [\"a\", \"b\"]\n");
        deep_merge(&mut base, &parse("[plugins]\ndisabled = [\"c\"]\n"));
        let disabled = get_path(&base, "plugins.disabled").unwrap().as_array().unwrap();
        assert_eq!(disabled.len(), 1);
    }

    #[test]
    fn overlay_adds_new_tables() {
        let mut base = parse("[logging]\nlevel = \"info\"\n");
        deep_merge(&mut base, &parse("[paths]\nplugins_dir = \"pkgs\"\n"));
        assert_eq!(get_path(&base, "paths.plugins_dir").unwrap().as_str(), Some("pkgs"));
        assert!(get_path(&base, "logging.level").is_some());
    }

    #[test]
    fn set_path_creates_tables() {
        let mut base = parse("");
        assert!(set_path(&mut base, "logging.level", toml::Value::from("warn")));
        assert_eq!(get_path(&base, "logging.level").unwrap().as_str(), Some("warn"));

        let mut scalar = parse("logging = 3\n");
        assert!(!set_path(&mut scalar, "logging.level", toml::Value::from("warn")));
    }
}
