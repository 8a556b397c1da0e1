//! Per-plugin data directory management.
//!
//! Each plugin gets a private data folder at
//! `<tessel_home>/<paths.plugin_data_dir>/<plugin name>/`. Its stored
//! `config.yml` and any resources it extracts live there.

use std::path::PathBuf;

use tessel_config::HostConfig;

use crate::description::PluginDescription;

/// Return the per-plugin data directory according to `config`.
///
/// Returns `None` if the config has no resolved home or `name` is not a
/// valid plugin name. Does **not** create the directory; call
/// [`ensure_plugin_data_dir`] for that.
#[must_use]
pub fn configured_plugin_data_dir(config: &HostConfig, name: &str) -> Option<PathBuf> {
    if !PluginDescription::is_valid_name(name) {
        return None;
    }
    config.plugin_data_root().map(|root| root.join(name))
}

/// Ensure the per-plugin data directory exists, creating it if necessary.
///
/// Returns `Ok(None)` when [`configured_plugin_data_dir`] has no answer.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_plugin_data_dir(
    config: &HostConfig,
    name: &str,
) -> std::io::Result<Option<PathBuf>> {
    let Some(dir) = configured_plugin_data_dir(config, name) else {
        return Ok(None);
    };
    std::fs::create_dir_all(&dir)?;
    Ok(Some(dir))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn config_at(home: &Path) -> HostConfig {
        let mut config = HostConfig::default();
        config.paths.home = Some(home.to_path_buf());
        config
    }

    #[test]
    fn configured_dir_follows_paths_section() {
        let mut config = HostConfig::default();
        assert!(configured_plugin_data_dir(&config, "Greeter").is_none());

        config.paths.home = Some(PathBuf::from("/srv/tessel"));
        assert_eq!(
            configured_plugin_data_dir(&config, "Greeter"),
            Some(PathBuf::from("/srv/tessel/plugin-data/Greeter"))
        );

        config.paths.plugin_data_dir = "data".to_owned();
        assert_eq!(
            configured_plugin_data_dir(&config, "Greeter"),
            Some(PathBuf::from("/srv/tessel/data/Greeter"))
        );
    }

    #[test]
    fn dot_names_stay_inside_data_root() {
        let config = config_at(Path::new("/srv/tessel"));
        assert!(configured_plugin_data_dir(&config, "..").is_none());
        assert!(configured_plugin_data_dir(&config, ".").is_none());
        assert!(configured_plugin_data_dir(&config, "a/b").is_none());
    }

    #[test]
    fn ensure_plugin_data_dir_creates() {
        let tmp = tempfile::tempdir().unwrap();
        let config = config_at(tmp.path());
        let dir = ensure_plugin_data_dir(&config, "test-plugin").unwrap().unwrap();
        assert!(dir.is_dir());
        assert_eq!(dir, tmp.path().join("plugin-data").join("test-plugin"));

        assert!(ensure_plugin_data_dir(&HostConfig::default(), "x").unwrap().is_none());
        assert!(ensure_plugin_data_dir(&config, "..").unwrap().is_none());
    }
}
