//! Collaborator interfaces supplied by the embedding host.
//!
//! The host is injected into each [`PluginHandle`](crate::PluginHandle) at
//! initialization. Nothing in this crate reaches for a global host.

use std::path::Path;
use std::sync::Arc;

use crate::command::PluginCommand;
use crate::description::PluginDescription;
use crate::logger::PluginLogger;
use crate::resources::PackageKind;

/// Services the host exposes to plugins.
pub trait HostContext: Send + Sync {
    /// Look up a registered command by label (bare or `<prefix>:<name>`).
    fn plugin_command(&self, label: &str) -> Option<Arc<PluginCommand>>;

    /// Build the logger a plugin keeps for its whole lifetime.
    ///
    /// The default writes through `tracing`, prefixed with the plugin's log
    /// prefix.
    fn create_logger(&self, description: &PluginDescription) -> PluginLogger {
        PluginLogger::tracing(description.log_prefix())
    }
}

/// The component that loaded a plugin's package.
pub trait PluginLoader: Send + Sync {
    /// Short identifier, e.g. `"package"`.
    fn name(&self) -> &str;

    /// Whether this loader understands the package at `path`.
    fn can_load(&self, path: &Path) -> bool;
}

impl std::fmt::Debug for dyn PluginLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLoader")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for dyn HostContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostContext").finish_non_exhaustive()
    }
}

/// Loader for the package layouts [`ResourceStore`](crate::ResourceStore)
/// can read: plain directories, `.tar`, and `.tar.gz`/`.tgz` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageLoader;

impl PackageLoader {
    /// Create a package loader.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PluginLoader for PackageLoader {
    fn name(&self) -> &str {
        "package"
    }

    fn can_load(&self, path: &Path) -> bool {
        path.is_dir() || matches!(PackageKind::detect(path), PackageKind::Archive(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoCommands;

    impl HostContext for NoCommands {
        fn plugin_command(&self, _label: &str) -> Option<Arc<PluginCommand>> {
            None
        }
    }

    #[test]
    fn default_logger_uses_log_prefix() {
        let desc = PluginDescription::new("Greeter", "1.0")
            .unwrap()
            .with_prefix("greet");
        let logger = NoCommands.create_logger(&desc);
        assert_eq!(logger.prefix(), "greet");
    }

    #[test]
    fn package_loader_accepts_directories_and_archives() {
        let tmp = tempfile::tempdir().unwrap();
        let loader = PackageLoader::new();
        assert_eq!(loader.name(), "package");
        assert!(loader.can_load(tmp.path()));

        let tgz = tmp.path().join("plugin.tgz");
        std::fs::write(&tgz, b"").unwrap();
        assert!(loader.can_load(&tgz));

        let jar = tmp.path().join("plugin.jar");
        std::fs::write(&jar, b"").unwrap();
        assert!(!loader.can_load(&jar));

        assert!(!loader.can_load(&tmp.path().join("missing.tar")));
    }
}
