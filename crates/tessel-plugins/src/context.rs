//! Per-plugin state bound at initialization.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use crate::command::{PluginCommand, PluginInstanceId, qualified_label};
use crate::config::{ConfigDocument, ConfigOverlay};
use crate::description::PluginDescription;
use crate::host::{HostContext, PluginLoader};
use crate::logger::PluginLogger;
use crate::resources::{Resource, ResourceIter, ResourceStore};

/// Everything a plugin gets from the host when it is initialized.
///
/// Identity (description, folders, instance id) is fixed for the plugin's
/// lifetime. The configuration document is materialized on first access.
#[derive(Debug)]
pub struct PluginContext {
    description: PluginDescription,
    data_folder: PathBuf,
    package_root: PathBuf,
    instance_id: PluginInstanceId,
    loader: Arc<dyn PluginLoader>,
    host: Arc<dyn HostContext>,
    logger: PluginLogger,
    resources: ResourceStore,
    config: ConfigOverlay,
}

impl PluginContext {
    pub(crate) fn new(
        loader: Arc<dyn PluginLoader>,
        host: Arc<dyn HostContext>,
        description: PluginDescription,
        data_folder: PathBuf,
        package_root: PathBuf,
    ) -> Self {
        let logger = host.create_logger(&description);
        let resources = ResourceStore::new(package_root.clone());
        let config = ConfigOverlay::new(data_folder.clone());
        Self {
            description,
            data_folder,
            package_root,
            instance_id: PluginInstanceId::new(),
            loader,
            host,
            logger,
            resources,
            config,
        }
    }

    /// The plugin's name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.description.name()
    }

    /// Name plus version, e.g. `"Greeter v1.2.0"`.
    #[must_use]
    pub fn full_name(&self) -> String {
        self.description.full_name()
    }

    /// The descriptor supplied at initialization.
    #[must_use]
    pub fn description(&self) -> &PluginDescription {
        &self.description
    }

    /// The plugin's private data folder. May not exist yet.
    #[must_use]
    pub fn data_folder(&self) -> &Path {
        &self.data_folder
    }

    /// Root of the plugin's package (directory or archive file).
    #[must_use]
    pub fn package_root(&self) -> &Path {
        &self.package_root
    }

    /// Path of the stored configuration file.
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.config.path()
    }

    /// Identifies this plugin instance for command ownership.
    #[must_use]
    pub fn instance_id(&self) -> PluginInstanceId {
        self.instance_id
    }

    /// The logger created for this plugin at initialization.
    #[must_use]
    pub fn logger(&self) -> &PluginLogger {
        &self.logger
    }

    /// The loader that loaded this plugin.
    #[must_use]
    pub fn loader(&self) -> &dyn PluginLoader {
        self.loader.as_ref()
    }

    /// The host this plugin runs in.
    #[must_use]
    pub fn host(&self) -> &Arc<dyn HostContext> {
        &self.host
    }

    /// The plugin's configuration, loaded on first call.
    pub fn config(&mut self) -> &mut ConfigDocument {
        if !self.config.is_loaded() {
            self.reload_config();
        }
        self.config.get(&self.resources)
    }

    /// Discard the in-memory configuration and read it again from disk.
    ///
    /// A stored file that cannot be read is reported through the plugin
    /// logger; saving stays disabled until a reload succeeds.
    pub fn reload_config(&mut self) {
        self.config.reload(&self.resources);
        if let Some(reason) = self.config.load_error() {
            self.logger.warning(format!(
                "Could not load config from {}: {reason}",
                self.config.path().display()
            ));
        }
    }

    /// Write the stored configuration layer to disk.
    ///
    /// Failures are reported through the plugin logger at critical severity
    /// and yield `false`.
    pub fn save_config(&mut self) -> bool {
        match self.config.save(&self.resources) {
            Ok(()) => true,
            Err(e) => {
                self.logger.critical(format!(
                    "Could not save config to {}: {e}",
                    self.config.path().display()
                ));
                false
            },
        }
    }

    /// Copy the bundled `config.yml` to the data folder unless a stored
    /// config already exists.
    pub fn save_default_config(&self) -> bool {
        self.config.save_default_if_absent(&self.resources)
    }

    /// Open a bundled resource.
    #[must_use]
    pub fn resource(&self, path: &str) -> Option<Resource> {
        match self.resources.open(path) {
            Ok(resource) => resource,
            Err(e) => {
                warn!(plugin = %self.name(), resource = path, error = %e, "failed to open resource");
                None
            },
        }
    }

    /// Extract a bundled resource into the data folder.
    ///
    /// Blank paths are rejected. With `replace` off an existing file is kept
    /// and the call returns `false`.
    pub fn save_resource(&self, path: &str, replace: bool) -> bool {
        if path.trim().is_empty() {
            self.logger.warning("Resource path cannot be empty");
            return false;
        }
        let saved = self.resources.save(path, &self.data_folder, replace);
        if !saved && !replace && self.data_folder.join(path).exists() {
            self.logger.warning(format!(
                "Could not save {path} to {}: file already exists",
                self.data_folder.display()
            ));
        }
        saved
    }

    /// Logical paths of every bundled resource.
    #[must_use]
    pub fn resources(&self) -> ResourceIter {
        self.resources.list()
    }

    /// The resource store backing this plugin.
    #[must_use]
    pub fn resource_store(&self) -> &ResourceStore {
        &self.resources
    }

    /// Find a command owned by this plugin.
    ///
    /// Tries the bare label first, then `<plugin name>:<label>`. A command
    /// found under either label is only returned if this instance owns it.
    #[must_use]
    pub fn command(&self, name: &str) -> Option<Arc<PluginCommand>> {
        if let Some(command) = self
            .host
            .plugin_command(name)
            .filter(|c| c.is_owned_by(self.instance_id))
        {
            return Some(command);
        }
        self.host
            .plugin_command(&qualified_label(self.name(), name))
            .filter(|c| c.is_owned_by(self.instance_id))
    }
}
