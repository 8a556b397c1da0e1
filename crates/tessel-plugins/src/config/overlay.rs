//! Lazily materialized, persisted plugin configuration.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use serde_yaml::Mapping;
use tracing::{debug, warn};

use crate::config::document::ConfigDocument;
use crate::config::format::ConfigFormat;
use crate::error::{PluginError, PluginResult};
use crate::resources::ResourceStore;

/// File name of the stored configuration, and logical path of the bundled
/// default.
pub const CONFIG_FILE_NAME: &str = "config.yml";

/// Maximum stored configuration size (1 MiB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// A plugin's configuration document plus where it lives on disk.
///
/// The document is materialized on first access and replaced wholesale by
/// [`reload`](Self::reload). Its default layer comes from the bundled
/// resource with the same name as the stored file.
///
/// If the stored file exists but cannot be read, the document starts with an
/// empty stored layer and [`save`](Self::save) refuses to overwrite the file
/// until a later reload succeeds.
#[derive(Debug, Clone)]
pub struct ConfigOverlay {
    data_folder: PathBuf,
    file_name: String,
    format: ConfigFormat,
    document: Option<ConfigDocument>,
    load_error: Option<String>,
}

impl ConfigOverlay {
    /// Overlay for `<data_folder>/config.yml`.
    #[must_use]
    pub fn new(data_folder: impl Into<PathBuf>) -> Self {
        Self {
            data_folder: data_folder.into(),
            file_name: CONFIG_FILE_NAME.to_owned(),
            format: ConfigFormat::Yaml,
            document: None,
            load_error: None,
        }
    }

    /// Overlay for `<data_folder>/<file_name>`, with the format picked from
    /// the extension.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::UnsupportedConfigFormat`] for unknown extensions.
    pub fn with_file(data_folder: impl Into<PathBuf>, file_name: &str) -> PluginResult<Self> {
        let format = ConfigFormat::detect(Path::new(file_name))?;
        Ok(Self {
            data_folder: data_folder.into(),
            file_name: file_name.to_owned(),
            format,
            document: None,
            load_error: None,
        })
    }

    /// Path of the stored document.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.data_folder.join(&self.file_name)
    }

    /// Whether the document has been materialized.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.document.is_some()
    }

    /// Why the stored file could not be loaded, if the last load failed.
    #[must_use]
    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// The document, materializing it on first call.
    pub fn get(&mut self, resources: &ResourceStore) -> &mut ConfigDocument {
        if self.document.is_none() {
            self.reload(resources);
        }
        self.document.get_or_insert_with(ConfigDocument::default)
    }

    /// Discard the in-memory document and read it again from disk.
    ///
    /// A missing stored file yields an empty stored layer. Unreadable or
    /// malformed files are logged, yield an empty layer, and are recorded in
    /// [`load_error`](Self::load_error).
    pub fn reload(&mut self, resources: &ResourceStore) {
        let path = self.path();
        let stored = match self.read_stored(&path) {
            Ok(stored) => {
                self.load_error = None;
                stored
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                self.load_error = Some(e.to_string());
                Mapping::new()
            },
        };
        let defaults = match self.read_defaults(resources) {
            Ok(defaults) => defaults,
            Err(e) => {
                warn!(resource = %self.file_name, error = %e, "ignoring malformed default config");
                Mapping::new()
            },
        };
        debug!(
            path = %path.display(),
            stored_keys = stored.len(),
            default_keys = defaults.len(),
            "loaded config"
        );
        self.document = Some(ConfigDocument::new(stored).with_defaults(defaults));
    }

    fn read_stored(&self, path: &Path) -> PluginResult<Mapping> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Mapping::new()),
            Err(e) => return Err(e.into()),
        };
        let too_large = |size: u64| PluginError::ConfigParse {
            path: path.to_path_buf(),
            message: format!(
                "config file is {size} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit"
            ),
        };
        let size = file.metadata()?.len();
        if size > MAX_CONFIG_FILE_SIZE {
            return Err(too_large(size));
        }

        // The file may grow after the metadata check.
        let mut content = String::new();
        file.take(MAX_CONFIG_FILE_SIZE.saturating_add(1))
            .read_to_string(&mut content)?;
        let read = content.len() as u64;
        if read > MAX_CONFIG_FILE_SIZE {
            return Err(too_large(read));
        }
        self.format.parse(&content, path)
    }

    fn read_defaults(&self, resources: &ResourceStore) -> PluginResult<Mapping> {
        let Some(resource) = resources.open(&self.file_name)? else {
            return Ok(Mapping::new());
        };
        let bytes = resource.into_bytes()?;
        let origin = Path::new(&self.file_name);
        let content = String::from_utf8(bytes).map_err(|e| PluginError::ConfigParse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?;
        self.format.parse(&content, origin)
    }

    /// Write the stored layer back to disk.
    ///
    /// The default layer is never written. The file is replaced atomically
    /// and the data folder is created if needed.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::ConfigWrite`] if the stored file failed to load,
    /// so its contents are not replaced by a partial document. Otherwise
    /// returns an error if serialization or any filesystem step fails.
    pub fn save(&mut self, resources: &ResourceStore) -> PluginResult<()> {
        let path = self.path();
        let format = self.format;
        if self.document.is_none() {
            self.reload(resources);
        }
        if let Some(reason) = &self.load_error {
            return Err(PluginError::ConfigWrite {
                path,
                message: format!("refusing to overwrite unreadable config ({reason})"),
            });
        }
        let document = self.get(resources);
        let body = format.serialize(document.stored(), &path)?;

        let write_err = |message: String| PluginError::ConfigWrite {
            path: path.clone(),
            message,
        };
        let parent = path.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(parent)
            .map_err(|e| write_err(format!("failed to create data folder: {e}")))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)
            .map_err(|e| write_err(format!("failed to create temp file: {e}")))?;
        tmp.write_all(body.as_bytes())
            .map_err(|e| write_err(format!("failed to write temp file: {e}")))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| write_err(format!("failed to sync temp file: {e}")))?;
        tmp.persist(&path)
            .map_err(|e| write_err(format!("failed to replace config: {e}")))?;

        document.mark_clean();
        debug!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Copy the bundled default document to the stored path if nothing is
    /// stored yet.
    ///
    /// Returns `true` if a file was written. Never overwrites an existing
    /// stored file.
    pub fn save_default_if_absent(&self, resources: &ResourceStore) -> bool {
        if self.path().exists() {
            return false;
        }
        resources.save(&self.file_name, &self.data_folder, false)
    }
}
