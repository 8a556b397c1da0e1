//! Plugin error types.

use std::path::PathBuf;

/// Errors from plugin operations.
///
/// Lookup misses (resources, commands) are not errors; they surface as
/// `None`. These variants cover I/O faults and malformed inputs.
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// A logical resource path was empty or tried to leave the resources root.
    #[error("invalid resource path: {0}")]
    InvalidResourcePath(String),

    /// Reading a packaged archive failed.
    #[error("archive error in {path}: {message}")]
    Archive {
        /// Path to the archive.
        path: PathBuf,
        /// Failure reason.
        message: String,
    },

    /// A configuration document could not be parsed.
    #[error("config parse error in {path}: {message}")]
    ConfigParse {
        /// Path (or logical resource path) of the document.
        path: PathBuf,
        /// Parse error message.
        message: String,
    },

    /// A configuration document could not be serialized.
    #[error("config serialize error for {path}: {message}")]
    ConfigSerialize {
        /// Destination path.
        path: PathBuf,
        /// Serializer error message.
        message: String,
    },

    /// Writing the stored configuration document failed.
    #[error("config write error at {path}: {message}")]
    ConfigWrite {
        /// Destination path.
        path: PathBuf,
        /// Failure reason.
        message: String,
    },

    /// The stored configuration path has an extension we cannot handle.
    #[error("unsupported config format: {0}")]
    UnsupportedConfigFormat(PathBuf),

    /// A plugin description failed validation.
    #[error("invalid plugin description: {0}")]
    InvalidDescription(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;
