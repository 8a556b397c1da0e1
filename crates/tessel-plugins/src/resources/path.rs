//! Logical resource path normalization.

use std::path::{Component, Path, PathBuf};

use crate::error::{PluginError, PluginResult};

/// Directory under the package root that holds bundled resources.
pub const RESOURCES_DIR: &str = "resources";

/// Normalize a logical resource path.
///
/// Backslashes become forward slashes, trailing separators and empty or `.`
/// segments are dropped. Absolute paths and `..` segments are rejected so a
/// lookup can never leave the resources root.
///
/// # Errors
///
/// Returns [`PluginError::InvalidResourcePath`] if nothing is left after
/// normalization or the path tries to escape.
pub fn normalize(logical: &str) -> PluginResult<String> {
    let unified = logical.replace('\\', "/");
    if unified.starts_with('/') || has_drive_prefix(&unified) {
        return Err(PluginError::InvalidResourcePath(logical.to_owned()));
    }

    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {},
            ".." => return Err(PluginError::InvalidResourcePath(logical.to_owned())),
            s => segments.push(s),
        }
    }

    if segments.is_empty() {
        return Err(PluginError::InvalidResourcePath(logical.to_owned()));
    }
    Ok(segments.join("/"))
}

/// Turn a normalized logical path into a relative filesystem path.
#[must_use]
pub fn to_relative_path(normalized: &str) -> PathBuf {
    normalized.split('/').collect()
}

/// Turn a path relative to the resources root back into a logical path.
///
/// Returns `None` for paths with non-UTF-8 or non-normal components.
#[must_use]
pub fn from_relative_path(relative: &Path) -> Option<String> {
    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(s) => segments.push(s.to_str()?),
            Component::CurDir => {},
            _ => return None,
        }
    }
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("/"))
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
