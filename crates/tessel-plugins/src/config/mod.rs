//! Layered plugin configuration.
//!
//! A plugin's configuration is one [`ConfigDocument`] with two layers: the
//! stored layer read from `<data_folder>/config.yml`, and the default layer
//! read from the bundled `config.yml` resource. [`ConfigOverlay`] owns the
//! document, materializes it on first access and writes the stored layer back.

mod document;
mod format;
pub mod merge;
mod overlay;

pub use document::ConfigDocument;
pub use format::ConfigFormat;
pub use overlay::{CONFIG_FILE_NAME, ConfigOverlay};
