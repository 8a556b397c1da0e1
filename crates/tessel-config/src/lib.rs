#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
//! Host configuration for tessel plugin hosts.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tessel_config::HostConfig;
//!
//! let config = HostConfig::load(None).unwrap();
//! println!("plugins live in {:?}", config.plugins_dir());
//! ```
//!
//! # Configuration Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **User** (`$TESSEL_HOME/config.toml`, else `~/.tessel/config.toml`)
//! 2. **Environment variables** (`TESSEL_LOG`), fallback only
//! 3. **Embedded defaults** (`defaults.toml` compiled into the binary)
//!
//! This crate has no dependencies on other tessel crates.

/// Configuration error types.
pub mod error;
/// Configuration file discovery and loading.
pub mod loader;
/// TOML tree merging.
pub mod merge;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use types::*;

impl HostConfig {
    /// Load configuration with the full precedence chain.
    ///
    /// See [`loader::load`] for the algorithm.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the user file is malformed or the final
    /// configuration fails validation.
    pub fn load(home_override: Option<&std::path::Path>) -> ConfigResult<Self> {
        loader::load(home_override)
    }

    /// Load configuration from a single file (no layering).
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed, or fails
    /// validation.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }
}
