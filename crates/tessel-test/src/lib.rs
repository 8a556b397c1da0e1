//! Tessel Test - shared test utilities for tessel plugin hosts.
//!
//! Mock collaborators, plugin package fixtures and logging helpers, used as
//! a dev-dependency.
//!
//! ```toml
//! [dev-dependencies]
//! tessel-test.workspace = true
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tessel_plugins::{PackageLoader, PluginHandle};
//! use tessel_test::{MockHost, PackageBuilder, test_description};
//!
//! #[test]
//! fn enables() {
//!     let package = PackageBuilder::new().resource("config.yml", "a: 1\n").directory();
//!     let mut plugin = PluginHandle::new(());
//!     plugin.initialize(
//!         Arc::new(PackageLoader::new()),
//!         Arc::new(MockHost::new()),
//!         test_description("Greeter"),
//!         package.data_folder(),
//!         package.root(),
//!     );
//!     plugin.set_enabled(true).unwrap();
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod fixtures;
pub mod harness;
pub mod mocks;

pub use fixtures::*;
pub use harness::*;
pub use mocks::*;
