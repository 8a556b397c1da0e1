//! Plugin lifecycle, layered configuration and bundled resources for tessel
//! plugin hosts.
//!
//! - [`PluginHandle`]: the facade a host drives; wraps user [`PluginHooks`]
//! - [`LifecycleController`]: `Uninitialized -> Disabled <-> Enabled`
//! - [`ConfigOverlay`] / [`ConfigDocument`]: stored `config.yml` over the
//!   bundled default
//! - [`ResourceStore`]: read-only access to `resources/` in a directory or
//!   tar package
//! - [`HostContext`] / [`PluginLoader`]: what the host injects at
//!   initialization
//!
//! # Lifecycle
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tessel_plugins::{
//!     HostContext, PackageLoader, PluginCommand, PluginContext, PluginDescription,
//!     PluginHandle, PluginHooks,
//! };
//!
//! struct Greeter;
//!
//! impl PluginHooks for Greeter {
//!     fn on_enable(&mut self, ctx: &mut PluginContext) -> anyhow::Result<()> {
//!         ctx.save_default_config();
//!         let greeting: String = ctx.config().get_as("greeting").unwrap_or_default();
//!         ctx.logger().info(greeting);
//!         Ok(())
//!     }
//! }
//!
//! struct Host;
//!
//! impl HostContext for Host {
//!     fn plugin_command(&self, _label: &str) -> Option<Arc<PluginCommand>> {
//!         None
//!     }
//! }
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut plugin = PluginHandle::new(Greeter);
//! plugin.initialize(
//!     Arc::new(PackageLoader::new()),
//!     Arc::new(Host),
//!     PluginDescription::new("Greeter", "1.0")?,
//!     "plugin-data/Greeter",
//!     "plugins/greeter.tar.gz",
//! );
//! plugin.on_load()?;
//! plugin.set_enabled(true)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Threading
//!
//! A handle does no locking of its own. Hosts must serialize every call
//! into a given handle.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod command;
pub mod config;
pub mod context;
pub mod description;
pub mod error;
pub mod handle;
pub mod host;
pub mod lifecycle;
pub mod logger;
pub mod plugin_dirs;
pub mod resources;

pub use command::{CommandMap, CommandSender, PluginCommand, PluginInstanceId, qualified_label};
pub use config::{CONFIG_FILE_NAME, ConfigDocument, ConfigFormat, ConfigOverlay};
pub use context::PluginContext;
pub use description::PluginDescription;
pub use error::{PluginError, PluginResult};
pub use handle::{Plugin, PluginHandle, PluginHooks};
pub use host::{HostContext, PackageLoader, PluginLoader};
pub use lifecycle::{LifecycleController, LifecycleState, Transition};
pub use logger::{LogLevel, LogSink, PluginLogger, TracingSink};
pub use resources::{ArchiveCompression, PackageKind, Resource, ResourceIter, ResourceStore};
