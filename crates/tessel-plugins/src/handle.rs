//! The host-facing plugin facade.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::command::{CommandSender, PluginCommand};
use crate::context::PluginContext;
use crate::description::PluginDescription;
use crate::host::{HostContext, PluginLoader};
use crate::lifecycle::{LifecycleController, LifecycleState, Transition};

/// User extension points, called by [`PluginHandle`] at lifecycle edges.
///
/// Every method has a no-op default. Errors returned from the lifecycle
/// hooks reach the host unchanged.
pub trait PluginHooks: Send {
    /// Called by the host after initialization, before the first enable.
    fn on_load(&mut self, _ctx: &mut PluginContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once per `Disabled -> Enabled` edge, after the state flipped.
    fn on_enable(&mut self, _ctx: &mut PluginContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Called once per `Enabled -> Disabled` edge, after the state flipped.
    fn on_disable(&mut self, _ctx: &mut PluginContext) -> anyhow::Result<()> {
        Ok(())
    }

    /// Handle a command routed to this plugin. Returns whether it was
    /// handled; the default handles nothing.
    fn on_command(
        &mut self,
        _ctx: &mut PluginContext,
        _sender: &dyn CommandSender,
        _command: &PluginCommand,
        _label: &str,
        _args: &[String],
    ) -> bool {
        false
    }
}

impl PluginHooks for () {}

/// A plugin as seen by the host: lifecycle, identity, configuration and
/// resources around a set of user [`PluginHooks`].
///
/// All calls into one handle must be serialized by the host.
pub struct PluginHandle<H> {
    lifecycle: LifecycleController,
    context: Option<PluginContext>,
    hooks: H,
}

impl<H> fmt::Debug for PluginHandle<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginHandle")
            .field("state", &self.lifecycle.state())
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl<H: PluginHooks> PluginHandle<H> {
    /// Wrap `hooks` in an uninitialized handle.
    #[must_use]
    pub fn new(hooks: H) -> Self {
        Self {
            lifecycle: LifecycleController::new(),
            context: None,
            hooks,
        }
    }

    /// Bind the plugin to its host, descriptor and folders.
    ///
    /// Only the first call has any effect; it returns `true`. Trailing path
    /// separators on both folders are dropped.
    pub fn initialize(
        &mut self,
        loader: Arc<dyn PluginLoader>,
        host: Arc<dyn HostContext>,
        description: PluginDescription,
        data_folder: impl AsRef<Path>,
        package_root: impl AsRef<Path>,
    ) -> bool {
        if !self.lifecycle.initialize() {
            debug!(plugin = %description.name(), "already initialized, ignoring");
            return false;
        }
        let data_folder = trim_trailing_separators(data_folder.as_ref());
        let package_root = trim_trailing_separators(package_root.as_ref());
        debug!(
            plugin = %description.name(),
            data_folder = %data_folder.display(),
            package_root = %package_root.display(),
            "initialized plugin"
        );
        self.context = Some(PluginContext::new(
            loader,
            host,
            description,
            data_folder,
            package_root,
        ));
        true
    }

    /// Run the load hook.
    ///
    /// # Errors
    ///
    /// Returns whatever the hook returns.
    pub fn on_load(&mut self) -> anyhow::Result<()> {
        let Some(ctx) = self.context.as_mut() else {
            debug!("on_load before initialize, ignoring");
            return Ok(());
        };
        self.hooks.on_load(ctx)
    }

    /// Enable or disable the plugin.
    ///
    /// Redundant calls do nothing. On a real edge the state flips first and
    /// then the matching hook runs; a failing hook leaves the new state in
    /// place.
    ///
    /// # Errors
    ///
    /// Returns the hook's error unchanged.
    pub fn set_enabled(&mut self, enabled: bool) -> anyhow::Result<()> {
        let Some(transition) = self.lifecycle.set_enabled(enabled) else {
            return Ok(());
        };
        let Some(ctx) = self.context.as_mut() else {
            return Ok(());
        };
        match transition {
            Transition::Enable => {
                info!(plugin = %ctx.name(), "enabling {}", ctx.full_name());
                self.hooks.on_enable(ctx)
            },
            Transition::Disable => {
                info!(plugin = %ctx.name(), "disabling {}", ctx.full_name());
                self.hooks.on_disable(ctx)
            },
        }
    }

    /// Route a command to the hooks. Uninitialized handles handle nothing.
    pub fn on_command(
        &mut self,
        sender: &dyn CommandSender,
        command: &PluginCommand,
        label: &str,
        args: &[String],
    ) -> bool {
        match self.context.as_mut() {
            Some(ctx) => self.hooks.on_command(ctx, sender, command, label, args),
            None => false,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Whether `initialize` has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.lifecycle.is_initialized()
    }

    /// Whether the plugin is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.lifecycle.is_enabled()
    }

    /// Always `!is_enabled()`.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.lifecycle.is_disabled()
    }

    /// The plugin's name, once initialized.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.context.as_ref().map(PluginContext::name)
    }

    /// Bound state, once initialized.
    #[must_use]
    pub fn context(&self) -> Option<&PluginContext> {
        self.context.as_ref()
    }

    /// Mutable bound state, once initialized.
    pub fn context_mut(&mut self) -> Option<&mut PluginContext> {
        self.context.as_mut()
    }

    /// The user hooks.
    #[must_use]
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// The user hooks, mutably.
    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }
}

fn trim_trailing_separators(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => {
            let trimmed = s.trim_end_matches(['/', '\\']);
            if trimmed.is_empty() {
                path.to_path_buf()
            } else {
                PathBuf::from(trimmed)
            }
        },
        None => path.to_path_buf(),
    }
}

/// Object-safe view of a [`PluginHandle`], so hosts can hold
/// `Box<dyn Plugin>` regardless of the hooks type.
pub trait Plugin: Send {
    /// See [`PluginHandle::initialize`].
    fn initialize(
        &mut self,
        loader: Arc<dyn PluginLoader>,
        host: Arc<dyn HostContext>,
        description: PluginDescription,
        data_folder: &Path,
        package_root: &Path,
    ) -> bool;

    /// See [`PluginHandle::on_load`].
    ///
    /// # Errors
    ///
    /// Returns the load hook's error.
    fn on_load(&mut self) -> anyhow::Result<()>;

    /// See [`PluginHandle::set_enabled`].
    ///
    /// # Errors
    ///
    /// Returns the enable or disable hook's error.
    fn set_enabled(&mut self, enabled: bool) -> anyhow::Result<()>;

    /// See [`PluginHandle::on_command`].
    fn on_command(
        &mut self,
        sender: &dyn CommandSender,
        command: &PluginCommand,
        label: &str,
        args: &[String],
    ) -> bool;

    /// Current lifecycle state.
    fn state(&self) -> LifecycleState;

    /// Bound state, once initialized.
    fn context(&self) -> Option<&PluginContext>;

    /// Mutable bound state, once initialized.
    fn context_mut(&mut self) -> Option<&mut PluginContext>;
}

impl fmt::Debug for dyn Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.context().map(PluginContext::name))
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl<H: PluginHooks> Plugin for PluginHandle<H> {
    fn initialize(
        &mut self,
        loader: Arc<dyn PluginLoader>,
        host: Arc<dyn HostContext>,
        description: PluginDescription,
        data_folder: &Path,
        package_root: &Path,
    ) -> bool {
        PluginHandle::initialize(self, loader, host, description, data_folder, package_root)
    }

    fn on_load(&mut self) -> anyhow::Result<()> {
        PluginHandle::on_load(self)
    }

    fn set_enabled(&mut self, enabled: bool) -> anyhow::Result<()> {
        PluginHandle::set_enabled(self, enabled)
    }

    fn on_command(
        &mut self,
        sender: &dyn CommandSender,
        command: &PluginCommand,
        label: &str,
        args: &[String],
    ) -> bool {
        PluginHandle::on_command(self, sender, command, label, args)
    }

    fn state(&self) -> LifecycleState {
        PluginHandle::state(self)
    }

    fn context(&self) -> Option<&PluginContext> {
        PluginHandle::context(self)
    }

    fn context_mut(&mut self) -> Option<&mut PluginContext> {
        PluginHandle::context_mut(self)
    }
}
