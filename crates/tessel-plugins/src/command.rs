//! Command types shared between plugins and the host's command router.
//!
//! Routing itself belongs to the host. This module provides the command
//! value, the ownership token a command carries, and [`CommandMap`], a
//! minimal map hosts can use to register commands under both the bare name
//! and the `<prefix>:<name>` fallback label.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

/// Identifies one initialized plugin instance.
///
/// Two handles for plugins with the same name still get different ids, so
/// ownership checks compare instances rather than names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PluginInstanceId(Uuid);

impl PluginInstanceId {
    /// Generate a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for PluginInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PluginInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A command registered on behalf of a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginCommand {
    /// Command name, without prefix.
    pub name: String,
    /// The plugin instance that owns the command.
    pub owner: PluginInstanceId,
    /// Short help text.
    pub description: String,
    /// Usage string shown on misuse.
    pub usage: String,
    /// Alternative names.
    pub aliases: Vec<String>,
}

impl PluginCommand {
    /// Create a command owned by `owner`.
    #[must_use]
    pub fn new(name: impl Into<String>, owner: PluginInstanceId) -> Self {
        let name = name.into();
        Self {
            usage: format!("/{name}"),
            name,
            owner,
            description: String::new(),
            aliases: Vec::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the usage string.
    #[must_use]
    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Set the aliases.
    #[must_use]
    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Whether `instance` owns this command.
    #[must_use]
    pub fn is_owned_by(&self, instance: PluginInstanceId) -> bool {
        self.owner == instance
    }
}

/// Someone able to issue commands and receive replies.
pub trait CommandSender {
    /// Display name of the sender.
    fn name(&self) -> &str;

    /// Deliver a reply line.
    fn send_message(&self, message: &str);
}

/// Build the qualified label `<prefix>:<name>` used as the collision fallback.
///
/// The prefix is lowercased; the name is left as given.
#[must_use]
pub fn qualified_label(prefix: &str, name: &str) -> String {
    format!("{}:{name}", prefix.to_lowercase())
}

/// Label-to-command map.
///
/// Each registered command is reachable under `<prefix>:<label>` for its
/// name and every alias. The bare labels go to whoever registered them first.
#[derive(Debug, Default)]
pub struct CommandMap {
    commands: HashMap<String, Arc<PluginCommand>>,
}

impl CommandMap {
    /// Create an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `command` with the given fallback prefix.
    ///
    /// Returns `true` if the bare name was free and is now bound to this
    /// command; `false` if only the qualified label could be bound.
    pub fn register(&mut self, fallback_prefix: &str, command: PluginCommand) -> bool {
        let command = Arc::new(command);
        let mut labels = vec![command.name.clone()];
        labels.extend(command.aliases.iter().cloned());

        let mut bare_bound = false;
        for (idx, label) in labels.iter().enumerate() {
            let label = label.trim().to_lowercase();
            if label.is_empty() {
                continue;
            }
            self.commands.insert(
                qualified_label(fallback_prefix, &label),
                Arc::clone(&command),
            );
            if self.commands.contains_key(&label) {
                debug!(label = %label, "bare command label already taken");
                continue;
            }
            self.commands.insert(label, Arc::clone(&command));
            if idx == 0 {
                bare_bound = true;
            }
        }
        bare_bound
    }

    /// Look a command up by label (bare or qualified). Case-insensitive.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<Arc<PluginCommand>> {
        self.commands.get(&label.trim().to_lowercase()).cloned()
    }

    /// Remove every label bound to commands owned by `owner`.
    pub fn unregister_owner(&mut self, owner: PluginInstanceId) {
        self.commands.retain(|_, cmd| cmd.owner != owner);
    }

    /// Number of bound labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether no labels are bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
