//! The in-memory configuration document.

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::config::merge;

/// A plugin's configuration: a stored layer and a read-only default layer.
///
/// Reads consult the stored layer first and fall back to the defaults (see
/// [`merge`](crate::config::merge) for how nested mappings combine). Writes
/// only ever touch the stored layer, which is the only layer persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    stored: Mapping,
    defaults: Mapping,
    dirty: bool,
}

impl ConfigDocument {
    /// Create a document from a stored layer, with no defaults.
    #[must_use]
    pub fn new(stored: Mapping) -> Self {
        Self {
            stored,
            defaults: Mapping::new(),
            dirty: false,
        }
    }

    /// Attach a default layer.
    #[must_use]
    pub fn with_defaults(mut self, defaults: Mapping) -> Self {
        self.defaults = defaults;
        self
    }

    /// Replace the default layer.
    pub fn set_defaults(&mut self, defaults: Mapping) {
        self.defaults = defaults;
    }

    /// Look up a top-level key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        merge::resolve(&self.stored, &self.defaults, key)
    }

    /// Look up a dotted path such as `"database.pool.max"`.
    ///
    /// The first segment is resolved across both layers; the rest walks into
    /// the resulting mapping.
    #[must_use]
    pub fn get_nested(&self, path: &str) -> Option<Value> {
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            current = match current {
                Value::Mapping(map) => map.get(segment).cloned()?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Look up a key and deserialize it into `T`.
    ///
    /// Returns `None` if the key is absent or its value does not fit `T`.
    #[must_use]
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_nested(key).and_then(|v| serde_yaml::from_value(v).ok())
    }

    /// Whether a key resolves in either layer.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.stored.contains_key(key) || self.defaults.contains_key(key)
    }

    /// Set a top-level key in the stored layer.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.stored.insert(Value::String(key.into()), value.into());
        self.dirty = true;
    }

    /// Set a dotted path in the stored layer, creating intermediate mappings.
    ///
    /// Non-mapping values found on the way are replaced by mappings.
    pub fn set_nested(&mut self, path: &str, value: impl Into<Value>) {
        let mut segments: Vec<&str> = path.split('.').collect();
        let Some(last) = segments.pop() else {
            return;
        };

        let mut current = &mut self.stored;
        for segment in segments {
            let key = Value::String(segment.to_owned());
            let slot = current
                .entry(key)
                .or_insert_with(|| Value::Mapping(Mapping::new()));
            if !slot.is_mapping() {
                *slot = Value::Mapping(Mapping::new());
            }
            let Value::Mapping(next) = slot else {
                return;
            };
            current = next;
        }
        current.insert(Value::String(last.to_owned()), value.into());
        self.dirty = true;
    }

    /// Remove a top-level key from the stored layer, returning its old value.
    ///
    /// A default for the key, if any, becomes visible again.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.stored.shift_remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    /// Drop every stored key.
    pub fn clear(&mut self) {
        if !self.stored.is_empty() {
            self.dirty = true;
        }
        self.stored = Mapping::new();
    }

    /// Top-level keys of the merged view.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        merge::keys(&self.stored, &self.defaults)
            .into_iter()
            .filter_map(|k| match k {
                Value::String(s) => Some(s),
                other => serde_yaml::to_string(&other)
                    .ok()
                    .map(|s| s.trim_end().to_owned()),
            })
            .collect()
    }

    /// The merged view of both layers.
    #[must_use]
    pub fn all(&self) -> Mapping {
        merge::merged(&self.stored, &self.defaults)
    }

    /// The stored layer only; this is what gets persisted.
    #[must_use]
    pub fn stored(&self) -> &Mapping {
        &self.stored
    }

    /// The default layer only.
    #[must_use]
    pub fn defaults(&self) -> &Mapping {
        &self.defaults
    }

    /// Whether the stored layer changed since it was loaded or last saved.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }
}
