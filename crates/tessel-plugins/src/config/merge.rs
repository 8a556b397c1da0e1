//! Default-layer overlay.
//!
//! The stored layer wins over the default layer key by key. When both layers
//! hold a mapping under the same top-level key, the two mappings are combined
//! one level deep: second-level keys from the stored mapping replace those of
//! the default mapping, and anything below that is taken wholesale from
//! whichever layer supplied the second-level key.

use serde_yaml::{Mapping, Value};

/// Resolve a single top-level key across both layers.
#[must_use]
pub fn resolve(stored: &Mapping, defaults: &Mapping, key: &str) -> Option<Value> {
    match (stored.get(key), defaults.get(key)) {
        (Some(Value::Mapping(s)), Some(Value::Mapping(d))) => {
            Some(Value::Mapping(overlay_mapping(s, d)))
        },
        (Some(s), _) => Some(s.clone()),
        (None, Some(d)) => Some(d.clone()),
        (None, None) => None,
    }
}

/// Build the merged view of both layers.
///
/// Key order: stored keys in stored order, then default-only keys in default
/// order.
#[must_use]
pub fn merged(stored: &Mapping, defaults: &Mapping) -> Mapping {
    let mut out = Mapping::with_capacity(stored.len().max(defaults.len()));
    for (key, value) in stored {
        let merged_value = match (value, defaults.get(key)) {
            (Value::Mapping(s), Some(Value::Mapping(d))) => Value::Mapping(overlay_mapping(s, d)),
            _ => value.clone(),
        };
        out.insert(key.clone(), merged_value);
    }
    for (key, value) in defaults {
        if !stored.contains_key(key) {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}

/// Keys present in either layer, in merged order.
#[must_use]
pub fn keys(stored: &Mapping, defaults: &Mapping) -> Vec<Value> {
    stored
        .keys()
        .chain(defaults.keys().filter(|k| !stored.contains_key(*k)))
        .cloned()
        .collect()
}

fn overlay_mapping(stored: &Mapping, defaults: &Mapping) -> Mapping {
    let mut out = Mapping::with_capacity(stored.len().max(defaults.len()));
    for (key, value) in stored {
        out.insert(key.clone(), value.clone());
    }
    for (key, value) in defaults {
        if !stored.contains_key(key) {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}
