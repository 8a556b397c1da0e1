//! Plugin lifecycle state machine.
//!
//! ```text
//! Uninitialized --initialize--> Disabled
//! Disabled --set_enabled(true)--> Enabled     (enable edge)
//! Enabled --set_enabled(false)--> Disabled    (disable edge)
//! ```
//!
//! Initialization is monotonic: nothing leads back to `Uninitialized`.
//! The controller only reports edges; [`PluginHandle`](crate::PluginHandle)
//! turns an edge into the matching user hook after the state has flipped.

use std::fmt;

/// The lifecycle state of a plugin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Constructed but `initialize` has not run.
    #[default]
    Uninitialized,
    /// Initialized and not enabled.
    Disabled,
    /// Initialized and enabled.
    Enabled,
}

impl LifecycleState {
    /// Whether `initialize` has run.
    #[must_use]
    pub fn is_initialized(self) -> bool {
        !matches!(self, Self::Uninitialized)
    }

    /// Whether the plugin is enabled.
    #[must_use]
    pub fn is_enabled(self) -> bool {
        matches!(self, Self::Enabled)
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::Disabled => "disabled",
            Self::Enabled => "enabled",
        })
    }
}

/// A state edge that must be announced to the plugin's hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// `Disabled -> Enabled`; fires the enable hook.
    Enable,
    /// `Enabled -> Disabled`; fires the disable hook.
    Disable,
}

/// Owns the lifecycle state and guards every change to it.
#[derive(Debug, Clone, Default)]
pub struct LifecycleController {
    state: LifecycleState,
}

impl LifecycleController {
    /// Create a controller in the `Uninitialized` state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Move from `Uninitialized` to `Disabled`.
    ///
    /// Returns `true` only for the call that performed the transition, so the
    /// caller knows whether to run its one-time binding. Later calls are no-ops.
    pub fn initialize(&mut self) -> bool {
        if self.state.is_initialized() {
            return false;
        }
        self.state = LifecycleState::Disabled;
        true
    }

    /// Request an enabled flag value.
    ///
    /// The state is updated before this returns, so anything run for the
    /// returned edge observes the new value. Returns `None` when the request
    /// matches the current flag or the controller is not yet initialized.
    pub fn set_enabled(&mut self, target: bool) -> Option<Transition> {
        match (self.state, target) {
            (LifecycleState::Disabled, true) => {
                self.state = LifecycleState::Enabled;
                Some(Transition::Enable)
            },
            (LifecycleState::Enabled, false) => {
                self.state = LifecycleState::Disabled;
                Some(Transition::Disable)
            },
            _ => None,
        }
    }

    /// Whether `initialize` has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    /// Whether the plugin is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state.is_enabled()
    }

    /// Always `!is_enabled()`.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        !self.is_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uninitialized() {
        let ctl = LifecycleController::new();
        assert_eq!(ctl.state(), LifecycleState::Uninitialized);
        assert!(!ctl.is_initialized());
        assert!(!ctl.is_enabled());
        assert!(ctl.is_disabled());
    }

    #[test]
    fn initialize_runs_once() {
        let mut ctl = LifecycleController::new();
        assert!(ctl.initialize());
        assert!(!ctl.initialize());
        assert_eq!(ctl.state(), LifecycleState::Disabled);
    }

    #[test]
    fn set_enabled_before_initialize_is_noop() {
        let mut ctl = LifecycleController::new();
        assert_eq!(ctl.set_enabled(true), None);
        assert_eq!(ctl.state(), LifecycleState::Uninitialized);
    }

    #[test]
    fn edges_reported_once() {
        let mut ctl = LifecycleController::new();
        ctl.initialize();

        assert_eq!(ctl.set_enabled(false), None);
        assert_eq!(ctl.set_enabled(true), Some(Transition::Enable));
        assert!(ctl.is_enabled());
        assert_eq!(ctl.set_enabled(true), None);
        assert_eq!(ctl.set_enabled(false), Some(Transition::Disable));
        assert!(ctl.is_disabled());
        assert_eq!(ctl.set_enabled(false), None);
    }

    #[test]
    fn disabling_never_uninitializes() {
        let mut ctl = LifecycleController::new();
        ctl.initialize();
        ctl.set_enabled(true);
        ctl.set_enabled(false);
        assert!(ctl.is_initialized());
        assert!(!ctl.initialize());
    }

    #[test]
    fn edge_counts_match_flag_changes() {
        let mut ctl = LifecycleController::new();
        ctl.initialize();

        let requests = [true, true, false, true, false, false, true, false, true];
        let mut enables = 0u32;
        let mut disables = 0u32;
        let mut expected_enables = 0u32;
        let mut expected_disables = 0u32;
        let mut last = false;
        for target in requests {
            match (last, target) {
                (false, true) => expected_enables = expected_enables.saturating_add(1),
                (true, false) => expected_disables = expected_disables.saturating_add(1),
                _ => {},
            }
            last = target;
            match ctl.set_enabled(target) {
                Some(Transition::Enable) => enables = enables.saturating_add(1),
                Some(Transition::Disable) => disables = disables.saturating_add(1),
                None => {},
            }
            assert_eq!(ctl.is_enabled(), target);
            assert_eq!(ctl.is_disabled(), !target);
        }
        assert_eq!(enables, expected_enables);
        assert_eq!(disables, expected_disables);
    }

    #[test]
    fn state_display() {
        assert_eq!(LifecycleState::Uninitialized.to_string(), "uninitialized");
        assert_eq!(LifecycleState::Enabled.to_string(), "enabled");
    }
}
