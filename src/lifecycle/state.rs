//! Lifecycle states of the manager.

use std::fmt;

use serde::Serialize;

/// `Idle → Installing → Installed → Activating → Active`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Constructed, nothing seeded yet
    Idle,
    Installing,
    Installed,
    Activating,
    /// Intercepting requests with the current generation's policies
    Active,
}

impl LifecycleState {
    pub fn is_active(&self) -> bool {
        matches!(self, LifecycleState::Active)
    }

    /// States from which activation may start.
    pub fn can_activate(&self) -> bool {
        matches!(self, LifecycleState::Installed | LifecycleState::Active)
    }

    /// States from which installation may start.
    pub fn can_install(&self) -> bool {
        matches!(
            self,
            LifecycleState::Idle | LifecycleState::Installed | LifecycleState::Active
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Idle => "idle",
            LifecycleState::Installing => "installing",
            LifecycleState::Installed => "installed",
            LifecycleState::Activating => "activating",
            LifecycleState::Active => "active",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        assert!(LifecycleState::Idle.can_install());
        assert!(!LifecycleState::Idle.can_activate());
        assert!(LifecycleState::Installed.can_activate());
        assert!(!LifecycleState::Installing.can_install());
        assert!(!LifecycleState::Activating.can_activate());
        assert!(LifecycleState::Active.is_active());
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&LifecycleState::Activating).unwrap(),
            "\"activating\""
        );
        assert_eq!(LifecycleState::Installed.to_string(), "installed");
    }
}
