use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of one managed object, in the order the orchestrator
/// drives it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Definition known, constructor not yet invoked
    Unconstructed,
    /// Bare instance returned by the constructor
    Constructed,
    /// Registered name assigned
    NameBound,
    /// Environment and remaining container services assigned
    EnvironmentBound,
    /// Before-initialization processors applied
    PreInitialized,
    /// Declared and custom initialization completed
    Initialized,
    /// After-initialization processors applied, visible to callers
    InUse,
    /// Destruction-aware processors running
    PreDestroy,
    /// Destroy sequence completed
    Destroyed,
}

impl LifecycleState {
    /// Whether the object may be handed to callers
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::InUse)
    }

    /// Whether the object is being or has been torn down
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::PreDestroy | Self::Destroyed)
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::Unconstructed
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconstructed => write!(f, "unconstructed"),
            Self::Constructed => write!(f, "constructed"),
            Self::NameBound => write!(f, "name_bound"),
            Self::EnvironmentBound => write!(f, "environment_bound"),
            Self::PreInitialized => write!(f, "pre_initialized"),
            Self::Initialized => write!(f, "initialized"),
            Self::InUse => write!(f, "in_use"),
            Self::PreDestroy => write!(f, "pre_destroy"),
            Self::Destroyed => write!(f, "destroyed"),
        }
    }
}

impl std::str::FromStr for LifecycleState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unconstructed" => Ok(Self::Unconstructed),
            "constructed" => Ok(Self::Constructed),
            "name_bound" => Ok(Self::NameBound),
            "environment_bound" => Ok(Self::EnvironmentBound),
            "pre_initialized" => Ok(Self::PreInitialized),
            "initialized" => Ok(Self::Initialized),
            "in_use" => Ok(Self::InUse),
            "pre_destroy" => Ok(Self::PreDestroy),
            "destroyed" => Ok(Self::Destroyed),
            _ => Err(format!("Invalid lifecycle state: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_states_are_ordered() {
        assert!(LifecycleState::Unconstructed < LifecycleState::Constructed);
        assert!(LifecycleState::NameBound < LifecycleState::EnvironmentBound);
        assert!(LifecycleState::PreInitialized < LifecycleState::Initialized);
        assert!(LifecycleState::InUse < LifecycleState::PreDestroy);
    }

    #[test]
    fn test_state_checks() {
        assert!(LifecycleState::InUse.is_usable());
        assert!(!LifecycleState::Initialized.is_usable());
        assert!(LifecycleState::Destroyed.is_terminal());
        assert!(!LifecycleState::InUse.is_terminal());
    }

    #[test]
    fn test_state_string_conversion() {
        assert_eq!(LifecycleState::EnvironmentBound.to_string(), "environment_bound");
        assert_eq!(
            "pre_destroy".parse::<LifecycleState>().unwrap(),
            LifecycleState::PreDestroy
        );
        assert!("half_built".parse::<LifecycleState>().is_err());
    }

    #[test]
    fn test_state_serde() {
        let json = serde_json::to_string(&LifecycleState::InUse).unwrap();
        assert_eq!(json, "\"in_use\"");
        let state: LifecycleState = serde_json::from_str("\"name_bound\"").unwrap();
        assert_eq!(state, LifecycleState::NameBound);
    }
}
