use super::states::LifecycleState;
use serde::{Deserialize, Serialize};
use std::fmt;

bitflags::bitflags! {
    /// Lifecycle hooks a managed object opts into.
    ///
    /// The orchestrator only invokes a hook when the matching flag is set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u32 {
        /// Receives its registered name
        const NAME_AWARE = 1 << 0;
        /// Receives the registry environment properties
        const ENVIRONMENT_AWARE = 1 << 1;
        /// Receives a weak back-reference to the owning registry
        const REGISTRY_AWARE = 1 << 2;
        /// Receives a placeholder value resolver
        const VALUE_RESOLVER_AWARE = 1 << 3;
        /// Receives the container event publisher
        const EVENT_PUBLISHER_AWARE = 1 << 4;
        /// Receives the message source
        const MESSAGE_SOURCE_AWARE = 1 << 5;
        /// Runs `after_properties_set` during initialization
        const INITIALIZING = 1 << 6;
        /// Runs `destroy` during teardown
        const DISPOSABLE = 1 << 7;
    }
}

impl Capabilities {
    /// Every awareness injection, without init/destroy hooks
    pub const ALL_AWARE: Self = Self::NAME_AWARE
        .union(Self::ENVIRONMENT_AWARE)
        .union(Self::REGISTRY_AWARE)
        .union(Self::VALUE_RESOLVER_AWARE)
        .union(Self::EVENT_PUBLISHER_AWARE)
        .union(Self::MESSAGE_SOURCE_AWARE);
}

/// Closed list of awareness injections, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwarenessStep {
    ObjectName,
    Environment,
    Registry,
    ValueResolver,
    EventPublisher,
    MessageSource,
}

impl AwarenessStep {
    /// Fixed total order of the injections
    pub const ORDER: [AwarenessStep; 6] = [
        AwarenessStep::ObjectName,
        AwarenessStep::Environment,
        AwarenessStep::Registry,
        AwarenessStep::ValueResolver,
        AwarenessStep::EventPublisher,
        AwarenessStep::MessageSource,
    ];

    /// Capability that enables this step
    pub fn capability(&self) -> Capabilities {
        match self {
            Self::ObjectName => Capabilities::NAME_AWARE,
            Self::Environment => Capabilities::ENVIRONMENT_AWARE,
            Self::Registry => Capabilities::REGISTRY_AWARE,
            Self::ValueResolver => Capabilities::VALUE_RESOLVER_AWARE,
            Self::EventPublisher => Capabilities::EVENT_PUBLISHER_AWARE,
            Self::MessageSource => Capabilities::MESSAGE_SOURCE_AWARE,
        }
    }

    /// State the object is in once this step has been passed
    pub fn state_after(&self) -> LifecycleState {
        match self {
            Self::ObjectName => LifecycleState::NameBound,
            _ => LifecycleState::EnvironmentBound,
        }
    }
}

impl fmt::Display for AwarenessStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ObjectName => write!(f, "object_name"),
            Self::Environment => write!(f, "environment"),
            Self::Registry => write!(f, "registry"),
            Self::ValueResolver => write!(f, "value_resolver"),
            Self::EventPublisher => write!(f, "event_publisher"),
            Self::MessageSource => write!(f, "message_source"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_covers_every_awareness_flag() {
        let combined = AwarenessStep::ORDER
            .iter()
            .fold(Capabilities::empty(), |acc, step| acc | step.capability());
        assert_eq!(combined, Capabilities::ALL_AWARE);
        assert!(!combined.contains(Capabilities::INITIALIZING));
    }

    #[test]
    fn test_name_step_comes_first() {
        assert_eq!(AwarenessStep::ORDER[0], AwarenessStep::ObjectName);
        assert_eq!(
            AwarenessStep::ObjectName.state_after(),
            LifecycleState::NameBound
        );
        assert_eq!(
            AwarenessStep::MessageSource.state_after(),
            LifecycleState::EnvironmentBound
        );
    }

    #[test]
    fn test_capabilities_compose() {
        let caps = Capabilities::NAME_AWARE | Capabilities::DISPOSABLE;
        assert!(caps.contains(Capabilities::NAME_AWARE));
        assert!(!caps.contains(Capabilities::INITIALIZING));
        assert_eq!(Capabilities::default(), Capabilities::empty());
    }
}
