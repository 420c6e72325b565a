//! # System Constants
//!
//! Core constants that define the naming conventions, event names and
//! operational defaults of the component registry.

/// Container events published on the registry's [`crate::events::EventPublisher`]
pub mod events {
    // Object lifecycle events
    pub const OBJECT_CREATED: &str = "object.created";
    pub const OBJECT_DESTROYED: &str = "object.destroyed";
    pub const OBJECT_DESTROY_FAILED: &str = "object.destroy_failed";

    // Registry lifecycle events
    pub const REGISTRY_READY: &str = "registry.ready";
    pub const REGISTRY_CLOSED: &str = "registry.closed";
}

/// Naming conventions
pub mod naming {
    /// Prefix that asks for the producer itself instead of the object it produces
    pub const FACTORY_DEREFERENCE_PREFIX: char = '&';

    /// Reserved name of the declared initialization hook
    pub const AFTER_PROPERTIES_SET: &str = "after_properties_set";

    /// Reserved name of the declared destroy hook
    pub const DESTROY: &str = "destroy";
}

/// Environment variable names
pub mod env {
    /// Prefix for configuration overrides (`COMPONENT_REGISTRY__DISPLAY_NAME=...`)
    pub const CONFIG_PREFIX: &str = "COMPONENT_REGISTRY";

    /// Separator between prefix and nested keys
    pub const CONFIG_SEPARATOR: &str = "__";

    /// Deployment environment used to pick a default log level
    pub const ENVIRONMENT: &str = "COMPONENT_REGISTRY_ENV";

    /// `json` switches console logging to JSON lines
    pub const LOG_FORMAT: &str = "COMPONENT_REGISTRY_LOG_FORMAT";
}

/// System-wide defaults
pub mod system {
    /// Default display name of a registry
    pub const DEFAULT_DISPLAY_NAME: &str = "registry";

    /// Default capacity of the container event channel
    pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1024;

    /// Maximum number of ancestors walked when validating a registry chain
    pub const MAX_CHAIN_DEPTH: usize = 64;

    /// Version compatibility marker
    pub const REGISTRY_CORE_VERSION: &str = "0.1.0";
}
