//! # Registry Configuration
//!
//! Settings for one registry level, layered from an optional file and
//! `COMPONENT_REGISTRY__*` environment variables through the `config` crate.

use crate::constants::{env, system};
use crate::error::{RegistryError, Result};
use crate::lifecycle::Environment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Name used in logs, events and error messages
    pub display_name: String,
    /// Eagerly create non-lazy shared definitions when the registry is built
    pub pre_instantiate_shared: bool,
    /// Run the destroy sequence when the registry is dropped without an explicit shutdown
    pub shutdown_on_drop: bool,
    /// Capacity of the container event broadcast channel
    pub event_channel_capacity: usize,
    /// Properties exposed to environment-aware objects and placeholder resolution
    pub properties: HashMap<String, String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            display_name: system::DEFAULT_DISPLAY_NAME.to_string(),
            pre_instantiate_shared: false,
            shutdown_on_drop: true,
            event_channel_capacity: system::DEFAULT_EVENT_CHANNEL_CAPACITY,
            properties: HashMap::new(),
        }
    }
}

impl RegistryConfig {
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    /// Load configuration from `COMPONENT_REGISTRY__*` environment variables
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(Self::environment_source())
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file (format picked by extension), with
    /// environment variables layered on top. A missing file is not an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(Self::environment_source())
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn environment_source() -> config::Environment {
        config::Environment::with_prefix(env::CONFIG_PREFIX)
            .prefix_separator(env::CONFIG_SEPARATOR)
            .separator(env::CONFIG_SEPARATOR)
            .try_parsing(true)
    }

    pub fn validate(&self) -> Result<()> {
        if self.display_name.trim().is_empty() {
            return Err(RegistryError::Configuration {
                message: "display_name cannot be empty".to_string(),
            });
        }

        if self.event_channel_capacity == 0 {
            return Err(RegistryError::Configuration {
                message: "event_channel_capacity must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Environment handed to environment-aware objects
    pub fn environment(&self) -> Environment {
        Environment::new(self.properties.clone())
    }
}
