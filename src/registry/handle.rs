use super::container::Registry;
use super::object_factory::{ObjectFactory, ObjectFactoryExt};
use crate::error::{RegistryError, Result};
use crate::lifecycle::ManagedObject;
use crate::types::SharedObject;
use std::fmt;
use std::sync::{Arc, Weak};

/// Non-owning reference to a registry, handed to registry-aware objects.
///
/// Holding a handle never keeps the registry alive; lookups through a handle
/// whose registry is gone fail with `CreationNotAllowed`.
#[derive(Clone)]
pub struct RegistryHandle {
    registry: Weak<Registry>,
}

impl RegistryHandle {
    pub(crate) fn new(registry: Weak<Registry>) -> Self {
        Self { registry }
    }

    /// Handle that refers to no registry
    pub fn detached() -> Self {
        Self {
            registry: Weak::new(),
        }
    }

    pub fn upgrade(&self) -> Option<Arc<Registry>> {
        self.registry.upgrade()
    }

    pub fn is_alive(&self) -> bool {
        self.registry.strong_count() > 0
    }

    pub fn get_object(&self, name: &str) -> Result<SharedObject> {
        self.live(name)?.get_object(name)
    }

    pub fn get<T: ManagedObject>(&self, name: &str) -> Result<Arc<T>> {
        self.live(name)?.get::<T>(name)
    }

    fn live(&self, name: &str) -> Result<Arc<Registry>> {
        self.upgrade().ok_or_else(|| RegistryError::CreationNotAllowed {
            name: name.to_string(),
            reason: "registry has been dropped".to_string(),
        })
    }
}

impl fmt::Debug for RegistryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}
