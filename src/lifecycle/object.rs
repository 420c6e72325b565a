use super::capability::Capabilities;
use super::services::{Environment, MessageSource, ValueResolver};
use crate::events::EventPublisher;
use crate::registry::{ObjectProducer, RegistryHandle};
use crate::types::TypeDescriptor;
use downcast_rs::{impl_downcast, DowncastSync};
use std::sync::Arc;

/// An application component whose creation and lifetime the registry controls.
///
/// Every hook has a no-op default. The orchestrator only calls a hook when
/// the object advertises the matching flag from [`ManagedObject::capabilities`],
/// so overriding a hook without advertising it has no effect.
///
/// ```
/// use component_registry::lifecycle::{Capabilities, ManagedObject};
///
/// struct Mailer {
///     name: String,
/// }
///
/// impl ManagedObject for Mailer {
///     fn capabilities(&self) -> Capabilities {
///         Capabilities::NAME_AWARE
///     }
///
///     fn set_object_name(&mut self, name: &str) -> anyhow::Result<()> {
///         self.name = name.to_string();
///         Ok(())
///     }
/// }
/// ```
pub trait ManagedObject: DowncastSync {
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }

    /// Concrete runtime type of the object
    fn object_type(&self) -> TypeDescriptor {
        TypeDescriptor::of::<Self>()
    }

    fn set_object_name(&mut self, _name: &str) -> anyhow::Result<()> {
        Ok(())
    }

    fn set_environment(&mut self, _environment: Arc<Environment>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Receives a non-owning handle to the registry that created the object
    fn set_registry(&mut self, _registry: RegistryHandle) -> anyhow::Result<()> {
        Ok(())
    }

    fn set_value_resolver(&mut self, _resolver: ValueResolver) -> anyhow::Result<()> {
        Ok(())
    }

    fn set_event_publisher(&mut self, _publisher: EventPublisher) -> anyhow::Result<()> {
        Ok(())
    }

    fn set_message_source(&mut self, _source: Arc<dyn MessageSource>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Declared initialization, after every awareness injection and
    /// before-initialization processor
    fn after_properties_set(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Declared teardown, run once at registry shutdown for shared objects
    fn destroy(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Producer view of this object. An object that produces other objects
    /// returns `Some(self)`; lookups then return its product unless the
    /// request name carries the `&` prefix.
    fn as_producer(&self) -> Option<&dyn ObjectProducer> {
        None
    }
}

impl_downcast!(sync ManagedObject);

impl std::fmt::Debug for dyn ManagedObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagedObject")
            .field("type", &self.object_type().short_name())
            .field("capabilities", &self.capabilities())
            .finish()
    }
}
