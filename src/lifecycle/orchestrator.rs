use super::capability::{AwarenessStep, Capabilities};
use super::object::ManagedObject;
use super::processors::ProcessorChain;
use super::services::{Environment, MessageSource, ValueResolver};
use super::states::LifecycleState;
use crate::constants::naming;
use crate::definition::{ConstructionContext, ManagedDefinition};
use crate::error::{RegistryError, Result};
use crate::events::EventPublisher;
use crate::logging::log_lifecycle_transition;
use crate::registry::RegistryHandle;
use crate::types::SharedObject;
use std::sync::Arc;
use tracing::{debug, warn};

/// Container services injected during the awareness steps
#[derive(Debug, Clone)]
pub struct ContainerServices {
    pub environment: Arc<Environment>,
    pub value_resolver: ValueResolver,
    pub events: EventPublisher,
    pub messages: Arc<dyn MessageSource>,
}

/// Drives the fixed callback sequence around creation and destruction of the
/// objects of one registry level.
///
/// Creation: constructor, awareness injections in [`AwarenessStep::ORDER`],
/// before-initialization processors, `after_properties_set`, the custom init
/// operation, after-initialization processors.
///
/// Destruction: destruction-aware processors, `destroy`, the custom destroy
/// operation. Every destruction step is attempted; the first failure is
/// returned.
pub struct LifecycleOrchestrator {
    registry_name: String,
    registry: RegistryHandle,
    services: ContainerServices,
    processors: Arc<ProcessorChain>,
}

impl LifecycleOrchestrator {
    pub fn new(
        registry_name: impl Into<String>,
        registry: RegistryHandle,
        services: ContainerServices,
        processors: Arc<ProcessorChain>,
    ) -> Self {
        Self {
            registry_name: registry_name.into(),
            registry,
            services,
            processors,
        }
    }

    pub fn services(&self) -> &ContainerServices {
        &self.services
    }

    pub fn processors(&self) -> &ProcessorChain {
        &self.processors
    }

    /// Construct and fully initialize one object
    pub fn create(
        &self,
        definition: &ManagedDefinition,
        context: &ConstructionContext,
    ) -> Result<Box<dyn ManagedObject>> {
        let name = definition.name();
        let constructor = definition.constructor().ok_or_else(|| {
            RegistryError::definition_store(name, "definition has no constructor")
        })?;

        debug!(registry = %self.registry_name, name = %name, "Constructing managed object");
        let object = constructor(context)
            .map_err(|e| RegistryError::from_hook(name, LifecycleState::Unconstructed, e))?;
        self.transition(name, LifecycleState::Unconstructed, LifecycleState::Constructed);

        self.initialize(object, definition)
    }

    /// Run awareness injections and initialization on a constructed object
    pub fn initialize(
        &self,
        mut object: Box<dyn ManagedObject>,
        definition: &ManagedDefinition,
    ) -> Result<Box<dyn ManagedObject>> {
        let name = definition.name();
        let mut state = LifecycleState::Constructed;

        let capabilities = object.capabilities();
        for step in AwarenessStep::ORDER {
            if capabilities.contains(step.capability()) {
                self.inject(object.as_mut(), step, name)
                    .map_err(|e| RegistryError::from_hook(name, state, e))?;
            }
            let next = step.state_after();
            if next != state {
                self.transition(name, state, next);
                state = next;
            }
        }

        for processor in self.processors.post_processors() {
            object = processor
                .before_initialization(object, name)
                .map_err(|e| RegistryError::from_hook(name, state, e))?;
        }
        self.transition(name, state, LifecycleState::PreInitialized);
        state = LifecycleState::PreInitialized;

        // A processor may have replaced the object
        let capabilities = object.capabilities();
        if capabilities.contains(Capabilities::INITIALIZING) {
            object
                .after_properties_set()
                .map_err(|e| RegistryError::from_hook(name, state, e))?;
        }
        if let Some(init) = definition.init_operation() {
            let shadowed = init.name() == naming::AFTER_PROPERTIES_SET
                && capabilities.contains(Capabilities::INITIALIZING);
            if !shadowed {
                init.invoke(object.as_mut())
                    .map_err(|e| RegistryError::from_hook(name, state, e))?;
            }
        }
        self.transition(name, state, LifecycleState::Initialized);

        let object = self.apply_after_initialization(object, name)?;
        self.transition(name, LifecycleState::Initialized, LifecycleState::InUse);
        Ok(object)
    }

    /// After-initialization processors only; applied to producer products
    pub fn apply_after_initialization(
        &self,
        mut object: Box<dyn ManagedObject>,
        name: &str,
    ) -> Result<Box<dyn ManagedObject>> {
        for processor in self.processors.post_processors() {
            object = processor
                .after_initialization(object, name)
                .map_err(|e| RegistryError::from_hook(name, LifecycleState::Initialized, e))?;
        }
        Ok(object)
    }

    /// Run the destroy sequence of one object
    pub fn destroy(
        &self,
        name: &str,
        object: &SharedObject,
        definition: Option<&ManagedDefinition>,
    ) -> Result<()> {
        let mut first_error: Option<RegistryError> = None;
        let mut record = |error: anyhow::Error| {
            let error = RegistryError::from_hook(name, LifecycleState::PreDestroy, error);
            warn!(
                registry = %self.registry_name,
                name = %name,
                error = %error,
                "Destroy step failed"
            );
            first_error.get_or_insert(error);
        };

        self.transition(name, LifecycleState::InUse, LifecycleState::PreDestroy);
        let target = object.as_ref();

        for processor in self.processors.destruction_processors() {
            if processor.requires_destruction(target) {
                if let Err(e) = processor.before_destruction(target, name) {
                    record(e);
                }
            }
        }

        let capabilities = target.capabilities();
        if capabilities.contains(Capabilities::DISPOSABLE) {
            if let Err(e) = target.destroy() {
                record(e);
            }
        }

        if let Some(operation) = definition.and_then(ManagedDefinition::destroy_operation) {
            let shadowed = operation.name() == naming::DESTROY
                && capabilities.contains(Capabilities::DISPOSABLE);
            if !shadowed {
                if let Err(e) = operation.invoke(target) {
                    record(e);
                }
            }
        }

        self.transition(name, LifecycleState::PreDestroy, LifecycleState::Destroyed);
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn inject(
        &self,
        object: &mut (dyn ManagedObject + 'static),
        step: AwarenessStep,
        name: &str,
    ) -> anyhow::Result<()> {
        match step {
            AwarenessStep::ObjectName => object.set_object_name(name),
            AwarenessStep::Environment => {
                object.set_environment(Arc::clone(&self.services.environment))
            }
            AwarenessStep::Registry => object.set_registry(self.registry.clone()),
            AwarenessStep::ValueResolver => {
                object.set_value_resolver(self.services.value_resolver.clone())
            }
            AwarenessStep::EventPublisher => {
                object.set_event_publisher(self.services.events.clone())
            }
            AwarenessStep::MessageSource => {
                object.set_message_source(Arc::clone(&self.services.messages))
            }
        }
    }

    fn transition(&self, name: &str, from: LifecycleState, to: LifecycleState) {
        log_lifecycle_transition(&self.registry_name, name, from, to);
    }
}

impl std::fmt::Debug for LifecycleOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleOrchestrator")
            .field("registry_name", &self.registry_name)
            .field("processors", &self.processors)
            .finish()
    }
}
