use super::builder::RegistryBuilder;
use super::dereference::{dereference_name, ObjectName};
use super::handle::RegistryHandle;
use super::object_factory::ObjectFactory;
use crate::alias::AliasIndex;
use crate::config::RegistryConfig;
use crate::constants::{events, naming};
use crate::definition::{ConstructionContext, DefinitionStore, ManagedDefinition, ScopeKind};
use crate::error::{RegistryError, Result};
use crate::events::{EventPublisher, PublishedEvent};
use crate::lifecycle::{
    ContainerServices, DestructionAwareProcessor, LifecycleOrchestrator, LifecycleState,
    MessageSource, ObjectPostProcessor, ProcessorChain, ValueResolver,
};
use crate::logging::log_registry_operation;
use crate::scope::tracking::CreationGuard;
use crate::scope::{CacheState, CustomScope, ScopeCache};
use crate::types::{ConstructionArgs, RegistryId, SharedObject, TypeDescriptor};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Outcome of [`Registry::shutdown`]
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// Objects whose destroy sequence completed, in destruction order
    pub destroyed: Vec<String>,
    /// Objects whose destroy sequence raised, in destruction order
    pub failures: Vec<DestroyFailure>,
}

impl ShutdownReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Every object the shutdown attempted to destroy, in order
    pub fn attempted(&self) -> usize {
        self.destroyed.len() + self.failures.len()
    }
}

/// Context of the `registry.closed` event
#[derive(Debug, Serialize)]
struct ClosedEvent<'a> {
    registry: &'a str,
    destroyed: usize,
    failures: usize,
}

#[derive(Debug, Clone)]
pub struct DestroyFailure {
    pub name: String,
    pub error: RegistryError,
}

/// Point-in-time counters of one registry level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub registry_id: RegistryId,
    pub display_name: String,
    pub definitions: usize,
    pub aliases: usize,
    pub shared_instances: usize,
    pub cached_products: usize,
    pub custom_scopes: usize,
    pub post_processors: usize,
    pub destruction_processors: usize,
    pub has_parent: bool,
    pub closed: bool,
}

/// One level of a hierarchical managed-object container.
///
/// Owns its definitions, aliases, shared-instance cache and processors, and
/// holds a weak reference to an optional parent. Requests for names this
/// level does not define are delegated to the parent unchanged; a local
/// definition always shadows an ancestor's.
///
/// ```
/// use component_registry::definition::ManagedDefinition;
/// use component_registry::lifecycle::ManagedObject;
/// use component_registry::registry::{ObjectFactoryExt, Registry};
/// use std::sync::Arc;
///
/// struct Clock;
///
/// impl ManagedObject for Clock {}
///
/// let registry = Registry::builder()
///     .definition(ManagedDefinition::shared("clock").constructs(|_| Ok(Clock)).build().unwrap())
///     .alias("time", "clock")
///     .build()
///     .unwrap();
///
/// let clock = registry.get::<Clock>("clock").unwrap();
/// let time = registry.get::<Clock>("time").unwrap();
/// assert!(Arc::ptr_eq(&clock, &time));
/// ```
pub struct Registry {
    id: RegistryId,
    config: RegistryConfig,
    self_ref: Weak<Registry>,
    parent: Option<Weak<dyn ObjectFactory>>,
    definitions: DefinitionStore,
    aliases: AliasIndex,
    shared: ScopeCache,
    products: ScopeCache,
    scopes: DashMap<String, Arc<dyn CustomScope>>,
    processors: Arc<ProcessorChain>,
    orchestrator: LifecycleOrchestrator,
    events: EventPublisher,
    closed: AtomicBool,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub(crate) fn create(
        config: RegistryConfig,
        parent: Option<Weak<dyn ObjectFactory>>,
        messages: Arc<dyn MessageSource>,
    ) -> Arc<Self> {
        let environment = Arc::new(config.environment());
        let events = EventPublisher::new(config.event_channel_capacity);
        let processors = Arc::new(ProcessorChain::new());
        let services = ContainerServices {
            value_resolver: ValueResolver::new(Arc::clone(&environment)),
            environment,
            events: events.clone(),
            messages,
        };

        Arc::new_cyclic(|self_ref| Self {
            id: RegistryId::next(),
            shared: ScopeCache::new(format!("{} shared cache", config.display_name)),
            products: ScopeCache::new(format!("{} product cache", config.display_name)),
            orchestrator: LifecycleOrchestrator::new(
                config.display_name.clone(),
                RegistryHandle::new(self_ref.clone()),
                services,
                Arc::clone(&processors),
            ),
            config,
            self_ref: self_ref.clone(),
            parent,
            definitions: DefinitionStore::new(),
            aliases: AliasIndex::new(),
            scopes: DashMap::new(),
            processors,
            events,
            closed: AtomicBool::new(false),
        })
    }

    pub fn id(&self) -> RegistryId {
        self.id
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Non-owning handle to this registry
    pub fn handle(&self) -> RegistryHandle {
        RegistryHandle::new(self.self_ref.clone())
    }

    pub fn events(&self) -> &EventPublisher {
        &self.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PublishedEvent> {
        self.events.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    // ---- registration -------------------------------------------------

    pub fn register_definition(&self, definition: ManagedDefinition) -> Result<()> {
        if self.is_closed() {
            return Err(self.closed_error(definition.name()));
        }
        if self.aliases.is_alias(definition.name()) {
            return Err(RegistryError::ConflictingAlias {
                alias: definition.name().to_string(),
                existing: self.aliases.canonical_name(definition.name()),
                requested: definition.name().to_string(),
            });
        }

        let definition = self.definitions.register(definition)?;
        debug!(
            registry = %self.config.display_name,
            name = %definition.name(),
            scope = %definition.scope(),
            "Definition registered"
        );
        Ok(())
    }

    pub fn register_alias(&self, alias: &str, target: &str) -> Result<()> {
        for name in [alias, target] {
            if name.trim().is_empty() || name.starts_with(naming::FACTORY_DEREFERENCE_PREFIX) {
                return Err(RegistryError::definition_store(
                    name,
                    "alias and target must be plain, non-empty names",
                ));
            }
        }
        if alias != target && self.definitions.contains(alias) {
            return Err(RegistryError::ConflictingAlias {
                alias: alias.to_string(),
                existing: alias.to_string(),
                requested: target.to_string(),
            });
        }

        self.aliases.register(alias, target)?;
        debug!(
            registry = %self.config.display_name,
            alias = %alias,
            target = %target,
            "Alias registered"
        );
        Ok(())
    }

    pub fn add_post_processor(&self, processor: Arc<dyn ObjectPostProcessor>) {
        self.processors.add_post_processor(processor);
    }

    pub fn add_destruction_processor(&self, processor: Arc<dyn DestructionAwareProcessor>) {
        self.processors.add_destruction_processor(processor);
    }

    /// Register the storage strategy for `ScopeKind::Custom(scope_name)`
    /// definitions, replacing any earlier one
    pub fn register_scope(&self, scope_name: &str, scope: Arc<dyn CustomScope>) -> Result<()> {
        let reserved = ScopeKind::Shared.to_string() == scope_name
            || ScopeKind::Independent.to_string() == scope_name;
        if scope_name.trim().is_empty() || reserved {
            return Err(RegistryError::definition_store(
                scope_name,
                "custom scope name is empty or reserved",
            ));
        }

        if self.scopes.insert(scope_name.to_string(), scope).is_some() {
            debug!(registry = %self.config.display_name, scope = %scope_name, "Custom scope replaced");
        }
        Ok(())
    }

    // ---- local inspection ---------------------------------------------

    /// Local definition for a name or alias
    pub fn definition(&self, name: &str) -> Option<Arc<ManagedDefinition>> {
        let requested = ObjectName::parse(name);
        self.definitions
            .lookup(&self.aliases.canonical_name(requested.base()))
    }

    /// Local definition names in registration order
    pub fn definition_names(&self) -> Vec<String> {
        self.definitions.names()
    }

    /// Cache state of a local shared object
    pub fn cache_state(&self, name: &str) -> CacheState {
        self.shared
            .state(&self.aliases.canonical_name(ObjectName::parse(name).base()))
    }

    /// Shared objects created so far, in creation order
    pub fn shared_object_names(&self) -> Vec<String> {
        self.shared.ready_names()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            registry_id: self.id,
            display_name: self.config.display_name.clone(),
            definitions: self.definitions.len(),
            aliases: self.aliases.len(),
            shared_instances: self.shared.len(),
            cached_products: self.products.len(),
            custom_scopes: self.scopes.len(),
            post_processors: self.processors.post_processor_count(),
            destruction_processors: self.processors.destruction_processor_count(),
            has_parent: self.parent.is_some(),
            closed: self.is_closed(),
        }
    }

    // ---- lifecycle ----------------------------------------------------

    /// Create every shared, non-abstract, non-lazy local definition in
    /// registration order. Producers are created, not their products.
    pub fn pre_instantiate_shared(&self) -> Result<usize> {
        let mut created = 0;
        for definition in self.definitions.definitions() {
            if definition.is_abstract() || !definition.is_shared() || definition.is_lazy() {
                continue;
            }
            let request = if self.is_producer_definition(&definition) {
                dereference_name(definition.name())
            } else {
                definition.name().to_string()
            };
            self.get_object(&request)?;
            created += 1;
        }

        log_registry_operation(
            "pre_instantiate_shared",
            &self.config.display_name,
            None,
            "completed",
            Some(&format!("{created} objects")),
        );
        Ok(created)
    }

    /// Destroy every cached shared object in reverse creation order.
    ///
    /// A failing destroy sequence is recorded and the remaining objects are
    /// still destroyed. Later calls are no-ops.
    pub fn shutdown(&self) -> ShutdownReport {
        if self.closed.swap(true, Ordering::SeqCst) {
            return ShutdownReport::default();
        }

        info!(registry = %self.config.display_name, "Shutting down registry");
        self.products.drain_for_destruction();

        let mut report = ShutdownReport::default();
        for (name, object) in self.shared.drain_for_destruction() {
            let definition = self.definitions.lookup(&name);
            match self
                .orchestrator
                .destroy(&name, &object, definition.as_deref())
            {
                Ok(()) => {
                    self.publish(events::OBJECT_DESTROYED, json!({
                        "registry": self.config.display_name,
                        "name": name,
                    }));
                    report.destroyed.push(name);
                }
                Err(error) => {
                    warn!(
                        registry = %self.config.display_name,
                        name = %name,
                        error = %error,
                        "Destroy sequence failed"
                    );
                    self.publish(events::OBJECT_DESTROY_FAILED, json!({
                        "registry": self.config.display_name,
                        "name": name,
                        "error": error.to_string(),
                    }));
                    report.failures.push(DestroyFailure { name, error });
                }
            }
        }

        self.publish(
            events::REGISTRY_CLOSED,
            ClosedEvent {
                registry: &self.config.display_name,
                destroyed: report.destroyed.len(),
                failures: report.failures.len(),
            },
        );
        log_registry_operation(
            "shutdown",
            &self.config.display_name,
            None,
            if report.is_clean() { "completed" } else { "completed_with_failures" },
            Some(&format!(
                "{} destroyed, {} failed",
                report.destroyed.len(),
                report.failures.len()
            )),
        );
        report
    }

    /// Remove a custom-scoped object from its scope and run its destroy
    /// sequence. Returns `false` when the scope held no such object.
    pub fn destroy_scoped_object(&self, name: &str) -> Result<bool> {
        let canonical = self.aliases.canonical_name(ObjectName::parse(name).base());
        let definition = self
            .definitions
            .lookup(&canonical)
            .ok_or_else(|| RegistryError::no_such_definition(&canonical, "not defined locally"))?;
        let ScopeKind::Custom(scope_name) = definition.scope() else {
            return Err(RegistryError::definition_store(
                &canonical,
                "object is not custom-scoped",
            ));
        };

        let scope = self.custom_scope(&canonical, scope_name)?;
        match scope.remove(&canonical) {
            Some(object) => {
                self.orchestrator
                    .destroy(&canonical, &object, Some(&definition))?;
                self.publish(events::OBJECT_DESTROYED, json!({
                    "registry": self.config.display_name,
                    "name": canonical,
                    "scope": scope_name,
                }));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    // ---- resolution ---------------------------------------------------

    fn resolve(
        &self,
        name: &str,
        required: Option<TypeDescriptor>,
        args: Option<ConstructionArgs>,
    ) -> Result<SharedObject> {
        let requested = ObjectName::parse(name);
        let canonical = self.aliases.canonical_name(requested.base());

        let Some(definition) = self.definitions.lookup(&canonical) else {
            return self.delegate(name, &requested.with_base(&canonical), required, args);
        };

        if definition.is_abstract() {
            return Err(RegistryError::no_such_definition(
                &canonical,
                "definition is abstract",
            ));
        }
        if args.is_some() && !definition.is_independent() {
            return Err(RegistryError::definition_store(
                &canonical,
                format!(
                    "explicit construction arguments require independent scope, definition is {}",
                    definition.scope()
                ),
            ));
        }

        let instance = self.instance_for(&canonical, &definition, args)?;
        let object = self.dereference(&requested, &canonical, &definition, instance)?;
        check_type(name, &object, required)?;
        Ok(object)
    }

    fn delegate(
        &self,
        name: &str,
        request: &str,
        required: Option<TypeDescriptor>,
        args: Option<ConstructionArgs>,
    ) -> Result<SharedObject> {
        let Some(parent) = self.parent_registry() else {
            return Err(RegistryError::no_such_definition(
                name,
                format!("not defined in '{}' or any ancestor", self.config.display_name),
            ));
        };

        debug!(
            registry = %self.config.display_name,
            parent = %parent.display_name(),
            name = %request,
            "Delegating lookup to parent"
        );
        match (required, args) {
            (required, Some(args)) => {
                let object = parent.get_object_with_args(request, args)?;
                check_type(name, &object, required)?;
                Ok(object)
            }
            (Some(required), None) => parent.get_object_of_type(request, required),
            (None, None) => parent.get_object(request),
        }
    }

    fn instance_for(
        &self,
        canonical: &str,
        definition: &Arc<ManagedDefinition>,
        args: Option<ConstructionArgs>,
    ) -> Result<SharedObject> {
        if self.is_closed() {
            return Err(self.closed_error(canonical));
        }

        match definition.scope() {
            ScopeKind::Shared => {
                if let Some(object) = self.shared.get_if_ready(canonical) {
                    debug!(registry = %self.config.display_name, name = %canonical, "Shared cache hit");
                    return Ok(object);
                }
                self.shared
                    .get_or_create(canonical, || self.create_object(definition, None))
            }
            ScopeKind::Independent => {
                let _in_creation = CreationGuard::enter(self.id.0, canonical)?;
                self.create_object(definition, args)
            }
            ScopeKind::Custom(scope_name) => {
                let scope = self.custom_scope(canonical, scope_name)?;
                let _in_creation = CreationGuard::enter(self.id.0, canonical)?;
                scope.get(canonical, &mut || self.create_object(definition, None))
            }
        }
    }

    fn create_object(
        &self,
        definition: &ManagedDefinition,
        args: Option<ConstructionArgs>,
    ) -> Result<SharedObject> {
        let registry = self
            .self_ref
            .upgrade()
            .ok_or_else(|| self.closed_error(definition.name()))?;
        let context = ConstructionContext::new(registry, definition.name(), args);

        let object: SharedObject = Arc::from(self.orchestrator.create(definition, &context)?);
        debug!(
            registry = %self.config.display_name,
            name = %definition.name(),
            scope = %definition.scope(),
            object_type = %object.object_type().short_name(),
            "Managed object created"
        );
        self.publish(events::OBJECT_CREATED, json!({
            "registry": self.config.display_name,
            "name": definition.name(),
            "scope": definition.scope().to_string(),
            "type": object.object_type().name(),
        }));
        Ok(object)
    }

    fn dereference(
        &self,
        requested: &ObjectName<'_>,
        canonical: &str,
        definition: &ManagedDefinition,
        object: SharedObject,
    ) -> Result<SharedObject> {
        if requested.is_dereference() {
            return match object.as_producer() {
                Some(_) => Ok(object),
                None => Err(RegistryError::NotAFactory {
                    name: canonical.to_string(),
                }),
            };
        }

        let Some(producer) = object.as_producer() else {
            return Ok(object);
        };
        if definition.is_shared() && producer.is_shared_product() {
            self.products
                .get_or_create(canonical, || self.produce(canonical, &object))
        } else {
            self.produce(canonical, &object)
        }
    }

    fn produce(&self, name: &str, producer_object: &SharedObject) -> Result<SharedObject> {
        let producer = producer_object
            .as_producer()
            .ok_or_else(|| RegistryError::NotAFactory {
                name: name.to_string(),
            })?;
        let product = producer
            .produce()
            .map_err(|e| RegistryError::from_hook(name, LifecycleState::InUse, e))?;
        let product = self.orchestrator.apply_after_initialization(product, name)?;
        Ok(Arc::from(product))
    }

    fn resolve_by_type(&self, required: TypeDescriptor) -> Result<SharedObject> {
        let candidates = self.candidates_for(required);

        let chosen = match candidates.as_slice() {
            [] => {
                return match self.parent_registry() {
                    Some(parent) => parent.get_object_by_type(required),
                    None => Err(RegistryError::no_such_definition(
                        required.name(),
                        "no object of this type is defined",
                    )),
                };
            }
            [(request, _)] => request.clone(),
            _ => {
                let primaries: Vec<&String> = candidates
                    .iter()
                    .filter(|(_, definition)| definition.is_primary())
                    .map(|(request, _)| request)
                    .collect();
                match primaries.as_slice() {
                    [primary] => (*primary).clone(),
                    _ => {
                        return Err(RegistryError::NoUniqueDefinition {
                            required: required.name().to_string(),
                            candidates: candidates
                                .iter()
                                .map(|(request, _)| request.clone())
                                .collect(),
                        })
                    }
                }
            }
        };

        self.resolve(&chosen, Some(required), None)
    }

    /// Local, non-abstract definitions whose lookup would yield `required`,
    /// paired with the request name that yields it
    fn candidates_for(&self, required: TypeDescriptor) -> Vec<(String, Arc<ManagedDefinition>)> {
        let mut candidates = Vec::new();
        for definition in self.definitions.definitions() {
            if definition.is_abstract() {
                continue;
            }
            if self.exposed_type(&definition) == Some(required) {
                candidates.push((definition.name().to_string(), definition));
            } else if self.is_producer_definition(&definition)
                && self.own_type(&definition) == Some(required)
            {
                candidates.push((dereference_name(definition.name()), definition));
            }
        }
        candidates
    }

    // ---- metadata queries (never create) ------------------------------

    fn cached_instance(&self, definition: &ManagedDefinition) -> Option<SharedObject> {
        if definition.is_shared() {
            self.shared.get_if_ready(definition.name())
        } else {
            None
        }
    }

    fn is_producer_definition(&self, definition: &ManagedDefinition) -> bool {
        self.cached_instance(definition)
            .map(|object| object.as_producer().is_some())
            .unwrap_or_else(|| definition.is_producer())
    }

    /// Type of the object itself, ignoring production
    fn own_type(&self, definition: &ManagedDefinition) -> Option<TypeDescriptor> {
        self.cached_instance(definition)
            .map(|object| object.object_type())
            .or_else(|| definition.object_type())
    }

    /// Type a plain-name lookup returns
    fn exposed_type(&self, definition: &ManagedDefinition) -> Option<TypeDescriptor> {
        if let Some(instance) = self.cached_instance(definition) {
            return match instance.as_producer() {
                Some(producer) => producer
                    .produced_type()
                    .or_else(|| definition.produced_type()),
                None => Some(instance.object_type()),
            };
        }
        if definition.is_producer() {
            definition.produced_type()
        } else {
            definition.object_type()
        }
    }

    fn query<T>(
        &self,
        name: &str,
        local: impl FnOnce(&ObjectName<'_>, &Arc<ManagedDefinition>) -> Result<T>,
        remote: impl FnOnce(&dyn ObjectFactory, &str) -> Result<T>,
    ) -> Result<T> {
        let requested = ObjectName::parse(name);
        let canonical = self.aliases.canonical_name(requested.base());
        if let Some(definition) = self.definitions.lookup(&canonical) {
            return local(&requested, &definition);
        }
        match self.parent_registry() {
            Some(parent) => remote(parent.as_ref(), &requested.with_base(&canonical)),
            None => Err(RegistryError::no_such_definition(
                name,
                format!("not defined in '{}' or any ancestor", self.config.display_name),
            )),
        }
    }

    fn contains_locally(&self, requested: &ObjectName<'_>, canonical: &str) -> bool {
        match self.definitions.lookup(canonical) {
            Some(definition) => !requested.is_dereference() || self.is_producer_definition(&definition),
            None => false,
        }
    }

    // ---- helpers ------------------------------------------------------

    fn parent_registry(&self) -> Option<Arc<dyn ObjectFactory>> {
        let parent = self.parent.as_ref()?;
        let upgraded = parent.upgrade();
        if upgraded.is_none() {
            warn!(
                registry = %self.config.display_name,
                "Parent registry has been dropped; continuing without a parent"
            );
        }
        upgraded
    }

    fn custom_scope(&self, name: &str, scope_name: &str) -> Result<Arc<dyn CustomScope>> {
        self.scopes
            .get(scope_name)
            .map(|scope| Arc::clone(scope.value()))
            .ok_or_else(|| {
                RegistryError::definition_store(
                    name,
                    format!("no custom scope registered under '{scope_name}'"),
                )
            })
    }

    fn closed_error(&self, name: &str) -> RegistryError {
        RegistryError::CreationNotAllowed {
            name: name.to_string(),
            reason: format!("registry '{}' is shut down", self.config.display_name),
        }
    }

    fn publish<T: Serialize>(&self, event: &str, payload: T) {
        if let Err(error) = self.events.publish_serialized(event, &payload) {
            debug!(registry = %self.config.display_name, event = %event, error = %error, "Event not published");
        }
    }
}

fn check_type(name: &str, object: &SharedObject, required: Option<TypeDescriptor>) -> Result<()> {
    let Some(required) = required else {
        return Ok(());
    };
    let actual = object.object_type();
    if actual == required {
        Ok(())
    } else {
        Err(RegistryError::TypeMismatch {
            name: name.to_string(),
            required: required.name().to_string(),
            actual: actual.name().to_string(),
        })
    }
}

impl ObjectFactory for Registry {
    fn registry_id(&self) -> RegistryId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.config.display_name
    }

    fn parent_factory(&self) -> Option<Arc<dyn ObjectFactory>> {
        self.parent_registry()
    }

    fn get_object(&self, name: &str) -> Result<SharedObject> {
        self.resolve(name, None, None)
    }

    fn get_object_of_type(&self, name: &str, required: TypeDescriptor) -> Result<SharedObject> {
        self.resolve(name, Some(required), None)
    }

    fn get_object_by_type(&self, required: TypeDescriptor) -> Result<SharedObject> {
        self.resolve_by_type(required)
    }

    fn get_object_with_args(&self, name: &str, args: ConstructionArgs) -> Result<SharedObject> {
        self.resolve(name, None, Some(args))
    }

    fn contains_object(&self, name: &str) -> bool {
        let requested = ObjectName::parse(name);
        let canonical = self.aliases.canonical_name(requested.base());
        if self.definitions.contains(&canonical) {
            return self.contains_locally(&requested, &canonical);
        }
        self.parent_registry()
            .map(|parent| parent.contains_object(&requested.with_base(&canonical)))
            .unwrap_or(false)
    }

    fn contains_local_object(&self, name: &str) -> bool {
        let requested = ObjectName::parse(name);
        let canonical = self.aliases.canonical_name(requested.base());
        self.contains_locally(&requested, &canonical)
    }

    fn is_shared(&self, name: &str) -> Result<bool> {
        self.query(
            name,
            |requested, definition| {
                if !definition.is_shared() {
                    return Ok(false);
                }
                if requested.is_dereference() {
                    return Ok(true);
                }
                // An uncreated producer is assumed to hand out shared products
                Ok(self
                    .cached_instance(definition)
                    .and_then(|object| object.as_producer().map(|p| p.is_shared_product()))
                    .unwrap_or(true))
            },
            |parent, request| parent.is_shared(request),
        )
    }

    fn is_independent(&self, name: &str) -> Result<bool> {
        self.query(
            name,
            |requested, definition| {
                if definition.is_independent() {
                    return Ok(true);
                }
                if !definition.is_shared() || requested.is_dereference() {
                    return Ok(false);
                }
                Ok(self
                    .cached_instance(definition)
                    .and_then(|object| object.as_producer().map(|p| !p.is_shared_product()))
                    .unwrap_or(false))
            },
            |parent, request| parent.is_independent(request),
        )
    }

    fn matches_type(&self, name: &str, required: TypeDescriptor) -> Result<bool> {
        self.query(
            name,
            |requested, definition| {
                let actual = if requested.is_dereference() {
                    self.is_producer_definition(definition)
                        .then(|| self.own_type(definition))
                        .flatten()
                } else {
                    self.exposed_type(definition)
                };
                Ok(actual == Some(required))
            },
            |parent, request| parent.matches_type(request, required),
        )
    }

    fn type_of(&self, name: &str) -> Result<Option<TypeDescriptor>> {
        self.query(
            name,
            |requested, definition| {
                if requested.is_dereference() {
                    return Ok(self
                        .is_producer_definition(definition)
                        .then(|| self.own_type(definition))
                        .flatten());
                }
                Ok(self.exposed_type(definition))
            },
            |parent, request| parent.type_of(request),
        )
    }

    fn aliases_of(&self, name: &str) -> Vec<String> {
        let requested = ObjectName::parse(name);
        let canonical = self.aliases.canonical_name(requested.base());
        let full_name = requested.with_base(&canonical);

        let mut names = Vec::new();
        if full_name != name {
            names.push(full_name.clone());
        }
        for alias in self.aliases.aliases_of(&canonical) {
            let alias = requested.with_base(&alias);
            if alias != name {
                names.push(alias);
            }
        }

        if !self.definitions.contains(&canonical) {
            if let Some(parent) = self.parent_registry() {
                for alias in parent.aliases_of(&full_name) {
                    if alias != name && !names.contains(&alias) {
                        names.push(alias);
                    }
                }
            }
        }
        names
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        if self.config.shutdown_on_drop && !self.is_closed() {
            let report = self.shutdown();
            debug!(
                registry = %self.config.display_name,
                destroyed = report.destroyed.len(),
                failures = report.failures.len(),
                "Registry dropped without explicit shutdown"
            );
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("id", &self.id)
            .field("display_name", &self.config.display_name)
            .field("definitions", &self.definitions.len())
            .field("shared", &self.shared)
            .field("closed", &self.is_closed())
            .finish()
    }
}
