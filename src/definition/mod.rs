//! # Managed Definitions
//!
//! One record per managed-object name: declared type, scope kind,
//! construction strategy and lifecycle metadata. Definitions are immutable
//! once registered.

pub mod source;
pub mod store;

pub use source::{DefinitionSource, StaticDefinitionSource};
pub use store::DefinitionStore;

use crate::constants::naming;
use crate::error::{RegistryError, Result};
use crate::lifecycle::ManagedObject;
use crate::registry::{ObjectFactory, ObjectFactoryExt, Registry};
use crate::types::{ConstructionArgs, SharedObject, TypeDescriptor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Construction strategy invoked at the construction step
pub type ConstructorFn =
    Arc<dyn Fn(&ConstructionContext) -> anyhow::Result<Box<dyn ManagedObject>> + Send + Sync>;

type InitFn = Arc<dyn Fn(&mut (dyn ManagedObject + 'static)) -> anyhow::Result<()> + Send + Sync>;
type DestroyFn = Arc<dyn Fn(&(dyn ManagedObject + 'static)) -> anyhow::Result<()> + Send + Sync>;

/// How instances of a definition are shared
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    /// One instance per registry level, cached and destroyed at shutdown
    Shared,
    /// A new instance per request, owned by the caller
    Independent,
    /// Served by the custom scope registered under this name
    Custom(String),
}

impl ScopeKind {
    pub fn is_shared(&self) -> bool {
        matches!(self, Self::Shared)
    }

    pub fn is_independent(&self) -> bool {
        matches!(self, Self::Independent)
    }
}

impl Default for ScopeKind {
    fn default() -> Self {
        Self::Shared
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shared => write!(f, "shared"),
            Self::Independent => write!(f, "independent"),
            Self::Custom(scope) => write!(f, "{scope}"),
        }
    }
}

/// Everything a constructor may need: the registry for collaborator lookups,
/// the name being created and explicit arguments, if any
#[derive(Clone)]
pub struct ConstructionContext {
    registry: Arc<Registry>,
    name: String,
    args: Option<ConstructionArgs>,
}

impl ConstructionContext {
    pub(crate) fn new(registry: Arc<Registry>, name: &str, args: Option<ConstructionArgs>) -> Self {
        Self {
            registry,
            name: name.to_string(),
            args,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> Option<&ConstructionArgs> {
        self.args.as_ref()
    }

    /// Explicit argument at `index`, failing when absent or of another type
    pub fn arg<T: std::any::Any>(&self, index: usize) -> anyhow::Result<&T> {
        self.args
            .as_ref()
            .and_then(|args| args.get::<T>(index))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "'{}' expects argument {index} of type {}",
                    self.name,
                    std::any::type_name::<T>()
                )
            })
    }

    /// Resolve a collaborator through the owning registry
    pub fn get_object(&self, name: &str) -> Result<SharedObject> {
        self.registry.get_object(name)
    }

    /// Resolve a typed collaborator through the owning registry
    pub fn get<T: ManagedObject>(&self, name: &str) -> Result<Arc<T>> {
        self.registry.get::<T>(name)
    }
}

impl fmt::Debug for ConstructionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructionContext")
            .field("registry", &self.registry.display_name())
            .field("name", &self.name)
            .field("args", &self.args)
            .finish()
    }
}

/// Named custom init operation
#[derive(Clone)]
pub struct InitOperation {
    name: String,
    operation: InitFn,
}

impl InitOperation {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invoke(&self, object: &mut (dyn ManagedObject + 'static)) -> anyhow::Result<()> {
        (self.operation)(object)
    }
}

impl fmt::Debug for InitOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("InitOperation").field(&self.name).finish()
    }
}

/// Named custom destroy operation
#[derive(Clone)]
pub struct DestroyOperation {
    name: String,
    operation: DestroyFn,
}

impl DestroyOperation {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invoke(&self, object: &(dyn ManagedObject + 'static)) -> anyhow::Result<()> {
        (self.operation)(object)
    }
}

impl fmt::Debug for DestroyOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DestroyOperation").field(&self.name).finish()
    }
}

/// Definition of one managed object
#[derive(Clone)]
pub struct ManagedDefinition {
    name: String,
    object_type: Option<TypeDescriptor>,
    produced_type: Option<TypeDescriptor>,
    producer: bool,
    scope: ScopeKind,
    lazy: bool,
    is_abstract: bool,
    primary: bool,
    constructor: Option<ConstructorFn>,
    init_operation: Option<InitOperation>,
    destroy_operation: Option<DestroyOperation>,
    description: Option<String>,
}

impl ManagedDefinition {
    pub fn builder(name: impl Into<String>) -> ManagedDefinitionBuilder {
        ManagedDefinitionBuilder::new(name.into())
    }

    pub fn shared(name: impl Into<String>) -> ManagedDefinitionBuilder {
        Self::builder(name).scope(ScopeKind::Shared)
    }

    pub fn independent(name: impl Into<String>) -> ManagedDefinitionBuilder {
        Self::builder(name).scope(ScopeKind::Independent)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type of the object the constructor returns
    pub fn object_type(&self) -> Option<TypeDescriptor> {
        self.object_type
    }

    /// Declared type of a producer's product, if known ahead of creation
    pub fn produced_type(&self) -> Option<TypeDescriptor> {
        self.produced_type
    }

    pub fn is_producer(&self) -> bool {
        self.producer
    }

    pub fn scope(&self) -> &ScopeKind {
        &self.scope
    }

    pub fn is_shared(&self) -> bool {
        self.scope.is_shared()
    }

    pub fn is_independent(&self) -> bool {
        self.scope.is_independent()
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn is_primary(&self) -> bool {
        self.primary
    }

    pub fn constructor(&self) -> Option<&ConstructorFn> {
        self.constructor.as_ref()
    }

    pub fn init_operation(&self) -> Option<&InitOperation> {
        self.init_operation.as_ref()
    }

    pub fn destroy_operation(&self) -> Option<&DestroyOperation> {
        self.destroy_operation.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl fmt::Debug for ManagedDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedDefinition")
            .field("name", &self.name)
            .field("object_type", &self.object_type)
            .field("produced_type", &self.produced_type)
            .field("producer", &self.producer)
            .field("scope", &self.scope)
            .field("lazy", &self.lazy)
            .field("abstract", &self.is_abstract)
            .field("primary", &self.primary)
            .field("init_operation", &self.init_operation)
            .field("destroy_operation", &self.destroy_operation)
            .finish()
    }
}

/// Builder for [`ManagedDefinition`]
///
/// ```
/// use component_registry::definition::ManagedDefinition;
/// use component_registry::lifecycle::ManagedObject;
///
/// #[derive(Default)]
/// struct Clock;
///
/// impl ManagedObject for Clock {}
///
/// let definition = ManagedDefinition::shared("clock")
///     .constructs(|_| Ok(Clock))
///     .lazy()
///     .build()
///     .unwrap();
/// assert!(definition.is_shared());
/// ```
#[must_use]
pub struct ManagedDefinitionBuilder {
    definition: ManagedDefinition,
}

impl ManagedDefinitionBuilder {
    fn new(name: String) -> Self {
        Self {
            definition: ManagedDefinition {
                name,
                object_type: None,
                produced_type: None,
                producer: false,
                scope: ScopeKind::Shared,
                lazy: false,
                is_abstract: false,
                primary: false,
                constructor: None,
                init_operation: None,
                destroy_operation: None,
                description: None,
            },
        }
    }

    pub fn scope(mut self, scope: ScopeKind) -> Self {
        self.definition.scope = scope;
        self
    }

    pub fn custom_scope(self, scope_name: impl Into<String>) -> Self {
        self.scope(ScopeKind::Custom(scope_name.into()))
    }

    /// Typed constructor; also declares the object type
    pub fn constructs<T, F>(mut self, constructor: F) -> Self
    where
        T: ManagedObject,
        F: Fn(&ConstructionContext) -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.definition.object_type = Some(TypeDescriptor::of::<T>());
        self.definition.constructor = Some(Arc::new(move |context: &ConstructionContext| {
            constructor(context).map(|object| Box::new(object) as Box<dyn ManagedObject>)
        }));
        self
    }

    /// Untyped constructor; the object type stays undeclared unless set with
    /// [`ManagedDefinitionBuilder::object_type`]
    pub fn constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(&ConstructionContext) -> anyhow::Result<Box<dyn ManagedObject>>
            + Send
            + Sync
            + 'static,
    {
        self.definition.constructor = Some(Arc::new(constructor));
        self
    }

    pub fn object_type<T: ManagedObject>(mut self) -> Self {
        self.definition.object_type = Some(TypeDescriptor::of::<T>());
        self
    }

    /// Mark the object as a producer whose product type is unknown until it
    /// has been created
    pub fn producer(mut self) -> Self {
        self.definition.producer = true;
        self
    }

    /// Mark the object as a producer of `P`
    pub fn producer_of<P: ManagedObject>(mut self) -> Self {
        self.definition.producer = true;
        self.definition.produced_type = Some(TypeDescriptor::of::<P>());
        self
    }

    pub fn lazy(mut self) -> Self {
        self.definition.lazy = true;
        self
    }

    /// Template-only definition; never instantiated
    pub fn abstract_template(mut self) -> Self {
        self.definition.is_abstract = true;
        self
    }

    /// Preferred candidate when a by-type lookup matches several definitions
    pub fn primary(mut self) -> Self {
        self.definition.primary = true;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.definition.description = Some(description.into());
        self
    }

    /// Custom init operation run after `after_properties_set`
    pub fn init_operation<T, F>(mut self, name: impl Into<String>, operation: F) -> Self
    where
        T: ManagedObject,
        F: Fn(&mut T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        let operation_name = name.clone();
        self.definition.init_operation = Some(InitOperation {
            name,
            operation: Arc::new(move |object: &mut (dyn ManagedObject + 'static)| {
                let target = object.downcast_mut::<T>().ok_or_else(|| {
                    anyhow::anyhow!(
                        "init operation '{operation_name}' expects {}",
                        std::any::type_name::<T>()
                    )
                })?;
                operation(target)
            }),
        });
        self
    }

    /// Custom destroy operation run after `destroy`
    pub fn destroy_operation<T, F>(mut self, name: impl Into<String>, operation: F) -> Self
    where
        T: ManagedObject,
        F: Fn(&T) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        let operation_name = name.clone();
        self.definition.destroy_operation = Some(DestroyOperation {
            name,
            operation: Arc::new(move |object: &(dyn ManagedObject + 'static)| {
                let target = object.downcast_ref::<T>().ok_or_else(|| {
                    anyhow::anyhow!(
                        "destroy operation '{operation_name}' expects {}",
                        std::any::type_name::<T>()
                    )
                })?;
                operation(target)
            }),
        });
        self
    }

    pub fn build(self) -> Result<ManagedDefinition> {
        let definition = self.definition;
        let name = definition.name.as_str();

        if name.trim().is_empty() {
            return Err(RegistryError::definition_store(name, "name cannot be empty"));
        }
        if name.starts_with(naming::FACTORY_DEREFERENCE_PREFIX) {
            return Err(RegistryError::definition_store(
                name,
                "name cannot start with the producer dereference prefix",
            ));
        }
        if let ScopeKind::Custom(scope) = &definition.scope {
            if scope.trim().is_empty() {
                return Err(RegistryError::definition_store(
                    name,
                    "custom scope name cannot be empty",
                ));
            }
        }
        if !definition.is_abstract && definition.constructor.is_none() {
            return Err(RegistryError::definition_store(
                name,
                "non-abstract definition requires a constructor",
            ));
        }

        Ok(definition)
    }
}
