use crate::error::{RegistryError, Result};
use crate::lifecycle::ManagedObject;
use crate::types::{ConstructionArgs, RegistryId, SharedObject, TypeDescriptor};
use std::sync::Arc;

/// Public lookup contract of a registry level.
///
/// Object-safe so that a registry can delegate to a parent of any
/// implementation. By-name lookups consult this level first and ask the
/// parent only when no local definition exists.
pub trait ObjectFactory: Send + Sync {
    fn registry_id(&self) -> RegistryId;

    fn display_name(&self) -> &str;

    /// Parent registry, if one is set and still alive
    fn parent_factory(&self) -> Option<Arc<dyn ObjectFactory>>;

    fn get_object(&self, name: &str) -> Result<SharedObject>;

    /// Lookup that fails with `TypeMismatch` unless the object is `required`
    fn get_object_of_type(&self, name: &str, required: TypeDescriptor) -> Result<SharedObject>;

    /// Unique object of `required` type
    fn get_object_by_type(&self, required: TypeDescriptor) -> Result<SharedObject>;

    /// Lookup with explicit construction arguments; independent scope only
    fn get_object_with_args(&self, name: &str, args: ConstructionArgs) -> Result<SharedObject>;

    /// Whether a definition for `name` exists in this level or an ancestor.
    /// A `true` answer does not guarantee creation will succeed.
    fn contains_object(&self, name: &str) -> bool;

    /// Like [`ObjectFactory::contains_object`] without consulting ancestors
    fn contains_local_object(&self, name: &str) -> bool;

    fn is_shared(&self, name: &str) -> Result<bool>;

    fn is_independent(&self, name: &str) -> Result<bool>;

    /// Whether `name` resolves to an object of `required` type; `false` when
    /// the type cannot be determined without creating the object
    fn matches_type(&self, name: &str, required: TypeDescriptor) -> Result<bool>;

    /// Type a lookup of `name` would return, `None` when indeterminate
    fn type_of(&self, name: &str) -> Result<Option<TypeDescriptor>>;

    fn aliases_of(&self, name: &str) -> Vec<String>;
}

/// Typed conveniences over [`ObjectFactory`]
pub trait ObjectFactoryExt: ObjectFactory {
    fn get<T: ManagedObject>(&self, name: &str) -> Result<Arc<T>> {
        let object = self.get_object_of_type(name, TypeDescriptor::of::<T>())?;
        downcast_object(name, object)
    }

    fn get_by_type<T: ManagedObject>(&self) -> Result<Arc<T>> {
        let required = TypeDescriptor::of::<T>();
        let object = self.get_object_by_type(required)?;
        downcast_object(required.name(), object)
    }

    fn get_with_args<T: ManagedObject>(&self, name: &str, args: ConstructionArgs) -> Result<Arc<T>> {
        let object = self.get_object_with_args(name, args)?;
        downcast_object(name, object)
    }

    fn is_type_match<T: ManagedObject>(&self, name: &str) -> Result<bool> {
        self.matches_type(name, TypeDescriptor::of::<T>())
    }
}

impl<F: ObjectFactory + ?Sized> ObjectFactoryExt for F {}

fn downcast_object<T: ManagedObject>(name: &str, object: SharedObject) -> Result<Arc<T>> {
    object
        .downcast_arc::<T>()
        .map_err(|object| RegistryError::TypeMismatch {
            name: name.to_string(),
            required: std::any::type_name::<T>().to_string(),
            actual: object.object_type().name().to_string(),
        })
}
