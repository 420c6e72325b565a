//! # Core Types
//!
//! Type identity, explicit construction arguments and registry identifiers
//! shared across the definition store, scope cache and resolver.

use crate::lifecycle::ManagedObject;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Handle to a materialized object. Callers receive a reference; the registry
/// (or the caller, for independent objects) owns the lifetime.
pub type SharedObject = Arc<dyn ManagedObject>;

static NEXT_OWNER_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate a process-unique id for a registry or scope cache
pub(crate) fn next_owner_id() -> u64 {
    NEXT_OWNER_ID.fetch_add(1, Ordering::Relaxed)
}

/// Identifier of one registry level in a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegistryId(pub u64);

impl RegistryId {
    pub(crate) fn next() -> Self {
        Self(next_owner_id())
    }
}

impl fmt::Display for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "registry#{}", self.0)
    }
}

/// Runtime type identity of a managed object.
///
/// Equality is by `TypeId` only; the name is carried for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeDescriptor {
    id: TypeId,
    name: &'static str,
}

impl TypeDescriptor {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Unqualified type name (`my_app::mail::Mailer` -> `Mailer`)
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for TypeDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeDescriptor {}

impl Hash for TypeDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeDescriptor").field(&self.name).finish()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Explicit construction arguments for an independent-scope request
#[derive(Clone, Default)]
pub struct ConstructionArgs {
    values: Vec<Arc<dyn Any + Send + Sync>>,
}

impl ConstructionArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument (builder style)
    pub fn with<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.values.push(Arc::new(value));
        self
    }

    pub fn push<T: Any + Send + Sync>(&mut self, value: T) {
        self.values.push(Arc::new(value));
    }

    /// Typed access to the argument at `index`
    pub fn get<T: Any>(&self, index: usize) -> Option<&T> {
        self.values.get(index)?.downcast_ref::<T>()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for ConstructionArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructionArgs")
            .field("len", &self.values.len())
            .finish()
    }
}
