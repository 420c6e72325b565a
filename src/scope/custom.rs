use super::cache::ScopeCache;
use crate::error::Result;
use crate::types::SharedObject;

/// Storage strategy for objects of a `ScopeKind::Custom` definition
/// (per-request, per-session, per-tenant and the like)
pub trait CustomScope: Send + Sync {
    /// Return the object stored under `name`, creating it with `create` when
    /// the scope holds none
    fn get(
        &self,
        name: &str,
        create: &mut dyn FnMut() -> Result<SharedObject>,
    ) -> Result<SharedObject>;

    /// Remove the object stored under `name`; the registry runs its destroy
    /// sequence
    fn remove(&self, name: &str) -> Option<SharedObject>;

    /// Identifier of the current scope instance, for diagnostics
    fn conversation_id(&self) -> Option<String> {
        None
    }
}

/// Custom scope backed by its own single-flight cache
#[derive(Debug)]
pub struct SimpleScope {
    cache: ScopeCache,
}

impl SimpleScope {
    pub fn new(scope_name: impl Into<String>) -> Self {
        Self {
            cache: ScopeCache::new(scope_name),
        }
    }

    /// Names currently held, in creation order
    pub fn names(&self) -> Vec<String> {
        self.cache.ready_names()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl CustomScope for SimpleScope {
    fn get(
        &self,
        name: &str,
        create: &mut dyn FnMut() -> Result<SharedObject>,
    ) -> Result<SharedObject> {
        self.cache.get_or_create(name, create)
    }

    fn remove(&self, name: &str) -> Option<SharedObject> {
        self.cache.evict(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::ManagedObject;
    use std::sync::Arc;

    struct Cart;

    impl ManagedObject for Cart {}

    #[test]
    fn test_simple_scope_caches_until_removed() {
        let scope = SimpleScope::new("session");
        let mut created = 0;
        let mut create = || -> Result<SharedObject> {
            created += 1;
            Ok(Arc::new(Cart))
        };

        let first = scope.get("cart", &mut create).unwrap();
        let second = scope.get("cart", &mut create).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(scope.names(), vec!["cart"]);

        assert!(scope.remove("cart").is_some());
        assert!(scope.is_empty());
        let third = scope.get("cart", &mut create).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        drop(create);
        assert_eq!(created, 2);
    }
}
