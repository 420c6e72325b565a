use super::ManagedDefinition;
use crate::error::{RegistryError, Result};
use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// Definitions of one registry level, keyed by canonical name in
/// registration order. No hierarchy awareness.
#[derive(Debug, Default)]
pub struct DefinitionStore {
    definitions: RwLock<IndexMap<String, Arc<ManagedDefinition>>>,
}

impl DefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition under its own name
    pub fn register(&self, definition: ManagedDefinition) -> Result<Arc<ManagedDefinition>> {
        let mut definitions = self.definitions.write();
        if definitions.contains_key(definition.name()) {
            return Err(RegistryError::DuplicateDefinition {
                name: definition.name().to_string(),
            });
        }

        let definition = Arc::new(definition);
        definitions.insert(definition.name().to_string(), Arc::clone(&definition));
        Ok(definition)
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<ManagedDefinition>> {
        self.definitions.read().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.read().contains_key(name)
    }

    /// Names in registration order
    pub fn names(&self) -> Vec<String> {
        self.definitions.read().keys().cloned().collect()
    }

    /// Definitions in registration order
    pub fn definitions(&self) -> Vec<Arc<ManagedDefinition>> {
        self.definitions.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::ManagedObject;

    struct Clock;

    impl ManagedObject for Clock {}

    fn definition(name: &str) -> ManagedDefinition {
        ManagedDefinition::shared(name)
            .constructs(|_| Ok(Clock))
            .build()
            .unwrap()
    }

    #[test]
    fn test_register_and_lookup() {
        let store = DefinitionStore::new();
        store.register(definition("clock")).unwrap();

        assert!(store.contains("clock"));
        assert!(!store.contains("calendar"));
        assert_eq!(store.lookup("clock").unwrap().name(), "clock");
        assert!(store.lookup("calendar").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let store = DefinitionStore::new();
        store.register(definition("clock")).unwrap();

        let result = store.register(definition("clock"));
        assert!(matches!(
            result,
            Err(RegistryError::DuplicateDefinition { ref name }) if name == "clock"
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_names_keep_registration_order() {
        let store = DefinitionStore::new();
        for name in ["zeta", "alpha", "mid"] {
            store.register(definition(name)).unwrap();
        }
        assert_eq!(store.names(), vec!["zeta", "alpha", "mid"]);
    }
}
