//! # Alias Index
//!
//! Maps alias names to canonical names for one registry level. Chains are
//! collapsed on registration, so every alias resolves in a single hop.

use crate::error::{RegistryError, Result};
use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
pub struct AliasIndex {
    aliases: RwLock<IndexMap<String, String>>,
}

impl AliasIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `alias` for `target`.
    ///
    /// Aliasing a name to itself removes any alias of that name. Re-registering
    /// an alias for the same canonical name is a no-op; an alias bound to a
    /// different name, or one that would close a cycle, is rejected.
    pub fn register(&self, alias: &str, target: &str) -> Result<()> {
        let mut aliases = self.aliases.write();

        if alias == target {
            if aliases.shift_remove(alias).is_some() {
                debug!(alias = %alias, "Alias removed by self-registration");
            }
            return Ok(());
        }

        let canonical = aliases
            .get(target)
            .cloned()
            .unwrap_or_else(|| target.to_string());

        if let Some(existing) = aliases.get(alias) {
            if *existing == canonical {
                return Ok(());
            }
            return Err(RegistryError::ConflictingAlias {
                alias: alias.to_string(),
                existing: existing.clone(),
                requested: target.to_string(),
            });
        }

        if canonical == alias {
            return Err(RegistryError::ConflictingAlias {
                alias: alias.to_string(),
                existing: target.to_string(),
                requested: target.to_string(),
            });
        }

        // Aliases that pointed at the new alias now point at its canonical name
        for value in aliases.values_mut() {
            if value == alias {
                *value = canonical.clone();
            }
        }
        aliases.insert(alias.to_string(), canonical);
        Ok(())
    }

    /// Canonical name for `name`; unknown names are returned unchanged
    pub fn canonical_name(&self, name: &str) -> String {
        self.aliases
            .read()
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }

    /// Aliases of a canonical name, in registration order
    pub fn aliases_of(&self, canonical: &str) -> Vec<String> {
        self.aliases
            .read()
            .iter()
            .filter(|(_, target)| target.as_str() == canonical)
            .map(|(alias, _)| alias.clone())
            .collect()
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.read().contains_key(name)
    }

    pub fn remove_alias(&self, alias: &str) -> Option<String> {
        self.aliases.write().shift_remove(alias)
    }

    pub fn len(&self) -> usize {
        self.aliases.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.read().is_empty()
    }
}
