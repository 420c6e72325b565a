use super::ManagedDefinition;
use crate::error::Result;

/// Supplier of already-materialized definitions and aliases, such as a
/// configuration reader or a component scanner
pub trait DefinitionSource: Send + Sync {
    /// Description used in logs
    fn source_name(&self) -> &str;

    fn definitions(&self) -> Result<Vec<ManagedDefinition>>;

    /// `(alias, target)` pairs, registered after the definitions
    fn aliases(&self) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// In-memory definition source
#[derive(Debug, Clone, Default)]
pub struct StaticDefinitionSource {
    name: String,
    definitions: Vec<ManagedDefinition>,
    aliases: Vec<(String, String)>,
}

impl StaticDefinitionSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_definition(mut self, definition: ManagedDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.push((alias.into(), target.into()));
        self
    }
}

impl DefinitionSource for StaticDefinitionSource {
    fn source_name(&self) -> &str {
        &self.name
    }

    fn definitions(&self) -> Result<Vec<ManagedDefinition>> {
        Ok(self.definitions.clone())
    }

    fn aliases(&self) -> Vec<(String, String)> {
        self.aliases.clone()
    }
}
