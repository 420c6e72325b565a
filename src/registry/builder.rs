use super::container::Registry;
use super::object_factory::ObjectFactory;
use crate::config::RegistryConfig;
use crate::constants::{events, system};
use crate::definition::{DefinitionSource, ManagedDefinition};
use crate::error::{RegistryError, Result};
use crate::lifecycle::{
    DestructionAwareProcessor, MessageSource, ObjectPostProcessor, StaticMessageSource,
};
use crate::logging::{log_error, log_registry_operation};
use crate::scope::CustomScope;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info};

/// Assembles a [`Registry`] from configuration, a parent, definitions,
/// aliases, processors and custom scopes.
///
/// Definitions added directly are registered before those of definition
/// sources; aliases are registered after all definitions.
#[must_use]
#[derive(Default)]
pub struct RegistryBuilder {
    config: RegistryConfig,
    parent: Option<Arc<dyn ObjectFactory>>,
    definitions: Vec<ManagedDefinition>,
    aliases: Vec<(String, String)>,
    sources: Vec<Box<dyn DefinitionSource>>,
    post_processors: Vec<Arc<dyn ObjectPostProcessor>>,
    destruction_processors: Vec<Arc<dyn DestructionAwareProcessor>>,
    scopes: Vec<(String, Arc<dyn CustomScope>)>,
    message_source: Option<Arc<dyn MessageSource>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.config.display_name = display_name.into();
        self
    }

    /// Parent consulted for names this registry does not define. The
    /// registry keeps only a weak reference; the caller keeps the parent
    /// alive.
    pub fn parent(mut self, parent: Arc<dyn ObjectFactory>) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn definition(mut self, definition: ManagedDefinition) -> Self {
        self.definitions.push(definition);
        self
    }

    pub fn definitions(mut self, definitions: impl IntoIterator<Item = ManagedDefinition>) -> Self {
        self.definitions.extend(definitions);
        self
    }

    pub fn alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.aliases.push((alias.into(), target.into()));
        self
    }

    pub fn load_from(mut self, source: impl DefinitionSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn post_processor(mut self, processor: Arc<dyn ObjectPostProcessor>) -> Self {
        self.post_processors.push(processor);
        self
    }

    pub fn destruction_processor(mut self, processor: Arc<dyn DestructionAwareProcessor>) -> Self {
        self.destruction_processors.push(processor);
        self
    }

    pub fn scope(mut self, scope_name: impl Into<String>, scope: Arc<dyn CustomScope>) -> Self {
        self.scopes.push((scope_name.into(), scope));
        self
    }

    pub fn message_source(mut self, source: Arc<dyn MessageSource>) -> Self {
        self.message_source = Some(source);
        self
    }

    pub fn build(self) -> Result<Arc<Registry>> {
        self.config.validate()?;
        if let Some(parent) = &self.parent {
            validate_chain(parent)?;
        }

        let messages = self
            .message_source
            .unwrap_or_else(|| Arc::new(StaticMessageSource::new()));
        let parent = self.parent.as_ref().map(Arc::downgrade);
        let registry = Registry::create(self.config, parent, messages);

        for processor in self.post_processors {
            registry.add_post_processor(processor);
        }
        for processor in self.destruction_processors {
            registry.add_destruction_processor(processor);
        }
        for (scope_name, scope) in self.scopes {
            registry.register_scope(&scope_name, scope)?;
        }

        let mut aliases = self.aliases;
        for definition in self.definitions {
            registry.register_definition(definition)?;
        }
        for source in &self.sources {
            let definitions = source.definitions()?;
            info!(
                registry = %registry.display_name(),
                source = %source.source_name(),
                count = definitions.len(),
                "Loading definitions from source"
            );
            for definition in definitions {
                registry.register_definition(definition)?;
            }
            aliases.extend(source.aliases());
        }
        for (alias, target) in &aliases {
            registry.register_alias(alias, target)?;
        }

        if registry.config().pre_instantiate_shared {
            if let Err(e) = registry.pre_instantiate_shared() {
                log_error(
                    registry.display_name(),
                    "pre_instantiate",
                    &e.to_string(),
                    Some("destroying objects created so far"),
                );
                registry.shutdown();
                return Err(e);
            }
        }

        if let Err(e) = registry.events().publish(
            events::REGISTRY_READY,
            json!({
                "registry": registry.display_name(),
                "definitions": registry.stats().definitions,
            }),
        ) {
            error!(error = %e, "Failed to publish registry ready event");
        }
        log_registry_operation(
            "build",
            registry.display_name(),
            None,
            "ready",
            Some(&format!("{} definitions", registry.stats().definitions)),
        );
        Ok(registry)
    }
}

/// Walk the parent chain, rejecting chains that revisit a registry or exceed
/// the maximum depth
fn validate_chain(parent: &Arc<dyn ObjectFactory>) -> Result<()> {
    let mut seen = HashSet::new();
    let mut current = Some(Arc::clone(parent));
    let mut depth = 0;

    while let Some(factory) = current {
        if !seen.insert(factory.registry_id()) {
            return Err(RegistryError::definition_store(
                factory.display_name(),
                format!("registry chain revisits {}", factory.registry_id()),
            ));
        }
        depth += 1;
        if depth > system::MAX_CHAIN_DEPTH {
            return Err(RegistryError::definition_store(
                factory.display_name(),
                format!("registry chain deeper than {}", system::MAX_CHAIN_DEPTH),
            ));
        }
        current = factory.parent_factory();
    }
    Ok(())
}
