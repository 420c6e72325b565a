//! # Registry Error Types
//!
//! Structured error handling for definition registration, lookup and lifecycle
//! orchestration using thiserror instead of `Box<dyn Error>` patterns.
//!
//! Errors are `Clone` so that every caller blocked behind an in-flight shared
//! creation observes exactly the failure the creating caller saw.

use crate::lifecycle::LifecycleState;
use std::sync::Arc;
use thiserror::Error;

/// Shared, cloneable cause attached to construction failures
pub type ErrorCause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Comprehensive registry error types
#[derive(Error, Debug, Clone)]
pub enum RegistryError {
    #[error("No definition named '{name}' is available: {detail}")]
    NoSuchDefinition { name: String, detail: String },

    #[error("No unique definition of type {required}: candidates {}", .candidates.join(", "))]
    NoUniqueDefinition {
        required: String,
        candidates: Vec<String>,
    },

    #[error("Definition '{name}' is already registered")]
    DuplicateDefinition { name: String },

    #[error("Invalid definition request for '{name}': {reason}")]
    DefinitionStore { name: String, reason: String },

    #[error("Circular dependency while creating '{name}': {}", .chain.join(" -> "))]
    CircularDependency { name: String, chain: Vec<String> },

    #[error("Construction of '{name}' failed at {state}: {message}")]
    ConstructionFailure {
        name: String,
        state: LifecycleState,
        message: String,
        #[source]
        source: Option<ErrorCause>,
    },

    #[error("Cannot alias '{alias}' to '{requested}': already bound to '{existing}'")]
    ConflictingAlias {
        alias: String,
        existing: String,
        requested: String,
    },

    #[error("Object '{name}' is of type {actual}, expected {required}")]
    TypeMismatch {
        name: String,
        required: String,
        actual: String,
    },

    #[error("Object '{name}' is not an object producer")]
    NotAFactory { name: String },

    #[error("Creation of '{name}' not allowed: {reason}")]
    CreationNotAllowed { name: String, reason: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl RegistryError {
    pub fn no_such_definition(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::NoSuchDefinition {
            name: name.into(),
            detail: detail.into(),
        }
    }

    pub fn definition_store(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DefinitionStore {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Convert a failure raised by a constructor or lifecycle hook.
    ///
    /// Registry errors raised from nested lookups (a constructor resolving a
    /// collaborator) keep their identity, so a cycle surfaces as
    /// `CircularDependency` rather than a generic construction failure.
    pub fn from_hook(name: &str, state: LifecycleState, error: anyhow::Error) -> Self {
        match error.downcast::<RegistryError>() {
            Ok(registry_error) => registry_error,
            Err(other) => {
                let message = format!("{other:#}");
                let boxed: Box<dyn std::error::Error + Send + Sync + 'static> = other.into();
                Self::ConstructionFailure {
                    name: name.to_string(),
                    state,
                    message,
                    source: Some(Arc::from(boxed)),
                }
            }
        }
    }

    /// Whether this error belongs to the definition-store class of failures
    /// (structurally invalid requests and duplicate registrations)
    pub fn is_definition_store_error(&self) -> bool {
        matches!(
            self,
            Self::DefinitionStore { .. } | Self::DuplicateDefinition { .. }
        )
    }

    /// Name the error is about, where there is one
    pub fn subject(&self) -> Option<&str> {
        match self {
            Self::NoSuchDefinition { name, .. }
            | Self::DuplicateDefinition { name }
            | Self::DefinitionStore { name, .. }
            | Self::CircularDependency { name, .. }
            | Self::ConstructionFailure { name, .. }
            | Self::TypeMismatch { name, .. }
            | Self::NotAFactory { name }
            | Self::CreationNotAllowed { name, .. } => Some(name),
            Self::ConflictingAlias { alias, .. } => Some(alias),
            Self::NoUniqueDefinition { .. } | Self::Configuration { .. } => None,
        }
    }
}

impl From<config::ConfigError> for RegistryError {
    fn from(error: config::ConfigError) -> Self {
        Self::Configuration {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
