#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Component Registry
//!
//! Hierarchical managed-object container.
//!
//! ## Overview
//!
//! A [`Registry`] resolves named or typed requests for application components
//! ("managed objects") to either a shared long-lived instance or a freshly
//! constructed independent instance. It enforces a fixed lifecycle-callback
//! order around creation and destruction and delegates requests it cannot
//! serve to an optional parent registry.
//!
//! ## Module Organization
//!
//! - [`definition`] - Definition records, builder, store and definition sources
//! - [`alias`] - Alias to canonical-name index
//! - [`scope`] - Single-flight shared cache and custom scopes
//! - [`lifecycle`] - Managed-object capabilities, processors and the lifecycle orchestrator
//! - [`registry`] - Lookup contract, hierarchical resolver and producer dereference
//! - [`events`] - Container lifecycle events
//! - [`config`] - Registry configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging bootstrap
//!
//! ## Quick Start
//!
//! ```rust
//! use component_registry::definition::ManagedDefinition;
//! use component_registry::lifecycle::{Capabilities, ManagedObject};
//! use component_registry::registry::{ObjectFactoryExt, Registry};
//!
//! #[derive(Default)]
//! struct Mailer {
//!     name: String,
//! }
//!
//! impl ManagedObject for Mailer {
//!     fn capabilities(&self) -> Capabilities {
//!         Capabilities::NAME_AWARE
//!     }
//!
//!     fn set_object_name(&mut self, name: &str) -> anyhow::Result<()> {
//!         self.name = name.to_string();
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let root = Registry::builder()
//!     .display_name("root")
//!     .definition(ManagedDefinition::shared("mailer").constructs(|_| Ok(Mailer::default())).build()?)
//!     .build()?;
//!
//! let child = Registry::builder()
//!     .display_name("child")
//!     .parent(root.clone())
//!     .build()?;
//!
//! // Not defined in the child: served by the parent
//! let mailer = child.get::<Mailer>("mailer")?;
//! assert_eq!(mailer.name, "mailer");
//!
//! child.shutdown();
//! root.shutdown();
//! # Ok(())
//! # }
//! ```

pub mod alias;
pub mod config;
pub mod constants;
pub mod definition;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod logging;
pub mod registry;
pub mod scope;
pub mod types;

pub use config::RegistryConfig;
pub use definition::{ManagedDefinition, ScopeKind};
pub use error::{RegistryError, Result};
pub use lifecycle::{Capabilities, LifecycleState, ManagedObject};
pub use registry::{
    ObjectFactory, ObjectFactoryExt, ObjectProducer, Registry, RegistryBuilder, ShutdownReport,
};
pub use types::{ConstructionArgs, RegistryId, SharedObject, TypeDescriptor};
