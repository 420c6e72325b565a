//! # Registry
//!
//! The public lookup contract, the hierarchical resolver that implements it,
//! its builder and the producer dereference convention.

pub mod builder;
pub mod container;
pub mod dereference;
pub mod handle;
pub mod object_factory;

pub use builder::RegistryBuilder;
pub use container::{DestroyFailure, Registry, RegistryStats, ShutdownReport};
pub use dereference::{dereference_name, ObjectName, ObjectProducer};
pub use handle::RegistryHandle;
pub use object_factory::{ObjectFactory, ObjectFactoryExt};
