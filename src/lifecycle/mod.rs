//! # Object Lifecycle
//!
//! The capability trait implemented by managed objects, externally registered
//! processors, container services and the orchestrator that drives the fixed
//! creation and destruction order.

pub mod capability;
pub mod object;
pub mod orchestrator;
pub mod processors;
pub mod services;
pub mod states;

pub use capability::{AwarenessStep, Capabilities};
pub use object::ManagedObject;
pub use orchestrator::{ContainerServices, LifecycleOrchestrator};
pub use processors::{DestructionAwareProcessor, ObjectPostProcessor, ProcessorChain};
pub use services::{Environment, MessageSource, PlaceholderError, StaticMessageSource, ValueResolver};
pub use states::LifecycleState;
