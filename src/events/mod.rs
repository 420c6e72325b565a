//! # Container Events
//!
//! Lifecycle events published by a registry as objects are created and
//! destroyed. The publisher is also handed to event-aware managed objects.

pub mod publisher;

pub use publisher::{EventPublisher, PublishError, PublishedEvent};
