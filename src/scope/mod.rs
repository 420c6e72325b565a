//! # Scopes
//!
//! Storage of created objects: the single-flight shared cache, same-thread
//! creation tracking for cycle detection and pluggable custom scopes.

pub mod cache;
pub mod custom;
pub(crate) mod tracking;

pub use cache::{CacheState, ScopeCache};
pub use custom::{CustomScope, SimpleScope};
