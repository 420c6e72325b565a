use super::object::ManagedObject;
use parking_lot::RwLock;
use std::sync::Arc;

/// Externally registered hook around object initialization.
///
/// Processors run for every object the registry creates, in registration
/// order. Either method may replace the object it is given.
pub trait ObjectPostProcessor: Send + Sync {
    fn before_initialization(
        &self,
        object: Box<dyn ManagedObject>,
        _name: &str,
    ) -> anyhow::Result<Box<dyn ManagedObject>> {
        Ok(object)
    }

    fn after_initialization(
        &self,
        object: Box<dyn ManagedObject>,
        _name: &str,
    ) -> anyhow::Result<Box<dyn ManagedObject>> {
        Ok(object)
    }
}

/// Externally registered hook run before a shared object is destroyed
pub trait DestructionAwareProcessor: Send + Sync {
    fn before_destruction(
        &self,
        object: &(dyn ManagedObject + 'static),
        name: &str,
    ) -> anyhow::Result<()>;

    /// Whether this processor has work to do for `object`
    fn requires_destruction(&self, _object: &(dyn ManagedObject + 'static)) -> bool {
        true
    }
}

/// Ordered processor lists of one registry level
#[derive(Default)]
pub struct ProcessorChain {
    post: RwLock<Vec<Arc<dyn ObjectPostProcessor>>>,
    destruction: RwLock<Vec<Arc<dyn DestructionAwareProcessor>>>,
}

impl ProcessorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_post_processor(&self, processor: Arc<dyn ObjectPostProcessor>) {
        self.post.write().push(processor);
    }

    pub fn add_destruction_processor(&self, processor: Arc<dyn DestructionAwareProcessor>) {
        self.destruction.write().push(processor);
    }

    /// Snapshot of the post processors, so no lock is held while they run
    pub fn post_processors(&self) -> Vec<Arc<dyn ObjectPostProcessor>> {
        self.post.read().clone()
    }

    pub fn destruction_processors(&self) -> Vec<Arc<dyn DestructionAwareProcessor>> {
        self.destruction.read().clone()
    }

    pub fn post_processor_count(&self) -> usize {
        self.post.read().len()
    }

    pub fn destruction_processor_count(&self) -> usize {
        self.destruction.read().len()
    }
}

impl std::fmt::Debug for ProcessorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorChain")
            .field("post", &self.post_processor_count())
            .field("destruction", &self.destruction_processor_count())
            .finish()
    }
}
