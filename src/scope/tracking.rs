use crate::error::RegistryError;
use std::cell::RefCell;

thread_local! {
    /// Names currently being created on this thread, outermost first
    static IN_CREATION: RefCell<Vec<(u64, String)>> = const { RefCell::new(Vec::new()) };
}

/// Marks `name` as in creation on the current thread until dropped
#[derive(Debug)]
pub(crate) struct CreationGuard {
    owner: u64,
    name: String,
}

impl CreationGuard {
    /// Enter creation of `name` for `owner`, failing with the full creation
    /// chain when the same name is already being created on this call chain
    pub(crate) fn enter(owner: u64, name: &str) -> Result<Self, RegistryError> {
        IN_CREATION.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(start) = stack
                .iter()
                .position(|(o, n)| *o == owner && n == name)
            {
                let mut chain: Vec<String> =
                    stack[start..].iter().map(|(_, n)| n.clone()).collect();
                // Nested caches of one registry track the same name twice
                chain.dedup();
                chain.push(name.to_string());
                return Err(RegistryError::CircularDependency {
                    name: name.to_string(),
                    chain,
                });
            }
            stack.push((owner, name.to_string()));
            Ok(Self {
                owner,
                name: name.to_string(),
            })
        })
    }
}

impl Drop for CreationGuard {
    fn drop(&mut self) {
        // Skipped when the thread-local is already torn down
        let _ = IN_CREATION.try_with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(index) = stack
                .iter()
                .rposition(|(o, n)| *o == self.owner && *n == self.name)
            {
                stack.remove(index);
            }
        });
    }
}
