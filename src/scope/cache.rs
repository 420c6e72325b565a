use super::tracking::CreationGuard;
use crate::error::{RegistryError, Result};
use crate::lifecycle::LifecycleState;
use crate::types::{next_owner_id, SharedObject};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, ThreadId};
use tracing::{debug, warn};

/// State of one cached name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    Empty,
    Creating,
    Ready,
    Destroyed,
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Creating => write!(f, "creating"),
            Self::Ready => write!(f, "ready"),
            Self::Destroyed => write!(f, "destroyed"),
        }
    }
}

enum Slot {
    Creating(Arc<Flight>),
    Ready(SharedObject),
    Destroyed,
}

/// Completion signal of one in-progress creation
struct Flight {
    name: String,
    creator: ThreadId,
    outcome: Mutex<Option<Result<SharedObject>>>,
    done: Condvar,
}

impl Flight {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            creator: thread::current().id(),
            outcome: Mutex::new(None),
            done: Condvar::new(),
        }
    }

    fn wait(&self) -> Result<SharedObject> {
        let mut outcome = self.outcome.lock();
        loop {
            if let Some(result) = outcome.as_ref() {
                return result.clone();
            }
            self.done.wait(&mut outcome);
        }
    }

    fn complete(&self, result: Result<SharedObject>) {
        *self.outcome.lock() = Some(result);
        self.done.notify_all();
    }
}

/// Flight each blocked thread is waiting on, across every cache
fn wait_graph() -> &'static Mutex<HashMap<ThreadId, Arc<Flight>>> {
    static WAITS: OnceLock<Mutex<HashMap<ThreadId, Arc<Flight>>>> = OnceLock::new();
    WAITS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Registration of the current thread as a waiter on one flight
struct WaitRegistration {
    waiter: ThreadId,
}

impl WaitRegistration {
    /// Register the current thread as waiting on `flight`, failing when the
    /// flight's creator is itself (transitively) waiting on this thread
    fn enter(flight: &Arc<Flight>) -> Result<Self> {
        let waiter = thread::current().id();
        let mut waits = wait_graph().lock();

        let mut chain = vec![flight.name.clone()];
        let mut creator = flight.creator;
        while creator != waiter && chain.len() <= waits.len() + 1 {
            match waits.get(&creator) {
                Some(next) => {
                    chain.push(next.name.clone());
                    creator = next.creator;
                }
                None => break,
            }
        }
        if creator != waiter {
            waits.insert(waiter, Arc::clone(flight));
            return Ok(Self { waiter });
        }

        chain.push(flight.name.clone());
        Err(RegistryError::CircularDependency {
            name: flight.name.clone(),
            chain,
        })
    }
}

impl Drop for WaitRegistration {
    fn drop(&mut self) {
        wait_graph().lock().remove(&self.waiter);
    }
}

enum Claim {
    Hit(SharedObject),
    Wait(Arc<Flight>),
    Create(Arc<Flight>),
}

/// Cache of shared instances keyed by canonical name with a single-flight
/// creation guarantee.
///
/// Concurrent callers for a name that is being created block until the
/// creator finishes and observe the same object or the same error. A failed
/// creation leaves the name empty; a ready object is never replaced.
pub struct ScopeCache {
    owner: u64,
    label: String,
    slots: DashMap<String, Slot>,
    creation_order: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl ScopeCache {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            owner: next_owner_id(),
            label: label.into(),
            slots: DashMap::new(),
            creation_order: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Return the ready object for `name`, or run `create` exactly once
    /// across all concurrent callers and cache its result
    pub fn get_or_create<F>(&self, name: &str, create: F) -> Result<SharedObject>
    where
        F: FnOnce() -> Result<SharedObject>,
    {
        if let Some(object) = self.get_if_ready(name) {
            return Ok(object);
        }

        let _in_creation = CreationGuard::enter(self.owner, name)?;

        match self.claim(name)? {
            Claim::Hit(object) => Ok(object),
            Claim::Wait(flight) => {
                let _waiting = WaitRegistration::enter(&flight)?;
                debug!(cache = %self.label, name = %name, "Waiting for in-flight creation");
                flight.wait()
            }
            Claim::Create(flight) => self.run_creation(name, flight, create),
        }
    }

    fn claim(&self, name: &str) -> Result<Claim> {
        if self.is_closed() {
            return Err(self.not_allowed(name));
        }

        // The entry is released before any waiting or creating happens
        match self.slots.entry(name.to_string()) {
            Entry::Occupied(entry) => match entry.get() {
                Slot::Ready(object) => Ok(Claim::Hit(Arc::clone(object))),
                Slot::Creating(flight) => Ok(Claim::Wait(Arc::clone(flight))),
                Slot::Destroyed => Err(self.not_allowed(name)),
            },
            Entry::Vacant(entry) => {
                let flight = Arc::new(Flight::new(name));
                entry.insert(Slot::Creating(Arc::clone(&flight)));
                Ok(Claim::Create(flight))
            }
        }
    }

    fn run_creation<F>(&self, name: &str, flight: Arc<Flight>, create: F) -> Result<SharedObject>
    where
        F: FnOnce() -> Result<SharedObject>,
    {
        let mut guard = FlightGuard {
            cache: self,
            name,
            flight: Arc::clone(&flight),
            armed: true,
        };

        let result = match create() {
            Ok(object) => {
                // Closing takes the same lock, so a drain sees either this
                // object or a closed cache
                let mut order = self.creation_order.lock();
                if self.is_closed() {
                    warn!(cache = %self.label, name = %name, "Cache closed during creation; discarding object");
                    self.slots.insert(name.to_string(), Slot::Destroyed);
                    drop(order);
                    drop(object);
                    Err(self.not_allowed(name))
                } else {
                    self.slots
                        .insert(name.to_string(), Slot::Ready(Arc::clone(&object)));
                    order.push(name.to_string());
                    Ok(object)
                }
            }
            Err(error) => {
                self.discard_flight(name, &flight);
                Err(error)
            }
        };

        guard.armed = false;
        flight.complete(result.clone());
        result
    }

    fn discard_flight(&self, name: &str, flight: &Arc<Flight>) {
        self.slots.remove_if(name, |_, slot| {
            matches!(slot, Slot::Creating(current) if Arc::ptr_eq(current, flight))
        });
    }

    fn not_allowed(&self, name: &str) -> RegistryError {
        RegistryError::CreationNotAllowed {
            name: name.to_string(),
            reason: format!("{} is shut down", self.label),
        }
    }

    pub fn get_if_ready(&self, name: &str) -> Option<SharedObject> {
        match self.slots.get(name).as_deref() {
            Some(Slot::Ready(object)) => Some(Arc::clone(object)),
            _ => None,
        }
    }

    pub fn state(&self, name: &str) -> CacheState {
        match self.slots.get(name).as_deref() {
            None => CacheState::Empty,
            Some(Slot::Creating(_)) => CacheState::Creating,
            Some(Slot::Ready(_)) => CacheState::Ready,
            Some(Slot::Destroyed) => CacheState::Destroyed,
        }
    }

    /// Remove a ready object, returning it to the caller for destruction
    pub fn evict(&self, name: &str) -> Option<SharedObject> {
        let (_, slot) = self
            .slots
            .remove_if(name, |_, slot| matches!(slot, Slot::Ready(_)))?;
        self.creation_order.lock().retain(|n| n != name);
        match slot {
            Slot::Ready(object) => Some(object),
            _ => None,
        }
    }

    /// Close the cache and hand out every ready object in reverse creation
    /// order. Drained names stay `Destroyed`; later requests fail.
    pub fn drain_for_destruction(&self) -> Vec<(String, SharedObject)> {
        let order = {
            let mut order = self.creation_order.lock();
            self.closed.store(true, Ordering::SeqCst);
            std::mem::take(&mut *order)
        };

        let mut drained = Vec::with_capacity(order.len());
        for name in order.into_iter().rev() {
            if let Some(mut slot) = self.slots.get_mut(&name) {
                if let Slot::Ready(object) = std::mem::replace(&mut *slot, Slot::Destroyed) {
                    drained.push((name.clone(), object));
                }
            }
        }
        drained
    }

    /// Names of ready objects in creation order
    pub fn ready_names(&self) -> Vec<String> {
        self.creation_order.lock().clone()
    }

    /// Number of ready objects
    pub fn len(&self) -> usize {
        self.creation_order.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for ScopeCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeCache")
            .field("label", &self.label)
            .field("ready", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Fails the flight and clears the slot if the creator unwinds
struct FlightGuard<'a> {
    cache: &'a ScopeCache,
    name: &'a str,
    flight: Arc<Flight>,
    armed: bool,
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.cache.discard_flight(self.name, &self.flight);
        self.flight.complete(Err(RegistryError::ConstructionFailure {
            name: self.name.to_string(),
            state: LifecycleState::Unconstructed,
            message: "creation panicked".to_string(),
            source: None,
        }));
    }
}
