//! Admission control and liveness tracking for task threads.
//!
//! The scheduler never decides what work runs; it only caps how many tasks
//! may be alive at once and lets shutdown wait for the ones that are.

use crate::error::{EngineError, Result};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Default cap on simultaneously live tasks.
pub const THREAD_LIMIT: usize = 200;

/// Opaque identity of an admitted task.
///
/// The ticket makes a handle unique even after its slot is reused, so a
/// stale handle can never release somebody else's slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskHandle {
    slot: usize,
    ticket: u64,
}

struct Slot {
    ticket: u64,
    join: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct Registry {
    slots: Vec<Option<Slot>>,
    free: Vec<usize>,
    active: usize,
    next_ticket: u64,
}

impl Registry {
    fn slot_mut(&mut self, handle: TaskHandle) -> Option<&mut Slot> {
        self.slots
            .get_mut(handle.slot)
            .and_then(Option::as_mut)
            .filter(|slot| slot.ticket == handle.ticket)
    }
}

struct Shared {
    limit: usize,
    registry: Mutex<Registry>,
    changed: Condvar,
}

#[derive(Clone)]
pub struct TaskScheduler {
    shared: Arc<Shared>,
}

impl TaskScheduler {
    pub fn new(limit: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                limit,
                registry: Mutex::new(Registry::default()),
                changed: Condvar::new(),
            }),
        }
    }

    pub fn limit(&self) -> usize {
        self.shared.limit
    }

    pub fn active(&self) -> usize {
        self.shared.registry.lock().active
    }

    /// Reserve a slot, or return `None` without side effects when the
    /// limit is reached. Dropping the permit releases the slot.
    pub fn try_admit(&self) -> Option<AdmissionPermit> {
        let mut registry = self.shared.registry.lock();
        if registry.active >= self.shared.limit {
            log::debug!("admission denied: {} tasks active", registry.active);
            return None;
        }

        let slot = match registry.free.pop() {
            Some(slot) => slot,
            None => {
                registry.slots.push(None);
                registry.slots.len() - 1
            }
        };
        let ticket = registry.next_ticket;
        registry.next_ticket += 1;
        registry.slots[slot] = Some(Slot { ticket, join: None });
        registry.active += 1;

        Some(AdmissionPermit {
            handle: TaskHandle { slot, ticket },
            scheduler: self.clone(),
            released: false,
        })
    }

    /// Attach the thread running an admitted task to its slot.
    ///
    /// If the task already finished and released its slot, the join handle
    /// is simply dropped.
    pub fn register(&self, handle: TaskHandle, join: JoinHandle<()>) {
        let mut registry = self.shared.registry.lock();
        if let Some(slot) = registry.slot_mut(handle) {
            slot.join = Some(join);
        }
    }

    /// Free the slot held by `handle`. Returns `false` if it was already free.
    pub fn unregister(&self, handle: TaskHandle) -> bool {
        let mut registry = self.shared.registry.lock();
        if registry.slot_mut(handle).is_none() {
            return false;
        }

        registry.slots[handle.slot] = None;
        registry.free.push(handle.slot);
        registry.active -= 1;
        self.shared.changed.notify_all();
        true
    }

    /// Block until a slot is free.
    pub fn wait_for_capacity(&self) {
        let mut registry = self.shared.registry.lock();
        while registry.active >= self.shared.limit {
            self.shared.changed.wait(&mut registry);
        }
    }

    /// Block until every admitted task has released its slot.
    pub fn join_all(&self) {
        loop {
            let handles: Vec<JoinHandle<()>> = {
                let mut registry = self.shared.registry.lock();
                if registry.active == 0 {
                    return;
                }

                let handles: Vec<_> = registry
                    .slots
                    .iter_mut()
                    .flatten()
                    .filter_map(|slot| slot.join.take())
                    .collect();
                if handles.is_empty() {
                    self.shared.changed.wait(&mut registry);
                    continue;
                }
                handles
            };

            for handle in handles {
                if handle.join().is_err() {
                    log::error!("a spellchecking task panicked");
                }
            }
        }
    }

    /// Admit, spawn `work` on a named thread and register it.
    pub fn spawn<F>(&self, name: String, work: F) -> Result<TaskHandle>
    where
        F: FnOnce() + Send + 'static,
    {
        let permit = self.try_admit().ok_or(EngineError::AdmissionDenied {
            limit: self.shared.limit,
        })?;
        let handle = permit.handle();

        let join = thread::Builder::new()
            .name(name)
            .spawn(move || {
                let _permit = permit;
                work();
            })
            .map_err(EngineError::Spawn)?;

        self.register(handle, join);
        Ok(handle)
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new(THREAD_LIMIT)
    }
}

/// A reserved slot. The slot is released on drop, including when the task
/// thread unwinds.
pub struct AdmissionPermit {
    handle: TaskHandle,
    scheduler: TaskScheduler,
    released: bool,
}

impl AdmissionPermit {
    pub fn handle(&self) -> TaskHandle {
        self.handle
    }

    pub fn release(mut self) {
        self.released = true;
        self.scheduler.unregister(self.handle);
    }
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        if !self.released {
            self.scheduler.unregister(self.handle);
        }
    }
}
