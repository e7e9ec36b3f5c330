//! Subscriber registry and RAII subscription handles.
//!
//! Internal to [`Store`](crate::Store). Listeners are zero-argument
//! callables invoked synchronously after each committed transition, in
//! registration order. A notification pass iterates a snapshot taken at
//! pass start, so the registry can be freely mutated from inside listeners:
//!
//! 1. A listener added during a pass is not called during that pass, but is
//!    guaranteed on the next one.
//! 2. A listener removed during a pass is still called if not yet reached —
//!    no order-dependent skipping.
//! 3. Duplicate registrations of the same callable are tracked
//!    independently; each gets its own id and its own handle.
//!
//! [`Subscription`] holds only a weak reference to the registry: dropping
//! every store handle releases the store even while subscriptions are
//! alive, and late drops become no-ops.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

pub(crate) type Listener = Rc<dyn Fn()>;

/// Identity of one registration. Monotone per store, never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct SubscriberId(u64);

/// Ordered listener registry. Keys are monotone ids, so iteration order is
/// registration order and removal never shifts other entries.
#[derive(Default)]
pub(crate) struct Registry {
    entries: BTreeMap<u64, Listener>,
    next_id: u64,
}

impl Registry {
    pub(crate) fn insert(&mut self, listener: Listener) -> SubscriberId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, listener);
        SubscriberId(id)
    }

    pub(crate) fn remove(&mut self, id: SubscriberId) -> bool {
        self.entries.remove(&id.0).is_some()
    }

    pub(crate) fn contains(&self, id: SubscriberId) -> bool {
        self.entries.contains_key(&id.0)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Clone the listener list for one notification pass.
    pub(crate) fn snapshot(&self) -> Vec<Listener> {
        self.entries.values().cloned().collect()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("len", &self.entries.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

/// Owned cancellation handle for one listener registration.
///
/// Dropping the handle removes exactly that registration; other
/// registrations — including duplicates of the same callable — are
/// unaffected. [`detach`](Subscription::detach) leaves the listener
/// registered for the store's lifetime instead.
#[must_use = "dropping a Subscription immediately unsubscribes its listener"]
pub struct Subscription {
    registry: Weak<RefCell<Registry>>,
    id: SubscriberId,
    detached: bool,
}

impl Subscription {
    pub(crate) fn new(registry: Weak<RefCell<Registry>>, id: SubscriberId) -> Self {
        Self {
            registry,
            id,
            detached: false,
        }
    }

    /// Identity of this registration.
    #[must_use]
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Whether the listener is still registered and the store still alive.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.borrow().contains(self.id))
    }

    /// Consume the handle, leaving the listener registered until every
    /// store handle is dropped.
    pub fn detach(mut self) {
        self.detached = true;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.detached {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
