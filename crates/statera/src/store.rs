//! The store: one state tree, one root transition function, synchronous
//! subscriber notification.
//!
//! # Invariants
//!
//! 1. `dispatch` is the sole mutator and is atomic from the caller's view:
//!    read, compute, commit, notify all complete before it returns.
//! 2. Phase machine per store: `Idle -> Reducing -> Notifying -> Idle`.
//!    Entering `dispatch`/`replace_reducer` outside `Idle` fails with
//!    [`StoreError::NestedDispatch`]; every other operation is legal in any
//!    phase except reading state while `Reducing`.
//! 3. A no-op transition (pointer-identical next state) still commits and
//!    still notifies — short-circuiting is a downstream consumer's job.
//! 4. Subscribers are notified in registration order against a snapshot
//!    taken at pass start.
//! 5. A panicking transition function leaves the previously committed
//!    state intact, suppresses that pass's notifications, and restores the
//!    phase, so the store stays usable.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Nested dispatch | Listener or reducer re-enters | `StoreError::NestedDispatch`, state untouched |
//! | Empty discriminant | Malformed event record | `StoreError::InvalidEvent`, state untouched |
//! | State read in reducer | Reducer captured a store handle | `StoreError::Reentrancy` from `try_state` |
//! | Reducer panic | Application bug | Propagates out of `dispatch`; prior state intact |

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::error::StoreError;
use crate::event::{Event, Signal};
use crate::reducer::SharedReducer;
use crate::subscriber::{Registry, Subscription};

// ---------------------------------------------------------------------------
// Phase tracking
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Reducing,
    Notifying,
}

/// Restores `Idle` on drop so a panicking reducer or listener cannot wedge
/// the store in a non-idle phase.
struct PhaseGuard<'a> {
    phase: &'a Cell<Phase>,
}

impl<'a> PhaseGuard<'a> {
    fn enter(phase: &'a Cell<Phase>, next: Phase) -> Self {
        phase.set(next);
        Self { phase }
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.phase.set(Phase::Idle);
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

struct StoreInner<S, E> {
    state: RefCell<Rc<S>>,
    reducer: RefCell<SharedReducer<S, E>>,
    subscribers: Rc<RefCell<Registry>>,
    phase: Cell<Phase>,
}

/// Stateful coordinator applying transition functions and notifying
/// subscribers.
///
/// A `Store` is a cheap-to-clone handle; clones share state, root function,
/// and subscribers. Single-threaded by construction (`Rc` inner): embedding
/// in a multi-threaded host requires the embedder to confine or serialize
/// all operations on one store externally. Independent stores are fully
/// isolated — construct as many as needed.
pub struct Store<S, E> {
    inner: Rc<StoreInner<S, E>>,
}

impl<S, E> Clone for Store<S, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S, E: Event> Store<S, E> {
    /// Create a store whose initial state is derived by the root transition
    /// function from an absent prior: `reducer(None, Signal::Init)`.
    pub fn new<F>(reducer: F) -> Self
    where
        F: Fn(Option<Rc<S>>, Signal<'_, E>) -> Rc<S> + 'static,
    {
        Self::build(Rc::new(reducer), None)
    }

    /// Create a store preloaded with an earlier snapshot (for example one
    /// exported with [`state`](Store::state) and persisted). Initial state
    /// is `reducer(Some(snapshot), Signal::Init)`.
    pub fn preloaded<F>(reducer: F, snapshot: Rc<S>) -> Self
    where
        F: Fn(Option<Rc<S>>, Signal<'_, E>) -> Rc<S> + 'static,
    {
        Self::build(Rc::new(reducer), Some(snapshot))
    }

    fn build(reducer: SharedReducer<S, E>, preloaded: Option<Rc<S>>) -> Self {
        let state = (reducer.as_ref())(preloaded, Signal::Init);
        Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(state),
                reducer: RefCell::new(reducer),
                subscribers: Rc::new(RefCell::new(Registry::default())),
                phase: Cell::new(Phase::Idle),
            }),
        }
    }

    /// Current state snapshot, by reference. O(1); never runs a transition.
    ///
    /// Reading state from inside an in-flight transition function is a
    /// contract violation (the function already holds the only state it may
    /// observe); it is checked in debug builds. Use
    /// [`try_state`](Store::try_state) for the always-checked form.
    #[must_use]
    pub fn state(&self) -> Rc<S> {
        debug_assert!(
            self.inner.phase.get() != Phase::Reducing,
            "state() read from inside an in-flight transition function"
        );
        self.inner.state.borrow().clone()
    }

    /// Like [`state`](Store::state), but returns
    /// [`StoreError::Reentrancy`] instead of asserting when called from
    /// inside an in-flight transition function.
    pub fn try_state(&self) -> Result<Rc<S>, StoreError> {
        if self.inner.phase.get() == Phase::Reducing {
            return Err(StoreError::Reentrancy);
        }
        Ok(self.inner.state.borrow().clone())
    }

    /// Dispatch an event: compute the next state through the root
    /// transition function, commit it, then synchronously notify every
    /// subscriber registered at pass start, in registration order. Returns
    /// the event.
    ///
    /// A pointer-identical result is still a committed transition and still
    /// notifies. Fails with [`StoreError::NestedDispatch`] when a dispatch
    /// is already in flight and with [`StoreError::InvalidEvent`] when the
    /// event's discriminant is empty; in both cases state is untouched.
    pub fn dispatch(&self, event: E) -> Result<E, StoreError> {
        if self.inner.phase.get() != Phase::Idle {
            return Err(StoreError::NestedDispatch);
        }
        if event.kind().is_empty() {
            return Err(StoreError::InvalidEvent {
                reason: "empty discriminant".to_owned(),
            });
        }
        trace!(kind = event.kind(), "dispatch");

        let reducer = Rc::clone(&*self.inner.reducer.borrow());
        let prior = self.inner.state.borrow().clone();
        let next = {
            let _reducing = PhaseGuard::enter(&self.inner.phase, Phase::Reducing);
            (reducer.as_ref())(Some(prior), Signal::Event(&event))
        };
        *self.inner.state.borrow_mut() = next;

        self.notify();
        Ok(event)
    }

    /// Register a listener to run after every committed transition. The
    /// returned [`Subscription`] removes exactly this registration on drop;
    /// duplicate registrations of one callable are independent.
    pub fn subscribe<L>(&self, listener: L) -> Subscription
    where
        L: Fn() + 'static,
    {
        let id = self
            .inner
            .subscribers
            .borrow_mut()
            .insert(Rc::new(listener));
        trace!(?id, "subscribe");
        Subscription::new(Rc::downgrade(&self.inner.subscribers), id)
    }

    /// Hot-swap the root transition function, immediately re-derive state
    /// via `next(Some(current), Signal::Replace)`, then notify exactly as
    /// [`dispatch`](Store::dispatch) does.
    ///
    /// Fails with [`StoreError::NestedDispatch`] while a dispatch is in
    /// flight.
    pub fn replace_reducer<F>(&self, next: F) -> Result<(), StoreError>
    where
        F: Fn(Option<Rc<S>>, Signal<'_, E>) -> Rc<S> + 'static,
    {
        if self.inner.phase.get() != Phase::Idle {
            return Err(StoreError::NestedDispatch);
        }
        debug!("replace root transition function");

        let next: SharedReducer<S, E> = Rc::new(next);
        let prior = self.inner.state.borrow().clone();
        let rederived = {
            let _reducing = PhaseGuard::enter(&self.inner.phase, Phase::Reducing);
            (next.as_ref())(Some(prior), Signal::Replace)
        };
        *self.inner.reducer.borrow_mut() = next;
        *self.inner.state.borrow_mut() = rederived;

        self.notify();
        Ok(())
    }

    /// Number of currently registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    fn notify(&self) {
        let pass = self.inner.subscribers.borrow().snapshot();
        trace!(subscribers = pass.len(), "notify");
        let _notifying = PhaseGuard::enter(&self.inner.phase, Phase::Notifying);
        for listener in &pass {
            (listener.as_ref())();
        }
    }
}

impl<S, E> fmt::Debug for Store<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("phase", &self.inner.phase.get())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}
