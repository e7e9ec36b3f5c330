#![forbid(unsafe_code)]

//! Predictable, centralized application-state container.
//!
//! `statera` keeps all application data in one state tree, updated
//! exclusively through pure transition functions (reducers) in response to
//! discrete, serializable event records:
//!
//! - [`Store`]: owns the current state snapshot and the root transition
//!   function; applies it on each dispatched event and synchronously
//!   notifies subscribers.
//! - [`Signal`]: the envelope a transition function receives — a dispatched
//!   [`Event`], or one of the store-generated lifecycle signals (`Init`,
//!   `Replace`, `Probe`).
//! - [`combine_reducers!`]: composes named per-slice transition functions
//!   into one root function over a record type.
//! - [`Subscription`]: RAII handle removing its listener on drop.
//! - [`trace`]: JSONL event logs, deterministic replay, and a recording
//!   dispatch decorator.
//!
//! # Architecture
//!
//! State lives behind `Rc<S>`. Transition functions never mutate; they
//! return a (possibly identical) `Rc<S>`, so unchanged sub-trees are reused
//! by reference and `Rc::ptr_eq` is the downstream change-detection
//! primitive. The store itself is a cheap-to-clone handle over
//! `Rc<RefCell<..>>` internals: single-threaded shared ownership, exactly
//! like the rest of an interactive application's frame loop.
//!
//! # Invariants
//!
//! 1. `dispatch` is the sole mutator; it is atomic from the caller's view
//!    (read, compute, commit, notify — then it returns).
//! 2. Subscribers fire in registration order, against a snapshot of the
//!    registry taken at the start of the notification pass.
//! 3. A transition returning its input unchanged is still a committed
//!    transition: subscribers fire, no short-circuiting in the store.
//! 4. Re-entrant dispatch is rejected with [`StoreError::NestedDispatch`],
//!    never queued — `state()` immediately after `dispatch()` reflects
//!    exactly that dispatch's effect.
//! 5. A transition function must return its input unchanged for any signal
//!    it does not recognize. This is a contract, not a convention;
//!    [`combine_reducers!`] enforces it per slice at construction time.
//! 6. A panicking transition function propagates out of `dispatch`, leaves
//!    the prior committed state intact, and suppresses that dispatch's
//!    notification pass.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use statera::{Event, Signal, Store, StoreError};
//!
//! #[derive(Debug)]
//! enum CounterEvent {
//!     Add(i64),
//! }
//!
//! impl Event for CounterEvent {
//!     fn kind(&self) -> &str {
//!         "ADD"
//!     }
//! }
//!
//! fn counter(prior: Option<Rc<i64>>, signal: Signal<'_, CounterEvent>) -> Rc<i64> {
//!     let state = prior.unwrap_or_default();
//!     match signal {
//!         Signal::Event(CounterEvent::Add(n)) => Rc::new(*state + n),
//!         _ => state,
//!     }
//! }
//!
//! fn main() -> Result<(), StoreError> {
//!     let store = Store::new(counter);
//!     let _render = store.subscribe(|| { /* read state() and redraw */ });
//!     store.dispatch(CounterEvent::Add(2))?;
//!     store.dispatch(CounterEvent::Add(3))?;
//!     assert_eq!(*store.state(), 5);
//!     Ok(())
//! }
//! ```

mod error;
mod event;
pub mod reducer;
mod store;
mod subscriber;
pub mod trace;

pub use error::StoreError;
pub use event::{Event, Signal};
pub use reducer::SharedReducer;
pub use store::Store;
pub use subscriber::{SubscriberId, Subscription};
