//! Event records and the lifecycle envelope transition functions receive.
//!
//! An application event is any `Debug` type exposing a discriminant string
//! through [`Event::kind`]. The natural shape is a tagged enum, which is
//! also what keeps event logs serializable:
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use statera::Event;
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! #[serde(tag = "type")]
//! enum TodoEvent {
//!     #[serde(rename = "ADD_TODO")]
//!     AddTodo { text: String },
//! }
//!
//! impl Event for TodoEvent {
//!     fn kind(&self) -> &str {
//!         match self {
//!             Self::AddTodo { .. } => "ADD_TODO",
//!         }
//!     }
//! }
//! ```
//!
//! Transition functions never see a bare event: the store wraps it in a
//! [`Signal`], whose other variants are store-generated lifecycle markers.
//! Matching `_ => state` therefore handles both unknown event kinds and
//! lifecycle signals in one arm — the mandatory "return state unchanged"
//! contract.

use core::fmt;

/// Discriminant kind reported for [`Signal::Init`].
pub const INIT_KIND: &str = "@statera/init";
/// Discriminant kind reported for [`Signal::Replace`].
pub const REPLACE_KIND: &str = "@statera/replace";
/// Discriminant kind reported for [`Signal::Probe`].
pub const PROBE_KIND: &str = "@statera/probe";

/// An immutable, serializable record describing an occurrence.
///
/// Events must be plain structured data: no callables, no cycles, no
/// interior mutability — a logged sequence of events replayed through the
/// same root transition function must reproduce the same state.
pub trait Event: fmt::Debug {
    /// The discriminant naming this event's kind.
    ///
    /// Must be non-empty; [`Store::dispatch`](crate::Store::dispatch)
    /// rejects events with an empty discriminant.
    fn kind(&self) -> &str;
}

/// The envelope a transition function receives on every invocation.
///
/// `Copy` for any `E` (the event is held by reference): composites hand
/// the same signal to every slice.
#[derive(Debug)]
pub enum Signal<'a, E> {
    /// First derivation: produce the initial state. The prior state is
    /// `None` unless a preloaded snapshot was supplied.
    Init,
    /// The root transition function was hot-swapped; re-derive state.
    Replace,
    /// Synthetic unknown-kind signal used by construction-time validation.
    /// A well-formed transition function returns its input unchanged.
    Probe,
    /// A dispatched application event.
    Event(&'a E),
}

// Derives would demand `E: Copy`; the event is only ever borrowed.
impl<E> Clone for Signal<'_, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Signal<'_, E> {}

impl<'a, E: Event> Signal<'a, E> {
    /// The discriminant of the wrapped event, or the namespaced kind of
    /// the lifecycle signal.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Init => INIT_KIND,
            Self::Replace => REPLACE_KIND,
            Self::Probe => PROBE_KIND,
            Self::Event(event) => event.kind(),
        }
    }

    /// The wrapped application event, if any.
    #[must_use]
    pub fn event(&self) -> Option<&'a E> {
        match self {
            Self::Event(event) => Some(event),
            _ => None,
        }
    }
}
