//! Error types for store construction, dispatch, and reducer composition.
//!
//! All errors are synchronous values returned to the immediate caller —
//! nothing is retried or swallowed. A panicking transition function is not
//! an error value: it is an application bug and propagates out of
//! [`Store::dispatch`](crate::Store::dispatch) uncaught.

use thiserror::Error;

/// Errors surfaced by [`Store`](crate::Store) operations and by
/// [`combine_reducers!`](crate::combine_reducers) construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A slice transition function failed construction-time validation:
    /// it did not return its input unchanged for an unrecognized signal.
    #[error("malformed transition function for slice '{slice}': {reason}")]
    Configuration {
        /// Name of the offending slice in the composite record.
        slice: String,
        /// What the validation probe observed.
        reason: String,
    },

    /// The dispatched value is not a well-formed event record.
    #[error("invalid event: {reason}")]
    InvalidEvent {
        /// Why the event was rejected.
        reason: String,
    },

    /// `dispatch` or `replace_reducer` was entered while a dispatch was
    /// already in flight (from a transition function or a subscriber).
    #[error("re-entrant dispatch: a dispatch is already in flight")]
    NestedDispatch,

    /// The state snapshot was read from inside an in-flight transition
    /// function. Transition functions only see the state they are given.
    #[error("state read from inside an in-flight transition function")]
    Reentrancy,
}
