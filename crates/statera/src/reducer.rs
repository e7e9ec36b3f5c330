//! Transition functions and their hierarchical composition.
//!
//! A transition function is a stored callable
//! `Fn(Option<Rc<S>>, Signal<'_, E>) -> Rc<S>`: pure, deterministic, and
//! tolerant of signals it does not recognize (it returns its input
//! unchanged). [`combine_reducers!`] composes a mapping of named slice
//! functions into one function over a record type whose fields each hold a
//! slice behind `Rc`.
//!
//! # Invariants
//!
//! 1. Purity: identical `(prior, signal)` inputs yield deep-equal outputs;
//!    no I/O, no input mutation, no randomness, no clock reads.
//! 2. Defaulting: a `None` prior occurs only on first derivation and must
//!    produce a well-defined default.
//! 3. Unknown signals: the input `Rc` is returned as-is — pointer-identical,
//!    not merely equal. [`verify_slice`] probes this once per slice when a
//!    composite is built.
//! 4. Reference stability chains upward: when no slice changes, a composite
//!    returns the prior top-level `Rc` itself, so composites nest.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Probe returns a fresh `Rc` | Slice rebuilds state unconditionally | `StoreError::Configuration` at build |
//! | Slice panics on a signal | Application bug | Panic propagates to the builder/dispatcher |

use std::rc::Rc;

use crate::error::StoreError;
use crate::event::Signal;

/// A shared, type-erased transition function, as held by a
/// [`Store`](crate::Store).
pub type SharedReducer<S, E> = Rc<dyn Fn(Option<Rc<S>>, Signal<'_, E>) -> Rc<S>>;

/// Identity helper pinning a closure to the transition-function signature.
///
/// [`combine_reducers!`] routes its composite closure through this so the
/// closure is inferred with the correct higher-ranked signature at the
/// construction site. Callers rarely need it directly.
pub fn compose<S, E, F>(reduce: F) -> F
where
    F: Fn(Option<Rc<S>>, Signal<'_, E>) -> Rc<S>,
{
    reduce
}

/// Probe one slice transition function for the composition contract.
///
/// Derives the slice default with [`Signal::Init`], then feeds it back with
/// [`Signal::Probe`] (a kind no application function recognizes). The slice
/// must hand the probe input back pointer-identical; anything else means it
/// rebuilds state for events it does not own, which would defeat
/// change detection for every ancestor record.
pub fn verify_slice<S, E, F>(slice: &str, reduce: &F) -> Result<(), StoreError>
where
    F: Fn(Option<Rc<S>>, Signal<'_, E>) -> Rc<S>,
{
    let initial = reduce(None, Signal::Init);
    let probed = reduce(Some(Rc::clone(&initial)), Signal::Probe);
    if Rc::ptr_eq(&initial, &probed) {
        Ok(())
    } else {
        Err(StoreError::Configuration {
            slice: slice.to_owned(),
            reason: "did not return its input unchanged for an unrecognized signal".to_owned(),
        })
    }
}

/// Compose named slice transition functions into one function over a record.
///
/// The record type's fields each hold their slice behind `Rc`; every listed
/// slice function observes and returns only its own field's value, blind to
/// siblings. All of the record's fields must be listed.
///
/// Evaluates to `Result<impl Fn(..), StoreError>`: each slice function is
/// probed once (see [`verify_slice`]) and a
/// [`StoreError::Configuration`](crate::StoreError) naming the offending
/// slice is returned when a probe fails.
///
/// When no slice changes, the composite returns the prior top-level `Rc`
/// itself; otherwise it builds a new record, reusing unchanged siblings by
/// reference. Composites therefore nest: a combined function is itself a
/// valid slice function.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use statera::{combine_reducers, Event, Signal, Store};
///
/// #[derive(Debug)]
/// enum AppEvent {
///     Tick,
///     Label(String),
/// }
///
/// impl Event for AppEvent {
///     fn kind(&self) -> &str {
///         match self {
///             Self::Tick => "TICK",
///             Self::Label(_) => "LABEL",
///         }
///     }
/// }
///
/// #[derive(Debug)]
/// struct App {
///     ticks: Rc<u64>,
///     label: Rc<String>,
/// }
///
/// fn ticks(prior: Option<Rc<u64>>, signal: Signal<'_, AppEvent>) -> Rc<u64> {
///     let state = prior.unwrap_or_default();
///     match signal {
///         Signal::Event(AppEvent::Tick) => Rc::new(*state + 1),
///         _ => state,
///     }
/// }
///
/// fn label(prior: Option<Rc<String>>, signal: Signal<'_, AppEvent>) -> Rc<String> {
///     let state = prior.unwrap_or_default();
///     match signal {
///         Signal::Event(AppEvent::Label(text)) => Rc::new(text.clone()),
///         _ => state,
///     }
/// }
///
/// # fn main() -> Result<(), statera::StoreError> {
/// let root = combine_reducers!(App<AppEvent> {
///     ticks: ticks,
///     label: label,
/// })?;
///
/// let store = Store::new(root);
/// store.dispatch(AppEvent::Tick)?;
/// let before = store.state();
/// store.dispatch(AppEvent::Label("ready".into()))?;
/// let after = store.state();
///
/// assert_eq!(*after.ticks, 1);
/// assert_eq!(*after.label, "ready");
/// // The untouched slice is reused by reference.
/// assert!(Rc::ptr_eq(&before.ticks, &after.ticks));
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! combine_reducers {
    ($state:ident < $event:ty > { $($field:ident : $reduce:expr),+ $(,)? }) => {{
        $(let $field = $reduce;)+
        let verified: ::std::result::Result<(), $crate::StoreError> = (|| {
            $($crate::reducer::verify_slice::<_, $event, _>(
                ::core::stringify!($field),
                &$field,
            )?;)+
            ::std::result::Result::Ok(())
        })();
        match verified {
            ::std::result::Result::Err(error) => ::std::result::Result::Err(error),
            ::std::result::Result::Ok(()) => ::std::result::Result::Ok(
                $crate::reducer::compose::<$state, $event, _>(move |prior, signal| {
                    match prior {
                        ::std::option::Option::None => ::std::rc::Rc::new($state {
                            $($field: $field(::std::option::Option::None, signal),)+
                        }),
                        ::std::option::Option::Some(prior) => {
                            let ($($field,)+) = ($(
                                $field(
                                    ::std::option::Option::Some(
                                        ::std::rc::Rc::clone(&prior.$field),
                                    ),
                                    signal,
                                ),
                            )+);
                            if true $(&& ::std::rc::Rc::ptr_eq(&$field, &prior.$field))+ {
                                prior
                            } else {
                                ::std::rc::Rc::new($state { $($field),+ })
                            }
                        }
                    }
                }),
            ),
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;

    #[derive(Debug, Clone, PartialEq)]
    enum TestEvent {
        Bump,
        Rename(String),
    }

    impl Event for TestEvent {
        fn kind(&self) -> &str {
            match self {
                Self::Bump => "BUMP",
                Self::Rename(_) => "RENAME",
            }
        }
    }

    #[derive(Debug, PartialEq)]
    struct Record {
        count: Rc<u32>,
        name: Rc<String>,
    }

    fn count(prior: Option<Rc<u32>>, signal: Signal<'_, TestEvent>) -> Rc<u32> {
        let state = prior.unwrap_or_default();
        match signal {
            Signal::Event(TestEvent::Bump) => Rc::new(*state + 1),
            _ => state,
        }
    }

    fn name(prior: Option<Rc<String>>, signal: Signal<'_, TestEvent>) -> Rc<String> {
        let state = prior.unwrap_or_default();
        match signal {
            Signal::Event(TestEvent::Rename(next)) => Rc::new(next.clone()),
            _ => state,
        }
    }

    // Rebuilds state for every signal, violating the composition contract.
    fn leaky(prior: Option<Rc<u32>>, _signal: Signal<'_, TestEvent>) -> Rc<u32> {
        Rc::new(prior.map_or(0, |state| *state))
    }

    fn build() -> impl Fn(Option<Rc<Record>>, Signal<'_, TestEvent>) -> Rc<Record> {
        combine_reducers!(Record<TestEvent> {
            count: count,
            name: name,
        })
        .expect("slices satisfy the composition contract")
    }

    // ── Construction-time validation ─────────────────────────────────

    #[test]
    fn verify_slice_accepts_well_formed_slices() {
        assert!(verify_slice::<_, TestEvent, _>("count", &count).is_ok());
    }

    #[test]
    fn verify_slice_rejects_unconditional_rebuilds() {
        let err = verify_slice::<_, TestEvent, _>("leaky", &leaky).unwrap_err();
        match err {
            StoreError::Configuration { slice, .. } => assert_eq!(slice, "leaky"),
            other => panic!("expected Configuration, got {other:?}"),
        }
    }

    #[test]
    fn combine_surfaces_the_offending_slice() {
        let result = combine_reducers!(Record<TestEvent> {
            count: leaky,
            name: name,
        });
        match result {
            Err(StoreError::Configuration { slice, .. }) => assert_eq!(slice, "count"),
            Err(other) => panic!("expected Configuration for 'count', got {other:?}"),
            Ok(_) => panic!("expected Configuration for 'count', got Ok"),
        }
    }

    // ── Composition semantics ────────────────────────────────────────

    #[test]
    fn init_composes_slice_defaults() {
        let root = build();
        let state = root(None, Signal::Init);
        assert_eq!(*state.count, 0);
        assert_eq!(*state.name, "");
    }

    #[test]
    fn each_slice_sees_only_its_own_key() {
        let root = build();
        let s0 = root(None, Signal::Init);
        let bump = TestEvent::Bump;
        let s1 = root(Some(Rc::clone(&s0)), Signal::Event(&bump));
        assert_eq!(*s1.count, 1);
        // The sibling slice is reused by reference, not rebuilt.
        assert!(Rc::ptr_eq(&s0.name, &s1.name));
    }

    #[test]
    fn unchanged_record_keeps_top_level_identity() {
        let root = build();
        let s0 = root(None, Signal::Init);
        let s1 = root(Some(Rc::clone(&s0)), Signal::Probe);
        assert!(Rc::ptr_eq(&s0, &s1));
    }

    #[test]
    fn composites_nest() {
        #[derive(Debug)]
        struct Outer {
            inner: Rc<Record>,
            count: Rc<u32>,
        }

        let inner = combine_reducers!(Record<TestEvent> {
            count: count,
            name: name,
        })
        .unwrap();
        let root = combine_reducers!(Outer<TestEvent> {
            inner: inner,
            count: count,
        })
        .unwrap();

        let s0 = root(None, Signal::Init);
        let rename = TestEvent::Rename("nested".into());
        let s1 = root(Some(Rc::clone(&s0)), Signal::Event(&rename));
        assert_eq!(*s1.inner.name, "nested");
        // The untouched nested slice and the outer scalar are both reused.
        assert!(Rc::ptr_eq(&s0.inner.count, &s1.inner.count));
        assert!(Rc::ptr_eq(&s0.count, &s1.count));

        let s2 = root(Some(Rc::clone(&s1)), Signal::Probe);
        assert!(Rc::ptr_eq(&s1, &s2));
    }
}
