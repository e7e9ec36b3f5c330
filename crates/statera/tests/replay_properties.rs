//! Property tests for the core contracts: transition purity, replay
//! equivalence, dispatch atomicity, snapshot immutability, and slice
//! reference stability.

use std::rc::Rc;

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use statera::trace::{read_events, replay, write_events};
use statera::{Event, Signal, Store, combine_reducers};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
enum LedgerEvent {
    #[serde(rename = "CREDIT")]
    Credit { amount: u32 },
    #[serde(rename = "DEBIT")]
    Debit { amount: u32 },
    #[serde(rename = "ANNOTATE")]
    Annotate { note: String },
}

impl Event for LedgerEvent {
    fn kind(&self) -> &str {
        match self {
            Self::Credit { .. } => "CREDIT",
            Self::Debit { .. } => "DEBIT",
            Self::Annotate { .. } => "ANNOTATE",
        }
    }
}

#[derive(Debug, PartialEq)]
struct Ledger {
    balance: Rc<i64>,
    notes: Rc<Vec<String>>,
}

fn balance(prior: Option<Rc<i64>>, signal: Signal<'_, LedgerEvent>) -> Rc<i64> {
    let state = prior.unwrap_or_default();
    match signal {
        Signal::Event(LedgerEvent::Credit { amount }) => Rc::new(*state + i64::from(*amount)),
        Signal::Event(LedgerEvent::Debit { amount }) => Rc::new(*state - i64::from(*amount)),
        _ => state,
    }
}

fn notes(prior: Option<Rc<Vec<String>>>, signal: Signal<'_, LedgerEvent>) -> Rc<Vec<String>> {
    let state = prior.unwrap_or_default();
    match signal {
        Signal::Event(LedgerEvent::Annotate { note }) => {
            let mut next = (*state).clone();
            next.push(note.clone());
            Rc::new(next)
        }
        _ => state,
    }
}

fn root() -> impl Fn(Option<Rc<Ledger>>, Signal<'_, LedgerEvent>) -> Rc<Ledger> {
    combine_reducers!(Ledger<LedgerEvent> {
        balance: balance,
        notes: notes,
    })
    .expect("slice reducers satisfy the composition contract")
}

fn fresh_store() -> Store<Ledger, LedgerEvent> {
    Store::new(root())
}

fn deep_copy(ledger: &Ledger) -> (i64, Vec<String>) {
    (*ledger.balance, (*ledger.notes).clone())
}

fn event_strategy() -> impl Strategy<Value = LedgerEvent> {
    prop_oneof![
        (0u32..1000).prop_map(|amount| LedgerEvent::Credit { amount }),
        (0u32..1000).prop_map(|amount| LedgerEvent::Debit { amount }),
        "[a-z]{0,8}".prop_map(|note| LedgerEvent::Annotate { note }),
    ]
}

fn event_seq() -> impl Strategy<Value = Vec<LedgerEvent>> {
    prop::collection::vec(event_strategy(), 0..48)
}

proptest! {
    #[test]
    fn replay_equivalence_across_fresh_stores(events in event_seq()) {
        let first = replay(&fresh_store(), events.clone()).unwrap();
        let second = replay(&fresh_store(), events).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn transitions_are_deterministic(events in event_seq()) {
        let reduce = root();
        let mut state = reduce(None, Signal::Init);
        for event in &events {
            let once = reduce(Some(Rc::clone(&state)), Signal::Event(event));
            let twice = reduce(Some(Rc::clone(&state)), Signal::Event(event));
            prop_assert_eq!(&once, &twice);
            state = once;
        }
    }

    #[test]
    fn dispatch_commits_exactly_the_root_derivation(
        events in event_seq(),
        extra in event_strategy(),
    ) {
        let store = fresh_store();
        replay(&store, events).unwrap();

        let reduce = root();
        let prior = store.state();
        let expected = reduce(Some(Rc::clone(&prior)), Signal::Event(&extra));

        store.dispatch(extra).unwrap();
        prop_assert_eq!(store.state(), expected);
    }

    #[test]
    fn committed_snapshots_are_never_mutated(events in event_seq()) {
        let store = fresh_store();
        let mut history = vec![(store.state(), deep_copy(&store.state()))];
        for event in events {
            store.dispatch(event).unwrap();
            history.push((store.state(), deep_copy(&store.state())));
        }
        // Later transitions must not have reached back into any earlier
        // committed snapshot.
        for (snapshot, copied) in &history {
            prop_assert_eq!(&deep_copy(snapshot), copied);
        }
    }

    #[test]
    fn untouched_slices_keep_identity(notes_only in prop::collection::vec("[a-z]{1,8}", 1..16)) {
        let store = fresh_store();
        store.dispatch(LedgerEvent::Credit { amount: 5 }).unwrap();
        let before = store.state();
        for note in notes_only {
            store.dispatch(LedgerEvent::Annotate { note }).unwrap();
        }
        let after = store.state();
        prop_assert!(Rc::ptr_eq(&before.balance, &after.balance));
        prop_assert!(!Rc::ptr_eq(&before.notes, &after.notes));
    }

    #[test]
    fn jsonl_round_trip_preserves_replay(events in event_seq()) {
        let mut buffer = Vec::new();
        write_events(&events, &mut buffer).unwrap();
        let decoded: Vec<LedgerEvent> = read_events(buffer.as_slice()).unwrap();
        prop_assert_eq!(&decoded, &events);

        let direct = replay(&fresh_store(), events.clone()).unwrap();
        let via_log = replay(&fresh_store(), decoded).unwrap();
        prop_assert_eq!(via_log, direct);
    }
}
