//! Event logs, deterministic replay, and a recording dispatch decorator.
//!
//! State is pure structured data, so the debuggability contract is simple:
//! an ordered event sequence replayed into a fresh store with the same root
//! transition function reproduces the same final state. This module
//! provides the plumbing around that contract:
//!
//! - [`write_events`] / [`read_events`]: JSONL encoding of an event
//!   sequence (one serde-serialized record per line).
//! - [`replay`]: feed a recorded sequence through a store's dispatch.
//! - [`Recorder`]: a dispatch decorator that appends each committed event
//!   to an in-memory log — the minimal form of the "wrap dispatch"
//!   collaborator seam.
//!
//! Snapshot export/import needs no extra surface: persist
//! [`Store::state`](crate::Store::state) output and hand it back to
//! [`Store::preloaded`](crate::Store::preloaded).

use std::cell::RefCell;
use std::fmt;
use std::io::{BufRead, Write};
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::error::StoreError;
use crate::event::Event;
use crate::store::Store;

/// Errors from encoding or decoding an event trace.
#[derive(Debug, Error)]
pub enum TraceError {
    /// Reading or writing the underlying stream failed.
    #[error("i/o failure on event trace")]
    Io(#[from] std::io::Error),

    /// An event record could not be encoded.
    #[error("event record could not be encoded")]
    Encode(#[from] serde_json::Error),

    /// A line of the trace is not a well-formed event record.
    #[error("malformed event record at line {line}")]
    Malformed {
        /// 1-based line number within the trace.
        line: usize,
        /// The underlying decode failure.
        #[source]
        source: serde_json::Error,
    },
}

/// Write an event sequence as JSONL: one serialized record per line.
pub fn write_events<E, W>(events: &[E], mut writer: W) -> Result<(), TraceError>
where
    E: Serialize,
    W: Write,
{
    for event in events {
        serde_json::to_writer(&mut writer, event)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Read a JSONL event sequence. Blank lines are skipped; a malformed line
/// fails with its 1-based line number.
pub fn read_events<E, R>(reader: R) -> Result<Vec<E>, TraceError>
where
    E: DeserializeOwned,
    R: BufRead,
{
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event = serde_json::from_str(&line).map_err(|source| TraceError::Malformed {
            line: index + 1,
            source,
        })?;
        events.push(event);
    }
    Ok(events)
}

/// Dispatch an event sequence in order, returning the final snapshot.
///
/// Replaying one sequence into fresh stores sharing a root transition
/// function yields equal final states — transition purity makes the log a
/// complete record.
pub fn replay<S, E>(store: &Store<S, E>, events: impl IntoIterator<Item = E>) -> Result<Rc<S>, StoreError>
where
    E: Event,
{
    for event in events {
        store.dispatch(event)?;
    }
    store.try_state()
}

/// A dispatch decorator that records every committed event.
///
/// Wraps a store handle; [`dispatch`](Recorder::dispatch) forwards to the
/// store and appends the event to an in-memory log only when the store
/// committed it. Rejected dispatches (nested, malformed) are not recorded,
/// so a drained log always replays cleanly.
pub struct Recorder<S, E> {
    store: Store<S, E>,
    log: RefCell<Vec<E>>,
}

impl<S, E: Event + Clone> Recorder<S, E> {
    /// Decorate a store handle.
    #[must_use]
    pub fn new(store: Store<S, E>) -> Self {
        Self {
            store,
            log: RefCell::new(Vec::new()),
        }
    }

    /// Forward to [`Store::dispatch`], recording the event on success.
    pub fn dispatch(&self, event: E) -> Result<E, StoreError> {
        let event = self.store.dispatch(event)?;
        self.log.borrow_mut().push(event.clone());
        Ok(event)
    }

    /// The decorated store handle.
    #[must_use]
    pub fn store(&self) -> &Store<S, E> {
        &self.store
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.borrow().len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.borrow().is_empty()
    }

    /// Drain the recorded sequence, oldest first.
    #[must_use]
    pub fn take_events(&self) -> Vec<E> {
        std::mem::take(&mut *self.log.borrow_mut())
    }
}

impl<S, E> fmt::Debug for Recorder<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("recorded", &self.log.borrow().len())
            .finish()
    }
}
