//! Dispatch throughput: bare scalar state, a fanned-out subscriber list,
//! and a combined record with an untouched sibling slice.

use std::rc::Rc;

use criterion::{Criterion, criterion_group, criterion_main};
use statera::{Event, Signal, Store, combine_reducers};

#[derive(Debug, Clone)]
enum BenchEvent {
    Bump,
}

impl Event for BenchEvent {
    fn kind(&self) -> &str {
        "BUMP"
    }
}

fn count(prior: Option<Rc<u64>>, signal: Signal<'_, BenchEvent>) -> Rc<u64> {
    let state = prior.unwrap_or_default();
    match signal {
        Signal::Event(BenchEvent::Bump) => Rc::new(*state + 1),
        _ => state,
    }
}

fn tag(prior: Option<Rc<String>>, _signal: Signal<'_, BenchEvent>) -> Rc<String> {
    prior.unwrap_or_default()
}

#[derive(Debug)]
struct Record {
    count: Rc<u64>,
    tag: Rc<String>,
}

fn bench_dispatch(c: &mut Criterion) {
    c.bench_function("dispatch/scalar", |b| {
        let store = Store::new(count);
        b.iter(|| store.dispatch(BenchEvent::Bump).unwrap());
    });

    c.bench_function("dispatch/8_subscribers", |b| {
        let store = Store::new(count);
        let _subs: Vec<_> = (0..8).map(|_| store.subscribe(|| {})).collect();
        b.iter(|| store.dispatch(BenchEvent::Bump).unwrap());
    });

    c.bench_function("dispatch/combined_record", |b| {
        let root = combine_reducers!(Record<BenchEvent> {
            count: count,
            tag: tag,
        })
        .unwrap();
        let store = Store::new(root);
        b.iter(|| store.dispatch(BenchEvent::Bump).unwrap());
    });
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
