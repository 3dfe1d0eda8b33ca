//! Shared fixtures for the integration tests: instrumented sources and
//! small datasets.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use lazyseq_core::prelude::{Cursor, Error};
use lazyseq_operators::Sequence;

/// Counts how often the source cursor's finalizer ran.
#[derive(Clone, Default)]
pub struct ReleaseCounter(Rc<Cell<usize>>);

impl ReleaseCounter {
    pub fn get(&self) -> usize {
        self.0.get()
    }

    fn bump(&self) {
        self.0.set(self.0.get() + 1);
    }
}

/// Streamed (not array-backed) source over `values` with an instrumented
/// finalizer.
pub fn counted(values: Vec<i64>) -> (Sequence<i64>, ReleaseCounter) {
    failing_at(values, usize::MAX)
}

/// Like `counted`, but advancing to position `fail_at` raises a callback
/// error.
pub fn failing_at(values: Vec<i64>, fail_at: usize) -> (Sequence<i64>, ReleaseCounter) {
    let counter = ReleaseCounter::default();
    let values = Rc::new(values);
    let releases = counter.clone();
    let seq = Sequence::from_fn(move || {
        let values = Rc::clone(&values);
        let releases = releases.clone();
        Cursor::with_release(
            0usize,
            move |pos| {
                if *pos == fail_at {
                    return Err(Error::callback(format!("source failed at {pos}")));
                }
                let next = values.get(*pos).copied();
                *pos += 1;
                Ok(next)
            },
            move |_| {
                releases.bump();
                Ok(())
            },
        )
    });
    (seq, counter)
}

/// Tallies cursor starts and releases across every source it hands out.
#[derive(Clone, Default)]
pub struct CursorLedger {
    opened: Rc<Cell<usize>>,
    released: Rc<Cell<usize>>,
}

impl CursorLedger {
    pub fn opened(&self) -> usize {
        self.opened.get()
    }

    pub fn released(&self) -> usize {
        self.released.get()
    }

    /// Streamed source whose cursors report here on first advance and on
    /// release.
    pub fn source(&self, values: Vec<i64>) -> Sequence<i64> {
        let values = Rc::new(values);
        let ledger = self.clone();
        Sequence::from_fn(move || {
            let values = Rc::clone(&values);
            let opened = Rc::clone(&ledger.opened);
            let released = Rc::clone(&ledger.released);
            Cursor::with_release(
                0usize,
                move |pos| {
                    if *pos == 0 {
                        opened.set(opened.get() + 1);
                    }
                    let next = values.get(*pos).copied();
                    *pos += 1;
                    Ok(next)
                },
                move |_| {
                    released.set(released.get() + 1);
                    Ok(())
                },
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    pub name: &'static str,
    pub age: u32,
    pub city: &'static str,
}

/// Deliberate duplicate ages and cities, in a known input order.
pub fn people() -> Vec<Person> {
    vec![
        Person { name: "ines", age: 31, city: "lyon" },
        Person { name: "omar", age: 25, city: "oslo" },
        Person { name: "yuki", age: 31, city: "oslo" },
        Person { name: "ada", age: 25, city: "lyon" },
        Person { name: "li", age: 40, city: "oslo" },
        Person { name: "bo", age: 31, city: "lyon" },
    ]
}

/// Route `tracing` output to the test harness when `RUST_LOG` asks for it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
