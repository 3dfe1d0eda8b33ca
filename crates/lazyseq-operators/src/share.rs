//! `share` and `memoize`: sequences whose cursors read from one upstream
//! traversal instead of starting their own.

use std::cell::RefCell;
use std::rc::Rc;

use crate::sequence::Sequence;
use crate::traits::{Cursor, Error, Result, Step};

struct SharedState<T> {
    source: Sequence<T>,
    cursor: Option<Cursor<T>>,
}

type Shared<T> = Rc<RefCell<SharedState<T>>>;

fn borrow<'a, S>(cell: &'a RefCell<S>, op: &str) -> Result<std::cell::RefMut<'a, S>> {
    cell.try_borrow_mut()
        .map_err(|_| Error::Invariant(format!("{op}: re-entrant advance of a shared cursor")))
}

/// Every cursor advances the one upstream cursor, created on the first
/// advance of any of them. Consumers never release it.
struct ShareStep<T> {
    shared: Shared<T>,
}

impl<T: 'static> Step<T> for ShareStep<T> {
    fn init(&mut self) -> Result<()> {
        let mut state = borrow(&self.shared, "share")?;
        if state.cursor.is_none() {
            state.cursor = Some(state.source.cursor());
        }
        Ok(())
    }

    fn step(&mut self) -> Result<Option<T>> {
        let mut state = borrow(&self.shared, "share")?;
        match state.cursor.as_mut() {
            Some(cursor) => cursor.next_value(),
            None => Ok(None),
        }
    }
}

struct MemoState<T> {
    source: Sequence<T>,
    cursor: Option<Cursor<T>>,
    cache: Vec<T>,
    complete: bool,
}

/// Replays the shared cache by position, pulling upstream only to extend
/// it.
struct MemoStep<T> {
    memo: Rc<RefCell<MemoState<T>>>,
    index: usize,
}

impl<T: Clone + 'static> Step<T> for MemoStep<T> {
    fn step(&mut self) -> Result<Option<T>> {
        let mut memo = borrow(&self.memo, "memoize")?;
        if let Some(value) = memo.cache.get(self.index) {
            self.index += 1;
            return Ok(Some(value.clone()));
        }
        if memo.complete {
            return Ok(None);
        }
        if memo.cursor.is_none() {
            memo.cursor = Some(memo.source.cursor());
        }
        let next = match memo.cursor.as_mut() {
            Some(cursor) => cursor.next_value(),
            None => Ok(None),
        };
        match next {
            Ok(Some(value)) => {
                memo.cache.push(value.clone());
                self.index += 1;
                Ok(Some(value))
            }
            Ok(None) => {
                memo.complete = true;
                memo.cursor = None;
                tracing::trace!(cached = memo.cache.len(), "memoize complete");
                Ok(None)
            }
            Err(e) => {
                memo.complete = true;
                memo.cursor = None;
                Err(e)
            }
        }
    }
}

impl<T: 'static> Sequence<T> {
    /// A sequence whose cursors all consume the same upstream traversal:
    /// what one consumer takes, the others never see.
    pub fn share(&self) -> Sequence<T> {
        let shared: Shared<T> = Rc::new(RefCell::new(SharedState {
            source: self.clone(),
            cursor: None,
        }));
        Sequence::named("share", move || {
            Cursor::new(ShareStep {
                shared: Rc::clone(&shared),
            })
        })
    }
}

impl<T: Clone + 'static> Sequence<T> {
    /// Cache elements as the first traversal produces them; later or
    /// interleaved traversals replay the cache.
    pub fn memoize(&self) -> Sequence<T> {
        let memo = Rc::new(RefCell::new(MemoState {
            source: self.clone(),
            cursor: None,
            cache: Vec::new(),
            complete: false,
        }));
        Sequence::named("memoize", move || {
            Cursor::new(MemoStep {
                memo: Rc::clone(&memo),
                index: 0,
            })
        })
    }
}
