//! Error recovery: `catch` and `finally`.

use std::rc::Rc;

use crate::sequence::Sequence;
use crate::traits::{Cursor, Error, Result, Step};

struct CatchStep<T> {
    upstream: Cursor<T>,
    handler: Option<Rc<dyn Fn(Error)>>,
}

impl<T> Step<T> for CatchStep<T> {
    fn step(&mut self) -> Result<Option<T>> {
        match self.upstream.next_value() {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::debug!(error = %e, "sequence ended by caught error");
                if let Some(handler) = self.handler.as_ref() {
                    handler(e);
                }
                Ok(None)
            }
        }
    }

    fn release(&mut self) -> Result<()> {
        self.upstream.dispose()
    }
}

struct FinallyStep<T> {
    upstream: Cursor<T>,
    action: Rc<dyn Fn()>,
}

impl<T> Step<T> for FinallyStep<T> {
    fn step(&mut self) -> Result<Option<T>> {
        self.upstream.next_value()
    }

    fn release(&mut self) -> Result<()> {
        let released = self.upstream.dispose();
        (self.action)();
        released
    }
}

impl<T: 'static> Sequence<T> {
    /// Turn an error raised while advancing into a clean end of sequence.
    pub fn catch(&self) -> Sequence<T> {
        self.catch_inner(None)
    }

    /// `catch`, handing the error to `handler` first.
    pub fn catch_with(&self, handler: impl Fn(Error) + 'static) -> Sequence<T> {
        self.catch_inner(Some(Rc::new(handler)))
    }

    fn catch_inner(&self, handler: Option<Rc<dyn Fn(Error)>>) -> Sequence<T> {
        let source = self.clone();
        Sequence::named("catch", move || {
            Cursor::new(CatchStep {
                upstream: source.cursor(),
                handler: handler.clone(),
            })
        })
    }

    /// Run `action` once a started traversal is released, after upstream
    /// has been released. Errors still propagate.
    pub fn finally(&self, action: impl Fn() + 'static) -> Sequence<T> {
        let source = self.clone();
        let action: Rc<dyn Fn()> = Rc::new(action);
        Sequence::named("finally", move || {
            Cursor::new(FinallyStep {
                upstream: source.cursor(),
                action: Rc::clone(&action),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    fn failing_after(n: i32) -> Sequence<i32> {
        Sequence::range(1, 10).try_select(move |x| {
            if x > i64::from(n) {
                Err(Error::callback(format!("boom at {x}")))
            } else {
                Ok(x as i32)
            }
        })
    }

    #[test]
    fn catch_ends_sequence_and_reports() {
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        let out = failing_after(2)
            .catch_with(move |e| *sink.borrow_mut() = Some(e.to_string()))
            .to_vec()
            .unwrap();
        assert_eq!(out, vec![1, 2]);
        assert!(seen.borrow().as_deref().is_some_and(|m| m.contains("boom at 3")));
        assert_eq!(failing_after(0).catch().to_vec().unwrap(), Vec::<i32>::new());
    }

    #[test]
    fn finally_runs_once_on_every_exit() {
        let runs = Rc::new(Cell::new(0));

        let counter = Rc::clone(&runs);
        let seq = Sequence::from_vec(vec![1, 2, 3]).finally(move || counter.set(counter.get() + 1));
        seq.to_vec().unwrap();
        assert_eq!(runs.get(), 1);
        assert_eq!(seq.take(1).to_vec().unwrap(), vec![1]);
        assert_eq!(runs.get(), 2);

        let counter = Rc::clone(&runs);
        let failing = failing_after(1).finally(move || counter.set(counter.get() + 1));
        assert!(failing.to_vec().is_err());
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn finally_skipped_when_never_started() {
        let runs = Rc::new(Cell::new(0));
        let counter = Rc::clone(&runs);
        let seq = Sequence::from_vec(vec![1]).finally(move || counter.set(counter.get() + 1));
        drop(seq.cursor());
        assert_eq!(runs.get(), 0);
    }
}
