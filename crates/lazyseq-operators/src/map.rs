//! Projection operators: select, select_many, zip, pairwise, scan, pipe, tap.

use std::rc::Rc;

use lazyseq_core::error::merge_release;

use crate::sequence::{Sequence, SourceKind};
use crate::traits::{Cursor, Result, Step};

type TrySelector<T, U> = Rc<dyn Fn(T, usize) -> Result<U>>;

struct SelectStep<T, U> {
    upstream: Cursor<T>,
    selector: TrySelector<T, U>,
    index: usize,
}

impl<T, U> Step<U> for SelectStep<T, U> {
    fn step(&mut self) -> Result<Option<U>> {
        let Some(value) = self.upstream.next_value()? else {
            return Ok(None);
        };
        let index = self.index;
        self.index += 1;
        (self.selector)(value, index).map(Some)
    }

    fn release(&mut self) -> Result<()> {
        self.upstream.dispose()
    }
}

type CollectionSelector<T, U> = Rc<dyn Fn(&T, usize) -> SourceKind<U>>;

/// Flattening state: the outer element stays alive while its inner cursor
/// is drained.
struct SelectManyStep<T, U, R> {
    upstream: Cursor<T>,
    outer: Option<T>,
    inner: Option<Cursor<U>>,
    index: usize,
    collection: CollectionSelector<T, U>,
    result: Rc<dyn Fn(&T, U) -> R>,
}

impl<T, U: Clone + 'static, R> Step<R> for SelectManyStep<T, U, R> {
    fn step(&mut self) -> Result<Option<R>> {
        loop {
            if let (Some(inner), Some(outer)) = (self.inner.as_mut(), self.outer.as_ref()) {
                if let Some(value) = inner.next_value()? {
                    return Ok(Some((self.result)(outer, value)));
                }
                self.inner = None;
            }

            let Some(outer) = self.upstream.next_value()? else {
                return Ok(None);
            };
            let kind = (self.collection)(&outer, self.index);
            self.index += 1;
            self.inner = Some(kind.into_sequence().cursor());
            self.outer = Some(outer);
        }
    }

    fn release(&mut self) -> Result<()> {
        let outer = self.upstream.dispose();
        let inner = match self.inner.as_mut() {
            Some(inner) => inner.dispose(),
            None => Ok(()),
        };
        merge_release(outer, inner)
    }
}

struct ZipStep<T, U, R> {
    first: Cursor<T>,
    second: Cursor<U>,
    selector: Rc<dyn Fn(T, U, usize) -> R>,
    index: usize,
}

impl<T, U, R> Step<R> for ZipStep<T, U, R> {
    fn step(&mut self) -> Result<Option<R>> {
        let Some(a) = self.first.next_value()? else {
            return Ok(None);
        };
        let Some(b) = self.second.next_value()? else {
            return Ok(None);
        };
        let index = self.index;
        self.index += 1;
        Ok(Some((self.selector)(a, b, index)))
    }

    fn release(&mut self) -> Result<()> {
        merge_release(self.first.dispose(), self.second.dispose())
    }
}

struct PairwiseStep<T, R> {
    upstream: Cursor<T>,
    prev: Option<T>,
    selector: Rc<dyn Fn(&T, &T) -> R>,
}

impl<T, R> Step<R> for PairwiseStep<T, R> {
    fn init(&mut self) -> Result<()> {
        self.prev = self.upstream.next_value()?;
        Ok(())
    }

    fn step(&mut self) -> Result<Option<R>> {
        let Some(prev) = self.prev.take() else {
            return Ok(None);
        };
        let Some(current) = self.upstream.next_value()? else {
            return Ok(None);
        };
        let out = (self.selector)(&prev, &current);
        self.prev = Some(current);
        Ok(Some(out))
    }

    fn release(&mut self) -> Result<()> {
        self.upstream.dispose()
    }
}

/// Running fold seeded with the first element.
struct ScanStep<T> {
    upstream: Cursor<T>,
    acc: Option<T>,
    func: Rc<dyn Fn(T, T) -> T>,
}

impl<T: Clone> Step<T> for ScanStep<T> {
    fn step(&mut self) -> Result<Option<T>> {
        let Some(value) = self.upstream.next_value()? else {
            return Ok(None);
        };
        let next = match self.acc.take() {
            Some(acc) => (self.func)(acc, value),
            None => value,
        };
        self.acc = Some(next.clone());
        Ok(Some(next))
    }

    fn release(&mut self) -> Result<()> {
        self.upstream.dispose()
    }
}

/// Running fold that yields its seed first.
struct SeededScanStep<T, A> {
    upstream: Cursor<T>,
    acc: Option<A>,
    seed_emitted: bool,
    func: Rc<dyn Fn(A, T) -> A>,
}

impl<T, A: Clone> Step<A> for SeededScanStep<T, A> {
    fn step(&mut self) -> Result<Option<A>> {
        if !self.seed_emitted {
            self.seed_emitted = true;
            return Ok(self.acc.clone());
        }
        let Some(value) = self.upstream.next_value()? else {
            return Ok(None);
        };
        let Some(acc) = self.acc.take() else {
            return Ok(None);
        };
        let next = (self.func)(acc, value);
        self.acc = Some(next.clone());
        Ok(Some(next))
    }

    fn release(&mut self) -> Result<()> {
        self.upstream.dispose()
    }
}

struct PipeStep<T, U> {
    source: Sequence<T>,
    func: Rc<dyn Fn(Sequence<T>) -> Sequence<U>>,
    inner: Option<Cursor<U>>,
}

impl<T, U: 'static> Step<U> for PipeStep<T, U> {
    fn init(&mut self) -> Result<()> {
        self.inner = Some((self.func)(self.source.clone()).cursor());
        Ok(())
    }

    fn step(&mut self) -> Result<Option<U>> {
        match self.inner.as_mut() {
            Some(inner) => inner.next_value(),
            None => Ok(None),
        }
    }

    fn release(&mut self) -> Result<()> {
        match self.inner.as_mut() {
            Some(inner) => inner.dispose(),
            None => Ok(()),
        }
    }
}

struct TapStep<T> {
    upstream: Cursor<T>,
    action: Rc<dyn Fn(&T, usize)>,
    index: usize,
}

impl<T> Step<T> for TapStep<T> {
    fn step(&mut self) -> Result<Option<T>> {
        let Some(value) = self.upstream.next_value()? else {
            return Ok(None);
        };
        (self.action)(&value, self.index);
        self.index += 1;
        Ok(Some(value))
    }

    fn release(&mut self) -> Result<()> {
        self.upstream.dispose()
    }
}

impl<T: 'static> Sequence<T> {
    pub fn select<U: 'static>(&self, selector: impl Fn(T) -> U + 'static) -> Sequence<U> {
        self.try_select_indexed(move |x, _| Ok(selector(x)))
    }

    pub fn select_indexed<U: 'static>(
        &self,
        selector: impl Fn(T, usize) -> U + 'static,
    ) -> Sequence<U> {
        self.try_select_indexed(move |x, i| Ok(selector(x, i)))
    }

    /// `select` with a fallible selector; an error ends the traversal with
    /// that error after releasing upstream.
    pub fn try_select<U: 'static>(
        &self,
        selector: impl Fn(T) -> Result<U> + 'static,
    ) -> Sequence<U> {
        self.try_select_indexed(move |x, _| selector(x))
    }

    fn try_select_indexed<U: 'static>(
        &self,
        selector: impl Fn(T, usize) -> Result<U> + 'static,
    ) -> Sequence<U> {
        let source = self.clone();
        let selector: TrySelector<T, U> = Rc::new(selector);
        Sequence::named("select", move || {
            Cursor::new(SelectStep {
                upstream: source.cursor(),
                selector: Rc::clone(&selector),
                index: 0,
            })
        })
    }

    /// Map each element to a sequence and flatten. Each inner sequence is
    /// drained before the outer cursor advances.
    pub fn select_many<U, S>(&self, collection: impl Fn(&T) -> S + 'static) -> Sequence<U>
    where
        U: Clone + 'static,
        S: Into<SourceKind<U>>,
    {
        self.select_many_with(move |x, _| collection(x), |_, u| u)
    }

    /// `select_many` with the element index and a result selector that sees
    /// the outer element next to each inner one.
    pub fn select_many_with<U, S, R>(
        &self,
        collection: impl Fn(&T, usize) -> S + 'static,
        result: impl Fn(&T, U) -> R + 'static,
    ) -> Sequence<R>
    where
        U: Clone + 'static,
        S: Into<SourceKind<U>>,
        R: 'static,
    {
        let source = self.clone();
        let collection: CollectionSelector<T, U> =
            Rc::new(move |x: &T, i: usize| collection(x, i).into());
        let result: Rc<dyn Fn(&T, U) -> R> = Rc::new(result);
        Sequence::named("select_many", move || {
            Cursor::new(SelectManyStep {
                upstream: source.cursor(),
                outer: None,
                inner: None,
                index: 0,
                collection: Rc::clone(&collection),
                result: Rc::clone(&result),
            })
        })
    }

    /// Pairwise-combine with `second`; stops at the shorter side.
    pub fn zip<U, R>(
        &self,
        second: impl Into<SourceKind<U>>,
        selector: impl Fn(T, U, usize) -> R + 'static,
    ) -> Sequence<R>
    where
        U: Clone + 'static,
        R: 'static,
    {
        let source = self.clone();
        let second = Sequence::of(second);
        let selector: Rc<dyn Fn(T, U, usize) -> R> = Rc::new(selector);
        Sequence::named("zip", move || {
            Cursor::new(ZipStep {
                first: source.cursor(),
                second: second.cursor(),
                selector: Rc::clone(&selector),
                index: 0,
            })
        })
    }

    /// `selector(previous, current)` for each adjacent pair.
    pub fn pairwise<R: 'static>(&self, selector: impl Fn(&T, &T) -> R + 'static) -> Sequence<R> {
        let source = self.clone();
        let selector: Rc<dyn Fn(&T, &T) -> R> = Rc::new(selector);
        Sequence::named("pairwise", move || {
            Cursor::new(PairwiseStep {
                upstream: source.cursor(),
                prev: None,
                selector: Rc::clone(&selector),
            })
        })
    }

    /// Running fold that yields `seed` followed by every intermediate
    /// accumulator.
    pub fn scan_seeded<A: Clone + 'static>(
        &self,
        seed: A,
        func: impl Fn(A, T) -> A + 'static,
    ) -> Sequence<A> {
        let source = self.clone();
        let func: Rc<dyn Fn(A, T) -> A> = Rc::new(func);
        Sequence::named("scan", move || {
            Cursor::new(SeededScanStep {
                upstream: source.cursor(),
                acc: Some(seed.clone()),
                seed_emitted: false,
                func: Rc::clone(&func),
            })
        })
    }

    /// Apply `func` to this sequence when a traversal starts.
    pub fn pipe<U: 'static>(
        &self,
        func: impl Fn(Sequence<T>) -> Sequence<U> + 'static,
    ) -> Sequence<U> {
        let source = self.clone();
        let func: Rc<dyn Fn(Sequence<T>) -> Sequence<U>> = Rc::new(func);
        Sequence::named("pipe", move || {
            Cursor::new(PipeStep {
                source: source.clone(),
                func: Rc::clone(&func),
                inner: None,
            })
        })
    }

    /// Run `action(element, index)` on each element as it passes through.
    pub fn tap(&self, action: impl Fn(&T, usize) + 'static) -> Sequence<T> {
        let source = self.clone();
        let action: Rc<dyn Fn(&T, usize)> = Rc::new(action);
        Sequence::named("tap", move || {
            Cursor::new(TapStep {
                upstream: source.cursor(),
                action: Rc::clone(&action),
                index: 0,
            })
        })
    }

    /// Flatten a sequence of sequence-like elements one level.
    pub fn flatten<U>(&self) -> Sequence<U>
    where
        T: Clone + Into<SourceKind<U>>,
        U: Clone + 'static,
    {
        self.select_many(|x: &T| x.clone())
    }
}

impl<T: Clone + 'static> Sequence<T> {
    /// Running fold seeded with the first element.
    pub fn scan(&self, func: impl Fn(T, T) -> T + 'static) -> Sequence<T> {
        let source = self.clone();
        let func: Rc<dyn Fn(T, T) -> T> = Rc::new(func);
        Sequence::named("scan", move || {
            Cursor::new(ScanStep {
                upstream: source.cursor(),
                acc: None,
                func: Rc::clone(&func),
            })
        })
    }
}
