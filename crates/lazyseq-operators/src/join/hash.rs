//! Lookup-backed join steps.
//!
//! The inner sequence is indexed into a `Lookup` on the first advance; the
//! outer sequence streams and probes it.

use std::hash::Hash;
use std::rc::Rc;

use lazyseq_core::store::Projection;

use crate::lookup::Lookup;
use crate::sequence::Sequence;
use crate::traits::{Cursor, KeySelector, Result, Step};

/// How an inner sequence is indexed: key selector plus the key-equality
/// projection.
pub(crate) struct InnerIndex<TI, K, C> {
    pub(crate) inner: Sequence<TI>,
    pub(crate) key: KeySelector<TI, K>,
    pub(crate) compare: Projection<K, C>,
}

impl<TI, K, C> Clone for InnerIndex<TI, K, C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            key: Rc::clone(&self.key),
            compare: Rc::clone(&self.compare),
        }
    }
}

impl<TI, K, C> InnerIndex<TI, K, C>
where
    TI: Clone + 'static,
    K: Clone + 'static,
    C: Eq + Hash,
{
    fn build(&self) -> Result<Lookup<K, TI, C>> {
        Lookup::build(
            &self.inner,
            self.key.as_ref(),
            &|x| x,
            Rc::clone(&self.compare),
        )
    }
}

/// Inner join: one result per matching (outer, inner) pair, outer order
/// first, then inner order.
pub(crate) struct JoinStep<TO, TI, K, C, R> {
    pub(crate) outer: Cursor<TO>,
    pub(crate) outer_key: KeySelector<TO, K>,
    pub(crate) index: InnerIndex<TI, K, C>,
    pub(crate) result: Rc<dyn Fn(&TO, &TI) -> R>,
    pub(crate) lookup: Option<Lookup<K, TI, C>>,
    pub(crate) current: Option<(TO, Rc<Vec<TI>>, usize)>,
}

impl<TO, TI, K, C, R> Step<R> for JoinStep<TO, TI, K, C, R>
where
    TI: Clone + 'static,
    K: Clone + 'static,
    C: Eq + Hash,
{
    fn init(&mut self) -> Result<()> {
        self.lookup = Some(self.index.build()?);
        Ok(())
    }

    fn step(&mut self) -> Result<Option<R>> {
        let Some(lookup) = self.lookup.as_ref() else {
            return Ok(None);
        };
        loop {
            if let Some((outer, matches, pos)) = self.current.as_mut() {
                if let Some(inner) = matches.get(*pos) {
                    *pos += 1;
                    return Ok(Some((self.result)(outer, inner)));
                }
                self.current = None;
            }

            let Some(outer) = self.outer.next_value()? else {
                return Ok(None);
            };
            if let Some(matches) = lookup.group(&(self.outer_key)(&outer)) {
                self.current = Some((outer, matches, 0));
            }
        }
    }

    fn release(&mut self) -> Result<()> {
        self.current = None;
        self.lookup = None;
        self.outer.dispose()
    }
}

/// One result per outer element, carrying its (possibly empty) matches.
pub(crate) struct GroupJoinStep<TO, TI, K, C, R> {
    pub(crate) outer: Cursor<TO>,
    pub(crate) outer_key: KeySelector<TO, K>,
    pub(crate) index: InnerIndex<TI, K, C>,
    pub(crate) result: Rc<dyn Fn(TO, Sequence<TI>) -> R>,
    pub(crate) lookup: Option<Lookup<K, TI, C>>,
}

impl<TO, TI, K, C, R> Step<R> for GroupJoinStep<TO, TI, K, C, R>
where
    TI: Clone + 'static,
    K: Clone + 'static,
    C: Eq + Hash,
{
    fn init(&mut self) -> Result<()> {
        self.lookup = Some(self.index.build()?);
        Ok(())
    }

    fn step(&mut self) -> Result<Option<R>> {
        let Some(lookup) = self.lookup.as_ref() else {
            return Ok(None);
        };
        let Some(outer) = self.outer.next_value()? else {
            return Ok(None);
        };
        let matches = lookup.get(&(self.outer_key)(&outer));
        Ok(Some((self.result)(outer, matches)))
    }

    fn release(&mut self) -> Result<()> {
        self.lookup = None;
        self.outer.dispose()
    }
}
