//! Hash joins: `join` (inner join) and `group_join` (one row per outer
//! element).

mod hash;

use std::hash::Hash;
use std::rc::Rc;

use lazyseq_core::store::Projection;

use crate::sequence::{Sequence, SourceKind};
use crate::traits::{Cursor, KeySelector};

use self::hash::{GroupJoinStep, InnerIndex, JoinStep};

impl<TO: Clone + 'static> Sequence<TO> {
    /// Inner join on equal keys. Outer elements without a match are
    /// dropped.
    pub fn join<TI, K, R>(
        &self,
        inner: impl Into<SourceKind<TI>>,
        outer_key: impl Fn(&TO) -> K + 'static,
        inner_key: impl Fn(&TI) -> K + 'static,
        result: impl Fn(&TO, &TI) -> R + 'static,
    ) -> Sequence<R>
    where
        TI: Clone + 'static,
        K: Clone + Eq + Hash + 'static,
        R: 'static,
    {
        self.join_by(inner, outer_key, inner_key, result, K::clone)
    }

    /// `join` with keys compared through `compare`.
    pub fn join_by<TI, K, C, R>(
        &self,
        inner: impl Into<SourceKind<TI>>,
        outer_key: impl Fn(&TO) -> K + 'static,
        inner_key: impl Fn(&TI) -> K + 'static,
        result: impl Fn(&TO, &TI) -> R + 'static,
        compare: impl Fn(&K) -> C + 'static,
    ) -> Sequence<R>
    where
        TI: Clone + 'static,
        K: Clone + 'static,
        C: Eq + Hash + 'static,
        R: 'static,
    {
        let source = self.clone();
        let index = inner_index(inner, inner_key, compare);
        let outer_key: KeySelector<TO, K> = Rc::new(outer_key);
        let result: Rc<dyn Fn(&TO, &TI) -> R> = Rc::new(result);
        Sequence::named("join", move || {
            Cursor::new(JoinStep {
                outer: source.cursor(),
                outer_key: Rc::clone(&outer_key),
                index: index.clone(),
                result: Rc::clone(&result),
                lookup: None,
                current: None,
            })
        })
    }

    /// One result per outer element with the sequence of its matches,
    /// empty when nothing matches.
    pub fn group_join<TI, K, R>(
        &self,
        inner: impl Into<SourceKind<TI>>,
        outer_key: impl Fn(&TO) -> K + 'static,
        inner_key: impl Fn(&TI) -> K + 'static,
        result: impl Fn(TO, Sequence<TI>) -> R + 'static,
    ) -> Sequence<R>
    where
        TI: Clone + 'static,
        K: Clone + Eq + Hash + 'static,
        R: 'static,
    {
        self.group_join_by(inner, outer_key, inner_key, result, K::clone)
    }

    pub fn group_join_by<TI, K, C, R>(
        &self,
        inner: impl Into<SourceKind<TI>>,
        outer_key: impl Fn(&TO) -> K + 'static,
        inner_key: impl Fn(&TI) -> K + 'static,
        result: impl Fn(TO, Sequence<TI>) -> R + 'static,
        compare: impl Fn(&K) -> C + 'static,
    ) -> Sequence<R>
    where
        TI: Clone + 'static,
        K: Clone + 'static,
        C: Eq + Hash + 'static,
        R: 'static,
    {
        let source = self.clone();
        let index = inner_index(inner, inner_key, compare);
        let outer_key: KeySelector<TO, K> = Rc::new(outer_key);
        let result: Rc<dyn Fn(TO, Sequence<TI>) -> R> = Rc::new(result);
        Sequence::named("group_join", move || {
            Cursor::new(GroupJoinStep {
                outer: source.cursor(),
                outer_key: Rc::clone(&outer_key),
                index: index.clone(),
                result: Rc::clone(&result),
                lookup: None,
            })
        })
    }
}

fn inner_index<TI, K, C>(
    inner: impl Into<SourceKind<TI>>,
    inner_key: impl Fn(&TI) -> K + 'static,
    compare: impl Fn(&K) -> C + 'static,
) -> InnerIndex<TI, K, C>
where
    TI: Clone + 'static,
{
    let compare: Projection<K, C> = Rc::new(compare);
    InnerIndex {
        inner: Sequence::of(inner),
        key: Rc::new(inner_key),
        compare,
    }
}
