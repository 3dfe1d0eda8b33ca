//! Grouping: eager (`to_lookup`, `group_by`, dictionaries) and streaming
//! (`partition_by`).

use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use lazyseq_core::store::{HashBucketStore, Projection};

use crate::lookup::{Grouping, Lookup};
use crate::sequence::Sequence;
use crate::traits::{bucket_capacity, Cursor, KeySelector, Result, Selector, Step};

type LookupBuilder<K, V, C> = Rc<dyn Fn() -> Result<Lookup<K, V, C>>>;

/// Builds the lookup on the first advance, then hands out its groups.
struct GroupByStep<K, V, C> {
    build: LookupBuilder<K, V, C>,
    groups: std::vec::IntoIter<Grouping<K, V>>,
}

impl<K, V, C> Step<Grouping<K, V>> for GroupByStep<K, V, C>
where
    K: Clone + 'static,
    V: Clone + 'static,
    C: Eq + Hash,
{
    fn init(&mut self) -> Result<()> {
        self.groups = (self.build)()?.groupings().into_iter();
        Ok(())
    }

    fn step(&mut self) -> Result<Option<Grouping<K, V>>> {
        Ok(self.groups.next())
    }

    fn release(&mut self) -> Result<()> {
        self.groups = Vec::new().into_iter();
        Ok(())
    }
}

/// Collects one run of consecutive equal keys per step, holding the first
/// element of the next run as lookahead.
struct PartitionStep<T, K, V, C> {
    upstream: Cursor<T>,
    key: KeySelector<T, K>,
    element: Selector<T, V>,
    compare: Projection<K, C>,
    pending: Option<(K, C, T)>,
}

impl<T, K, V, C> PartitionStep<T, K, V, C> {
    fn pull(&mut self) -> Result<Option<(K, C, T)>> {
        Ok(self.upstream.next_value()?.map(|value| {
            let key = (self.key)(&value);
            let compare = (self.compare)(&key);
            (key, compare, value)
        }))
    }
}

impl<T, K, V, C> Step<Grouping<K, V>> for PartitionStep<T, K, V, C>
where
    V: Clone + 'static,
    C: PartialEq,
{
    fn init(&mut self) -> Result<()> {
        self.pending = self.pull()?;
        Ok(())
    }

    fn step(&mut self) -> Result<Option<Grouping<K, V>>> {
        let Some((key, compare, first)) = self.pending.take() else {
            return Ok(None);
        };
        let mut run = vec![(self.element)(first)];
        while let Some((next_key, next_compare, value)) = self.pull()? {
            if next_compare != compare {
                self.pending = Some((next_key, next_compare, value));
                break;
            }
            run.push((self.element)(value));
        }
        Ok(Some(Grouping::new(key, Sequence::from_vec(run))))
    }

    fn release(&mut self) -> Result<()> {
        self.pending = None;
        self.upstream.dispose()
    }
}

impl<T: Clone + 'static> Sequence<T> {
    /// Eagerly index elements by `key`.
    pub fn to_lookup<K>(&self, key: impl Fn(&T) -> K) -> Result<Lookup<K, T>>
    where
        K: Clone + Eq + Hash + 'static,
    {
        Lookup::build(self, &key, &|x| x, Rc::new(K::clone))
    }

    /// `to_lookup` with an element projection and a key-equality projection.
    pub fn to_lookup_with<K, V, C>(
        &self,
        key: impl Fn(&T) -> K,
        element: impl Fn(T) -> V,
        compare: impl Fn(&K) -> C + 'static,
    ) -> Result<Lookup<K, V, C>>
    where
        K: Clone + 'static,
        V: Clone + 'static,
        C: Eq + Hash,
    {
        Lookup::build(self, &key, &element, Rc::new(compare))
    }

    /// Groups in order of first key occurrence. The source is drained on the
    /// first advance.
    pub fn group_by<K>(&self, key: impl Fn(&T) -> K + 'static) -> Sequence<Grouping<K, T>>
    where
        K: Clone + Eq + Hash + 'static,
    {
        self.group_by_with(key, |x| x, K::clone)
    }

    pub fn group_by_with<K, V, C>(
        &self,
        key: impl Fn(&T) -> K + 'static,
        element: impl Fn(T) -> V + 'static,
        compare: impl Fn(&K) -> C + 'static,
    ) -> Sequence<Grouping<K, V>>
    where
        K: Clone + 'static,
        V: Clone + 'static,
        C: Eq + Hash + 'static,
    {
        let source = self.clone();
        let compare: Projection<K, C> = Rc::new(compare);
        let build: LookupBuilder<K, V, C> =
            Rc::new(move || Lookup::build(&source, &key, &element, Rc::clone(&compare)));
        Sequence::named("group_by", move || {
            Cursor::new(GroupByStep {
                build: Rc::clone(&build),
                groups: Vec::new().into_iter(),
            })
        })
    }

    /// `group_by` followed by `result(key, elements)` per group.
    pub fn group_by_select<K, R>(
        &self,
        key: impl Fn(&T) -> K + 'static,
        result: impl Fn(K, Sequence<T>) -> R + 'static,
    ) -> Sequence<R>
    where
        K: Clone + Eq + Hash + 'static,
        R: 'static,
    {
        self.group_by(key).select(move |group| {
            let (key, elements) = group.into_parts();
            result(key, elements)
        })
    }

    /// Groups of consecutive elements with equal keys. A key that reappears
    /// later starts a new group.
    pub fn partition_by<K>(&self, key: impl Fn(&T) -> K + 'static) -> Sequence<Grouping<K, T>>
    where
        K: Clone + PartialEq + 'static,
    {
        self.partition_by_with(key, |x| x, K::clone)
    }

    pub fn partition_by_with<K, V, C>(
        &self,
        key: impl Fn(&T) -> K + 'static,
        element: impl Fn(T) -> V + 'static,
        compare: impl Fn(&K) -> C + 'static,
    ) -> Sequence<Grouping<K, V>>
    where
        K: 'static,
        V: Clone + 'static,
        C: PartialEq + 'static,
    {
        let source = self.clone();
        let key: KeySelector<T, K> = Rc::new(key);
        let element: Selector<T, V> = Rc::new(element);
        let compare: Projection<K, C> = Rc::new(compare);
        Sequence::named("partition_by", move || {
            Cursor::new(PartitionStep {
                upstream: source.cursor(),
                key: Rc::clone(&key),
                element: Rc::clone(&element),
                compare: Rc::clone(&compare),
                pending: None,
            })
        })
    }

    /// Key → element store. A later duplicate key replaces the earlier
    /// entry's key and value in the earlier entry's position.
    pub fn to_dictionary<K, V>(
        &self,
        key: impl Fn(&T) -> K,
        element: impl Fn(T) -> V,
    ) -> Result<HashBucketStore<K, V>>
    where
        K: Clone + Eq + Hash + 'static,
    {
        self.to_dictionary_with(key, element, K::clone)
    }

    pub fn to_dictionary_with<K, V, C>(
        &self,
        key: impl Fn(&T) -> K,
        element: impl Fn(T) -> V,
        compare: impl Fn(&K) -> C + 'static,
    ) -> Result<HashBucketStore<K, V, C>>
    where
        C: Eq + Hash,
    {
        let capacity = bucket_capacity(self.known_len())?;
        let mut store = HashBucketStore::with_capacity_and_projection(capacity, Rc::new(compare));
        self.with_cursor(|cursor| {
            while let Some(value) = cursor.next_value()? {
                let k = key(&value);
                store.add(k, element(value));
            }
            Ok(())
        })?;
        Ok(store)
    }

    /// Plain `HashMap`; later duplicates overwrite earlier ones.
    pub fn to_map<K, V>(
        &self,
        key: impl Fn(&T) -> K,
        element: impl Fn(T) -> V,
    ) -> Result<HashMap<K, V>>
    where
        K: Eq + Hash,
    {
        let mut map = HashMap::with_capacity(self.known_len().unwrap_or(0));
        self.with_cursor(|cursor| {
            while let Some(value) = cursor.next_value()? {
                map.insert(key(&value), element(value));
            }
            Ok(())
        })?;
        Ok(map)
    }
}
