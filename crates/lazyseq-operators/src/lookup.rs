//! `Lookup`: an immutable key → elements index, and `Grouping`, a sequence
//! tagged with its key.

use std::fmt;
use std::hash::Hash;
use std::ops::Deref;
use std::rc::Rc;

use lazyseq_core::store::{HashBucketStore, Projection};

use crate::sequence::{Sequence, SourceKind};
use crate::traits::{bucket_capacity, Result};

/// Multi-valued index built once from a sequence.
///
/// Keys keep the order of their first occurrence in the source, and each
/// key's elements keep source order. Element vectors are shared, so `get`
/// and `groupings` never copy them.
pub struct Lookup<K, V, C = K> {
    store: Rc<HashBucketStore<K, Rc<Vec<V>>, C>>,
}

impl<K, V, C> Clone for Lookup<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            store: Rc::clone(&self.store),
        }
    }
}

impl<K, V, C> Lookup<K, V, C>
where
    K: Clone + 'static,
    V: Clone + 'static,
    C: Eq + Hash,
{
    /// Drain `source`, bucketing `element(x)` under `key(&x)`.
    pub(crate) fn build<T: Clone + 'static>(
        source: &Sequence<T>,
        key: &dyn Fn(&T) -> K,
        element: &dyn Fn(T) -> V,
        compare: Projection<K, C>,
    ) -> Result<Self> {
        let capacity = bucket_capacity(source.known_len())?;
        let mut store: HashBucketStore<K, Vec<V>, C> =
            HashBucketStore::with_capacity_and_projection(capacity, compare);
        let mut count = 0usize;
        source.with_cursor(|cursor| {
            while let Some(value) = cursor.next_value()? {
                let k = key(&value);
                let v = element(value);
                match store.get_mut(&k) {
                    Some(group) => group.push(v),
                    None => {
                        store.add(k, vec![v]);
                    }
                }
                count += 1;
            }
            Ok(())
        })?;
        tracing::trace!(keys = store.len(), elements = count, "lookup built");
        Ok(Self {
            store: Rc::new(store.map_values(Rc::new)),
        })
    }

    /// Elements under `key`; empty when the key is absent.
    pub fn get(&self, key: &K) -> Sequence<V> {
        match self.store.get(key) {
            Some(group) => Sequence::from_shared(Rc::clone(group)),
            None => Sequence::empty(),
        }
    }

    pub(crate) fn group(&self, key: &K) -> Option<Rc<Vec<V>>> {
        self.store.get(key).cloned()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.store.contains(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn groupings(&self) -> Vec<Grouping<K, V>> {
        self.store
            .iter()
            .map(|(key, group)| {
                Grouping::new(key.clone(), Sequence::from_shared(Rc::clone(group)))
            })
            .collect()
    }

    pub fn to_sequence(&self) -> Sequence<Grouping<K, V>> {
        Sequence::from_vec(self.groupings())
    }
}

impl<K, V, C> fmt::Debug for Lookup<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
    C: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.store.iter().map(|(k, v)| (k, v.as_slice())))
            .finish()
    }
}

/// A sequence of elements that share `key`.
pub struct Grouping<K, T> {
    key: K,
    elements: Sequence<T>,
}

impl<K: Clone, T> Clone for Grouping<K, T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            elements: self.elements.clone(),
        }
    }
}

impl<K, T> Grouping<K, T> {
    pub fn new(key: K, elements: Sequence<T>) -> Self {
        Self { key, elements }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn elements(&self) -> &Sequence<T> {
        &self.elements
    }

    pub fn into_sequence(self) -> Sequence<T> {
        self.elements
    }

    pub fn into_parts(self) -> (K, Sequence<T>) {
        (self.key, self.elements)
    }
}

impl<K, T> Deref for Grouping<K, T> {
    type Target = Sequence<T>;

    fn deref(&self) -> &Sequence<T> {
        &self.elements
    }
}

impl<K: fmt::Debug, T> fmt::Debug for Grouping<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grouping")
            .field("key", &self.key)
            .field("elements", &self.elements)
            .finish()
    }
}

impl<K, T> From<Grouping<K, T>> for SourceKind<T> {
    fn from(group: Grouping<K, T>) -> Self {
        SourceKind::Sequence(group.elements)
    }
}

impl<K, T> From<&Grouping<K, T>> for SourceKind<T> {
    fn from(group: &Grouping<K, T>) -> Self {
        SourceKind::Sequence(group.elements.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn by_len(words: Vec<&'static str>) -> Lookup<usize, &'static str> {
        Lookup::build(
            &Sequence::from_vec(words),
            &|w: &&str| w.len(),
            &|w| w,
            Rc::new(|k: &usize| *k),
        )
        .unwrap()
    }

    #[test]
    fn get_is_empty_for_missing_keys() {
        let lookup = by_len(vec!["a", "bb", "cc", "d"]);
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.get(&2).to_vec().unwrap(), vec!["bb", "cc"]);
        assert!(lookup.get(&9).to_vec().unwrap().is_empty());
        assert!(lookup.contains(&1));
        assert!(!lookup.contains(&3));
    }

    #[test]
    fn groupings_follow_first_key_occurrence() {
        let lookup = by_len(vec!["ccc", "a", "bbb", "d"]);
        let keys: Vec<usize> = lookup.groupings().iter().map(|g| *g.key()).collect();
        assert_eq!(keys, vec![3, 1]);
        let first = lookup.to_sequence().first().unwrap();
        assert_eq!(first.to_vec().unwrap(), vec!["ccc", "bbb"]);
    }

    #[test]
    fn projected_key_equality() {
        let lookup: Lookup<String, i32, String> = Lookup::build(
            &Sequence::from_vec(vec![("A", 1), ("a", 2), ("b", 3)]),
            &|(k, _): &(&str, i32)| k.to_string(),
            &|(_, v)| v,
            Rc::new(|k: &String| k.to_lowercase()),
        )
        .unwrap();
        assert_eq!(lookup.len(), 2);
        assert_eq!(lookup.get(&"A".to_string()).to_vec().unwrap(), vec![1, 2]);
    }
}
