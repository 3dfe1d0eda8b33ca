//! Order-preserving hash-bucketed store keyed by a projected comparison key.
//!
//! Entries live in an arena (`slots`) and are threaded by a doubly-linked
//! index list in insertion order. `buckets` maps `bucket_hash(project(key))`
//! to the slots whose projected key hashed there; equality is always decided
//! on the projected key itself.
//!
//! Invariants:
//! - every live slot appears in exactly one bucket and once in the list;
//! - `add` of a key whose projection is already present overwrites that
//!   entry (key and value) in its existing list position.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use crate::hash::bucket_hash;

/// Derives the comparison key used for bucketing and equality.
pub type Projection<K, C> = Rc<dyn Fn(&K) -> C>;

struct Entry<K, V, C> {
    key: K,
    value: V,
    compare_key: C,
    hash: u64,
    prev: Option<usize>,
    next: Option<usize>,
}

pub struct HashBucketStore<K, V, C = K> {
    project: Projection<K, C>,
    buckets: HashMap<u64, Vec<usize>>,
    slots: Vec<Option<Entry<K, V, C>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<K, V> HashBucketStore<K, V, K>
where
    K: Clone + Eq + Hash + 'static,
{
    /// Store comparing keys by value.
    pub fn new() -> Self {
        Self::with_projection(|k: &K| k.clone())
    }
}

impl<K, V> Default for HashBucketStore<K, V, K>
where
    K: Clone + Eq + Hash + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> HashBucketStore<K, V, C>
where
    C: Eq + Hash,
{
    pub fn with_projection(project: impl Fn(&K) -> C + 'static) -> Self {
        Self::from_projection(Rc::new(project))
    }

    pub fn from_projection(project: Projection<K, C>) -> Self {
        Self::with_capacity_and_projection(0, project)
    }

    pub fn with_capacity_and_projection(capacity: usize, project: Projection<K, C>) -> Self {
        Self {
            project,
            buckets: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    pub fn projection(&self) -> &Projection<K, C> {
        &self.project
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn entry(&self, slot: usize) -> Option<&Entry<K, V, C>> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    fn entry_mut(&mut self, slot: usize) -> Option<&mut Entry<K, V, C>> {
        self.slots.get_mut(slot).and_then(Option::as_mut)
    }

    /// Bucket position and slot of the entry whose projected key equals
    /// `compare_key`.
    fn locate(&self, hash: u64, compare_key: &C) -> Option<(usize, usize)> {
        let bucket = self.buckets.get(&hash)?;
        bucket.iter().enumerate().find_map(|(pos, &slot)| {
            let entry = self.entry(slot)?;
            (entry.compare_key == *compare_key).then_some((pos, slot))
        })
    }

    fn find(&self, key: &K) -> Option<(u64, usize, usize)> {
        let compare_key = (self.project)(key);
        let hash = bucket_hash(&compare_key);
        self.locate(hash, &compare_key)
            .map(|(pos, slot)| (hash, pos, slot))
    }

    fn alloc(&mut self, entry: Entry<K, V, C>) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(entry);
                slot
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        }
    }

    fn unlink(&mut self, prev: Option<usize>, next: Option<usize>) {
        match prev {
            Some(p) => {
                if let Some(e) = self.entry_mut(p) {
                    e.next = next;
                }
            }
            None => self.head = next,
        }
        match next {
            Some(n) => {
                if let Some(e) = self.entry_mut(n) {
                    e.prev = prev;
                }
            }
            None => self.tail = prev,
        }
    }

    /// Insert, or replace the entry with an equal projected key in place.
    /// Returns the replaced value.
    pub fn add(&mut self, key: K, value: V) -> Option<V> {
        let compare_key = (self.project)(&key);
        let hash = bucket_hash(&compare_key);

        if let Some((_, slot)) = self.locate(hash, &compare_key) {
            if let Some(entry) = self.entry_mut(slot) {
                entry.key = key;
                entry.compare_key = compare_key;
                return Some(std::mem::replace(&mut entry.value, value));
            }
        }

        let prev = self.tail;
        let slot = self.alloc(Entry {
            key,
            value,
            compare_key,
            hash,
            prev,
            next: None,
        });
        match prev {
            Some(p) => {
                if let Some(e) = self.entry_mut(p) {
                    e.next = Some(slot);
                }
            }
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
        self.buckets.entry(hash).or_default().push(slot);
        self.len += 1;
        None
    }

    /// Replace the entry for `key` only if present. Never inserts.
    pub fn set(&mut self, key: K, value: V) -> bool {
        let Some((_, _, slot)) = self.find(&key) else {
            return false;
        };
        match self.entry_mut(slot) {
            Some(entry) => {
                entry.key = key;
                entry.value = value;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let (_, _, slot) = self.find(key)?;
        self.entry(slot).map(|e| &e.value)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let (_, _, slot) = self.find(key)?;
        self.entry_mut(slot).map(|e| &mut e.value)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let (hash, pos, slot) = self.find(key)?;
        if let Some(bucket) = self.buckets.get_mut(&hash) {
            bucket.remove(pos);
            if bucket.is_empty() {
                self.buckets.remove(&hash);
            }
        }
        let entry = self.slots.get_mut(slot)?.take()?;
        debug_assert_eq!(entry.hash, hash);
        self.unlink(entry.prev, entry.next);
        self.free.push(slot);
        self.len -= 1;
        Some(entry.value)
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    /// Entries in list order.
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter {
            store: self,
            next: self.head,
            remaining: self.len,
        }
    }

    /// Consume the store, returning entries in list order.
    pub fn into_entries(mut self) -> Vec<(K, V)> {
        let mut out = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            match self.slots.get_mut(slot).and_then(Option::take) {
                Some(entry) => {
                    cursor = entry.next;
                    out.push((entry.key, entry.value));
                }
                None => break,
            }
        }
        out
    }

    /// Transform every value, keeping keys, order and bucketing.
    pub fn map_values<W>(self, mut f: impl FnMut(V) -> W) -> HashBucketStore<K, W, C> {
        let slots = self
            .slots
            .into_iter()
            .map(|slot| {
                slot.map(|e| Entry {
                    key: e.key,
                    value: f(e.value),
                    compare_key: e.compare_key,
                    hash: e.hash,
                    prev: e.prev,
                    next: e.next,
                })
            })
            .collect();
        HashBucketStore {
            project: self.project,
            buckets: self.buckets,
            slots,
            free: self.free,
            head: self.head,
            tail: self.tail,
            len: self.len,
        }
    }
}

pub struct Iter<'a, K, V, C> {
    store: &'a HashBucketStore<K, V, C>,
    next: Option<usize>,
    remaining: usize,
}

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C>
where
    C: Eq + Hash,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.next?;
        let entry = self.store.entry(slot)?;
        self.next = entry.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, C> fmt::Debug for HashBucketStore<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
    C: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys<V, C: Eq + Hash>(store: &HashBucketStore<String, V, C>) -> Vec<String> {
        store.iter().map(|(k, _)| k.clone()).collect()
    }

    #[test]
    fn add_replaces_in_place() {
        let mut store = HashBucketStore::new();
        assert_eq!(store.add("a".to_string(), 1), None);
        assert_eq!(store.add("b".to_string(), 2), None);
        assert_eq!(store.add("c".to_string(), 3), None);
        assert_eq!(store.add("a".to_string(), 10), Some(1));

        assert_eq!(store.len(), 3);
        assert_eq!(keys(&store), vec!["a", "b", "c"]);
        assert_eq!(store.get(&"a".to_string()), Some(&10));
    }

    #[test]
    fn replacement_overwrites_the_logical_key() {
        let mut store = HashBucketStore::with_projection(|k: &String| k.to_lowercase());
        store.add("Key".to_string(), 1);
        store.add("other".to_string(), 2);
        store.add("KEY".to_string(), 3);

        assert_eq!(keys(&store), vec!["KEY", "other"]);
        assert_eq!(store.get(&"key".to_string()), Some(&3));
        assert!(store.contains(&"kEy".to_string()));
    }

    #[test]
    fn remove_relinks_neighbours() {
        let mut store = HashBucketStore::new();
        for (i, k) in ["a", "b", "c", "d"].iter().enumerate() {
            store.add(k.to_string(), i);
        }
        assert_eq!(store.remove(&"b".to_string()), Some(1));
        assert_eq!(store.remove(&"d".to_string()), Some(3));
        assert_eq!(store.remove(&"zz".to_string()), None);
        assert_eq!(keys(&store), vec!["a", "c"]);

        // freed slots are reused, new entries still append
        store.add("e".to_string(), 4);
        assert_eq!(keys(&store), vec!["a", "c", "e"]);
        assert_eq!(store.remove(&"a".to_string()), Some(0));
        assert_eq!(keys(&store), vec!["c", "e"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn set_only_updates_existing_entries() {
        let mut store = HashBucketStore::new();
        store.add(1u32, "one");
        assert!(store.set(1, "uno"));
        assert!(!store.set(2, "two"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&1), Some(&"uno"));
        assert_eq!(store.get(&2), None);
    }

    #[test]
    fn clear_and_reuse() {
        let mut store = HashBucketStore::new();
        store.add(1u8, ());
        store.add(2u8, ());
        store.clear();
        assert!(store.is_empty());
        assert!(!store.contains(&1));
        store.add(3u8, ());
        assert_eq!(store.into_entries(), vec![(3u8, ())]);
    }

    #[test]
    fn map_values_keeps_order_and_lookup() {
        let mut store = HashBucketStore::new();
        store.add("x".to_string(), vec![1]);
        store.add("y".to_string(), vec![2, 3]);
        let mapped = store.map_values(|v| v.len());
        assert_eq!(mapped.get(&"y".to_string()), Some(&2));
        assert_eq!(keys(&mapped), vec!["x", "y"]);
    }

    #[test]
    fn get_mut_updates_value() {
        let mut store = HashBucketStore::new();
        store.add(7i64, vec!['a']);
        if let Some(v) = store.get_mut(&7) {
            v.push('b');
        }
        assert_eq!(store.get(&7), Some(&vec!['a', 'b']));
    }
}
