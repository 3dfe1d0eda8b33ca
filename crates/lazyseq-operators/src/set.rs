//! Set operators backed by `HashBucketStore`.
//!
//! Every operator compares elements by a projected key (`_by` variants) or
//! by value. The right-hand side is drained into a store on the first
//! advance; the left side streams.

use std::hash::Hash;
use std::rc::Rc;

use lazyseq_core::error::merge_release;
use lazyseq_core::store::{HashBucketStore, Projection};

use crate::sequence::{Sequence, SourceKind};
use crate::traits::{bucket_capacity, Cursor, Result, Step};

type KeySet<T, C> = HashBucketStore<T, (), C>;

fn fill<T, C: Eq + Hash>(
    second: &Sequence<T>,
    project: &Projection<T, C>,
) -> Result<KeySet<T, C>>
where
    T: 'static,
{
    let capacity = bucket_capacity(second.known_len())?;
    let mut keys = HashBucketStore::with_capacity_and_projection(capacity, Rc::clone(project));
    second.with_cursor(|cursor| {
        while let Some(value) = cursor.next_value()? {
            keys.add(value, ());
        }
        Ok(())
    })?;
    Ok(keys)
}

/// Left elements whose key is neither in `second` nor already emitted.
struct ExceptStep<T, C> {
    upstream: Cursor<T>,
    second: Sequence<T>,
    project: Projection<T, C>,
    keys: Option<KeySet<T, C>>,
}

impl<T: Clone + 'static, C: Eq + Hash> Step<T> for ExceptStep<T, C> {
    fn init(&mut self) -> Result<()> {
        self.keys = Some(fill(&self.second, &self.project)?);
        Ok(())
    }

    fn step(&mut self) -> Result<Option<T>> {
        let Some(keys) = self.keys.as_mut() else {
            return Ok(None);
        };
        while let Some(value) = self.upstream.next_value()? {
            if !keys.contains(&value) {
                keys.add(value.clone(), ());
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn release(&mut self) -> Result<()> {
        self.keys = None;
        self.upstream.dispose()
    }
}

/// Left elements whose key is in `second`, each key emitted once.
struct IntersectStep<T, C> {
    upstream: Cursor<T>,
    second: Sequence<T>,
    project: Projection<T, C>,
    keys: Option<KeySet<T, C>>,
    emitted: KeySet<T, C>,
}

impl<T: Clone + 'static, C: Eq + Hash> Step<T> for IntersectStep<T, C> {
    fn init(&mut self) -> Result<()> {
        self.keys = Some(fill(&self.second, &self.project)?);
        Ok(())
    }

    fn step(&mut self) -> Result<Option<T>> {
        let Some(keys) = self.keys.as_ref() else {
            return Ok(None);
        };
        while let Some(value) = self.upstream.next_value()? {
            if keys.contains(&value) && !self.emitted.contains(&value) {
                self.emitted.add(value.clone(), ());
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn release(&mut self) -> Result<()> {
        self.keys = None;
        self.emitted.clear();
        self.upstream.dispose()
    }
}

struct UnionStep<T, C> {
    first: Cursor<T>,
    second: Cursor<T>,
    project: Projection<T, C>,
    seen: Option<KeySet<T, C>>,
}

impl<T: Clone, C: Eq + Hash> Step<T> for UnionStep<T, C> {
    fn init(&mut self) -> Result<()> {
        self.seen = Some(HashBucketStore::with_capacity_and_projection(
            bucket_capacity(None)?,
            Rc::clone(&self.project),
        ));
        Ok(())
    }

    fn step(&mut self) -> Result<Option<T>> {
        let Some(seen) = self.seen.as_mut() else {
            return Ok(None);
        };
        while let Some(value) = self.first.next_value()? {
            if !seen.contains(&value) {
                seen.add(value.clone(), ());
                return Ok(Some(value));
            }
        }
        while let Some(value) = self.second.next_value()? {
            if !seen.contains(&value) {
                seen.add(value.clone(), ());
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn release(&mut self) -> Result<()> {
        self.seen = None;
        merge_release(self.first.dispose(), self.second.dispose())
    }
}

impl<T: Clone + 'static> Sequence<T> {
    /// First occurrence of each projected key.
    pub fn distinct_by<C: Eq + Hash + 'static>(
        &self,
        project: impl Fn(&T) -> C + 'static,
    ) -> Sequence<T> {
        self.except_by(Sequence::empty(), project)
    }

    pub fn except_by<C: Eq + Hash + 'static>(
        &self,
        second: impl Into<SourceKind<T>>,
        project: impl Fn(&T) -> C + 'static,
    ) -> Sequence<T> {
        let source = self.clone();
        let second = Sequence::of(second);
        let project: Projection<T, C> = Rc::new(project);
        Sequence::named("except", move || {
            Cursor::new(ExceptStep {
                upstream: source.cursor(),
                second: second.clone(),
                project: Rc::clone(&project),
                keys: None,
            })
        })
    }

    pub fn intersect_by<C: Eq + Hash + 'static>(
        &self,
        second: impl Into<SourceKind<T>>,
        project: impl Fn(&T) -> C + 'static,
    ) -> Sequence<T> {
        let source = self.clone();
        let second = Sequence::of(second);
        let project: Projection<T, C> = Rc::new(project);
        Sequence::named("intersect", move || {
            Cursor::new(IntersectStep {
                upstream: source.cursor(),
                second: second.clone(),
                project: Rc::clone(&project),
                keys: None,
                emitted: HashBucketStore::from_projection(Rc::clone(&project)),
            })
        })
    }

    /// This sequence then `second`, deduplicated across both.
    pub fn union_by<C: Eq + Hash + 'static>(
        &self,
        second: impl Into<SourceKind<T>>,
        project: impl Fn(&T) -> C + 'static,
    ) -> Sequence<T> {
        let source = self.clone();
        let second = Sequence::of(second);
        let project: Projection<T, C> = Rc::new(project);
        Sequence::named("union", move || {
            Cursor::new(UnionStep {
                first: source.cursor(),
                second: second.cursor(),
                project: Rc::clone(&project),
                seen: None,
            })
        })
    }

    /// Whether any element projects to `key`. Stops at the first match.
    pub fn contains_by<C: PartialEq>(&self, key: &C, project: impl Fn(&T) -> C) -> Result<bool> {
        self.with_cursor(|cursor| {
            while let Some(value) = cursor.next_value()? {
                if project(&value) == *key {
                    return Ok(true);
                }
            }
            Ok(false)
        })
    }

    /// Same length and pairwise-equal projected keys.
    pub fn sequence_equal_by<C: PartialEq>(
        &self,
        second: impl Into<SourceKind<T>>,
        project: impl Fn(&T) -> C,
    ) -> Result<bool> {
        let second = Sequence::of(second);
        if let (Some(a), Some(b)) = (self.known_len(), second.known_len()) {
            if a != b {
                return Ok(false);
            }
        }
        self.with_cursor(|first| {
            second.with_cursor(|other| loop {
                match (first.next_value()?, other.next_value()?) {
                    (None, None) => return Ok(true),
                    (Some(a), Some(b)) if project(&a) == project(&b) => {}
                    _ => return Ok(false),
                }
            })
        })
    }
}

impl<T: Clone + Eq + Hash + 'static> Sequence<T> {
    pub fn distinct(&self) -> Sequence<T> {
        self.distinct_by(T::clone)
    }

    pub fn except(&self, second: impl Into<SourceKind<T>>) -> Sequence<T> {
        self.except_by(second, T::clone)
    }

    pub fn intersect(&self, second: impl Into<SourceKind<T>>) -> Sequence<T> {
        self.intersect_by(second, T::clone)
    }

    pub fn union(&self, second: impl Into<SourceKind<T>>) -> Sequence<T> {
        self.union_by(second, T::clone)
    }
}

impl<T: Clone + PartialEq + 'static> Sequence<T> {
    pub fn contains(&self, value: &T) -> Result<bool> {
        self.with_cursor(|cursor| {
            while let Some(item) = cursor.next_value()? {
                if item == *value {
                    return Ok(true);
                }
            }
            Ok(false)
        })
    }

    pub fn sequence_equal(&self, second: impl Into<SourceKind<T>>) -> Result<bool> {
        let second = Sequence::of(second);
        if let (Some(a), Some(b)) = (self.as_slice(), second.as_slice()) {
            return Ok(a == b);
        }
        self.sequence_equal_by(second, T::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_keeps_first_occurrence() {
        let seq = Sequence::from_vec(vec![1, 2, 2, 3, 1]);
        assert_eq!(seq.distinct().to_vec().unwrap(), vec![1, 2, 3]);
        let words = Sequence::from_vec(vec!["apple", "Avocado", "banana", "Berry"]);
        let by_initial = words.distinct_by(|w| w.chars().next().map(|c| c.to_ascii_lowercase()));
        assert_eq!(by_initial.to_vec().unwrap(), vec!["apple", "banana"]);
    }

    #[test]
    fn except_removes_second_and_duplicates() {
        let seq = Sequence::from_vec(vec![1, 2, 3, 3, 4, 5]);
        assert_eq!(seq.except(vec![2, 5]).to_vec().unwrap(), vec![1, 3, 4]);
    }

    #[test]
    fn intersect_emits_each_key_once() {
        let seq = Sequence::from_vec(vec![4, 1, 4, 2, 1]);
        assert_eq!(seq.intersect(vec![1, 4, 9]).to_vec().unwrap(), vec![4, 1]);
    }

    #[test]
    fn union_is_left_then_right_deduplicated() {
        let seq = Sequence::from_vec(vec![1, 2, 1]);
        assert_eq!(seq.union(vec![3, 2, 4, 3]).to_vec().unwrap(), vec![1, 2, 3, 4]);
        let by_abs = Sequence::from_vec(vec![-1, 2]).union_by(vec![1, -2, 3], |x: &i32| x.abs());
        assert_eq!(by_abs.to_vec().unwrap(), vec![-1, 2, 3]);
    }

    #[test]
    fn contains_and_sequence_equal() {
        let seq = Sequence::from_vec(vec!["a", "bb", "ccc"]);
        assert!(seq.contains(&"bb").unwrap());
        assert!(!seq.contains(&"z").unwrap());
        assert!(seq.contains_by(&3, |s| s.len()).unwrap());

        assert!(seq.sequence_equal(vec!["a", "bb", "ccc"]).unwrap());
        assert!(!seq.sequence_equal(vec!["a", "bb"]).unwrap());
        let streamed = seq.select(|s| s.len());
        assert!(streamed.sequence_equal(vec![1, 2, 3]).unwrap());
        assert!(!streamed.sequence_equal(vec![1, 2]).unwrap());
        assert!(streamed.sequence_equal_by(vec![11, 12, 13], |x| x % 10).unwrap());
    }
}
