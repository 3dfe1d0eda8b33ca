//! Sort plan: a chain of key levels, primary first.
//!
//! Each `then_by` adds a node whose `parent` is the plan it refines, so a
//! plan never changes once built and two orderings may share a prefix.
//! Keys for every level are extracted once per traversal, up front, and
//! comparisons work on element positions.

use std::cmp::Ordering;
use std::rc::Rc;

/// Extracted keys of one level, compared by element position.
pub(crate) trait KeyColumn {
    fn compare(&self, a: usize, b: usize) -> Ordering;
}

struct Keys<K> {
    keys: Vec<K>,
}

impl<K: Ord> KeyColumn for Keys<K> {
    fn compare(&self, a: usize, b: usize) -> Ordering {
        match (self.keys.get(a), self.keys.get(b)) {
            (Some(x), Some(y)) => x.cmp(y),
            _ => Ordering::Equal,
        }
    }
}

/// A key selector with its key type erased.
pub(crate) trait KeyLevel<T> {
    fn extract(&self, items: &[T]) -> Box<dyn KeyColumn>;
}

struct Selector<T, K> {
    key: Rc<dyn Fn(&T) -> K>,
}

impl<T, K: Ord + 'static> KeyLevel<T> for Selector<T, K> {
    fn extract(&self, items: &[T]) -> Box<dyn KeyColumn> {
        Box::new(Keys {
            keys: items.iter().map(|x| (self.key)(x)).collect(),
        })
    }
}

pub(crate) struct SortPlan<T> {
    level: Box<dyn KeyLevel<T>>,
    descending: bool,
    parent: Option<Rc<SortPlan<T>>>,
}

impl<T: 'static> SortPlan<T> {
    pub(crate) fn root<K: Ord + 'static>(
        key: impl Fn(&T) -> K + 'static,
        descending: bool,
    ) -> Rc<Self> {
        Rc::new(Self {
            level: Box::new(Selector { key: Rc::new(key) }),
            descending,
            parent: None,
        })
    }

    /// A plan that breaks ties of `parent` with `key`.
    pub(crate) fn refine<K: Ord + 'static>(
        parent: &Rc<Self>,
        key: impl Fn(&T) -> K + 'static,
        descending: bool,
    ) -> Rc<Self> {
        Rc::new(Self {
            level: Box::new(Selector { key: Rc::new(key) }),
            descending,
            parent: Some(Rc::clone(parent)),
        })
    }
}

impl<T> SortPlan<T> {
    /// Levels from primary to most specific.
    fn levels(&self) -> Vec<&SortPlan<T>> {
        let mut chain = vec![self];
        let mut node = self;
        while let Some(parent) = node.parent.as_deref() {
            chain.push(parent);
            node = parent;
        }
        chain.reverse();
        chain
    }

    pub(crate) fn depth(&self) -> usize {
        self.levels().len()
    }

    /// Positions of `items` in sorted order. Ties on every level keep their
    /// source order.
    pub(crate) fn order(&self, items: &[T]) -> Vec<usize> {
        let columns: Vec<(Box<dyn KeyColumn>, bool)> = self
            .levels()
            .into_iter()
            .map(|node| (node.level.extract(items), node.descending))
            .collect();

        let mut positions: Vec<usize> = (0..items.len()).collect();
        positions.sort_by(|&a, &b| {
            for (column, descending) in &columns {
                let ord = column.compare(a, b);
                let ord = if *descending { ord.reverse() } else { ord };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            a.cmp(&b)
        });
        positions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_then_secondary() {
        let items = vec![(2, 'b'), (1, 'z'), (2, 'a'), (1, 'y')];
        let plan = SortPlan::root(|x: &(i32, char)| x.0, false);
        let plan = SortPlan::refine(&plan, |x: &(i32, char)| x.1, true);
        assert_eq!(plan.depth(), 2);
        assert_eq!(plan.order(&items), vec![1, 3, 0, 2]);
    }

    #[test]
    fn descending_keeps_ties_stable() {
        let items = vec![1, 3, 1, 3];
        let plan = SortPlan::root(|x: &i32| *x, true);
        assert_eq!(plan.order(&items), vec![1, 3, 0, 2]);
    }

    #[test]
    fn refining_does_not_touch_the_parent() {
        let items = vec![(1, 2), (1, 1)];
        let base = SortPlan::root(|x: &(i32, i32)| x.0, false);
        let refined = SortPlan::refine(&base, |x: &(i32, i32)| x.1, false);
        assert_eq!(base.order(&items), vec![0, 1]);
        assert_eq!(refined.order(&items), vec![1, 0]);
    }
}
