//! Tree flattening over a self-referential expansion function.

use std::rc::Rc;

use lazyseq_core::error::merge_release;

use crate::sequence::{Sequence, SourceKind};
use crate::traits::{Cursor, Result, Step};

type Expand<T> = Rc<dyn Fn(&T) -> SourceKind<T>>;
type Emit<T, R> = Rc<dyn Fn(T, usize) -> R>;

/// Level by level: the elements of one level are buffered and expanded
/// into the next once the level is exhausted.
struct BreadthFirstStep<T, R> {
    current: Cursor<T>,
    buffer: Vec<T>,
    depth: usize,
    expand: Expand<T>,
    emit: Emit<T, R>,
}

impl<T: Clone + 'static, R> Step<R> for BreadthFirstStep<T, R> {
    fn step(&mut self) -> Result<Option<R>> {
        loop {
            if let Some(value) = self.current.next_value()? {
                self.buffer.push(value.clone());
                return Ok(Some((self.emit)(value, self.depth)));
            }
            if self.buffer.is_empty() {
                return Ok(None);
            }
            let expand = Rc::clone(&self.expand);
            let level = Sequence::from_vec(std::mem::take(&mut self.buffer));
            let next = level.select_many(move |x| expand(x));
            self.current.dispose()?;
            self.current = next.cursor();
            self.depth += 1;
        }
    }

    fn release(&mut self) -> Result<()> {
        self.buffer.clear();
        self.current.dispose()
    }
}

/// Explicit stack of the cursors above the current one.
struct DepthFirstStep<T, R> {
    current: Cursor<T>,
    stack: Vec<Cursor<T>>,
    expand: Expand<T>,
    emit: Emit<T, R>,
}

impl<T: Clone + 'static, R> Step<R> for DepthFirstStep<T, R> {
    fn step(&mut self) -> Result<Option<R>> {
        loop {
            if let Some(value) = self.current.next_value()? {
                let children = (self.expand)(&value).into_sequence().cursor();
                let out = (self.emit)(value, self.stack.len());
                self.stack.push(std::mem::replace(&mut self.current, children));
                return Ok(Some(out));
            }
            let Some(parent) = self.stack.pop() else {
                return Ok(None);
            };
            self.current.dispose()?;
            self.current = parent;
        }
    }

    fn release(&mut self) -> Result<()> {
        let mut outcome = self.current.dispose();
        while let Some(mut cursor) = self.stack.pop() {
            outcome = merge_release(outcome, cursor.dispose());
        }
        outcome
    }
}

impl<T: Clone + 'static> Sequence<T> {
    /// All nodes reachable through `expand`, shallowest level first.
    pub fn cascade_breadth_first<S>(&self, expand: impl Fn(&T) -> S + 'static) -> Sequence<T>
    where
        S: Into<SourceKind<T>>,
    {
        self.cascade_breadth_first_with(expand, |x, _| x)
    }

    /// `cascade_breadth_first` with `emit(node, depth)` applied to every
    /// node (roots are depth 0).
    pub fn cascade_breadth_first_with<S, R>(
        &self,
        expand: impl Fn(&T) -> S + 'static,
        emit: impl Fn(T, usize) -> R + 'static,
    ) -> Sequence<R>
    where
        S: Into<SourceKind<T>>,
        R: 'static,
    {
        let source = self.clone();
        let expand: Expand<T> = Rc::new(move |x: &T| expand(x).into());
        let emit: Emit<T, R> = Rc::new(emit);
        Sequence::named("cascade_breadth_first", move || {
            Cursor::new(BreadthFirstStep {
                current: source.cursor(),
                buffer: Vec::new(),
                depth: 0,
                expand: Rc::clone(&expand),
                emit: Rc::clone(&emit),
            })
        })
    }

    /// All nodes reachable through `expand`, each node followed by its
    /// descendants.
    pub fn cascade_depth_first<S>(&self, expand: impl Fn(&T) -> S + 'static) -> Sequence<T>
    where
        S: Into<SourceKind<T>>,
    {
        self.cascade_depth_first_with(expand, |x, _| x)
    }

    pub fn cascade_depth_first_with<S, R>(
        &self,
        expand: impl Fn(&T) -> S + 'static,
        emit: impl Fn(T, usize) -> R + 'static,
    ) -> Sequence<R>
    where
        S: Into<SourceKind<T>>,
        R: 'static,
    {
        let source = self.clone();
        let expand: Expand<T> = Rc::new(move |x: &T| expand(x).into());
        let emit: Emit<T, R> = Rc::new(emit);
        Sequence::named("cascade_depth_first", move || {
            Cursor::new(DepthFirstStep {
                current: source.cursor(),
                stack: Vec::new(),
                expand: Rc::clone(&expand),
                emit: Rc::clone(&emit),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    // children of n are 2n and 2n+1, up to 7
    fn children(n: &u32) -> Vec<u32> {
        [2 * n, 2 * n + 1].into_iter().filter(|c| *c <= 7).collect()
    }

    #[test]
    fn breadth_first_visits_levels_in_order() {
        let out = Sequence::once(1u32)
            .cascade_breadth_first_with(children, |n, depth| (n, depth))
            .to_vec()
            .unwrap();
        assert_eq!(
            out,
            vec![(1, 0), (2, 1), (3, 1), (4, 2), (5, 2), (6, 2), (7, 2)]
        );
    }

    #[test]
    fn breadth_first_expands_each_node_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let out = Sequence::once(1u32)
            .cascade_breadth_first(move |n| {
                counter.set(counter.get() + 1);
                children(n)
            })
            .to_vec()
            .unwrap();
        assert_eq!(out.len(), 7);
        assert_eq!(calls.get(), 7);
    }

    #[test]
    fn depth_first_visits_subtrees() {
        let out = Sequence::once(1u32)
            .cascade_depth_first_with(children, |n, depth| (n, depth))
            .to_vec()
            .unwrap();
        assert_eq!(
            out,
            vec![(1, 0), (2, 1), (4, 2), (5, 2), (3, 1), (6, 2), (7, 2)]
        );
    }

    #[test]
    fn depth_first_stops_early_on_take() {
        let out = Sequence::once(1u32)
            .cascade_depth_first(|n| Some(n + 1))
            .take(4)
            .to_vec()
            .unwrap();
        assert_eq!(out, vec![1, 2, 3, 4]);
    }
}
