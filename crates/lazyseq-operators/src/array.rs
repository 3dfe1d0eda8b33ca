//! Array-backed source: a window over a shared, materialized vector.
//!
//! Operators check `Sequence::as_array()` before falling back to a cursor, so
//! length, indexing, `skip`, `take_from_last` and `reverse` stay O(1) (or
//! copy-free) on arrays.

use std::rc::Rc;

use crate::sequence::Sequence;
use crate::traits::{Cursor, Result, Source, Step};

pub struct ArrayView<T> {
    items: Rc<Vec<T>>,
    start: usize,
    end: usize,
}

impl<T> Clone for ArrayView<T> {
    fn clone(&self) -> Self {
        Self {
            items: Rc::clone(&self.items),
            start: self.start,
            end: self.end,
        }
    }
}

impl<T> ArrayView<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self::shared(Rc::new(items))
    }

    pub fn shared(items: Rc<Vec<T>>) -> Self {
        let end = items.len();
        Self {
            items,
            start: 0,
            end,
        }
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Sub-window `[from, to)` relative to this window, clamped to bounds.
    pub fn window(&self, from: usize, to: usize) -> Self {
        let to = to.min(self.len());
        let from = from.min(to);
        Self {
            items: Rc::clone(&self.items),
            start: self.start + from,
            end: self.start + to,
        }
    }
}

impl<T: Clone + 'static> ArrayView<T> {
    /// Back-to-front traversal without copying the buffer.
    pub(crate) fn reversed(&self) -> Sequence<T> {
        let view = self.clone();
        Sequence::named("array_reverse", move || {
            Cursor::new(SliceStep {
                items: Rc::clone(&view.items),
                front: view.start,
                back: view.end,
                reverse: true,
            })
        })
    }
}

impl<T: Clone + 'static> Source<T> for ArrayView<T> {
    fn name(&self) -> &'static str {
        "array"
    }

    fn cursor(&self) -> Cursor<T> {
        Cursor::new(SliceStep {
            items: Rc::clone(&self.items),
            front: self.start,
            back: self.end,
            reverse: false,
        })
    }

    fn as_array(&self) -> Option<&ArrayView<T>> {
        Some(self)
    }
}

struct SliceStep<T> {
    items: Rc<Vec<T>>,
    front: usize,
    back: usize,
    reverse: bool,
}

impl<T: Clone> Step<T> for SliceStep<T> {
    fn step(&mut self) -> Result<Option<T>> {
        if self.front >= self.back {
            return Ok(None);
        }
        let index = if self.reverse {
            self.back -= 1;
            self.back
        } else {
            self.front += 1;
            self.front - 1
        };
        Ok(self.items.get(index).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_clamps_and_stays_relative() {
        let view = ArrayView::new(vec![1, 2, 3, 4, 5]);
        let inner = view.window(1, 4);
        assert_eq!(inner.as_slice(), &[2, 3, 4]);
        assert_eq!(inner.window(1, 10).as_slice(), &[3, 4]);
        assert!(inner.window(5, 9).is_empty());
    }

    #[test]
    fn reversed_walks_back_to_front() {
        let view = ArrayView::new(vec!['a', 'b', 'c']).window(0, 2);
        assert_eq!(view.reversed().to_vec().unwrap(), vec!['b', 'a']);
    }
}
