//! The lazy pipeline node and its construction boundary.
//!
//! A `Sequence<T>` owns a shared `Source<T>`; operators never touch an
//! existing sequence, they wrap its source in a new one whose cursors drive
//! the upstream cursor. `SourceKind` is the single place where the kinds of
//! input a caller can hand over (nothing, one value, a vector, a sequence)
//! are told apart.

use std::fmt;
use std::rc::Rc;

use lazyseq_core::error::merge_release;

use crate::array::ArrayView;
use crate::traits::{Cursor, Result, Source};

pub struct Sequence<T> {
    source: Rc<dyn Source<T>>,
}

impl<T> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Self {
            source: Rc::clone(&self.source),
        }
    }
}

impl<T> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("source", &self.source.name())
            .field("known_len", &self.source.known_len())
            .finish()
    }
}

/// `Source` built from a cursor factory closure.
struct FnSource<F> {
    name: &'static str,
    factory: F,
}

impl<T, F> Source<T> for FnSource<F>
where
    F: Fn() -> Cursor<T>,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn cursor(&self) -> Cursor<T> {
        (self.factory)()
    }
}

impl<T: 'static> Sequence<T> {
    pub fn from_source(source: impl Source<T> + 'static) -> Self {
        Self {
            source: Rc::new(source),
        }
    }

    /// Sequence whose traversals are produced by `factory`.
    ///
    /// The factory must hand out independent cursors for the result to be
    /// replayable.
    pub fn from_fn(factory: impl Fn() -> Cursor<T> + 'static) -> Self {
        Self::named("fn", factory)
    }

    pub(crate) fn named(name: &'static str, factory: impl Fn() -> Cursor<T> + 'static) -> Self {
        Self::from_source(FnSource { name, factory })
    }

    pub fn empty() -> Self {
        Self::named("empty", Cursor::empty)
    }

    /// Start an independent traversal.
    pub fn cursor(&self) -> Cursor<T> {
        self.source.cursor()
    }

    pub fn name(&self) -> &'static str {
        self.source.name()
    }

    /// Materialized elements, when the sequence is array-backed.
    pub fn as_slice(&self) -> Option<&[T]> {
        self.source.as_slice()
    }

    pub(crate) fn as_array(&self) -> Option<&ArrayView<T>> {
        self.source.as_array()
    }

    pub fn known_len(&self) -> Option<usize> {
        self.source.known_len()
    }

    /// Run a terminal consumer over a fresh cursor and release the cursor
    /// afterwards, however the consumer ended.
    pub(crate) fn with_cursor<R>(
        &self,
        consume: impl FnOnce(&mut Cursor<T>) -> Result<R>,
    ) -> Result<R> {
        let mut cursor = self.cursor();
        let outcome = consume(&mut cursor);
        merge_release(outcome, cursor.dispose())
    }
}

impl<T: Clone + 'static> Sequence<T> {
    /// Array-backed sequence.
    pub fn from_vec(values: Vec<T>) -> Self {
        Self::from_source(ArrayView::new(values))
    }

    pub fn from_shared(values: Rc<Vec<T>>) -> Self {
        Self::from_source(ArrayView::shared(values))
    }

    pub fn from_iter_values(values: impl IntoIterator<Item = T>) -> Self {
        Self::from_vec(values.into_iter().collect())
    }

    /// One-element sequence.
    pub fn once(value: T) -> Self {
        Self::from_vec(vec![value])
    }

    /// Adapt anything convertible into a `SourceKind`.
    pub fn of(source: impl Into<SourceKind<T>>) -> Self {
        source.into().into_sequence()
    }

    /// Drain a fresh traversal into a vector.
    pub(crate) fn drain(&self) -> Result<Vec<T>> {
        if let Some(items) = self.as_slice() {
            return Ok(items.to_vec());
        }
        let mut cursor = self.cursor();
        let mut out = Vec::with_capacity(self.known_len().unwrap_or(0));
        while let Some(value) = cursor.next_value()? {
            out.push(value);
        }
        Ok(out)
    }
}

/// The kinds of input accepted at the construction boundary.
pub enum SourceKind<T> {
    Empty,
    Scalar(T),
    Array(Vec<T>),
    Sequence(Sequence<T>),
}

impl<T: Clone + 'static> SourceKind<T> {
    pub fn into_sequence(self) -> Sequence<T> {
        match self {
            SourceKind::Empty => Sequence::empty(),
            SourceKind::Scalar(value) => Sequence::once(value),
            SourceKind::Array(values) => Sequence::from_vec(values),
            SourceKind::Sequence(seq) => seq,
        }
    }
}

impl<T> From<Vec<T>> for SourceKind<T> {
    fn from(values: Vec<T>) -> Self {
        SourceKind::Array(values)
    }
}

impl<T: Clone> From<&[T]> for SourceKind<T> {
    fn from(values: &[T]) -> Self {
        SourceKind::Array(values.to_vec())
    }
}

impl<T> From<Option<T>> for SourceKind<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => SourceKind::Scalar(v),
            None => SourceKind::Empty,
        }
    }
}

impl<T> From<Sequence<T>> for SourceKind<T> {
    fn from(seq: Sequence<T>) -> Self {
        SourceKind::Sequence(seq)
    }
}

impl<T> From<&Sequence<T>> for SourceKind<T> {
    fn from(seq: &Sequence<T>) -> Self {
        SourceKind::Sequence(seq.clone())
    }
}

impl<T: Clone + 'static> From<SourceKind<T>> for Sequence<T> {
    fn from(kind: SourceKind<T>) -> Self {
        kind.into_sequence()
    }
}

impl<T: Clone + 'static> From<Vec<T>> for Sequence<T> {
    fn from(values: Vec<T>) -> Self {
        Sequence::from_vec(values)
    }
}

impl<T: Clone + 'static> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Sequence::from_iter_values(iter)
    }
}

impl<T> IntoIterator for &Sequence<T> {
    type Item = Result<T>;
    type IntoIter = Cursor<T>;

    fn into_iter(self) -> Cursor<T> {
        self.source.cursor()
    }
}
