//! Element access and quantifiers: iteration with early exit.

use crate::sequence::Sequence;
use crate::traits::{Cursor, Error, Result};

fn find_first<T>(cursor: &mut Cursor<T>, predicate: &dyn Fn(&T) -> bool) -> Result<Option<T>> {
    while let Some(value) = cursor.next_value()? {
        if predicate(&value) {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

fn find_last<T>(cursor: &mut Cursor<T>, predicate: &dyn Fn(&T) -> bool) -> Result<Option<T>> {
    let mut found = None;
    while let Some(value) = cursor.next_value()? {
        if predicate(&value) {
            found = Some(value);
        }
    }
    Ok(found)
}

/// `Ok(None)` when nothing matches; a second match is an error.
fn find_single<T>(
    cursor: &mut Cursor<T>,
    predicate: &dyn Fn(&T) -> bool,
) -> Result<Option<T>> {
    let mut found = None;
    while let Some(value) = cursor.next_value()? {
        if predicate(&value) {
            if found.is_some() {
                return Err(Error::MultipleMatchesFound { op: "single" });
            }
            found = Some(value);
        }
    }
    Ok(found)
}

impl<T: Clone + 'static> Sequence<T> {
    pub fn element_at(&self, index: usize) -> Result<T> {
        self.element_at_checked(index)?
            .ok_or(Error::IndexOutOfRange {
                op: "element_at",
                index,
            })
    }

    pub fn element_at_or(&self, index: usize, default: T) -> Result<T> {
        Ok(self.element_at_checked(index)?.unwrap_or(default))
    }

    fn element_at_checked(&self, index: usize) -> Result<Option<T>> {
        if let Some(items) = self.as_slice() {
            return Ok(items.get(index).cloned());
        }
        self.with_cursor(|cursor| {
            let mut position = 0;
            while let Some(value) = cursor.next_value()? {
                if position == index {
                    return Ok(Some(value));
                }
                position += 1;
            }
            Ok(None)
        })
    }

    /// Fails with `EmptySequence` on empty input.
    pub fn first(&self) -> Result<T> {
        if let Some(items) = self.as_slice() {
            return items.first().cloned().ok_or(Error::EmptySequence { op: "first" });
        }
        self.with_cursor(|cursor| cursor.next_value())?
            .ok_or(Error::EmptySequence { op: "first" })
    }

    pub fn first_by(&self, predicate: impl Fn(&T) -> bool) -> Result<T> {
        self.with_cursor(|cursor| find_first(cursor, &predicate))?
            .ok_or(Error::NoMatchingElement { op: "first" })
    }

    pub fn first_or(&self, default: T) -> Result<T> {
        if let Some(items) = self.as_slice() {
            return Ok(items.first().cloned().unwrap_or(default));
        }
        self.first_by_or(|_| true, default)
    }

    pub fn first_by_or(&self, predicate: impl Fn(&T) -> bool, default: T) -> Result<T> {
        Ok(self
            .with_cursor(|cursor| find_first(cursor, &predicate))?
            .unwrap_or(default))
    }

    pub fn last(&self) -> Result<T> {
        if let Some(items) = self.as_slice() {
            return items.last().cloned().ok_or(Error::EmptySequence { op: "last" });
        }
        self.with_cursor(|cursor| find_last(cursor, &|_: &T| true))?
            .ok_or(Error::EmptySequence { op: "last" })
    }

    pub fn last_by(&self, predicate: impl Fn(&T) -> bool) -> Result<T> {
        self.with_cursor(|cursor| find_last(cursor, &predicate))?
            .ok_or(Error::NoMatchingElement { op: "last" })
    }

    pub fn last_or(&self, default: T) -> Result<T> {
        if let Some(items) = self.as_slice() {
            return Ok(items.last().cloned().unwrap_or(default));
        }
        self.last_by_or(|_| true, default)
    }

    pub fn last_by_or(&self, predicate: impl Fn(&T) -> bool, default: T) -> Result<T> {
        Ok(self
            .with_cursor(|cursor| find_last(cursor, &predicate))?
            .unwrap_or(default))
    }

    /// The only element; an error if there are none or several.
    pub fn single(&self) -> Result<T> {
        self.with_cursor(|cursor| find_single(cursor, &|_: &T| true))?
            .ok_or(Error::EmptySequence { op: "single" })
    }

    pub fn single_by(&self, predicate: impl Fn(&T) -> bool) -> Result<T> {
        self.with_cursor(|cursor| find_single(cursor, &predicate))?
            .ok_or(Error::NoMatchingElement { op: "single" })
    }

    /// `default` when nothing matches; several matches are still an error.
    pub fn single_or(&self, default: T) -> Result<T> {
        self.single_by_or(|_| true, default)
    }

    pub fn single_by_or(&self, predicate: impl Fn(&T) -> bool, default: T) -> Result<T> {
        Ok(self
            .with_cursor(|cursor| find_single(cursor, &predicate))?
            .unwrap_or(default))
    }
}

impl<T: PartialEq + 'static> Sequence<T> {
    /// Position of the first element equal to `item`.
    pub fn index_of(&self, item: &T) -> Result<Option<usize>> {
        self.with_cursor(|cursor| {
            let mut index = 0;
            while let Some(value) = cursor.next_value()? {
                if value == *item {
                    return Ok(Some(index));
                }
                index += 1;
            }
            Ok(None)
        })
    }

    pub fn last_index_of(&self, item: &T) -> Result<Option<usize>> {
        self.with_cursor(|cursor| {
            let mut found = None;
            let mut index = 0;
            while let Some(value) = cursor.next_value()? {
                if value == *item {
                    found = Some(index);
                }
                index += 1;
            }
            Ok(found)
        })
    }
}

impl<T: 'static> Sequence<T> {
    /// Whether the sequence has at least one element.
    pub fn any(&self) -> Result<bool> {
        if let Some(len) = self.known_len() {
            return Ok(len > 0);
        }
        self.with_cursor(|cursor| cursor.advance())
    }

    pub fn any_by(&self, predicate: impl Fn(&T) -> bool) -> Result<bool> {
        self.with_cursor(|cursor| {
            while let Some(value) = cursor.next_value()? {
                if predicate(&value) {
                    return Ok(true);
                }
            }
            Ok(false)
        })
    }

    /// True for an empty sequence.
    pub fn all(&self, predicate: impl Fn(&T) -> bool) -> Result<bool> {
        self.with_cursor(|cursor| {
            while let Some(value) = cursor.next_value()? {
                if !predicate(&value) {
                    return Ok(false);
                }
            }
            Ok(true)
        })
    }
}
