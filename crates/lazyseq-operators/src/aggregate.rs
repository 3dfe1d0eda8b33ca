//! Folding terminal operators.

use std::iter::Sum;

use crate::sequence::Sequence;
use crate::traits::{Cursor, Error, Result};

/// Fold seeded with the first element; an empty input is an error named
/// after `op`.
fn fold_first<T>(
    op: &'static str,
    cursor: &mut Cursor<T>,
    mut func: impl FnMut(T, T) -> T,
) -> Result<T> {
    let mut acc = cursor.next_value()?.ok_or(Error::EmptySequence { op })?;
    while let Some(value) = cursor.next_value()? {
        acc = func(acc, value);
    }
    Ok(acc)
}

impl<T: 'static> Sequence<T> {
    pub fn aggregate<A>(&self, seed: A, func: impl Fn(A, T) -> A) -> Result<A> {
        self.with_cursor(|cursor| {
            let mut acc = seed;
            while let Some(value) = cursor.next_value()? {
                acc = func(acc, value);
            }
            Ok(acc)
        })
    }

    /// `aggregate`, then `result` applied to the final accumulator.
    pub fn aggregate_with<A, R>(
        &self,
        seed: A,
        func: impl Fn(A, T) -> A,
        result: impl FnOnce(A) -> R,
    ) -> Result<R> {
        self.aggregate(seed, func).map(result)
    }

    /// Fold without a seed: the first element starts the accumulator.
    pub fn reduce(&self, func: impl Fn(T, T) -> T) -> Result<T> {
        self.with_cursor(|cursor| fold_first("reduce", cursor, func))
    }

    pub fn sum_by<N: Sum<N>>(&self, selector: impl Fn(T) -> N) -> Result<N> {
        self.with_cursor(|cursor| cursor.by_ref().map(|x| x.map(&selector)).sum())
    }

    /// Arithmetic mean of `selector` over every element.
    pub fn average_by(&self, selector: impl Fn(T) -> f64) -> Result<f64> {
        let (total, count) = self.aggregate((0.0, 0usize), |(total, count), x| {
            (total + selector(x), count + 1)
        })?;
        if count == 0 {
            return Err(Error::EmptySequence { op: "average" });
        }
        Ok(total / count as f64)
    }

    pub fn count(&self) -> Result<usize> {
        if let Some(len) = self.known_len() {
            return Ok(len);
        }
        self.with_cursor(|cursor| {
            let mut count = 0;
            while cursor.advance()? {
                count += 1;
            }
            Ok(count)
        })
    }

    pub fn count_by(&self, predicate: impl Fn(&T) -> bool) -> Result<usize> {
        self.aggregate(0, |count, x| if predicate(&x) { count + 1 } else { count })
    }

    /// Element with the greatest key; on ties the later element wins.
    pub fn max_by_key<K: Ord>(&self, key: impl Fn(&T) -> K) -> Result<T> {
        self.with_cursor(|cursor| {
            fold_first("max_by_key", cursor, |best, x| {
                if key(&x) >= key(&best) {
                    x
                } else {
                    best
                }
            })
        })
    }

    /// Element with the smallest key; on ties the later element wins.
    pub fn min_by_key<K: Ord>(&self, key: impl Fn(&T) -> K) -> Result<T> {
        self.with_cursor(|cursor| {
            fold_first("min_by_key", cursor, |best, x| {
                if key(&x) <= key(&best) {
                    x
                } else {
                    best
                }
            })
        })
    }
}

impl<T: Sum<T> + 'static> Sequence<T> {
    pub fn sum(&self) -> Result<T> {
        self.with_cursor(|cursor| cursor.by_ref().sum())
    }
}

impl<T: Ord + 'static> Sequence<T> {
    pub fn max(&self) -> Result<T> {
        self.with_cursor(|cursor| fold_first("max", cursor, std::cmp::max))
    }

    pub fn min(&self) -> Result<T> {
        self.with_cursor(|cursor| fold_first("min", cursor, std::cmp::min))
    }
}
