//! Filtering, paging and splicing operators.

use std::collections::VecDeque;
use std::rc::Rc;

use lazyseq_core::error::merge_release;

use crate::sequence::{Sequence, SourceKind};
use crate::traits::{Cursor, Predicate, Result, Step};

type TryPredicate<T> = Rc<dyn Fn(&T, usize) -> Result<bool>>;

struct FilterStep<T> {
    upstream: Cursor<T>,
    predicate: TryPredicate<T>,
    index: usize,
}

impl<T> Step<T> for FilterStep<T> {
    fn step(&mut self) -> Result<Option<T>> {
        while let Some(value) = self.upstream.next_value()? {
            let index = self.index;
            self.index += 1;
            if (self.predicate)(&value, index)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    fn release(&mut self) -> Result<()> {
        self.upstream.dispose()
    }
}

struct SkipStep<T> {
    upstream: Cursor<T>,
    count: usize,
}

impl<T> Step<T> for SkipStep<T> {
    fn init(&mut self) -> Result<()> {
        for _ in 0..self.count {
            if self.upstream.next_value()?.is_none() {
                break;
            }
        }
        Ok(())
    }

    fn step(&mut self) -> Result<Option<T>> {
        self.upstream.next_value()
    }

    fn release(&mut self) -> Result<()> {
        self.upstream.dispose()
    }
}

struct SkipWhileStep<T> {
    upstream: Cursor<T>,
    predicate: Predicate<T>,
    skipping: bool,
}

impl<T> Step<T> for SkipWhileStep<T> {
    fn step(&mut self) -> Result<Option<T>> {
        while self.skipping {
            let Some(value) = self.upstream.next_value()? else {
                return Ok(None);
            };
            if !(self.predicate)(&value) {
                self.skipping = false;
                return Ok(Some(value));
            }
        }
        self.upstream.next_value()
    }

    fn release(&mut self) -> Result<()> {
        self.upstream.dispose()
    }
}

struct TakeStep<T> {
    upstream: Cursor<T>,
    left: usize,
}

impl<T> Step<T> for TakeStep<T> {
    fn step(&mut self) -> Result<Option<T>> {
        if self.left == 0 {
            return Ok(None);
        }
        self.left -= 1;
        self.upstream.next_value()
    }

    fn release(&mut self) -> Result<()> {
        self.upstream.dispose()
    }
}

struct TakeWhileStep<T> {
    upstream: Cursor<T>,
    predicate: Predicate<T>,
}

impl<T> Step<T> for TakeWhileStep<T> {
    fn step(&mut self) -> Result<Option<T>> {
        match self.upstream.next_value()? {
            Some(value) if (self.predicate)(&value) => Ok(Some(value)),
            _ => Ok(None),
        }
    }

    fn release(&mut self) -> Result<()> {
        self.upstream.dispose()
    }
}

/// Holds back the last `count` elements seen so far.
struct TakeExceptLastStep<T> {
    upstream: Cursor<T>,
    count: usize,
    queue: VecDeque<T>,
}

impl<T> Step<T> for TakeExceptLastStep<T> {
    fn step(&mut self) -> Result<Option<T>> {
        while let Some(value) = self.upstream.next_value()? {
            self.queue.push_back(value);
            if self.queue.len() > self.count {
                return Ok(self.queue.pop_front());
            }
        }
        Ok(None)
    }

    fn release(&mut self) -> Result<()> {
        self.upstream.dispose()
    }
}

struct TakeFromLastStep<T> {
    upstream: Cursor<T>,
    count: usize,
    queue: VecDeque<T>,
}

impl<T> Step<T> for TakeFromLastStep<T> {
    fn init(&mut self) -> Result<()> {
        while let Some(value) = self.upstream.next_value()? {
            if self.queue.len() == self.count {
                self.queue.pop_front();
            }
            self.queue.push_back(value);
        }
        Ok(())
    }

    fn step(&mut self) -> Result<Option<T>> {
        Ok(self.queue.pop_front())
    }

    fn release(&mut self) -> Result<()> {
        self.upstream.dispose()
    }
}

struct DefaultIfEmptyStep<T> {
    upstream: Cursor<T>,
    default: Option<T>,
}

impl<T> Step<T> for DefaultIfEmptyStep<T> {
    fn step(&mut self) -> Result<Option<T>> {
        match self.upstream.next_value()? {
            Some(value) => {
                self.default = None;
                Ok(Some(value))
            }
            None => Ok(self.default.take()),
        }
    }

    fn release(&mut self) -> Result<()> {
        self.upstream.dispose()
    }
}

struct ConcatStep<T> {
    first: Cursor<T>,
    second: Cursor<T>,
}

impl<T> Step<T> for ConcatStep<T> {
    fn step(&mut self) -> Result<Option<T>> {
        if let Some(value) = self.first.next_value()? {
            return Ok(Some(value));
        }
        self.second.next_value()
    }

    fn release(&mut self) -> Result<()> {
        merge_release(self.first.dispose(), self.second.dispose())
    }
}

struct InsertStep<T> {
    first: Cursor<T>,
    second: Cursor<T>,
    index: usize,
    count: usize,
    inserted: bool,
}

impl<T> Step<T> for InsertStep<T> {
    fn step(&mut self) -> Result<Option<T>> {
        if self.count == self.index {
            if let Some(value) = self.second.next_value()? {
                self.inserted = true;
                return Ok(Some(value));
            }
        }
        if let Some(value) = self.first.next_value()? {
            self.count += 1;
            return Ok(Some(value));
        }
        if !self.inserted {
            return self.second.next_value();
        }
        Ok(None)
    }

    fn release(&mut self) -> Result<()> {
        merge_release(self.first.dispose(), self.second.dispose())
    }
}

/// One element of lookahead decides whether a separator is due.
struct AlternateStep<T> {
    upstream: Cursor<T>,
    separator: T,
    lookahead: Option<T>,
    separator_due: bool,
}

impl<T: Clone> Step<T> for AlternateStep<T> {
    fn init(&mut self) -> Result<()> {
        self.lookahead = self.upstream.next_value()?;
        Ok(())
    }

    fn step(&mut self) -> Result<Option<T>> {
        if self.separator_due {
            self.separator_due = false;
            return Ok(Some(self.separator.clone()));
        }
        let Some(current) = self.lookahead.take() else {
            return Ok(None);
        };
        self.lookahead = self.upstream.next_value()?;
        self.separator_due = self.lookahead.is_some();
        Ok(Some(current))
    }

    fn release(&mut self) -> Result<()> {
        self.upstream.dispose()
    }
}

impl<T: 'static> Sequence<T> {
    pub fn filter(&self, predicate: impl Fn(&T) -> bool + 'static) -> Sequence<T> {
        self.try_filter_indexed(move |x, _| Ok(predicate(x)))
    }

    pub fn filter_indexed(&self, predicate: impl Fn(&T, usize) -> bool + 'static) -> Sequence<T> {
        self.try_filter_indexed(move |x, i| Ok(predicate(x, i)))
    }

    /// `filter` with a fallible predicate.
    pub fn try_filter(&self, predicate: impl Fn(&T) -> Result<bool> + 'static) -> Sequence<T> {
        self.try_filter_indexed(move |x, _| predicate(x))
    }

    fn try_filter_indexed(
        &self,
        predicate: impl Fn(&T, usize) -> Result<bool> + 'static,
    ) -> Sequence<T> {
        let source = self.clone();
        let predicate: TryPredicate<T> = Rc::new(predicate);
        Sequence::named("filter", move || {
            Cursor::new(FilterStep {
                upstream: source.cursor(),
                predicate: Rc::clone(&predicate),
                index: 0,
            })
        })
    }

    pub fn skip_while(&self, predicate: impl Fn(&T) -> bool + 'static) -> Sequence<T> {
        let source = self.clone();
        let predicate: Predicate<T> = Rc::new(predicate);
        Sequence::named("skip_while", move || {
            Cursor::new(SkipWhileStep {
                upstream: source.cursor(),
                predicate: Rc::clone(&predicate),
                skipping: true,
            })
        })
    }

    /// At most the first `count` elements. Upstream is never advanced past
    /// the last element taken.
    pub fn take(&self, count: usize) -> Sequence<T> {
        let source = self.clone();
        Sequence::named("take", move || {
            Cursor::new(TakeStep {
                upstream: source.cursor(),
                left: count,
            })
        })
    }

    pub fn take_while(&self, predicate: impl Fn(&T) -> bool + 'static) -> Sequence<T> {
        let source = self.clone();
        let predicate: Predicate<T> = Rc::new(predicate);
        Sequence::named("take_while", move || {
            Cursor::new(TakeWhileStep {
                upstream: source.cursor(),
                predicate: Rc::clone(&predicate),
            })
        })
    }
}

impl<T: Clone + 'static> Sequence<T> {
    pub fn skip(&self, count: usize) -> Sequence<T> {
        if let Some(view) = self.as_array() {
            return Sequence::from_source(view.window(count, view.len()));
        }
        let source = self.clone();
        Sequence::named("skip", move || {
            Cursor::new(SkipStep {
                upstream: source.cursor(),
                count,
            })
        })
    }

    /// All but the last `count` elements.
    pub fn take_except_last(&self, count: usize) -> Sequence<T> {
        if count == 0 {
            return self.clone();
        }
        if let Some(view) = self.as_array() {
            return Sequence::from_source(view.window(0, view.len().saturating_sub(count)));
        }
        let source = self.clone();
        Sequence::named("take_except_last", move || {
            Cursor::new(TakeExceptLastStep {
                upstream: source.cursor(),
                count,
                queue: VecDeque::new(),
            })
        })
    }

    /// The last `count` elements. Drains upstream on the first advance.
    pub fn take_from_last(&self, count: usize) -> Sequence<T> {
        if count == 0 {
            return Sequence::empty();
        }
        if let Some(view) = self.as_array() {
            return Sequence::from_source(view.window(view.len().saturating_sub(count), view.len()));
        }
        let source = self.clone();
        Sequence::named("take_from_last", move || {
            Cursor::new(TakeFromLastStep {
                upstream: source.cursor(),
                count,
                queue: VecDeque::new(),
            })
        })
    }

    /// `value` once if this sequence turns out to be empty.
    pub fn default_if_empty(&self, value: T) -> Sequence<T> {
        let source = self.clone();
        Sequence::named("default_if_empty", move || {
            Cursor::new(DefaultIfEmptyStep {
                upstream: source.cursor(),
                default: Some(value.clone()),
            })
        })
    }

    pub fn concat(&self, second: impl Into<SourceKind<T>>) -> Sequence<T> {
        let source = self.clone();
        let second = Sequence::of(second);
        Sequence::named("concat", move || {
            Cursor::new(ConcatStep {
                first: source.cursor(),
                second: second.cursor(),
            })
        })
    }

    /// Splice `second` in before the element at `index`; appended when this
    /// sequence is shorter than `index`.
    pub fn insert(&self, index: usize, second: impl Into<SourceKind<T>>) -> Sequence<T> {
        let source = self.clone();
        let second = Sequence::of(second);
        Sequence::named("insert", move || {
            Cursor::new(InsertStep {
                first: source.cursor(),
                second: second.cursor(),
                index,
                count: 0,
                inserted: false,
            })
        })
    }

    /// `separator` between every two consecutive elements.
    pub fn alternate(&self, separator: T) -> Sequence<T> {
        let source = self.clone();
        Sequence::named("alternate", move || {
            Cursor::new(AlternateStep {
                upstream: source.cursor(),
                separator: separator.clone(),
                lookahead: None,
                separator_due: false,
            })
        })
    }
}
