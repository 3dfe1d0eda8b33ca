//! Generators and construction adapters.
//!
//! Numeric generators count in `i64` and end (rather than wrap) when the
//! next value would overflow.

use std::rc::Rc;

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};

use lazyseq_core::config::SeqConfig;

use crate::sequence::Sequence;
use crate::traits::{Cursor, Error, Result, Step};

/// One entry of a key/value map adapted with `Sequence::from_map`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyValue<K, V> {
    pub key: K,
    pub value: V,
}

/// One regex match: the matched text, its byte span and capture groups
/// (group 0 excluded; unmatched optional groups are `None`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegexMatch {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub groups: Vec<Option<String>>,
}

struct RepeatWithFinalizeStep<T> {
    element: Option<T>,
    init: Rc<dyn Fn() -> T>,
    finalize: Rc<dyn Fn(T)>,
}

impl<T: Clone> Step<T> for RepeatWithFinalizeStep<T> {
    fn init(&mut self) -> Result<()> {
        self.element = Some((self.init)());
        Ok(())
    }

    fn step(&mut self) -> Result<Option<T>> {
        Ok(self.element.clone())
    }

    fn release(&mut self) -> Result<()> {
        if let Some(element) = self.element.take() {
            (self.finalize)(element);
        }
        Ok(())
    }
}

struct MatchStep {
    regex: Rc<Regex>,
    input: Rc<str>,
    pos: Option<usize>,
}

impl Step<RegexMatch> for MatchStep {
    fn step(&mut self) -> Result<Option<RegexMatch>> {
        let Some(pos) = self.pos else {
            return Ok(None);
        };
        let Some(caps) = self.regex.captures_at(&self.input, pos) else {
            self.pos = None;
            return Ok(None);
        };
        let Some(whole) = caps.get(0) else {
            self.pos = None;
            return Ok(None);
        };

        // An empty match must still move forward by one character.
        let next = if whole.end() > whole.start() {
            whole.end()
        } else {
            whole.end() + self.input[whole.end()..].chars().next().map_or(1, char::len_utf8)
        };
        self.pos = (next <= self.input.len()).then_some(next);

        Ok(Some(RegexMatch {
            text: whole.as_str().to_string(),
            start: whole.start(),
            end: whole.end(),
            groups: caps
                .iter()
                .skip(1)
                .map(|g| g.map(|m| m.as_str().to_string()))
                .collect(),
        }))
    }
}

fn counter(
    name: &'static str,
    start: i64,
    step: i64,
    limit: Option<usize>,
    keep: impl Fn(i64) -> bool + 'static,
) -> Sequence<i64> {
    let keep = Rc::new(keep);
    Sequence::named(name, move || {
        let keep = Rc::clone(&keep);
        Cursor::from_fn((Some(start), 0usize), move |(next, produced)| {
            if limit.is_some_and(|n| *produced >= n) {
                return Ok(None);
            }
            let Some(value) = *next else {
                return Ok(None);
            };
            if !keep(value) {
                *next = None;
                return Ok(None);
            }
            *next = value.checked_add(step);
            *produced += 1;
            Ok(Some(value))
        })
    })
}

impl Sequence<i64> {
    /// `count` integers from `start`, ascending by one.
    pub fn range(start: i64, count: usize) -> Self {
        Self::range_step(start, count, 1)
    }

    pub fn range_step(start: i64, count: usize, step: i64) -> Self {
        counter("range", start, step, Some(count), |_| true)
    }

    /// `count` integers from `start`, descending by `step`.
    pub fn range_down(start: i64, count: usize, step: i64) -> Self {
        counter("range_down", start, -step, Some(count), |_| true)
    }

    /// From `start` towards `to` (inclusive) by `step`, in whichever
    /// direction `to` lies.
    pub fn range_to(start: i64, to: i64, step: i64) -> Self {
        if start < to {
            counter("range_to", start, step, None, move |v| v <= to)
        } else {
            counter("range_to", start, -step, None, move |v| v >= to)
        }
    }

    pub fn to_infinity(start: i64, step: i64) -> Self {
        counter("to_infinity", start, step, None, |_| true)
    }

    pub fn to_negative_infinity(start: i64, step: i64) -> Self {
        counter("to_negative_infinity", start, -step, None, |_| true)
    }
}

impl Sequence<char> {
    pub fn from_chars(text: &str) -> Self {
        Sequence::from_vec(text.chars().collect())
    }
}

impl Sequence<RegexMatch> {
    /// Successive non-overlapping matches of `pattern` in `input`.
    ///
    /// The pattern is compiled here; matching itself is deferred.
    pub fn matches(input: &str, pattern: &str) -> Result<Self> {
        let regex = Rc::new(Regex::new(pattern).map_err(|e| Error::Pattern(e.to_string()))?);
        let input: Rc<str> = Rc::from(input);
        Ok(Sequence::named("matches", move || {
            Cursor::new(MatchStep {
                regex: Rc::clone(&regex),
                input: Rc::clone(&input),
                pos: Some(0),
            })
        }))
    }
}

impl<K: Clone + 'static, V: Clone + 'static> Sequence<KeyValue<K, V>> {
    /// Key/value entries of a map, in the map's iteration order.
    pub fn from_map(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Sequence::from_vec(
            entries
                .into_iter()
                .map(|(key, value)| KeyValue { key, value })
                .collect(),
        )
    }
}

impl<T: Clone + 'static> Sequence<T> {
    /// `value`, `count` times.
    pub fn repeat(value: T, count: usize) -> Self {
        Sequence::named("repeat", move || {
            let value = value.clone();
            Cursor::from_fn(count, move |left| {
                if *left == 0 {
                    return Ok(None);
                }
                *left -= 1;
                Ok(Some(value.clone()))
            })
        })
    }

    pub fn repeat_forever(value: T) -> Self {
        Sequence::named("repeat", move || {
            let value = value.clone();
            Cursor::from_fn((), move |_| Ok(Some(value.clone())))
        })
    }

    /// Endless repetition of a value created by `init` when the traversal
    /// starts and handed to `finalize` when the cursor is released.
    pub fn repeat_with_finalize(
        init: impl Fn() -> T + 'static,
        finalize: impl Fn(T) + 'static,
    ) -> Self {
        let init: Rc<dyn Fn() -> T> = Rc::new(init);
        let finalize: Rc<dyn Fn(T)> = Rc::new(finalize);
        Sequence::named("repeat_with_finalize", move || {
            Cursor::new(RepeatWithFinalizeStep {
                element: None,
                init: Rc::clone(&init),
                finalize: Rc::clone(&finalize),
            })
        })
    }

    /// Endless sequence of `func()` results.
    pub fn generate(func: impl Fn() -> T + 'static) -> Self {
        let func = Rc::new(func);
        Sequence::named("generate", move || {
            let func = Rc::clone(&func);
            Cursor::from_fn((), move |_| Ok(Some(func())))
        })
    }

    pub fn generate_n(func: impl Fn() -> T + 'static, count: usize) -> Self {
        let func = Rc::new(func);
        Sequence::named("generate", move || {
            let func = Rc::clone(&func);
            Cursor::from_fn(count, move |left| {
                if *left == 0 {
                    return Ok(None);
                }
                *left -= 1;
                Ok(Some(func()))
            })
        })
    }

    /// `seed`, `func(seed)`, `func(func(seed))`, ...
    pub fn unfold(seed: T, func: impl Fn(&T) -> T + 'static) -> Self {
        let func = Rc::new(func);
        Sequence::named("unfold", move || {
            let func = Rc::clone(&func);
            Cursor::from_fn(None::<T>, {
                let seed = seed.clone();
                move |last| {
                    let next = match last.as_ref() {
                        Some(prev) => func(prev),
                        None => seed.clone(),
                    };
                    *last = Some(next.clone());
                    Ok(Some(next))
                }
            })
        })
    }

    /// The given values, over and over. Empty input gives an empty sequence.
    pub fn cycle(values: Vec<T>) -> Self {
        let values = Rc::new(values);
        Sequence::named("cycle", move || {
            let values = Rc::clone(&values);
            Cursor::from_fn(0usize, move |index| {
                if values.is_empty() {
                    return Ok(None);
                }
                if *index >= values.len() {
                    *index = 0;
                }
                *index += 1;
                Ok(values.get(*index - 1).cloned())
            })
        })
    }

    /// Endless uniform picks from `values`, seeded like `shuffle`.
    pub fn choice(values: Vec<T>) -> Self {
        Self::choice_with(values, &SeqConfig::from_env())
    }

    /// Endless uniform picks from `values`. With `cfg.seed` set, every
    /// traversal produces the same picks.
    pub fn choice_with(values: Vec<T>, cfg: &SeqConfig) -> Self {
        let values = Rc::new(values);
        let cfg = cfg.clone();
        Sequence::named("choice", move || {
            let values = Rc::clone(&values);
            Cursor::from_fn(cfg.rng(), move |rng| {
                if values.is_empty() {
                    return Ok(None);
                }
                let index = rng.gen_range(0..values.len());
                Ok(values.get(index).cloned())
            })
        })
    }
}
