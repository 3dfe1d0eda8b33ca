//! Ordering operators: `order_by` chains, `reverse`, `shuffle`.
//!
//! All of them materialize their input on the first advance.

mod ordered;
mod plan;

use rand::rngs::StdRng;
use rand::Rng;

use lazyseq_core::config::SeqConfig;

use crate::sequence::Sequence;
use crate::traits::{Cursor, Result, Step};

pub use self::ordered::OrderedSequence;
use self::plan::SortPlan;

struct ReverseStep<T> {
    source: Sequence<T>,
    buffer: Vec<T>,
}

impl<T: Clone + 'static> Step<T> for ReverseStep<T> {
    fn init(&mut self) -> Result<()> {
        self.buffer = self.source.drain()?;
        tracing::trace!(elements = self.buffer.len(), "reverse materialized");
        Ok(())
    }

    fn step(&mut self) -> Result<Option<T>> {
        Ok(self.buffer.pop())
    }

    fn release(&mut self) -> Result<()> {
        self.buffer.clear();
        Ok(())
    }
}

/// Random pick-and-remove over the materialized buffer.
struct ShuffleStep<T> {
    source: Sequence<T>,
    rng: StdRng,
    buffer: Vec<T>,
}

impl<T: Clone + 'static> Step<T> for ShuffleStep<T> {
    fn init(&mut self) -> Result<()> {
        self.buffer = self.source.drain()?;
        tracing::trace!(elements = self.buffer.len(), "shuffle materialized");
        Ok(())
    }

    fn step(&mut self) -> Result<Option<T>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        let pick = self.rng.gen_range(0..self.buffer.len());
        Ok(Some(self.buffer.swap_remove(pick)))
    }

    fn release(&mut self) -> Result<()> {
        self.buffer.clear();
        Ok(())
    }
}

impl<T: Clone + 'static> Sequence<T> {
    /// Stable ascending sort by `key`.
    pub fn order_by<K: Ord + 'static>(
        &self,
        key: impl Fn(&T) -> K + 'static,
    ) -> OrderedSequence<T> {
        OrderedSequence::new(self.clone(), SortPlan::root(key, false))
    }

    /// Stable descending sort by `key`: equal keys keep source order.
    pub fn order_by_descending<K: Ord + 'static>(
        &self,
        key: impl Fn(&T) -> K + 'static,
    ) -> OrderedSequence<T> {
        OrderedSequence::new(self.clone(), SortPlan::root(key, true))
    }

    pub fn reverse(&self) -> Sequence<T> {
        if let Some(view) = self.as_array() {
            return view.reversed();
        }
        let source = self.clone();
        Sequence::named("reverse", move || {
            Cursor::new(ReverseStep {
                source: source.clone(),
                buffer: Vec::new(),
            })
        })
    }

    /// Every element exactly once, in random order. Seeded from
    /// `LAZYSEQ_SEED` when set, from OS entropy otherwise.
    pub fn shuffle(&self) -> Sequence<T> {
        self.shuffle_with(&SeqConfig::from_env())
    }

    /// `shuffle` drawing from `cfg.rng()`; a seeded config gives the same
    /// order on every traversal.
    pub fn shuffle_with(&self, cfg: &SeqConfig) -> Sequence<T> {
        let source = self.clone();
        let cfg = cfg.clone();
        Sequence::named("shuffle", move || {
            Cursor::new(ShuffleStep {
                source: source.clone(),
                rng: cfg.rng(),
                buffer: Vec::new(),
            })
        })
    }
}
