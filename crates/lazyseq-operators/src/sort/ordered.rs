//! `OrderedSequence`: a sorted sequence that can still take tie-breakers.

use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use crate::sequence::{Sequence, SourceKind};
use crate::traits::{Cursor, Result, Step};

use super::plan::SortPlan;

/// Materialize, sort by position, then hand out elements in order.
struct OrderStep<T> {
    source: Sequence<T>,
    plan: Rc<SortPlan<T>>,
    sorted: std::vec::IntoIter<T>,
}

impl<T: Clone + 'static> Step<T> for OrderStep<T> {
    fn init(&mut self) -> Result<()> {
        let items = self.source.drain()?;
        let order = self.plan.order(&items);
        tracing::trace!(
            elements = items.len(),
            levels = self.plan.depth(),
            "ordering materialized"
        );
        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        self.sorted = order
            .into_iter()
            .filter_map(|pos| slots.get_mut(pos).and_then(Option::take))
            .collect::<Vec<_>>()
            .into_iter();
        Ok(())
    }

    fn step(&mut self) -> Result<Option<T>> {
        Ok(self.sorted.next())
    }

    fn release(&mut self) -> Result<()> {
        self.sorted = Vec::new().into_iter();
        Ok(())
    }
}

/// Result of `order_by`/`order_by_descending`. Behaves as a `Sequence`;
/// `then_by` adds a tie-breaking key without sorting anything yet.
pub struct OrderedSequence<T> {
    source: Sequence<T>,
    plan: Rc<SortPlan<T>>,
    sorted: Sequence<T>,
}

impl<T> Clone for OrderedSequence<T> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            plan: Rc::clone(&self.plan),
            sorted: self.sorted.clone(),
        }
    }
}

impl<T: Clone + 'static> OrderedSequence<T> {
    pub(crate) fn new(source: Sequence<T>, plan: Rc<SortPlan<T>>) -> Self {
        let sorted = {
            let source = source.clone();
            let plan = Rc::clone(&plan);
            Sequence::named("order_by", move || {
                Cursor::new(OrderStep {
                    source: source.clone(),
                    plan: Rc::clone(&plan),
                    sorted: Vec::new().into_iter(),
                })
            })
        };
        Self {
            source,
            plan,
            sorted,
        }
    }

    pub fn then_by<K: Ord + 'static>(&self, key: impl Fn(&T) -> K + 'static) -> Self {
        Self::new(self.source.clone(), SortPlan::refine(&self.plan, key, false))
    }

    pub fn then_by_descending<K: Ord + 'static>(
        &self,
        key: impl Fn(&T) -> K + 'static,
    ) -> Self {
        Self::new(self.source.clone(), SortPlan::refine(&self.plan, key, true))
    }

    pub fn into_sequence(self) -> Sequence<T> {
        self.sorted
    }
}

impl<T> Deref for OrderedSequence<T> {
    type Target = Sequence<T>;

    fn deref(&self) -> &Sequence<T> {
        &self.sorted
    }
}

impl<T> fmt::Debug for OrderedSequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedSequence")
            .field("source", &self.source)
            .field("levels", &self.plan.depth())
            .finish()
    }
}

impl<T> From<OrderedSequence<T>> for SourceKind<T> {
    fn from(ordered: OrderedSequence<T>) -> Self {
        SourceKind::Sequence(ordered.sorted)
    }
}

impl<T> From<&OrderedSequence<T>> for SourceKind<T> {
    fn from(ordered: &OrderedSequence<T>) -> Self {
        SourceKind::Sequence(ordered.sorted.clone())
    }
}
