//! Source capability trait + shared callback aliases.
//!
//! Every `Sequence` is backed by one `Source`. Operators only require
//! `cursor()`; sources that hold a materialized buffer additionally expose it
//! through `as_slice()` so operators can take O(1) fast paths (length, random
//! access, reverse) instead of driving a cursor.

use std::rc::Rc;
use std::sync::OnceLock;

use crate::array::ArrayView;

use lazyseq_core::config::SeqConfig;

pub use lazyseq_core::cursor::{Cursor, Step};
pub use lazyseq_core::error::{Error, Result};

/// Capability interface behind a `Sequence`.
///
/// Invariants:
/// - each `cursor()` call returns an independent traversal, unless the
///   source documents shared state (`share`, `memoize`);
/// - `as_slice()`, when `Some`, yields exactly what a cursor would.
pub trait Source<T> {
    /// Human-readable source name (stable), used in trace events.
    fn name(&self) -> &'static str;

    /// Fresh cursor over the source.
    fn cursor(&self) -> Cursor<T>;

    /// The array this source is a window of, if any.
    fn as_array(&self) -> Option<&ArrayView<T>> {
        None
    }

    /// Random-access view of a materialized source.
    fn as_slice(&self) -> Option<&[T]> {
        self.as_array().map(ArrayView::as_slice)
    }

    /// Length when known without traversal.
    fn known_len(&self) -> Option<usize> {
        self.as_slice().map(<[T]>::len)
    }
}

pub type Selector<T, U> = Rc<dyn Fn(T) -> U>;
pub type IndexedSelector<T, U> = Rc<dyn Fn(T, usize) -> U>;
pub type KeySelector<T, K> = Rc<dyn Fn(&T) -> K>;
pub type Predicate<T> = Rc<dyn Fn(&T) -> bool>;
pub type IndexedPredicate<T> = Rc<dyn Fn(&T, usize) -> bool>;

/// `SeqConfig::from_env`, read once per process.
pub(crate) fn env_config() -> &'static SeqConfig {
    static CONFIG: OnceLock<SeqConfig> = OnceLock::new();
    CONFIG.get_or_init(SeqConfig::from_env)
}

/// Initial capacity for a bucket store that will receive `known` entries,
/// or the configured hint when the count is not known up front. Fails with
/// `Error::Config` when the environment config does not validate.
pub(crate) fn bucket_capacity(known: Option<usize>) -> Result<usize> {
    bucket_capacity_in(env_config(), known)
}

pub(crate) fn bucket_capacity_in(cfg: &SeqConfig, known: Option<usize>) -> Result<usize> {
    cfg.validate()?;
    Ok(known.unwrap_or(cfg.bucket_capacity_hint))
}
