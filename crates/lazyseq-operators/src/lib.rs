#![forbid(unsafe_code)]
//! lazyseq-operators: the `Sequence` node and its deferred operators.
//!
//! Design intent:
//! - Nothing runs until a cursor is advanced; building a pipeline only
//!   allocates closures and `Rc`s.
//! - Every operator's per-traversal state is one struct implementing
//!   `lazyseq_core::Step`, and every such struct releases the upstream
//!   cursors it owns in `release`.
//! - Operators that need their input more than once (ordering, sets,
//!   grouping, joins) drain it in `init`, i.e. on the first `advance`.
//! - Array-backed sources expose `as_slice()`; operators take the fast
//!   path when it is available.

pub mod array;
pub mod sequence;
pub mod traits;

pub mod source;

pub mod filter;
pub mod map;
pub mod set;

pub mod group;
pub mod join;
pub mod lookup;
pub mod sort;

pub mod cascade;
pub mod control;
pub mod share;

pub mod aggregate;
pub mod output;
pub mod paging;

pub use array::ArrayView;
pub use lookup::{Grouping, Lookup};
pub use sequence::{Sequence, SourceKind};
pub use sort::OrderedSequence;
pub use source::{KeyValue, RegexMatch};
pub use traits::Source;
