//! lazyseq: deferred, composable sequence queries over pull cursors.
//!
//! Re-exports the cursor protocol from `lazyseq-core` and the `Sequence`
//! operators from `lazyseq-operators`.

pub use lazyseq_core::{
    merge_release, Cursor, CursorState, Error, HashBucketStore, Projection, Result, SeqConfig,
    Step,
};
pub use lazyseq_operators::{
    ArrayView, Grouping, KeyValue, Lookup, OrderedSequence, RegexMatch, Sequence, Source,
    SourceKind,
};

pub mod prelude {
    pub use lazyseq_core::prelude::*;
    pub use lazyseq_operators::{Grouping, Lookup, OrderedSequence, Sequence, SourceKind};
}
