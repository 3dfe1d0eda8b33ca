#![forbid(unsafe_code)]
//! lazyseq-core: the pull-cursor protocol and the data structures the
//! sequence operators are built on.
//!
//! - `cursor`: `Cursor`/`Step`, the three-state pull iterator with
//!   guaranteed single release.
//! - `store`: `HashBucketStore`, an insertion-ordered associative store keyed
//!   by a projected comparison key.
//! - `config`, `error`, `hash`: ambient pieces shared by every crate.
//!
//! **No operator logic** lives here; `lazyseq-operators` builds on this.

pub mod config;
pub mod cursor;
pub mod error;
pub mod hash;
pub mod prelude;
pub mod store;

pub use config::SeqConfig;
pub use cursor::{Cursor, CursorState, FnStep, Step};
pub use error::{merge_release, Error, Result};
pub use store::{HashBucketStore, Projection};
