//! Convenient re-exports for downstream crates.

pub use crate::config::SeqConfig;
pub use crate::cursor::{Cursor, CursorState, Step};
pub use crate::error::{Error, Result};
pub use crate::store::{HashBucketStore, Projection};
