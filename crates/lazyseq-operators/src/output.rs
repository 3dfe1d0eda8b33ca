//! Terminal consumers that hand elements to the caller or to a sink.
//!
//! Every one of them runs on a fresh cursor and releases it before
//! returning, including when an action asks to stop early or fails.

use std::fmt::{Debug, Display};
use std::io::Write;

use serde::Serialize;

use lazyseq_core::config::SeqConfig;

use crate::sequence::Sequence;
use crate::traits::Result;

impl<T: 'static> Sequence<T> {
    pub fn for_each(&self, mut action: impl FnMut(T)) -> Result<()> {
        self.with_cursor(|cursor| {
            while let Some(value) = cursor.next_value()? {
                action(value);
            }
            Ok(())
        })
    }

    /// Call `action(element, index)` until it returns `false`.
    pub fn for_each_while(&self, mut action: impl FnMut(T, usize) -> bool) -> Result<()> {
        self.with_cursor(|cursor| {
            let mut index = 0;
            while let Some(value) = cursor.next_value()? {
                if !action(value, index) {
                    break;
                }
                index += 1;
            }
            Ok(())
        })
    }

    /// Stops at, and returns, the first error raised by `action`.
    pub fn try_for_each(&self, mut action: impl FnMut(T) -> Result<()>) -> Result<()> {
        self.with_cursor(|cursor| {
            while let Some(value) = cursor.next_value()? {
                action(value)?;
            }
            Ok(())
        })
    }

    /// Run a full traversal for its side effects only.
    pub fn force(&self) -> Result<()> {
        self.with_cursor(|cursor| {
            while cursor.advance()? {}
            Ok(())
        })
    }

    pub fn to_joined_string_by(
        &self,
        separator: &str,
        selector: impl Fn(T) -> String,
    ) -> Result<String> {
        self.with_cursor(|cursor| {
            let mut out = String::new();
            let mut first = true;
            while let Some(value) = cursor.next_value()? {
                if !first {
                    out.push_str(separator);
                }
                first = false;
                out.push_str(&selector(value));
            }
            Ok(out)
        })
    }
}

impl<T: Clone + 'static> Sequence<T> {
    /// Materialize every element. Array-backed sequences are copied
    /// directly.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        if let Some(items) = self.as_slice() {
            return Ok(items.to_vec());
        }
        self.with_cursor(|cursor| {
            let mut out = Vec::with_capacity(self.known_len().unwrap_or(0));
            while let Some(value) = cursor.next_value()? {
                out.push(value);
            }
            Ok(out)
        })
    }
}

impl<T: Serialize + Clone + 'static> Sequence<T> {
    /// JSON array of every element.
    pub fn to_json(&self) -> Result<String> {
        self.to_json_with(&SeqConfig::default())
    }

    pub fn to_json_with(&self, cfg: &SeqConfig) -> Result<String> {
        let values = self.to_vec()?;
        let text = if cfg.json_pretty {
            serde_json::to_string_pretty(&values)?
        } else {
            serde_json::to_string(&values)?
        };
        Ok(text)
    }
}

impl<T: Display + 'static> Sequence<T> {
    pub fn to_joined_string(&self, separator: &str) -> Result<String> {
        self.to_joined_string_by(separator, |x| x.to_string())
    }

    /// Write every element to `sink`, `separator` between consecutive ones.
    pub fn write_to<W: Write>(&self, sink: &mut W, separator: &str) -> Result<()> {
        self.with_cursor(|cursor| {
            let mut first = true;
            while let Some(value) = cursor.next_value()? {
                if !first {
                    sink.write_all(separator.as_bytes())?;
                }
                first = false;
                write!(sink, "{value}")?;
            }
            sink.flush()?;
            Ok(())
        })
    }

    /// One element per line.
    pub fn write_lines_to<W: Write>(&self, sink: &mut W) -> Result<()> {
        self.with_cursor(|cursor| {
            while let Some(value) = cursor.next_value()? {
                writeln!(sink, "{value}")?;
            }
            sink.flush()?;
            Ok(())
        })
    }
}

impl<T: Debug + 'static> Sequence<T> {
    /// Lazily emit a debug event for every element as it passes through,
    /// labelled from `LAZYSEQ_TRACE_LABEL` (default `Trace`).
    pub fn trace(&self) -> Sequence<T> {
        self.trace_with(&SeqConfig::from_env())
    }

    pub fn trace_with(&self, cfg: &SeqConfig) -> Sequence<T> {
        let label = cfg.trace_label.clone();
        self.tap(move |x: &T, index: usize| {
            tracing::debug!(target: "lazyseq::trace", label = %label, index, value = ?x);
        })
    }
}
