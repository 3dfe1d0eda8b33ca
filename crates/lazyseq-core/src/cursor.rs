//! Pull cursor: the single-traversal iteration primitive.
//!
//! A `Cursor` wraps one `Step` implementation (the per-traversal state of an
//! operator) and drives it through `NotStarted -> Running -> Finished`.
//!
//! Invariants:
//! - `Step::init` runs once, on the first `advance`.
//! - `Step::release` runs at most once, and only if the cursor was `Running`:
//!   on exhaustion, on an error raised by `init`/`step`, on an explicit
//!   `dispose`, or when a running cursor is dropped.
//! - Advancing a `Finished` cursor reports exhaustion and does nothing else.

use crate::error::{Error, Result};

/// Lifecycle state of a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    NotStarted,
    Running,
    Finished,
}

/// Per-traversal operator state driven by a `Cursor`.
pub trait Step<T> {
    /// Runs once before the first `step`.
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Produce the next value, or `None` when exhausted.
    fn step(&mut self) -> Result<Option<T>>;

    /// Release upstream cursors and any other resources.
    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Closure-backed `Step` used by generators and ad-hoc cursors.
pub struct FnStep<S, N, R> {
    state: S,
    next: N,
    release: Option<R>,
}

impl<T, S, N, R> Step<T> for FnStep<S, N, R>
where
    N: FnMut(&mut S) -> Result<Option<T>>,
    R: FnMut(&mut S) -> Result<()>,
{
    fn step(&mut self) -> Result<Option<T>> {
        (self.next)(&mut self.state)
    }

    fn release(&mut self) -> Result<()> {
        match self.release.as_mut() {
            Some(release) => release(&mut self.state),
            None => Ok(()),
        }
    }
}

struct Exhausted;

impl<T> Step<T> for Exhausted {
    fn step(&mut self) -> Result<Option<T>> {
        Ok(None)
    }
}

pub struct Cursor<T> {
    state: CursorState,
    current: Option<T>,
    body: Box<dyn Step<T>>,
}

impl<T> Cursor<T> {
    pub fn new(body: impl Step<T> + 'static) -> Self {
        Self {
            state: CursorState::NotStarted,
            current: None,
            body: Box::new(body),
        }
    }

    /// A cursor whose step is `next(&mut state)`.
    pub fn from_fn<S, N>(state: S, next: N) -> Self
    where
        S: 'static,
        N: FnMut(&mut S) -> Result<Option<T>> + 'static,
    {
        Self::new(FnStep {
            state,
            next,
            release: None::<fn(&mut S) -> Result<()>>,
        })
    }

    /// Like `from_fn`, with a finalizer that runs exactly once.
    pub fn with_release<S, N, R>(state: S, next: N, release: R) -> Self
    where
        S: 'static,
        N: FnMut(&mut S) -> Result<Option<T>> + 'static,
        R: FnMut(&mut S) -> Result<()> + 'static,
    {
        Self::new(FnStep {
            state,
            next,
            release: Some(release),
        })
    }

    pub fn empty() -> Self {
        Self::new(Exhausted)
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Move to the next value. Returns `Ok(false)` once exhausted.
    ///
    /// On error the cursor is released before the error is returned; a
    /// failing release is folded into the returned error.
    pub fn advance(&mut self) -> Result<bool> {
        match self.state {
            CursorState::Finished => return Ok(false),
            CursorState::NotStarted => {
                self.state = CursorState::Running;
                if let Err(e) = self.body.init() {
                    return Err(self.fail(e));
                }
            }
            CursorState::Running => {}
        }

        match self.body.step() {
            Ok(Some(value)) => {
                self.current = Some(value);
                Ok(true)
            }
            Ok(None) => {
                self.dispose()?;
                Ok(false)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    fn fail(&mut self, e: Error) -> Error {
        match self.dispose() {
            Ok(()) => e,
            Err(release) => Error::ReleaseAfterError {
                primary: Box::new(e),
                release: Box::new(release),
            },
        }
    }

    /// The value produced by the last successful `advance`.
    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Move the current value out of the cursor.
    pub fn take_current(&mut self) -> Option<T> {
        self.current.take()
    }

    /// `advance` followed by `take_current`.
    pub fn next_value(&mut self) -> Result<Option<T>> {
        if self.advance()? {
            Ok(self.take_current())
        } else {
            Ok(None)
        }
    }

    /// Finish the cursor. Idempotent; the finalizer only runs if the cursor
    /// was running. The cursor is `Finished` afterwards even if the
    /// finalizer fails.
    pub fn dispose(&mut self) -> Result<()> {
        let was = std::mem::replace(&mut self.state, CursorState::Finished);
        self.current = None;
        if was == CursorState::Running {
            self.body.release()
        } else {
            Ok(())
        }
    }
}

impl<T> Drop for Cursor<T> {
    fn drop(&mut self) {
        if self.state != CursorState::Running {
            return;
        }
        if let Err(_e) = self.dispose() {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_e, "cursor release failed during drop");
        }
    }
}

impl<T> Iterator for Cursor<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_value().transpose()
    }
}

impl<T> std::fmt::Debug for Cursor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cursor").field("state", &self.state).finish()
    }
}
