use thiserror::Error;

/// Canonical result for cursors and terminal operators.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{op}: index {index} is out of range")]
    IndexOutOfRange { op: &'static str, index: usize },

    #[error("{op}: no element satisfies the condition")]
    NoMatchingElement { op: &'static str },

    #[error("{op}: sequence contains more than one element satisfying the condition")]
    MultipleMatchesFound { op: &'static str },

    #[error("{op}: sequence contains no elements")]
    EmptySequence { op: &'static str },

    /// Raised by caller-supplied fallible callbacks.
    #[error("callback failed: {0}")]
    Callback(String),

    #[error("cursor release failed: {0}")]
    Release(String),

    /// A finalizer failed while another error was already propagating.
    #[error("{primary}; release also failed: {release}")]
    ReleaseAfterError {
        primary: Box<Error>,
        release: Box<Error>,
    },

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("output sink error: {0}")]
    Sink(String),

    #[error("invalid pattern: {0}")]
    Pattern(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal invariant failed: {0}")]
    Invariant(String),
}

impl Error {
    pub fn callback(msg: impl Into<String>) -> Self {
        Error::Callback(msg.into())
    }

    pub fn release(msg: impl Into<String>) -> Self {
        Error::Release(msg.into())
    }

    /// The error that started the failure chain.
    pub fn primary(&self) -> &Error {
        match self {
            Error::ReleaseAfterError { primary, .. } => primary.primary(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialize(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Sink(e.to_string())
    }
}

/// Combine the outcome of a step with the outcome of releasing resources
/// afterwards. Both failures are kept, the step's error first.
pub fn merge_release<T>(outcome: Result<T>, release: Result<()>) -> Result<T> {
    match (outcome, release) {
        (Ok(v), Ok(())) => Ok(v),
        (Ok(_), Err(r)) => Err(r),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(r)) => Err(Error::ReleaseAfterError {
            primary: Box::new(e),
            release: Box::new(r),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_keeps_both_failures_in_order() {
        let merged = merge_release::<()>(
            Err(Error::callback("boom")),
            Err(Error::release("cleanup")),
        )
        .unwrap_err();
        assert!(matches!(merged.primary(), Error::Callback(m) if m == "boom"));
        assert_eq!(
            merged.to_string(),
            "callback failed: boom; release also failed: cursor release failed: cleanup"
        );
    }

    #[test]
    fn merge_surfaces_release_failure_after_success() {
        let merged = merge_release(Ok(3), Err(Error::release("cleanup"))).unwrap_err();
        assert!(matches!(merged, Error::Release(_)));
        assert_eq!(merge_release(Ok(3), Ok(())).unwrap(), 3);
    }
}
