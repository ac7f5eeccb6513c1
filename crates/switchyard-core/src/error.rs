//! Error types for the Switchyard dispatch engine.

use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

/// Boxed error returned by handlers and error handlers.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Shared form of a handler error, cloned into every error handler.
pub type SharedError = Arc<dyn StdError + Send + Sync>;

/// Raised by a [`Matcher`](crate::matcher::Matcher) when a pattern and a target
/// cannot be compared at all.
///
/// This is a configuration error, not a routing miss: the dispatcher routes it
/// through the error chain like any handler failure.
#[derive(Debug, Clone, Error)]
pub enum MatchError {
    /// Pattern and target have a different number of segments.
    #[error("different numbers of segments: pattern has {pattern}, target has {target}")]
    ArityMismatch {
        /// Segments in the registered pattern.
        pattern: usize,
        /// Segments in the looked-up target.
        target: usize,
    },

    /// Failure reported by a custom matching strategy.
    #[error("{0}")]
    Custom(SharedError),
}

impl MatchError {
    /// Creates a custom matching error.
    pub fn custom(err: impl Into<BoxError>) -> Self {
        Self::Custom(Arc::from(err.into()))
    }
}

/// Error surfaced by a dispatch invocation.
///
/// Cheap to clone; every error handler in the chain receives its own copy of
/// the same underlying error.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// The matching strategy rejected a pattern/target pair.
    #[error(transparent)]
    Match(#[from] MatchError),

    /// A handler in a matched binding failed.
    #[error("{0}")]
    Handler(SharedError),

    /// An error handler failed while recovering from an earlier error.
    #[error("{0}")]
    Recovery(SharedError),
}

impl DispatchError {
    /// Wraps an error returned by a normal-chain handler.
    pub fn handler(err: BoxError) -> Self {
        Self::Handler(Arc::from(err))
    }

    /// Wraps an error returned by an error handler.
    pub fn recovery(err: BoxError) -> Self {
        Self::Recovery(Arc::from(err))
    }

    /// Returns `true` if the error originated in the matching strategy.
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match(_))
    }

    /// Attempts to downcast the wrapped handler error to a concrete type.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        match self {
            Self::Handler(err) | Self::Recovery(err) => (**err).downcast_ref::<E>(),
            Self::Match(MatchError::Custom(err)) => (**err).downcast_ref::<E>(),
            Self::Match(MatchError::ArityMismatch { .. }) => None,
        }
    }
}

/// Result type produced by a dispatch invocation.
///
/// `Ok(None)` is the "nothing found" sentinel.
pub type DispatchResult<O> = Result<Option<O>, DispatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn handler_error_keeps_message() {
        let err = DispatchError::handler("error msg".into());
        assert_eq!(err.to_string(), "error msg");
        assert!(!err.is_match());
    }

    #[test]
    fn downcast_recovers_concrete_error() {
        let err = DispatchError::handler(Box::new(Boom));
        assert!(err.downcast_ref::<Boom>().is_some());

        let cloned = err.clone();
        assert!(cloned.downcast_ref::<Boom>().is_some());
    }

    #[test]
    fn arity_mismatch_is_match_error() {
        let err = DispatchError::from(MatchError::ArityMismatch {
            pattern: 1,
            target: 2,
        });
        assert!(err.is_match());
        assert!(err.downcast_ref::<Boom>().is_none());
        assert!(err.to_string().contains("different numbers of segments"));
    }
}
