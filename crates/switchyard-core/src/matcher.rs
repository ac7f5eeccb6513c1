//! Matching strategies for the Switchyard dispatcher.
//!
//! A [`Matcher`] decides whether a registered pattern applies to the target a
//! dispatch was looked up with. It also sees the call-time input, so custom
//! strategies can route on values that are only known per invocation.
//!
//! # Default strategy
//!
//! [`EqualMatcher`] compares patterns and targets segment by segment. A `None`
//! segment in the pattern is a wildcard:
//!
//! ```rust
//! use switchyard_core::{EqualMatcher, Matcher};
//!
//! let pattern = vec![Some("users"), None];
//! let target = vec!["users", "42"];
//!
//! assert!(EqualMatcher.matches(&pattern, &target, &()).unwrap());
//! ```
//!
//! # Custom strategies
//!
//! Any closure of the shape `Fn(&P, &T, &I) -> Result<bool, MatchError>` is a
//! matcher:
//!
//! ```rust
//! use switchyard_core::{MatchError, Matcher};
//!
//! let prefix = |pattern: &String, target: &String, _: &()| -> Result<bool, MatchError> {
//!     Ok(target.starts_with(pattern.as_str()))
//! };
//!
//! assert!(prefix.matches(&"/api".to_string(), &"/api/items".to_string(), &()).unwrap());
//! ```

use std::sync::Arc;

use crate::error::MatchError;

/// A pluggable predicate deciding whether a pattern matches a target.
///
/// Implementations must be free of side effects. Returning an error means the
/// pair could not be compared at all; the dispatcher treats that like a
/// handler failure rather than a miss.
pub trait Matcher<P, T, I>: Send + Sync + 'static {
    /// Returns whether `pattern` matches `target` for this `input`.
    fn matches(&self, pattern: &P, target: &T, input: &I) -> Result<bool, MatchError>;
}

impl<P, T, I, F> Matcher<P, T, I> for F
where
    F: Fn(&P, &T, &I) -> Result<bool, MatchError> + Send + Sync + 'static,
{
    fn matches(&self, pattern: &P, target: &T, input: &I) -> Result<bool, MatchError> {
        self(pattern, target, input)
    }
}

/// A type-erased matcher shared by a dispatcher and its lookups.
pub type BoxedMatcher<P, T, I> = Arc<dyn Matcher<P, T, I>>;

/// Positional equality matcher.
///
/// Patterns are `Vec<Option<V>>` and targets are `Vec<V>`. Lengths must agree,
/// otherwise [`MatchError::ArityMismatch`] is returned. Each `Some` segment
/// must equal the target segment at the same position; `None` matches anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualMatcher;

impl EqualMatcher {
    /// Compares two segment slices.
    pub fn compare<V: PartialEq>(pattern: &[Option<V>], target: &[V]) -> Result<bool, MatchError> {
        if pattern.len() != target.len() {
            return Err(MatchError::ArityMismatch {
                pattern: pattern.len(),
                target: target.len(),
            });
        }

        Ok(pattern
            .iter()
            .zip(target)
            .all(|(expected, actual)| expected.as_ref().is_none_or(|e| e == actual)))
    }
}

impl<V, I> Matcher<Vec<Option<V>>, Vec<V>, I> for EqualMatcher
where
    V: PartialEq,
{
    fn matches(
        &self,
        pattern: &Vec<Option<V>>,
        target: &Vec<V>,
        _input: &I,
    ) -> Result<bool, MatchError> {
        Self::compare(pattern, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(segments: &[Option<&'static str>]) -> Vec<Option<&'static str>> {
        segments.to_vec()
    }

    #[test]
    fn test_exact_match() {
        let p = pattern(&[Some("a"), Some("b")]);
        assert!(EqualMatcher.matches(&p, &vec!["a", "b"], &()).unwrap());
        assert!(!EqualMatcher.matches(&p, &vec!["a", "c"], &()).unwrap());
    }

    #[test]
    fn test_wildcard_segments() {
        let p = pattern(&[None, Some("b"), None]);
        assert!(EqualMatcher.matches(&p, &vec!["x", "b", "y"], &()).unwrap());
        assert!(!EqualMatcher.matches(&p, &vec!["x", "c", "y"], &()).unwrap());

        let all = pattern(&[None, None]);
        assert!(EqualMatcher.matches(&all, &vec!["anything", "goes"], &()).unwrap());
    }

    #[test]
    fn test_empty_pattern_matches_empty_target() {
        let p: Vec<Option<&str>> = Vec::new();
        assert!(EqualMatcher.matches(&p, &Vec::new(), &()).unwrap());
    }

    #[test]
    fn test_arity_mismatch_is_error() {
        let p = pattern(&[Some("a")]);
        let err = EqualMatcher.matches(&p, &vec!["a", "b"], &()).unwrap_err();
        assert!(matches!(
            err,
            MatchError::ArityMismatch {
                pattern: 1,
                target: 2
            }
        ));

        // Wildcards do not excuse a length difference.
        let p = pattern(&[None, None, None]);
        assert!(EqualMatcher.matches(&p, &vec!["a"], &()).is_err());
    }

    #[test]
    fn test_no_coercion() {
        let p = vec![Some(1_i64), None];
        assert!(EqualMatcher.matches(&p, &vec![1, 2], &()).unwrap());
        assert!(!EqualMatcher.matches(&p, &vec![2, 2], &()).unwrap());
    }

    #[test]
    fn test_closure_matcher_sees_input() {
        let by_input = |_: &String, _: &String, input: &(u32,)| -> Result<bool, MatchError> {
            Ok(input.0 > 10)
        };
        let p = String::new();
        let t = String::new();
        assert!(by_input.matches(&p, &t, &(11,)).unwrap());
        assert!(!by_input.matches(&p, &t, &(3,)).unwrap());
    }
}
