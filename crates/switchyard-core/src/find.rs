//! Bound lookups produced by [`Dispatcher::find`](crate::Dispatcher::find).
//!
//! A [`Find`] captures one target and can be invoked any number of times,
//! concurrently if needed. Each invocation walks the dispatcher's bindings in
//! order and returns the first non-empty handler result.
//!
//! # Tower Service Integration
//!
//! `Find` implements `tower::Service<I>`, so tower middleware can wrap a
//! lookup directly:
//!
//! ```rust,ignore
//! use tower::ServiceBuilder;
//!
//! let service = ServiceBuilder::new()
//!     .concurrency_limit(16)
//!     .service(dispatcher.find(vec!["users".to_string()]));
//! ```

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::future::BoxFuture;
use tower::Service;
use tracing::{Instrument, debug, debug_span, trace, warn};

use crate::dispatcher::DispatcherInner;
use crate::error::{DispatchError, DispatchResult};

/// A reusable invocable bound to one target.
pub struct Find<P, T, I, O> {
    inner: Arc<DispatcherInner<P, T, I, O>>,
    target: Arc<T>,
}

impl<P, T, I, O> Clone for Find<P, T, I, O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            target: Arc::clone(&self.target),
        }
    }
}

impl<P, T, I, O> Find<P, T, I, O> {
    pub(crate) fn new(inner: Arc<DispatcherInner<P, T, I, O>>, target: T) -> Self {
        Self {
            inner,
            target: Arc::new(target),
        }
    }

    /// Returns the target this lookup is bound to.
    pub fn target(&self) -> &T {
        &self.target
    }
}

impl<P, T, I, O> Find<P, T, I, O>
where
    P: 'static,
    T: 'static,
    I: Clone + 'static,
{
    /// Runs the dispatch walk for `input`.
    ///
    /// Returns `Ok(Some(_))` with the first non-empty result, `Ok(None)` when
    /// nothing produced one, or the error when a failure was not recovered.
    pub async fn call(&self, input: I) -> DispatchResult<O> {
        let span = debug_span!("dispatch");
        async {
            match self.walk(&input).await {
                Ok(result) => Ok(result),
                Err(error) => self.recover(error, input).await,
            }
        }
        .instrument(span)
        .await
    }

    /// Walks bindings, then handlers, until one produces a result.
    async fn walk(&self, input: &I) -> DispatchResult<O> {
        let mut index = 0;

        while let Some(binding) = self.inner.binding(index) {
            let matched = match binding.pattern() {
                Some(pattern) => self.inner.matcher.matches(pattern, &self.target, input)?,
                None => true,
            };

            if !matched {
                trace!(
                    binding = index,
                    name = binding.name().unwrap_or("unnamed"),
                    "Binding did not match, skipping"
                );
                index += 1;
                continue;
            }

            trace!(
                binding = index,
                name = binding.name().unwrap_or("unnamed"),
                handler_count = binding.handler_count(),
                "Binding matched, running handlers"
            );

            for (position, handler) in binding.handlers().iter().enumerate() {
                let outcome = handler(input.clone())
                    .await
                    .map_err(DispatchError::handler)?;

                if let Some(result) = outcome {
                    debug!(
                        binding = index,
                        handler = position,
                        name = binding.name().unwrap_or("unnamed"),
                        "Handler produced a result"
                    );
                    return Ok(Some(result));
                }
            }

            index += 1;
        }

        trace!(bindings = index, "No handler produced a result");
        Ok(None)
    }

    /// Runs the error chain for a failed walk.
    async fn recover(&self, error: DispatchError, input: I) -> DispatchResult<O> {
        if !self.inner.has_error_handlers() {
            debug!(error = %error, "Dispatch failed with no error handlers, propagating");
            return Err(error);
        }

        warn!(error = %error, "Dispatch failed, running error handlers");

        let mut index = 0;
        while let Some(handler) = self.inner.error_handler(index) {
            let outcome = handler(error.clone(), input.clone())
                .await
                .map_err(DispatchError::recovery)?;

            if let Some(result) = outcome {
                debug!(error_handler = index, "Error handler produced a result");
                return Ok(Some(result));
            }

            index += 1;
        }

        debug!("Error chain exhausted without a result");
        Ok(None)
    }
}

impl<P, T: std::fmt::Debug, I, O> std::fmt::Debug for Find<P, T, I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Find")
            .field("target", &self.target)
            .finish()
    }
}

// ============================================================================
// Tower Service Implementation for Find
// ============================================================================

/// Tower Service implementation for Find.
///
/// Always ready; each call runs an independent dispatch walk.
impl<P, T, I, O> Service<I> for Find<P, T, I, O>
where
    P: Send + Sync + 'static,
    T: Send + Sync + 'static,
    I: Clone + Send + Sync + 'static,
    O: Send + 'static,
{
    type Response = Option<O>;
    type Error = DispatchError;
    type Future = BoxFuture<'static, DispatchResult<O>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, input: I) -> Self::Future {
        let find = self.clone();
        async move { Find::call(&find, input).await }.boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dispatcher, MatchError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tower::ServiceExt;

    type Router = Dispatcher<Vec<Option<&'static str>>, Vec<&'static str>, (u32,), String>;

    #[tokio::test]
    async fn test_find_exposes_target() {
        let dispatcher = Router::new();
        let find = dispatcher.find(vec!["a", "b"]);
        assert_eq!(find.target(), &vec!["a", "b"]);
        assert!(format!("{find:?}").contains("\"a\""));
    }

    #[tokio::test]
    async fn test_service_oneshot() {
        let dispatcher = Router::new();
        dispatcher
            .on(vec![Some("a")])
            .handler(|n: u32| async move { Some(format!("n={n}")) })
            .bind();

        let result = dispatcher.find(vec!["a"]).oneshot((3,)).await.unwrap();
        assert_eq!(result.as_deref(), Some("n=3"));
    }

    #[tokio::test]
    async fn test_service_propagates_error() {
        let dispatcher = Router::new();
        dispatcher
            .always()
            .handler(|_: u32| async { Err::<Option<String>, _>("broken") })
            .bind();

        let err = dispatcher.find(vec!["a"]).oneshot((0,)).await.unwrap_err();
        assert_eq!(err.to_string(), "broken");
    }

    #[tokio::test]
    async fn test_custom_matcher_receives_input() {
        let dispatcher: Dispatcher<u32, (), (u32,), String> =
            Dispatcher::with_matcher(|threshold: &u32, _: &(), input: &(u32,)| {
                Ok::<_, MatchError>(input.0 >= *threshold)
            });

        dispatcher
            .on(100)
            .handler(|_: u32| async { Some("large".to_string()) })
            .bind();
        dispatcher
            .on(0)
            .handler(|_: u32| async { Some("small".to_string()) })
            .bind();

        let find = dispatcher.find(());
        assert_eq!(find.call((250,)).await.unwrap().as_deref(), Some("large"));
        assert_eq!(find.call((7,)).await.unwrap().as_deref(), Some("small"));
    }

    #[tokio::test]
    async fn test_concurrent_invocations_do_not_interfere() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&calls);

        let dispatcher = Router::new();
        dispatcher
            .on(vec![None])
            .handler(move |n: u32| {
                let c = Arc::clone(&c);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(u64::from(10 - n))).await;
                    Some(n.to_string())
                }
            })
            .bind();

        let find = dispatcher.find(vec!["any"]);
        let (a, b, c) = tokio::join!(find.call((1,)), find.call((5,)), find.call((9,)));

        assert_eq!(a.unwrap().as_deref(), Some("1"));
        assert_eq!(b.unwrap().as_deref(), Some("5"));
        assert_eq!(c.unwrap().as_deref(), Some("9"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    /// Drives a lookup from code that is generic over the dispatcher shape.
    async fn first_reply<P, T, I, O>(find: &Find<P, T, I, O>, input: I) -> Option<O>
    where
        P: 'static,
        T: 'static,
        I: Clone + 'static,
    {
        find.call(input).await.ok().flatten()
    }

    #[tokio::test]
    async fn test_call_from_generic_code() {
        let dispatcher: Dispatcher<Vec<Option<String>>, Vec<String>, (String,), String> =
            Dispatcher::new();
        dispatcher
            .on(vec![Some("users".to_string()), None])
            .handler(|body: String| async move { Some(format!("user: {body}")) })
            .bind();

        let find = dispatcher.find(vec!["users".to_string(), "42".to_string()]);
        let reply = first_reply(&find, ("hi".to_string(),)).await;
        assert_eq!(reply.as_deref(), Some("user: hi"));

        let miss = dispatcher.find(vec!["groups".to_string(), "1".to_string()]);
        assert!(first_reply(&miss, ("hi".to_string(),)).await.is_none());
    }
}
