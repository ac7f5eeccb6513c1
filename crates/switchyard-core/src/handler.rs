//! Handler adaptation for the Switchyard dispatcher.
//!
//! Handlers are ordinary async functions or closures. The dispatcher calls
//! them with the invocation input spread out as arguments: for an input tuple
//! `(String, u32)` a handler looks like
//!
//! ```rust,ignore
//! async fn lookup(name: String, id: u32) -> Option<Reply> { ... }
//! ```
//!
//! Error handlers receive the [`DispatchError`] first, then the same
//! arguments:
//!
//! ```rust,ignore
//! async fn recover(err: DispatchError, name: String, id: u32) -> Option<Reply> { ... }
//! ```
//!
//! # Return values
//!
//! Anything implementing [`IntoOutcome`] can be returned:
//!
//! | Return type             | Meaning                                  |
//! |-------------------------|------------------------------------------|
//! | `()`                    | always empty                             |
//! | `Option<O>`             | `None` is empty, `Some` ends the walk    |
//! | `Result<Option<O>, E>`  | as above, `Err` enters the error chain   |
//! | `Result<(), E>`         | empty on `Ok`, `Err` enters the error chain |
//!
//! # Synchronous handlers
//!
//! Handlers must return a future. Wrap a plain function's return value in
//! [`futures::future::ready`]:
//!
//! ```rust,ignore
//! fn lookup_sync(name: String) -> Option<Reply> { ... }
//!
//! dispatcher
//!     .on(pattern)
//!     .handler(|name: String| future::ready(lookup_sync(name)))
//!     .bind();
//! ```

use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::error::{BoxError, DispatchError};

/// Future returned by a type-erased handler.
pub type HandlerFuture<O> = BoxFuture<'static, Result<Option<O>, BoxError>>;

/// A type-erased handler stored in a binding.
pub type BoxedHandler<I, O> = Arc<dyn Fn(I) -> HandlerFuture<O> + Send + Sync>;

/// A type-erased error handler stored in the dispatcher's error chain.
pub type BoxedErrorHandler<I, O> = Arc<dyn Fn(DispatchError, I) -> HandlerFuture<O> + Send + Sync>;

// ============================================================================
// IntoOutcome - Normalize handler return values
// ============================================================================

/// Converts a handler's return value into the dispatcher's outcome shape.
pub trait IntoOutcome<O>: Send {
    /// `Ok(None)` is the empty signal.
    fn into_outcome(self) -> Result<Option<O>, BoxError>;
}

impl<O> IntoOutcome<O> for () {
    fn into_outcome(self) -> Result<Option<O>, BoxError> {
        Ok(None)
    }
}

impl<O: Send> IntoOutcome<O> for Option<O> {
    fn into_outcome(self) -> Result<Option<O>, BoxError> {
        Ok(self)
    }
}

impl<O, E> IntoOutcome<O> for Result<Option<O>, E>
where
    O: Send,
    E: Into<BoxError> + Send,
{
    fn into_outcome(self) -> Result<Option<O>, BoxError> {
        self.map_err(Into::into)
    }
}

impl<O, E> IntoOutcome<O> for Result<(), E>
where
    E: Into<BoxError> + Send,
{
    fn into_outcome(self) -> Result<Option<O>, BoxError> {
        self.map(|()| None).map_err(Into::into)
    }
}

// ============================================================================
// Handler / ErrorHandler traits
// ============================================================================

/// A function the dispatcher can run for input `I`, producing `O`.
///
/// Implemented for `FnOnce(A1, .., An) -> impl Future` closures where `I` is
/// the tuple `(A1, .., An)`, for 0 to 8 arguments.
pub trait Handler<I, O>: Clone + Send + Sync + 'static {
    /// Call the handler with the given input.
    fn call(self, input: I) -> HandlerFuture<O>;
}

/// A function the dispatcher can run when the normal chain fails.
///
/// Implemented for `FnOnce(DispatchError, A1, .., An) -> impl Future`
/// closures where `I` is the tuple `(A1, .., An)`.
pub trait ErrorHandler<I, O>: Clone + Send + Sync + 'static {
    /// Call the error handler with the caught error and the original input.
    fn call(self, error: DispatchError, input: I) -> HandlerFuture<O>;
}

/// Convert a handler function into a boxed handler.
pub fn into_handler<H, I, O>(handler: H) -> BoxedHandler<I, O>
where
    H: Handler<I, O>,
{
    Arc::new(move |input| handler.clone().call(input))
}

/// Convert an error handler function into a boxed error handler.
pub fn into_error_handler<H, I, O>(handler: H) -> BoxedErrorHandler<I, O>
where
    H: ErrorHandler<I, O>,
{
    Arc::new(move |error, input| handler.clone().call(error, input))
}

/// Macro to generate handler implementations for closures of different arities.
macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case)]
        impl<F, Fut, Res, O, $($ty,)*> Handler<($($ty,)*), O> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: IntoOutcome<O> + 'static,
            O: Send + 'static,
            $( $ty: Send + 'static, )*
        {
            fn call(self, ($($ty,)*): ($($ty,)*)) -> HandlerFuture<O> {
                async move { (self)($($ty,)*).await.into_outcome() }.boxed()
            }
        }

        #[allow(non_snake_case)]
        impl<F, Fut, Res, O, $($ty,)*> ErrorHandler<($($ty,)*), O> for F
        where
            F: FnOnce(DispatchError, $($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: IntoOutcome<O> + 'static,
            O: Send + 'static,
            $( $ty: Send + 'static, )*
        {
            fn call(self, error: DispatchError, ($($ty,)*): ($($ty,)*)) -> HandlerFuture<O> {
                async move { (self)(error, $($ty,)*).await.into_outcome() }.boxed()
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);
