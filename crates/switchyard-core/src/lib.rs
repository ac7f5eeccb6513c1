//! # Switchyard Core
//!
//! A generic, pattern-matched handler dispatcher.
//!
//! Given a target (a path split into segments, a tuple of values, anything the
//! matching strategy understands), the dispatcher selects the registered
//! bindings whose pattern matches, runs their handlers in registration order
//! until one produces a result, and routes any failure into a chain of error
//! handlers.
//!
//! This crate provides:
//! - [`Matcher`] strategies, with [`EqualMatcher`] as the default
//! - [`Dispatcher`] registration (`on`, `always`, `catch`) and lookup (`find`)
//! - [`Find`], the reusable invocable returned by a lookup, which also
//!   implements `tower::Service`
//! - Handler adaptation for plain async closures ([`Handler`], [`ErrorHandler`])
//!
//! # Empty results
//!
//! Handlers signal "nothing to say" with `None`. A dispatch that finds no
//! result returns `Ok(None)`. A handler that wants to return an absent value
//! as a real answer uses `O = Option<X>` and returns `Some(None)`.

pub mod dispatcher;
pub mod error;
pub mod find;
pub mod handler;
pub mod matcher;

pub use dispatcher::{Binding, BindingBuilder, Dispatcher};
pub use error::{BoxError, DispatchError, DispatchResult, MatchError, SharedError};
pub use find::Find;
pub use handler::{
    BoxedErrorHandler, BoxedHandler, ErrorHandler, Handler, HandlerFuture, IntoOutcome,
    into_error_handler, into_handler,
};
pub use matcher::{BoxedMatcher, EqualMatcher, Matcher};
