//! Pattern-matched dispatcher for the Switchyard engine.
//!
//! This module provides the [`Dispatcher`], which owns an ordered list of
//! bindings (pattern plus handler chain) and an ordered chain of error
//! handlers.
//!
//! # Binding-based Dispatch
//!
//! When a lookup produced by [`Dispatcher::find`] is invoked:
//!
//! 1. Bindings are checked in registration order
//! 2. For each binding whose pattern matches (or which has no pattern), its
//!    handlers run one at a time
//! 3. The first handler to produce a result ends the walk
//! 4. If anything fails, the error chain runs under the same first-result rule
//!
//! ```rust
//! use switchyard_core::Dispatcher;
//!
//! # tokio_test::block_on(async {
//! let dispatcher: Dispatcher<Vec<Option<&str>>, Vec<&str>, (String,), String> =
//!     Dispatcher::new();
//!
//! dispatcher
//!     .on(vec![Some("users"), None])
//!     .handler(|name: String| async move { Some(format!("user {name}")) })
//!     .bind();
//!
//! dispatcher
//!     .always()
//!     .handler(|_: String| async { Some("fallback".to_string()) })
//!     .bind();
//!
//! let find = dispatcher.find(vec!["users", "42"]);
//! let result = find.call(("alice".to_string(),)).await.unwrap();
//! assert_eq!(result.as_deref(), Some("user alice"));
//! # });
//! ```

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::trace;

use crate::find::Find;
use crate::handler::{
    BoxedErrorHandler, BoxedHandler, ErrorHandler, Handler, into_error_handler, into_handler,
};
use crate::matcher::{BoxedMatcher, EqualMatcher, Matcher};

/// A pattern paired with an ordered handler chain.
///
/// A binding without a pattern is unconditional and matches every target.
/// Bindings are immutable once registered.
pub struct Binding<P, I, O> {
    pattern: Option<P>,
    handlers: Vec<BoxedHandler<I, O>>,
    name: Option<String>,
}

impl<P, I, O> Binding<P, I, O> {
    /// Returns the pattern, or `None` for an unconditional binding.
    pub fn pattern(&self) -> Option<&P> {
        self.pattern.as_ref()
    }

    /// Returns `true` if this binding matches every target.
    pub fn is_unconditional(&self) -> bool {
        self.pattern.is_none()
    }

    /// Returns the handlers in the order they run.
    pub fn handlers(&self) -> &[BoxedHandler<I, O>] {
        &self.handlers
    }

    /// Returns the number of handlers in this binding.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Returns the name of this binding, if set.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl<P: std::fmt::Debug, I, O> std::fmt::Debug for Binding<P, I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binding")
            .field("pattern", &self.pattern)
            .field("handler_count", &self.handlers.len())
            .field("name", &self.name)
            .finish()
    }
}

/// Shared state behind a [`Dispatcher`] and every [`Find`] it hands out.
pub(crate) struct DispatcherInner<P, T, I, O> {
    pub(crate) matcher: BoxedMatcher<P, T, I>,
    pub(crate) bindings: RwLock<Vec<Arc<Binding<P, I, O>>>>,
    pub(crate) error_handlers: RwLock<Vec<BoxedErrorHandler<I, O>>>,
}

impl<P, T, I, O> DispatcherInner<P, T, I, O> {
    /// Returns the binding at `index`, if one has been registered.
    ///
    /// Both lists are append-only, so an index stays valid for the lifetime
    /// of the dispatcher.
    pub(crate) fn binding(&self, index: usize) -> Option<Arc<Binding<P, I, O>>> {
        self.bindings.read().get(index).cloned()
    }

    /// Returns the error handler at `index`, if one has been registered.
    pub(crate) fn error_handler(&self, index: usize) -> Option<BoxedErrorHandler<I, O>> {
        self.error_handlers.read().get(index).cloned()
    }

    pub(crate) fn has_error_handlers(&self) -> bool {
        !self.error_handlers.read().is_empty()
    }
}

/// A generic, pattern-matched handler dispatcher.
///
/// Type parameters:
/// - `P`: pattern shape stored in bindings
/// - `T`: target shape supplied to [`find`](Self::find)
/// - `I`: input tuple supplied on each invocation, spread into handler arguments
/// - `O`: result type produced by handlers
///
/// # Thread Safety
///
/// `Dispatcher` is cheap to clone (clones share the same registrations) and is
/// `Send + Sync` whenever its type parameters are. Registration only appends;
/// nothing can be removed or reordered.
pub struct Dispatcher<P = Vec<Option<String>>, T = Vec<String>, I = (), O = ()> {
    inner: Arc<DispatcherInner<P, T, I, O>>,
}

impl<P, T, I, O> Clone for Dispatcher<P, T, I, O> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V, I, O> Default for Dispatcher<Vec<Option<V>>, Vec<V>, I, O>
where
    V: PartialEq + 'static,
    I: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, I, O> Dispatcher<Vec<Option<V>>, Vec<V>, I, O>
where
    V: PartialEq + 'static,
    I: 'static,
{
    /// Creates a new, empty dispatcher using the [`EqualMatcher`].
    pub fn new() -> Self {
        Self::with_matcher(EqualMatcher)
    }
}

impl<P, T, I, O> Dispatcher<P, T, I, O> {
    /// Creates a new, empty dispatcher using a custom matching strategy.
    pub fn with_matcher<M>(matcher: M) -> Self
    where
        M: Matcher<P, T, I>,
    {
        Self {
            inner: Arc::new(DispatcherInner {
                matcher: Arc::new(matcher),
                bindings: RwLock::new(Vec::new()),
                error_handlers: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Starts a binding that runs when `pattern` matches the target.
    ///
    /// Nothing is registered until [`BindingBuilder::bind`] is called.
    pub fn on(&self, pattern: P) -> BindingBuilder<'_, P, T, I, O> {
        BindingBuilder::new(self, Some(pattern))
    }

    /// Starts an unconditional binding.
    ///
    /// Unconditional bindings take part in ordering exactly like patterned
    /// ones: one registered first runs first.
    pub fn always(&self) -> BindingBuilder<'_, P, T, I, O> {
        BindingBuilder::new(self, None)
    }

    /// Appends a pre-built binding in one step.
    pub fn bind(&self, pattern: Option<P>, handlers: Vec<BoxedHandler<I, O>>) {
        self.push_binding(Binding {
            pattern,
            handlers,
            name: None,
        });
    }

    fn push_binding(&self, binding: Binding<P, I, O>) {
        let mut bindings = self.inner.bindings.write();
        trace!(
            index = bindings.len(),
            name = binding.name.as_deref().unwrap_or("unnamed"),
            unconditional = binding.pattern.is_none(),
            handler_count = binding.handlers.len(),
            "Registering binding"
        );
        bindings.push(Arc::new(binding));
    }

    /// Appends an error handler to the error chain.
    ///
    /// Error handlers run in the order they are added.
    pub fn catch<H>(&self, handler: H)
    where
        H: ErrorHandler<I, O>,
    {
        self.catch_boxed(into_error_handler(handler));
    }

    /// Appends a pre-built boxed error handler.
    pub fn catch_boxed(&self, handler: BoxedErrorHandler<I, O>) {
        self.inner.error_handlers.write().push(handler);
    }

    /// Returns a snapshot of the registered bindings in registration order.
    pub fn bindings(&self) -> Vec<Arc<Binding<P, I, O>>> {
        self.inner.bindings.read().clone()
    }

    /// Returns a snapshot of the error chain in registration order.
    pub fn error_handlers(&self) -> Vec<BoxedErrorHandler<I, O>> {
        self.inner.error_handlers.read().clone()
    }

    /// Returns the number of registered bindings.
    pub fn binding_count(&self) -> usize {
        self.inner.bindings.read().len()
    }

    /// Returns the number of registered error handlers.
    pub fn error_handler_count(&self) -> usize {
        self.inner.error_handlers.read().len()
    }

    /// Binds `target` and returns a reusable invocable for it.
    ///
    /// Each call on the returned [`Find`] runs the dispatch walk afresh and
    /// sees every binding registered up to that point.
    pub fn find(&self, target: T) -> Find<P, T, I, O> {
        Find::new(Arc::clone(&self.inner), target)
    }
}

impl<P, T, I, O> std::fmt::Debug for Dispatcher<P, T, I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("binding_count", &self.binding_count())
            .field("error_handler_count", &self.error_handler_count())
            .finish()
    }
}

/// Collects the handler chain for one binding.
///
/// Returned by [`Dispatcher::on`] and [`Dispatcher::always`]; the binding is
/// appended atomically by [`bind`](Self::bind).
#[must_use = "a binding is only registered once `bind` is called"]
pub struct BindingBuilder<'a, P, T, I, O> {
    dispatcher: &'a Dispatcher<P, T, I, O>,
    pattern: Option<P>,
    handlers: Vec<BoxedHandler<I, O>>,
    name: Option<String>,
}

impl<'a, P, T, I, O> BindingBuilder<'a, P, T, I, O> {
    fn new(dispatcher: &'a Dispatcher<P, T, I, O>, pattern: Option<P>) -> Self {
        Self {
            dispatcher,
            pattern,
            handlers: Vec::new(),
            name: None,
        }
    }

    /// Sets a name for this binding (useful for debugging).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds a handler to the chain.
    ///
    /// Handlers are tried in the order they are added.
    pub fn handler<H>(mut self, handler: H) -> Self
    where
        H: Handler<I, O>,
    {
        self.handlers.push(into_handler(handler));
        self
    }

    /// Adds a pre-built boxed handler.
    pub fn handler_boxed(mut self, handler: BoxedHandler<I, O>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Registers the binding with the dispatcher.
    pub fn bind(self) {
        self.dispatcher.push_binding(Binding {
            pattern: self.pattern,
            handlers: self.handlers,
            name: self.name,
        });
    }
}
