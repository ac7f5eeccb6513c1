//! # Switchyard
//!
//! A generic, pattern-matched handler dispatcher.
//!
//! ## Overview
//!
//! Register handler chains against patterns, look up a target once, then
//! invoke the lookup as often as needed. Each invocation walks the bindings in
//! registration order and returns the first result any handler produces.
//! Failures go to a chain of error handlers under the same rule.
//!
//! ```text
//! find(target)(input)
//!     │
//!     ▼
//! ┌──────────────────────┐  match?  ┌──────────────────────────┐
//! │ binding 0 (always)   │────────▶│ h0 → h1 → ...  Some? done │
//! │ binding 1 (pattern)  │────────▶│ h0 → ...                  │
//! │ ...                  │         └──────────────────────────┘
//! └──────────────────────┘
//!     │ error anywhere
//!     ▼
//! catch 0 → catch 1 → ...   first Some wins, else Ok(None)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use switchyard::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().load()?;
//!     logging::init_from_config(&config.logging);
//!
//!     let dispatcher: Dispatcher<Vec<Option<String>>, Vec<String>, (String,), String> =
//!         Dispatcher::new();
//!
//!     dispatcher
//!         .on(vec![Some("users".into()), None])
//!         .handler(|body: String| async move { Some(format!("user: {body}")) })
//!         .bind();
//!
//!     dispatcher.catch(|err: DispatchError, _: String| async move {
//!         Some(format!("failed: {err}"))
//!     });
//!
//!     let reply = dispatcher
//!         .find(vec!["users".into(), "42".into()])
//!         .call(("hello".into(),))
//!         .await?;
//!     println!("{reply:?}");
//!     Ok(())
//! }
//! ```

pub use switchyard_core;
pub use switchyard_runtime;

pub use switchyard_core::*;
pub use switchyard_runtime::{
    ConfigError, ConfigLoader, LoggingBuilder, LoggingConfig, RuntimeError, SpanEvents,
    SwitchyardConfig, logging, validate_config,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use switchyard_core::{
        DispatchError, DispatchResult, Dispatcher, EqualMatcher, Find, MatchError, Matcher,
    };
    pub use switchyard_runtime::prelude::*;
    pub use switchyard_runtime::{ConfigLoader, LoggingBuilder, SwitchyardConfig, logging};
}
