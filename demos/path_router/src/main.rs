//! Path Router Demo
//!
//! Splits each path given on the command line into segments and dispatches it
//! through a [`Dispatcher`]. Paths of different depths share one router, so
//! the matcher treats a length difference as a miss before deferring to
//! [`EqualMatcher`].
//!
//! # Usage
//!
//! ```bash
//! cargo run --package path-router -- /users/42 /health /users/0 /nowhere
//! SWITCHYARD_LOGGING__LEVEL=trace cargo run --package path-router -- /users/7
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use switchyard::prelude::*;
use switchyard::validate_config;

type Segments = Vec<String>;
type Router = Dispatcher<Vec<Option<String>>, Segments, (String,), String>;

#[derive(Debug, Parser)]
#[command(about = "Dispatch slash-separated paths through a Switchyard dispatcher")]
struct Args {
    /// Configuration file (defaults to searching for switchyard.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Value passed to every handler as the request body.
    #[arg(long, default_value = "hello")]
    body: String,

    /// Paths to dispatch, e.g. `/users/42`.
    #[arg(required = true)]
    paths: Vec<String>,
}

fn segments(path: &str) -> Segments {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn pattern(path: &str) -> Vec<Option<String>> {
    segments(path)
        .into_iter()
        .map(|s| (s != "*").then_some(s))
        .collect()
}

// ============================================================================
// Handler Functions
// ============================================================================

/// Access log: runs for every path and never answers.
async fn access_log(body: String) {
    debug!(body = %body, "Request received");
}

async fn health(_body: String) -> Option<String> {
    Some("ok".to_string())
}

/// Fails on an empty body, otherwise declines so `show_user` answers.
async fn validate_user(body: String) -> Result<(), &'static str> {
    if body.is_empty() {
        return Err("empty request body");
    }
    Ok(())
}

async fn show_user(body: String) -> Option<String> {
    Some(format!("user handler says: {body}"))
}

async fn reject_anonymous(_body: String) -> Result<Option<String>, &'static str> {
    Err("user id 0 is reserved")
}

async fn recover(err: DispatchError, _body: String) -> Option<String> {
    warn!(error = %err, "Recovering from dispatch failure");
    Some(format!("error: {err}"))
}

fn depth_aware(
    pattern: &Vec<Option<String>>,
    target: &Segments,
    _input: &(String,),
) -> Result<bool, MatchError> {
    Ok(pattern.len() == target.len() && EqualMatcher::compare(pattern, target)?)
}

fn build_router() -> Router {
    let router = Router::with_matcher(depth_aware);

    router
        .always()
        .name("access-log")
        .handler(access_log)
        .bind();

    router
        .on(pattern("/health"))
        .name("health")
        .handler(health)
        .bind();

    router
        .on(pattern("/users/0"))
        .name("reserved-user")
        .handler(reject_anonymous)
        .bind();

    router
        .on(pattern("/users/*"))
        .name("user")
        .handler(validate_user)
        .handler(show_user)
        .bind();

    router.catch(recover);
    router
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.file(path);
    }
    let config = loader.load()?;
    validate_config(&config)?;
    logging::init_from_config(&config.logging);

    let router = build_router();
    info!(bindings = router.binding_count(), "Router ready");

    for path in &args.paths {
        let target = segments(path);
        let reply = match router.find(target).call((args.body.clone(),)).await {
            Ok(Some(reply)) => reply,
            Ok(None) => "no handler".to_string(),
            Err(err) => return Err(err.into()),
        };
        println!("{path} -> {reply}");
    }

    Ok(())
}
