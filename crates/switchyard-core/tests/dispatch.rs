use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use switchyard_core::{BoxedErrorHandler, BoxedHandler, DispatchError, Dispatcher, MatchError};
use tokio_test::{assert_err, assert_ok};

type Input = (String, String);
type Calls = Arc<Mutex<Vec<Input>>>;
type PathDispatcher = Dispatcher<Vec<Option<&'static str>>, Vec<&'static str>, Input, String>;

/// A handler that records its arguments and returns `result`.
fn recording(calls: &Calls, result: Option<&'static str>) -> BoxedHandler<Input, String> {
    let calls = Arc::clone(calls);
    switchyard_core::into_handler(move |a: String, b: String| {
        let calls = Arc::clone(&calls);
        async move {
            calls.lock().push((a, b));
            result.map(str::to_string)
        }
    })
}

/// A handler that records its arguments and fails with `message`.
fn failing(calls: &Calls, message: &'static str) -> BoxedHandler<Input, String> {
    let calls = Arc::clone(calls);
    switchyard_core::into_handler(move |a: String, b: String| {
        let calls = Arc::clone(&calls);
        async move {
            calls.lock().push((a, b));
            Err::<Option<String>, _>(message)
        }
    })
}

/// An error handler that records the error message and arguments.
fn recording_catch(
    calls: &Arc<Mutex<Vec<(String, String, String)>>>,
    result: Option<&'static str>,
) -> BoxedErrorHandler<Input, String> {
    let calls = Arc::clone(calls);
    switchyard_core::into_error_handler(move |err: DispatchError, a: String, b: String| {
        let calls = Arc::clone(&calls);
        async move {
            calls.lock().push((err.to_string(), a, b));
            result.map(str::to_string)
        }
    })
}

fn input() -> Input {
    ("1".to_string(), "2".to_string())
}

fn args(a: &str, b: &str) -> Input {
    (a.to_string(), b.to_string())
}

struct Scenario {
    dispatcher: PathDispatcher,
    a: Calls,
    b: Calls,
    c: Calls,
    d: Calls,
    error: Arc<Mutex<Vec<(String, String, String)>>>,
}

/// Bindings `[always -> a, on("/") -> [b, c], always -> d]` plus one error handler.
fn scenario(b_fails: bool) -> Scenario {
    let s = Scenario {
        dispatcher: PathDispatcher::new(),
        a: Calls::default(),
        b: Calls::default(),
        c: Calls::default(),
        d: Calls::default(),
        error: Arc::default(),
    };

    s.dispatcher
        .always()
        .handler_boxed(recording(&s.a, None))
        .bind();

    let b = if b_fails {
        failing(&s.b, "error msg")
    } else {
        recording(&s.b, None)
    };
    s.dispatcher
        .on(vec![Some("/")])
        .handler_boxed(b)
        .handler_boxed(recording(&s.c, Some("success")))
        .bind();

    s.dispatcher
        .always()
        .handler_boxed(recording(&s.d, Some("late")))
        .bind();

    s.dispatcher
        .catch_boxed(recording_catch(&s.error, Some("error")));

    s
}

#[tokio::test]
async fn test_first_non_empty_result_wins() {
    let s = scenario(false);

    let result = s.dispatcher.find(vec!["/"]).call(input()).await;
    assert_eq!(assert_ok!(result).as_deref(), Some("success"));

    assert_eq!(*s.a.lock(), vec![args("1", "2")]);
    assert_eq!(*s.b.lock(), vec![args("1", "2")]);
    assert_eq!(*s.c.lock(), vec![args("1", "2")]);
    assert!(s.d.lock().is_empty());
    assert!(s.error.lock().is_empty());
}

#[tokio::test]
async fn test_handler_error_routes_to_error_chain() {
    let s = scenario(true);

    let result = s.dispatcher.find(vec!["/"]).call(input()).await;
    assert_eq!(assert_ok!(result).as_deref(), Some("error"));

    assert_eq!(s.a.lock().len(), 1);
    assert_eq!(s.b.lock().len(), 1);
    assert!(s.c.lock().is_empty());
    assert!(s.d.lock().is_empty());
    assert_eq!(
        *s.error.lock(),
        vec![("error msg".to_string(), "1".to_string(), "2".to_string())]
    );
}

#[tokio::test]
async fn test_unconditional_bindings_run_in_registration_order() {
    let order = Arc::new(Mutex::new(Vec::new()));
    let dispatcher = PathDispatcher::new();

    for label in ["first", "second"] {
        let order = Arc::clone(&order);
        dispatcher
            .always()
            .handler(move |_: String, _: String| {
                let order = Arc::clone(&order);
                async move {
                    order.lock().push(label);
                }
            })
            .bind();
    }

    let order_for_patterned = Arc::clone(&order);
    dispatcher
        .on(vec![Some("x")])
        .handler(move |_: String, _: String| {
            let order = Arc::clone(&order_for_patterned);
            async move {
                order.lock().push("patterned");
                Some("done".to_string())
            }
        })
        .bind();

    let result = dispatcher.find(vec!["x"]).call(input()).await.unwrap();
    assert_eq!(result.as_deref(), Some("done"));
    assert_eq!(*order.lock(), vec!["first", "second", "patterned"]);
}

#[tokio::test]
async fn test_no_match_yields_empty_sentinel() {
    let s = scenario(false);

    let result = s.dispatcher.find(vec!["/elsewhere"]).call(input()).await;
    // The trailing catch-all still answers.
    assert_eq!(assert_ok!(result).as_deref(), Some("late"));

    let dispatcher = PathDispatcher::new();
    let calls = Calls::default();
    dispatcher
        .on(vec![Some("/")])
        .handler_boxed(recording(&calls, Some("never")))
        .bind();

    let result = dispatcher.find(vec!["/other"]).call(input()).await;
    assert!(assert_ok!(result).is_none());
    assert!(calls.lock().is_empty());
}

#[tokio::test]
async fn test_all_empty_handlers_yield_empty_sentinel() {
    let dispatcher = PathDispatcher::new();
    let calls = Calls::default();

    dispatcher
        .on(vec![None])
        .handler_boxed(recording(&calls, None))
        .handler_boxed(recording(&calls, None))
        .bind();
    dispatcher
        .always()
        .handler_boxed(recording(&calls, None))
        .bind();

    let result = dispatcher.find(vec!["a"]).call(input()).await;
    assert!(assert_ok!(result).is_none());
    assert_eq!(calls.lock().len(), 3);
}

#[tokio::test]
async fn test_error_without_error_handlers_propagates() {
    let dispatcher = PathDispatcher::new();
    let calls = Calls::default();
    let after = Calls::default();

    dispatcher
        .always()
        .handler_boxed(failing(&calls, "error msg"))
        .handler_boxed(recording(&after, Some("unreachable")))
        .bind();

    let err = assert_err!(dispatcher.find(vec!["a"]).call(input()).await);
    assert!(matches!(err, DispatchError::Handler(_)));
    assert_eq!(err.to_string(), "error msg");
    assert!(after.lock().is_empty());
}

#[tokio::test]
async fn test_error_chain_runs_until_first_result() {
    let dispatcher = PathDispatcher::new();
    let calls = Calls::default();
    let first = Arc::default();
    let second = Arc::default();
    let third = Arc::default();

    dispatcher
        .always()
        .handler_boxed(failing(&calls, "boom"))
        .bind();
    dispatcher.catch_boxed(recording_catch(&first, None));
    dispatcher.catch_boxed(recording_catch(&second, Some("recovered")));
    dispatcher.catch_boxed(recording_catch(&third, Some("too late")));

    let result = dispatcher.find(vec!["a"]).call(input()).await;
    assert_eq!(assert_ok!(result).as_deref(), Some("recovered"));
    assert_eq!(first.lock().len(), 1);
    assert_eq!(second.lock().len(), 1);
    assert!(third.lock().is_empty());
}

#[tokio::test]
async fn test_exhausted_error_chain_is_handled_but_empty() {
    let dispatcher = PathDispatcher::new();
    let calls = Calls::default();
    let caught = Arc::default();

    dispatcher
        .always()
        .handler_boxed(failing(&calls, "boom"))
        .bind();
    dispatcher.catch_boxed(recording_catch(&caught, None));

    let result = dispatcher.find(vec!["a"]).call(input()).await;
    assert!(assert_ok!(result).is_none());
    assert_eq!(caught.lock().len(), 1);
}

#[tokio::test]
async fn test_failing_error_handler_propagates() {
    let dispatcher = PathDispatcher::new();
    let calls = Calls::default();
    let later = Arc::new(AtomicUsize::new(0));
    let later_clone = Arc::clone(&later);

    dispatcher
        .always()
        .handler_boxed(failing(&calls, "original"))
        .bind();
    dispatcher.catch(|_: DispatchError, _: String, _: String| async {
        Err::<Option<String>, _>("recovery failed")
    });
    dispatcher.catch(move |_: DispatchError, _: String, _: String| {
        let later = Arc::clone(&later_clone);
        async move {
            later.fetch_add(1, Ordering::SeqCst);
            Some("unreachable".to_string())
        }
    });

    let err = assert_err!(dispatcher.find(vec!["a"]).call(input()).await);
    assert!(matches!(err, DispatchError::Recovery(_)));
    assert_eq!(err.to_string(), "recovery failed");
    assert_eq!(later.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_arity_mismatch_enters_error_chain() {
    let dispatcher = PathDispatcher::new();
    let caught = Arc::default();
    let calls = Calls::default();

    dispatcher
        .on(vec![Some("a"), None])
        .handler_boxed(recording(&calls, Some("unreachable")))
        .bind();
    dispatcher.catch_boxed(recording_catch(&caught, Some("bad pattern")));

    let result = dispatcher.find(vec!["a"]).call(input()).await;
    assert_eq!(assert_ok!(result).as_deref(), Some("bad pattern"));
    assert!(calls.lock().is_empty());
    assert!(caught.lock()[0].0.contains("different numbers of segments"));
}

#[tokio::test]
async fn test_arity_mismatch_without_error_handlers_fails() {
    let dispatcher = PathDispatcher::new();
    let calls = Calls::default();

    dispatcher
        .on(vec![Some("a"), Some("b")])
        .handler_boxed(recording(&calls, Some("unreachable")))
        .bind();

    let err = assert_err!(dispatcher.find(vec!["a"]).call(input()).await);
    assert!(matches!(
        err,
        DispatchError::Match(MatchError::ArityMismatch {
            pattern: 2,
            target: 1
        })
    ));
}

#[tokio::test]
async fn test_find_is_reusable() {
    let s = scenario(false);
    let find = s.dispatcher.find(vec!["/"]);

    for _ in 0..3 {
        let result = find.call(input()).await.unwrap();
        assert_eq!(result.as_deref(), Some("success"));
    }

    assert_eq!(s.a.lock().len(), 3);
    assert_eq!(s.c.lock().len(), 3);
    assert!(s.d.lock().is_empty());
}
