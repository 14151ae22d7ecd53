//! Middleware ordering, cancellation and access to the host store.

use serde_json::json;
use statecraft::{
    ActionKind, ActionObject, CombinedStates, Dispatch, KindSelector, Middleware, Next, Payload,
    Registry, StateSlice, StatecraftError, Store, StoreOptions,
};
use std::sync::{Arc, Mutex};

fn form() -> StateSlice {
    StateSlice::new("form", json!({"name": "", "age": 0}))
        .unwrap()
        .create_actions([
            ("name", vec![ActionKind::Set, ActionKind::Reset]),
            ("age", vec![ActionKind::Inc]),
        ])
        .unwrap()
}

fn store_for(slice: StateSlice) -> (CombinedStates, Store) {
    let states = CombinedStates::new([slice], &Registry::new()).unwrap();
    let store = Store::from_states(&states, StoreOptions::default()).unwrap();
    (states, store)
}

fn recorder(log: &Arc<Mutex<Vec<String>>>, label: &str) -> impl Fn(&Dispatch, Next, &ActionObject) -> Result<(), StatecraftError> + Send + Sync + 'static {
    let log = Arc::clone(log);
    let label = label.to_owned();
    move |_store, next, _action| {
        log.lock().unwrap().push(label.clone());
        next.run()
    }
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn test_middleware_that_skips_next_cancels_silently() {
    let slice = form()
        .create_middlewares([Middleware::new("name", ActionKind::Set, |_, _, _| Ok(()))])
        .unwrap();
    let (states, store) = store_for(slice);
    let before = store.state();

    let set_name = states.slice("form").unwrap().action("name", ActionKind::Set).unwrap();
    set_name.call(json!("ada"), &store.dispatch_handle()).unwrap();

    assert_eq!(store.state(), before);
}

#[test]
fn test_cancellation_only_affects_the_bound_kind() {
    let slice = form()
        .create_middlewares([Middleware::new("name", ActionKind::Set, |_, _, _| Ok(()))])
        .unwrap();
    let (states, store) = store_for(slice);
    let handle = store.dispatch_handle();
    let form = states.slice("form").unwrap();

    form.action("age", ActionKind::Inc).unwrap().call(json!(3), &handle).unwrap();
    assert_eq!(store.state()["formReducer"]["age"], json!(3));
}

#[test]
fn test_middleware_error_leaves_state_untouched() {
    let slice = form()
        .create_middlewares([Middleware::new("name", KindSelector::Any, |_, _, action| {
            Err(StatecraftError::middleware(
                &action.prop,
                action.kind,
                "rejected",
            ))
        })])
        .unwrap();
    let (states, store) = store_for(slice);

    let set_name = states.slice("form").unwrap().action("name", ActionKind::Set).unwrap();
    let err = set_name.call(json!("ada"), &store.dispatch_handle()).unwrap_err();

    assert!(err.to_string().contains("rejected"));
    assert_eq!(store.state()["formReducer"]["name"], json!(""));
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_exact_kind_runs_before_wildcard() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let slice = form()
        .create_middlewares([
            Middleware::new("name", KindSelector::Any, recorder(&log, "any")),
            Middleware::new("name", ActionKind::Set, recorder(&log, "set-1")),
            Middleware::new("name", ActionKind::Set, recorder(&log, "set-2")),
            Middleware::new("name", ActionKind::Reset, recorder(&log, "reset")),
        ])
        .unwrap();
    let (states, store) = store_for(slice);

    let set_name = states.slice("form").unwrap().action("name", ActionKind::Set).unwrap();
    set_name.call(json!("ada"), &store.dispatch_handle()).unwrap();

    assert_eq!(*log.lock().unwrap(), ["set-1", "set-2", "any"]);
    assert_eq!(store.state()["formReducer"]["name"], json!("ada"));
}

#[test]
fn test_middleware_added_after_combining_is_seen() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (states, store) = store_for(form());
    let form = states.slice("form").unwrap();
    form.add_middleware(Middleware::new("age", ActionKind::Inc, recorder(&log, "late")))
        .unwrap();

    form.action("age", ActionKind::Inc).unwrap().call(json!(1), &store.dispatch_handle()).unwrap();
    assert_eq!(*log.lock().unwrap(), ["late"]);
}

// ============================================================================
// Host store access
// ============================================================================

#[test]
fn test_middleware_reads_host_state_around_next() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let slice = form()
        .create_middlewares([Middleware::new("age", ActionKind::Inc, move |store, next, _| {
            sink.lock().unwrap().push(store.state()["formReducer"]["age"].clone());
            next.run()?;
            sink.lock().unwrap().push(store.state()["formReducer"]["age"].clone());
            Ok(())
        })])
        .unwrap();
    let (states, store) = store_for(slice);

    let inc = states.slice("form").unwrap().action("age", ActionKind::Inc).unwrap();
    inc.call(json!(2), &store.dispatch_handle()).unwrap();

    assert_eq!(*seen.lock().unwrap(), [json!(0), json!(2)]);
}

#[test]
fn test_middleware_can_rewrite_the_action() {
    let slice = form()
        .create_middlewares([Middleware::new("name", ActionKind::Set, |store, _, action| {
            let upper = action.payload.to_value().as_str().unwrap_or_default().to_uppercase();
            let mut rewritten = action.clone();
            rewritten.payload = Payload::from(json!(upper));
            store.dispatch(rewritten)
        })])
        .unwrap();
    let (states, store) = store_for(slice);

    let set_name = states.slice("form").unwrap().action("name", ActionKind::Set).unwrap();
    set_name.call(json!("ada"), &store.dispatch_handle()).unwrap();

    assert_eq!(store.state()["formReducer"]["name"], json!("ADA"));
}

// ============================================================================
// Registration
// ============================================================================

#[test]
fn test_middleware_registration_is_validated() {
    let slice = form();

    let err = slice
        .add_middleware(Middleware::new("ghost", ActionKind::Set, |_, next, _| next.run()))
        .unwrap_err();
    assert!(matches!(err, StatecraftError::Middleware { .. }));

    let err = slice
        .add_middleware(Middleware::new("age", ActionKind::Set, |_, next, _| next.run()))
        .unwrap_err();
    assert!(err.to_string().contains("doesn't have the kind"));

    assert!(Middleware::parse("age", "bogus", |_, next, _| next.run()).is_err());
    let wildcard = Middleware::parse("age", "*", |_, next, _| next.run()).unwrap();
    assert_eq!(wildcard.kind, KindSelector::Any);
    slice.add_middleware(wildcard).unwrap();
}
