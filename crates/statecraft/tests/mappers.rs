//! `map_state`, `map_dispatch` and `QueryDispatch` against a live store.

use serde_json::{json, Value};
use statecraft::{
    selector, ActionKind, CombinedStates, MapperSpec, Registry, StateSlice, StatecraftError,
    Store, StoreOptions, STATE_REF,
};

fn fixture() -> (CombinedStates, Store) {
    let todos = StateSlice::new("todos", json!({"items": ["a"], "filter": "all"}))
        .unwrap()
        .create_actions([
            ("items", vec![ActionKind::Push, ActionKind::Set]),
            ("filter", vec![ActionKind::Set]),
            (STATE_REF, vec![ActionKind::Reset]),
        ])
        .unwrap()
        .create_selectors([(
            "count",
            selector(|todos, _| json!(todos["items"].as_array().map_or(0, Vec::len))),
        )]);
    let user = StateSlice::new("user", json!({"name": "ada"}))
        .unwrap()
        .create_actions([("name", ActionKind::Set)])
        .unwrap();

    let registry = Registry::new();
    registry.register_slice(user).unwrap();
    registry.register_selector(
        "sliceCount",
        selector(|host, _| json!(host.as_object().map_or(0, |m| m.len()))),
    );

    let states = CombinedStates::new([todos], &registry).unwrap();
    let store = Store::from_states(&states, StoreOptions::default()).unwrap();
    (states, store)
}

// ============================================================================
// map_dispatch
// ============================================================================

#[test]
fn test_map_dispatch_object_form_keys() {
    let (states, store) = fixture();
    let spec = MapperSpec::try_from(json!({
        "todos": "setFilter",
        "user": ["setName", "resetState"]
    }));
    // `user` declares no whole-slice reset.
    let err = states
        .map_dispatch(spec.unwrap())
        .unwrap()
        .apply(&store.dispatch_handle())
        .unwrap_err();
    assert!(matches!(err, StatecraftError::UnknownAction { .. }));

    let spec = MapperSpec::try_from(json!({"todos": "setFilter", "user": ["setName", "setName"]})).unwrap();
    let actions = states.map_dispatch(spec).unwrap().apply(&store.dispatch_handle()).unwrap();
    assert_eq!(actions.keys().collect::<Vec<_>>(), ["setFilter", "setName"]);
}

#[test]
fn test_map_dispatch_exact_key_set() {
    let a = StateSlice::new("a", json!({"x": 0}))
        .unwrap()
        .create_actions([("x", ActionKind::Set)])
        .unwrap();
    let b = StateSlice::new("b", json!({"y": 0, "z": 0}))
        .unwrap()
        .create_actions([("y", ActionKind::Set), ("z", ActionKind::Inc)])
        .unwrap();
    let states = CombinedStates::new([a, b], &Registry::new()).unwrap();
    let store = Store::from_states(&states, StoreOptions::default()).unwrap();

    let spec = MapperSpec::try_from(json!({"a": "setX", "b": ["setY", "incZ"]})).unwrap();
    let actions = states.map_dispatch(spec).unwrap().apply(&store.dispatch_handle()).unwrap();
    let mut keys: Vec<_> = actions.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, ["incZ", "setX", "setY"]);
}

#[test]
fn test_map_dispatch_errors() {
    let (states, store) = fixture();
    let handle = store.dispatch_handle();

    let err = states.map_dispatch("todos: items").unwrap().apply(&handle).unwrap_err();
    assert!(matches!(err, StatecraftError::MissingKind { .. }));
    assert!(err.to_string().contains("prefixed by its kind"));

    let err = states.map_dispatch("todos: setNothing").unwrap().apply(&handle).unwrap_err();
    assert!(err.to_string().contains("nothing"));

    let err = states.map_dispatch("todos: popItems").unwrap().apply(&handle).unwrap_err();
    assert!(matches!(err, StatecraftError::UnknownAction { .. }));

    let err = states.map_dispatch("ghost: setX").unwrap().apply(&handle).unwrap_err();
    assert!(matches!(err, StatecraftError::UnknownState { .. }));

    assert!(states.map_dispatch("no namespace").is_err());
}

// ============================================================================
// map_state
// ============================================================================

#[test]
fn test_map_state_values_and_selectors() {
    let (states, store) = fixture();
    let mapped = states
        .map_state("todos: items count sliceCount")
        .unwrap()
        .apply(&store.state())
        .unwrap();

    assert_eq!(
        mapped.keys().collect::<Vec<_>>(),
        ["items", "countSelector", "sliceCountSelector"]
    );
    assert_eq!(mapped["items"].as_value(), Some(&json!(["a"])));
    assert_eq!(mapped["countSelector"].as_selector().unwrap().call(&[]), json!(1));
    assert_eq!(mapped["sliceCountSelector"].as_selector().unwrap().call(&[]), json!(2));
}

#[test]
fn test_map_state_unknown_names() {
    let (states, store) = fixture();
    let err = states.map_state("todos: nope").unwrap().apply(&store.state()).unwrap_err();
    assert!(matches!(err, StatecraftError::UnknownSelector { .. }));
    assert!(err.to_string().contains("nope"));

    let err = states.map_state("ghost: x").unwrap().apply(&store.state()).unwrap_err();
    assert!(err.to_string().contains("ghost"));

    let err = states.map_state("user: name").unwrap().apply(&json!({})).unwrap_err();
    assert!(matches!(err, StatecraftError::UnknownState { .. }));
}

#[test]
fn test_dispatch_then_map_state_round_trip() {
    let (states, store) = fixture();
    let actions = states
        .map_dispatch("user: setName")
        .unwrap()
        .apply(&store.dispatch_handle())
        .unwrap();
    actions["setName"].call(json!("grace")).unwrap();

    let mapped = states.map_state("user: name").unwrap().apply(&store.state()).unwrap();
    assert_eq!(mapped["name"].as_value(), Some(&Value::from("grace")));
}

// ============================================================================
// QueryDispatch
// ============================================================================

#[test]
fn test_query_dispatch_results_are_callable() {
    let (states, store) = fixture();
    let mut query = states.query_dispatch();
    query
        .state("todos", |q| {
            q.push("items")?.set("filter")?.dispatch("resetState")?;
            Ok(())
        })
        .unwrap()
        .set("user: name")
        .unwrap();

    let actions = query.results().unwrap().apply(&store.dispatch_handle()).unwrap();
    assert_eq!(
        actions.keys().collect::<Vec<_>>(),
        ["pushItems", "setFilter", "resetTodosState", "setName"]
    );

    actions["pushItems"].call(json!("b")).unwrap();
    actions["setFilter"].call(json!("done")).unwrap();
    assert_eq!(
        store.state()["todosReducer"],
        json!({"items": ["a", "b"], "filter": "done"})
    );

    actions["resetTodosState"].call(json!(null)).unwrap();
    assert_eq!(
        store.state()["todosReducer"],
        json!({"items": ["a"], "filter": "all"})
    );
}
