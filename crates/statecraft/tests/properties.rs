//! Reducer properties over generated payloads.

use proptest::prelude::*;
use serde_json::{json, Value};
use statecraft::{ActionKind, Payload, StateSlice};

fn slice() -> StateSlice {
    StateSlice::new("props", json!({"n": 0, "label": "", "xs": []}))
        .unwrap()
        .create_actions([
            ("n", vec![ActionKind::Inc, ActionKind::Dec, ActionKind::Set, ActionKind::Reset]),
            ("label", vec![ActionKind::Set, ActionKind::Reset]),
            ("xs", vec![ActionKind::Push, ActionKind::Pop]),
        ])
        .unwrap()
}

fn reduce(slice: &StateSlice, state: &Value, name: &str, kind: ActionKind, payload: impl Into<Payload>) -> Value {
    let action = slice.action(name, kind).unwrap().build(payload);
    slice.reduce(Some(state), &action).unwrap()
}

proptest! {
    #[test]
    fn unmatched_types_return_an_equal_state(n in any::<i64>(), label in ".{0,12}") {
        let slice = slice();
        let state = json!({"n": n, "label": label, "xs": [1]});
        let mut foreign = slice.action("n", ActionKind::Set).unwrap().build(json!(1));
        foreign.action_type = "SET_SOMETHING_ELSE".to_owned();
        prop_assert_eq!(slice.reduce(Some(&state), &foreign).unwrap(), state.clone());

        foreign.state = "elsewhere".to_owned();
        foreign.action_type = "SET_N".to_owned();
        prop_assert_eq!(slice.reduce(Some(&state), &foreign).unwrap(), state);
    }

    #[test]
    fn set_only_touches_its_property(label in ".{0,16}") {
        let slice = slice();
        let before = json!({"n": 7, "label": "x", "xs": [1, 2]});
        let after = reduce(&slice, &before, "label", ActionKind::Set, json!(label.clone()));
        prop_assert_eq!(&after["label"], &json!(label));
        prop_assert_eq!(&after["n"], &before["n"]);
        prop_assert_eq!(&after["xs"], &before["xs"]);
    }

    #[test]
    fn inc_then_dec_restores(start in any::<i32>(), delta in any::<i32>()) {
        let slice = slice();
        let state = json!({"n": start, "label": "", "xs": []});
        let up = reduce(&slice, &state, "n", ActionKind::Inc, json!(delta));
        let down = reduce(&slice, &up, "n", ActionKind::Dec, json!(delta));
        prop_assert_eq!(&up["n"], &json!(i64::from(start) + i64::from(delta)));
        prop_assert_eq!(down, state);
    }

    #[test]
    fn reset_is_idempotent(n in any::<i64>(), label in ".{0,8}") {
        let slice = slice();
        let state = json!({"n": n, "label": label, "xs": []});
        let once = reduce(&slice, &state, "n", ActionKind::Reset, Payload::None);
        let twice = reduce(&slice, &once, "n", ActionKind::Reset, Payload::None);
        prop_assert_eq!(&once["n"], &json!(0));
        prop_assert_eq!(&once["label"], &json!(label));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn push_then_pop_restores(items in prop::collection::vec(any::<i32>(), 0..8), extra in any::<i32>()) {
        let slice = slice();
        let state = json!({"n": 0, "label": "", "xs": items});
        let pushed = reduce(&slice, &state, "xs", ActionKind::Push, json!(extra));
        prop_assert_eq!(pushed["xs"].as_array().map(Vec::len), Some(items.len() + 1));
        let popped = reduce(&slice, &pushed, "xs", ActionKind::Pop, Payload::None);
        prop_assert_eq!(popped, state);
    }

    #[test]
    fn input_state_is_never_mutated(n in any::<i16>()) {
        let slice = slice();
        let state = json!({"n": n, "label": "", "xs": [n]});
        let snapshot = state.clone();
        let _ = reduce(&slice, &state, "n", ActionKind::Inc, json!(1));
        let _ = reduce(&slice, &state, "xs", ActionKind::Pop, Payload::None);
        prop_assert_eq!(state, snapshot);
    }
}
