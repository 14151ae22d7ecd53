//! Slice combinator.

use crate::action::SUFFIX;
use crate::engine::Reducer;
use crate::mapper::{MapDispatch, MapState};
use crate::query_dispatch::QueryDispatch;
use crate::resolver::MapperSpec;
use crate::selector::SelectorFn;
use crate::store::{combine_reducers, CombinedReducer};
use crate::{Registry, StateSlice, StatecraftError, StatecraftResult};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Combined key of a namespace, e.g. `counterReducer`.
pub fn state_key(namespace: &str) -> String {
    format!("{namespace}{SUFFIX}")
}

/// Every slice of an application, keyed by `namespace + "Reducer"`.
///
/// Built once from explicit slices plus the slices held by a [`Registry`];
/// build a new instance to change the set.
#[derive(Clone, Debug)]
pub struct CombinedStates {
    slices: IndexMap<String, Arc<StateSlice>>,
    registry: Registry,
}

impl CombinedStates {
    pub fn new<I>(slices: I, registry: &Registry) -> StatecraftResult<Self>
    where
        I: IntoIterator<Item = StateSlice>,
    {
        let explicit = slices.into_iter().map(Arc::new);
        let mut combined = IndexMap::new();
        for slice in explicit.chain(registry.slices()) {
            let key = state_key(slice.name());
            if combined.contains_key(&key) {
                return Err(StatecraftError::DuplicateState {
                    name: slice.name().to_owned(),
                });
            }
            combined.insert(key, slice);
        }
        Ok(Self {
            slices: combined,
            registry: registry.clone(),
        })
    }

    /// Look a slice up by namespace.
    pub fn slice(&self, namespace: &str) -> Option<&Arc<StateSlice>> {
        self.slices.get(&state_key(namespace))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slices.keys().map(String::as_str)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn global_selector(&self, name: &str) -> Option<SelectorFn> {
        self.registry.selector(name)
    }

    pub fn reducers(&self) -> IndexMap<String, Reducer> {
        self.slices
            .iter()
            .map(|(key, slice)| (key.clone(), slice.reducer()))
            .collect()
    }

    /// One reducer over the combined state object.
    pub fn reducer(&self) -> CombinedReducer {
        combine_reducers(self.reducers())
    }

    /// Combined state made of every slice's pristine value.
    pub fn initial_state(&self) -> Value {
        let map: Map<String, Value> = self
            .slices
            .iter()
            .map(|(key, slice)| (key.clone(), slice.initial().clone()))
            .collect();
        Value::Object(map)
    }

    pub fn map_state(&self, spec: impl Into<MapperSpec>) -> StatecraftResult<MapState<'_>> {
        MapState::new(self, &spec.into())
    }

    pub fn map_dispatch(&self, spec: impl Into<MapperSpec>) -> StatecraftResult<MapDispatch<'_>> {
        MapDispatch::new(self, &spec.into())
    }

    pub fn query_dispatch(&self) -> QueryDispatch<'_> {
        QueryDispatch::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ActionKind;
    use serde_json::json;

    #[test]
    fn merges_explicit_and_registered_slices() {
        let registry = Registry::new();
        registry
            .register_slice(StateSlice::new("b", json!({"y": 2})).unwrap())
            .unwrap();
        let states =
            CombinedStates::new([StateSlice::new("a", json!({"x": 1})).unwrap()], &registry).unwrap();

        assert_eq!(states.keys().collect::<Vec<_>>(), ["aReducer", "bReducer"]);
        assert_eq!(
            states.initial_state(),
            json!({"aReducer": {"x": 1}, "bReducer": {"y": 2}})
        );
        assert!(states.slice("b").is_some());
    }

    #[test]
    fn duplicate_keys_fail() {
        let registry = Registry::new();
        registry
            .register_slice(StateSlice::new("a", json!({})).unwrap())
            .unwrap();
        let err = CombinedStates::new([StateSlice::new("a", json!({})).unwrap()], &registry).unwrap_err();
        assert!(matches!(err, StatecraftError::DuplicateState { .. }));
    }

    #[test]
    fn combined_reducer_fans_out() {
        let a = StateSlice::new("a", json!({"x": 1}))
            .unwrap()
            .create_actions([("x", ActionKind::Set)])
            .unwrap();
        let set_x = a.action("x", ActionKind::Set).unwrap().build(json!(5));
        let states = CombinedStates::new([a, StateSlice::new("b", json!({"x": 1})).unwrap()], &Registry::new())
            .unwrap();

        let reducer = states.reducer();
        let next = reducer(&states.initial_state(), &set_x).unwrap();
        assert_eq!(next, json!({"aReducer": {"x": 5}, "bReducer": {"x": 1}}));
    }
}
