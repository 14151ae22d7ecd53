//! A reference host store.
//!
//! The slices only need a reducer composition and a `dispatch` primitive
//! from their host; [`Store`] is a minimal synchronous one.

use crate::engine::Reducer;
use crate::selector::SelectorFn;
use crate::{ActionKind, ActionObject, CombinedStates, Dispatch, Payload, StatecraftResult};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

/// A reducer over the combined state object.
pub type CombinedReducer =
    Arc<dyn Fn(&Value, &ActionObject) -> StatecraftResult<Value> + Send + Sync>;

/// Compose `{key -> reducer}` into one reducer over `{key -> sub-state}`.
///
/// Each reducer receives the sub-state under its key (`None` if absent).
/// The first reducer error aborts the whole reduction.
pub fn combine_reducers(reducers: IndexMap<String, Reducer>) -> CombinedReducer {
    Arc::new(move |state, action| {
        let mut next = Map::with_capacity(reducers.len());
        for (key, reducer) in &reducers {
            let sub = reducer(state.get(key), action)?;
            next.insert(key.clone(), sub);
        }
        Ok(Value::Object(next))
    })
}

/// Options of the reference store.
#[derive(Clone, Default)]
pub struct StoreOptions {
    /// Global selectors registered into the combined states' registry.
    pub selectors: IndexMap<String, SelectorFn>,
}

impl fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreOptions")
            .field("selectors", &self.selectors.keys().collect::<Vec<_>>())
            .finish()
    }
}

struct StoreInner {
    reducer: CombinedReducer,
    state: RwLock<Value>,
}

/// Holds the combined state and applies dispatched actions to it.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Create a store whose state starts as `reducer`'s output for an
    /// action no slice handles.
    pub fn new(reducer: CombinedReducer) -> StatecraftResult<Self> {
        let init = ActionObject {
            action_type: "@@statecraft/INIT".to_owned(),
            payload: Payload::None,
            kind: ActionKind::Trigger,
            prop: String::new(),
            state: String::new(),
        };
        let state = reducer(&Value::Object(Map::new()), &init)?;
        Ok(Self {
            inner: Arc::new(StoreInner {
                reducer,
                state: RwLock::new(state),
            }),
        })
    }

    /// Create a store over `states`, registering `options.selectors` as
    /// global selectors first.
    ///
    /// The selectors go into `states.registry()`, which is shared with the
    /// [`Registry`](crate::Registry) `states` was built from: every handle to
    /// that registry sees them afterwards.
    pub fn from_states(states: &CombinedStates, options: StoreOptions) -> StatecraftResult<Self> {
        for (name, selector) in options.selectors {
            states.registry().register_selector(name, selector);
        }
        Self::new(states.reducer())
    }

    /// Reduce the current state by `action`. On error the stored state is
    /// left untouched.
    ///
    /// The write lock is held across the reduction, so concurrent dispatches
    /// are applied one after another and none is lost.
    pub fn dispatch(&self, action: ActionObject) -> StatecraftResult<()> {
        debug!(action_type = %action.action_type, state = %action.state, "dispatch");
        let mut state = self.inner.state.write().unwrap_or_else(PoisonError::into_inner);
        match (self.inner.reducer)(&*state, &action) {
            Ok(next) => {
                *state = next;
                Ok(())
            }
            Err(err) => {
                warn!(action_type = %action.action_type, error = %err, "reducer failed");
                Err(err)
            }
        }
    }

    /// Snapshot of the combined state.
    pub fn state(&self) -> Value {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// A cloneable dispatch handle bound to this store.
    pub fn dispatch_handle(&self) -> Dispatch {
        let sink = self.clone();
        let reader = self.clone();
        Dispatch::new(move |action| sink.dispatch(action)).with_state(move || reader.state())
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store").field("state", &self.state()).finish()
    }
}
