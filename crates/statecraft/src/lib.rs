//! Declarative state slices for centralized application stores.
//!
//! `statecraft` turns a slice declaration (a namespace, an initial value map
//! and the mutation kinds allowed per property) into a pure reducer, action
//! creators routed through middleware chains, and selectors. String
//! specifications like `"counter: value doubled"` bind those pieces at the
//! UI boundary.
//!
//! # Core Concepts
//!
//! - **StateSlice**: one namespace with its actions, middlewares and selectors
//! - **ActionKind**: the closed set of mutation kinds (`set`, `push`, `inc`, ...)
//! - **MutationEngine**: applies a validated mutation to a cloned slice value
//! - **Middleware**: interceptor that may forward (`next.run()`) or drop an action
//! - **CombinedStates**: all slices keyed by `namespace + "Reducer"`
//! - **map_state / map_dispatch / QueryDispatch**: bindings from text like `"ns: a b"`
//! - **Query**: fluent cursor used by the `query` kind
//!
//! # Deterministic Reduction
//!
//! ```text
//! State' = reducer(State, ActionObject)
//! ```
//!
//! - the reducer works on a clone and never mutates its input
//! - the first reducer condition matching the action's type wins
//! - a failed validation returns an error and leaves the stored state alone
//!
//! # Quick Start
//!
//! ```
//! use statecraft::{ActionKind, CombinedStates, Registry, StateSlice, Store, StoreOptions};
//! use serde_json::json;
//!
//! let counter = StateSlice::new("counter", json!({"value": 0}))
//!     .unwrap()
//!     .create_actions([("value", vec![ActionKind::Inc, ActionKind::Dec, ActionKind::Reset])])
//!     .unwrap();
//!
//! let states = CombinedStates::new([counter], &Registry::new()).unwrap();
//! let store = Store::from_states(&states, StoreOptions::default()).unwrap();
//!
//! let actions = states
//!     .map_dispatch("counter: incValue decValue")
//!     .unwrap()
//!     .apply(&store.dispatch_handle())
//!     .unwrap();
//! actions["incValue"].call(json!(5)).unwrap();
//! actions["decValue"].call(json!(2)).unwrap();
//!
//! let mapped = states.map_state("counter: value").unwrap().apply(&store.state()).unwrap();
//! assert_eq!(mapped["value"].as_value(), Some(&json!(3)));
//! ```

mod action;
mod combine;
mod config;
mod engine;
mod error;
mod kind;
mod mapper;
mod middleware;
mod query_dispatch;
mod registry;
mod resolver;
mod selector;
mod shape;
mod slice;
mod store;

// Core types
pub use action::{
    dispatch_type, state_dispatch_type, ActionObject, Dispatch, Payload, Predicate, QueryFn,
    Transform, STATE_REF, SUFFIX,
};
pub use engine::{MutationEngine, Reducer, ReducerCondition};
pub use error::{StatecraftError, StatecraftResult};
pub use kind::{ActionKind, KindFamily, KindSelector, Kinds, WILDCARD};
pub use middleware::{chain, Middleware, MiddlewareHandler, Next};

// Slices and composition
pub use combine::{state_key, CombinedStates};
pub use config::{SliceDefinition, SliceOptions};
pub use registry::{with_registry, Registry};
pub use selector::{selector, BoundSelector, Mapped, SelectorFn};
pub use slice::{ActionCreator, StateSlice};
pub use store::{combine_reducers, CombinedReducer, Store, StoreOptions};

// Mappers
pub use mapper::{BoundAction, MapDispatch, MapState};
pub use query_dispatch::QueryDispatch;
pub use resolver::{resolve, resolve_scoped, MapperSpec, PropertyRef, SpecEntry};

// Value query cursor
pub use statecraft_query::{
    get_at_path, parse_path, path, value_type_name, Path, Query, QueryError, QueryResult, Seg,
};

// Re-export serde_json::Value for convenience
pub use serde_json::Value;
