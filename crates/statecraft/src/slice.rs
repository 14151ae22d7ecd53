//! The state-slice builder.
//!
//! A [`StateSlice`] owns one namespace of application state. Declaring
//! actions on it generates dispatch types, reducer conditions and action
//! creators; declaring middlewares attaches interceptors to those creators.
//!
//! ```
//! use statecraft::{ActionKind, Dispatch, StateSlice};
//! use serde_json::json;
//! use std::sync::{Arc, Mutex};
//!
//! let counter = StateSlice::new("counter", json!({"value": 0}))
//!     .unwrap()
//!     .create_actions([("value", vec![ActionKind::Inc, ActionKind::Reset])])
//!     .unwrap();
//!
//! let state = Arc::new(Mutex::new(json!({"value": 0})));
//! let reducer = counter.reducer();
//! let store = Arc::clone(&state);
//! let dispatch = Dispatch::new(move |action| {
//!     let mut state = store.lock().unwrap();
//!     *state = reducer(Some(&*state), &action)?;
//!     Ok(())
//! });
//!
//! counter.action("value", ActionKind::Inc).unwrap().call(json!(5), &dispatch).unwrap();
//! assert_eq!(*state.lock().unwrap(), json!({"value": 5}));
//! ```

use crate::action::{dispatch_type, state_dispatch_type, STATE_REF};
use crate::engine::{MutationEngine, Reducer, ReducerCondition};
use crate::middleware::{chain, Middleware, Next};
use crate::selector::SelectorFn;
use crate::{
    ActionKind, ActionObject, Dispatch, KindSelector, Kinds, Payload, SliceDefinition,
    SliceOptions, StatecraftError, StatecraftResult,
};
use heck::ToLowerCamelCase;
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

type MiddlewareTable = Arc<RwLock<Vec<Middleware>>>;

/// One named slice: initial value, actions, middlewares and selectors.
#[derive(Clone)]
pub struct StateSlice {
    name: String,
    engine: MutationEngine,
    actions: IndexMap<String, IndexMap<ActionKind, ActionCreator>>,
    middlewares: MiddlewareTable,
    selectors: IndexMap<String, SelectorFn>,
    options: SliceOptions,
}

impl StateSlice {
    /// Create a slice. `initial` must be a JSON object.
    pub fn new(name: impl Into<String>, initial: Value) -> StatecraftResult<Self> {
        Self::with_options(name, initial, SliceOptions::default())
    }

    pub fn with_options(
        name: impl Into<String>,
        initial: Value,
        options: SliceOptions,
    ) -> StatecraftResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(StatecraftError::invalid_spec("the name of the state must not be empty"));
        }
        if !initial.is_object() {
            return Err(StatecraftError::invalid_spec(format!(
                "the initial state of \"{name}\" must be an object. Got \"{initial}\""
            )));
        }

        let mut engine = MutationEngine::new(name.clone(), initial);
        if options.strict_typing {
            engine = engine.with_strict_typing();
        }
        Ok(Self {
            name,
            engine,
            actions: IndexMap::new(),
            middlewares: Arc::new(RwLock::new(Vec::new())),
            selectors: IndexMap::new(),
            options,
        })
    }

    /// Build a slice from its declarative description.
    pub fn from_definition(definition: SliceDefinition) -> StatecraftResult<Self> {
        let actions = definition
            .actions
            .iter()
            .map(|(name, kinds)| Kinds::try_from(kinds).map(|kinds| (name.clone(), kinds)))
            .collect::<StatecraftResult<Vec<_>>>()?;
        Self::with_options(definition.name, definition.initial, definition.options)?
            .create_actions(actions)
    }

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------

    /// Declare actions as `name -> kinds`.
    ///
    /// Each name must be a property of the initial value (matched in
    /// lowerCamelCase), [`STATE_REF`] (whole-slice reset), or carry the
    /// `trigger` kind. Names may only be declared once.
    pub fn create_actions<I, N, K>(mut self, actions: I) -> StatecraftResult<Self>
    where
        I: IntoIterator<Item = (N, K)>,
        N: Into<String>,
        K: Into<Kinds>,
    {
        for (name, kinds) in actions {
            let name = name.into();
            if self.actions.contains_key(&name) {
                return Err(StatecraftError::duplicate_action(&self.name, name));
            }
            self.declare(name, kinds.into())?;
        }
        Ok(self)
    }

    /// Declare further kinds for one action, after `create_actions`.
    pub fn add_action(&mut self, name: impl Into<String>, kinds: impl Into<Kinds>) -> StatecraftResult<()> {
        self.declare(name.into(), kinds.into())
    }

    /// Attach middlewares. Each must reference a declared action and one of
    /// its kinds, or `*`.
    pub fn create_middlewares<I>(self, middlewares: I) -> StatecraftResult<Self>
    where
        I: IntoIterator<Item = Middleware>,
    {
        for middleware in middlewares {
            self.add_middleware(middleware)?;
        }
        Ok(self)
    }

    /// Attach one middleware. Middlewares run in registration order.
    pub fn add_middleware(&self, middleware: Middleware) -> StatecraftResult<()> {
        let Some(kinds) = self.actions.get(&middleware.action_name) else {
            return Err(StatecraftError::middleware(
                &middleware.action_name,
                middleware.kind,
                format!("there is no action \"{}\" in state \"{}\"", middleware.action_name, self.name),
            ));
        };
        if let KindSelector::Exact(kind) = middleware.kind {
            if !kinds.contains_key(&kind) {
                return Err(StatecraftError::middleware(
                    &middleware.action_name,
                    kind,
                    format!("the action \"{}\" doesn't have the kind \"{kind}\"", middleware.action_name),
                ));
            }
        }
        self.middlewares
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(middleware);
        Ok(())
    }

    /// Register slice-local selectors.
    pub fn create_selectors<I, N>(mut self, selectors: I) -> Self
    where
        I: IntoIterator<Item = (N, SelectorFn)>,
        N: Into<String>,
    {
        self.selectors
            .extend(selectors.into_iter().map(|(name, f)| (name.into(), f)));
        self
    }

    fn declare(&mut self, name: String, kinds: Kinds) -> StatecraftResult<()> {
        let is_state_ref = name == STATE_REF;
        let prop = if is_state_ref {
            name.clone()
        } else {
            name.to_lower_camel_case()
        };

        if kinds.is_empty() {
            return Err(StatecraftError::invalid_spec(format!(
                "action \"{name}\" in state \"{}\" declares no kind",
                self.name
            )));
        }
        if is_state_ref && kinds.as_slice().iter().any(|k| *k != ActionKind::Reset) {
            return Err(StatecraftError::invalid_spec(format!(
                "only the reset kind can be declared on \"{STATE_REF}\""
            )));
        }
        if !is_state_ref && !self.is_in_state(&prop) && !kinds.contains(ActionKind::Trigger) {
            return Err(StatecraftError::unknown_property(&self.name, prop));
        }

        // Validate every kind before touching any table.
        let existing = self.actions.get(&name);
        let mut planned: Vec<(ActionKind, String)> = Vec::with_capacity(kinds.as_slice().len());
        for &kind in kinds.as_slice() {
            let action_type = if is_state_ref {
                state_dispatch_type(&self.name)
            } else {
                dispatch_type(kind, &name)
            };
            let declared = existing.is_some_and(|k| k.contains_key(&kind));
            let collides = self
                .engine
                .conditions()
                .iter()
                .any(|c| c.action_type == action_type)
                || planned.iter().any(|(_, t)| *t == action_type);
            if declared || collides {
                return Err(StatecraftError::duplicate_action(&self.name, format!("{name} ({kind})")));
            }
            planned.push((kind, action_type));
        }

        for (kind, action_type) in planned {
            self.engine.push_condition(ReducerCondition {
                action_type: action_type.clone(),
                prop: prop.clone(),
                kind,
            });
            let creator = ActionCreator {
                namespace: self.name.clone(),
                name: name.clone(),
                prop: prop.clone(),
                kind,
                action_type,
                middlewares: Arc::clone(&self.middlewares),
            };
            self.actions
                .entry(name.clone())
                .or_default()
                .insert(kind, creator);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initial(&self) -> &Value {
        self.engine.initial()
    }

    pub fn options(&self) -> &SliceOptions {
        &self.options
    }

    pub fn is_in_state(&self, prop: &str) -> bool {
        self.engine
            .initial()
            .as_object()
            .is_some_and(|map| map.contains_key(prop))
    }

    pub fn is_selector(&self, name: &str) -> bool {
        self.selectors.contains_key(name)
    }

    pub fn has_action(&self, name: &str, kind: ActionKind) -> bool {
        self.actions
            .get(name)
            .is_some_and(|kinds| kinds.contains_key(&kind))
    }

    /// Declared kinds of `name`, in declaration order.
    pub fn action_kinds(&self, name: &str) -> Option<Vec<ActionKind>> {
        self.actions.get(name).map(|kinds| kinds.keys().copied().collect())
    }

    pub fn action(&self, name: &str, kind: ActionKind) -> Option<&ActionCreator> {
        self.actions.get(name)?.get(&kind)
    }

    pub fn actions(&self, name: &str) -> Option<&IndexMap<ActionKind, ActionCreator>> {
        self.actions.get(name)
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn selector(&self, name: &str) -> Option<&SelectorFn> {
        self.selectors.get(name)
    }

    // ------------------------------------------------------------------
    // Reduction
    // ------------------------------------------------------------------

    /// A reducer over the actions declared so far.
    pub fn reducer(&self) -> Reducer {
        let engine = Arc::new(self.engine.clone());
        Arc::new(move |state, action| engine.reduce(state, action))
    }

    pub fn reduce(&self, state: Option<&Value>, action: &ActionObject) -> StatecraftResult<Value> {
        self.engine.reduce(state, action)
    }

    pub fn engine(&self) -> &MutationEngine {
        &self.engine
    }
}

impl fmt::Debug for StateSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateSlice")
            .field("name", &self.name)
            .field("initial", self.engine.initial())
            .field("actions", &self.actions.keys().collect::<Vec<_>>())
            .field("selectors", &self.selectors.keys().collect::<Vec<_>>())
            .field("options", &self.options)
            .finish()
    }
}

/// Creates and dispatches the action of one (name, kind) pair.
#[derive(Clone)]
pub struct ActionCreator {
    namespace: String,
    name: String,
    prop: String,
    kind: ActionKind,
    action_type: String,
    middlewares: MiddlewareTable,
}

impl ActionCreator {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prop(&self) -> &str {
        &self.prop
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    /// The action object this creator dispatches for `payload`.
    pub fn build(&self, payload: impl Into<Payload>) -> ActionObject {
        ActionObject {
            action_type: self.action_type.clone(),
            payload: payload.into(),
            kind: self.kind,
            prop: self.prop.clone(),
            state: self.namespace.clone(),
        }
    }

    /// Build the action and send it through the middleware chain to
    /// `dispatch`. Exact-kind middlewares run before wildcard ones.
    pub fn call(&self, payload: impl Into<Payload>, dispatch: &Dispatch) -> StatecraftResult<()> {
        let action = self.build(payload);
        let middlewares = self.matching_middlewares();
        if middlewares.is_empty() {
            return dispatch.dispatch(action);
        }

        let sink = dispatch.clone();
        let dispatched = action.clone();
        let terminal = Next::new(move || sink.dispatch(dispatched.clone()));
        chain(&middlewares, dispatch, terminal, &action).run()
    }

    fn matching_middlewares(&self) -> Vec<Middleware> {
        let table = self.middlewares.read().unwrap_or_else(PoisonError::into_inner);
        let exact = table
            .iter()
            .filter(|m| m.action_name == self.name && m.kind == KindSelector::Exact(self.kind));
        let wildcard = table
            .iter()
            .filter(|m| m.action_name == self.name && m.kind == KindSelector::Any);
        let selected: Vec<Middleware> = exact.chain(wildcard).cloned().collect();
        selected
    }
}

impl fmt::Debug for ActionCreator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCreator")
            .field("state", &self.namespace)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("type", &self.action_type)
            .finish()
    }
}
