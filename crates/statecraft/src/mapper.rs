//! `map_state` and `map_dispatch`: bind resolved specifications to values,
//! selectors and action creators.

use crate::action::STATE_REF;
use crate::combine::state_key;
use crate::resolver::{lower_first, resolve, upper_first, MapperSpec, PropertyRef};
use crate::selector::{BoundSelector, Mapped};
use crate::slice::ActionCreator;
use crate::{
    ActionKind, CombinedStates, Dispatch, Payload, StateSlice, StatecraftError, StatecraftResult,
};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;

fn slice_for<'s>(states: &'s CombinedStates, namespace: &str) -> StatecraftResult<&'s Arc<StateSlice>> {
    states
        .slice(namespace)
        .ok_or_else(|| StatecraftError::unknown_state(namespace))
}

/// Resolved `map_state` specification.
#[derive(Debug)]
pub struct MapState<'a> {
    states: &'a CombinedStates,
    refs: Vec<PropertyRef>,
}

impl<'a> MapState<'a> {
    pub(crate) fn new(states: &'a CombinedStates, spec: &MapperSpec) -> StatecraftResult<Self> {
        Ok(Self {
            states,
            refs: resolve(spec)?,
        })
    }

    /// Read every mapped name out of `host_state`.
    ///
    /// A name is looked up as a state property, then as a slice selector,
    /// then as a global selector. Selectors are bound under `<name>Selector`.
    pub fn apply(&self, host_state: &Value) -> StatecraftResult<IndexMap<String, Mapped>> {
        let mut out = IndexMap::with_capacity(self.refs.len());
        for PropertyRef { namespace, property } in &self.refs {
            let slice = slice_for(self.states, namespace)?;
            let sub_state = host_state
                .get(state_key(namespace))
                .ok_or_else(|| StatecraftError::unknown_state(namespace))?;

            if slice.is_in_state(property) {
                let value = sub_state.get(property).cloned().unwrap_or(Value::Null);
                out.insert(property.clone(), Mapped::Value(value));
            } else if let Some(selector) = slice.selector(property) {
                let bound = BoundSelector::new(Arc::clone(selector), sub_state.clone());
                out.insert(format!("{property}Selector"), Mapped::Selector(bound));
            } else if let Some(selector) = self.states.global_selector(property) {
                let bound = BoundSelector::new(selector, host_state.clone());
                out.insert(format!("{property}Selector"), Mapped::Selector(bound));
            } else {
                return Err(StatecraftError::UnknownSelector {
                    state: namespace.clone(),
                    name: property.clone(),
                });
            }
        }
        Ok(out)
    }
}

/// An action creator bound to a dispatch handle.
#[derive(Clone, Debug)]
pub struct BoundAction {
    creator: ActionCreator,
    dispatch: Dispatch,
}

impl BoundAction {
    pub fn call(&self, payload: impl Into<Payload>) -> StatecraftResult<()> {
        self.creator.call(payload, &self.dispatch)
    }

    pub fn creator(&self) -> &ActionCreator {
        &self.creator
    }
}

/// Resolved `map_dispatch` specification.
#[derive(Debug)]
pub struct MapDispatch<'a> {
    states: &'a CombinedStates,
    refs: Vec<PropertyRef>,
}

impl<'a> MapDispatch<'a> {
    pub(crate) fn new(states: &'a CombinedStates, spec: &MapperSpec) -> StatecraftResult<Self> {
        Ok(Self {
            states,
            refs: resolve(spec)?,
        })
    }

    /// Keys `apply` binds, in order.
    pub fn names(&self) -> Vec<String> {
        self.refs
            .iter()
            .map(|r| {
                if r.property == "resetState" {
                    format!("reset{}State", upper_first(&r.namespace))
                } else {
                    r.property.clone()
                }
            })
            .collect()
    }

    /// Bind every mapped action token to `dispatch`.
    ///
    /// Tokens are `<kind><Name>` (e.g. `pushTodoItems`), plus `resetState`
    /// or `reset<Namespace>State` for the whole-slice reset, bound under
    /// `reset<Namespace>State`.
    pub fn apply(&self, dispatch: &Dispatch) -> StatecraftResult<IndexMap<String, BoundAction>> {
        let mut out = IndexMap::with_capacity(self.refs.len());
        for PropertyRef { namespace, property } in &self.refs {
            let slice = slice_for(self.states, namespace)?;
            let (key, creator) = bind_token(slice, namespace, property)?;
            out.insert(
                key,
                BoundAction {
                    creator: creator.clone(),
                    dispatch: dispatch.clone(),
                },
            );
        }
        Ok(out)
    }
}

fn bind_token<'s>(
    slice: &'s StateSlice,
    namespace: &str,
    token: &str,
) -> StatecraftResult<(String, &'s ActionCreator)> {
    let reset_key = format!("reset{}State", upper_first(namespace));
    if token == "resetState" || token == reset_key {
        let creator = slice
            .action(STATE_REF, ActionKind::Reset)
            .ok_or_else(|| StatecraftError::unknown_action(namespace, token))?;
        return Ok((reset_key, creator));
    }

    let (kind, name) = split_kind(token).ok_or_else(|| StatecraftError::MissingKind {
        state: namespace.to_owned(),
        action: token.to_owned(),
    })?;
    if slice.actions(&name).is_none() {
        return Err(StatecraftError::unknown_action(namespace, name));
    }
    let creator = slice
        .action(&name, kind)
        .ok_or_else(|| StatecraftError::unknown_action(namespace, token))?;
    Ok((token.to_owned(), creator))
}

/// Split `pushTodoItems` into `(Push, "todoItems")` using the longest kind
/// prefix that leaves a non-empty name.
pub(crate) fn split_kind(token: &str) -> Option<(ActionKind, String)> {
    ActionKind::ALL
        .into_iter()
        .filter(|kind| token.len() > kind.as_str().len() && token.starts_with(kind.as_str()))
        .max_by_key(|kind| kind.as_str().len())
        .map(|kind| (kind, lower_first(&token[kind.as_str().len()..])))
}
