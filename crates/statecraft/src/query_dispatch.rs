//! Fluent builder for `map_dispatch` specifications.
//!
//! ```
//! use statecraft::{ActionKind, CombinedStates, Registry, StateSlice};
//! use serde_json::json;
//!
//! let todos = StateSlice::new("todos", json!({"items": [], "filter": "all"}))
//!     .unwrap()
//!     .create_actions([
//!         ("items", vec![ActionKind::Push, ActionKind::Filter]),
//!         ("filter", vec![ActionKind::Set]),
//!     ])
//!     .unwrap();
//! let states = CombinedStates::new([todos], &Registry::new()).unwrap();
//!
//! let mut query = states.query_dispatch();
//! query
//!     .set("todos: filter").unwrap()
//!     .state("todos", |q| {
//!         q.all("items")?;
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let names: Vec<String> = query.results().unwrap().names();
//! assert_eq!(names, ["setFilter", "pushItems", "filterItems"]);
//! ```

use crate::mapper::MapDispatch;
use crate::resolver::{resolve_scoped, upper_first, MapperSpec, SpecEntry};
use crate::{ActionKind, CombinedStates, Kinds, StatecraftError, StatecraftResult};
use indexmap::IndexMap;

/// Accumulates `namespace -> action tokens` and compiles them through
/// `map_dispatch`.
#[derive(Debug)]
pub struct QueryDispatch<'a> {
    states: &'a CombinedStates,
    namespace: Option<String>,
    tokens: IndexMap<String, Vec<String>>,
}

impl<'a> QueryDispatch<'a> {
    pub(crate) fn new(states: &'a CombinedStates) -> Self {
        Self {
            states,
            namespace: None,
            tokens: IndexMap::new(),
        }
    }

    fn scoped(states: &'a CombinedStates, namespace: String) -> Self {
        Self {
            states,
            namespace: Some(namespace),
            tokens: IndexMap::new(),
        }
    }

    fn add(&mut self, spec: &MapperSpec, prefix: Option<ActionKind>) -> StatecraftResult<&mut Self> {
        for r in resolve_scoped(spec, self.namespace.as_deref())? {
            let token = match prefix {
                Some(kind) => format!("{kind}{}", upper_first(&r.property)),
                None => r.property,
            };
            self.tokens.entry(r.namespace).or_default().push(token);
        }
        Ok(self)
    }

    /// Add `kind`-prefixed tokens for each property of `spec`.
    pub fn kind(&mut self, kind: ActionKind, spec: impl Into<MapperSpec>) -> StatecraftResult<&mut Self> {
        self.add(&spec.into(), Some(kind))
    }

    pub fn set(&mut self, spec: impl Into<MapperSpec>) -> StatecraftResult<&mut Self> {
        self.kind(ActionKind::Set, spec)
    }

    pub fn reset(&mut self, spec: impl Into<MapperSpec>) -> StatecraftResult<&mut Self> {
        self.kind(ActionKind::Reset, spec)
    }

    pub fn trigger(&mut self, spec: impl Into<MapperSpec>) -> StatecraftResult<&mut Self> {
        self.kind(ActionKind::Trigger, spec)
    }

    pub fn query(&mut self, spec: impl Into<MapperSpec>) -> StatecraftResult<&mut Self> {
        self.kind(ActionKind::Query, spec)
    }

    pub fn push(&mut self, spec: impl Into<MapperSpec>) -> StatecraftResult<&mut Self> {
        self.kind(ActionKind::Push, spec)
    }

    pub fn pop(&mut self, spec: impl Into<MapperSpec>) -> StatecraftResult<&mut Self> {
        self.kind(ActionKind::Pop, spec)
    }

    pub fn shift(&mut self, spec: impl Into<MapperSpec>) -> StatecraftResult<&mut Self> {
        self.kind(ActionKind::Shift, spec)
    }

    pub fn unshift(&mut self, spec: impl Into<MapperSpec>) -> StatecraftResult<&mut Self> {
        self.kind(ActionKind::Unshift, spec)
    }

    pub fn concat(&mut self, spec: impl Into<MapperSpec>) -> StatecraftResult<&mut Self> {
        self.kind(ActionKind::Concat, spec)
    }

    pub fn filter(&mut self, spec: impl Into<MapperSpec>) -> StatecraftResult<&mut Self> {
        self.kind(ActionKind::Filter, spec)
    }

    pub fn map(&mut self, spec: impl Into<MapperSpec>) -> StatecraftResult<&mut Self> {
        self.kind(ActionKind::Map, spec)
    }

    pub fn merge(&mut self, spec: impl Into<MapperSpec>) -> StatecraftResult<&mut Self> {
        self.kind(ActionKind::Merge, spec)
    }

    pub fn inc(&mut self, spec: impl Into<MapperSpec>) -> StatecraftResult<&mut Self> {
        self.kind(ActionKind::Inc, spec)
    }

    pub fn dec(&mut self, spec: impl Into<MapperSpec>) -> StatecraftResult<&mut Self> {
        self.kind(ActionKind::Dec, spec)
    }

    /// Add tokens verbatim, e.g. `"todos: pushItems resetState"`.
    pub fn dispatch(&mut self, spec: impl Into<MapperSpec>) -> StatecraftResult<&mut Self> {
        self.add(&spec.into(), None)
    }

    /// Add one token per kind in `kinds` for each property of `spec`.
    pub fn action(&mut self, spec: impl Into<MapperSpec>, kinds: impl Into<Kinds>) -> StatecraftResult<&mut Self> {
        let spec = spec.into();
        for &kind in kinds.into().as_slice() {
            self.add(&spec, Some(kind))?;
        }
        Ok(self)
    }

    /// Add a token for every kind declared on each property of `spec`.
    pub fn all(&mut self, spec: impl Into<MapperSpec>) -> StatecraftResult<&mut Self> {
        for r in resolve_scoped(&spec.into(), self.namespace.as_deref())? {
            let slice = self
                .states
                .slice(&r.namespace)
                .ok_or_else(|| StatecraftError::unknown_state(&r.namespace))?;
            let kinds = slice
                .action_kinds(&r.property)
                .ok_or_else(|| StatecraftError::unknown_action(&r.namespace, &r.property))?;
            let tokens = self.tokens.entry(r.namespace.clone()).or_default();
            tokens.extend(
                kinds
                    .into_iter()
                    .map(|kind| format!("{kind}{}", upper_first(&r.property))),
            );
        }
        Ok(self)
    }

    /// Build tokens for `namespace` without repeating it in each spec.
    pub fn state<F>(&mut self, namespace: impl Into<String>, callback: F) -> StatecraftResult<&mut Self>
    where
        F: FnOnce(&mut QueryDispatch<'a>) -> StatecraftResult<()>,
    {
        let namespace = namespace.into();
        let mut scoped = QueryDispatch::scoped(self.states, namespace.clone());
        callback(&mut scoped)?;
        for (ns, tokens) in scoped.tokens {
            self.tokens.entry(ns).or_default().extend(tokens);
        }
        self.tokens.entry(namespace).or_default();
        Ok(self)
    }

    /// The accumulated specification.
    pub fn spec(&self) -> MapperSpec {
        self.tokens
            .iter()
            .map(|(ns, tokens)| (ns.clone(), SpecEntry::List(tokens.clone())))
            .collect()
    }

    /// Compile the accumulated specification through `map_dispatch`.
    pub fn results(&self) -> StatecraftResult<MapDispatch<'a>> {
        self.states.map_dispatch(self.spec())
    }
}
