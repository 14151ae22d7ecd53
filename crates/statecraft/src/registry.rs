//! Explicit registry of slices and global selectors.
//!
//! A registry replaces process-wide state: it is created by the caller,
//! passed to [`CombinedStates::new`](crate::CombinedStates::new), and can be
//! cleared between tests.

use crate::selector::SelectorFn;
use crate::{StateSlice, StatecraftError, StatecraftResult};
use indexmap::IndexMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct RegistryInner {
    slices: IndexMap<String, Arc<StateSlice>>,
    selectors: IndexMap<String, SelectorFn>,
}

/// Shared handle to registered slices and global selectors.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<RwLock<RegistryInner>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a slice under its namespace.
    pub fn register_slice(&self, slice: StateSlice) -> StatecraftResult<Arc<StateSlice>> {
        let mut inner = self.write();
        if inner.slices.contains_key(slice.name()) {
            return Err(StatecraftError::DuplicateState {
                name: slice.name().to_owned(),
            });
        }
        let slice = Arc::new(slice);
        inner
            .slices
            .insert(slice.name().to_owned(), Arc::clone(&slice));
        Ok(slice)
    }

    /// Register a selector over the whole host state. A later registration
    /// under the same name replaces the earlier one.
    pub fn register_selector(&self, name: impl Into<String>, selector: SelectorFn) {
        self.write().selectors.insert(name.into(), selector);
    }

    pub fn slice(&self, namespace: &str) -> Option<Arc<StateSlice>> {
        self.read().slices.get(namespace).cloned()
    }

    pub fn slices(&self) -> Vec<Arc<StateSlice>> {
        self.read().slices.values().cloned().collect()
    }

    pub fn selector(&self, name: &str) -> Option<SelectorFn> {
        self.read().selectors.get(name).cloned()
    }

    /// Drop every registered slice and selector.
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.slices.clear();
        inner.selectors.clear();
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.read();
        f.debug_struct("Registry")
            .field("slices", &inner.slices.keys().collect::<Vec<_>>())
            .field("selectors", &inner.selectors.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Run `f` with a fresh registry that is cleared afterwards.
pub fn with_registry<R>(f: impl FnOnce(&Registry) -> R) -> R {
    let registry = Registry::new();
    let out = f(&registry);
    registry.clear();
    out
}
