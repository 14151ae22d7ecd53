//! Shared root document for a query session.
//!
//! Every cursor derived from the same [`Query`](crate::Query) holds the same
//! `DocCell`, so a write through any cursor is visible from all of them.

use serde_json::Value;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub(crate) struct DocCell(Mutex<Value>);

impl DocCell {
    pub(crate) fn new(value: Value) -> Self {
        Self(Mutex::new(value))
    }

    /// Lock the document. A poisoned lock still yields the value; cursors
    /// never leave the document half-written across a panic boundary.
    #[inline]
    pub(crate) fn lock(&self) -> MutexGuard<'_, Value> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn snapshot(&self) -> Value {
        self.lock().clone()
    }
}

impl std::fmt::Debug for DocCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DocCell").field(&*self.lock()).finish()
    }
}
