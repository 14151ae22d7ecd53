//! Selectors and their bound forms.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A pure derivation `(source, args) -> value`.
///
/// Slice selectors receive the slice value; global selectors receive the
/// whole host state.
pub type SelectorFn = Arc<dyn Fn(&Value, &[Value]) -> Value + Send + Sync>;

/// Wrap a closure as a [`SelectorFn`].
pub fn selector<F>(f: F) -> SelectorFn
where
    F: Fn(&Value, &[Value]) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A selector partially applied to the value it reads from.
#[derive(Clone)]
pub struct BoundSelector {
    selector: SelectorFn,
    source: Value,
}

impl BoundSelector {
    pub fn new(selector: SelectorFn, source: Value) -> Self {
        Self { selector, source }
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.selector)(&self.source, args)
    }
}

impl fmt::Debug for BoundSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundSelector")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// One entry produced by `map_state`.
#[derive(Clone, Debug)]
pub enum Mapped {
    Value(Value),
    Selector(BoundSelector),
}

impl Mapped {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Mapped::Value(v) => Some(v),
            Mapped::Selector(_) => None,
        }
    }

    pub fn as_selector(&self) -> Option<&BoundSelector> {
        match self {
            Mapped::Selector(s) => Some(s),
            Mapped::Value(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bound_selector_reads_its_source() {
        let total = selector(|state, args| {
            let base = state["items"].as_array().map_or(0, Vec::len) as i64;
            let extra = args.first().and_then(Value::as_i64).unwrap_or(0);
            json!(base + extra)
        });
        let bound = BoundSelector::new(total, json!({"items": [1, 2]}));
        assert_eq!(bound.call(&[]), json!(2));
        assert_eq!(bound.call(&[json!(3)]), json!(5));
    }
}
