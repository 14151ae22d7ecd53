//! The mutation engine: routes an action to its property and applies the
//! kind-specific mutation on a cloned draft.
//!
//! ```text
//! State' = reduce(State, Action)
//! ```
//!
//! - `reduce` never mutates its input; every call works on a fresh clone
//! - reducer conditions are scanned in declaration order, first match wins
//! - a failed validation returns an error and no partial state

use crate::action::STATE_REF;
use crate::shape::ShapeCheck;
use crate::{ActionKind, ActionObject, Payload, StatecraftError, StatecraftResult};
use serde_json::{Number, Value};
use statecraft_query::{value_type_name, Query};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// A pure reducer over one slice value. `None` stands for "no state yet" and
/// yields the pristine initial value.
pub type Reducer =
    Arc<dyn Fn(Option<&Value>, &ActionObject) -> StatecraftResult<Value> + Send + Sync>;

/// Routes one dispatch type to one property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReducerCondition {
    pub action_type: String,
    pub prop: String,
    pub kind: ActionKind,
}

/// Everything a kind handler needs to mutate one property slot.
struct Mutation<'a> {
    check: ShapeCheck<'a>,
    payload: &'a Payload,
    pristine: &'a Value,
    strict: Option<&'static str>,
}

type Handler = fn(&Mutation<'_>, &mut Value) -> StatecraftResult<()>;

/// One handler per kind.
fn handler(kind: ActionKind) -> Handler {
    match kind {
        ActionKind::Set => apply_set,
        ActionKind::Reset => apply_reset,
        ActionKind::Trigger => apply_trigger,
        ActionKind::Query => apply_query,
        ActionKind::Push => apply_push,
        ActionKind::Pop => apply_pop,
        ActionKind::Shift => apply_shift,
        ActionKind::Unshift => apply_unshift,
        ActionKind::Concat => apply_concat,
        ActionKind::Filter => apply_filter,
        ActionKind::Map => apply_map,
        ActionKind::Merge => apply_merge,
        ActionKind::Inc | ActionKind::Dec => apply_arithmetic,
    }
}

/// Applies validated mutations to one slice's value map.
#[derive(Clone, Debug)]
pub struct MutationEngine {
    namespace: String,
    initial: Value,
    conditions: Vec<ReducerCondition>,
    strict: Option<HashMap<String, &'static str>>,
}

impl MutationEngine {
    pub fn new(namespace: impl Into<String>, initial: Value) -> Self {
        Self {
            namespace: namespace.into(),
            initial,
            conditions: Vec::new(),
            strict: None,
        }
    }

    /// Record each property's type from the initial value and enforce it on
    /// every `set`-style write. Properties that start out `null` stay untyped.
    pub fn with_strict_typing(mut self) -> Self {
        let model = self
            .initial
            .as_object()
            .into_iter()
            .flatten()
            .filter(|(_, v)| !v.is_null())
            .map(|(k, v)| (k.clone(), value_type_name(v)))
            .collect();
        self.strict = Some(model);
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn initial(&self) -> &Value {
        &self.initial
    }

    pub fn conditions(&self) -> &[ReducerCondition] {
        &self.conditions
    }

    pub(crate) fn push_condition(&mut self, condition: ReducerCondition) {
        self.conditions.push(condition);
    }

    /// Reduce `state` by `action`.
    ///
    /// Actions addressed to another namespace, or matching no condition,
    /// return an unchanged clone.
    pub fn reduce(&self, state: Option<&Value>, action: &ActionObject) -> StatecraftResult<Value> {
        let current = state.unwrap_or(&self.initial);
        if action.state != self.namespace {
            return Ok(current.clone());
        }
        match self.condition_for(&action.action_type) {
            Some(condition) => self.apply(current, action, &condition.prop),
            None => {
                trace!(state = %self.namespace, action_type = %action.action_type, "no reducer condition");
                Ok(current.clone())
            }
        }
    }

    /// Apply `action` to `prop` of a clone of `state`.
    ///
    /// The first condition whose type equals the action's type decides the
    /// kind; without one the clone is returned unchanged.
    pub fn apply(&self, state: &Value, action: &ActionObject, prop: &str) -> StatecraftResult<Value> {
        let mut draft = state.clone();
        let Some(condition) = self.condition_for(&action.action_type) else {
            return Ok(draft);
        };
        if prop == STATE_REF {
            return Ok(self.initial.clone());
        }
        if condition.kind == ActionKind::Trigger {
            return Ok(draft);
        }

        let check = ShapeCheck::new(prop, condition.kind);
        let slots = match &mut draft {
            Value::Object(map) => map,
            other => {
                return Err(StatecraftError::type_validation(
                    &self.namespace,
                    condition.kind.as_str(),
                    "object state",
                    value_type_name(other),
                ))
            }
        };
        let mutation = Mutation {
            check,
            payload: &action.payload,
            pristine: self.initial.get(prop).unwrap_or(&Value::Null),
            strict: self.strict.as_ref().and_then(|model| model.get(prop).copied()),
        };
        let slot = slots.entry(prop.to_owned()).or_insert(Value::Null);
        handler(condition.kind)(&mutation, slot)?;
        Ok(draft)
    }

    fn condition_for(&self, action_type: &str) -> Option<&ReducerCondition> {
        self.conditions.iter().find(|c| c.action_type == action_type)
    }
}

impl Mutation<'_> {
    fn enforce_strict(&self, value: &Value) -> StatecraftResult<()> {
        match self.strict {
            Some(expected) if expected != value_type_name(value) => Err(StatecraftError::StrictType {
                prop: self.check.prop.to_owned(),
                expected,
                found: value_type_name(value),
            }),
            _ => Ok(()),
        }
    }
}

fn apply_set(m: &Mutation<'_>, slot: &mut Value) -> StatecraftResult<()> {
    let next = m.payload.to_value();
    m.enforce_strict(&next)?;
    *slot = next;
    Ok(())
}

fn apply_reset(m: &Mutation<'_>, slot: &mut Value) -> StatecraftResult<()> {
    *slot = m.pristine.clone();
    Ok(())
}

fn apply_trigger(_: &Mutation<'_>, _: &mut Value) -> StatecraftResult<()> {
    Ok(())
}

fn apply_query(m: &Mutation<'_>, slot: &mut Value) -> StatecraftResult<()> {
    let callback = m.check.query(m.payload)?;
    let mut query = Query::new(slot.clone());
    callback(&mut query)?;
    let next = query.result();
    m.enforce_strict(&next)?;
    *slot = next;
    Ok(())
}

fn apply_push(m: &Mutation<'_>, slot: &mut Value) -> StatecraftResult<()> {
    m.check.array(slot)?.push(m.payload.to_value());
    Ok(())
}

fn apply_pop(m: &Mutation<'_>, slot: &mut Value) -> StatecraftResult<()> {
    m.check.array(slot)?.pop();
    Ok(())
}

fn apply_shift(m: &Mutation<'_>, slot: &mut Value) -> StatecraftResult<()> {
    let arr = m.check.array(slot)?;
    if !arr.is_empty() {
        arr.remove(0);
    }
    Ok(())
}

fn apply_unshift(m: &Mutation<'_>, slot: &mut Value) -> StatecraftResult<()> {
    m.check.array(slot)?.insert(0, m.payload.to_value());
    Ok(())
}

fn apply_concat(m: &Mutation<'_>, slot: &mut Value) -> StatecraftResult<()> {
    let arr = m.check.array(slot)?;
    let tail = m.check.array_payload(m.payload)?;
    arr.extend(tail.iter().cloned());
    Ok(())
}

fn apply_filter(m: &Mutation<'_>, slot: &mut Value) -> StatecraftResult<()> {
    let arr = m.check.array(slot)?;
    let predicate = m.check.predicate(m.payload)?;
    let mut index = 0;
    arr.retain(|item| {
        let keep = predicate(item, index);
        index += 1;
        keep
    });
    Ok(())
}

fn apply_map(m: &Mutation<'_>, slot: &mut Value) -> StatecraftResult<()> {
    let arr = m.check.array(slot)?;
    let transform = m.check.transform(m.payload)?;
    let mapped = arr.iter().enumerate().map(|(i, v)| transform(v, i)).collect();
    *arr = mapped;
    Ok(())
}

fn apply_merge(m: &Mutation<'_>, slot: &mut Value) -> StatecraftResult<()> {
    let target = m.check.object(slot)?;
    let source = m.check.object_payload(m.payload)?;
    for (k, v) in source {
        target.insert(k.clone(), v.clone());
    }
    Ok(())
}

fn apply_arithmetic(m: &Mutation<'_>, slot: &mut Value) -> StatecraftResult<()> {
    let current = m.check.number(slot)?;
    let delta = m.check.number_payload(m.payload)?;
    let next = arithmetic(m, current, delta)?;
    *slot = next;
    Ok(())
}

fn arithmetic(m: &Mutation<'_>, current: &Number, delta: &Number) -> StatecraftResult<Value> {
    let subtract = m.check.kind == ActionKind::Dec;
    let overflow = || StatecraftError::Arithmetic {
        prop: m.check.prop.to_owned(),
        kind: m.check.kind.as_str(),
    };

    // Integers span i64 and u64, so they are combined as i128.
    if let (Some(a), Some(b)) = (as_integer(current), as_integer(delta)) {
        let result = if subtract { a - b } else { a + b };
        return i64::try_from(result)
            .map(Value::from)
            .or_else(|_| u64::try_from(result).map(Value::from))
            .map_err(|_| overflow());
    }

    let (a, b) = current.as_f64().zip(delta.as_f64()).ok_or_else(overflow)?;
    let result = if subtract { a - b } else { a + b };
    Number::from_f64(result).map(Value::Number).ok_or_else(overflow)
}

fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}
