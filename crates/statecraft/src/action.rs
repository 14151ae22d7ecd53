//! Action objects, payloads and the dispatch primitive.

use crate::{ActionKind, StatecraftResult};
use heck::ToShoutySnakeCase;
use serde::{Serialize, Serializer};
use serde_json::Value;
use statecraft_query::{value_type_name, Query, QueryResult};
use std::fmt;
use std::sync::Arc;

/// Declaration-time key standing for the whole slice.
pub const STATE_REF: &str = "__STATE__";

/// Suffix appended to a namespace to form its combined-state key.
pub const SUFFIX: &str = "Reducer";

pub type Predicate = Arc<dyn Fn(&Value, usize) -> bool + Send + Sync>;
pub type Transform = Arc<dyn Fn(&Value, usize) -> Value + Send + Sync>;

/// Callback of a `query` action. It receives a cursor seeded with the
/// property value; the cursor's root result becomes the new value.
pub type QueryFn = Arc<dyn Fn(&mut Query) -> QueryResult<()> + Send + Sync>;

/// What an action carries to the reducer.
#[derive(Clone, Default)]
pub enum Payload {
    #[default]
    None,
    Value(Value),
    Filter(Predicate),
    Map(Transform),
    Query(QueryFn),
}

impl Payload {
    pub fn filter<F>(f: F) -> Self
    where
        F: Fn(&Value, usize) -> bool + Send + Sync + 'static,
    {
        Payload::Filter(Arc::new(f))
    }

    pub fn map<F>(f: F) -> Self
    where
        F: Fn(&Value, usize) -> Value + Send + Sync + 'static,
    {
        Payload::Map(Arc::new(f))
    }

    pub fn query<F>(f: F) -> Self
    where
        F: Fn(&mut Query) -> QueryResult<()> + Send + Sync + 'static,
    {
        Payload::Query(Arc::new(f))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Payload::Value(v) => Some(v),
            _ => None,
        }
    }

    /// The value to store for value-carrying kinds; `null` otherwise.
    pub fn to_value(&self) -> Value {
        self.as_value().cloned().unwrap_or(Value::Null)
    }

    /// Shape name used in validation messages.
    pub fn shape_name(&self) -> &'static str {
        match self {
            Payload::None => "nothing",
            Payload::Value(v) => value_type_name(v),
            Payload::Filter(_) | Payload::Map(_) | Payload::Query(_) => "function",
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Value(value)
    }
}

impl From<Option<Value>> for Payload {
    fn from(value: Option<Value>) -> Self {
        value.map_or(Payload::None, Payload::Value)
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::None => f.write_str("None"),
            Payload::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Payload::Filter(_) => f.write_str("Filter(<fn>)"),
            Payload::Map(_) => f.write_str("Map(<fn>)"),
            Payload::Query(_) => f.write_str("Query(<fn>)"),
        }
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Payload::None => serializer.serialize_none(),
            Payload::Value(v) => v.serialize(serializer),
            _ => serializer.serialize_str("[function]"),
        }
    }
}

/// The object dispatched to the host store.
#[derive(Clone, Debug, Serialize)]
pub struct ActionObject {
    #[serde(rename = "type")]
    pub action_type: String,
    pub payload: Payload,
    pub kind: ActionKind,
    pub prop: String,
    pub state: String,
}

/// `UPPER(kind)_UPPER(snake(prop))`, e.g. `PUSH_TODO_ITEMS`.
///
/// Digits form their own word: `field1` gives `SET_FIELD_1`.
pub fn dispatch_type(kind: ActionKind, prop: &str) -> String {
    format!(
        "{}_{}",
        kind.as_str().to_uppercase(),
        split_digits(prop).to_shouty_snake_case()
    )
}

/// Insert `_` wherever a letter meets a digit, in either order.
fn split_digits(prop: &str) -> String {
    let mut out = String::with_capacity(prop.len() + 4);
    let mut prev: Option<char> = None;
    for c in prop.chars() {
        if let Some(p) = prev {
            let boundary = (p.is_ascii_alphabetic() && c.is_ascii_digit())
                || (p.is_ascii_digit() && c.is_ascii_alphabetic());
            if boundary {
                out.push('_');
            }
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// Type of the whole-slice reset, e.g. `RESET_COUNTER_STATE`.
pub fn state_dispatch_type(namespace: &str) -> String {
    format!("RESET_{}_STATE", namespace.to_uppercase())
}

type Sink = dyn Fn(ActionObject) -> StatecraftResult<()> + Send + Sync;
type StateReader = dyn Fn() -> Value + Send + Sync;

/// Handle to the host store: `dispatch(action)` and an optional state reader.
///
/// This is what action creators dispatch through and what middleware
/// handlers receive as their store reference.
#[derive(Clone)]
pub struct Dispatch {
    sink: Arc<Sink>,
    state: Option<Arc<StateReader>>,
}

impl Dispatch {
    pub fn new<F>(sink: F) -> Self
    where
        F: Fn(ActionObject) -> StatecraftResult<()> + Send + Sync + 'static,
    {
        Self {
            sink: Arc::new(sink),
            state: None,
        }
    }

    pub fn with_state<F>(mut self, reader: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.state = Some(Arc::new(reader));
        self
    }

    pub fn dispatch(&self, action: ActionObject) -> StatecraftResult<()> {
        (self.sink)(action)
    }

    /// Current host state, or `null` when the handle has no reader.
    pub fn state(&self) -> Value {
        self.state.as_ref().map_or(Value::Null, |read| read())
    }
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("has_state", &self.state.is_some())
            .finish()
    }
}
