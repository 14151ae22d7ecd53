//! Runtime shape checks for mutation targets and payloads.
//!
//! Every "is array / is plain object / is finite number / is callback" test
//! made by the mutation engine goes through [`ShapeCheck`].

use crate::action::{Predicate, QueryFn, Transform};
use crate::{ActionKind, Payload, StatecraftError, StatecraftResult};
use serde_json::{Map, Number, Value};
use statecraft_query::value_type_name;

/// Validation context for one mutation: which kind is applied to which prop.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ShapeCheck<'a> {
    pub prop: &'a str,
    pub kind: ActionKind,
}

impl<'a> ShapeCheck<'a> {
    pub fn new(prop: &'a str, kind: ActionKind) -> Self {
        Self { prop, kind }
    }

    fn fail(&self, expected: &'static str, found: &'static str) -> StatecraftError {
        StatecraftError::type_validation(self.prop, self.kind.as_str(), expected, found)
    }

    pub fn array<'v>(&self, current: &'v mut Value) -> StatecraftResult<&'v mut Vec<Value>> {
        match current {
            Value::Array(arr) => Ok(arr),
            other => Err(self.fail("array", value_type_name(other))),
        }
    }

    pub fn object<'v>(&self, current: &'v mut Value) -> StatecraftResult<&'v mut Map<String, Value>> {
        match current {
            Value::Object(map) => Ok(map),
            other => Err(self.fail("object", value_type_name(other))),
        }
    }

    pub fn number<'v>(&self, current: &'v Value) -> StatecraftResult<&'v Number> {
        match current {
            Value::Number(n) => Ok(n),
            other => Err(self.fail("number", value_type_name(other))),
        }
    }

    pub fn array_payload<'p>(&self, payload: &'p Payload) -> StatecraftResult<&'p Vec<Value>> {
        match payload {
            Payload::Value(Value::Array(arr)) => Ok(arr),
            other => Err(self.fail("array payload", other.shape_name())),
        }
    }

    pub fn object_payload<'p>(
        &self,
        payload: &'p Payload,
    ) -> StatecraftResult<&'p Map<String, Value>> {
        match payload {
            Payload::Value(Value::Object(map)) => Ok(map),
            other => Err(self.fail("object payload", other.shape_name())),
        }
    }

    pub fn number_payload<'p>(&self, payload: &'p Payload) -> StatecraftResult<&'p Number> {
        match payload {
            Payload::Value(Value::Number(n)) => Ok(n),
            other => Err(self.fail("number payload", other.shape_name())),
        }
    }

    pub fn predicate<'p>(&self, payload: &'p Payload) -> StatecraftResult<&'p Predicate> {
        match payload {
            Payload::Filter(f) => Ok(f),
            other => Err(self.fail("predicate function", other.shape_name())),
        }
    }

    pub fn transform<'p>(&self, payload: &'p Payload) -> StatecraftResult<&'p Transform> {
        match payload {
            Payload::Map(f) => Ok(f),
            other => Err(self.fail("map function", other.shape_name())),
        }
    }

    pub fn query<'p>(&self, payload: &'p Payload) -> StatecraftResult<&'p QueryFn> {
        match payload {
            Payload::Query(f) => Ok(f),
            other => Err(self.fail("query function", other.shape_name())),
        }
    }
}
