//! The closed vocabulary of mutation kinds.

use crate::{StatecraftError, StatecraftResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Token selecting every kind when registering a middleware.
pub const WILDCARD: &str = "*";

/// A mutation kind an action may carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Set,
    Reset,
    Trigger,
    Query,
    Push,
    Pop,
    Shift,
    Unshift,
    Concat,
    Filter,
    Map,
    Merge,
    Inc,
    Dec,
}

/// Value shape a kind operates on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KindFamily {
    /// Legal for any value.
    General,
    Array,
    Object,
    Number,
}

impl ActionKind {
    pub const ALL: [ActionKind; 14] = [
        ActionKind::Set,
        ActionKind::Reset,
        ActionKind::Trigger,
        ActionKind::Query,
        ActionKind::Push,
        ActionKind::Pop,
        ActionKind::Shift,
        ActionKind::Unshift,
        ActionKind::Concat,
        ActionKind::Filter,
        ActionKind::Map,
        ActionKind::Merge,
        ActionKind::Inc,
        ActionKind::Dec,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Set => "set",
            ActionKind::Reset => "reset",
            ActionKind::Trigger => "trigger",
            ActionKind::Query => "query",
            ActionKind::Push => "push",
            ActionKind::Pop => "pop",
            ActionKind::Shift => "shift",
            ActionKind::Unshift => "unshift",
            ActionKind::Concat => "concat",
            ActionKind::Filter => "filter",
            ActionKind::Map => "map",
            ActionKind::Merge => "merge",
            ActionKind::Inc => "inc",
            ActionKind::Dec => "dec",
        }
    }

    pub fn family(self) -> KindFamily {
        match self {
            ActionKind::Set | ActionKind::Reset | ActionKind::Trigger | ActionKind::Query => {
                KindFamily::General
            }
            ActionKind::Push
            | ActionKind::Pop
            | ActionKind::Shift
            | ActionKind::Unshift
            | ActionKind::Concat
            | ActionKind::Filter
            | ActionKind::Map => KindFamily::Array,
            ActionKind::Merge => KindFamily::Object,
            ActionKind::Inc | ActionKind::Dec => KindFamily::Number,
        }
    }

    /// Kinds whose payload is a callback rather than a value.
    pub fn takes_callback(self) -> bool {
        matches!(self, ActionKind::Filter | ActionKind::Map | ActionKind::Query)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = StatecraftError;

    fn from_str(s: &str) -> StatecraftResult<Self> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| StatecraftError::unknown_kind(s))
    }
}

/// Kind selector of a middleware: one kind, or every kind (`*`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KindSelector {
    Exact(ActionKind),
    Any,
}

impl KindSelector {
    pub fn matches(self, kind: ActionKind) -> bool {
        match self {
            KindSelector::Exact(k) => k == kind,
            KindSelector::Any => true,
        }
    }
}

impl From<ActionKind> for KindSelector {
    fn from(kind: ActionKind) -> Self {
        KindSelector::Exact(kind)
    }
}

impl FromStr for KindSelector {
    type Err = StatecraftError;

    fn from_str(s: &str) -> StatecraftResult<Self> {
        if s == WILDCARD {
            Ok(KindSelector::Any)
        } else {
            s.parse().map(KindSelector::Exact)
        }
    }
}

impl fmt::Display for KindSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KindSelector::Exact(kind) => kind.fmt(f),
            KindSelector::Any => f.write_str(WILDCARD),
        }
    }
}

/// The kinds declared for one action: a single kind or a list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Kinds(Vec<ActionKind>);

impl Kinds {
    pub fn as_slice(&self) -> &[ActionKind] {
        &self.0
    }

    pub fn contains(&self, kind: ActionKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ActionKind> for Kinds {
    fn from(kind: ActionKind) -> Self {
        Kinds(vec![kind])
    }
}

impl From<Vec<ActionKind>> for Kinds {
    fn from(kinds: Vec<ActionKind>) -> Self {
        Kinds(kinds)
    }
}

impl<const N: usize> From<[ActionKind; N]> for Kinds {
    fn from(kinds: [ActionKind; N]) -> Self {
        Kinds(kinds.to_vec())
    }
}

impl FromIterator<ActionKind> for Kinds {
    fn from_iter<I: IntoIterator<Item = ActionKind>>(iter: I) -> Self {
        Kinds(iter.into_iter().collect())
    }
}

/// Parse `"set"` or `["set", "reset"]`.
impl TryFrom<&Value> for Kinds {
    type Error = StatecraftError;

    fn try_from(value: &Value) -> StatecraftResult<Self> {
        let parse_one = |v: &Value| match v {
            Value::String(s) => s.parse::<ActionKind>(),
            other => Err(StatecraftError::invalid_spec(format!(
                "the kind of the actions must be a string. Got \"{other}\""
            ))),
        };
        match value {
            Value::Array(items) => items.iter().map(parse_one).collect(),
            Value::String(_) => parse_one(value).map(Kinds::from),
            other => Err(StatecraftError::invalid_spec(format!(
                "the kind of action must be a string or an array. Got \"{other}\""
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_kind() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_names_the_value() {
        let err = "explode".parse::<ActionKind>().unwrap_err();
        assert!(err.to_string().contains("explode"));
    }

    #[test]
    fn families() {
        assert_eq!(ActionKind::Query.family(), KindFamily::General);
        assert_eq!(ActionKind::Concat.family(), KindFamily::Array);
        assert_eq!(ActionKind::Merge.family(), KindFamily::Object);
        assert_eq!(ActionKind::Dec.family(), KindFamily::Number);
    }

    #[test]
    fn selector_wildcard() {
        let any: KindSelector = "*".parse().unwrap();
        assert!(any.matches(ActionKind::Pop));
        let set: KindSelector = "set".parse().unwrap();
        assert!(!set.matches(ActionKind::Pop));
        assert_eq!(any.to_string(), "*");
    }

    #[test]
    fn kinds_from_json() {
        use serde_json::json;

        let kinds = Kinds::try_from(&json!(["inc", "dec"])).unwrap();
        assert_eq!(kinds.as_slice(), &[ActionKind::Inc, ActionKind::Dec]);
        assert!(Kinds::try_from(&json!("set")).unwrap().contains(ActionKind::Set));

        let err = Kinds::try_from(&json!(["set", 4])).unwrap_err();
        assert!(matches!(err, StatecraftError::InvalidSpec { .. }));
        assert!(err.to_string().contains('4'));
        assert!(Kinds::try_from(&json!({"a": 1})).is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let kind: ActionKind = serde_json::from_str("\"unshift\"").unwrap();
        assert_eq!(kind, ActionKind::Unshift);
        assert_eq!(serde_json::to_string(&ActionKind::Inc).unwrap(), "\"inc\"");
    }
}
