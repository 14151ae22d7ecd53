//! Parser for mapper specifications.
//!
//! Two forms are accepted:
//!
//! ```text
//! "counter: value doubled"                      // text form
//! {"counter": "value doubled", "list": ["items"]} // map form
//! ```
//!
//! The text form is split at its first colon; the property list is split on
//! runs of whitespace. Map values are a text list or an array of such lists.

use crate::{StatecraftError, StatecraftResult};
use indexmap::IndexMap;
use serde_json::Value;

/// Properties named for one namespace in the map form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpecEntry {
    Text(String),
    List(Vec<String>),
}

impl SpecEntry {
    fn joined(&self) -> String {
        match self {
            SpecEntry::Text(text) => text.clone(),
            SpecEntry::List(items) => items.join(" "),
        }
    }
}

impl From<&str> for SpecEntry {
    fn from(text: &str) -> Self {
        SpecEntry::Text(text.to_owned())
    }
}

impl From<String> for SpecEntry {
    fn from(text: String) -> Self {
        SpecEntry::Text(text)
    }
}

impl From<Vec<&str>> for SpecEntry {
    fn from(items: Vec<&str>) -> Self {
        SpecEntry::List(items.into_iter().map(str::to_owned).collect())
    }
}

impl From<Vec<String>> for SpecEntry {
    fn from(items: Vec<String>) -> Self {
        SpecEntry::List(items)
    }
}

/// A mapper specification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapperSpec {
    Text(String),
    Map(IndexMap<String, SpecEntry>),
}

impl From<&str> for MapperSpec {
    fn from(text: &str) -> Self {
        MapperSpec::Text(text.to_owned())
    }
}

impl From<String> for MapperSpec {
    fn from(text: String) -> Self {
        MapperSpec::Text(text)
    }
}

impl From<IndexMap<String, SpecEntry>> for MapperSpec {
    fn from(map: IndexMap<String, SpecEntry>) -> Self {
        MapperSpec::Map(map)
    }
}

impl<K, V> FromIterator<(K, V)> for MapperSpec
where
    K: Into<String>,
    V: Into<SpecEntry>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        MapperSpec::Map(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl TryFrom<&Value> for MapperSpec {
    type Error = StatecraftError;

    fn try_from(value: &Value) -> StatecraftResult<Self> {
        match value {
            Value::String(text) => Ok(MapperSpec::Text(text.clone())),
            Value::Object(map) => map
                .iter()
                .map(|(namespace, entry)| parse_entry(entry).map(|e| (namespace.clone(), e)))
                .collect::<StatecraftResult<IndexMap<_, _>>>()
                .map(MapperSpec::Map),
            other => Err(StatecraftError::invalid_spec(format!(
                "the props must be either a string or an object. Got \"{other}\""
            ))),
        }
    }
}

impl TryFrom<Value> for MapperSpec {
    type Error = StatecraftError;

    fn try_from(value: Value) -> StatecraftResult<Self> {
        MapperSpec::try_from(&value)
    }
}

fn parse_entry(entry: &Value) -> StatecraftResult<SpecEntry> {
    match entry {
        Value::String(text) => Ok(SpecEntry::Text(text.clone())),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(StatecraftError::invalid_spec(format!(
                    "the props in the arrays within an object must be a string. Got \"{other}\""
                ))),
            })
            .collect::<StatecraftResult<Vec<_>>>()
            .map(SpecEntry::List),
        other => Err(StatecraftError::invalid_spec(format!(
            "the props in an object must be either an array or a string. Got \"{other}\""
        ))),
    }
}

/// One resolved `(namespace, property)` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyRef {
    pub namespace: String,
    pub property: String,
}

/// Resolve `spec` into `(namespace, property)` pairs, in order.
pub fn resolve(spec: &MapperSpec) -> StatecraftResult<Vec<PropertyRef>> {
    resolve_scoped(spec, None)
}

/// Like [`resolve`], but a text spec without a colon is read as a property
/// list of `namespace`.
pub fn resolve_scoped(spec: &MapperSpec, namespace: Option<&str>) -> StatecraftResult<Vec<PropertyRef>> {
    match spec {
        MapperSpec::Text(text) => {
            let (ns, props) = split_text(text, namespace)?;
            Ok(refs(&ns, &props))
        }
        MapperSpec::Map(map) => {
            let mut out = Vec::new();
            for (ns, entry) in map {
                let ns = ns.trim();
                if ns.is_empty() {
                    return Err(StatecraftError::invalid_spec("namespace must not be empty"));
                }
                out.extend(refs(ns, &entry.joined()));
            }
            Ok(out)
        }
    }
}

fn split_text(text: &str, namespace: Option<&str>) -> StatecraftResult<(String, String)> {
    match (text.split_once(':'), namespace) {
        (Some((ns, props)), _) => {
            let ns = ns.trim();
            if ns.is_empty() {
                return Err(StatecraftError::invalid_spec(format!(
                    "missing namespace before ':' in \"{text}\""
                )));
            }
            Ok((ns.to_owned(), props.to_owned()))
        }
        (None, Some(ns)) => Ok((ns.to_owned(), text.to_owned())),
        (None, None) => Err(StatecraftError::invalid_spec(format!(
            "expected \"<namespace>: <props>\". Got \"{text}\""
        ))),
    }
}

fn refs(namespace: &str, props: &str) -> Vec<PropertyRef> {
    props
        .split_whitespace()
        .map(|property| PropertyRef {
            namespace: namespace.to_owned(),
            property: property.to_owned(),
        })
        .collect()
}

pub(crate) fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(refs: &[PropertyRef]) -> Vec<(&str, &str)> {
        refs.iter()
            .map(|r| (r.namespace.as_str(), r.property.as_str()))
            .collect()
    }

    #[test]
    fn text_form() {
        let refs = resolve(&"  counter :  value\t doubled  ".into()).unwrap();
        assert_eq!(pairs(&refs), [("counter", "value"), ("counter", "doubled")]);
    }

    #[test]
    fn text_form_splits_on_first_colon_only() {
        let refs = resolve(&"a: b:c".into()).unwrap();
        assert_eq!(pairs(&refs), [("a", "b:c")]);
    }

    #[test]
    fn text_form_requires_namespace() {
        assert!(matches!(
            resolve(&"value".into()),
            Err(StatecraftError::InvalidSpec { .. })
        ));
        assert!(resolve(&" : value".into()).is_err());
    }

    #[test]
    fn map_form_from_json() {
        let spec = MapperSpec::try_from(json!({"a": "setX", "b": ["setY", "incZ"]})).unwrap();
        let refs = resolve(&spec).unwrap();
        assert_eq!(pairs(&refs), [("a", "setX"), ("b", "setY"), ("b", "incZ")]);
    }

    #[test]
    fn map_form_rejects_bad_values() {
        let err = MapperSpec::try_from(json!({"a": 1})).unwrap_err();
        assert!(err.to_string().contains('1'));
        let err = MapperSpec::try_from(json!({"a": ["x", false]})).unwrap_err();
        assert!(err.to_string().contains("false"));
        assert!(MapperSpec::try_from(json!([1])).is_err());
    }

    #[test]
    fn scoped_text_uses_default_namespace() {
        let refs = resolve_scoped(&"x y".into(), Some("ns")).unwrap();
        assert_eq!(pairs(&refs), [("ns", "x"), ("ns", "y")]);
    }

    #[test]
    fn case_helpers() {
        assert_eq!(upper_first("counter"), "Counter");
        assert_eq!(lower_first("TodoItems"), "todoItems");
        assert_eq!(lower_first(""), "");
    }
}
