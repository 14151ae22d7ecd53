//! The fluent query cursor.

use crate::access::{get_at_path, get_at_path_mut, set_at_path};
use crate::doc_cell::DocCell;
use crate::path::resolve_accessor;
use crate::{Path, QueryError, QueryResult};
use rand::Rng;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type Action = Arc<dyn Fn(&mut Query) -> QueryResult<()> + Send + Sync>;

/// A navigable, mutable cursor into a nested JSON value.
///
/// A cursor carries the root document it was derived from plus the path
/// leading from that root to its current value. Navigation (`get`, `at`,
/// `find`, `random`) yields a new cursor one level deeper; mutation writes
/// through the recorded path, so [`Query::result`] read from any cursor of
/// the session reflects every change.
///
/// When the current value is missing or `null`, every chained operation is a
/// no-op and navigation yields an empty cursor whose result is `null`.
///
/// ```
/// use statecraft_query::Query;
/// use serde_json::json;
///
/// let mut q = Query::new(json!({"todos": [{"id": 1, "done": false}]}));
/// q.get("todos").unwrap()
///     .find_by("id", json!(1), None).unwrap()
///     .merge([json!({"done": true})]).unwrap();
///
/// assert_eq!(q.result(), json!({"todos": [{"id": 1, "done": true}]}));
/// ```
#[derive(Clone)]
pub struct Query {
    doc: Option<Arc<DocCell>>,
    path: Path,
    last_action: Option<Action>,
    returned: Option<Value>,
}

impl Query {
    /// Start a session over `value`; the cursor points at the root.
    pub fn new(value: Value) -> Self {
        Self {
            doc: Some(Arc::new(DocCell::new(value))),
            path: Path::root(),
            last_action: None,
            returned: None,
        }
    }

    /// A cursor with no backing value. All operations on it are no-ops.
    pub fn empty() -> Self {
        Self {
            doc: None,
            path: Path::root(),
            last_action: None,
            returned: None,
        }
    }

    /// The whole root value, including every mutation made so far.
    /// `null` for an empty cursor.
    pub fn result(&self) -> Value {
        self.doc
            .as_ref()
            .map(|doc| doc.snapshot())
            .unwrap_or(Value::Null)
    }

    /// The value under the cursor, if any.
    pub fn value(&self) -> Option<Value> {
        self.peek(Value::clone)
    }

    /// Path from the root to the cursor.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Element produced by the last `pop`, `shift`, `splice` or `pull_at`.
    pub fn returned(&self) -> Option<&Value> {
        self.returned.as_ref()
    }

    /// True when the cursor has no backing value at all.
    pub fn is_empty(&self) -> bool {
        self.doc.is_none()
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Descend into `accessor` (dotted/bracket notation, e.g. `a.b[0]`).
    pub fn get(&mut self, accessor: &str) -> QueryResult<Query> {
        let accessor = accessor.to_owned();
        self.navigate(move |q| {
            let relative = q
                .peek(|v| resolve_accessor(v, &accessor))
                .unwrap_or_default();
            Ok(q.child(q.path.join(&relative)))
        })
    }

    /// Descend into the array element at `index`.
    ///
    /// Fails for a negative index or one past the end of the array. On a
    /// value that is not an array this yields an empty cursor.
    pub fn at(&mut self, index: i64) -> QueryResult<Query> {
        self.navigate(move |q| {
            let Some(len) = q.peek(|v| v.as_array().map(Vec::len)).flatten() else {
                return Ok(Query::empty());
            };
            let idx = usize::try_from(index).map_err(|_| QueryError::NegativeIndex {
                path: q.path.clone(),
                index,
            })?;
            if idx >= len {
                return Err(QueryError::IndexOutOfBounds {
                    path: q.path.clone(),
                    index: idx,
                    len,
                });
            }
            Ok(q.child(q.path.clone().index(idx)))
        })
    }

    /// Descend into the first array element matching `predicate`.
    ///
    /// Without a match, `default` is appended to the array and the cursor
    /// points at it; with no default this fails.
    pub fn find<P>(&mut self, predicate: P, default: Option<Value>) -> QueryResult<Query>
    where
        P: Fn(&Value, usize) -> bool + Send + Sync + 'static,
    {
        self.navigate(move |q| {
            let path = q.path.clone();
            let found = q.edit(|v| {
                let Value::Array(arr) = v else {
                    return Ok(None);
                };
                if let Some(i) = arr.iter().enumerate().position(|(i, item)| predicate(item, i)) {
                    return Ok(Some(i));
                }
                match &default {
                    Some(value) => {
                        arr.push(value.clone());
                        Ok(Some(arr.len() - 1))
                    }
                    None => Err(QueryError::NotFound { path: path.clone() }),
                }
            });
            match found.transpose()?.flatten() {
                Some(idx) => Ok(q.child(path.index(idx))),
                None => Ok(Query::empty()),
            }
        })
    }

    /// [`find`](Self::find) matching elements whose `accessor` equals `expected`.
    pub fn find_by(
        &mut self,
        accessor: &str,
        expected: Value,
        default: Option<Value>,
    ) -> QueryResult<Query> {
        self.find(key_matcher(accessor, expected), default)
    }

    /// Descend into a randomly chosen array element.
    pub fn random(&mut self) -> QueryResult<Query> {
        self.navigate(|q| match q.peek(|v| v.as_array().map(Vec::len)).flatten() {
            Some(len) if len > 0 => {
                let idx = rand::thread_rng().gen_range(0..len);
                Ok(q.child(q.path.clone().index(idx)))
            }
            _ => Ok(Query::empty()),
        })
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Replace the current value.
    pub fn set(&mut self, value: Value) -> QueryResult<&mut Self> {
        self.action(move |q| q.write(value.clone()))
    }

    /// Replace the current value with one computed from it.
    pub fn set_with<F>(&mut self, f: F) -> QueryResult<&mut Self>
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.action(move |q| match q.peek(|v| f(v)) {
            Some(next) => q.write(next),
            None => Ok(()),
        })
    }

    pub fn push<I>(&mut self, items: I) -> QueryResult<&mut Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let items: Vec<Value> = items.into_iter().collect();
        self.action(move |q| {
            q.edit_array(|arr| arr.extend(items.iter().cloned()));
            Ok(())
        })
    }

    pub fn unshift<I>(&mut self, items: I) -> QueryResult<&mut Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let items: Vec<Value> = items.into_iter().collect();
        self.action(move |q| {
            q.edit_array(|arr| {
                arr.splice(0..0, items.iter().cloned());
            });
            Ok(())
        })
    }

    /// Remove the last element and hand it to `callback` as a detached cursor.
    pub fn pop<F>(&mut self, callback: F) -> QueryResult<&mut Self>
    where
        F: Fn(&mut Query) -> QueryResult<()> + Send + Sync + 'static,
    {
        self.action(move |q| {
            let popped = q.edit(|v| v.as_array_mut().and_then(Vec::pop)).flatten();
            q.hand_off(popped, &callback)
        })
    }

    /// Remove the first element and hand it to `callback` as a detached cursor.
    pub fn shift<F>(&mut self, callback: F) -> QueryResult<&mut Self>
    where
        F: Fn(&mut Query) -> QueryResult<()> + Send + Sync + 'static,
    {
        self.action(move |q| {
            let shifted = q
                .edit(|v| match v.as_array_mut() {
                    Some(arr) if !arr.is_empty() => Some(arr.remove(0)),
                    _ => None,
                })
                .flatten();
            q.hand_off(shifted, &callback)
        })
    }

    /// Append `items`; array items are flattened one level.
    pub fn concat<I>(&mut self, items: I) -> QueryResult<&mut Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let items: Vec<Value> = items.into_iter().collect();
        self.action(move |q| {
            q.edit_array(|arr| {
                for item in &items {
                    match item {
                        Value::Array(inner) => arr.extend(inner.iter().cloned()),
                        other => arr.push(other.clone()),
                    }
                }
            });
            Ok(())
        })
    }

    pub fn map<F>(&mut self, f: F) -> QueryResult<&mut Self>
    where
        F: Fn(&Value, usize) -> Value + Send + Sync + 'static,
    {
        self.action(move |q| {
            q.edit_array(|arr| {
                let mapped = arr.iter().enumerate().map(|(i, v)| f(v, i)).collect();
                *arr = mapped;
            });
            Ok(())
        })
    }

    /// Replace each element by its value at `accessor` (`null` when missing).
    pub fn map_key(&mut self, accessor: &str) -> QueryResult<&mut Self> {
        let accessor = accessor.to_owned();
        self.map(move |item, _| {
            let path = resolve_accessor(item, &accessor);
            get_at_path(item, &path).cloned().unwrap_or(Value::Null)
        })
    }

    pub fn filter<P>(&mut self, predicate: P) -> QueryResult<&mut Self>
    where
        P: Fn(&Value, usize) -> bool + Send + Sync + 'static,
    {
        self.action(move |q| {
            q.edit_array(|arr| {
                let mut i = 0;
                arr.retain(|v| {
                    let keep = predicate(v, i);
                    i += 1;
                    keep
                });
            });
            Ok(())
        })
    }

    /// Keep the elements whose `accessor` equals `expected`.
    pub fn filter_by(&mut self, accessor: &str, expected: Value) -> QueryResult<&mut Self> {
        self.filter(key_matcher(accessor, expected))
    }

    /// Keep only the element at `index`.
    pub fn filter_index(&mut self, index: usize) -> QueryResult<&mut Self> {
        self.filter(move |_, i| i == index)
    }

    /// Remove `delete_count` elements from `start`, insert `items` there and
    /// keep the removed elements in [`returned`](Self::returned).
    pub fn splice<I>(&mut self, start: usize, delete_count: usize, items: I) -> QueryResult<&mut Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let items: Vec<Value> = items.into_iter().collect();
        self.action(move |q| {
            let removed = q
                .edit(|v| {
                    v.as_array_mut().map(|arr| {
                        let start = start.min(arr.len());
                        let end = start.saturating_add(delete_count).min(arr.len());
                        arr.splice(start..end, items.iter().cloned())
                            .collect::<Vec<_>>()
                    })
                })
                .flatten();
            q.returned = removed.map(Value::Array);
            Ok(())
        })
    }

    /// Keep the elements in `start..end` (`end` defaults to the array length).
    pub fn slice(&mut self, start: usize, end: Option<usize>) -> QueryResult<&mut Self> {
        self.action(move |q| {
            q.edit_array(|arr| {
                let end = end.unwrap_or(arr.len()).min(arr.len());
                let start = start.min(end);
                *arr = arr[start..end].to_vec();
            });
            Ok(())
        })
    }

    /// Remove elements matching `predicate`; `callback` receives a detached
    /// cursor over the removed elements.
    pub fn remove<P, F>(&mut self, predicate: P, callback: F) -> QueryResult<&mut Self>
    where
        P: Fn(&Value, usize) -> bool + Send + Sync + 'static,
        F: Fn(&mut Query) -> QueryResult<()> + Send + Sync + 'static,
    {
        self.action(move |q| {
            let removed = q
                .edit(|v| {
                    v.as_array_mut().map(|arr| {
                        let mut removed = Vec::new();
                        let mut kept = Vec::with_capacity(arr.len());
                        for (i, item) in arr.drain(..).enumerate() {
                            if predicate(&item, i) {
                                removed.push(item);
                            } else {
                                kept.push(item);
                            }
                        }
                        *arr = kept;
                        removed
                    })
                })
                .flatten();
            match removed {
                Some(removed) => callback(&mut Query::new(Value::Array(removed))),
                None => Ok(()),
            }
        })
    }

    /// Remove every element equal to one of `values`.
    pub fn pull<I>(&mut self, values: I) -> QueryResult<&mut Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let values: Vec<Value> = values.into_iter().collect();
        self.action(move |q| {
            q.edit_array(|arr| arr.retain(|item| !values.contains(item)));
            Ok(())
        })
    }

    /// Remove the elements at `indexes`, keeping them (in the order given)
    /// in [`returned`](Self::returned).
    pub fn pull_at<I>(&mut self, indexes: I) -> QueryResult<&mut Self>
    where
        I: IntoIterator<Item = usize>,
    {
        let indexes: Vec<usize> = indexes.into_iter().collect();
        self.action(move |q| {
            let removed = q
                .edit(|v| {
                    v.as_array_mut().map(|arr| {
                        let removed: Vec<Value> =
                            indexes.iter().filter_map(|&i| arr.get(i).cloned()).collect();
                        let mut doomed: Vec<usize> =
                            indexes.iter().copied().filter(|&i| i < arr.len()).collect();
                        doomed.sort_unstable();
                        doomed.dedup();
                        for i in doomed.into_iter().rev() {
                            arr.remove(i);
                        }
                        removed
                    })
                })
                .flatten();
            q.returned = removed.map(Value::Array);
            Ok(())
        })
    }

    /// Drop duplicate elements, keeping first occurrences.
    pub fn uniq(&mut self) -> QueryResult<&mut Self> {
        self.action(|q| {
            q.edit_array(|arr| {
                let mut seen: Vec<Value> = Vec::with_capacity(arr.len());
                arr.retain(|item| {
                    if seen.contains(item) {
                        false
                    } else {
                        seen.push(item.clone());
                        true
                    }
                });
            });
            Ok(())
        })
    }

    pub fn reverse(&mut self) -> QueryResult<&mut Self> {
        self.action(|q| {
            q.edit_array(|arr| arr.reverse());
            Ok(())
        })
    }

    /// Shallow-merge `objects` into the current object, later keys winning.
    pub fn merge<I>(&mut self, objects: I) -> QueryResult<&mut Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let objects: Vec<Value> = objects.into_iter().collect();
        self.action(move |q| {
            let path = q.path.clone();
            q.edit(|v| -> QueryResult<()> {
                let Value::Object(target) = v else {
                    return Ok(());
                };
                for source in &objects {
                    let Value::Object(source) = source else {
                        return Err(QueryError::type_mismatch(
                            path.clone(),
                            "object",
                            crate::value_type_name(source),
                        ));
                    };
                    for (k, val) in source {
                        target.insert(k.clone(), val.clone());
                    }
                }
                Ok(())
            })
            .transpose()
            .map(drop)
        })
    }

    /// Run several operations against this cursor as one recorded action.
    pub fn group<F>(&mut self, callback: F) -> QueryResult<&mut Self>
    where
        F: Fn(&mut Query) -> QueryResult<()> + Send + Sync + 'static,
    {
        self.action(callback)
    }

    /// Run the most recently recorded action again.
    pub fn repeat(&mut self) -> QueryResult<&mut Self> {
        if let Some(action) = self.last_action.clone() {
            if self.is_live() {
                action(&mut *self)?;
            }
            self.last_action = Some(action);
        }
        Ok(self)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn child(&self, path: Path) -> Query {
        Query {
            doc: self.doc.clone(),
            path,
            last_action: None,
            returned: None,
        }
    }

    fn is_live(&self) -> bool {
        self.peek(|_| ()).is_some()
    }

    /// Read the current value; `None` when it is missing or `null`.
    fn peek<R>(&self, f: impl FnOnce(&Value) -> R) -> Option<R> {
        let doc = self.doc.as_ref()?;
        let guard = doc.lock();
        get_at_path(&guard, &self.path)
            .filter(|v| !v.is_null())
            .map(f)
    }

    /// Mutate the current value in place; `None` when it is missing or `null`.
    fn edit<R>(&self, f: impl FnOnce(&mut Value) -> R) -> Option<R> {
        let doc = self.doc.as_ref()?;
        let mut guard = doc.lock();
        get_at_path_mut(&mut guard, &self.path)
            .filter(|v| !v.is_null())
            .map(f)
    }

    fn edit_array(&self, f: impl FnOnce(&mut Vec<Value>)) {
        self.edit(|v| {
            if let Value::Array(arr) = v {
                f(arr);
            }
        });
    }

    /// Write `value` back into the root at this cursor's path.
    fn write(&self, value: Value) -> QueryResult<()> {
        match &self.doc {
            Some(doc) => set_at_path(&mut doc.lock(), &self.path, value),
            None => Ok(()),
        }
    }

    fn hand_off<F>(&mut self, item: Option<Value>, callback: &F) -> QueryResult<()>
    where
        F: Fn(&mut Query) -> QueryResult<()>,
    {
        self.returned = item.clone();
        let mut detached = item.map(Query::new).unwrap_or_else(Query::empty);
        callback(&mut detached)
    }

    fn navigate<F>(&mut self, f: F) -> QueryResult<Query>
    where
        F: Fn(&Query) -> QueryResult<Query> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let replay = Arc::clone(&f);
        self.last_action = Some(Arc::new(move |q: &mut Query| replay(q).map(drop)));
        if !self.is_live() {
            return Ok(Query::empty());
        }
        f(&*self)
    }

    fn action<F>(&mut self, f: F) -> QueryResult<&mut Self>
    where
        F: Fn(&mut Query) -> QueryResult<()> + Send + Sync + 'static,
    {
        let action: Action = Arc::new(f);
        if self.is_live() {
            action(&mut *self)?;
        }
        // Nested actions run by a group must not replace the group itself.
        self.last_action = Some(action);
        Ok(self)
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("path", &self.path.to_string())
            .field("value", &self.value())
            .field("empty", &self.is_empty())
            .finish()
    }
}

fn key_matcher(
    accessor: &str,
    expected: Value,
) -> impl Fn(&Value, usize) -> bool + Send + Sync + 'static {
    let accessor = accessor.to_owned();
    move |item, _| {
        let path = resolve_accessor(item, &accessor);
        get_at_path(item, &path) == Some(&expected)
    }
}
