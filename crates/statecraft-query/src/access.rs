//! Path-based reads and writes on JSON values.

use crate::{Path, QueryError, QueryResult, Seg};
use serde_json::Value;

/// Get a reference to the value at `path`, if it exists.
pub fn get_at_path<'a>(doc: &'a Value, path: &Path) -> Option<&'a Value> {
    path.iter().try_fold(doc, |current, seg| match seg {
        Seg::Key(key) => current.get(key),
        Seg::Index(idx) => current.get(idx),
    })
}

/// Get a mutable reference to the value at `path`, if it exists.
pub fn get_at_path_mut<'a>(doc: &'a mut Value, path: &Path) -> Option<&'a mut Value> {
    path.iter().try_fold(doc, |current, seg| match seg {
        Seg::Key(key) => current.get_mut(key),
        Seg::Index(idx) => current.get_mut(*idx),
    })
}

/// Replace the value at `path`.
///
/// The parent of the last accessor must already exist: an object parent
/// gains or overwrites the key, an array parent must hold the index.
pub fn set_at_path(doc: &mut Value, path: &Path, value: Value) -> QueryResult<()> {
    let Some((last, parents)) = path.split_last() else {
        *doc = value;
        return Ok(());
    };

    let parent_path: Path = parents.iter().cloned().collect();
    let detached = || QueryError::DetachedPath { path: path.clone() };
    let parent = get_at_path_mut(doc, &parent_path).ok_or_else(detached)?;

    match (last, parent) {
        (Seg::Key(key), Value::Object(map)) => {
            map.insert(key.clone(), value);
            Ok(())
        }
        (Seg::Index(idx), Value::Array(arr)) if *idx < arr.len() => {
            arr[*idx] = value;
            Ok(())
        }
        (Seg::Index(idx), Value::Array(arr)) => Err(QueryError::IndexOutOfBounds {
            path: path.clone(),
            index: *idx,
            len: arr.len(),
        }),
        _ => Err(detached()),
    }
}
