//! Fluent cursors for editing nested JSON values.
//!
//! `statecraft-query` provides [`Query`], a navigable cursor over a
//! `serde_json::Value`. Cursors descend with `get`/`at`/`find`, edit with
//! array, object and scalar operations, and write every change back into the
//! shared root value.
//!
//! # Core Concepts
//!
//! - **Query**: cursor over a root value plus the path it was reached by
//! - **Path**: the recorded accessor chain (`users[0].name`)
//! - **Null short-circuit**: operations on a missing or `null` value are no-ops
//! - **Replay**: `group` records several edits as one action, `repeat` re-runs it
//!
//! # Quick Start
//!
//! ```
//! use statecraft_query::Query;
//! use serde_json::json;
//!
//! let mut q = Query::new(json!({"tags": ["a", "b", "a"], "meta": {"v": 1}}));
//!
//! q.get("tags").unwrap().uniq().unwrap().push([json!("c")]).unwrap();
//! q.get("meta").unwrap().merge([json!({"v": 2})]).unwrap();
//! q.get("missing.deeper").unwrap().set(json!(true)).unwrap(); // no-op
//!
//! assert_eq!(
//!     q.result(),
//!     json!({"tags": ["a", "b", "c"], "meta": {"v": 2}})
//! );
//! ```

mod access;
mod doc_cell;
mod error;
mod path;
mod query;

pub use access::{get_at_path, get_at_path_mut, set_at_path};
pub use error::{value_type_name, QueryError, QueryResult};
pub use path::{parse_path, resolve_accessor, Path, Seg};
pub use query::Query;

// Re-export serde_json::Value for convenience
pub use serde_json::Value;
