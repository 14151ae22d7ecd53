//! Access paths recorded by query cursors.
//!
//! A cursor remembers how it was reached from the root value so that
//! setter operations can be written back into the right position.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One step of an access path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Seg {
    /// Object member access.
    Key(String),
    /// Array element access.
    Index(usize),
}

impl Seg {
    /// Create a key segment.
    #[inline]
    pub fn key(k: impl Into<String>) -> Self {
        Seg::Key(k.into())
    }

    /// Create an index segment.
    #[inline]
    pub fn index(i: usize) -> Self {
        Seg::Index(i)
    }
}

impl From<&str> for Seg {
    fn from(s: &str) -> Self {
        Seg::Key(s.to_owned())
    }
}

impl From<String> for Seg {
    fn from(s: String) -> Self {
        Seg::Key(s)
    }
}

impl From<usize> for Seg {
    fn from(i: usize) -> Self {
        Seg::Index(i)
    }
}

/// A path from a root value to a nested position.
///
/// Displays in dotted/bracket notation, e.g. `users[0].name`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path(Vec<Seg>);

impl Path {
    /// The empty path, pointing at the root itself.
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Append a key segment (builder style).
    #[inline]
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(Seg::Key(k.into()));
        self
    }

    /// Append an index segment (builder style).
    #[inline]
    pub fn index(mut self, i: usize) -> Self {
        self.0.push(Seg::Index(i));
        self
    }

    #[inline]
    pub fn push(&mut self, seg: Seg) {
        self.0.push(seg);
    }

    /// Return a copy of this path extended by `other`.
    pub fn join(&self, other: &Path) -> Path {
        let mut joined = self.clone();
        joined.0.extend(other.0.iter().cloned());
        joined
    }

    /// Return a copy of this path extended by one segment.
    pub fn child(&self, seg: Seg) -> Path {
        let mut child = self.clone();
        child.0.push(seg);
        child
    }

    /// Split the last accessor off the path.
    pub fn split_last(&self) -> Option<(&Seg, &[Seg])> {
        self.0.split_last()
    }

    #[inline]
    pub fn segments(&self) -> &[Seg] {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Seg> {
        self.0.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                Seg::Key(k) if i == 0 => write!(f, "{k}")?,
                Seg::Key(k) => write!(f, ".{k}")?,
                Seg::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

impl FromIterator<Seg> for Path {
    fn from_iter<I: IntoIterator<Item = Seg>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

/// Parse a dotted/bracket accessor such as `a.b[2].c` into a path.
///
/// Empty segments are skipped, so `""` is the root path and `a..b` equals
/// `a.b`. A bracket that does not hold a non-negative integer is kept as a key.
pub fn parse_path(accessor: &str) -> Path {
    let mut path = Path::root();
    for part in accessor.split('.') {
        let mut rest = part;
        while !rest.is_empty() {
            match rest.find('[') {
                Some(0) => {
                    let close = rest.find(']').unwrap_or(rest.len());
                    let inner = &rest[1..close];
                    match inner.parse::<usize>() {
                        Ok(i) => path.push(Seg::Index(i)),
                        Err(_) if !inner.is_empty() => path.push(Seg::key(inner)),
                        Err(_) => {}
                    }
                    rest = rest.get(close + 1..).unwrap_or("");
                }
                Some(open) => {
                    path.push(Seg::key(&rest[..open]));
                    rest = &rest[open..];
                }
                None => {
                    path.push(Seg::key(rest));
                    rest = "";
                }
            }
        }
    }
    path
}

/// Resolve `accessor` against `base`, turning numeric keys into indexes
/// wherever the value reached so far is an array.
pub fn resolve_accessor(base: &Value, accessor: &str) -> Path {
    let mut current = Some(base);
    parse_path(accessor)
        .0
        .into_iter()
        .map(|seg| {
            let seg = match (seg, current) {
                (Seg::Key(k), Some(Value::Array(_))) => match k.parse::<usize>() {
                    Ok(i) => Seg::Index(i),
                    Err(_) => Seg::Key(k),
                },
                (seg, _) => seg,
            };
            current = current.and_then(|v| match &seg {
                Seg::Key(k) => v.get(k),
                Seg::Index(i) => v.get(i),
            });
            seg
        })
        .collect()
}

/// Construct a [`Path`] from segments: string literals become keys,
/// `usize` values become indexes.
///
/// ```
/// use statecraft_query::path;
///
/// let p = path!("users", 0, "name");
/// assert_eq!(p.to_string(), "users[0].name");
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($seg:expr),+ $(,)?) => {{
        let mut p = $crate::Path::root();
        $( p.push($crate::Seg::from($seg)); )+
        p
    }};
}
