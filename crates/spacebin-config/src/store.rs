//! Ordered hierarchical key/value store.
//!
//! The [`Store`] is the merge target for every provider. Each load writes its
//! pairs at their exact key paths, replacing whatever was there before
//! (scalar or subtree). Paths a later load does not mention keep their value.

use std::fmt;

use indexmap::IndexMap;

use crate::key::KeyPath;
use crate::provider::RawPair;

/// An untyped configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string.
    String(String),
    /// A signed integer.
    Integer(i64),
    /// A floating point number.
    Float(f64),
    /// A boolean.
    Boolean(bool),
    /// An array, stored as an opaque leaf.
    Array(Vec<Value>),
    /// A nested table.
    Table(IndexMap<String, Value>),
}

impl Value {
    /// Name of the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::Array(_) => "array",
            Value::Table(_) => "table",
        }
    }

    /// True for tables.
    pub fn is_table(&self) -> bool {
        matches!(self, Value::Table(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s:?}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Array(items) => write!(f, "array of {} items", items.len()),
            Value::Table(map) => write!(f, "table of {} keys", map.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

/// Hierarchical key/value store keyed by [`KeyPath`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Store {
    root: IndexMap<String, Value>,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load raw pairs, splitting each key on `delimiter`.
    ///
    /// Returns the number of pairs written. Keys that normalize to an empty
    /// path are skipped.
    pub fn load<I>(&mut self, pairs: I, delimiter: char) -> usize
    where
        I: IntoIterator<Item = RawPair>,
    {
        let mut written = 0;
        for pair in pairs {
            let path = KeyPath::parse_with(&pair.key, delimiter);
            if path.is_empty() {
                tracing::warn!(key = %pair.key, "skipping configuration key with no segments");
                continue;
            }
            self.set(&path, pair.value);
            written += 1;
        }
        written
    }

    /// Write `value` at `path`, creating intermediate tables as needed.
    ///
    /// Scalars standing where an intermediate table is required are replaced.
    pub fn set(&mut self, path: &KeyPath, value: Value) {
        insert_at(&mut self.root, path.segments(), value);
    }

    /// Value stored at `path`, leaf or subtree.
    pub fn get(&self, path: &KeyPath) -> Option<&Value> {
        let (first, rest) = path.segments().split_first()?;
        let mut value = self.root.get(first)?;
        for segment in rest {
            match value {
                Value::Table(table) => value = table.get(segment)?,
                _ => return None,
            }
        }
        Some(value)
    }

    /// True when something is stored at `path`.
    pub fn contains(&self, path: &KeyPath) -> bool {
        self.get(path).is_some()
    }

    /// Every leaf (non-table value) with its path, in insertion order.
    pub fn leaves(&self) -> Vec<(KeyPath, &Value)> {
        let mut out = Vec::new();
        collect_leaves(&self.root, &mut Vec::new(), &mut out);
        out
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        count_leaves(&self.root)
    }

    /// True when the store holds no leaves.
    pub fn is_empty(&self) -> bool {
        !has_leaf(&self.root)
    }
}

fn insert_at(table: &mut IndexMap<String, Value>, segments: &[String], value: Value) {
    match segments {
        [] => {}
        [last] => {
            table.insert(last.clone(), value);
        }
        [first, rest @ ..] => match table.get_mut(first) {
            Some(Value::Table(inner)) => insert_at(inner, rest, value),
            // Missing, or a scalar standing where a table is needed.
            _ => {
                let mut inner = IndexMap::new();
                insert_at(&mut inner, rest, value);
                table.insert(first.clone(), Value::Table(inner));
            }
        },
    }
}

fn count_leaves(table: &IndexMap<String, Value>) -> usize {
    table
        .values()
        .map(|value| match value {
            Value::Table(inner) => count_leaves(inner),
            _ => 1,
        })
        .sum()
}

fn has_leaf(table: &IndexMap<String, Value>) -> bool {
    table.values().any(|value| match value {
        Value::Table(inner) => has_leaf(inner),
        _ => true,
    })
}

fn collect_leaves<'a>(
    table: &'a IndexMap<String, Value>,
    prefix: &mut Vec<String>,
    out: &mut Vec<(KeyPath, &'a Value)>,
) {
    for (key, value) in table {
        prefix.push(key.clone());
        match value {
            Value::Table(inner) => collect_leaves(inner, prefix, out),
            leaf => out.push((KeyPath::from_segments(prefix.iter()), leaf)),
        }
        prefix.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(key: &str, value: impl Into<Value>) -> RawPair {
        RawPair::new(key, value.into())
    }

    #[test]
    fn test_load_and_get() {
        let mut store = Store::new();
        let written = store.load(
            vec![pair("server.host", "0.0.0.0"), pair("server.port", 9000)],
            '.',
        );

        assert_eq!(written, 2);
        assert_eq!(store.get(&"server.port".into()), Some(&Value::Integer(9000)));
        assert!(store.get(&"server".into()).is_some_and(Value::is_table));
        assert!(store.get(&"server.missing".into()).is_none());
    }

    #[test]
    fn test_later_load_overwrites_and_preserves() {
        let mut store = Store::new();
        store.load(vec![pair("server.host", "0.0.0.0"), pair("server.port", 9000)], '.');
        store.load(vec![pair("server.port", "8080")], '.');

        assert_eq!(store.get(&"server.port".into()), Some(&Value::from("8080")));
        assert_eq!(store.get(&"server.host".into()), Some(&Value::from("0.0.0.0")));
    }

    #[test]
    fn test_keys_are_case_normalized() {
        let mut store = Store::new();
        store.load(vec![pair("Server.PORT", 1)], '.');
        store.load(vec![pair("server.port", 2)], '.');

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&"server.port".into()), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_scalar_replaces_subtree() {
        let mut store = Store::new();
        store.load(
            vec![pair("server.ratelimits.requests", 200), pair("server.ratelimits.duration", 300_000)],
            '.',
        );
        store.load(vec![pair("server.ratelimits", "off")], '.');

        assert_eq!(store.get(&"server.ratelimits".into()), Some(&Value::from("off")));
        assert!(!store.contains(&"server.ratelimits.requests".into()));
    }

    #[test]
    fn test_subtree_replaces_scalar() {
        let mut store = Store::new();
        store.load(vec![pair("server", "flat")], '.');
        store.load(vec![pair("server.port", 9000)], '.');

        assert_eq!(store.get(&"server.port".into()), Some(&Value::Integer(9000)));
    }

    #[test]
    fn test_nested_path_through_scalar_keeps_position() {
        let mut store = Store::new();
        store.load(vec![pair("a.b", 1), pair("z", 0)], '.');
        store.load(vec![pair("a.b.c.d", 2)], '.');

        assert_eq!(store.get(&"a.b.c.d".into()), Some(&Value::Integer(2)));
        let keys: Vec<String> = store.leaves().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, ["a.b.c.d", "z"]);
    }

    #[test]
    fn test_len_ignores_empty_tables() {
        let mut store = Store::new();
        store.set(&"extra".into(), Value::Table(IndexMap::new()));
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());

        store.load(vec![pair("server.port", 1), pair("server.ratelimits.requests", 2)], '.');
        assert_eq!(store.len(), 2);
        assert_eq!(store.len(), store.leaves().len());
        assert!(!store.is_empty());
    }

    #[test]
    fn test_custom_delimiter() {
        let mut store = Store::new();
        store.load(vec![pair("documents_id_length", 12)], '_');

        assert_eq!(store.get(&"documents.id.length".into()), Some(&Value::Integer(12)));
    }

    #[test]
    fn test_empty_key_is_skipped() {
        let mut store = Store::new();
        let written = store.load(vec![pair("..", 1)], '.');

        assert_eq!(written, 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_leaves_in_insertion_order() {
        let mut store = Store::new();
        store.load(
            vec![pair("b.x", 1), pair("a", true), pair("b.y", "s")],
            '.',
        );

        let keys: Vec<String> = store.leaves().iter().map(|(k, _)| k.to_string()).collect();
        assert_eq!(keys, ["b.x", "b.y", "a"]);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from("maybe").to_string(), "\"maybe\"");
        assert_eq!(Value::Integer(-1).to_string(), "-1");
        assert_eq!(Value::Array(vec![Value::Boolean(true)]).to_string(), "array of 1 items");
    }
}
