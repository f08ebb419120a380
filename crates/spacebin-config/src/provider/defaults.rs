//! Compiled-in default values.

use super::{Provider, RawPair};
use crate::store::Value;
use crate::ConfigError;

/// A default value literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    /// String literal.
    Str(&'static str),
    /// Integer literal.
    Int(i64),
    /// Boolean literal.
    Bool(bool),
}

impl From<DefaultValue> for Value {
    fn from(value: DefaultValue) -> Self {
        match value {
            DefaultValue::Str(s) => Value::from(s),
            DefaultValue::Int(n) => Value::Integer(n),
            DefaultValue::Bool(b) => Value::Boolean(b),
        }
    }
}

/// Baseline for every field that has a default.
///
/// `server.ratelimits.duration` is in milliseconds and `documents.max_age` in
/// seconds. The `database` section has no defaults.
pub const DEFAULTS: &[(&str, DefaultValue)] = &[
    ("server.host", DefaultValue::Str("0.0.0.0")),
    ("server.port", DefaultValue::Int(9000)),
    ("server.compression_level", DefaultValue::Int(-1)),
    ("server.prefork", DefaultValue::Bool(false)),
    ("server.ratelimits.requests", DefaultValue::Int(200)),
    ("server.ratelimits.duration", DefaultValue::Int(300_000)),
    ("documents.id_length", DefaultValue::Int(8)),
    ("documents.max_document_length", DefaultValue::Int(400_000)),
    ("documents.max_age", DefaultValue::Int(2_592_000)),
    ("security.use_cors", DefaultValue::Bool(true)),
];

/// Provider for a static table of fully-qualified defaults.
#[derive(Debug, Clone)]
pub struct DefaultProvider {
    table: &'static [(&'static str, DefaultValue)],
}

impl Default for DefaultProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultProvider {
    /// Provider over [`DEFAULTS`].
    pub fn new() -> Self {
        Self::with_table(DEFAULTS)
    }

    /// Provider over a custom table.
    pub fn with_table(table: &'static [(&'static str, DefaultValue)]) -> Self {
        Self { table }
    }
}

impl Provider for DefaultProvider {
    fn name(&self) -> &'static str {
        "defaults"
    }

    fn read(&self) -> Result<Vec<RawPair>, ConfigError> {
        Ok(self
            .table
            .iter()
            .map(|(key, value)| RawPair::new(*key, Value::from(*value)))
            .collect())
    }
}
