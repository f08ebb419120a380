//! TOML configuration file source.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use super::{Provider, RawPair};
use crate::key::DELIMITER;
use crate::store::Value;
use crate::ConfigError;

/// Well-known configuration file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Reads one TOML document and flattens it into dot-delimited pairs.
///
/// A missing, unreadable or malformed file is an error; there is no
/// fallback to an empty document.
#[derive(Debug, Clone)]
pub struct FileProvider {
    path: PathBuf,
}

impl Default for FileProvider {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl FileProvider {
    /// Provider for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this provider reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse TOML `content` into flat pairs. `path` is only used in errors.
    pub fn parse(content: &str, path: &Path) -> Result<Vec<RawPair>, ConfigError> {
        let table: toml::Table =
            toml::from_str(content).map_err(|e| ConfigError::file_parse(path, e))?;

        let mut pairs = Vec::new();
        flatten(&table, "", &mut pairs);
        Ok(pairs)
    }
}

impl Provider for FileProvider {
    fn name(&self) -> &'static str {
        "file"
    }

    fn read(&self) -> Result<Vec<RawPair>, ConfigError> {
        let content =
            fs::read_to_string(&self.path).map_err(|e| ConfigError::file_read(&self.path, e))?;
        Self::parse(&content, &self.path)
    }
}

// Depth-first walk; tables recurse, everything else is a leaf.
fn flatten(table: &toml::Table, prefix: &str, out: &mut Vec<RawPair>) {
    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}{DELIMITER}{key}")
        };

        match value {
            toml::Value::Table(inner) => flatten(inner, &full, out),
            leaf => out.push(RawPair::new(full, convert(leaf))),
        }
    }
}

fn convert(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(n) => Value::Integer(*n),
        toml::Value::Float(n) => Value::Float(*n),
        toml::Value::Boolean(b) => Value::Boolean(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(convert).collect()),
        toml::Value::Table(table) => Value::Table(
            table
                .iter()
                .map(|(k, v)| (k.clone(), convert(v)))
                .collect::<IndexMap<_, _>>(),
        ),
    }
}
