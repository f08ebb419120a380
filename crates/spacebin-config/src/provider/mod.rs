//! Configuration sources.
//!
//! A provider is a pure producer of flat key/value pairs. It knows nothing
//! about precedence; the [`Loader`](crate::Loader) decides the order in which
//! providers are applied to the [`Store`](crate::Store).

mod defaults;
mod env;
mod file;

pub use defaults::{DefaultProvider, DefaultValue, DEFAULTS};
pub use env::{EnvProvider, ENV_PREFIX};
pub use file::{FileProvider, DEFAULT_CONFIG_PATH};

use crate::store::Value;
use crate::ConfigError;

/// A key/value pair emitted by a provider before it reaches the store.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPair {
    /// Delimited key, not yet normalized.
    pub key: String,
    /// Untyped value.
    pub value: Value,
}

impl RawPair {
    /// Create a new pair.
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// A source of raw configuration pairs.
pub trait Provider {
    /// Short name used in log fields.
    fn name(&self) -> &'static str;

    /// Produce every pair this source defines.
    fn read(&self) -> Result<Vec<RawPair>, ConfigError>;
}
