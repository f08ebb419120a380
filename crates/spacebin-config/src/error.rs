//! Configuration error types.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Loader stage in which an error surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Compiled-in defaults are loaded into the store.
    Defaults,
    /// The configuration file is merged over the defaults.
    FileMerge,
    /// Prefixed environment variables are merged over the file.
    EnvMerge,
    /// The merged store is converted into a typed [`Config`](crate::Config).
    Materialize,
}

impl Stage {
    /// Every stage, in execution order.
    pub const ORDER: [Stage; 4] = [
        Stage::Defaults,
        Stage::FileMerge,
        Stage::EnvMerge,
        Stage::Materialize,
    ];

    /// Short lowercase name used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Defaults => "defaults",
            Stage::FileMerge => "file_merge",
            Stage::EnvMerge => "env_merge",
            Stage::Materialize => "materialize",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while resolving configuration.
///
/// Every variant is fatal: the loader stops at the first one and never returns
/// a partially populated [`Config`](crate::Config).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file missing or unreadable.
    #[error("failed to read configuration file {path}: {source}")]
    FileRead {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not a valid TOML document.
    #[error("failed to parse configuration file {path}: {source}")]
    FileParse {
        /// Path to the file.
        path: PathBuf,
        /// Underlying parser error.
        #[source]
        source: Box<toml::de::Error>,
    },

    /// The process environment could not be enumerated.
    #[error("failed to scan environment variable {var}: {reason}")]
    EnvScan {
        /// The variable name (lossily decoded).
        var: String,
        /// Explanation of the failure.
        reason: String,
    },

    /// A value cannot be converted to the type its field declares.
    #[error("invalid value for {key}: expected {expected}, found {found}")]
    TypeCoercion {
        /// Key path of the field.
        key: String,
        /// The declared type.
        expected: &'static str,
        /// Rendering of the raw value.
        found: String,
    },

    /// A string is not a member of the field's enumeration.
    #[error("unknown value {value:?} for {key}: expected one of {}", .allowed.join(", "))]
    UnknownEnumValue {
        /// Key path of the field.
        key: String,
        /// The rejected value.
        value: String,
        /// Accepted spellings.
        allowed: &'static [&'static str],
    },

    /// A required field has no value in the merged store.
    #[error("missing required configuration key: {key}")]
    MissingKey {
        /// Key path of the field.
        key: String,
    },
}

impl ConfigError {
    /// Create a new file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Create a new file parse error.
    pub fn file_parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::FileParse {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// Create a new environment scan error.
    pub fn env_scan(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::EnvScan {
            var: var.into(),
            reason: reason.into(),
        }
    }

    /// Create a new type coercion error.
    pub fn type_coercion(
        key: impl Into<String>,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeCoercion {
            key: key.into(),
            expected,
            found: found.into(),
        }
    }

    /// Create a new unknown enum value error.
    pub fn unknown_enum_value(
        key: impl Into<String>,
        value: impl Into<String>,
        allowed: &'static [&'static str],
    ) -> Self {
        Self::UnknownEnumValue {
            key: key.into(),
            value: value.into(),
            allowed,
        }
    }

    /// Create a new missing key error.
    pub fn missing_key(key: impl Into<String>) -> Self {
        Self::MissingKey { key: key.into() }
    }

    /// The loader stage this error belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            Self::FileRead { .. } | Self::FileParse { .. } => Stage::FileMerge,
            Self::EnvScan { .. } => Stage::EnvMerge,
            Self::TypeCoercion { .. } | Self::UnknownEnumValue { .. } | Self::MissingKey { .. } => {
                Stage::Materialize
            }
        }
    }

    /// Key path the error refers to, if it refers to one.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::TypeCoercion { key, .. }
            | Self::UnknownEnumValue { key, .. }
            | Self::MissingKey { key } => Some(key),
            _ => None,
        }
    }
}
