//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections and how
//! each one is read out of a merged store.

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::key::KeyPath;
use crate::materialize::{ConfigEnum, Materializer};
use crate::ConfigError;

/// Response compression level.
///
/// Accepts either the numeric level or its name.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum CompressionLevel {
    /// Compression off (`-1`).
    #[default]
    Disabled,
    /// Encoder default (`0`).
    Default,
    /// Favor speed (`1`).
    BestSpeed,
    /// Favor ratio (`2`).
    BestCompression,
}

impl CompressionLevel {
    /// Numeric level.
    pub fn as_i8(self) -> i8 {
        match self {
            CompressionLevel::Disabled => -1,
            CompressionLevel::Default => 0,
            CompressionLevel::BestSpeed => 1,
            CompressionLevel::BestCompression => 2,
        }
    }
}

impl ConfigEnum for CompressionLevel {
    const ALLOWED: &'static [&'static str] = &[
        "-1",
        "0",
        "1",
        "2",
        "disabled",
        "default",
        "best_speed",
        "best_compression",
    ];

    fn from_config_str(s: &str) -> Option<Self> {
        match s {
            "disabled" => Some(CompressionLevel::Disabled),
            "default" => Some(CompressionLevel::Default),
            "best_speed" => Some(CompressionLevel::BestSpeed),
            "best_compression" => Some(CompressionLevel::BestCompression),
            _ => None,
        }
    }

    fn from_config_int(n: i64) -> Option<Self> {
        match n {
            -1 => Some(CompressionLevel::Disabled),
            0 => Some(CompressionLevel::Default),
            1 => Some(CompressionLevel::BestSpeed),
            2 => Some(CompressionLevel::BestCompression),
            _ => None,
        }
    }
}

/// Database backend.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDialect {
    /// PostgreSQL.
    Postgres,
    /// SQLite.
    Sqlite,
}

impl ConfigEnum for DatabaseDialect {
    const ALLOWED: &'static [&'static str] = &["postgres", "postgresql", "sqlite", "sqlite3"];

    fn from_config_str(s: &str) -> Option<Self> {
        match s {
            "postgres" | "postgresql" => Some(DatabaseDialect::Postgres),
            "sqlite" | "sqlite3" => Some(DatabaseDialect::Sqlite),
            _ => None,
        }
    }
}

/// Rate limiting applied per client.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests allowed per window.
    pub requests: u32,

    /// Window length. Serialized as milliseconds.
    #[serde(serialize_with = "serialize_millis")]
    pub duration: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests: 200,
            duration: Duration::from_millis(300_000),
        }
    }
}

impl RateLimitConfig {
    fn materialize(m: &Materializer<'_>, base: &KeyPath) -> Result<Self, ConfigError> {
        Ok(Self {
            requests: m.integer(&base.child("requests"))?,
            duration: m.duration(&base.child("duration"))?,
        })
    }
}

/// Server configuration section.
///
/// Controls the listener and HTTP behavior.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Response compression.
    pub compression_level: CompressionLevel,

    /// Spawn one worker process per core.
    pub prefork: bool,

    /// Rate limiting.
    pub ratelimits: RateLimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
            compression_level: CompressionLevel::Disabled,
            prefork: false,
            ratelimits: RateLimitConfig::default(),
        }
    }
}

impl ServerConfig {
    /// `host:port` listener address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn materialize(m: &Materializer<'_>, base: &KeyPath) -> Result<Self, ConfigError> {
        Ok(Self {
            host: m.string(&base.child("host"))?,
            port: m.integer(&base.child("port"))?,
            compression_level: m.enumeration(&base.child("compression_level"))?,
            prefork: m.boolean(&base.child("prefork"))?,
            ratelimits: RateLimitConfig::materialize(m, &base.child("ratelimits"))?,
        })
    }
}

/// Document storage limits.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DocumentsConfig {
    /// Length of generated document identifiers.
    pub id_length: usize,

    /// Maximum accepted document size, in characters.
    pub max_document_length: usize,

    /// Document lifetime in seconds.
    pub max_age: u64,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            id_length: 8,
            max_document_length: 400_000,
            max_age: 2_592_000,
        }
    }
}

impl DocumentsConfig {
    /// Document lifetime as a [`Duration`].
    pub fn max_age_duration(&self) -> Duration {
        Duration::from_secs(self.max_age)
    }

    fn materialize(m: &Materializer<'_>, base: &KeyPath) -> Result<Self, ConfigError> {
        Ok(Self {
            id_length: m.integer(&base.child("id_length"))?,
            max_document_length: m.integer(&base.child("max_document_length"))?,
            max_age: m.integer(&base.child("max_age"))?,
        })
    }
}

/// Database connection. Both fields are unset unless configured.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct DatabaseConfig {
    /// Backend dialect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialect: Option<DatabaseDialect>,

    /// Connection string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_uri: Option<String>,
}

impl DatabaseConfig {
    fn materialize(m: &Materializer<'_>, base: &KeyPath) -> Result<Self, ConfigError> {
        Ok(Self {
            dialect: m.optional_enumeration(&base.child("dialect"))?,
            connection_uri: m.optional_string(&base.child("connection_uri"))?,
        })
    }
}

/// Security section.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SecurityConfig {
    /// Send permissive CORS headers.
    pub use_cors: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self { use_cors: true }
    }
}

impl SecurityConfig {
    fn materialize(m: &Materializer<'_>, base: &KeyPath) -> Result<Self, ConfigError> {
        Ok(Self {
            use_cors: m.boolean(&base.child("use_cors"))?,
        })
    }
}

/// Complete Spacebin configuration.
///
/// Produced once by [`Loader::load`](crate::Loader::load) and read-only
/// afterwards; share it by reference or behind an `Arc`.
///
/// # Example
///
/// ```
/// use spacebin_config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.server.bind_addr(), "0.0.0.0:9000");
/// ```
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,

    /// Document configuration.
    pub documents: DocumentsConfig,

    /// Database configuration.
    pub database: DatabaseConfig,

    /// Security configuration.
    pub security: SecurityConfig,
}

impl Config {
    /// Every key path the schema declares.
    pub const KEYS: &'static [&'static str] = &[
        "server.host",
        "server.port",
        "server.compression_level",
        "server.prefork",
        "server.ratelimits.requests",
        "server.ratelimits.duration",
        "documents.id_length",
        "documents.max_document_length",
        "documents.max_age",
        "database.dialect",
        "database.connection_uri",
        "security.use_cors",
    ];

    /// [`Config::KEYS`] as parsed key paths.
    pub fn key_paths() -> Vec<KeyPath> {
        Self::KEYS.iter().map(|k| KeyPath::parse(k)).collect()
    }

    /// Build the typed configuration from a merged store.
    ///
    /// Stops at the first field that fails to coerce.
    pub fn materialize(m: &Materializer<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::materialize(m, &KeyPath::parse("server"))?,
            documents: DocumentsConfig::materialize(m, &KeyPath::parse("documents"))?,
            database: DatabaseConfig::materialize(m, &KeyPath::parse("database"))?,
            security: SecurityConfig::materialize(m, &KeyPath::parse("security"))?,
        })
    }
}

fn serialize_millis<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    serializer.serialize_u64(millis)
}
