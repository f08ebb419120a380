//! Layered configuration for the Spacebin server.
//!
//! This crate resolves one strongly-typed [`Config`] from three sources, each
//! overriding the previous one at the same key path:
//! - compiled-in defaults ([`DEFAULTS`])
//! - a TOML configuration file (`config.toml`)
//! - environment variables prefixed with `SPACEBIN_`
//!
//! # Overview
//!
//! Every source is a [`Provider`] emitting flat, dot-delimited key/value pairs.
//! The [`Loader`] applies them to a [`Store`] in fixed order, then the
//! [`Materializer`] coerces the merged values into the typed schema:
//!
//! - [`ServerConfig`] - listener, compression and rate limits
//! - [`DocumentsConfig`] - document identifier and size limits
//! - [`DatabaseConfig`] - database dialect and connection string
//! - [`SecurityConfig`] - CORS
//!
//! Any read, parse or coercion failure aborts the load with a [`ConfigError`].
//!
//! # Example
//!
//! ```no_run
//! use spacebin_config::Loader;
//!
//! # fn main() -> Result<(), spacebin_config::ConfigError> {
//! let config = Loader::new().load()?;
//! println!("Server will listen on: {}", config.server.bind_addr());
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 9000
//! compression_level = -1
//! prefork = false
//!
//! [server.ratelimits]
//! requests = 200
//! duration = "5m"
//!
//! [documents]
//! id_length = 8
//! max_document_length = 400000
//! max_age = 2592000
//!
//! [database]
//! dialect = "postgres"
//! connection_uri = "postgres://spacebin@localhost/spacebin"
//!
//! [security]
//! use_cors = true
//! ```
//!
//! # Environment Variable Overrides
//!
//! The prefix is stripped, the rest lowercased and every underscore becomes a
//! key delimiter. Names that spell a schema field with underscores in it are
//! mapped back onto that field:
//!
//! - `SPACEBIN_SERVER_PORT=8080` sets `server.port`
//! - `SPACEBIN_SERVER_RATELIMITS_DURATION=1m` sets `server.ratelimits.duration`
//! - `SPACEBIN_DOCUMENTS_MAX_AGE=86400` sets `documents.max_age`

#![warn(missing_docs)]

mod error;
mod key;
mod loader;
mod materialize;
mod provider;
mod schema;
mod store;

pub use error::{ConfigError, Stage};
pub use key::{KeyPath, DELIMITER};
pub use loader::{resolve_alias, Loader, DOTENV_PATH};
pub use materialize::{parse_duration, ConfigEnum, Materializer};
pub use provider::{
    DefaultProvider, DefaultValue, EnvProvider, FileProvider, Provider, RawPair,
    DEFAULTS, DEFAULT_CONFIG_PATH, ENV_PREFIX,
};
pub use schema::*;
pub use store::{Store, Value};
