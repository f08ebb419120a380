//! Configuration loader with layered approach.
//!
//! This module provides the [`Loader`], which applies the three sources to a
//! fresh [`Store`] in fixed order and materializes the result.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::key::{KeyPath, DELIMITER};
use crate::materialize::Materializer;
use crate::provider::{
    DefaultProvider, EnvProvider, FileProvider, Provider, RawPair, DEFAULT_CONFIG_PATH,
    ENV_PREFIX,
};
use crate::{Config, ConfigError, Stage, Store};

/// Dotenv file read by [`Loader::with_dotenv`].
pub const DOTENV_PATH: &str = ".env";

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones at the same key path:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML)
/// 3. Environment variables, over an optional dotenv file
///
/// # Example
///
/// ```no_run
/// use spacebin_config::Loader;
///
/// # fn main() -> Result<(), spacebin_config::ConfigError> {
/// let config = Loader::new()
///     .with_file("config.toml")
///     .with_env_prefix("SPACEBIN_")
///     .load()?;
///
/// println!("listening on {}", config.server.bind_addr());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Loader {
    defaults: DefaultProvider,
    file: FileProvider,
    env: EnvProvider,
    dotenv: Option<PathBuf>,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl Loader {
    /// Loader reading `config.toml` and `SPACEBIN_*` variables.
    #[must_use]
    pub fn new() -> Self {
        Self {
            defaults: DefaultProvider::new(),
            file: FileProvider::new(DEFAULT_CONFIG_PATH),
            env: EnvProvider::new(ENV_PREFIX),
            dotenv: None,
        }
    }

    /// Read the configuration file from `path` instead.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = FileProvider::new(path);
        self
    }

    /// Scan for variables starting with `prefix` instead.
    ///
    /// The prefix is matched case-sensitively and includes any trailing
    /// underscore, e.g. `"SPACEBIN_"`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env = self.env.with_prefix(prefix);
        self
    }

    /// Use a fixed variable list instead of the process environment.
    ///
    /// The current prefix is kept.
    #[must_use]
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        self.env = EnvProvider::from_vars(self.env.prefix().to_string(), vars);
        self
    }

    /// Read `.env` from the working directory as well.
    ///
    /// See [`Loader::with_dotenv_file`].
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        self.with_dotenv_file(DOTENV_PATH)
    }

    /// Read variables from a dotenv file at `path` as well.
    ///
    /// The file's variables go through the same prefix filter as the
    /// environment and sit beneath it: a variable set in both takes the
    /// environment's value. The process environment is never modified. A
    /// missing file is not an error.
    #[must_use]
    pub fn with_dotenv_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.dotenv = Some(path.into());
        self
    }

    /// The configuration file path.
    pub fn file_path(&self) -> &Path {
        self.file.path()
    }

    /// Run every stage and return the typed configuration.
    ///
    /// Stages run strictly in order and the first error aborts the load; no
    /// partially populated configuration is ever returned.
    pub fn load(&self) -> Result<Config, ConfigError> {
        // The store lives only for this call.
        let mut store = Store::new();
        self.run(&mut store)
    }

    fn run(&self, store: &mut Store) -> Result<Config, ConfigError> {
        Self::merge(store, &self.defaults, Stage::Defaults)?;
        Self::merge(store, &self.file, Stage::FileMerge)?;
        self.merge_env(store)?;
        Self::materialize(store)
    }

    fn merge(store: &mut Store, provider: &dyn Provider, stage: Stage) -> Result<(), ConfigError> {
        let pairs = provider.read()?;
        let written = store.load(pairs, DELIMITER);
        debug!(stage = %stage, provider = provider.name(), pairs = written, "merged configuration source");
        Ok(())
    }

    fn merge_env(&self, store: &mut Store) -> Result<(), ConfigError> {
        let mut pairs = match &self.dotenv {
            Some(path) => self.read_dotenv(path)?,
            None => Vec::new(),
        };
        pairs.extend(self.env.read()?);

        let known = Config::key_paths();
        let pairs: Vec<RawPair> = pairs
            .into_iter()
            .map(|pair| resolve_alias(pair, &known))
            .collect();

        let written = store.load(pairs, DELIMITER);
        debug!(stage = %Stage::EnvMerge, provider = self.env.name(), pairs = written, "merged configuration source");
        Ok(())
    }

    fn read_dotenv(&self, path: &Path) -> Result<Vec<RawPair>, ConfigError> {
        let scan_error =
            |e: dotenvy::Error| ConfigError::env_scan(path.display().to_string(), e.to_string());

        let vars = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter
                .collect::<Result<Vec<(String, String)>, _>>()
                .map_err(scan_error)?,
            Err(e) if e.not_found() => {
                debug!(path = %path.display(), "no dotenv file");
                return Ok(Vec::new());
            }
            Err(e) => return Err(scan_error(e)),
        };

        let pairs = EnvProvider::from_vars(self.env.prefix(), vars).read()?;
        debug!(path = %path.display(), pairs = pairs.len(), "read dotenv file");
        Ok(pairs)
    }

    fn materialize(store: &Store) -> Result<Config, ConfigError> {
        let known = Config::key_paths();
        for (path, _) in store.leaves() {
            if !known.iter().any(|k| path.starts_with(k)) {
                warn!(key = %path, "ignoring unrecognized configuration key");
            }
        }

        let config = Config::materialize(&Materializer::new(store))?;
        debug!(stage = %Stage::Materialize, "configuration ready");
        Ok(config)
    }
}

/// Map an environment-derived key onto the schema key it spells.
///
/// Environment names cannot tell a delimiter from an underscore inside a
/// field name, so `documents.max.age` is stored as `documents.max_age`.
/// Keys that spell no schema field are returned unchanged.
pub fn resolve_alias(pair: RawPair, known: &[KeyPath]) -> RawPair {
    let path = KeyPath::parse(&pair.key);
    if known.contains(&path) {
        return pair;
    }

    match known.iter().find(|k| k.underscore_split() == path) {
        Some(canonical) => {
            debug!(from = %path, to = %canonical, "resolved environment key");
            RawPair::new(canonical.to_string(), pair.value)
        }
        None => pair,
    }
}
