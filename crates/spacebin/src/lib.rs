//! Spacebin server entry point support.
//!
//! Argument parsing and logging setup for the `spacebin` binary, which
//! resolves the layered configuration and hands it to the caller.

pub mod cli;
pub mod logging;

use spacebin_config::{Config, ConfigError, Loader};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build the loader described by `args`.
pub fn loader(args: &cli::Args) -> Loader {
    let loader = Loader::new().with_file(&args.config);
    if args.dotenv {
        loader.with_dotenv()
    } else {
        loader
    }
}

/// Resolve the configuration for `args`.
pub fn resolve(args: &cli::Args) -> Result<Config, ConfigError> {
    loader(args).load()
}
