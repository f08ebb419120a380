//! Spacebin - Entry point
//!
//! Resolves the layered configuration and prints it. Exits non-zero when the
//! configuration is invalid so a supervisor never starts a misconfigured server.

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use spacebin::cli::{self, Command};
use spacebin::logging::{init_logging, LogConfig};

fn main() -> ExitCode {
    let args = match Command::parse_from(std::env::args().skip(1)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            print!("{}", cli::help());
            return ExitCode::SUCCESS;
        }
        Ok(Command::Version) => {
            println!("spacebin {}", spacebin::VERSION);
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}");
            eprintln!("Use --help for usage information");
            return ExitCode::from(2);
        }
    };

    let log_config = LogConfig {
        level: args.log_level.clone(),
        json_format: args.log_json,
    };
    if let Err(e) = init_logging(&log_config) {
        eprintln!("{e:#}");
        return ExitCode::from(2);
    }

    info!(path = %args.config.display(), "Loading configuration");
    let config = match spacebin::resolve(&args) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!(stage = %e.stage(), "Invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        bind = %config.server.bind_addr(),
        prefork = config.server.prefork,
        "Configuration resolved"
    );

    match args.format.render(&config) {
        Ok(rendered) => {
            print!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
