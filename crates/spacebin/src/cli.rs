//! Command-line arguments.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use spacebin_config::{Config, DEFAULT_CONFIG_PATH};

/// Output format for the resolved configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// TOML, loadable as a configuration file.
    #[default]
    Toml,
    /// Pretty-printed JSON.
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            other => bail!("unsupported output format: {other} (expected toml or json)"),
        }
    }
}

impl OutputFormat {
    /// Render `config` in this format.
    pub fn render(self, config: &Config) -> Result<String> {
        match self {
            Self::Toml => toml::to_string_pretty(config).context("failed to render TOML"),
            Self::Json => serde_json::to_string_pretty(config).context("failed to render JSON"),
        }
    }
}

/// Parsed arguments for a normal run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    /// Path to the configuration file.
    pub config: PathBuf,
    /// Load `.env` before scanning the environment.
    pub dotenv: bool,
    /// Output format.
    pub format: OutputFormat,
    /// Log filter directive.
    pub log_level: Option<String>,
    /// Emit JSON logs.
    pub log_json: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            config: PathBuf::from(DEFAULT_CONFIG_PATH),
            dotenv: false,
            format: OutputFormat::default(),
            log_level: None,
            log_json: false,
        }
    }
}

/// What the invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Resolve and print the configuration.
    Run(Args),
    /// Print usage.
    Help,
    /// Print the version.
    Version,
}

impl Command {
    /// Parse arguments, excluding the program name.
    pub fn parse_from<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        let mut parsed = Args::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let path = args.next().context("--config requires a path")?;
                    parsed.config = PathBuf::from(path);
                }
                "--format" | "-f" => {
                    let format = args.next().context("--format requires a value")?;
                    parsed.format = format.parse()?;
                }
                "--log-level" => {
                    parsed.log_level = Some(args.next().context("--log-level requires a value")?);
                }
                "--log-json" => parsed.log_json = true,
                "--dotenv" => parsed.dotenv = true,
                "--help" | "-h" => return Ok(Self::Help),
                "--version" | "-V" => return Ok(Self::Version),
                other => bail!("unknown argument: {other}"),
            }
        }

        Ok(Self::Run(parsed))
    }
}

/// Usage text.
pub fn help() -> String {
    format!(
        r"Spacebin - resolve server configuration

USAGE:
    spacebin [OPTIONS]

OPTIONS:
    -c, --config <PATH>       Configuration file (default: {DEFAULT_CONFIG_PATH})
    -f, --format <FORMAT>     Output format: toml or json (default: toml)
        --dotenv              Also read SPACEBIN_ variables from ./.env
        --log-level <FILTER>  Log filter, overrides RUST_LOG (default: info)
        --log-json            Emit logs as JSON
    -h, --help                Print help information
    -V, --version             Print version information

ENVIRONMENT VARIABLES:
    SPACEBIN_<SECTION>_<FIELD>    Override any key, e.g.
    SPACEBIN_SERVER_PORT=8080     sets server.port
    SPACEBIN_DOCUMENTS_MAX_AGE=60 sets documents.max_age
"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_args() {
        assert_eq!(
            Command::parse_from(Vec::<String>::new()).unwrap(),
            Command::Run(Args::default())
        );
    }

    #[test]
    fn test_all_options() {
        let cmd = Command::parse_from([
            "-c",
            "/etc/spacebin/config.toml",
            "--format",
            "JSON",
            "--dotenv",
            "--log-level",
            "debug",
            "--log-json",
        ])
        .unwrap();

        assert_eq!(
            cmd,
            Command::Run(Args {
                config: PathBuf::from("/etc/spacebin/config.toml"),
                dotenv: true,
                format: OutputFormat::Json,
                log_level: Some("debug".to_string()),
                log_json: true,
            })
        );
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(Command::parse_from(["--help"]).unwrap(), Command::Help);
        assert_eq!(Command::parse_from(["-V"]).unwrap(), Command::Version);
        assert!(help().contains("SPACEBIN_SERVER_PORT"));
    }

    #[test]
    fn test_errors() {
        assert!(Command::parse_from(["--config"]).is_err());
        assert!(Command::parse_from(["--format", "yaml"]).is_err());
        assert!(Command::parse_from(["--bogus"]).is_err());
    }

    #[test]
    fn test_render() {
        let config = Config::default();
        let toml = OutputFormat::Toml.render(&config).unwrap();
        assert!(toml.contains("port = 9000"));

        let json = OutputFormat::Json.render(&config).unwrap();
        assert!(json.contains("\"use_cors\": true"));
    }
}
