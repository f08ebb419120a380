//! Environment variable source.

use std::ffi::OsString;

use super::{Provider, RawPair};
use crate::key::DELIMITER;
use crate::store::Value;
use crate::ConfigError;

/// Prefix selecting the variables that belong to this service.
pub const ENV_PREFIX: &str = "SPACEBIN_";

#[derive(Debug, Clone)]
enum Source {
    Process,
    Fixed(Vec<(OsString, OsString)>),
}

/// Scans environment variables carrying a fixed prefix.
///
/// `SPACEBIN_SERVER_PORT=8080` becomes the pair `server.port = "8080"`: the
/// prefix is stripped, the remainder lowercased and every underscore turned
/// into a key delimiter. Values are always strings.
#[derive(Debug, Clone)]
pub struct EnvProvider {
    prefix: String,
    source: Source,
}

impl Default for EnvProvider {
    fn default() -> Self {
        Self::new(ENV_PREFIX)
    }
}

impl EnvProvider {
    /// Provider scanning the process environment for `prefix`.
    ///
    /// The prefix match is case-sensitive.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            source: Source::Process,
        }
    }

    /// Provider over an explicit variable list instead of the process environment.
    pub fn from_vars<I, K, V>(prefix: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            prefix: prefix.into(),
            source: Source::Fixed(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Same variable source, matched against `prefix` instead.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// The prefix variables must start with.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Map a variable name to its key, or `None` if it lacks the prefix.
    pub fn key_for(&self, name: &str) -> Option<String> {
        let rest = name.strip_prefix(self.prefix.as_str())?;
        Some(rest.to_lowercase().replace('_', &DELIMITER.to_string()))
    }

    fn vars(&self) -> Vec<(OsString, OsString)> {
        match &self.source {
            Source::Process => std::env::vars_os().collect(),
            Source::Fixed(vars) => vars.clone(),
        }
    }
}

impl Provider for EnvProvider {
    fn name(&self) -> &'static str {
        "env"
    }

    fn read(&self) -> Result<Vec<RawPair>, ConfigError> {
        let mut pairs = Vec::new();

        for (name, value) in self.vars() {
            let Some(name) = name.to_str() else {
                // Only fatal if it could belong to us.
                let lossy = name.to_string_lossy();
                if lossy.starts_with(self.prefix.as_str()) {
                    return Err(ConfigError::env_scan(lossy, "name is not valid unicode"));
                }
                continue;
            };

            let Some(key) = self.key_for(name) else {
                continue;
            };

            let value = value
                .into_string()
                .map_err(|_| ConfigError::env_scan(name, "value is not valid unicode"))?;

            tracing::trace!(var = name, key = %key, "matched environment variable");
            pairs.push(RawPair::new(key, Value::String(value)));
        }

        Ok(pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(vars: &[(&str, &str)]) -> Vec<RawPair> {
        EnvProvider::from_vars(ENV_PREFIX, vars.iter().copied())
            .read()
            .unwrap()
    }

    #[test]
    fn test_key_for() {
        let provider = EnvProvider::default();
        assert_eq!(provider.key_for("SPACEBIN_SERVER_PORT").as_deref(), Some("server.port"));
        assert_eq!(
            provider.key_for("SPACEBIN_Server_RateLimits_Requests").as_deref(),
            Some("server.ratelimits.requests")
        );
        assert_eq!(
            provider.key_for("SPACEBIN_DOCUMENTS_MAX_AGE").as_deref(),
            Some("documents.max.age")
        );
        assert_eq!(provider.key_for("PATH"), None);
    }

    #[test]
    fn test_with_prefix_keeps_fixed_vars() {
        let provider = EnvProvider::from_vars(ENV_PREFIX, [("PASTE_SERVER_PORT", "1234")])
            .with_prefix("PASTE_");

        assert_eq!(provider.prefix(), "PASTE_");
        assert_eq!(
            provider.read().unwrap(),
            vec![RawPair::new("server.port", Value::from("1234"))]
        );
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        assert!(read(&[("spacebin_server_port", "1"), ("Spacebin_SERVER_PORT", "2")]).is_empty());
    }

    #[test]
    fn test_filters_and_rewrites() {
        let pairs = read(&[
            ("HOME", "/root"),
            ("SPACEBIN_SERVER_PORT", "8080"),
            ("SPACEBIN_SECURITY_USE_CORS", "false"),
        ]);

        assert_eq!(
            pairs,
            vec![
                RawPair::new("server.port", Value::from("8080")),
                RawPair::new("security.use.cors", Value::from("false")),
            ]
        );
    }

    #[test]
    fn test_no_matches_is_ok() {
        assert!(read(&[("HOME", "/root")]).is_empty());
        assert!(read(&[]).is_empty());
    }

    #[test]
    fn test_process_environment_scan_succeeds() {
        let provider = EnvProvider::new("SPACEBIN_TEST_UNLIKELY_PREFIX_");
        assert!(provider.read().unwrap().is_empty());
        assert_eq!(provider.prefix(), "SPACEBIN_TEST_UNLIKELY_PREFIX_");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_unicode_value_is_scan_error() {
        use std::os::unix::ffi::OsStringExt;

        let provider = EnvProvider::from_vars(
            ENV_PREFIX,
            vec![(
                OsString::from("SPACEBIN_SERVER_HOST"),
                OsString::from_vec(vec![0x66, 0xff, 0x6f]),
            )],
        );

        let err = provider.read().unwrap_err();
        assert!(matches!(err, ConfigError::EnvScan { .. }));
        assert!(err.to_string().contains("SPACEBIN_SERVER_HOST"));
    }

    #[cfg(unix)]
    #[test]
    fn test_unrelated_non_unicode_is_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let provider = EnvProvider::from_vars(
            ENV_PREFIX,
            vec![
                (OsString::from_vec(vec![0x58, 0xff]), OsString::from("x")),
                (OsString::from("SPACEBIN_SERVER_PORT"), OsString::from("1")),
            ],
        );

        assert_eq!(provider.read().unwrap().len(), 1);
    }
}
