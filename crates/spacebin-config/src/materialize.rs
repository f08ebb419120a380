//! Typed lookups over a merged [`Store`].
//!
//! The [`Materializer`] is what schema types use to pull their fields out of
//! the store. Each accessor coerces the untyped value to the declared type
//! and fails with a [`ConfigError`] naming the key path when it cannot.

use std::time::Duration;

use crate::key::KeyPath;
use crate::store::{Store, Value};
use crate::ConfigError;

/// A closed set of string spellings mapped onto an enum.
pub trait ConfigEnum: Sized {
    /// Accepted spellings, for error messages.
    const ALLOWED: &'static [&'static str];

    /// Parse one spelling.
    fn from_config_str(s: &str) -> Option<Self>;

    /// Parse an integer representation, if the enum has one.
    fn from_config_int(_n: i64) -> Option<Self> {
        None
    }
}

/// Read-only, coercing view of a [`Store`].
#[derive(Debug, Clone, Copy)]
pub struct Materializer<'a> {
    store: &'a Store,
}

impl<'a> Materializer<'a> {
    /// Wrap a merged store.
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn store(&self) -> &'a Store {
        self.store
    }

    fn require(&self, path: &KeyPath) -> Result<&'a Value, ConfigError> {
        self.store
            .get(path)
            .ok_or_else(|| ConfigError::missing_key(path.to_string()))
    }

    /// Integer field of any width `T`.
    ///
    /// Accepts integers, whole floats and numeric strings.
    pub fn integer<T>(&self, path: &KeyPath) -> Result<T, ConfigError>
    where
        T: TryFrom<i64>,
    {
        let raw = self.require(path)?;
        let wide = to_i64(raw).ok_or_else(|| coercion(path, "integer", raw))?;
        T::try_from(wide).map_err(|_| {
            ConfigError::type_coercion(
                path.to_string(),
                "integer in range",
                wide.to_string(),
            )
        })
    }

    /// Boolean field. Strings must be `true` or `false`, in any case.
    pub fn boolean(&self, path: &KeyPath) -> Result<bool, ConfigError> {
        let raw = self.require(path)?;
        match raw {
            Value::Boolean(b) => Ok(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(coercion(path, "boolean", raw)),
        }
    }

    /// Duration field.
    ///
    /// Anything [`Materializer::integer`] would accept is milliseconds; other
    /// strings must be duration literals such as `5m` or `1h30m`.
    pub fn duration(&self, path: &KeyPath) -> Result<Duration, ConfigError> {
        let raw = self.require(path)?;
        let parsed = match (to_i64(raw), raw) {
            (Some(ms), _) => u64::try_from(ms).ok().map(Duration::from_millis),
            (None, Value::String(s)) => parse_duration(s).ok(),
            (None, _) => None,
        };
        parsed.ok_or_else(|| coercion(path, "duration", raw))
    }

    /// String field. Other scalars are rendered as text.
    pub fn string(&self, path: &KeyPath) -> Result<String, ConfigError> {
        let raw = self.require(path)?;
        to_string(raw).ok_or_else(|| coercion(path, "string", raw))
    }

    /// Optional string field; absent paths yield `None`.
    pub fn optional_string(&self, path: &KeyPath) -> Result<Option<String>, ConfigError> {
        if self.store.contains(path) {
            self.string(path).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Enumeration field.
    pub fn enumeration<E: ConfigEnum>(&self, path: &KeyPath) -> Result<E, ConfigError> {
        let raw = self.require(path)?;
        let parsed = match raw {
            Value::Integer(n) => E::from_config_int(*n),
            Value::String(s) => match s.trim().parse::<i64>() {
                Ok(n) => E::from_config_int(n),
                Err(_) => E::from_config_str(&s.trim().to_lowercase()),
            },
            _ => return Err(coercion(path, "string", raw)),
        };
        parsed.ok_or_else(|| {
            ConfigError::unknown_enum_value(path.to_string(), raw_text(raw), E::ALLOWED)
        })
    }

    /// Optional enumeration field; absent paths yield `None`.
    pub fn optional_enumeration<E: ConfigEnum>(
        &self,
        path: &KeyPath,
    ) -> Result<Option<E>, ConfigError> {
        if self.store.contains(path) {
            self.enumeration(path).map(Some)
        } else {
            Ok(None)
        }
    }
}

fn coercion(path: &KeyPath, expected: &'static str, raw: &Value) -> ConfigError {
    ConfigError::type_coercion(path.to_string(), expected, raw.to_string())
}

fn raw_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn to_i64(raw: &Value) -> Option<i64> {
    match raw {
        Value::Integer(n) => Some(*n),
        #[allow(clippy::cast_possible_truncation)]
        Value::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e18 => Some(*f as i64),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn to_string(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Integer(n) => Some(n.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}

/// Parse a duration literal such as `300ms`, `1.5s` or `1h30m`.
///
/// A literal is one or more `<number><unit>` terms; units are `ns`, `us`
/// (or `µs`), `ms`, `s`, `m` and `h`. A bare `0` is accepted. Negative
/// durations are rejected.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    let s = s.strip_prefix('+').unwrap_or(s);
    if s.starts_with('-') {
        return Err(format!("negative duration: {input}"));
    }

    let mut total_nanos: f64 = 0.0;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(format!("expected number in duration: {input}"));
        }
        let (number, tail) = rest.split_at(number_len);
        let value: f64 = number
            .parse()
            .map_err(|_| format!("invalid number {number:?} in duration: {input}"))?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, tail) = tail.split_at(unit_len);
        let scale = match unit {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60e9,
            "h" => 3600e9,
            "" => return Err(format!("missing unit in duration: {input}")),
            other => return Err(format!("unknown unit {other:?} in duration: {input}")),
        };

        total_nanos += value * scale;
        rest = tail;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(format!("duration out of range: {input}"));
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let nanos = total_nanos.round() as u64;
    Ok(Duration::from_nanos(nanos))
}
