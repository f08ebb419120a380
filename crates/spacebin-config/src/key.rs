//! Hierarchical key paths.

use std::fmt;

/// Delimiter joining key path segments in their external form.
pub const DELIMITER: char = '.';

/// A normalized, dot-delimited key path such as `server.ratelimits.duration`.
///
/// Segments are lowercased and empty segments are dropped on construction, so
/// `"Server..Port"` and `"server.port"` are the same path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Parse a key using the default `.` delimiter.
    pub fn parse(key: &str) -> Self {
        Self::parse_with(key, DELIMITER)
    }

    /// Parse a key split on `delimiter`.
    pub fn parse_with(key: &str, delimiter: char) -> Self {
        Self::from_segments(key.split(delimiter))
    }

    /// Build a key path from raw segments, normalizing each one.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = segments
            .into_iter()
            .map(|s| s.as_ref().trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        Self { segments }
    }

    /// The normalized segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// True when normalization left no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append one segment.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        let mut path = self.clone();
        path.segments.extend(Self::parse(segment).segments);
        path
    }

    /// True when `self` is `other` or lies beneath it.
    pub fn starts_with(&self, other: &KeyPath) -> bool {
        self.segments.starts_with(&other.segments)
    }

    /// The path with every underscore inside a segment also treated as a delimiter.
    ///
    /// `documents.max_age` becomes `documents.max.age`; this is the shape an
    /// environment variable name for that key takes after normalization.
    #[must_use]
    pub fn underscore_split(&self) -> Self {
        Self::from_segments(self.segments.iter().flat_map(|s| s.split('_')))
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{DELIMITER}")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl From<&str> for KeyPath {
    fn from(key: &str) -> Self {
        Self::parse(key)
    }
}
