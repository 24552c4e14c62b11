//! JSON Pointers for addressing inside schemas and rows
//!
//! Provides [`JsonPointer`] (RFC 6901) used as the `path`/`from` of schema
//! patches and as the machine-readable location of row values.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Segment under which object schemas keep their properties
pub const PROPERTIES: &str = "properties";

/// Segment under which array schemas keep their item schema
pub const ITEMS: &str = "items";

/// Pointer into a JSON document
///
/// Segments are stored unescaped; `~` and `/` are escaped only when the
/// pointer is rendered.
///
/// # Examples
/// - `["properties", "user"]` → `/properties/user`
/// - `["a", "0", "b"]` → `/a/0/b`
/// - `[]` → `` (whole document)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct JsonPointer(Vec<String>);

impl JsonPointer {
    /// Create pointer from unescaped segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Pointer to the whole document
    #[inline]
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Get path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Get number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if pointer addresses the whole document
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get parent pointer (if not root)
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Get last segment (if not root)
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Append a segment, returning new pointer
    #[inline]
    #[must_use]
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut new = self.clone();
        new.0.push(segment.into());
        new
    }

    /// Append a segment in place
    #[inline]
    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    /// Pointer to a property schema: `<self>/properties/<name>`
    #[inline]
    #[must_use]
    pub fn property(&self, name: impl Into<String>) -> Self {
        let mut new = self.child(PROPERTIES);
        new.0.push(name.into());
        new
    }

    /// Pointer to an item schema: `<self>/items`
    #[inline]
    #[must_use]
    pub fn items(&self) -> Self {
        self.child(ITEMS)
    }

    /// Check if this pointer is a prefix of another
    #[inline]
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        if self.0.len() > other.0.len() {
            return false;
        }
        self.0 == other.0[..self.0.len()]
    }

    /// Iterator over segments from root to leaf
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

/// Escape one segment per RFC 6901
#[must_use]
pub fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape_segment(segment: &str) -> Result<String, PointerError> {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                _ => return Err(PointerError::InvalidEscape(segment.to_string())),
            }
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

impl Display for JsonPointer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{}", escape_segment(segment))?;
        }
        Ok(())
    }
}

impl FromStr for JsonPointer {
    type Err = PointerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = s.strip_prefix('/') else {
            return Err(PointerError::MissingLeadingSlash(s.to_string()));
        };

        let segments = rest
            .split('/')
            .map(unescape_segment)
            .collect::<Result<_, _>>()?;
        Ok(Self(segments))
    }
}

impl From<Vec<String>> for JsonPointer {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl Serialize for JsonPointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for JsonPointer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors related to JSON pointers
#[derive(Debug, thiserror::Error)]
pub enum PointerError {
    /// Non-empty pointer not starting with `/`
    #[error("pointer '{0}' must start with '/'")]
    MissingLeadingSlash(String),

    /// `~` not followed by `0` or `1`
    #[error("invalid escape in segment '{0}'")]
    InvalidEscape(String),
}
