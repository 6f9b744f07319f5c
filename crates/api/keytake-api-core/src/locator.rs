//! Locator: the opaque property path a track drives.
//!
//! A locator is kept both as the original string and as its '/'-separated
//! segments. Segments are never interpreted here; resolvers own their meaning.
//!   "node1/Transform/x" -> segments=["node1","Transform","x"]
//!   "@uid/material/color" -> segments=["@uid","material","color"]

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    property: String,
    segments: Vec<String>,
}

impl Locator {
    /// Split a locator string into segments. Only the empty string is rejected.
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.is_empty() {
            return Err("empty locator".to_string());
        }
        Ok(Self {
            property: s.to_string(),
            segments: s.split('/').map(str::to_string).collect(),
        })
    }

    /// Build a locator from already-split segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        Self::parse(&segments.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.property
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn last_segment(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Return a copy with the final segment replaced.
    pub fn with_last_segment(&self, segment: &str) -> Self {
        let mut segments = self.segments.clone();
        if let Some(last) = segments.last_mut() {
            *last = segment.to_string();
        }
        Self {
            property: segments.join("/"),
            segments,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.property)
    }
}

impl FromStr for Locator {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locator::parse(s)
    }
}

// Serde support: serialize as string, deserialize from string
impl Serialize for Locator {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.property)
    }
}

impl<'de> Deserialize<'de> for Locator {
    fn deserialize<D>(deserializer: D) -> Result<Locator, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Locator::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_segments() {
        let l = Locator::parse("node1/Transform/x").unwrap();
        assert_eq!(l.segments(), &["node1", "Transform", "x"]);
        assert_eq!(l.to_string(), "node1/Transform/x");
        assert_eq!(l.last_segment(), Some("x"));
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(Locator::parse("").is_err());
    }

    #[test]
    fn replaces_last_segment() {
        let l = Locator::parse("bone/Transform/matrix").unwrap();
        let r = l.with_last_segment("data");
        assert_eq!(r.as_str(), "bone/Transform/data");
        assert_eq!(r, Locator::parse("bone/Transform/data").unwrap());
    }

    #[test]
    fn serde_as_plain_string() {
        let l = Locator::from_segments(["a", "b"]).unwrap();
        let json = serde_json::to_string(&l).unwrap();
        assert_eq!(json, "\"a/b\"");
        let back: Locator = serde_json::from_str(&json).unwrap();
        assert_eq!(back, l);
    }
}
