//! Dotted release identifiers with qualifier-aware ordering.
//!
//! Versions in the update center are not semver: the product ships `2.7.1`
//! next to `2.8`, plugins publish `1.2-SNAPSHOT` or `4.0-RC1`. Parsing never
//! fails; any text becomes a comparable value.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Qualifier marking a development (snapshot) build.
pub const SNAPSHOT_QUALIFIER: &str = "SNAPSHOT";

/// One dot-separated component of a version.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Numeric(u64),
    Text(String),
}

impl Segment {
    fn parse(text: &str) -> Self {
        text.parse::<u64>()
            .map_or_else(|_| Self::Text(text.to_string()), Self::Numeric)
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Numeric(a), Self::Numeric(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Numeric(_), Self::Text(_)) => Ordering::Less,
            (Self::Text(_), Self::Numeric(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

static ZERO: Segment = Segment::Numeric(0);

/// An immutable, totally ordered release identifier.
///
/// The text before the first `-` is split on `.` into segments; the text
/// after it is the qualifier. Ordering rules:
///
/// - segments compare pairwise, numerically when both are numbers, lexically
///   otherwise, a number sorting before text; missing trailing segments count
///   as `0`
/// - a qualified version sorts immediately before the same unqualified one
/// - remaining ties fall back to the segment count and then the text, so the
///   order agrees with equality
///
/// Two versions are equal iff their trimmed texts are equal.
///
/// # Examples
///
/// ```
/// use update_center_core::Version;
///
/// let rc = Version::parse("2.7-RC1");
/// let ga = Version::parse(" 2.7 ");
/// assert!(rc < ga);
/// assert!(ga < Version::parse("2.7.1"));
/// assert!(Version::parse("2.10") > Version::parse("2.9"));
/// assert_eq!(ga.to_string(), "2.7");
/// ```
#[derive(Debug, Clone)]
pub struct Version {
    text: String,
    segments: Vec<Segment>,
    qualifier: Option<Segment>,
}

impl Version {
    /// Parses a version. Never fails; surrounding whitespace is trimmed.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let (release, qualifier) = match text.split_once('-') {
            Some((release, qualifier)) => (release, Some(Segment::parse(qualifier))),
            None => (text, None),
        };
        let segments = if release.is_empty() {
            Vec::new()
        } else {
            release.split('.').map(Segment::parse).collect()
        };

        Self {
            text: text.to_string(),
            segments,
            qualifier,
        }
    }

    /// Canonical text of this version.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Text before the qualifier, e.g. `1.2` for `1.2-SNAPSHOT`.
    pub fn release_part(&self) -> &str {
        self.text
            .split_once('-')
            .map_or(self.text.as_str(), |(release, _)| release)
    }

    /// Qualifier text, e.g. `RC1` for `4.0-RC1`.
    pub fn qualifier(&self) -> Option<&str> {
        self.text.split_once('-').map(|(_, qualifier)| qualifier)
    }

    /// Number of dot-separated segments before the qualifier.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Whether the qualifier marks a development build (`SNAPSHOT`, any case).
    pub fn is_snapshot(&self) -> bool {
        self.qualifier()
            .is_some_and(|q| q.eq_ignore_ascii_case(SNAPSHOT_QUALIFIER))
    }

    fn compare_segments(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        for i in 0..len {
            let a = self.segments.get(i).unwrap_or(&ZERO);
            let b = other.segments.get(i).unwrap_or(&ZERO);
            match a.cmp(b) {
                Ordering::Equal => {}
                non_eq => return non_eq,
            }
        }
        Ordering::Equal
    }

    fn compare_qualifiers(&self, other: &Self) -> Ordering {
        match (&self.qualifier, &other.qualifier) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(a), Some(b)) => a.cmp(b),
        }
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_segments(other)
            .then_with(|| self.compare_qualifiers(other))
            .then_with(|| self.segments.len().cmp(&other.segments.len()))
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Version {}

impl Hash for Version {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for Version {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for Version {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::parse(&text))
    }
}

/// Joins versions with commas, the list format of the properties namespace.
pub fn join_versions<'a>(versions: impl IntoIterator<Item = &'a Version>) -> String {
    versions
        .into_iter()
        .map(Version::as_str)
        .collect::<Vec<_>>()
        .join(",")
}
