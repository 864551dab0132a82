//! Product compatibility declarations and their resolution.
//!
//! A release declares the product versions it runs on with
//! `requiredSonarVersions`, a comma list mixing:
//!
//! - exact versions: `2.2`
//! - inclusive ranges: `[2.3,2.7.1]`
//! - open ranges up to the newest product version: `[2.4,LATEST]`
//! - a bare `LATEST`, the newest product version only
//!
//! and optionally with the `sonarVersionFrom` / `sonarVersionTo` pair, which
//! adds one more range. [`CompatibilityResolver`] expands a [`Declaration`]
//! against the known product versions into a sorted set.
//!
//! The product development version (`sonar.devVersion`) takes part in
//! resolution in DEV mode only; a declaration reaching it is recorded in
//! [`Resolution::references_dev`] either way.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use update_center_core::properties::split_list;
use update_center_core::{Mode, Version};

/// Sentinel standing for the newest product version.
pub const LATEST: &str = "LATEST";

static RANGE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[\s*([^\[\],]+?)\s*,\s*([^\[\],]+?)\s*\]$").unwrap());

fn is_latest(token: &str) -> bool {
    token.trim().eq_ignore_ascii_case(LATEST)
}

/// Upper bound of a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpperBound {
    Version(Version),
    Latest,
}

/// One item of a compatibility declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// A single product version
    Exact(Version),
    /// Every product version between the bounds, inclusive
    Range { from: Version, to: UpperBound },
    /// The newest product version
    Latest,
}

impl Requirement {
    /// Parses one list item.
    ///
    /// # Errors
    ///
    /// Returns the reason when the item uses brackets without being a
    /// well-formed `[from,to]` range, or puts `LATEST` as a lower bound.
    pub fn parse(item: &str) -> Result<Self, String> {
        let item = item.trim();
        if is_latest(item) {
            return Ok(Self::Latest);
        }

        if let Some(caps) = RANGE_PATTERN.captures(item) {
            let from = &caps[1];
            let to = &caps[2];
            if is_latest(from) {
                return Err(format!("{LATEST} cannot be the lower bound of '{item}'"));
            }
            return Ok(Self::range(from, to));
        }

        if item.contains(['[', ']']) {
            return Err(format!("expected [<from>,<to>] but got '{item}'"));
        }
        Ok(Self::Exact(Version::parse(item)))
    }

    fn range(from: &str, to: &str) -> Self {
        let to = if is_latest(to) {
            UpperBound::Latest
        } else {
            UpperBound::Version(Version::parse(to))
        };
        Self::Range {
            from: Version::parse(from),
            to,
        }
    }

    fn mentions_latest(&self) -> bool {
        matches!(
            self,
            Self::Latest
                | Self::Range {
                    to: UpperBound::Latest,
                    ..
                }
        )
    }
}

/// A parsed compatibility declaration, keeping the source text for messages.
///
/// # Examples
///
/// ```
/// use update_center::compatibility::{Declaration, Requirement};
///
/// let declaration = Declaration::parse("2.2, [2.3,2.6], LATEST").unwrap();
/// assert_eq!(declaration.requirements().len(), 3);
/// assert!(declaration.references_latest());
/// assert!(matches!(declaration.requirements()[2], Requirement::Latest));
///
/// assert!(Declaration::parse("[2.3").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Declaration {
    requirements: Vec<Requirement>,
    source: String,
}

impl Declaration {
    /// Parses a `requiredSonarVersions` value.
    ///
    /// # Errors
    ///
    /// Returns the reason of the first malformed item.
    pub fn parse(text: &str) -> Result<Self, String> {
        let requirements = split_list(text)
            .iter()
            .map(|item| Requirement::parse(item))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            requirements,
            source: text.trim().to_string(),
        })
    }

    /// Adds the `sonarVersionFrom` / `sonarVersionTo` range.
    ///
    /// # Errors
    ///
    /// Returns the reason when `from` is `LATEST`, as [`Requirement::parse`]
    /// does for the bracket form.
    pub fn with_range(mut self, from: &str, to: &str) -> Result<Self, String> {
        let range = format!("[{},{}]", from.trim(), to.trim());
        if is_latest(from) {
            return Err(format!("{LATEST} cannot be the lower bound of '{range}'"));
        }
        if self.source.is_empty() {
            self.source = range;
        } else {
            self.source = format!("{},{range}", self.source);
        }
        self.requirements.push(Requirement::range(from, to));
        Ok(self)
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Whether any item is bounded by `LATEST`.
    pub fn references_latest(&self) -> bool {
        self.requirements.iter().any(Requirement::mentions_latest)
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Outcome of resolving a [`Declaration`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    versions: BTreeSet<Version>,
    unknown: Vec<Version>,
    references_dev: bool,
    released: usize,
}

impl Resolution {
    /// Resolved product versions, ascending.
    pub fn versions(&self) -> &BTreeSet<Version> {
        &self.versions
    }

    pub fn into_versions(self) -> BTreeSet<Version> {
        self.versions
    }

    /// Explicit versions that are not known product versions.
    pub fn unknown(&self) -> &[Version] {
        &self.unknown
    }

    /// Whether the declaration reached the product development version,
    /// whatever the mode.
    pub fn references_dev(&self) -> bool {
        self.references_dev
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Whether the release runs on no released product version, only
    /// on the development version.
    pub fn is_dev_only(&self) -> bool {
        self.released == 0 && self.references_dev
    }
}

/// Expands declarations against the known product versions.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use update_center::compatibility::{CompatibilityResolver, Declaration};
/// use update_center_core::{Mode, Version};
///
/// let known: BTreeSet<Version> = ["2.2", "2.3", "2.4"].into_iter().map(Version::from).collect();
/// let dev = Version::parse("3.0");
///
/// let declaration = Declaration::parse("[2.3,LATEST]").unwrap();
///
/// let prod = CompatibilityResolver::new(&known, Some(&dev), Mode::Prod).resolve(&declaration);
/// assert_eq!(prod.versions().len(), 2);
///
/// let dev_mode = CompatibilityResolver::new(&known, Some(&dev), Mode::Dev).resolve(&declaration);
/// assert_eq!(dev_mode.versions().last(), Some(&dev));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityResolver<'a> {
    known: &'a BTreeSet<Version>,
    dev: Option<&'a Version>,
    mode: Mode,
}

impl<'a> CompatibilityResolver<'a> {
    pub fn new(known: &'a BTreeSet<Version>, dev: Option<&'a Version>, mode: Mode) -> Self {
        Self { known, dev, mode }
    }

    /// Resolves a declaration. Unknown explicit versions are logged and
    /// excluded; an absent declaration resolves to the empty set.
    pub fn resolve(&self, declaration: &Declaration) -> Resolution {
        let mut resolution = Resolution::default();

        for requirement in declaration.requirements() {
            match requirement {
                Requirement::Exact(version) => self.resolve_exact(version, &mut resolution),
                Requirement::Range { from, to } => {
                    let to = match to {
                        UpperBound::Version(to) => Some(to),
                        UpperBound::Latest => None,
                    };
                    self.resolve_range(from, to, &mut resolution);
                }
                Requirement::Latest => match self.known.last() {
                    Some(newest) => self.resolve_range(newest, None, &mut resolution),
                    None => self.reach_dev(&mut resolution),
                },
            }
        }

        resolution.released = resolution
            .versions
            .iter()
            .filter(|version| self.known.contains(*version))
            .count();
        resolution
    }

    fn resolve_exact(&self, version: &Version, resolution: &mut Resolution) {
        if self.known.contains(version) {
            resolution.versions.insert(version.clone());
        } else if self.dev == Some(version) {
            self.reach_dev(resolution);
        } else {
            tracing::warn!(
                version = %version,
                "Compatibility declared with unknown SonarQube version, ignoring it"
            );
            resolution.unknown.push(version.clone());
        }
    }

    /// Known versions within `[from, to]`; `to = None` stands for `LATEST`.
    fn resolve_range(&self, from: &Version, to: Option<&Version>, resolution: &mut Resolution) {
        match to {
            Some(to) if from > to => {
                tracing::warn!(from = %from, to = %to, "Empty SonarQube version range");
            }
            Some(to) => {
                resolution
                    .versions
                    .extend(self.known.range(from..=to).cloned());
                if self.dev.is_some_and(|dev| from <= dev && dev <= to) {
                    self.reach_dev(resolution);
                }
            }
            None => {
                resolution.versions.extend(self.known.range(from..).cloned());
                if self.dev.is_some_and(|dev| from <= dev) {
                    self.reach_dev(resolution);
                }
            }
        }
    }

    fn reach_dev(&self, resolution: &mut Resolution) {
        let Some(dev) = self.dev else {
            return;
        };
        resolution.references_dev = true;
        if self.mode.is_dev() {
            resolution.versions.insert(dev.clone());
        }
    }
}
