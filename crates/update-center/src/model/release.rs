use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use update_center_core::Version;

/// Visibility tier of a release.
///
/// Tiers are mutually exclusive. When several apply, the first one listed
/// wins: development, archived, private, public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Visible release with at least one compatible released product version
    Public,
    /// Explicitly archived release
    Archived,
    /// Declared private, or only compatible with the product development version
    Private,
    /// Snapshot or declared development release, loaded in DEV mode only
    Development,
}

/// Outgoing dependency edge: the owning release requires `plugin_key` at
/// `version`.
///
/// Edges are plain key references; [`crate::Catalog::resolve_dependency`]
/// turns them into the target release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Dependency {
    plugin_key: String,
    version: Version,
}

impl Dependency {
    pub fn new(plugin_key: impl Into<String>, version: Version) -> Self {
        Self {
            plugin_key: plugin_key.into(),
            version,
        }
    }

    /// Parses a `key:version` token.
    ///
    /// # Examples
    ///
    /// ```
    /// use update_center::Dependency;
    ///
    /// let dep = Dependency::parse(" foo : 1.0 ").unwrap();
    /// assert_eq!(dep.plugin_key(), "foo");
    /// assert_eq!(dep.version().as_str(), "1.0");
    /// assert!(Dependency::parse("foo").is_none());
    /// ```
    pub fn parse(token: &str) -> Option<Self> {
        let (key, version) = token.split_once(':')?;
        let (key, version) = (key.trim(), version.trim());
        if key.is_empty() || version.is_empty() {
            return None;
        }
        Some(Self::new(key, Version::parse(version)))
    }

    pub fn plugin_key(&self) -> &str {
        &self.plugin_key
    }

    pub fn version(&self) -> &Version {
        &self.version
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.plugin_key, self.version)
    }
}

/// A release of a plugin or of the product.
///
/// Built with the `with_*` setters during deserialization; read-only once
/// it belongs to a [`crate::Catalog`].
///
/// # Examples
///
/// ```
/// use update_center::{Release, Visibility};
/// use update_center_core::Version;
///
/// let release = Release::new("clirr", Version::parse("1.0"))
///     .with_download_url("http://dist.sonar-plugins.codehaus.org/clirr-1.0.jar")
///     .with_sonar_version(Version::parse("2.2"));
///
/// assert_eq!(release.visibility(), Visibility::Public);
/// assert!(release.supports_sonar(&Version::parse("2.2")));
/// assert_eq!(release.minimum_sonar_version().unwrap().as_str(), "2.2");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    artifact_key: String,
    version: Version,
    #[serde(skip_serializing_if = "Option::is_none")]
    download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    changelog_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date: Option<String>,
    archived: bool,
    visibility: Visibility,
    sonar_versions: BTreeSet<Version>,
    dependencies: Vec<Dependency>,
}

impl Release {
    pub fn new(artifact_key: impl Into<String>, version: Version) -> Self {
        Self {
            artifact_key: artifact_key.into(),
            version,
            download_url: None,
            changelog_url: None,
            description: None,
            date: None,
            archived: false,
            visibility: Visibility::Public,
            sonar_versions: BTreeSet::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    pub fn with_changelog_url(mut self, url: impl Into<String>) -> Self {
        self.changelog_url = Some(url.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Sets the archived flag; a public release becomes archived and an
    /// archived release becomes public again when the flag is cleared.
    pub fn with_archived(mut self, archived: bool) -> Self {
        self.archived = archived;
        self.visibility = match (self.visibility, archived) {
            (Visibility::Public, true) => Visibility::Archived,
            (Visibility::Archived, false) => Visibility::Public,
            (other, _) => other,
        };
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        if visibility == Visibility::Archived {
            self.archived = true;
        }
        self.visibility = visibility;
        self
    }

    pub fn with_sonar_version(mut self, version: Version) -> Self {
        self.sonar_versions.insert(version);
        self
    }

    pub fn with_sonar_versions(mut self, versions: impl IntoIterator<Item = Version>) -> Self {
        self.sonar_versions.extend(versions);
        self
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    /// Key of the owning plugin, or `sonar` for product releases.
    pub fn artifact_key(&self) -> &str {
        &self.artifact_key
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn download_url(&self) -> Option<&str> {
        self.download_url.as_deref()
    }

    pub fn changelog_url(&self) -> Option<&str> {
        self.changelog_url.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn is_archived(&self) -> bool {
        self.archived
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Resolved product versions this release is compatible with.
    pub fn sonar_versions(&self) -> &BTreeSet<Version> {
        &self.sonar_versions
    }

    pub fn minimum_sonar_version(&self) -> Option<&Version> {
        self.sonar_versions.first()
    }

    pub fn last_sonar_version(&self) -> Option<&Version> {
        self.sonar_versions.last()
    }

    pub fn supports_sonar(&self, version: &Version) -> bool {
        self.sonar_versions.contains(version)
    }

    /// Outgoing dependency edges, in declaration order.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }
}
