use super::release::Release;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map;
use update_center_core::{Result, UpdateCenterError, Version};

/// Artifact key of product releases.
pub const SONAR_KEY: &str = "sonar";

/// Display name of the product in messages.
pub const SONAR_NAME: &str = "SonarQube";

/// The product ("Sonar") release line.
///
/// # Examples
///
/// ```
/// use update_center::{Release, Sonar};
/// use update_center_core::Version;
///
/// let sonar = Sonar::new()
///     .with_release(Release::new("sonar", Version::parse("2.3")))
///     .with_release(Release::new("sonar", Version::parse("2.2")))
///     .with_lts_version(Version::parse("2.2"));
///
/// assert_eq!(sonar.lts_release().unwrap().version().as_str(), "2.2");
/// assert_eq!(sonar.last_release().unwrap().version().as_str(), "2.3");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sonar {
    releases: BTreeMap<Version, Release>,
    #[serde(skip_serializing_if = "Option::is_none")]
    lts_version: Option<Version>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dev_release: Option<Release>,
}

impl Sonar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_release(mut self, release: Release) -> Self {
        self.releases.insert(release.version().clone(), release);
        self
    }

    /// Marks a version as long-term support. Membership in the release line is
    /// checked by the deserializer.
    pub fn with_lts_version(mut self, version: Version) -> Self {
        self.lts_version = Some(version);
        self
    }

    pub fn with_dev_release(mut self, release: Release) -> Self {
        self.dev_release = Some(release);
        self
    }

    /// Released product versions, ascending.
    pub fn versions(&self) -> btree_map::Keys<'_, Version, Release> {
        self.releases.keys()
    }

    pub fn releases(&self) -> btree_map::Values<'_, Version, Release> {
        self.releases.values()
    }

    pub fn contains_version(&self, version: &Version) -> bool {
        self.releases.contains_key(version)
    }

    /// Looks up a released product version.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateCenterError::ReleaseNotFound`] for unknown versions.
    pub fn release(&self, version: &Version) -> Result<&Release> {
        self.releases
            .get(version)
            .ok_or_else(|| UpdateCenterError::release_not_found(SONAR_NAME, version.as_str()))
    }

    pub fn last_release(&self) -> Option<&Release> {
        self.releases.values().next_back()
    }

    pub fn lts_version(&self) -> Option<&Version> {
        self.lts_version.as_ref()
    }

    pub fn lts_release(&self) -> Option<&Release> {
        self.lts_version
            .as_ref()
            .and_then(|version| self.releases.get(version))
    }

    /// Development release; only present in catalogs loaded in DEV mode.
    pub fn dev_release(&self) -> Option<&Release> {
        self.dev_release.as_ref()
    }

    pub fn dev_version(&self) -> Option<&Version> {
        self.dev_release.as_ref().map(Release::version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(text: &str) -> Version {
        Version::parse(text)
    }

    #[test]
    fn test_versions_are_sorted() {
        let sonar = Sonar::new()
            .with_release(Release::new(SONAR_KEY, v("2.8")))
            .with_release(Release::new(SONAR_KEY, v("2.10")))
            .with_release(Release::new(SONAR_KEY, v("2.7.1")));
        let versions: Vec<&str> = sonar.versions().map(Version::as_str).collect();
        assert_eq!(versions, vec!["2.7.1", "2.8", "2.10"]);
    }

    #[test]
    fn test_release_lookup() {
        let sonar = Sonar::new().with_release(
            Release::new(SONAR_KEY, v("2.2"))
                .with_download_url("http://dist.sonar.codehaus.org/sonar-2.2.zip"),
        );
        assert_eq!(
            sonar.release(&v("2.2")).unwrap().download_url(),
            Some("http://dist.sonar.codehaus.org/sonar-2.2.zip")
        );
        let err = sonar.release(&v("2.3")).unwrap_err();
        assert_eq!(err.to_string(), "Unable to find release 2.3 of SonarQube");
    }

    #[test]
    fn test_dev_release() {
        let sonar = Sonar::new().with_dev_release(Release::new(SONAR_KEY, v("3.0")));
        assert_eq!(sonar.dev_version(), Some(&v("3.0")));
        assert!(!sonar.contains_version(&v("3.0")));
        assert!(sonar.lts_release().is_none());
    }
}
