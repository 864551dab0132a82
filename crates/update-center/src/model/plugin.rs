use super::release::{Release, Visibility};
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map;
use update_center_core::{Result, UpdateCenterError, Version};

/// A plugin of the update center and its releases, ordered by version.
///
/// `parent` is a key reference to the plugin leading this plugin's family;
/// resolve it with [`crate::Catalog::parent_of`].
///
/// # Examples
///
/// ```
/// use update_center::{Plugin, Release};
/// use update_center_core::Version;
///
/// let plugin = Plugin::new("clirr")
///     .with_name("Clirr")
///     .with_release(Release::new("clirr", Version::parse("1.1")))
///     .with_release(Release::new("clirr", Version::parse("1.0")));
///
/// assert_eq!(plugin.display_name(), "Clirr");
/// assert_eq!(plugin.last_release().unwrap().version().as_str(), "1.1");
/// assert!(plugin.release(&Version::parse("2.0")).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    homepage_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issue_tracker_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    organization_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    terms_conditions_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    license: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    developers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sources_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
    supported_by_sonarsource: bool,
    releases: BTreeMap<Version, Release>,
}

impl Plugin {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: None,
            description: None,
            category: None,
            homepage_url: None,
            issue_tracker_url: None,
            organization: None,
            organization_url: None,
            terms_conditions_url: None,
            license: None,
            developers: Vec::new(),
            sources_url: None,
            parent: None,
            supported_by_sonarsource: false,
            releases: BTreeMap::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_homepage_url(mut self, url: impl Into<String>) -> Self {
        self.homepage_url = Some(url.into());
        self
    }

    pub fn with_issue_tracker_url(mut self, url: impl Into<String>) -> Self {
        self.issue_tracker_url = Some(url.into());
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_organization_url(mut self, url: impl Into<String>) -> Self {
        self.organization_url = Some(url.into());
        self
    }

    pub fn with_terms_conditions_url(mut self, url: impl Into<String>) -> Self {
        self.terms_conditions_url = Some(url.into());
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = Some(license.into());
        self
    }

    pub fn with_developers(mut self, developers: impl IntoIterator<Item = String>) -> Self {
        self.developers = developers.into_iter().collect();
        self
    }

    pub fn with_sources_url(mut self, url: impl Into<String>) -> Self {
        self.sources_url = Some(url.into());
        self
    }

    pub fn with_parent(mut self, parent_key: impl Into<String>) -> Self {
        self.parent = Some(parent_key.into());
        self
    }

    pub fn with_supported_by_sonarsource(mut self, supported: bool) -> Self {
        self.supported_by_sonarsource = supported;
        self
    }

    /// Adds a release, replacing any release with the same version.
    pub fn with_release(mut self, release: Release) -> Self {
        self.releases.insert(release.version().clone(), release);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name for messages: the declared name, or the key when unnamed.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.key)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn homepage_url(&self) -> Option<&str> {
        self.homepage_url.as_deref()
    }

    pub fn issue_tracker_url(&self) -> Option<&str> {
        self.issue_tracker_url.as_deref()
    }

    pub fn organization(&self) -> Option<&str> {
        self.organization.as_deref()
    }

    pub fn organization_url(&self) -> Option<&str> {
        self.organization_url.as_deref()
    }

    pub fn terms_conditions_url(&self) -> Option<&str> {
        self.terms_conditions_url.as_deref()
    }

    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    pub fn developers(&self) -> &[String] {
        &self.developers
    }

    pub fn sources_url(&self) -> Option<&str> {
        self.sources_url.as_deref()
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn is_supported_by_sonarsource(&self) -> bool {
        self.supported_by_sonarsource
    }

    /// All loaded versions, ascending.
    pub fn versions(&self) -> btree_map::Keys<'_, Version, Release> {
        self.releases.keys()
    }

    /// All loaded releases, ascending by version.
    pub fn releases(&self) -> btree_map::Values<'_, Version, Release> {
        self.releases.values()
    }

    pub fn has_releases(&self) -> bool {
        !self.releases.is_empty()
    }

    /// Looks up a release by version.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateCenterError::ReleaseNotFound`] when this plugin has no
    /// such release in the loaded catalog.
    pub fn release(&self, version: &Version) -> Result<&Release> {
        self.releases.get(version).ok_or_else(|| {
            UpdateCenterError::release_not_found(format!("plugin {}", self.key), version.as_str())
        })
    }

    fn releases_in(&self, visibility: Visibility) -> impl DoubleEndedIterator<Item = &Release> {
        self.releases
            .values()
            .filter(move |release| release.visibility() == visibility)
    }

    pub fn public_releases(&self) -> Vec<&Release> {
        self.releases_in(Visibility::Public).collect()
    }

    pub fn public_versions(&self) -> Vec<&Version> {
        self.releases_in(Visibility::Public)
            .map(Release::version)
            .collect()
    }

    pub fn private_releases(&self) -> Vec<&Release> {
        self.releases_in(Visibility::Private).collect()
    }

    pub fn private_versions(&self) -> Vec<&Version> {
        self.releases_in(Visibility::Private)
            .map(Release::version)
            .collect()
    }

    pub fn archived_releases(&self) -> Vec<&Release> {
        self.releases_in(Visibility::Archived).collect()
    }

    pub fn archived_versions(&self) -> Vec<&Version> {
        self.releases_in(Visibility::Archived)
            .map(Release::version)
            .collect()
    }

    /// The development release; only present in catalogs loaded in DEV mode.
    pub fn dev_release(&self) -> Option<&Release> {
        self.releases_in(Visibility::Development).next()
    }

    pub fn last_release(&self) -> Option<&Release> {
        self.releases.values().next_back()
    }

    pub fn last_public_release(&self) -> Option<&Release> {
        self.releases_in(Visibility::Public).next_back()
    }

    /// The public release compatible with `sonar_version`, if any.
    pub fn public_release_for_sonar(&self, sonar_version: &Version) -> Option<&Release> {
        self.releases_in(Visibility::Public)
            .rev()
            .find(|release| release.supports_sonar(sonar_version))
    }
}
