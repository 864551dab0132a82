//! Properties to [`Catalog`] deserialization.
//!
//! The deserializer reads a flat property namespace and builds a validated
//! catalog in a fixed order:
//!
//! 1. product versions, their metadata, the LTS version and the development
//!    version marker
//! 2. plugin metadata
//! 3. plugin releases: compatibility resolution and cascading defaults
//! 4. duplicate version detection
//! 5. plugin dependencies, checked against every loaded release
//! 6. visibility classification
//! 7. the public overlap check
//!
//! Any failure aborts the whole load; no partial catalog is returned. In
//! lenient mode (`ignore_errors`) overlapping public releases are logged
//! instead.
//!
//! # Cascading defaults
//!
//! `changelogUrl` and `archived` fold over an entity's releases in ascending
//! version order: a release without an explicit value takes the value of the
//! nearest preceding release that has one, then `<entity>.defaults.<field>`.

use crate::compatibility::{CompatibilityResolver, Declaration};
use crate::loader::{self, FsLocator, SourceLocator, Supplement};
use crate::model::{Catalog, Dependency, Plugin, Release, SONAR_KEY, SONAR_NAME, Sonar, Visibility};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::Path;
use update_center_core::{
    DeserializerConfig, Mode, PropertyMap, Result, UpdateCenterError, Version, join_versions,
};

/// Builds a [`Catalog`] from property namespaces.
///
/// # Examples
///
/// ```
/// use update_center::Deserializer;
/// use update_center_core::{Mode, PropertyMap, Version};
///
/// let props = PropertyMap::parse(
///     "sonar.versions=2.2,2.3\n\
///      plugins=clirr\n\
///      clirr.name=Clirr\n\
///      clirr.versions=1.0\n\
///      clirr.1.0.requiredSonarVersions=[2.2,LATEST]\n",
/// )
/// .unwrap();
///
/// let catalog = Deserializer::with_mode(Mode::Prod, false).from_properties(&props).unwrap();
/// let clirr = catalog.find_plugin("clirr").unwrap();
/// let release = clirr.release(&Version::parse("1.0")).unwrap();
/// assert_eq!(release.sonar_versions().len(), 2);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Deserializer {
    config: DeserializerConfig,
}

impl Deserializer {
    pub fn new(config: DeserializerConfig) -> Self {
        Self { config }
    }

    pub fn with_mode(mode: Mode, ignore_errors: bool) -> Self {
        Self::new(DeserializerConfig::new(mode, ignore_errors))
    }

    pub fn config(&self) -> &DeserializerConfig {
        &self.config
    }

    /// Deserializes a single namespace.
    ///
    /// # Errors
    ///
    /// Returns the first validation error met, in pipeline order.
    pub fn from_properties(&self, props: &PropertyMap) -> Result<Catalog> {
        tracing::debug!(
            mode = %self.config.mode,
            ignore_errors = self.config.ignore_errors,
            properties = props.len(),
            "Deserializing update center"
        );
        Load::new(props, self.config).run()
    }

    /// Deserializes a root namespace layered with supplements.
    pub fn from_split(&self, root: &PropertyMap, supplements: &[Supplement]) -> Result<Catalog> {
        self.from_properties(&loader::merge(root, supplements))
    }

    /// Deserializes a single `.properties` file.
    pub fn from_file(&self, path: &Path) -> Result<Catalog> {
        self.from_properties(&loader::read_properties(path)?)
    }

    /// Deserializes a split catalog: the root file at `path` plus the
    /// `sonar.properties` and `<plugin>.properties` files next to it.
    pub fn from_many_files(&self, path: &Path) -> Result<Catalog> {
        let root = loader::read_properties(path)?;
        let supplements = FsLocator::for_root_file(path).locate(&root)?;
        tracing::debug!(
            root = %path.display(),
            supplements = supplements.len(),
            "Loading split update center"
        );
        self.from_split(&root, &supplements)
    }
}

/// Folds an optional field over releases: explicit values replace the
/// running value, absent ones inherit it.
#[derive(Debug)]
struct Cascade<T> {
    current: Option<T>,
}

impl<T: Clone> Cascade<T> {
    fn seeded(default: Option<T>) -> Self {
        Self { current: default }
    }

    fn next(&mut self, explicit: Option<T>) -> Option<T> {
        if explicit.is_some() {
            self.current = explicit;
        }
        self.current.clone()
    }
}

/// Tier a release is declared in, before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclaredTier {
    Public,
    Private,
    Archived,
    Development,
}

impl DeclaredTier {
    fn competes_for_latest(self) -> bool {
        matches!(self, Self::Public | Self::Archived)
    }
}

#[derive(Debug)]
struct StagedRelease {
    release: Release,
    tier: DeclaredTier,
    archived: bool,
    dev_only: bool,
}

#[derive(Debug)]
struct StagedPlugin {
    plugin: Plugin,
    releases: Vec<StagedRelease>,
}

/// One deserialization run.
struct Load<'a> {
    props: &'a PropertyMap,
    config: DeserializerConfig,
    known: BTreeSet<Version>,
    dev_version: Option<Version>,
    duplicates: Vec<UpdateCenterError>,
}

impl<'a> Load<'a> {
    fn new(props: &'a PropertyMap, config: DeserializerConfig) -> Self {
        Self {
            props,
            config,
            known: BTreeSet::new(),
            dev_version: None,
            duplicates: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Catalog> {
        let sonar = self.load_sonar()?;

        let mut staged = Vec::new();
        for key in self.plugin_keys() {
            let plugin = self.load_plugin_metadata(&key);
            staged.push(self.load_plugin_releases(plugin)?);
        }

        if let Some(duplicate) = self.duplicates.into_iter().next() {
            return Err(duplicate);
        }

        let universe: HashMap<String, BTreeSet<Version>> = staged
            .iter()
            .map(|staged| {
                let versions = staged
                    .releases
                    .iter()
                    .map(|r| r.release.version().clone())
                    .collect();
                (staged.plugin.key().to_string(), versions)
            })
            .collect();

        let mut plugins = Vec::with_capacity(staged.len());
        for staged_plugin in staged {
            let plugin = finish_plugin(self.props, staged_plugin, &universe)?;
            if !self.config.mode.is_dev() && !plugin.has_releases() {
                tracing::debug!(plugin = %plugin.key(), "Dropping plugin without releases");
                continue;
            }
            plugins.push(plugin);
        }

        for plugin in &plugins {
            check_public_overlap(plugin, self.config.ignore_errors)?;
        }

        tracing::debug!(
            sonar_versions = sonar.versions().len(),
            plugins = plugins.len(),
            "Update center loaded"
        );

        Ok(Catalog::new(sonar, plugins))
    }

    fn load_sonar(&mut self) -> Result<Sonar> {
        let props = self.props;
        let mut declared = props.get_list("sonar.versions");
        declared.extend(props.get_list("sonar.publicVersions"));

        for text in declared {
            let version = Version::parse(&text);
            if !self.known.insert(version.clone()) {
                self.duplicates
                    .push(UpdateCenterError::duplicate_version(SONAR_NAME, version.as_str()));
            }
        }

        self.dev_version = props.get("sonar.devVersion").map(Version::parse);

        let mut changelog = Cascade::seeded(props.get("sonar.defaults.changelogUrl"));
        let mut sonar = Sonar::new();
        for version in &self.known {
            sonar = sonar.with_release(sonar_release(props, version, &mut changelog));
        }

        if let Some(lts) = props.get("sonar.ltsVersion") {
            let lts = Version::parse(lts);
            if !self.known.contains(&lts) {
                return Err(UpdateCenterError::invalid_lts_version(lts.as_str()));
            }
            sonar = sonar.with_lts_version(lts);
        }

        if let Some(dev) = &self.dev_version {
            if self.config.mode.is_dev() {
                sonar = sonar.with_dev_release(sonar_release(props, dev, &mut changelog));
            }
        }

        tracing::debug!(
            versions = %join_versions(&self.known),
            lts = ?sonar.lts_version().map(Version::as_str),
            dev = ?self.dev_version.as_ref().map(Version::as_str),
            "Loaded SonarQube versions"
        );

        Ok(sonar)
    }

    fn plugin_keys(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut keys = Vec::new();
        for key in self.props.get_list("plugins") {
            if seen.insert(key.clone()) {
                keys.push(key);
            } else {
                tracing::warn!(plugin = %key, "Plugin declared twice, ignoring duplicate");
            }
        }
        keys
    }

    fn load_plugin_metadata(&self, key: &str) -> Plugin {
        let props = self.props;
        let field = |name: &str| props.get(&format!("{key}.{name}")).map(str::to_string);

        let mut plugin = Plugin::new(key)
            .with_developers(props.get_list(&format!("{key}.developers")))
            .with_supported_by_sonarsource(
                props
                    .get_bool(&format!("{key}.supportedBySonarSource"))
                    .unwrap_or(false),
            );

        if let Some(name) = field("name") {
            plugin = plugin.with_name(name);
        }
        if let Some(description) = field("description") {
            plugin = plugin.with_description(description);
        }
        if let Some(category) = field("category") {
            plugin = plugin.with_category(category);
        }
        if let Some(url) = field("homepageUrl") {
            plugin = plugin.with_homepage_url(url);
        }
        if let Some(url) = field("issueTrackerUrl") {
            plugin = plugin.with_issue_tracker_url(url);
        }
        if let Some(organization) = field("organization") {
            plugin = plugin.with_organization(organization);
        }
        if let Some(url) = field("organizationUrl") {
            plugin = plugin.with_organization_url(url);
        }
        if let Some(url) = field("termsConditionsUrl") {
            plugin = plugin.with_terms_conditions_url(url);
        }
        if let Some(license) = field("license") {
            plugin = plugin.with_license(license);
        }
        if let Some(url) = field("scm") {
            plugin = plugin.with_sources_url(url);
        }
        if let Some(parent) = field("parent") {
            plugin = plugin.with_parent(parent);
        }

        plugin
    }

    /// Collects the release lists of a plugin, recording duplicates.
    fn declared_releases(&mut self, key: &str) -> Result<BTreeMap<Version, DeclaredTier>> {
        let lists = [
            ("versions", DeclaredTier::Public),
            ("publicVersions", DeclaredTier::Public),
            ("privateVersions", DeclaredTier::Private),
            ("archivedVersions", DeclaredTier::Archived),
            ("devVersion", DeclaredTier::Development),
        ];

        let mut declared = BTreeMap::new();
        let mut dev: Option<Version> = None;

        for (list, tier) in lists {
            for text in self.props.get_list(&format!("{key}.{list}")) {
                let version = Version::parse(&text);
                let tier = if version.is_snapshot() {
                    DeclaredTier::Development
                } else {
                    tier
                };

                if declared.contains_key(&version) {
                    self.duplicates.push(UpdateCenterError::duplicate_version(
                        format!("plugin {key}"),
                        version.as_str(),
                    ));
                    continue;
                }

                if tier == DeclaredTier::Development {
                    if let Some(first) = &dev {
                        return Err(UpdateCenterError::MultipleDevVersions {
                            entity: format!("plugin {key}"),
                            first: first.to_string(),
                            second: version.to_string(),
                        });
                    }
                    dev = Some(version.clone());
                }

                declared.insert(version, tier);
            }
        }

        Ok(declared)
    }

    fn load_plugin_releases(&mut self, plugin: Plugin) -> Result<StagedPlugin> {
        let key = plugin.key().to_string();
        let declared = self.declared_releases(&key)?;
        let props = self.props;
        let mode = self.config.mode;

        let latest = declared
            .iter()
            .filter(|(_, tier)| tier.competes_for_latest())
            .map(|(version, _)| version)
            .next_back()
            .cloned();

        let resolver = CompatibilityResolver::new(&self.known, self.dev_version.as_ref(), mode);
        let mut changelog = Cascade::seeded(props.get(&format!("{key}.defaults.changelogUrl")));
        let mut archived = Cascade::seeded(props.get_bool(&format!("{key}.defaults.archived")));

        let mut releases = Vec::new();
        for (version, tier) in declared {
            let prefix = format!("{key}.{version}");
            let changelog_url = changelog.next(props.get(&format!("{prefix}.changelogUrl")));
            let is_archived = archived
                .next(props.get_bool(&format!("{prefix}.archived")))
                .unwrap_or(false);

            if !mode.is_dev() && matches!(tier, DeclaredTier::Private | DeclaredTier::Development) {
                tracing::debug!(plugin = %key, version = %version, ?tier, "Skipping release in PROD mode");
                continue;
            }

            let declaration = declaration(props, &key, &version)?;
            if declaration.references_latest()
                && tier.competes_for_latest()
                && latest.as_ref() != Some(&version)
            {
                return Err(UpdateCenterError::misplaced_latest(&key));
            }

            let resolution = resolver.resolve(&declaration);
            if !declaration.is_empty() && resolution.is_empty() && !resolution.references_dev() {
                return Err(UpdateCenterError::UnknownSonarVersions {
                    plugin: key.clone(),
                    release: version.to_string(),
                    declaration: declaration.to_string(),
                });
            }
            let dev_only = resolution.is_dev_only();
            if !mode.is_dev() && dev_only && !is_archived && tier != DeclaredTier::Archived {
                tracing::debug!(
                    plugin = %key,
                    version = %version,
                    "Skipping release only compatible with the development version"
                );
                continue;
            }

            let mut release = Release::new(&key, version.clone())
                .with_sonar_versions(resolution.into_versions());
            if let Some(url) = props.get(&format!("{prefix}.downloadUrl")) {
                release = release.with_download_url(url);
            }
            if let Some(url) = changelog_url {
                release = release.with_changelog_url(url);
            }
            if let Some(description) = props.get(&format!("{prefix}.description")) {
                release = release.with_description(description);
            }
            if let Some(date) = props.get(&format!("{prefix}.date")) {
                release = release.with_date(date);
            }

            releases.push(StagedRelease {
                release,
                tier,
                archived: is_archived,
                dev_only,
            });
        }

        tracing::debug!(plugin = %key, releases = releases.len(), "Loaded plugin releases");

        Ok(StagedPlugin { plugin, releases })
    }
}

fn sonar_release<'p>(
    props: &'p PropertyMap,
    version: &Version,
    changelog: &mut Cascade<&'p str>,
) -> Release {
    let prefix = format!("{SONAR_KEY}.{version}");
    let mut release = Release::new(SONAR_KEY, version.clone());
    if let Some(url) = props.get(&format!("{prefix}.downloadUrl")) {
        release = release.with_download_url(url);
    }
    if let Some(url) = changelog.next(props.get(&format!("{prefix}.changelogUrl"))) {
        release = release.with_changelog_url(url);
    }
    if let Some(description) = props.get(&format!("{prefix}.description")) {
        release = release.with_description(description);
    }
    if let Some(date) = props.get(&format!("{prefix}.date")) {
        release = release.with_date(date);
    }
    release
}

/// Reads the compatibility declaration of a plugin release.
fn declaration(props: &PropertyMap, key: &str, version: &Version) -> Result<Declaration> {
    let prefix = format!("{key}.{version}");
    let malformed =
        |reason: String| UpdateCenterError::malformed_compatibility(format!("plugin {key}"), version.as_str(), reason);

    let declaration = Declaration::parse(
        props
            .get(&format!("{prefix}.requiredSonarVersions"))
            .unwrap_or_default(),
    )
    .map_err(malformed)?;

    match (
        props.get(&format!("{prefix}.sonarVersionFrom")),
        props.get(&format!("{prefix}.sonarVersionTo")),
    ) {
        (Some(from), Some(to)) => declaration.with_range(from, to).map_err(malformed),
        (None, None) => Ok(declaration),
        _ => Err(malformed(
            "sonarVersionFrom and sonarVersionTo must be declared together".to_string(),
        )),
    }
}

/// Attaches dependencies and visibility to staged releases.
fn finish_plugin(
    props: &PropertyMap,
    staged: StagedPlugin,
    universe: &HashMap<String, BTreeSet<Version>>,
) -> Result<Plugin> {
    let StagedPlugin {
        mut plugin,
        releases,
    } = staged;
    let key = plugin.key().to_string();

    for staged_release in releases {
        let mut release = staged_release.release;
        let version = release.version().clone();

        for token in props.get_list(&format!("{key}.{version}.requirePlugins")) {
            let dependency = Dependency::parse(&token).ok_or_else(|| {
                UpdateCenterError::MalformedDependency {
                    plugin: key.clone(),
                    release: version.to_string(),
                    token: token.clone(),
                }
            })?;
            let exists = universe
                .get(dependency.plugin_key())
                .is_some_and(|versions| versions.contains(dependency.version()));
            if !exists {
                return Err(UpdateCenterError::UnresolvedDependency {
                    plugin: key.clone(),
                    release: version.to_string(),
                    required_plugin: dependency.plugin_key().to_string(),
                    required_version: dependency.version().to_string(),
                });
            }
            release = release.with_dependency(dependency);
        }

        let visibility = classify(
            staged_release.tier,
            staged_release.archived,
            staged_release.dev_only,
        );
        release = release
            .with_archived(staged_release.archived)
            .with_visibility(visibility);
        plugin = plugin.with_release(release);
    }

    Ok(plugin)
}

fn classify(tier: DeclaredTier, archived: bool, dev_only: bool) -> Visibility {
    match tier {
        DeclaredTier::Development => Visibility::Development,
        DeclaredTier::Archived => Visibility::Archived,
        _ if archived => Visibility::Archived,
        DeclaredTier::Private => Visibility::Private,
        DeclaredTier::Public if dev_only => Visibility::Private,
        DeclaredTier::Public => Visibility::Public,
    }
}

/// A product version may be claimed by at most one public release of a
/// plugin.
fn check_public_overlap(plugin: &Plugin, ignore_errors: bool) -> Result<()> {
    let mut claimed: HashMap<&Version, &Version> = HashMap::new();

    for release in plugin.public_releases() {
        for sonar_version in release.sonar_versions() {
            let Some(other) = claimed.insert(sonar_version, release.version()) else {
                continue;
            };
            let error = UpdateCenterError::OverlappingCompatibility {
                plugin_name: plugin.display_name().to_string(),
                sonar_version: sonar_version.to_string(),
                release: release.version().to_string(),
                other_release: other.to_string(),
            };
            if ignore_errors {
                tracing::warn!(plugin = %plugin.key(), "{error}");
            } else {
                return Err(error);
            }
        }
    }

    Ok(())
}
