use super::plugin::Plugin;
use super::release::{Dependency, Release};
use super::sonar::Sonar;
use serde::Serialize;
use std::collections::HashMap;
use update_center_core::{Result, UpdateCenterError, Version};

/// The validated update center: the product release line plus every plugin,
/// in declaration order.
///
/// A catalog is only handed out once deserialization succeeded and exposes
/// shared references only, so it can be freely shared between threads.
///
/// # Examples
///
/// ```
/// use update_center::{Catalog, Dependency, Plugin, Release, Sonar};
/// use update_center_core::Version;
///
/// let v = Version::parse;
/// let catalog = Catalog::new(
///     Sonar::new().with_release(Release::new("sonar", v("2.2"))),
///     vec![
///         Plugin::new("java").with_release(Release::new("java", v("1.0"))),
///         Plugin::new("clirr").with_parent("java").with_release(
///             Release::new("clirr", v("1.1")).with_dependency(Dependency::new("java", v("1.0"))),
///         ),
///     ],
/// );
///
/// assert_eq!(catalog.plugin_keys(), vec!["java", "clirr"]);
/// assert_eq!(catalog.children_of("java").len(), 1);
/// assert!(catalog.find_plugin("php").is_err());
/// ```
#[derive(Debug, Clone, Default, Serialize)]
pub struct Catalog {
    sonar: Sonar,
    plugins: Vec<Plugin>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog. When two plugins share a key, lookups return the
    /// first one.
    pub fn new(sonar: Sonar, plugins: Vec<Plugin>) -> Self {
        let mut index = HashMap::with_capacity(plugins.len());
        for (position, plugin) in plugins.iter().enumerate() {
            index.entry(plugin.key().to_string()).or_insert(position);
        }
        Self {
            sonar,
            plugins,
            index,
        }
    }

    pub fn sonar(&self) -> &Sonar {
        &self.sonar
    }

    /// Plugins in declaration order.
    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn plugin_keys(&self) -> Vec<&str> {
        self.plugins.iter().map(Plugin::key).collect()
    }

    pub fn contains_plugin(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Looks up a plugin by key.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateCenterError::PluginNotFound`] when no loaded plugin has
    /// this key.
    pub fn find_plugin(&self, key: &str) -> Result<&Plugin> {
        self.index
            .get(key)
            .map(|&position| &self.plugins[position])
            .ok_or_else(|| UpdateCenterError::plugin_not_found(key))
    }

    /// Plugins heading a family, i.e. without a parent.
    pub fn master_plugins(&self) -> Vec<&Plugin> {
        self.plugins
            .iter()
            .filter(|plugin| plugin.parent().is_none())
            .collect()
    }

    pub fn children_of(&self, key: &str) -> Vec<&Plugin> {
        self.plugins
            .iter()
            .filter(|plugin| plugin.parent() == Some(key))
            .collect()
    }

    /// Resolves the parent back-reference of `plugin`.
    ///
    /// # Errors
    ///
    /// Fails when the parent key names a plugin absent from the catalog.
    pub fn parent_of(&self, plugin: &Plugin) -> Result<Option<&Plugin>> {
        plugin
            .parent()
            .map(|key| self.find_plugin(key))
            .transpose()
    }

    /// Resolves a dependency edge to the release it points at.
    ///
    /// # Errors
    ///
    /// Fails when the target plugin or release is not loaded.
    pub fn resolve_dependency(&self, dependency: &Dependency) -> Result<&Release> {
        self.find_plugin(dependency.plugin_key())?
            .release(dependency.version())
    }

    /// Releases required by `release`, in declaration order.
    pub fn outgoing_dependencies(&self, release: &Release) -> Result<Vec<&Release>> {
        release
            .dependencies()
            .iter()
            .map(|dependency| self.resolve_dependency(dependency))
            .collect()
    }

    /// Releases requiring `version` of the plugin `plugin_key`.
    pub fn incoming_dependencies(&self, plugin_key: &str, version: &Version) -> Vec<(&Plugin, &Release)> {
        self.plugins
            .iter()
            .flat_map(|plugin| plugin.releases().map(move |release| (plugin, release)))
            .filter(|(_, release)| {
                release
                    .dependencies()
                    .iter()
                    .any(|dep| dep.plugin_key() == plugin_key && dep.version() == version)
            })
            .collect()
    }

    /// For each plugin, its public release compatible with `sonar_version`.
    pub fn compatible_releases(&self, sonar_version: &Version) -> Vec<(&Plugin, &Release)> {
        self.plugins
            .iter()
            .filter_map(|plugin| {
                plugin
                    .public_release_for_sonar(sonar_version)
                    .map(|release| (plugin, release))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Visibility;

    fn v(text: &str) -> Version {
        Version::parse(text)
    }

    fn sample_catalog() -> Catalog {
        let sonar = Sonar::new()
            .with_release(Release::new("sonar", v("2.2")))
            .with_release(Release::new("sonar", v("2.3")));

        let java = Plugin::new("java")
            .with_release(Release::new("java", v("1.0")).with_sonar_version(v("2.2")))
            .with_release(Release::new("java", v("1.1")).with_sonar_version(v("2.3")));
        let clirr = Plugin::new("clirr")
            .with_name("Clirr")
            .with_parent("java")
            .with_release(
                Release::new("clirr", v("1.0"))
                    .with_sonar_versions([v("2.2"), v("2.3")])
                    .with_dependency(Dependency::new("java", v("1.0"))),
            )
            .with_release(
                Release::new("clirr", v("1.1"))
                    .with_visibility(Visibility::Private)
                    .with_dependency(Dependency::new("java", v("1.1"))),
            );
        let orphan = Plugin::new("orphan").with_parent("missing");

        Catalog::new(sonar, vec![java, clirr, orphan])
    }

    #[test]
    fn test_find_plugin() {
        let catalog = sample_catalog();
        assert_eq!(catalog.find_plugin("clirr").unwrap().display_name(), "Clirr");
        assert!(catalog.contains_plugin("java"));

        let err = catalog.find_plugin("php").unwrap_err();
        assert_eq!(err.to_string(), "Unable to find plugin with key php");
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let catalog = sample_catalog();
        assert_eq!(catalog.plugin_keys(), vec!["java", "clirr", "orphan"]);
    }

    #[test]
    fn test_family_navigation() {
        let catalog = sample_catalog();
        let masters: Vec<&str> = catalog.master_plugins().iter().map(|p| p.key()).collect();
        assert_eq!(masters, vec!["java"]);

        let clirr = catalog.find_plugin("clirr").unwrap();
        assert_eq!(catalog.parent_of(clirr).unwrap().unwrap().key(), "java");

        let java = catalog.find_plugin("java").unwrap();
        assert!(catalog.parent_of(java).unwrap().is_none());

        let orphan = catalog.find_plugin("orphan").unwrap();
        assert!(catalog.parent_of(orphan).is_err());
    }

    #[test]
    fn test_dependency_navigation() {
        let catalog = sample_catalog();
        let clirr = catalog.find_plugin("clirr").unwrap();
        let release = clirr.release(&v("1.0")).unwrap();

        let targets = catalog.outgoing_dependencies(release).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].artifact_key(), "java");
        assert_eq!(targets[0].version(), &v("1.0"));

        let incoming = catalog.incoming_dependencies("java", &v("1.1"));
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].1.version(), &v("1.1"));
    }

    #[test]
    fn test_unresolvable_dependency() {
        let catalog = sample_catalog();
        let err = catalog
            .resolve_dependency(&Dependency::new("java", v("9.0")))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_compatible_releases() {
        let catalog = sample_catalog();
        let found: Vec<(&str, &str)> = catalog
            .compatible_releases(&v("2.3"))
            .into_iter()
            .map(|(plugin, release)| (plugin.key(), release.version().as_str()))
            .collect();
        assert_eq!(found, vec![("java", "1.1"), ("clirr", "1.0")]);
    }

    #[test]
    fn test_catalog_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Catalog>();
    }
}
