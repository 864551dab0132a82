//! [`Catalog`] to properties projection.
//!
//! The output is readable by the [`crate::Deserializer`]. Release flags that
//! cascade on read (`archived`) are always written explicitly, so reading the
//! output back yields the same effective values.

use crate::model::{Catalog, Plugin, Release, SONAR_KEY, Sonar, Visibility};
use update_center_core::{PropertyMap, join_versions};

/// Writes catalogs as property namespaces.
///
/// # Examples
///
/// ```
/// use update_center::{Catalog, Plugin, Release, Serializer, Sonar};
/// use update_center_core::Version;
///
/// let catalog = Catalog::new(
///     Sonar::new().with_release(Release::new("sonar", Version::parse("2.0"))),
///     vec![Plugin::new("foo").with_name("Foo")],
/// );
///
/// let props = Serializer::to_properties(&catalog);
/// assert_eq!(props.get("sonar.versions"), Some("2.0"));
/// assert_eq!(props.get("foo.name"), Some("Foo"));
/// ```
pub struct Serializer;

impl Serializer {
    pub fn to_properties(catalog: &Catalog) -> PropertyMap {
        let mut props = PropertyMap::new();
        write_sonar(&mut props, catalog.sonar());

        props.insert_list("plugins", catalog.plugin_keys());
        for plugin in catalog.plugins() {
            write_plugin(&mut props, plugin);
        }

        tracing::debug!(properties = props.len(), "Serialized update center");
        props
    }

    /// Renders a catalog as `.properties` text.
    pub fn to_properties_string(catalog: &Catalog) -> String {
        Self::to_properties(catalog).to_text()
    }
}

fn write_sonar(props: &mut PropertyMap, sonar: &Sonar) {
    props.insert_list(format!("{SONAR_KEY}.versions"), sonar.versions().map(|v| v.as_str()));
    if let Some(lts) = sonar.lts_version() {
        props.insert(format!("{SONAR_KEY}.ltsVersion"), lts.as_str());
    }
    if let Some(dev) = sonar.dev_version() {
        props.insert(format!("{SONAR_KEY}.devVersion"), dev.as_str());
    }

    for release in sonar.releases().chain(sonar.dev_release()) {
        write_release_metadata(props, SONAR_KEY, release);
    }
}

fn write_plugin(props: &mut PropertyMap, plugin: &Plugin) {
    let key = plugin.key();
    let scalars = [
        ("name", plugin.name()),
        ("description", plugin.description()),
        ("category", plugin.category()),
        ("homepageUrl", plugin.homepage_url()),
        ("issueTrackerUrl", plugin.issue_tracker_url()),
        ("organization", plugin.organization()),
        ("organizationUrl", plugin.organization_url()),
        ("termsConditionsUrl", plugin.terms_conditions_url()),
        ("license", plugin.license()),
        ("scm", plugin.sources_url()),
        ("parent", plugin.parent()),
    ];
    for (field, value) in scalars {
        if let Some(value) = value {
            props.insert(format!("{key}.{field}"), value);
        }
    }
    props.insert_list(format!("{key}.developers"), plugin.developers());
    if plugin.is_supported_by_sonarsource() {
        props.insert(format!("{key}.supportedBySonarSource"), "true");
    }

    let visible = plugin
        .releases()
        .filter(|r| matches!(r.visibility(), Visibility::Public | Visibility::Archived))
        .map(Release::version);
    props.insert_list(format!("{key}.versions"), visible.map(|v| v.as_str()));
    props.insert_list(
        format!("{key}.privateVersions"),
        plugin.private_versions().into_iter().map(|v| v.as_str()),
    );
    if let Some(dev) = plugin.dev_release() {
        props.insert(format!("{key}.devVersion"), dev.version().as_str());
    }

    for release in plugin.releases() {
        write_release_metadata(props, key, release);
        let prefix = format!("{key}.{}", release.version());
        props.insert(
            format!("{prefix}.archived"),
            if release.is_archived() { "true" } else { "false" },
        );
        if !release.sonar_versions().is_empty() {
            props.insert(
                format!("{prefix}.requiredSonarVersions"),
                join_versions(release.sonar_versions()),
            );
        }
        props.insert_list(
            format!("{prefix}.requirePlugins"),
            release.dependencies().iter().map(ToString::to_string),
        );
    }
}

fn write_release_metadata(props: &mut PropertyMap, entity: &str, release: &Release) {
    let prefix = format!("{entity}.{}", release.version());
    let fields = [
        ("downloadUrl", release.download_url()),
        ("changelogUrl", release.changelog_url()),
        ("description", release.description()),
        ("date", release.date()),
    ];
    for (field, value) in fields {
        if let Some(value) = value {
            props.insert(format!("{prefix}.{field}"), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Dependency;
    use update_center_core::Version;

    fn v(text: &str) -> Version {
        Version::parse(text)
    }

    fn sample_catalog() -> Catalog {
        let sonar = Sonar::new()
            .with_release(Release::new(SONAR_KEY, v("2.0")))
            .with_release(
                Release::new(SONAR_KEY, v("2.1"))
                    .with_download_url("http://dist.sonar.codehaus.org/sonar-2.1.zip"),
            )
            .with_lts_version(v("2.0"));

        let foo = Plugin::new("foo")
            .with_name("Foo")
            .with_organization_url("http://www.sonarsource.org")
            .with_release(Release::new("foo", v("1.0")).with_sonar_version(v("2.0")));
        let bar = Plugin::new("bar")
            .with_parent("foo")
            .with_sources_url("scm:svn:https://svn.codehaus.org/sonar-plugins/bar-plugin-1.2")
            .with_developers(vec!["dev1".to_string(), "dev2".to_string()])
            .with_supported_by_sonarsource(true)
            .with_release(
                Release::new("bar", v("1.2"))
                    .with_sonar_versions([v("2.0"), v("2.1")])
                    .with_dependency(Dependency::new("foo", v("1.0"))),
            )
            .with_release(Release::new("bar", v("1.1")).with_archived(true))
            .with_release(Release::new("bar", v("1.3")).with_visibility(Visibility::Private));

        Catalog::new(sonar, vec![foo, bar])
    }

    #[test]
    fn test_sonar_keys() {
        let props = Serializer::to_properties(&sample_catalog());
        assert_eq!(props.get("sonar.versions"), Some("2.0,2.1"));
        assert_eq!(props.get("sonar.ltsVersion"), Some("2.0"));
        assert_eq!(
            props.get("sonar.2.1.downloadUrl"),
            Some("http://dist.sonar.codehaus.org/sonar-2.1.zip")
        );
        assert!(!props.contains_key("sonar.devVersion"));
    }

    #[test]
    fn test_plugin_keys() {
        let props = Serializer::to_properties(&sample_catalog());
        assert_eq!(props.get("plugins"), Some("foo,bar"));
        assert_eq!(props.get("foo.name"), Some("Foo"));
        assert_eq!(props.get("foo.organizationUrl"), Some("http://www.sonarsource.org"));
        assert!(!props.contains_key("foo.supportedBySonarSource"));

        assert_eq!(props.get("bar.parent"), Some("foo"));
        assert_eq!(
            props.get("bar.scm"),
            Some("scm:svn:https://svn.codehaus.org/sonar-plugins/bar-plugin-1.2")
        );
        assert_eq!(props.get("bar.developers"), Some("dev1,dev2"));
        assert_eq!(props.get("bar.supportedBySonarSource"), Some("true"));
    }

    #[test]
    fn test_release_lists_and_fields() {
        let props = Serializer::to_properties(&sample_catalog());
        assert_eq!(props.get("bar.versions"), Some("1.1,1.2"));
        assert_eq!(props.get("bar.privateVersions"), Some("1.3"));
        assert_eq!(props.get("bar.1.2.requiredSonarVersions"), Some("2.0,2.1"));
        assert_eq!(props.get("bar.1.2.requirePlugins"), Some("foo:1.0"));
        assert_eq!(props.get("bar.1.1.archived"), Some("true"));
        assert_eq!(props.get("bar.1.2.archived"), Some("false"));
        assert!(!props.contains_key("bar.1.1.requiredSonarVersions"));
    }

    #[test]
    fn test_properties_string() {
        let text = Serializer::to_properties_string(&sample_catalog());
        assert!(text.contains("plugins=foo,bar\n"));
        assert!(text.contains("sonar.versions=2.0,2.1\n"));
    }
}
