//! Deserialization of update centers split over several files.

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use update_center::{Deserializer, FsLocator, SourceLocator, Supplement};
use update_center::loader::read_properties;
use update_center_core::{Mode, PropertyMap, Version};

fn split_fixture(dir: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/split")
        .join(dir)
        .join("update-center.properties")
}

fn v(text: &str) -> Version {
    Version::parse(text)
}

fn texts(versions: Vec<&Version>) -> Vec<&str> {
    versions.into_iter().map(Version::as_str).collect()
}

#[test]
fn test_load_split_format_in_dev_mode() {
    let catalog = Deserializer::with_mode(Mode::Dev, false)
        .from_many_files(&split_fixture("nominal"))
        .unwrap();

    let sonar = catalog.sonar();
    assert_eq!(sonar.lts_release().unwrap().version(), &v("3.7.1"));
    assert_eq!(sonar.dev_version(), Some(&v("4.1")));

    let abap = catalog.find_plugin("abap").unwrap();
    assert_eq!(abap.dev_release().unwrap().version(), &v("2.2.1-SNAPSHOT"));
    assert_eq!(
        abap.issue_tracker_url(),
        Some("http://issue.tracker.url/from/properties/file")
    );

    let php = catalog.find_plugin("php").unwrap();
    assert!(php.is_supported_by_sonarsource());
    assert_eq!(php.dev_release().unwrap().version(), &v("2.3-SNAPSHOT"));
    assert_eq!(texts(php.public_versions()), vec!["2.1", "2.2"]);
    assert_eq!(texts(php.private_versions()), vec!["2.2.1"]);
    assert_eq!(texts(php.archived_versions()), vec!["2.0"]);

    let ssqv = catalog.find_plugin("ssqv").unwrap();
    assert_eq!(ssqv.dev_release().unwrap().version(), &v("1.1-SNAPSHOT"));
    assert_eq!(texts(ssqv.public_versions()), vec!["1.0", "1.1"]);
}

#[test]
fn test_load_split_format_in_prod_mode() {
    let catalog = Deserializer::with_mode(Mode::Prod, false)
        .from_many_files(&split_fixture("nominal"))
        .unwrap();

    assert_eq!(
        catalog.sonar().lts_release().unwrap().version(),
        &v("3.7.1")
    );
    assert!(catalog.sonar().dev_release().is_none());
    for key in ["abap", "php", "ssqv"] {
        assert!(catalog.find_plugin(key).unwrap().dev_release().is_none());
    }

    let ssqv = catalog.find_plugin("ssqv").unwrap();
    assert_eq!(texts(ssqv.public_versions()), vec!["1.0", "1.1"]);

    let required = ssqv.release(&v("1.0")).unwrap().sonar_versions();
    assert_eq!(required.len(), 1);
    assert_eq!(required.first(), Some(&v("3.7")));

    let required = ssqv.release(&v("1.1")).unwrap().sonar_versions();
    assert_eq!(required.len(), 1);
    assert_eq!(required.first(), Some(&v("4.0")));

    let php = catalog.find_plugin("php").unwrap();
    assert!(php.private_versions().is_empty());
}

#[test]
fn test_split_format_cascades_changelog() {
    let catalog = Deserializer::with_mode(Mode::Dev, false)
        .from_many_files(&split_fixture("nominal"))
        .unwrap();

    let php = catalog.find_plugin("php").unwrap();
    assert_eq!(
        php.release(&v("2.1")).unwrap().changelog_url(),
        Some("http://jira.codehaus.org/php")
    );
    assert_eq!(
        php.release(&v("2.2.1")).unwrap().changelog_url(),
        Some("http://jira.codehaus.org/php-2.2")
    );
    assert_eq!(
        catalog.sonar().release(&v("4.0")).unwrap().changelog_url(),
        Some("http://www.sonarsource.org/changelog")
    );
}

#[test]
fn test_latest_on_latest_plugin_version_and_on_private_version_prod() {
    let catalog = Deserializer::with_mode(Mode::Prod, false)
        .from_many_files(&split_fixture("latest-on-latest-release"))
        .unwrap();

    let foo = catalog.find_plugin("foo").unwrap();
    assert_eq!(texts(foo.public_versions()), vec!["1.0", "1.1"]);
}

#[test]
fn test_latest_on_latest_plugin_version_and_on_private_version_dev() {
    let catalog = Deserializer::with_mode(Mode::Dev, false)
        .from_many_files(&split_fixture("latest-on-latest-release"))
        .unwrap();

    let foo = catalog.find_plugin("foo").unwrap();
    assert_eq!(texts(foo.public_versions()), vec!["1.0", "1.1"]);
    assert_eq!(texts(foo.private_versions()), vec!["1.2"]);
}

#[test]
fn test_latest_on_older_plugin_version_fails() {
    let err = Deserializer::with_mode(Mode::Prod, false)
        .from_many_files(&split_fixture("latest-on-older-release"))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Only the latest release of plugin foo may depend on LATEST SonarQube"
    );
}

#[test]
fn test_from_split_with_in_memory_supplements() {
    let root = PropertyMap::parse("sonar.versions=1.0\nplugins=foo\nfoo.versions=0.1\n").unwrap();
    let supplements = vec![
        Supplement::new("sonar", PropertyMap::parse("versions=1.1\n").unwrap()),
        Supplement::new(
            "foo",
            PropertyMap::parse("versions=0.2\n0.2.requiredSonarVersions=1.1\n").unwrap(),
        ),
    ];

    let catalog = Deserializer::with_mode(Mode::Prod, false)
        .from_split(&root, &supplements)
        .unwrap();

    assert_eq!(catalog.sonar().versions().count(), 2);
    let foo = catalog.find_plugin("foo").unwrap();
    assert_eq!(texts(foo.public_versions()), vec!["0.1", "0.2"]);
}

#[test]
fn test_split_format_from_temp_dir() {
    let temp_dir = TempDir::new().unwrap();
    let root_file = temp_dir.path().join("update-center.properties");
    fs::write(&root_file, "plugins=bar\n").unwrap();
    fs::write(temp_dir.path().join("sonar.properties"), "versions=5.0,5.1\n").unwrap();
    fs::write(
        temp_dir.path().join("bar.properties"),
        "name=Bar\nversions=1.0\n1.0.requiredSonarVersions=[5.0,LATEST]\n",
    )
    .unwrap();

    let root = read_properties(&root_file).unwrap();
    let supplements = FsLocator::for_root_file(&root_file).locate(&root).unwrap();
    assert_eq!(supplements.len(), 2);

    let catalog = Deserializer::with_mode(Mode::Prod, false)
        .from_many_files(&root_file)
        .unwrap();
    let bar = catalog.find_plugin("bar").unwrap();
    assert_eq!(bar.display_name(), "Bar");
    assert_eq!(bar.release(&v("1.0")).unwrap().sonar_versions().len(), 2);
}
