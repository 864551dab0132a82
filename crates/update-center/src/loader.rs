//! Split file format support.
//!
//! A catalog may be spread over several files: a root file listing the
//! plugins (and possibly everything else), plus one file per entity whose
//! keys are written without the entity prefix:
//!
//! ```text
//! update-center.properties    plugins=abap,php
//! sonar.properties            versions=3.7,3.7.1      -> sonar.versions
//! php.properties              publicVersions=2.1,2.2  -> php.publicVersions
//! ```
//!
//! [`SourceLocator`] finds the supplementary namespaces for a root namespace;
//! [`FsLocator`] looks for them next to the root file.

use std::path::{Path, PathBuf};
use update_center_core::{PropertyMap, Result, UpdateCenterError};

/// A namespace to layer under `prefix` on top of the root namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supplement {
    pub prefix: String,
    pub properties: PropertyMap,
}

impl Supplement {
    pub fn new(prefix: impl Into<String>, properties: PropertyMap) -> Self {
        Self {
            prefix: prefix.into(),
            properties,
        }
    }
}

/// Finds the supplementary namespaces of a root namespace.
pub trait SourceLocator {
    /// Returns the supplements to merge, in merge order.
    ///
    /// # Errors
    ///
    /// Fails when an existing source cannot be read or parsed.
    fn locate(&self, root: &PropertyMap) -> Result<Vec<Supplement>>;
}

/// Locates `<dir>/sonar.properties` and `<dir>/<plugin>.properties` for each
/// plugin listed in the root namespace. Missing files are skipped.
///
/// # Examples
///
/// ```no_run
/// use update_center::{FsLocator, SourceLocator};
/// use update_center::loader::read_properties;
/// use std::path::Path;
///
/// let root_file = Path::new("/data/update-center.properties");
/// let root = read_properties(root_file).unwrap();
/// let supplements = FsLocator::for_root_file(root_file).locate(&root).unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FsLocator {
    dir: PathBuf,
}

impl FsLocator {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Locator for the directory containing `path`.
    pub fn for_root_file(path: &Path) -> Self {
        Self::new(path.parent().unwrap_or_else(|| Path::new(".")))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load(&self, prefix: &str) -> Result<Option<Supplement>> {
        let path = self.dir.join(format!("{prefix}.properties"));
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "No supplementary file");
            return Ok(None);
        }
        tracing::debug!(path = %path.display(), prefix, "Loading supplementary file");
        let properties = read_properties(&path)?;
        Ok(Some(Supplement::new(prefix, properties)))
    }
}

impl SourceLocator for FsLocator {
    fn locate(&self, root: &PropertyMap) -> Result<Vec<Supplement>> {
        let mut prefixes = vec![crate::model::SONAR_KEY.to_string()];
        for key in root.get_list("plugins") {
            if !prefixes.contains(&key) {
                prefixes.push(key);
            }
        }

        let mut supplements = Vec::new();
        for prefix in &prefixes {
            if let Some(supplement) = self.load(prefix)? {
                supplements.push(supplement);
            }
        }
        Ok(supplements)
    }
}

/// Reads and parses a `.properties` file.
///
/// # Errors
///
/// Returns [`UpdateCenterError::Io`] when the file cannot be read and
/// [`UpdateCenterError::MalformedProperties`] when it cannot be parsed.
pub fn read_properties(path: &Path) -> Result<PropertyMap> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| UpdateCenterError::io(path.display().to_string(), e))?;
    PropertyMap::parse(&content)
}

/// Merges supplements into a copy of `root`: scalars override, list fields
/// are unioned.
pub fn merge(root: &PropertyMap, supplements: &[Supplement]) -> PropertyMap {
    let mut merged = root.clone();
    for supplement in supplements {
        merged.merge_prefixed(&supplement.prefix, &supplement.properties);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_locate_existing_files_only() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("sonar.properties"), "versions=3.7\n").unwrap();
        fs::write(temp_dir.path().join("php.properties"), "publicVersions=2.1\n").unwrap();

        let root = PropertyMap::parse("plugins=php,abap\n").unwrap();
        let supplements = FsLocator::new(temp_dir.path()).locate(&root).unwrap();

        let prefixes: Vec<&str> = supplements.iter().map(|s| s.prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["sonar", "php"]);
        assert_eq!(supplements[1].properties.get("publicVersions"), Some("2.1"));
    }

    #[test]
    fn test_for_root_file_uses_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let root_file = temp_dir.path().join("update-center.properties");
        let locator = FsLocator::for_root_file(&root_file);
        assert_eq!(locator.dir(), temp_dir.path());
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let err = read_properties(&temp_dir.path().join("missing.properties")).unwrap_err();
        assert!(matches!(err, UpdateCenterError::Io { .. }));
    }

    #[test]
    fn test_malformed_supplement_fails() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("php.properties"), "name=\\uZZZZ\n").unwrap();

        let root = PropertyMap::parse("plugins=php\n").unwrap();
        let err = FsLocator::new(temp_dir.path()).locate(&root).unwrap_err();
        assert!(matches!(err, UpdateCenterError::MalformedProperties { line: 1, .. }));
    }

    #[test]
    fn test_merge_overrides_scalars_and_unions_lists() {
        let root = PropertyMap::parse(
            "plugins=php\nphp.name=PHP\nphp.publicVersions=2.0\n",
        )
        .unwrap();
        let supplement = Supplement::new(
            "php",
            PropertyMap::parse("name=PHP Plugin\npublicVersions=2.0,2.1\n").unwrap(),
        );

        let merged = merge(&root, &[supplement]);
        assert_eq!(merged.get("php.name"), Some("PHP Plugin"));
        assert_eq!(merged.get_list("php.publicVersions"), vec!["2.0", "2.1"]);
    }
}
