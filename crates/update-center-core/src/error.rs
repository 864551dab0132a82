use thiserror::Error;

/// Error types for the update center.
///
/// Three families share this enum:
/// - **validation** errors abort a deserialization (duplicate versions, invalid
///   LTS, misplaced `LATEST`, overlapping public releases, ...)
/// - **lookup** errors are raised when a plugin or release is requested from a
///   finalized catalog and does not exist
/// - **input** errors cover malformed properties text, I/O and configuration
///
/// Use [`UpdateCenterError::is_validation`] and
/// [`UpdateCenterError::is_not_found`] to tell them apart.
///
/// # Examples
///
/// ```
/// use update_center_core::error::UpdateCenterError;
///
/// let error = UpdateCenterError::duplicate_version("plugin clirr", "1.1");
/// assert_eq!(error.to_string(), "Duplicate version for plugin clirr: 1.1");
/// assert!(error.is_validation());
/// ```
#[derive(Error, Debug)]
pub enum UpdateCenterError {
    #[error("ltsVersion seems wrong as it is not listed in SonarQube versions: {version}")]
    InvalidLtsVersion { version: String },

    #[error("Duplicate version for {entity}: {version}")]
    DuplicateVersion { entity: String, version: String },

    #[error("Only the latest release of plugin {plugin} may depend on LATEST SonarQube")]
    MisplacedLatest { plugin: String },

    #[error(
        "SQ version {sonar_version} is declared compatible with two public versions of {plugin_name} plugin: {release} and {other_release}"
    )]
    OverlappingCompatibility {
        plugin_name: String,
        sonar_version: String,
        release: String,
        other_release: String,
    },

    #[error(
        "Release {release} of plugin {plugin} declares compatibility with '{declaration}' but none of these versions is a known SonarQube version"
    )]
    UnknownSonarVersions {
        plugin: String,
        release: String,
        declaration: String,
    },

    #[error("Malformed Sonar version declaration for release {release} of {entity}: {reason}")]
    MalformedCompatibility {
        entity: String,
        release: String,
        reason: String,
    },

    #[error(
        "Malformed plugin dependency '{token}' on release {release} of plugin {plugin}, expected <key>:<version>"
    )]
    MalformedDependency {
        plugin: String,
        release: String,
        token: String,
    },

    #[error(
        "Release {release} of plugin {plugin} requires {required_plugin} {required_version}, which does not exist"
    )]
    UnresolvedDependency {
        plugin: String,
        release: String,
        required_plugin: String,
        required_version: String,
    },

    #[error("More than one development version for {entity}: {first} and {second}")]
    MultipleDevVersions {
        entity: String,
        first: String,
        second: String,
    },

    #[error("Unable to find plugin with key {key}")]
    PluginNotFound { key: String },

    #[error("Unable to find release {version} of {entity}")]
    ReleaseNotFound { entity: String, version: String },

    #[error("Malformed properties at line {line}: {reason}")]
    MalformedProperties { line: usize, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Convenience type alias for `Result<T, UpdateCenterError>`.
pub type Result<T> = std::result::Result<T, UpdateCenterError>;

impl UpdateCenterError {
    /// Whether this error is a catalog validation failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidLtsVersion { .. }
                | Self::DuplicateVersion { .. }
                | Self::MisplacedLatest { .. }
                | Self::OverlappingCompatibility { .. }
                | Self::UnknownSonarVersions { .. }
                | Self::MalformedCompatibility { .. }
                | Self::MalformedDependency { .. }
                | Self::UnresolvedDependency { .. }
                | Self::MultipleDevVersions { .. }
        )
    }

    /// Whether this error is a lookup on a finalized catalog.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::PluginNotFound { .. } | Self::ReleaseNotFound { .. }
        )
    }

    pub fn invalid_lts_version(version: impl Into<String>) -> Self {
        Self::InvalidLtsVersion {
            version: version.into(),
        }
    }

    pub fn duplicate_version(entity: impl Into<String>, version: impl Into<String>) -> Self {
        Self::DuplicateVersion {
            entity: entity.into(),
            version: version.into(),
        }
    }

    pub fn misplaced_latest(plugin: impl Into<String>) -> Self {
        Self::MisplacedLatest {
            plugin: plugin.into(),
        }
    }

    pub fn malformed_compatibility(
        entity: impl Into<String>,
        release: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedCompatibility {
            entity: entity.into(),
            release: release.into(),
            reason: reason.into(),
        }
    }

    pub fn plugin_not_found(key: impl Into<String>) -> Self {
        Self::PluginNotFound { key: key.into() }
    }

    pub fn release_not_found(entity: impl Into<String>, version: impl Into<String>) -> Self {
        Self::ReleaseNotFound {
            entity: entity.into(),
            version: version.into(),
        }
    }

    /// Helper for wrapping I/O errors with the path they occurred on
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
