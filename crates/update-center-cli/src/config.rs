use crate::cli::SourceArgs;
use update_center_core::{DeserializerConfig, Result, UpdateCenterError};

/// Builds the deserializer configuration of a command.
///
/// The JSON file named by `--config` is read first (missing fields take
/// their defaults); `--mode` and `--lenient` then override it.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use update_center_cli::{SourceArgs, load_config};
/// use update_center_core::Mode;
///
/// let args = SourceArgs {
///     path: PathBuf::from("updates.properties"),
///     split: false,
///     mode: Some(Mode::Dev),
///     lenient: true,
///     config: None,
/// };
///
/// let config = load_config(&args).unwrap();
/// assert_eq!(config.mode, Mode::Dev);
/// assert!(config.ignore_errors);
/// ```
pub fn load_config(args: &SourceArgs) -> Result<DeserializerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| UpdateCenterError::io(path.display().to_string(), e))?;
            DeserializerConfig::from_json(&json)?
        }
        None => DeserializerConfig::default(),
    };

    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if args.lenient {
        config.ignore_errors = true;
    }

    tracing::debug!(mode = %config.mode, ignore_errors = config.ignore_errors, "Resolved configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;
    use update_center_core::Mode;

    fn args(config: Option<PathBuf>) -> SourceArgs {
        SourceArgs {
            path: PathBuf::from("updates.properties"),
            split: false,
            mode: None,
            lenient: false,
            config,
        }
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_config(&args(None)).unwrap();
        assert_eq!(config, DeserializerConfig::default());
    }

    #[test]
    fn test_file_then_flags() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, r#"{ "mode": "DEV", "ignore_errors": false }"#).unwrap();

        let config = load_config(&args(Some(path.clone()))).unwrap();
        assert_eq!(config.mode, Mode::Dev);
        assert!(!config.ignore_errors);

        let mut overridden = args(Some(path));
        overridden.mode = Some(Mode::Prod);
        overridden.lenient = true;
        let config = load_config(&overridden).unwrap();
        assert_eq!(config.mode, Mode::Prod);
        assert!(config.ignore_errors);
    }

    #[test]
    fn test_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_config(&args(Some(path))).unwrap_err();
        assert!(matches!(err, UpdateCenterError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(&args(Some(PathBuf::from("/nonexistent/config.json")))).unwrap_err();
        assert!(matches!(err, UpdateCenterError::Io { .. }));
    }
}
