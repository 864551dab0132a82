//! Subcommand implementations.

use crate::cli::{Command, ExportFormat, SourceArgs};
use crate::config::load_config;
use std::io::Write;
use std::path::Path;
use update_center::{Catalog, Deserializer, Serializer};
use update_center_core::{Result, UpdateCenterError, Version};

/// Runs a parsed command.
pub fn run(command: Command) -> Result<()> {
    match command {
        Command::Validate { source } => validate(&source),
        Command::Export {
            source,
            format,
            output,
        } => export(&source, format, output.as_deref()),
        Command::Compatible {
            source,
            sonar_version,
        } => compatible(&source, &Version::parse(&sonar_version)),
    }
}

/// Loads the catalog described by `source`.
pub fn load_catalog(source: &SourceArgs) -> Result<Catalog> {
    let deserializer = Deserializer::new(load_config(source)?);
    if source.split {
        deserializer.from_many_files(&source.path)
    } else {
        deserializer.from_file(&source.path)
    }
}

fn validate(source: &SourceArgs) -> Result<()> {
    let catalog = load_catalog(source)?;
    let releases: usize = catalog.plugins().iter().map(|p| p.releases().count()).sum();
    tracing::info!(
        path = %source.path.display(),
        sonar_versions = catalog.sonar().versions().count(),
        plugins = catalog.plugins().len(),
        releases,
        "Update center is valid"
    );
    write_stdout(&format!(
        "{}: {} SonarQube versions, {} plugins, {} plugin releases\n",
        source.path.display(),
        catalog.sonar().versions().count(),
        catalog.plugins().len(),
        releases
    ))
}

/// Renders a catalog in the requested format.
pub fn render(catalog: &Catalog, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Properties => Ok(Serializer::to_properties_string(catalog)),
        ExportFormat::Json => {
            let mut json = serde_json::to_string_pretty(catalog)?;
            json.push('\n');
            Ok(json)
        }
    }
}

fn export(source: &SourceArgs, format: ExportFormat, output: Option<&Path>) -> Result<()> {
    let catalog = load_catalog(source)?;
    let rendered = render(&catalog, format)?;

    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .map_err(|e| UpdateCenterError::io(path.display().to_string(), e))?;
            tracing::info!(path = %path.display(), "Catalog exported");
            Ok(())
        }
        None => write_stdout(&rendered),
    }
}

fn compatible(source: &SourceArgs, sonar_version: &Version) -> Result<()> {
    let catalog = load_catalog(source)?;
    if catalog.sonar().dev_version() != Some(sonar_version) {
        catalog.sonar().release(sonar_version)?;
    }

    let mut out = String::new();
    for (plugin, release) in catalog.compatible_releases(sonar_version) {
        out.push_str(&format!("{}\t{}\n", plugin.key(), release.version()));
    }
    write_stdout(&out)
}

fn write_stdout(text: &str) -> Result<()> {
    std::io::stdout()
        .lock()
        .write_all(text.as_bytes())
        .map_err(|e| UpdateCenterError::io("<stdout>", e))
}
