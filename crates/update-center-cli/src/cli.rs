use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use update_center_core::Mode;

#[derive(Parser, Debug)]
#[command(
    name = "update-center",
    about = "Validate and export update center catalogs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a catalog and report whether it is valid
    Validate {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Load a catalog and write it back as properties or JSON
    Export {
        #[command(flatten)]
        source: SourceArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "properties")]
        format: ExportFormat,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List, per plugin, the public release compatible with a product version
    Compatible {
        #[command(flatten)]
        source: SourceArgs,

        /// Product version, e.g. 3.7.1
        #[arg(long)]
        sonar_version: String,
    },
}

/// Where the catalog comes from and how to load it.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Root `.properties` file of the catalog
    pub path: PathBuf,

    /// Also load `sonar.properties` and `<plugin>.properties` next to the root file
    #[arg(long)]
    pub split: bool,

    /// Loading mode (PROD or DEV); overrides the configuration file
    #[arg(long)]
    pub mode: Option<Mode>,

    /// Log overlapping public releases instead of failing
    #[arg(long)]
    pub lenient: bool,

    /// JSON deserializer configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Properties,
    Json,
}
