//! Command-line front end of the update center.
//!
//! The `update-center` binary loads a catalog, single-file or split, and
//! either validates it, exports it, or lists the plugin releases compatible
//! with a product version. All logging goes to stderr so that exported
//! catalogs can be piped from stdout.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Command, ExportFormat, SourceArgs};
pub use commands::run;
pub use config::load_config;
