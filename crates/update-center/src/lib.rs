//! Update center catalog.
//!
//! This crate turns the flat properties description of a product ("Sonar")
//! and its plugins into a validated, queryable [`Catalog`], and writes
//! catalogs back to properties.
//!
//! # Features
//!
//! - Product release line with LTS and development versions
//! - Plugin releases in public, archived, private and development tiers
//! - Compatibility declarations: lists, `[from,to]` ranges and `LATEST`
//! - Plugin dependencies resolved against the loaded catalog
//! - Split file format: one root file plus one file per entity
//!
//! # Examples
//!
//! ```
//! use update_center::{Deserializer, Serializer};
//! use update_center_core::{Mode, PropertyMap};
//!
//! let props = PropertyMap::parse(
//!     "sonar.versions=2.2,2.3\n\
//!      plugins=clirr\n\
//!      clirr.versions=1.0\n\
//!      clirr.1.0.requiredSonarVersions=2.2\n",
//! )
//! .unwrap();
//!
//! let catalog = Deserializer::with_mode(Mode::Prod, false).from_properties(&props).unwrap();
//! assert!(catalog.find_plugin("clirr").is_ok());
//!
//! let written = Serializer::to_properties(&catalog);
//! assert_eq!(written.get("clirr.1.0.requiredSonarVersions"), Some("2.2"));
//! ```

pub mod compatibility;
pub mod deserializer;
pub mod loader;
pub mod model;
pub mod serializer;

// Re-export commonly used types
pub use compatibility::{CompatibilityResolver, Declaration, Resolution};
pub use deserializer::Deserializer;
pub use loader::{FsLocator, SourceLocator, Supplement};
pub use model::{Catalog, Dependency, Plugin, Release, Sonar, Visibility};
pub use serializer::Serializer;
