//! Catalog entities.
//!
//! Entities are assembled by the deserializer through `with_*` setters and
//! are read-only afterwards. Relations are key references: a plugin names its
//! parent by key and a dependency names its target plugin and version; the
//! [`Catalog`] resolves them on demand.

mod catalog;
mod plugin;
mod release;
mod sonar;

pub use catalog::Catalog;
pub use plugin::Plugin;
pub use release::{Dependency, Release, Visibility};
pub use sonar::{SONAR_KEY, SONAR_NAME, Sonar};
