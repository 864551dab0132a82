//! Core abstractions for the update center.
//!
//! This crate provides the foundational types shared by the catalog
//! deserializer, the serializer and the command-line tool.
//!
//! # Architecture
//!
//! update-center-core defines:
//! - **Version**: immutable, totally ordered release identifiers
//! - **PropertyMap**: the flat key-value namespace the catalog is written in,
//!   with its `.properties` text codec
//! - **Configuration**: operating [`Mode`] and [`DeserializerConfig`]
//! - **Error Types**: validation, lookup and input errors in one enum
//!
//! # Examples
//!
//! ```
//! use update_center_core::{PropertyMap, Version};
//!
//! let props = PropertyMap::parse("sonar.versions=2.2,2.10,2.3").unwrap();
//! let mut versions: Vec<Version> = props
//!     .get_list("sonar.versions")
//!     .iter()
//!     .map(|v| Version::parse(v))
//!     .collect();
//! versions.sort();
//! assert_eq!(versions.last().unwrap().as_str(), "2.10");
//! ```

pub mod config;
pub mod error;
pub mod properties;
pub mod version;

// Re-export commonly used types
pub use config::{DeserializerConfig, Mode};
pub use error::{Result, UpdateCenterError};
pub use properties::PropertyMap;
pub use version::{SNAPSHOT_QUALIFIER, Version, join_versions};
