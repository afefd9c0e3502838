//! Parser module for addon manifests.
//!
//! This module locates `__manifest__.py` files in an addons tree and parses
//! them into [`Manifest`] records.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use addon_graph::parser::{find_manifest_files, ManifestParser};
//!
//! let mut parser = ManifestParser::new()?;
//! for path in find_manifest_files(Path::new("/opt/odoo/addons")) {
//!     if let Some(manifest) = parser.load(&path) {
//!         println!("{} depends on {:?}", manifest.module, manifest.depends);
//!     }
//! }
//! ```

pub mod locator;
pub mod manifest;
pub mod types;

// Re-export commonly used types for convenience
pub use locator::{find_manifest_files, MANIFEST_FILE_NAME};
pub use manifest::{
    load_manifest, manifest_from_value, module_name_from_path, parse_file, parse_str,
    ManifestError, ManifestParser, ManifestResult,
};
pub use types::{Manifest, ManifestValue};
