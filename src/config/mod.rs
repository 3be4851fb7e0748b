// src/config/mod.rs

//! Configuration: the flat TOML file describing how tests are run.
//!
//! - [`model`] holds the raw and validated shapes.
//! - [`validate`] turns a `RawConfigFile` into a `ConfigFile`.
//! - [`loader`] reads the file from disk.

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_optional};
pub use model::{ConfigFile, RawConfigFile};
