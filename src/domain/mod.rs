//! Core domain types shared across the injection pipeline

pub mod error;
pub mod model;

pub use error::{BundleError, ConfigError, ManifestError, MergeError};
pub use model::{ConfigInputs, ConfigModel, Upstream};
