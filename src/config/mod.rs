//! Configuration loading and merging
//!
//! Handles loading from an optional config file and merging it with CLI
//! arguments and environment variables (CLI > Env > File > Defaults).

pub mod loader;
pub mod merge;

pub use loader::{load_config, FileConfig};
pub use merge::{merge_cli_with_config, CliOverrides, Settings};
