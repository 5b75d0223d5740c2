//! Sidecar bundle construction (template rendering and bundle parsing)

pub mod bundle;
pub mod template;

pub use bundle::{build_bundle, parse_bundle, Bundle};
pub use template::render_sidecars;
