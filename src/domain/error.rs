//! Typed failures for each stage of the pipeline.
//!
//! Every variant is fatal. The CLI layer wraps these in `anyhow` with the
//! file path attached; nothing is retried.

use std::path::PathBuf;
use thiserror::Error;

/// Invalid user-supplied settings, detected before any manifest is opened.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Please specify the service name")]
    MissingService,

    #[error("Please specify the port")]
    MissingPort,

    #[error("Invalid upstream {0}, upstreams should be formatted 'service:port'")]
    InvalidUpstream(String),

    #[error("Invalid {field} {value:?}: quotes, backslashes and control characters are not allowed")]
    InvalidValue { field: &'static str, value: String },
}

/// Failure while building the sidecar bundle from the embedded template.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to render sidecar template: {0}")]
    Render(#[from] askama::Error),

    #[error("rendered sidecar template is not valid YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("rendered sidecar template is not a mapping")]
    NotAMapping,

    #[error("rendered sidecar template does not contain '{0}'")]
    MissingKey(&'static str),

    #[error("rendered sidecar template key '{0}' is not a sequence")]
    NotASequence(&'static str),
}

/// The manifest file could not be decoded as a YAML stream.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Unable to process deployment file {}: document {index}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        index: usize,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A `Deployment` document lacks the structure the merge needs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("Unable to parse deployment. Deployment does not contain a 'spec'")]
    MissingSpec,

    #[error("Unable to parse deployment. Deployment does not contain a 'template'")]
    MissingTemplate,

    #[error("Unable to parse deployment. Deployment does not contain a template 'spec'")]
    MissingPodSpec,

    #[error("Unable to parse deployment. Deployment does not contain any 'containers'")]
    MissingContainers,

    #[error("Unable to parse deployment. Pod template field '{0}' is not a list")]
    NotASequence(&'static str),
}
