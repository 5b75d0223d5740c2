//! consul-inject: add Consul service mesh sidecars to Kubernetes Deployments
//!
//! Renders a fixed sidecar bundle (containers, init containers and volumes)
//! from one immutable [`domain::ConfigModel`] and splices it into every
//! `Deployment` of a multi-document YAML manifest, streaming the result.

pub mod cli;
pub mod config;
pub mod domain;
pub mod manifest;
pub mod render;
