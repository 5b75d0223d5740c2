//! consul-inject: inject Consul service mesh containers into Kubernetes Deployments
//!
//! Reads a multi-document manifest and writes it to stdout with the sidecar
//! bundle merged into every Deployment.

use anyhow::Result;

fn main() -> Result<()> {
    consul_inject::cli::run()
}
