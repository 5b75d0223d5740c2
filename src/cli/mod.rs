//! Command-line interface for consul-inject
//!
//! A single flat command: every flag feeds one immutable configuration model
//! that drives the whole run.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod inject;

const USAGE_EXAMPLE: &str = "\
Example: inject containers for the service 'web' running on port 9090 with the upstream 'api:9091'

  consul-inject \\
    --upstreams \"api:9091\" \\
    --deployment ./example/web.yaml \\
    --service web --port 9090 \\
    > output.yaml";

/// Injects Consul service mesh containers into Kubernetes Deployments
#[derive(Parser)]
#[command(name = "consul-inject")]
#[command(author, version, long_about = None)]
#[command(after_help = USAGE_EXAMPLE)]
pub struct Cli {
    #[command(flatten)]
    inject: inject::InjectArgs,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long)]
    verbose: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    // Logs go to stderr so stdout carries only YAML.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    inject::run(cli.inject)
}
