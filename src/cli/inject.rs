//! Inject command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::config::{load_config, merge_cli_with_config, CliOverrides, FileConfig};
use crate::domain::ConfigModel;
use crate::manifest::{inject_stream, Emitter, ManifestStream};
use crate::render::build_bundle;

#[derive(Args)]
pub struct InjectArgs {
    /// Path to the kubernetes deployment file to manipulate
    #[arg(long, value_name = "FILE", env = "CONSUL_INJECT_DEPLOYMENT")]
    pub deployment: Option<PathBuf>,

    /// Name of the service to create in Consul
    #[arg(long, value_name = "NAME", env = "CONSUL_INJECT_SERVICE")]
    pub service: Option<String>,

    /// Port the service is exposed on
    #[arg(long, value_name = "PORT", env = "CONSUL_INJECT_PORT")]
    pub port: Option<String>,

    /// Space delimited upstream services to add, e.g. "api:9090 web:9091"
    #[arg(long, value_name = "LIST", env = "CONSUL_INJECT_UPSTREAMS")]
    pub upstreams: Option<String>,

    /// ACLs are enabled on the server; log in to Consul with the service account token
    #[arg(long, env = "CONSUL_INJECT_ACL_ENABLED")]
    pub acl_enabled: bool,

    /// TLS is enabled on the server; configure the Consul agent with auto-encrypt
    #[arg(long, env = "CONSUL_INJECT_TLS_ENABLED")]
    pub tls_enabled: bool,

    /// Address of the Consul server [default: consul-server.default.svc]
    #[arg(long, value_name = "HOST", env = "CONSUL_INJECT_CONSUL_SERVER")]
    pub consul_server: Option<String>,

    /// Secret containing the Consul server root cert [default: consul-ca-cert]
    #[arg(long, value_name = "SECRET", env = "CONSUL_INJECT_SERVER_CA_SECRET")]
    pub server_ca_secret: Option<String>,

    /// Secret holding the Consul client ACL token [default: consul-client-acl-token]
    #[arg(long, value_name = "SECRET", env = "CONSUL_INJECT_CLIENT_SECRET")]
    pub client_secret: Option<String>,

    /// Path to a config file (.toml, .yaml or .yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl InjectArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            deployment: self.deployment.clone(),
            service: self.service.clone(),
            port: self.port.clone(),
            upstreams: self.upstreams.clone(),
            acl_enabled: self.acl_enabled,
            tls_enabled: self.tls_enabled,
            consul_server: self.consul_server.clone(),
            server_ca_secret: self.server_ca_secret.clone(),
            client_secret: self.client_secret.clone(),
        }
    }
}

pub fn run(args: InjectArgs) -> Result<()> {
    let file_config = match &args.config {
        Some(path) => load_config(path)?,
        None => FileConfig::default(),
    };
    let settings = merge_cli_with_config(args.overrides(), file_config);

    // Validate everything before the manifest is touched.
    let model = ConfigModel::build(settings.inputs)?;
    let Some(deployment) = settings.deployment else {
        anyhow::bail!("Please specify the deployment file");
    };

    tracing::debug!(
        service = model.service(),
        port = model.port(),
        upstreams = model.upstreams().len(),
        acl_enabled = model.acl_enabled(),
        tls_enabled = model.tls_enabled(),
        "Built injection model"
    );

    let bundle = build_bundle(&model).context("Failed to build sidecar bundle")?;

    let contents = fs::read_to_string(&deployment).with_context(|| {
        format!("Unable to read deployment file {}", deployment.display())
    })?;

    let stdout = io::stdout();
    let mut emitter = Emitter::new(stdout.lock());
    let summary =
        inject_stream(ManifestStream::new(deployment.as_path(), &contents), &bundle, &mut emitter)?;

    tracing::info!(
        documents = summary.documents,
        deployments = summary.deployments,
        "Injection complete"
    );

    Ok(())
}
