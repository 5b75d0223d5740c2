//! Merge CLI arguments with config file values

use std::path::PathBuf;

use super::loader::{FileConfig, PortValue, UpstreamList};
use crate::domain::ConfigInputs;

/// Values taken from the command line or its environment variables.
///
/// `None` means the flag was not given, so the file value (or default) applies.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub deployment: Option<PathBuf>,
    pub service: Option<String>,
    pub port: Option<String>,
    pub upstreams: Option<String>,
    pub acl_enabled: bool,
    pub tls_enabled: bool,
    pub consul_server: Option<String>,
    pub server_ca_secret: Option<String>,
    pub client_secret: Option<String>,
}

/// Fully merged settings, ready for model validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub deployment: Option<PathBuf>,
    pub inputs: ConfigInputs,
}

pub fn merge_cli_with_config(cli: CliOverrides, file: FileConfig) -> Settings {
    let defaults = ConfigInputs::default();

    let inputs = ConfigInputs {
        service: cli.service.or(file.service).unwrap_or_default(),
        port: cli.port.or_else(|| file.port.map(PortValue::into_string)).unwrap_or_default(),
        upstreams: cli
            .upstreams
            .or_else(|| file.upstreams.map(UpstreamList::into_spec))
            .unwrap_or_default(),
        // Switches only ever enable a feature from the command line.
        acl_enabled: cli.acl_enabled || file.acl_enabled.unwrap_or(defaults.acl_enabled),
        tls_enabled: cli.tls_enabled || file.tls_enabled.unwrap_or(defaults.tls_enabled),
        consul_server: cli.consul_server.or(file.consul_server).unwrap_or(defaults.consul_server),
        server_ca_secret: cli
            .server_ca_secret
            .or(file.server_ca_secret)
            .unwrap_or(defaults.server_ca_secret),
        client_acl_secret: cli
            .client_secret
            .or(file.client_secret)
            .unwrap_or(defaults.client_acl_secret),
    };

    Settings { deployment: cli.deployment.or(file.deployment), inputs }
}
