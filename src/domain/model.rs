//! Immutable injection settings.
//!
//! `ConfigModel` is built once per run from validated inputs and then shared
//! read-only by the renderer and the document loop. The Consul address fields
//! are derived from `tls_enabled` and cannot be set independently.

use super::error::ConfigError;

pub const DEFAULT_CONSUL_SERVER: &str = "consul-server.default.svc";
pub const DEFAULT_SERVER_CA_SECRET: &str = "consul-ca-cert";
pub const DEFAULT_CLIENT_ACL_SECRET: &str = "consul-client-acl-token";

const SERF_LAN_PORT: u16 = 8301;
const HTTP_PORT: u16 = 8500;
const HTTPS_PORT: u16 = 8501;

/// Values that end up inside quoted YAML and HCL strings and shell scripts
/// must not carry quotes, backslashes or control characters.
fn is_safe_value(value: &str) -> bool {
    !value.chars().any(|c| c == '"' || c == '\\' || c.is_control())
}

fn require_safe(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if is_safe_value(value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue { field, value: value.to_string() })
    }
}

/// A service the sidecar proxy must expose locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upstream {
    pub service: String,
    pub port: String,
}

impl Upstream {
    /// Parse a single `service:port` token.
    pub fn parse(token: &str) -> Result<Self, ConfigError> {
        let parts: Vec<&str> = token.split(':').collect();
        match parts.as_slice() {
            [service, port]
                if !service.is_empty()
                    && !port.is_empty()
                    && is_safe_value(service)
                    && is_safe_value(port) =>
            {
                Ok(Self {
                    service: (*service).to_string(),
                    port: (*port).to_string(),
                })
            }
            _ => Err(ConfigError::InvalidUpstream(token.to_string())),
        }
    }
}

/// Parse a space-delimited upstream list. An empty string yields no upstreams.
///
/// The first malformed token aborts parsing and is named in the error.
pub fn parse_upstreams(spec: &str) -> Result<Vec<Upstream>, ConfigError> {
    spec.split_whitespace().map(Upstream::parse).collect()
}

/// Raw settings as supplied by the front end, before validation.
#[derive(Debug, Clone)]
pub struct ConfigInputs {
    pub service: String,
    pub port: String,
    pub upstreams: String,
    pub acl_enabled: bool,
    pub tls_enabled: bool,
    pub consul_server: String,
    pub server_ca_secret: String,
    pub client_acl_secret: String,
}

impl Default for ConfigInputs {
    fn default() -> Self {
        Self {
            service: String::new(),
            port: String::new(),
            upstreams: String::new(),
            acl_enabled: false,
            tls_enabled: false,
            consul_server: DEFAULT_CONSUL_SERVER.to_string(),
            server_ca_secret: DEFAULT_SERVER_CA_SECRET.to_string(),
            client_acl_secret: DEFAULT_CLIENT_ACL_SECRET.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigModel {
    service: String,
    port: String,
    upstreams: Vec<Upstream>,
    acl_enabled: bool,
    tls_enabled: bool,
    consul_server_host: String,
    server_ca_secret: String,
    client_acl_secret: String,
}

impl ConfigModel {
    /// Validate inputs and build the model.
    pub fn build(inputs: ConfigInputs) -> Result<Self, ConfigError> {
        let service = inputs.service.trim();
        if service.is_empty() {
            return Err(ConfigError::MissingService);
        }
        require_safe("service name", service)?;
        let port = inputs.port.trim();
        if port.is_empty() {
            return Err(ConfigError::MissingPort);
        }
        require_safe("port", port)?;

        let upstreams = parse_upstreams(&inputs.upstreams)?;

        Ok(Self {
            service: service.to_string(),
            port: port.to_string(),
            upstreams,
            acl_enabled: inputs.acl_enabled,
            tls_enabled: inputs.tls_enabled,
            consul_server_host: inputs.consul_server,
            server_ca_secret: inputs.server_ca_secret,
            client_acl_secret: inputs.client_acl_secret,
        })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    /// Upstreams in the order they were given; output order follows this.
    pub fn upstreams(&self) -> &[Upstream] {
        &self.upstreams
    }

    pub fn acl_enabled(&self) -> bool {
        self.acl_enabled
    }

    pub fn tls_enabled(&self) -> bool {
        self.tls_enabled
    }

    pub fn consul_server_host(&self) -> &str {
        &self.consul_server_host
    }

    pub fn server_ca_secret(&self) -> &str {
        &self.server_ca_secret
    }

    pub fn client_acl_secret(&self) -> &str {
        &self.client_acl_secret
    }

    /// Serf LAN address the local agent joins.
    pub fn cluster_address(&self) -> String {
        format!("{}:{}", self.consul_server_host, SERF_LAN_PORT)
    }

    /// HTTP API address of the agent running inside the pod.
    pub fn local_http_addr(&self) -> String {
        format!("{}://localhost:{}", self.scheme(), self.api_port())
    }

    /// HTTP API address of the Consul server.
    pub fn server_http_addr(&self) -> String {
        format!("{}://{}:{}", self.scheme(), self.consul_server_host, self.api_port())
    }

    fn scheme(&self) -> &'static str {
        if self.tls_enabled {
            "https"
        } else {
            "http"
        }
    }

    fn api_port(&self) -> u16 {
        if self.tls_enabled {
            HTTPS_PORT
        } else {
            HTTP_PORT
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(service: &str, port: &str, upstreams: &str) -> ConfigInputs {
        ConfigInputs {
            service: service.to_string(),
            port: port.to_string(),
            upstreams: upstreams.to_string(),
            ..ConfigInputs::default()
        }
    }

    #[test]
    fn test_build_requires_service() {
        let err = ConfigModel::build(inputs("", "9090", "")).unwrap_err();
        assert_eq!(err, ConfigError::MissingService);
    }

    #[test]
    fn test_build_requires_port() {
        let err = ConfigModel::build(inputs("web", "  ", "")).unwrap_err();
        assert_eq!(err, ConfigError::MissingPort);
    }

    #[test]
    fn test_empty_upstreams_yield_empty_list() {
        let model = ConfigModel::build(inputs("web", "9090", "")).expect("model");
        assert!(model.upstreams().is_empty());
    }

    #[test]
    fn test_upstreams_preserve_order() {
        let model =
            ConfigModel::build(inputs("web", "9090", "api:9091 cache:6379 db:5432")).expect("model");
        let names: Vec<&str> = model.upstreams().iter().map(|u| u.service.as_str()).collect();
        assert_eq!(names, vec!["api", "cache", "db"]);
        assert_eq!(model.upstreams()[1].port, "6379");
    }

    #[test]
    fn test_malformed_upstream_is_named() {
        let err = ConfigModel::build(inputs("web", "9090", "api:9091 apibadport")).unwrap_err();
        assert_eq!(err, ConfigError::InvalidUpstream("apibadport".to_string()));
        assert!(err.to_string().contains("apibadport"));
    }

    #[test]
    fn test_upstream_with_extra_colon_rejected() {
        assert!(Upstream::parse("api:90:91").is_err());
        assert!(Upstream::parse(":9091").is_err());
        assert!(Upstream::parse("api:").is_err());
    }

    #[test]
    fn test_service_with_quote_rejected() {
        let err = ConfigModel::build(inputs("web\"x", "9090", "")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue { field: "service name", value: "web\"x".to_string() }
        );
    }

    #[test]
    fn test_control_characters_rejected() {
        let err = ConfigModel::build(inputs("we\u{8}x", "9090", "")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "service name", .. }));

        let err = ConfigModel::build(inputs("web", "90\\90", "")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "port", .. }));
    }

    #[test]
    fn test_upstream_with_quote_rejected() {
        let err = ConfigModel::build(inputs("web", "9090", "a\"pi:9091")).unwrap_err();
        assert_eq!(err, ConfigError::InvalidUpstream("a\"pi:9091".to_string()));
    }

    #[test]
    fn test_plain_http_addresses() {
        let model = ConfigModel::build(inputs("web", "9090", "")).expect("model");
        assert_eq!(model.cluster_address(), "consul-server.default.svc:8301");
        assert_eq!(model.local_http_addr(), "http://localhost:8500");
        assert_eq!(model.server_http_addr(), "http://consul-server.default.svc:8500");
    }

    #[test]
    fn test_tls_switches_scheme_and_port_together() {
        let model = ConfigModel::build(ConfigInputs {
            tls_enabled: true,
            consul_server: "consul.mesh.svc".to_string(),
            ..inputs("web", "9090", "")
        })
        .expect("model");
        assert_eq!(model.cluster_address(), "consul.mesh.svc:8301");
        assert_eq!(model.local_http_addr(), "https://localhost:8501");
        assert_eq!(model.server_http_addr(), "https://consul.mesh.svc:8501");
    }
}
