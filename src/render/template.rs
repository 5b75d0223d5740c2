//! Sidecar template rendering.
//!
//! The template text is compiled into the binary, so a malformed template
//! fails the build. Rendering is a pure function of the [`ConfigModel`].

use askama::Template;

use crate::domain::{BundleError, ConfigModel};

/// Scalar fields are stored as complete double-quoted YAML scalars.
#[derive(Template)]
#[template(path = "sidecar.yaml", escape = "none")]
struct SidecarTemplate<'a> {
    model: &'a ConfigModel,
    service: String,
    port: String,
    service_id: String,
    proxy_service_id: String,
    cluster_address: String,
    local_http_addr: String,
    server_http_addr: String,
    client_acl_secret: String,
    server_ca_secret: String,
}

impl<'a> SidecarTemplate<'a> {
    fn new(model: &'a ConfigModel) -> Self {
        Self {
            model,
            service: yaml_quoted(model.service()),
            port: yaml_quoted(model.port()),
            service_id: yaml_quoted(&format!("$(POD_NAME)-{}", model.service())),
            proxy_service_id: yaml_quoted(&format!(
                "$(POD_NAME)-{}-sidecar-proxy",
                model.service()
            )),
            cluster_address: yaml_quoted(&model.cluster_address()),
            local_http_addr: yaml_quoted(&model.local_http_addr()),
            server_http_addr: yaml_quoted(&model.server_http_addr()),
            client_acl_secret: yaml_quoted(model.client_acl_secret()),
            server_ca_secret: yaml_quoted(model.server_ca_secret()),
        }
    }
}

/// Render the sidecar bundle as YAML text.
pub fn render_sidecars(model: &ConfigModel) -> Result<String, BundleError> {
    Ok(SidecarTemplate::new(model).render()?)
}

/// Quote `value` as a YAML double-quoted scalar.
fn yaml_quoted(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() || matches!(c, '\u{2028}' | '\u{2029}' | '\u{feff}') => {
                out.push_str(&format!("\\u{:04X}", u32::from(c)));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
