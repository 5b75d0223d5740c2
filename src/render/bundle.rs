//! Sidecar bundle parsing

use serde_yaml::{Mapping, Value};

use super::template::render_sidecars;
use crate::domain::{BundleError, ConfigModel};

const CONTAINERS: &str = "containers";
const INIT_CONTAINERS: &str = "initContainers";
const VOLUMES: &str = "volumes";

/// Containers, init containers and volumes spliced into every Deployment.
///
/// Built once per run and only ever read afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bundle {
    pub containers: Vec<Value>,
    pub init_containers: Vec<Value>,
    pub volumes: Vec<Value>,
}

/// Render the sidecar template for `model` and parse the result.
pub fn build_bundle(model: &ConfigModel) -> Result<Bundle, BundleError> {
    let rendered = render_sidecars(model)?;
    let bundle = parse_bundle(&rendered)?;
    tracing::debug!(
        containers = bundle.containers.len(),
        init_containers = bundle.init_containers.len(),
        volumes = bundle.volumes.len(),
        "Built sidecar bundle"
    );
    Ok(bundle)
}

/// Parse rendered YAML into a [`Bundle`].
///
/// The top level must be a mapping holding all three keys, each a sequence
/// (possibly empty).
pub fn parse_bundle(text: &str) -> Result<Bundle, BundleError> {
    let raw: Value = serde_yaml::from_str(text)?;
    let Value::Mapping(mut root) = raw else {
        return Err(BundleError::NotAMapping);
    };

    Ok(Bundle {
        containers: take_sequence(&mut root, CONTAINERS)?,
        init_containers: take_sequence(&mut root, INIT_CONTAINERS)?,
        volumes: take_sequence(&mut root, VOLUMES)?,
    })
}

fn take_sequence(root: &mut Mapping, key: &'static str) -> Result<Vec<Value>, BundleError> {
    match root.remove(key) {
        Some(Value::Sequence(items)) => Ok(items),
        Some(_) => Err(BundleError::NotASequence(key)),
        None => Err(BundleError::MissingKey(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfigInputs;

    fn name_of(node: &Value) -> Option<&str> {
        node.get("name").and_then(Value::as_str)
    }

    #[test]
    fn test_parse_requires_all_keys() {
        let err = parse_bundle("containers: []\ninitContainers: []\n").unwrap_err();
        assert!(matches!(err, BundleError::MissingKey("volumes")));

        let err = parse_bundle("initContainers: []\nvolumes: []\n").unwrap_err();
        assert!(matches!(err, BundleError::MissingKey("containers")));
    }

    #[test]
    fn test_parse_accepts_empty_sequences() {
        let bundle =
            parse_bundle("containers: []\ninitContainers: []\nvolumes: []\n").expect("bundle");
        assert_eq!(bundle, Bundle::default());
    }

    #[test]
    fn test_parse_rejects_non_sequence_value() {
        let err = parse_bundle("containers: {}\ninitContainers: []\nvolumes: []\n").unwrap_err();
        assert!(matches!(err, BundleError::NotASequence("containers")));
    }

    #[test]
    fn test_parse_rejects_non_mapping_root() {
        let err = parse_bundle("- containers\n").unwrap_err();
        assert!(matches!(err, BundleError::NotAMapping));
    }

    #[test]
    fn test_parse_reports_invalid_yaml() {
        let err = parse_bundle("containers: [unterminated\n").unwrap_err();
        assert!(matches!(err, BundleError::Parse(_)));
    }

    #[test]
    fn test_built_bundle_shape() {
        for (acl_enabled, tls_enabled) in [(false, false), (true, false), (false, true), (true, true)]
        {
            let model = ConfigModel::build(ConfigInputs {
                service: "web".to_string(),
                port: "9090".to_string(),
                upstreams: "api:9091".to_string(),
                acl_enabled,
                tls_enabled,
                ..ConfigInputs::default()
            })
            .expect("model");
            let bundle = build_bundle(&model).expect("bundle");

            let containers: Vec<_> = bundle.containers.iter().filter_map(name_of).collect();
            assert_eq!(containers, vec!["consul-agent", "consul-connect-envoy-sidecar"]);
            let init: Vec<_> = bundle.init_containers.iter().filter_map(name_of).collect();
            assert_eq!(init, vec!["consul-init"]);
            assert_eq!(bundle.volumes.len(), 6);
        }
    }

    #[test]
    fn test_tls_adds_agent_ca_mount() {
        let model = ConfigModel::build(ConfigInputs {
            service: "web".to_string(),
            port: "9090".to_string(),
            tls_enabled: true,
            ..ConfigInputs::default()
        })
        .expect("model");
        let bundle = build_bundle(&model).expect("bundle");
        let mounts = bundle.containers[0]["volumeMounts"].as_sequence().expect("mounts");
        assert_eq!(mounts.len(), 3);
        assert_eq!(mounts[2]["name"].as_str(), Some("consul-ca-cert"));
    }
}
