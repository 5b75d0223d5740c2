//! Config file loading

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Section name that may wrap the settings inside a shared config file.
const SECTION: &str = "consul-inject";

/// Settings read from a TOML or YAML config file. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub deployment: Option<PathBuf>,
    pub service: Option<String>,
    pub port: Option<PortValue>,
    pub upstreams: Option<UpstreamList>,
    pub acl_enabled: Option<bool>,
    pub tls_enabled: Option<bool>,
    pub consul_server: Option<String>,
    pub server_ca_secret: Option<String>,
    pub client_secret: Option<String>,
}

/// Ports may be written as numbers or strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(u64),
    Text(String),
}

impl PortValue {
    pub fn into_string(self) -> String {
        match self {
            PortValue::Number(n) => n.to_string(),
            PortValue::Text(s) => s,
        }
    }
}

/// Upstreams as a space-delimited string or a list of `service:port` entries.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum UpstreamList {
    Text(String),
    List(Vec<String>),
}

impl UpstreamList {
    /// Normalize to the space-delimited form the model builder parses.
    pub fn into_spec(self) -> String {
        match self {
            UpstreamList::Text(s) => s,
            UpstreamList::List(items) => {
                items.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect::<Vec<_>>().join(" ")
            }
        }
    }
}

pub fn load_config(config_file: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(config_file)
        .with_context(|| format!("Failed reading config file: {}", config_file.display()))?;

    let ext =
        config_file.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "toml" => parse_toml_config(&content, config_file)?,
        "yaml" | "yml" => parse_yaml_config(&content, config_file)?,
        other => anyhow::bail!(
            "Unsupported config extension '.{}' for file {}",
            other,
            config_file.display()
        ),
    };

    tracing::debug!(path = %config_file.display(), "Loaded config file");
    Ok(parsed)
}

/// Parse TOML config, supporting a nested [consul-inject] section.
fn parse_toml_config(content: &str, config_file: &Path) -> Result<FileConfig> {
    let raw: toml::Value = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", config_file.display()))?;

    let config_val = match raw.get(SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };

    config_val.try_into().with_context(|| format!("Invalid TOML config: {}", config_file.display()))
}

/// Parse YAML config, supporting a nested consul-inject key.
fn parse_yaml_config(content: &str, config_file: &Path) -> Result<FileConfig> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", config_file.display()))?;

    // An empty file parses to null
    if raw.is_null() {
        return Ok(FileConfig::default());
    }

    let config_val = match raw.get(SECTION) {
        Some(nested) => nested.clone(),
        None => raw,
    };

    serde_yaml::from_value(config_val)
        .with_context(|| format!("Invalid YAML config: {}", config_file.display()))
}
