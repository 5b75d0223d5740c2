//! Splicing the sidecar bundle into Deployment documents.
//!
//! The merge is append-only: bundle entries go after whatever the pod template
//! already declares and nothing is deduplicated, so merging twice duplicates
//! every bundle entry.

use serde_yaml::{Mapping, Value};

use crate::domain::MergeError;
use crate::render::Bundle;

const TARGET_KIND: &str = "Deployment";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Injected,
    PassedThrough,
}

/// Whether `document` is a merge target.
pub fn is_deployment(document: &Value) -> bool {
    document_kind(document) == Some(TARGET_KIND)
}

pub fn document_kind(document: &Value) -> Option<&str> {
    document.get("kind").and_then(Value::as_str)
}

/// Merge `bundle` into `document` in place if it is a Deployment.
///
/// Other documents are left untouched.
pub fn merge_document(document: &mut Value, bundle: &Bundle) -> Result<MergeOutcome, MergeError> {
    if !is_deployment(document) {
        return Ok(MergeOutcome::PassedThrough);
    }

    let pod_spec = pod_template_spec(document)?;
    append_containers(pod_spec, &bundle.containers)?;
    append_or_insert(pod_spec, "initContainers", &bundle.init_containers)?;
    append_or_insert(pod_spec, "volumes", &bundle.volumes)?;

    Ok(MergeOutcome::Injected)
}

/// Navigate `spec.template.spec`, naming the first segment that is missing
/// or not a mapping.
fn pod_template_spec(document: &mut Value) -> Result<&mut Mapping, MergeError> {
    let spec = document
        .get_mut("spec")
        .and_then(Value::as_mapping_mut)
        .ok_or(MergeError::MissingSpec)?;
    let template = spec
        .get_mut("template")
        .and_then(Value::as_mapping_mut)
        .ok_or(MergeError::MissingTemplate)?;
    template.get_mut("spec").and_then(Value::as_mapping_mut).ok_or(MergeError::MissingPodSpec)
}

fn append_containers(pod_spec: &mut Mapping, entries: &[Value]) -> Result<(), MergeError> {
    match pod_spec.get_mut("containers") {
        Some(Value::Sequence(existing)) => {
            existing.extend(entries.iter().cloned());
            Ok(())
        }
        None | Some(Value::Null) => Err(MergeError::MissingContainers),
        Some(_) => Err(MergeError::NotASequence("containers")),
    }
}

fn append_or_insert(
    pod_spec: &mut Mapping,
    key: &'static str,
    entries: &[Value],
) -> Result<(), MergeError> {
    match pod_spec.get_mut(key) {
        Some(Value::Sequence(existing)) => existing.extend(entries.iter().cloned()),
        None | Some(Value::Null) => {
            pod_spec.insert(Value::String(key.to_string()), Value::Sequence(entries.to_vec()));
        }
        Some(_) => return Err(MergeError::NotASequence(key)),
    }
    Ok(())
}
