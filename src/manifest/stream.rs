//! Lazy decoding of multi-document YAML manifests

use serde::Deserialize;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

use crate::domain::ManifestError;

/// Yields the documents of a manifest one at a time, in file order.
///
/// Empty documents (a bare `---` or a trailing separator) are skipped. The
/// first decode error is yielded once and ends the stream.
pub struct ManifestStream<'de> {
    path: PathBuf,
    documents: serde_yaml::Deserializer<'de>,
    position: usize,
    failed: bool,
}

impl<'de> ManifestStream<'de> {
    pub fn new(path: impl Into<PathBuf>, contents: &'de str) -> Self {
        Self {
            path: path.into(),
            documents: serde_yaml::Deserializer::from_str(contents),
            position: 0,
            failed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 1-based index of the most recently decoded document.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl Iterator for ManifestStream<'_> {
    type Item = Result<Value, ManifestError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            let document = self.documents.next()?;
            self.position += 1;

            match Value::deserialize(document) {
                Ok(Value::Null) => {
                    tracing::debug!(document = self.position, "Skipping empty document");
                }
                Ok(value) => return Some(Ok(value)),
                Err(source) => {
                    self.failed = true;
                    return Some(Err(ManifestError::Decode {
                        path: self.path.clone(),
                        index: self.position,
                        source,
                    }));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(contents: &str) -> Vec<String> {
        ManifestStream::new("manifest.yaml", contents)
            .map(|doc| {
                let doc = doc.expect("decode");
                doc.get("kind").and_then(Value::as_str).unwrap_or_default().to_string()
            })
            .collect()
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(kinds("").is_empty());
    }

    #[test]
    fn test_documents_in_file_order() {
        let contents = "kind: Service\n---\nkind: Deployment\n---\nkind: ConfigMap\n";
        assert_eq!(kinds(contents), vec!["Service", "Deployment", "ConfigMap"]);
    }

    #[test]
    fn test_leading_and_trailing_separators_skipped() {
        let contents = "---\nkind: Service\n---\n---\nkind: Deployment\n---\n";
        assert_eq!(kinds(contents), vec!["Service", "Deployment"]);
    }

    #[test]
    fn test_decode_error_names_path_and_stops() {
        let contents = "kind: Service\n---\nkind: [unterminated\n---\nkind: ConfigMap\n";
        let mut stream = ManifestStream::new("deploy/web.yaml", contents);

        let first = stream.next().expect("first").expect("decode");
        assert_eq!(first["kind"].as_str(), Some("Service"));

        let err = stream.next().expect("second").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("deploy/web.yaml"), "{message}");
        assert!(message.contains("document 2"), "{message}");

        assert!(stream.next().is_none());
    }
}
