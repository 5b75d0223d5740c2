//! Manifest processing: decode, merge and emit one document at a time

pub mod emit;
pub mod merge;
pub mod stream;
pub mod yaml11;

pub use emit::Emitter;
pub use merge::{merge_document, MergeOutcome};
pub use stream::ManifestStream;

use anyhow::{Context, Result};
use std::io::Write;

use crate::render::Bundle;

/// Counts reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub documents: usize,
    pub deployments: usize,
}

/// Push every document of `stream` through the merger into `emitter`.
///
/// Each document is emitted before the next one is decoded, so on failure
/// everything before the offending document has already been written.
pub fn inject_stream<W: Write>(
    mut stream: ManifestStream<'_>,
    bundle: &Bundle,
    emitter: &mut Emitter<W>,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    while let Some(decoded) = stream.next() {
        let mut document = decoded?;
        let kind = merge::document_kind(&document).unwrap_or("<none>").to_string();

        let outcome = merge_document(&mut document, bundle).with_context(|| {
            format!(
                "Unable to add sidecars to deployment {} (document {})",
                stream.path().display(),
                stream.position()
            )
        })?;

        tracing::debug!(
            document = stream.position(),
            kind = %kind,
            outcome = ?outcome,
            "Processed document"
        );

        emitter.emit(&document)?;
        summary.documents += 1;
        if outcome == MergeOutcome::Injected {
            summary.deployments += 1;
        }
    }

    Ok(summary)
}
