//! Streaming YAML output

use anyhow::{Context, Result};
use serde_yaml::Value;
use std::io::Write;

use super::yaml11;

const DOCUMENT_SEPARATOR: &str = "---\n";

/// Writes each document behind its own `---` marker and flushes immediately.
pub struct Emitter<W: Write> {
    out: W,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn emit(&mut self, document: &Value) -> Result<()> {
        let text = yaml11::to_string(document).context("Failed to serialize document")?;
        self.out.write_all(DOCUMENT_SEPARATOR.as_bytes())?;
        self.out.write_all(text.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
