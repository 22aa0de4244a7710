//! The compiled contract artifact.

use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Compiled Michelson code, consumed as an opaque blob.
///
/// The artifact's format is owned by the compiler that produced it; this
/// tool only checks that it is valid JSON and passes it through to the
/// origination script unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    code: Value,
}

impl Artifact {
    /// Loads an artifact from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read contract artifact {}", path.display()))?;
        let code = serde_json::from_str(&raw)
            .with_context(|| format!("Contract artifact {} is not valid JSON", path.display()))?;
        Ok(Self { code })
    }

    pub fn from_value(code: Value) -> Self {
        Self { code }
    }

    pub fn code(&self) -> &Value {
        &self.code
    }
}
