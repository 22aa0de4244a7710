//! Deployment record file.
//!
//! After a successful run the tool can leave a small JSON record behind so
//! the originated address and operation hash survive the terminal session.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{ContractAddress, OperationHash};

/// What a successful deployment left on chain, and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub contract_address: ContractAddress,
    pub operation_hash: OperationHash,
    pub rpc_url: String,
    pub confirmations: u64,
}

impl DeploymentRecord {
    /// Writes the record as pretty JSON to `<dir>/<contract-address>.json`,
    /// creating the directory if needed.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create record directory {}", dir.display()))?;

        let path = dir.join(format!("{}.json", self.contract_address));
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize deployment record")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write deployment record to {}", path.display()))?;

        tracing::info!(path = %path.display(), "Deployment record saved");
        Ok(path)
    }
}
