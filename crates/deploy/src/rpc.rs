//! Thin typed wrappers over the Tezos node HTTP RPC.
//!
//! Only the handful of endpoints the origination flow needs are covered.
//! Node-side error bodies are surfaced verbatim so the operator sees the
//! same description the node produced.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::micheline::Micheline;
use crate::{Address, OperationHash};

/// Timeout applied to every individual RPC request.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The head block header fields the origination flow needs.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockHeader {
    pub protocol: String,
    pub chain_id: String,
    pub hash: String,
    pub level: u64,
}

/// A single manager operation content, as the RPC expects it. All amounts
/// and limits are decimal strings per the node's JSON schema.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationContent {
    Reveal {
        source: String,
        fee: String,
        counter: String,
        gas_limit: String,
        storage_limit: String,
        public_key: String,
    },
    Origination {
        source: String,
        fee: String,
        counter: String,
        gas_limit: String,
        storage_limit: String,
        balance: String,
        script: Script,
    },
}

/// An origination script: opaque compiled code plus the initial storage.
#[derive(Debug, Clone, Serialize)]
pub struct Script {
    pub code: Value,
    pub storage: Micheline,
}

/// An operation ready to be forged.
#[derive(Debug, Clone, Serialize)]
pub struct UnsignedOperation {
    pub branch: String,
    pub contents: Vec<OperationContent>,
}

/// An operation plus signature, as submitted to the preapply endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct PreapplyOperation {
    pub protocol: String,
    pub branch: String,
    pub contents: Vec<OperationContent>,
    pub signature: String,
}

/// HTTP client for a Tezos node.
#[derive(Debug, Clone)]
pub struct RpcClient {
    http: reqwest::Client,
    base: Url,
}

impl RpcClient {
    pub fn new(base: Url) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { http, base })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base.as_str().trim_end_matches('/'), path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach node at {url}"))?;
        Self::read(response, &url).await
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to reach node at {url}"))?;
        Self::read(response, &url).await
    }

    async fn read<T: DeserializeOwned>(response: reqwest::Response, url: &str) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("Failed to read response from {url}"))?;
        if !status.is_success() {
            anyhow::bail!("Node rejected request to {url} ({status}): {}", body.trim());
        }
        serde_json::from_str(&body)
            .with_context(|| format!("Unexpected response from {url}: {}", body.trim()))
    }

    /// Head block header: branch hash, protocol and level.
    pub async fn head_header(&self) -> Result<BlockHeader> {
        self.get("chains/main/blocks/head/header").await
    }

    /// Current counter of an account. The next operation must use
    /// `counter + 1`.
    pub async fn counter(&self, address: &Address) -> Result<u64> {
        let raw: String = self
            .get(&format!(
                "chains/main/blocks/head/context/contracts/{address}/counter"
            ))
            .await?;
        raw.parse()
            .with_context(|| format!("Node returned a non-numeric counter for {address}: {raw}"))
    }

    /// The revealed public key of an account, or `None` if the account has
    /// not published one yet.
    pub async fn manager_key(&self, address: &Address) -> Result<Option<String>> {
        self.get(&format!(
            "chains/main/blocks/head/context/contracts/{address}/manager_key"
        ))
        .await
    }

    /// Forges an operation into its binary representation on the node.
    pub async fn forge_operation(&self, operation: &UnsignedOperation) -> Result<Vec<u8>> {
        let raw: String = self
            .post("chains/main/blocks/head/helpers/forge/operations", operation)
            .await?;
        hex::decode(&raw).context("Node returned non-hex forged bytes")
    }

    /// Simulates the application of a signed operation against the head
    /// block. The response carries per-content operation results.
    pub async fn preapply_operations(&self, operation: &PreapplyOperation) -> Result<Value> {
        self.post(
            "chains/main/blocks/head/helpers/preapply/operations",
            std::slice::from_ref(operation),
        )
        .await
    }

    /// Injects a signed operation and returns its hash.
    pub async fn inject_operation(&self, signed_hex: &str) -> Result<OperationHash> {
        let hash: String = self.post("injection/operation?chain=main", signed_hex).await?;
        Ok(OperationHash::from(hash))
    }

    /// Hashes of the manager operations included in a block (validation
    /// pass 3).
    pub async fn manager_operation_hashes(&self, level: u64) -> Result<Vec<String>> {
        self.get(&format!("chains/main/blocks/{level}/operation_hashes/3"))
            .await
    }
}
