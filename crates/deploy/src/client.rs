//! The origination capability: submit an origination, get back a handle,
//! await inclusion.
//!
//! [`OriginationClient`] is the seam between the deployment orchestrator and
//! the network. The production implementation drives the node's injection
//! protocol (forge, sign, preapply, inject) and polls for inclusion; tests
//! substitute in-memory doubles.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde_json::Value;
use tokio::time::Instant;

use crate::artifact::Artifact;
use crate::config::DeployConfig;
use crate::rpc::{OperationContent, PreapplyOperation, RpcClient, Script, UnsignedOperation};
use crate::signer::{GENERIC_OPERATION_WATERMARK, Signer};
use crate::storage::InitialStorage;
use crate::{ContractAddress, OperationHash, base58};

// Static fee and limit defaults; a single attempt, no estimator pass.
const REVEAL_FEE_MUTEZ: u64 = 1_000;
const REVEAL_GAS_LIMIT: u64 = 1_100;
const REVEAL_STORAGE_LIMIT: u64 = 0;
const ORIGINATION_FEE_MUTEZ: u64 = 10_000;
const ORIGINATION_GAS_LIMIT: u64 = 100_000;
const ORIGINATION_STORAGE_LIMIT: u64 = 10_000;

/// Interval between polling attempts while waiting for inclusion.
const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Capability to submit an origination operation.
pub trait OriginationClient {
    type Handle: Originated;

    /// Submits the artifact and initial storage as an origination request.
    /// On success the operation is on its way to the network and the handle
    /// carries the not-yet-confirmed contract address.
    fn originate(
        &self,
        artifact: &Artifact,
        storage: &InitialStorage,
    ) -> impl Future<Output = Result<Self::Handle>> + Send;
}

/// A submitted origination: a pending contract address plus a means to await
/// network confirmation.
pub trait Originated {
    /// The contract address, not yet final until confirmation resolves.
    fn contract_address(&self) -> &ContractAddress;

    /// The hash of the injected operation.
    fn operation_hash(&self) -> &OperationHash;

    /// Suspends until the operation is included to the configured depth,
    /// then yields the now-final contract address.
    fn wait_confirmed(self) -> impl Future<Output = Result<ContractAddress>> + Send;
}

/// Production [`OriginationClient`] over a Tezos node RPC.
#[derive(Debug, Clone)]
pub struct RpcOriginationClient<S> {
    rpc: RpcClient,
    signer: S,
    confirmations: u64,
    confirmation_timeout: Duration,
}

impl<S: Signer> RpcOriginationClient<S> {
    pub fn new(rpc: RpcClient, signer: S, config: &DeployConfig) -> Self {
        Self {
            rpc,
            signer,
            confirmations: config.confirmations,
            confirmation_timeout: config.confirmation_timeout,
        }
    }
}

impl<S> OriginationClient for RpcOriginationClient<S>
where
    S: Signer + Send + Sync,
{
    type Handle = RpcOriginated;

    async fn originate(
        &self,
        artifact: &Artifact,
        storage: &InitialStorage,
    ) -> Result<RpcOriginated> {
        let source = self.signer.address();
        let head = self.rpc.head_header().await?;
        let counter = self.rpc.counter(source).await?;
        let manager_key = self.rpc.manager_key(source).await?;

        let mut next_counter = counter + 1;
        let mut contents = Vec::with_capacity(2);

        // A fresh account must publish its public key before (or along with)
        // its first manager operation.
        if manager_key.is_none() {
            tracing::debug!(source = %source, "Account not revealed yet, batching a reveal");
            contents.push(OperationContent::Reveal {
                source: source.to_string(),
                fee: REVEAL_FEE_MUTEZ.to_string(),
                counter: next_counter.to_string(),
                gas_limit: REVEAL_GAS_LIMIT.to_string(),
                storage_limit: REVEAL_STORAGE_LIMIT.to_string(),
                public_key: self.signer.public_key().to_string(),
            });
            next_counter += 1;
        }

        contents.push(OperationContent::Origination {
            source: source.to_string(),
            fee: ORIGINATION_FEE_MUTEZ.to_string(),
            counter: next_counter.to_string(),
            gas_limit: ORIGINATION_GAS_LIMIT.to_string(),
            storage_limit: ORIGINATION_STORAGE_LIMIT.to_string(),
            balance: "0".to_string(),
            script: Script {
                code: artifact.code().clone(),
                storage: storage.to_micheline(),
            },
        });

        let operation = UnsignedOperation {
            branch: head.hash.clone(),
            contents,
        };
        let forged = self.rpc.forge_operation(&operation).await?;
        check_forged_branch(&forged, &head.hash)?;

        let signature = self.signer.sign(GENERIC_OPERATION_WATERMARK, &forged)?;

        let preapply = PreapplyOperation {
            protocol: head.protocol.clone(),
            branch: operation.branch.clone(),
            contents: operation.contents.clone(),
            signature: signature.to_base58(),
        };
        let response = self.rpc.preapply_operations(&preapply).await?;
        ensure_applied(&response)?;
        let contract_address = originated_contract(&response)?;

        let mut signed = forged;
        signed.extend_from_slice(signature.as_bytes());
        let operation_hash = self.rpc.inject_operation(&hex::encode(&signed)).await?;

        tracing::debug!(
            operation = %operation_hash,
            contract = %contract_address,
            level = head.level,
            "Origination injected"
        );

        Ok(RpcOriginated {
            rpc: self.rpc.clone(),
            operation_hash,
            contract_address,
            injected_at_level: head.level,
            confirmations: self.confirmations,
            timeout: self.confirmation_timeout,
        })
    }
}

/// An origination injected through [`RpcOriginationClient`].
#[derive(Debug, Clone)]
pub struct RpcOriginated {
    rpc: RpcClient,
    operation_hash: OperationHash,
    contract_address: ContractAddress,
    injected_at_level: u64,
    confirmations: u64,
    timeout: Duration,
}

impl Originated for RpcOriginated {
    fn contract_address(&self) -> &ContractAddress {
        &self.contract_address
    }

    fn operation_hash(&self) -> &OperationHash {
        &self.operation_hash
    }

    async fn wait_confirmed(self) -> Result<ContractAddress> {
        let deadline = Instant::now() + self.timeout;
        let mut scanned_level = self.injected_at_level;
        let mut included_at: Option<u64> = None;

        loop {
            if Instant::now() > deadline {
                anyhow::bail!(
                    "Operation {} was not confirmed within {}s",
                    self.operation_hash,
                    self.timeout.as_secs()
                );
            }

            let head = self.rpc.head_header().await?;

            // Scan blocks produced since injection until the operation shows
            // up in one of them.
            while included_at.is_none() && scanned_level < head.level {
                scanned_level += 1;
                let hashes = self.rpc.manager_operation_hashes(scanned_level).await?;
                if hashes
                    .iter()
                    .any(|hash| hash.as_str() == self.operation_hash.as_str())
                {
                    tracing::debug!(
                        level = scanned_level,
                        operation = %self.operation_hash,
                        "Operation included"
                    );
                    included_at = Some(scanned_level);
                }
            }

            if let Some(level) = included_at {
                if head.level + 1 >= level + self.confirmations {
                    return Ok(self.contract_address.clone());
                }
            }

            tokio::time::sleep(CONFIRMATION_POLL_INTERVAL).await;
        }
    }
}

/// Checks that the node-forged bytes commit to the branch we asked for.
fn check_forged_branch(forged: &[u8], branch: &str) -> Result<()> {
    let raw = base58::decode(branch).context("Invalid branch hash in block header")?;
    let digest = raw
        .strip_prefix(base58::BLOCK_HASH)
        .with_context(|| format!("Unexpected branch hash prefix in {branch}"))?;
    ensure!(
        forged.len() > digest.len() && &forged[..digest.len()] == digest,
        "Forged bytes from the node do not commit to branch {branch}"
    );
    Ok(())
}

fn operation_results(response: &Value) -> impl Iterator<Item = &Value> {
    response
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|operation| operation.get("contents").and_then(Value::as_array))
        .flatten()
        .filter_map(|content| content.pointer("/metadata/operation_result"))
}

/// Rejects the operation if any content failed to apply, surfacing the
/// node's error description verbatim.
fn ensure_applied(response: &Value) -> Result<()> {
    let mut seen = 0usize;
    for result in operation_results(response) {
        seen += 1;
        let status = result
            .get("status")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        if status != "applied" {
            let errors = result
                .get("errors")
                .map(Value::to_string)
                .unwrap_or_default();
            anyhow::bail!("Node refused the operation (status {status}): {errors}");
        }
    }
    ensure!(seen > 0, "Preapply response carries no operation results");
    Ok(())
}

/// Pulls the originated contract address out of a preapply response.
fn originated_contract(response: &Value) -> Result<ContractAddress> {
    operation_results(response)
        .filter_map(|result| result.get("originated_contracts"))
        .filter_map(Value::as_array)
        .flatten()
        .filter_map(Value::as_str)
        .map(ContractAddress::from)
        .next()
        .context("Preapply response contains no originated contract")
}
