//! The deployment orchestrator.
//!
//! A deployment is a two-phase sequence: submit the origination, then await
//! network confirmation. Confirmation never starts before origination has
//! yielded a handle, there is exactly one origination attempt per run, and a
//! failure in either phase is terminal.

use crate::artifact::Artifact;
use crate::client::{Originated, OriginationClient};
use crate::progress::{ProgressSink, with_progress};
use crate::storage::InitialStorage;
use crate::{ContractAddress, OperationHash};

/// Where a deployment currently stands.
///
/// `Failed` is reachable from `Originating` and `AwaitingConfirmation` only;
/// `Confirmed` is the sole successful terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Originating,
    AwaitingConfirmation,
    Confirmed,
    Failed,
}

/// The outcome of a successful deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentResult {
    pub contract_address: ContractAddress,
    pub operation_hash: OperationHash,
}

/// A terminal deployment failure, labeled with the phase that raised it.
/// The underlying description is surfaced verbatim.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("{0:#}")]
    Origination(anyhow::Error),
    #[error("{0:#}")]
    Confirmation(anyhow::Error),
}

/// Drives a single deployment against an [`OriginationClient`].
#[derive(Debug)]
pub struct Deployer<C> {
    client: C,
    storage: InitialStorage,
    phase: Phase,
}

impl<C: OriginationClient> Deployer<C> {
    /// A deployer shipping the genesis storage.
    pub fn new(client: C) -> Self {
        Self {
            client,
            storage: InitialStorage::genesis(),
            phase: Phase::Idle,
        }
    }

    /// Replaces the storage value shipped at origination.
    pub fn with_storage(mut self, storage: InitialStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Runs the deployment to its terminal state. Consumes the deployer:
    /// one run means at most one origination attempt and at most one
    /// confirmation wait.
    pub async fn deploy<S>(
        mut self,
        artifact: &Artifact,
        sink: &S,
    ) -> Result<DeploymentResult, DeployError>
    where
        S: ProgressSink + ?Sized,
    {
        self.phase = Phase::Originating;
        tracing::debug!(phase = ?self.phase, "Submitting origination");
        let submitted = with_progress(
            sink,
            "Deploying contract",
            "Contract deployed!",
            self.client.originate(artifact, &self.storage),
        )
        .await;
        let origination = match submitted {
            Ok(origination) => origination,
            Err(error) => {
                self.phase = Phase::Failed;
                return Err(DeployError::Origination(error));
            }
        };

        self.phase = Phase::AwaitingConfirmation;
        let pending_address = origination.contract_address().clone();
        let operation_hash = origination.operation_hash().clone();
        tracing::debug!(phase = ?self.phase, contract = %pending_address, "Awaiting confirmation");
        let confirmed = with_progress(
            sink,
            format!("Waiting for contract to be confirmed at: {pending_address}"),
            "Contract confirmed!",
            origination.wait_confirmed(),
        )
        .await;
        let contract_address = match confirmed {
            Ok(address) => address,
            Err(error) => {
                self.phase = Phase::Failed;
                return Err(DeployError::Confirmation(error));
            }
        };

        self.phase = Phase::Confirmed;
        Ok(DeploymentResult {
            contract_address,
            operation_hash,
        })
    }
}
