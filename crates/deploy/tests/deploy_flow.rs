//! End-to-end deployment flow tests against an in-memory node double.
//!
//! These cover the operator-visible scenarios: a clean deployment, a missing
//! configuration value, and an origination rejected by the node. The real
//! RPC client is exercised separately against a live node; here the client
//! seam is substituted so the whole flow runs hermetically.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use praline_deploy::{
    Artifact, ConfigError, ContractAddress, DeployError, Deployer, InitialStorage, OperationHash,
    Originated, OriginationClient, ProgressSink, RawConfig,
};
use serde_json::json;

const ADDRESS: &str = "KT1abcBEqzn5Wx8uJrZNvuS9DVHmLvG9td3f";
const OPERATION: &str = "onwtjK2Q32ndjF9zbEPPtmifdBq5qB59wjMP3oCH3iiABJyCjuq";

fn init_logs() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[derive(Default)]
struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl RecordingSink {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl ProgressSink for RecordingSink {
    fn emit(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

/// In-memory stand-in for the node: resolves or rejects each phase per the
/// scripted outcome and counts how often each capability is exercised.
#[derive(Clone, Default)]
struct StubNode {
    originations: Arc<AtomicUsize>,
    confirmation_waits: Arc<AtomicUsize>,
    reject_origination: Option<String>,
    reject_confirmation: Option<String>,
}

struct StubHandle {
    node: StubNode,
    contract_address: ContractAddress,
    operation_hash: OperationHash,
}

impl OriginationClient for StubNode {
    type Handle = StubHandle;

    async fn originate(
        &self,
        _artifact: &Artifact,
        storage: &InitialStorage,
    ) -> Result<StubHandle> {
        self.originations.fetch_add(1, Ordering::SeqCst);

        // The storage an operator deploys with is always the genesis value.
        assert_eq!(storage, &InitialStorage::genesis());

        if let Some(message) = &self.reject_origination {
            return Err(anyhow!("{message}"));
        }
        Ok(StubHandle {
            node: self.clone(),
            contract_address: ContractAddress::from(ADDRESS),
            operation_hash: OperationHash::from(OPERATION),
        })
    }
}

impl Originated for StubHandle {
    fn contract_address(&self) -> &ContractAddress {
        &self.contract_address
    }

    fn operation_hash(&self) -> &OperationHash {
        &self.operation_hash
    }

    async fn wait_confirmed(self) -> Result<ContractAddress> {
        self.node.confirmation_waits.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.node.reject_confirmation {
            return Err(anyhow!("{message}"));
        }
        Ok(self.contract_address.clone())
    }
}

fn artifact() -> Artifact {
    Artifact::from_value(json!([
        {"prim": "parameter", "args": [{"prim": "unit"}]},
        {"prim": "storage", "args": [{"prim": "unit"}]},
        {"prim": "code", "args": [[]]}
    ]))
}

#[tokio::test]
async fn test_scenario_a_clean_deployment() {
    init_logs();
    let node = StubNode::default();
    let sink = RecordingSink::default();

    let result = Deployer::new(node.clone())
        .deploy(&artifact(), &sink)
        .await
        .expect("deployment succeeds");

    assert_eq!(result.contract_address, ContractAddress::from(ADDRESS));
    assert_eq!(result.operation_hash, OperationHash::from(OPERATION));

    // Exactly one origination, exactly one confirmation wait.
    assert_eq!(node.originations.load(Ordering::SeqCst), 1);
    assert_eq!(node.confirmation_waits.load(Ordering::SeqCst), 1);

    // Both phases bracketed by progress messages, the confirmation one
    // naming the pending address.
    let messages = sink.messages();
    assert_eq!(
        messages,
        vec![
            "Deploying contract".to_string(),
            "Contract deployed!".to_string(),
            format!("Waiting for contract to be confirmed at: {ADDRESS}"),
            "Contract confirmed!".to_string(),
        ]
    );
}

#[test]
fn test_scenario_b_missing_credential_never_reaches_the_client() {
    let err = RawConfig {
        rpc_url: Some("http://127.0.0.1:8732".to_string()),
        secret_key: None,
    }
    .validate()
    .unwrap_err();

    assert!(matches!(err, ConfigError::MissingVar(_)));
    assert!(err.to_string().contains("PRALINE_PK"));
}

#[tokio::test]
async fn test_scenario_c_rejected_origination() {
    init_logs();
    let node = StubNode {
        reject_origination: Some("insufficient balance".to_string()),
        ..StubNode::default()
    };
    let sink = RecordingSink::default();

    let err = Deployer::new(node.clone())
        .deploy(&artifact(), &sink)
        .await
        .unwrap_err();

    // The node's description is surfaced verbatim under the origination
    // label, and confirmation is never attempted.
    assert!(matches!(err, DeployError::Origination(_)));
    assert_eq!(err.to_string(), "insufficient balance");
    assert_eq!(node.confirmation_waits.load(Ordering::SeqCst), 0);
    assert_eq!(sink.messages(), vec!["Deploying contract".to_string()]);
}

#[tokio::test]
async fn test_confirmation_failure_after_submission() {
    init_logs();
    let node = StubNode {
        reject_confirmation: Some("operation not confirmed within 300s".to_string()),
        ..StubNode::default()
    };
    let sink = RecordingSink::default();

    let err = Deployer::new(node.clone())
        .deploy(&artifact(), &sink)
        .await
        .unwrap_err();

    assert!(matches!(err, DeployError::Confirmation(_)));
    assert_eq!(node.originations.load(Ordering::SeqCst), 1);
    assert_eq!(node.confirmation_waits.load(Ordering::SeqCst), 1);

    // The confirmation end-message is suppressed on failure.
    let messages = sink.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[2], format!("Waiting for contract to be confirmed at: {ADDRESS}"));
}
