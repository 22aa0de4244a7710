//! praline-deploy - Origination library for the praline CLI.
//!
//! This crate provides everything needed to originate a compiled Michelson
//! contract on a Tezos network: genesis storage construction, operation
//! forging/signing/injection through a node's HTTP RPC, and the two-phase
//! deployment orchestration (submit, then await confirmation).

use serde::{Deserialize, Serialize};

mod artifact;
mod base58;
mod client;
mod config;
mod deployer;
pub mod micheline;
mod progress;
mod record;
pub mod rpc;
pub mod signer;
pub mod storage;

pub use artifact::Artifact;
pub use client::{Originated, OriginationClient, RpcOriginationClient};
pub use config::{ConfigError, DeployConfig, RawConfig};
pub use deployer::{DeployError, Deployer, DeploymentResult, Phase};
pub use progress::{LogSink, ProgressSink, with_progress};
pub use record::DeploymentRecord;
pub use rpc::RpcClient;
pub use signer::{InMemorySigner, Signer};
pub use storage::InitialStorage;

/// An implicit account address (`tz1...`).
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[display("{_0}")]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Address {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// An originated contract address (`KT1...`).
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[display("{_0}")]
pub struct ContractAddress(String);

impl ContractAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContractAddress {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// The hash of an injected operation (`o...`).
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[display("{_0}")]
pub struct OperationHash(String);

impl OperationHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OperationHash {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
