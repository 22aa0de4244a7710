//! praline is a CLI tool that originates the marketplace contract on a
//! Tezos network and reports the resulting contract address.

mod cli;

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use praline_deploy::{
    Artifact, DeployConfig, Deployer, DeploymentRecord, InMemorySigner, LogSink, RawConfig,
    RpcClient, RpcOriginationClient,
};

/// Exit code when the configuration gate rejects the environment.
const CONFIG_EXIT_CODE: i32 = 2;
/// Exit code when a deployment phase fails.
const DEPLOY_EXIT_CODE: i32 = 1;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    std::process::exit(run(cli).await);
}

async fn run(cli: Cli) -> i32 {
    // Pre-flight: both the endpoint and the signing key must be present
    // before any network or signer work starts.
    let raw = RawConfig {
        rpc_url: cli.rpc_url,
        secret_key: cli.pk,
    };
    let config = match raw.validate() {
        Ok(config) => config
            .confirmations(cli.confirmations)
            .confirmation_timeout(Duration::from_secs(cli.timeout)),
        Err(error) => {
            tracing::error!("{error}");
            return CONFIG_EXIT_CODE;
        }
    };

    let artifact = match Artifact::from_file(&cli.artifact) {
        Ok(artifact) => artifact,
        Err(error) => {
            tracing::error!("{error:#}");
            return CONFIG_EXIT_CODE;
        }
    };

    match deploy(config, artifact, cli.outdir.as_deref()).await {
        Ok(()) => 0,
        Err(error) => {
            tracing::error!("Error during deployment: {error:#}");
            DEPLOY_EXIT_CODE
        }
    }
}

async fn deploy(config: DeployConfig, artifact: Artifact, outdir: Option<&Path>) -> Result<()> {
    // Bad key material or an unreachable endpoint fail here, on first use.
    let signer = InMemorySigner::from_secret_key(&config.secret_key)?;
    let rpc = RpcClient::new(config.rpc_url.clone())?;
    let client = RpcOriginationClient::new(rpc, signer, &config);

    tracing::info!(
        rpc_url = %config.rpc_url,
        confirmations = config.confirmations,
        "Starting deployment..."
    );

    let result = Deployer::new(client).deploy(&artifact, &LogSink).await?;

    tracing::info!("Contract address: {}", result.contract_address);

    if let Some(outdir) = outdir {
        let record = DeploymentRecord {
            contract_address: result.contract_address,
            operation_hash: result.operation_hash,
            rpc_url: config.rpc_url.to_string(),
            confirmations: config.confirmations,
        };
        record.write_to(outdir)?;
    }

    Ok(())
}
