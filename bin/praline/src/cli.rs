use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "praline")]
#[command(
    author,
    version,
    about = "Originate the marketplace contract on a Tezos network"
)]
pub struct Cli {
    /// The verbosity level.
    #[arg(short, long, env = "PRALINE_VERBOSITY", default_value_t = LevelFilter::INFO)]
    pub verbosity: LevelFilter,

    /// The URL of the Tezos node RPC endpoint.
    #[arg(long, alias = "rpc", env = "PRALINE_RPC_URL")]
    pub rpc_url: Option<String>,

    /// The secret key (edsk...) authorizing the origination.
    #[arg(long, env = "PRALINE_PK", hide_env_values = true)]
    pub pk: Option<String>,

    /// Path to the compiled contract artifact (Michelson JSON).
    #[arg(long, env = "PRALINE_ARTIFACT", default_value = "compiled/market.json")]
    pub artifact: PathBuf,

    /// Number of confirmations to wait for after the operation is included.
    #[arg(long, env = "PRALINE_CONFIRMATIONS", default_value_t = 1)]
    pub confirmations: u64,

    /// Maximum time in seconds to wait for confirmation.
    #[arg(long, env = "PRALINE_TIMEOUT", default_value_t = 300)]
    pub timeout: u64,

    /// Directory where a deployment record is written after a successful
    /// run. No record is written if not provided.
    #[arg(long, env = "PRALINE_OUTDIR")]
    pub outdir: Option<PathBuf>,
}
