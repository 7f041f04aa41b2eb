use super::config::{default_config_path, SpvConfig};
use clap::Args;
use nipopow_spv::chain::{BlockId, Digest32};
use nipopow_spv::nipopow::{NipopowVerifier, ProcessOutcome};
use nipopow_spv::spv::{verify_inclusion, FsNodeClient, InclusionReport, PeerResult, SpvRequest};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to config file (default: ~/.config/nipopow-spv/config.toml if present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Genesis block id (hex)
    #[arg(long)]
    pub genesis: Option<BlockId>,

    /// Id of the block claimed to contain the transaction (hex)
    #[arg(long)]
    pub header_id: Option<BlockId>,

    /// Transaction id (hex)
    #[arg(long)]
    pub tx_id: Option<Digest32>,

    /// Peer to ask for a proof (repeatable)
    #[arg(long = "peer")]
    pub peers: Vec<String>,

    /// Peer to ask for the header and Merkle path
    #[arg(long)]
    pub header_peer: Option<String>,

    /// Directory with one node dump per peer
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Security parameter
    #[arg(short = 'm', long)]
    pub m: Option<u32>,

    /// Suffix length
    #[arg(short = 'k', long)]
    pub k: Option<u32>,
}

/// Load the explicit config, else the default one if it exists, else defaults.
pub fn resolve_config(path: Option<&Path>) -> Result<SpvConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => SpvConfig::load(path),
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                SpvConfig::load(&default_path)
            } else {
                Ok(SpvConfig::default())
            }
        }
    }
}

/// Command-line values override the config file.
pub fn apply_overrides(args: VerifyArgs, mut config: SpvConfig) -> SpvConfig {
    if args.genesis.is_some() {
        config.verifier.genesis = args.genesis;
    }
    if let Some(m) = args.m {
        config.verifier.m = m;
    }
    if let Some(k) = args.k {
        config.verifier.k = k;
    }
    if args.header_id.is_some() {
        config.target.header_id = args.header_id;
    }
    if args.tx_id.is_some() {
        config.target.tx_id = args.tx_id;
    }
    if !args.peers.is_empty() {
        config.peers.proof_peers = args.peers;
    }
    if args.header_peer.is_some() {
        config.peers.header_peer = args.header_peer;
    }
    if let Some(data_dir) = args.data_dir {
        config.peers.data_dir = data_dir;
    }
    config
}

/// Build the request, failing on the first missing setting.
pub fn build_request(config: &SpvConfig) -> Result<SpvRequest, Box<dyn std::error::Error>> {
    let header_id = config
        .target
        .header_id
        .ok_or("No header id given (--header-id or [target] header_id)")?;
    let tx_id = config
        .target
        .tx_id
        .ok_or("No transaction id given (--tx-id or [target] tx_id)")?;
    if config.peers.proof_peers.is_empty() {
        return Err("No proof peers given (--peer or [peers] proof_peers)".into());
    }
    let header_peer = config
        .peers
        .header_peer
        .clone()
        .or_else(|| config.peers.proof_peers.first().cloned())
        .ok_or("No header peer given")?;

    Ok(SpvRequest {
        header_id,
        tx_id,
        proof_peers: config.peers.proof_peers.clone(),
        header_peer,
    })
}

fn print_report(report: &InclusionReport) {
    println!("Peers:");
    for outcome in &report.peers {
        let status = match &outcome.result {
            PeerResult::Processed(ProcessOutcome::BetterChain) => "✅ new best proof".to_string(),
            PeerResult::Processed(ProcessOutcome::NoBetterChain) => "✅ valid, not better".to_string(),
            PeerResult::Processed(ProcessOutcome::Rejected(err)) => format!("❌ rejected: {}", err),
            PeerResult::Malformed(err) => format!("❌ malformed: {}", err),
            PeerResult::Transport(err) => format!("❌ unreachable: {}", err),
        };
        println!("  {}: {}", outcome.peer, status);
    }
    println!();
    println!(
        "✅ Transaction {} is included in block {} at height {}",
        report.tx_id, report.header.id, report.header.height
    );
    println!(
        "   {} of {} peers sent a valid proof",
        report.valid_proofs(),
        report.peers.len()
    );
}

pub async fn execute(args: VerifyArgs, config: SpvConfig) -> Result<(), Box<dyn std::error::Error>> {
    let config = apply_overrides(args, config);
    let genesis = config
        .verifier
        .genesis
        .ok_or("No genesis id given (--genesis or [verifier] genesis)")?;
    let request = build_request(&config)?;

    let mut verifier = NipopowVerifier::with_params(genesis, config.verifier.params())?;
    let client = FsNodeClient::new(&config.peers.data_dir);

    println!("🔍 Verifying transaction {}", request.tx_id);
    println!("   block:  {}", request.header_id);
    println!("   peers:  {}", request.proof_peers.join(", "));
    println!();

    let report = verify_inclusion(&client, &mut verifier, &request).await?;
    print_report(&report);
    Ok(())
}
