//! End-to-end SPV inclusion check.
//!
//! The flow:
//! 1. Fetch proofs ending at the target header from every proof peer, concurrently
//! 2. Feed each parsed proof to the verifier (bad ones are logged and skipped)
//! 3. Require a best proof whose suffix head is the target header
//! 4. Fetch the header and the transaction's Merkle path from the header peer
//! 5. Check the path against the header's transactions root
//!
//! Steps 3 to 5 are also available on already-fetched data through
//! [`check_inclusion`].

pub mod fs;
pub mod mock;
pub mod traits;

pub use fs::FsNodeClient;
pub use mock::MockNodeClient;
pub use traits::{NodeClient, TransportError, TransportResult};

use crate::chain::header::BlockHeader;
use crate::chain::types::{BlockId, Digest32};
use crate::error::SpvError;
use crate::merkle::MerkleProof;
use crate::nipopow::{NipopowProof, NipopowVerifier, ProcessOutcome};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What to prove and whom to ask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpvRequest {
    pub header_id: BlockId,
    pub tx_id: Digest32,
    /// Peers asked for NiPoPoW proofs.
    pub proof_peers: Vec<String>,
    /// Peer asked for the header and the Merkle path.
    pub header_peer: String,
}

/// How one proof peer's answer was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerResult {
    Processed(ProcessOutcome),
    Malformed(String),
    Transport(TransportError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerOutcome {
    pub peer: String,
    pub result: PeerResult,
}

/// Successful inclusion check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionReport {
    pub header: BlockHeader,
    pub tx_id: Digest32,
    pub peers: Vec<PeerOutcome>,
}

impl InclusionReport {
    /// Number of peers whose proof passed structural validation.
    pub fn valid_proofs(&self) -> usize {
        self.peers
            .iter()
            .filter(|p| {
                matches!(
                    p.result,
                    PeerResult::Processed(ProcessOutcome::BetterChain)
                        | PeerResult::Processed(ProcessOutcome::NoBetterChain)
                )
            })
            .count()
    }
}

/// Check that `tx_id` is in `header` and that `header` ends the best proof.
pub fn check_inclusion(
    verifier: &NipopowVerifier,
    header_id: &BlockId,
    header: &BlockHeader,
    merkle: &MerkleProof,
    tx_id: &Digest32,
) -> Result<(), SpvError> {
    let best = verifier.require_best()?;
    let head = best.suffix_head();
    if head.id != *header_id {
        return Err(SpvError::HeadMismatch {
            expected: *header_id,
            found: head.id,
        });
    }

    if header.id != *header_id {
        return Err(SpvError::HeaderMismatch(format!(
            "received header {} for requested {}",
            header.id, header_id
        )));
    }
    if !header.has_valid_id() {
        return Err(SpvError::HeaderMismatch(format!(
            "header {} does not hash to its id",
            header.id
        )));
    }

    if merkle.leaf != *tx_id || !merkle.is_valid(&header.transactions_root) {
        return Err(SpvError::InvalidMerkleProof {
            tx_id: *tx_id,
            header_id: *header_id,
        });
    }
    Ok(())
}

/// Run the full inclusion check for `request` through `client`.
pub async fn verify_inclusion<C>(
    client: &C,
    verifier: &mut NipopowVerifier,
    request: &SpvRequest,
) -> Result<InclusionReport, SpvError>
where
    C: NodeClient + ?Sized,
{
    let params = *verifier.params();
    let header_id = request.header_id;

    let fetches = request.proof_peers.iter().map(|peer| async move {
        let response = client.fetch_proof(peer, &params, &header_id).await;
        (peer.clone(), response)
    });
    let responses = join_all(fetches).await;

    let mut peers = Vec::with_capacity(responses.len());
    for (peer, response) in responses {
        let result = match response {
            Ok(bytes) => match NipopowProof::from_json(&bytes) {
                Ok(proof) => PeerResult::Processed(verifier.process(proof)),
                Err(err) => {
                    warn!(peer = %peer, error = %err, "Skipping malformed proof");
                    PeerResult::Malformed(err.to_string())
                }
            },
            Err(err) => {
                warn!(peer = %peer, error = %err, "Proof fetch failed");
                PeerResult::Transport(err)
            }
        };
        peers.push(PeerOutcome { peer, result });
    }

    {
        let best = verifier.require_best()?;
        if best.suffix_head().id != header_id {
            return Err(SpvError::HeadMismatch {
                expected: header_id,
                found: best.suffix_head().id,
            });
        }
    }

    let (header_bytes, merkle_bytes) = futures::join!(
        client.fetch_header(&request.header_peer, &header_id),
        client.fetch_merkle_proof(&request.header_peer, &header_id, &request.tx_id),
    );
    let header: BlockHeader = serde_json::from_slice(&header_bytes?)
        .map_err(|e| SpvError::HeaderMismatch(format!("malformed header: {}", e)))?;
    let merkle: MerkleProof = serde_json::from_slice(&merkle_bytes?)?;

    check_inclusion(verifier, &header_id, &header, &merkle, &request.tx_id)?;

    info!(
        header = %header_id,
        height = header.height,
        tx = %request.tx_id,
        "Transaction inclusion verified"
    );

    Ok(InclusionReport {
        header,
        tx_id: request.tx_id,
        peers,
    })
}
