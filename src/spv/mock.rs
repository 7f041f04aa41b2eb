//! In-memory node client for tests.

use super::traits::{NodeClient, TransportError, TransportResult};
use crate::chain::header::BlockHeader;
use crate::chain::types::{BlockId, Digest32};
use crate::merkle::MerkleProof;
use crate::nipopow::{NipopowProof, PoPowParams};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Mock node client serving canned responses per peer.
#[derive(Clone, Default)]
pub struct MockNodeClient {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    proofs: HashMap<(String, BlockId), Vec<u8>>,
    headers: HashMap<(String, BlockId), Vec<u8>>,
    merkle_proofs: HashMap<(String, BlockId, Digest32), Vec<u8>>,
    offline: HashSet<String>,
    requests: usize,
}

impl MockNodeClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Serve `proof` from `peer` for requests ending at its suffix head.
    pub fn put_proof(&self, peer: &str, proof: &NipopowProof) {
        if let (Some(head), Ok(bytes)) = (proof.suffix_head(), serde_json::to_vec(proof)) {
            self.put_raw_proof(peer, head.id, bytes);
        }
    }

    /// Serve arbitrary bytes as the proof for `header_id`.
    pub fn put_raw_proof(&self, peer: &str, header_id: BlockId, bytes: Vec<u8>) {
        self.state()
            .proofs
            .insert((peer.to_string(), header_id), bytes);
    }

    pub fn put_header(&self, peer: &str, header: &BlockHeader) {
        if let Ok(bytes) = serde_json::to_vec(header) {
            self.state()
                .headers
                .insert((peer.to_string(), header.id), bytes);
        }
    }

    pub fn put_merkle_proof(&self, peer: &str, header_id: BlockId, proof: &MerkleProof) {
        if let Ok(bytes) = serde_json::to_vec(proof) {
            self.state()
                .merkle_proofs
                .insert((peer.to_string(), header_id, proof.leaf), bytes);
        }
    }

    /// Make every request to `peer` fail with `Unavailable`.
    pub fn set_offline(&self, peer: &str) {
        self.state().offline.insert(peer.to_string());
    }

    /// Number of requests served or refused so far.
    pub fn request_count(&self) -> usize {
        self.state().requests
    }

    fn lookup<K>(
        &self,
        peer: &str,
        key: &K,
        table: impl Fn(&MockState) -> &HashMap<K, Vec<u8>>,
    ) -> TransportResult<Vec<u8>>
    where
        K: std::hash::Hash + Eq,
    {
        let mut state = self.state();
        state.requests += 1;
        if state.offline.contains(peer) {
            return Err(TransportError::Unavailable(peer.to_string()));
        }
        table(&*state)
            .get(key)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(peer.to_string()))
    }
}

#[async_trait]
impl NodeClient for MockNodeClient {
    async fn fetch_proof(
        &self,
        peer: &str,
        _params: &PoPowParams,
        header_id: &BlockId,
    ) -> TransportResult<Vec<u8>> {
        self.lookup(peer, &(peer.to_string(), *header_id), |s| &s.proofs)
    }

    async fn fetch_header(&self, peer: &str, header_id: &BlockId) -> TransportResult<Vec<u8>> {
        self.lookup(peer, &(peer.to_string(), *header_id), |s| &s.headers)
    }

    async fn fetch_merkle_proof(
        &self,
        peer: &str,
        header_id: &BlockId,
        tx_id: &Digest32,
    ) -> TransportResult<Vec<u8>> {
        self.lookup(
            peer,
            &(peer.to_string(), *header_id, *tx_id),
            |s| &s.merkle_proofs,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nipopow::sim::SimChain;

    #[tokio::test]
    async fn test_mock_serves_header() {
        let mut chain = SimChain::new(51);
        chain.extend(2);
        let client = MockNodeClient::new();
        client.put_header("node-a", chain.tip());

        let bytes = client.fetch_header("node-a", &chain.tip().id).await.unwrap();
        let header: BlockHeader = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(&header, chain.tip());
    }

    #[tokio::test]
    async fn test_mock_not_found() {
        let client = MockNodeClient::new();
        let result = client.fetch_header("node-a", &BlockId::default()).await;
        assert!(matches!(result, Err(TransportError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_mock_offline_peer() {
        let mut chain = SimChain::new(52);
        chain.extend(8);
        let client = MockNodeClient::new();
        let proof = chain.proof_at_level(0, 6).unwrap();
        client.put_proof("node-a", &proof);
        client.set_offline("node-a");

        let result = client
            .fetch_proof("node-a", &PoPowParams::default(), &chain.tip().id)
            .await;
        assert!(matches!(result, Err(TransportError::Unavailable(_))));
        assert_eq!(client.request_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_proofs_are_per_peer() {
        let mut chain = SimChain::new(53);
        chain.extend(8);
        let client = MockNodeClient::new();
        client.put_proof("node-a", &chain.proof_at_level(0, 6).unwrap());

        let params = PoPowParams::default();
        assert!(client.fetch_proof("node-a", &params, &chain.tip().id).await.is_ok());
        assert!(client.fetch_proof("node-b", &params, &chain.tip().id).await.is_err());
    }
}
