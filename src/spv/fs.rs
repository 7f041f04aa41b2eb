//! Node client backed by JSON dumps on disk.
//!
//! Each peer is a directory laid out like the node REST API:
//!
//! ```text
//! <root>/<peer>/nipopow/proof/<m>/<k>/<header_id>.json
//! <root>/<peer>/blocks/<header_id>/header.json
//! <root>/<peer>/blocks/<header_id>/proofFor/<tx_id>.json
//! ```

use super::traits::{NodeClient, TransportError, TransportResult};
use crate::chain::header::BlockHeader;
use crate::chain::types::{BlockId, Digest32};
use crate::merkle::MerkleProof;
use crate::nipopow::{NipopowProof, PoPowParams};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FsNodeClient {
    root: PathBuf,
}

impl FsNodeClient {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of `peer`. Peer names are single path components.
    fn peer_dir(&self, peer: &str) -> TransportResult<PathBuf> {
        let mut components = Path::new(peer).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(self.root.join(peer)),
            _ => Err(TransportError::Unavailable(format!(
                "invalid peer name: {}",
                peer
            ))),
        }
    }

    pub fn proof_path(
        &self,
        peer: &str,
        params: &PoPowParams,
        header_id: &BlockId,
    ) -> TransportResult<PathBuf> {
        Ok(self
            .peer_dir(peer)?
            .join("nipopow")
            .join("proof")
            .join(params.m.to_string())
            .join(params.k.to_string())
            .join(format!("{}.json", header_id)))
    }

    pub fn header_path(&self, peer: &str, header_id: &BlockId) -> TransportResult<PathBuf> {
        Ok(self
            .peer_dir(peer)?
            .join("blocks")
            .join(header_id.to_hex())
            .join("header.json"))
    }

    pub fn merkle_proof_path(
        &self,
        peer: &str,
        header_id: &BlockId,
        tx_id: &Digest32,
    ) -> TransportResult<PathBuf> {
        Ok(self
            .peer_dir(peer)?
            .join("blocks")
            .join(header_id.to_hex())
            .join("proofFor")
            .join(format!("{}.json", tx_id)))
    }

    async fn read(&self, path: PathBuf) -> TransportResult<Vec<u8>> {
        debug!(path = %path.display(), "Reading node dump");
        Ok(tokio::fs::read(&path).await?)
    }

    async fn write(&self, path: PathBuf, bytes: Vec<u8>) -> TransportResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }

    /// Store `proof` for `peer` under its suffix head.
    pub async fn write_proof(
        &self,
        peer: &str,
        params: &PoPowParams,
        proof: &NipopowProof,
    ) -> TransportResult<()> {
        let head = proof
            .suffix_head()
            .ok_or_else(|| TransportError::Io("proof has an empty suffix".to_string()))?;
        let path = self.proof_path(peer, params, &head.id)?;
        let bytes = serde_json::to_vec_pretty(proof).map_err(|e| TransportError::Io(e.to_string()))?;
        self.write(path, bytes).await
    }

    pub async fn write_header(&self, peer: &str, header: &BlockHeader) -> TransportResult<()> {
        let path = self.header_path(peer, &header.id)?;
        let bytes =
            serde_json::to_vec_pretty(header).map_err(|e| TransportError::Io(e.to_string()))?;
        self.write(path, bytes).await
    }

    pub async fn write_merkle_proof(
        &self,
        peer: &str,
        header_id: &BlockId,
        proof: &MerkleProof,
    ) -> TransportResult<()> {
        let path = self.merkle_proof_path(peer, header_id, &proof.leaf)?;
        let bytes =
            serde_json::to_vec_pretty(proof).map_err(|e| TransportError::Io(e.to_string()))?;
        self.write(path, bytes).await
    }
}

#[async_trait]
impl NodeClient for FsNodeClient {
    async fn fetch_proof(
        &self,
        peer: &str,
        params: &PoPowParams,
        header_id: &BlockId,
    ) -> TransportResult<Vec<u8>> {
        let path = self.proof_path(peer, params, header_id)?;
        self.read(path).await
    }

    async fn fetch_header(&self, peer: &str, header_id: &BlockId) -> TransportResult<Vec<u8>> {
        let path = self.header_path(peer, header_id)?;
        self.read(path).await
    }

    async fn fetch_merkle_proof(
        &self,
        peer: &str,
        header_id: &BlockId,
        tx_id: &Digest32,
    ) -> TransportResult<Vec<u8>> {
        let path = self.merkle_proof_path(peer, header_id, tx_id)?;
        self.read(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nipopow::sim::SimChain;
    use tempfile::TempDir;

    #[test]
    fn test_paths_follow_rest_layout() {
        let client = FsNodeClient::new("/dumps");
        let id = BlockId(Digest32([0xab; 32]));
        let tx = Digest32([0xcd; 32]);
        let params = PoPowParams::default();

        assert_eq!(
            client.proof_path("node-a", &params, &id).unwrap(),
            PathBuf::from(format!("/dumps/node-a/nipopow/proof/5/6/{}.json", "ab".repeat(32)))
        );
        assert_eq!(
            client.header_path("node-a", &id).unwrap(),
            PathBuf::from(format!("/dumps/node-a/blocks/{}/header.json", "ab".repeat(32)))
        );
        assert_eq!(
            client.merkle_proof_path("node-a", &id, &tx).unwrap(),
            PathBuf::from(format!(
                "/dumps/node-a/blocks/{}/proofFor/{}.json",
                "ab".repeat(32),
                "cd".repeat(32)
            ))
        );
    }

    #[test]
    fn test_peer_names_cannot_escape_root() {
        let client = FsNodeClient::new("/dumps");
        let id = BlockId::default();
        assert!(client.header_path("../etc", &id).is_err());
        assert!(client.header_path("a/b", &id).is_err());
        assert!(client.header_path("", &id).is_err());
    }

    #[tokio::test]
    async fn test_write_then_fetch() {
        let dir = TempDir::new().unwrap();
        let client = FsNodeClient::new(dir.path());
        let mut chain = SimChain::new(61);
        chain.extend(8);
        let params = PoPowParams::new(1, 6).unwrap();
        let proof = chain.proof_at_level(0, 6).unwrap();

        client.write_proof("node-a", &params, &proof).await.unwrap();
        client.write_header("node-a", chain.tip()).await.unwrap();

        let bytes = client.fetch_proof("node-a", &params, &chain.tip().id).await.unwrap();
        assert_eq!(NipopowProof::from_json(&bytes).unwrap(), proof);

        let bytes = client.fetch_header("node-a", &chain.tip().id).await.unwrap();
        let header: BlockHeader = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(&header, chain.tip());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let client = FsNodeClient::new(dir.path());
        let result = client.fetch_header("node-a", &BlockId::default()).await;
        assert!(matches!(result, Err(TransportError::NotFound(_))));
    }
}
