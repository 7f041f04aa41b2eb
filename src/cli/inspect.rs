use nipopow_spv::chain::{BlockHeader, BlockId, GENESIS_LEVEL};
use nipopow_spv::nipopow::{validate_proof, NipopowProof, PoPowParams};
use std::path::Path;

fn level_label(header: &BlockHeader) -> String {
    match header.level() {
        GENESIS_LEVEL => "genesis".to_string(),
        level => level.to_string(),
    }
}

/// Render one line per block: section, height, level, id.
pub fn describe(proof: &NipopowProof) -> Vec<String> {
    let prefix = proof.prefix.iter().map(|p| ("prefix", &p.header));
    let suffix = proof.suffix.iter().map(|h| ("suffix", h));
    prefix
        .chain(suffix)
        .map(|(section, header)| {
            format!(
                "{:<6} {:>8}  level {:<7} {}",
                section,
                header.height,
                level_label(header),
                header.id
            )
        })
        .collect()
}

/// Parse and validate a proof file
pub async fn execute(
    path: &Path,
    genesis: BlockId,
    m: u32,
    k: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let params = PoPowParams::new(m, k)?;
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Failed to read proof file '{}': {}", path.display(), e))?;
    let proof = NipopowProof::from_json(&bytes)?;

    println!(
        "Proof with {} prefix and {} suffix blocks",
        proof.prefix.len(),
        proof.suffix.len()
    );
    for line in describe(&proof) {
        println!("  {}", line);
    }
    println!();

    match validate_proof(&proof, &genesis, &params) {
        Ok(()) => {
            println!("✅ Structurally valid (m = {}, k = {})", m, k);
            Ok(())
        }
        Err(err) => {
            println!("❌ Invalid: {}", err);
            Err(err.into())
        }
    }
}
