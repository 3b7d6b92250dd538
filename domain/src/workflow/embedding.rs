//! Deterministic placeholder embeddings
//!
//! When a connector expects a query vector and no embedding service is
//! reachable, the executor fabricates one. The vector is a pure function of
//! the query text: a SHA-256 digest seeds a counter-mode generator, so
//! repeated runs and audit replays see identical values.

use sha2::{Digest, Sha256};

/// Dimensions used when neither a hint nor a maximum is known
pub const DEFAULT_PLACEHOLDER_DIMENSIONS: usize = 32;

/// Upper bound on fabricated vector length
pub const MAX_PLACEHOLDER_DIMENSIONS: usize = 4096;

fn seed(query: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(query.trim().as_bytes());
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Short stable identifier for a query (first 8 digest bytes, hex)
pub fn query_fingerprint(query: &str) -> String {
    hex::encode(&seed(query)[..8])
}

/// Fabricate a unit-length vector of `dimensions` components from `query`.
pub fn deterministic_embedding(query: &str, dimensions: usize) -> Vec<f64> {
    let dimensions = dimensions.clamp(1, MAX_PLACEHOLDER_DIMENSIONS);
    let seed = seed(query);

    let mut raw = Vec::with_capacity(dimensions);
    let mut block: u64 = 0;
    while raw.len() < dimensions {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(block.to_le_bytes());
        let digest = hasher.finalize();

        for chunk in digest.chunks_exact(4) {
            if raw.len() == dimensions {
                break;
            }
            let n = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            raw.push(f64::from(n) / f64::from(u32::MAX) * 2.0 - 1.0);
        }
        block += 1;
    }

    let norm = raw.iter().map(|x| x * x).sum::<f64>().sqrt();
    raw.into_iter()
        .map(|x| {
            let unit = if norm > 0.0 { x / norm } else { 0.0 };
            (unit * 1e6).round() / 1e6
        })
        .collect()
}
