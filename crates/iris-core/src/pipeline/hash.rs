//! Content hashing for intra-batch deduplication.

use blake3::Hasher as Blake3Hasher;

/// Content hasher. Identity only; not used for anything security-sensitive.
pub struct Hasher;

impl Hasher {
    /// BLAKE3 hex digest of an in-memory byte buffer.
    pub fn content_hash(data: &[u8]) -> String {
        let mut hasher = Blake3Hasher::new();
        hasher.update(data);
        hasher.finalize().to_hex().to_string()
    }

    /// First 8 hex chars, for log lines.
    pub fn short(hash: &str) -> &str {
        hash.get(..8).unwrap_or(hash)
    }
}
