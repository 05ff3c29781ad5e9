//! Single-algorithm hash helper for id derivation and commitments
//!
//! Hashing here is pure and synchronous; there is one place to change the
//! algorithm and every call site follows automatically.
//!
//! Current algorithm: **SHA-256** (32-byte output).

use sha2::{Digest, Sha256};

/// Hash arbitrary bytes to a 32-byte digest.
pub fn hash(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Incremental hasher for multi-part input.
#[derive(Debug, Default)]
pub struct IncrementalHasher(Sha256);

impl IncrementalHasher {
    /// Create an empty hasher.
    pub fn new() -> Self {
        Self(Sha256::new())
    }

    /// Feed more bytes into the hash.
    pub fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    /// Finish and return the 32-byte digest.
    pub fn finalize(self) -> [u8; 32] {
        let mut output = [0u8; 32];
        output.copy_from_slice(&self.0.finalize());
        output
    }
}
