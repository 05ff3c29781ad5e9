//! Entropy seam for unpredictable id derivation
//!
//! Message ids mix a 32-byte beacon into the hash so ids cannot be
//! predicted by brute force even when sender, recipient, and timestamp are
//! known. The beacon comes through the `EntropySource` trait; tests use a
//! deterministic counter so derivations are reproducible.

use rand::rngs::OsRng;
use rand::RngCore;

/// Synchronous source of 32-byte entropy beacons.
pub trait EntropySource {
    /// Produce the next beacon.
    fn beacon(&mut self) -> [u8; 32];
}

/// Operating-system entropy source.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropySource;

impl EntropySource for OsEntropySource {
    fn beacon(&mut self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        OsRng.fill_bytes(&mut bytes);
        bytes
    }
}

/// Deterministic counter-based entropy for tests.
///
/// Each beacon is the little-endian counter value padded to 32 bytes, so
/// successive beacons are distinct but fully reproducible.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountingEntropySource {
    counter: u64,
}

impl CountingEntropySource {
    /// Start counting from zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntropySource for CountingEntropySource {
    fn beacon(&mut self) -> [u8; 32] {
        self.counter += 1;
        let mut bytes = [0u8; 32];
        bytes[..8].copy_from_slice(&self.counter.to_le_bytes());
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counting_source_is_distinct_and_reproducible() {
        let mut a = CountingEntropySource::new();
        let mut b = CountingEntropySource::new();
        let first = a.beacon();
        let second = a.beacon();
        assert_ne!(first, second);
        assert_eq!(first, b.beacon());
    }

    #[test]
    fn test_os_source_varies() {
        let mut source = OsEntropySource;
        assert_ne!(source.beacon(), source.beacon());
    }
}
