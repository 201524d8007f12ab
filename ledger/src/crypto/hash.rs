//! # Hashing Utilities
//!
//! The one hash function POLARIS uses, wrapped once, in one place.
//!
//! Block digests are SHA-256. Not because it is the fastest option (it
//! isn't), but because claim hashes are meant to be independently
//! re-derivable by auditors, wallets, and scripts in whatever language
//! they happen to be written in, and every language ships a trustworthy
//! SHA-256. A ledger whose integrity check requires a niche dependency
//! is a ledger nobody audits.
//!
//! If you are tempted to add a second hash function here, bring a
//! consumer for it or don't bring it at all.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input and return a fixed-size array.
///
/// This is the digest behind every block hash in the chain. The array
/// return type propagates naturally into `[u8; 32]` block fields without
/// a heap allocation.
///
/// # Example
///
/// ```
/// use polaris_ledger::crypto::hash::sha256_array;
///
/// let digest = sha256_array(b"polaris");
/// assert_eq!(digest.len(), 32);
/// ```
pub fn sha256_array(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        // SHA-256 of the empty string. The canonical test vector everyone
        // should have memorized by now.
        let digest = sha256_array(b"");
        let expected =
            hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
                .unwrap();
        assert_eq!(digest.as_slice(), expected.as_slice());
    }

    #[test]
    fn sha256_deterministic() {
        let a = sha256_array(b"polaris");
        let b = sha256_array(b"polaris");
        assert_eq!(a, b);
    }

    #[test]
    fn sha256_case_sensitive() {
        assert_ne!(sha256_array(b"polaris"), sha256_array(b"Polaris"));
    }
}
