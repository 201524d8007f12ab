//! # Block Structure
//!
//! A block is the atomic unit of the POLARIS chain. Each block carries a
//! body (the genesis marker or one star claim), a link to the previous
//! block's hash, and its own SHA-256 digest sealing the whole record.
//!
//! ## Block Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │  Block                                           │
//! │  ├── height: u64            (index in the chain) │
//! │  ├── timestamp: i64         (Unix seconds)       │
//! │  ├── previous_hash: Option<[u8; 32]>             │
//! │  ├── hash: [u8; 32]         (SHA-256, see below) │
//! │  └── body: BlockBody                             │
//! │       ├── Genesis   { marker }                   │
//! │       └── StarClaim { address, message, star }   │
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! ## Hash Computation
//!
//! The block hash covers every field except the hash itself, in a fixed
//! order: `height || timestamp || previous_hash || body`. Integers are
//! little-endian. `previous_hash` is a presence byte (0 or 1) followed by
//! the 32 raw bytes when present. The body contributes a variant tag
//! byte followed by its fields, each as a `u32` little-endian length
//! prefix plus raw bytes: the genesis marker in UTF-8, or the claim's
//! Bech32 address string, message, and star payload as canonical JSON
//! (object keys serialize in sorted order). Length prefixes keep field
//! boundaries unambiguous, so the encoding is reproducible by any
//! implementation that follows this paragraph.
//!
//! Blocks are immutable after construction. Anything that mutates one
//! afterwards is, definitionally, tampering, and `verify()` exists to
//! catch exactly that.

use serde::{Deserialize, Serialize};

use crate::config::GENESIS_MARKER;
use crate::crypto::hash::sha256_array;
use crate::identity::StarAddress;

// ---------------------------------------------------------------------------
// BlockBody
// ---------------------------------------------------------------------------

/// The payload of a block, as a tagged variant so consumers can match
/// exhaustively instead of poking at an untyped map.
///
/// Exactly one block per chain carries `Genesis`; every other block
/// carries one verified `StarClaim`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockBody {
    /// The chain's fixed first entry. The marker text is a constant;
    /// its presence (not its novelty) is what makes genesis recognizable.
    Genesis {
        /// Fixed marker text, `config::GENESIS_MARKER`.
        marker: String,
    },

    /// A star registration admitted after ownership verification.
    StarClaim {
        /// The wallet address that proved ownership.
        address: StarAddress,
        /// The exact challenge message the wallet signed.
        message: String,
        /// Client-supplied payload. Opaque to the ledger; stored and
        /// returned verbatim.
        star: serde_json::Value,
    },
}

impl BlockBody {
    /// The genesis body with the protocol's fixed marker.
    pub fn genesis() -> Self {
        BlockBody::Genesis {
            marker: GENESIS_MARKER.to_string(),
        }
    }

    /// Append this body's canonical encoding to a hash preimage.
    ///
    /// Variant tag byte first, then each variable-length field with a
    /// `u32` LE length prefix. See the module docs for the full layout.
    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            BlockBody::Genesis { marker } => {
                out.push(0);
                push_field(out, marker.as_bytes());
            }
            BlockBody::StarClaim {
                address,
                message,
                star,
            } => {
                out.push(1);
                push_field(out, address.encode().as_bytes());
                push_field(out, message.as_bytes());
                // serde_json sorts object keys, so this byte string is
                // canonical for the payload.
                let star_json = serde_json::to_vec(star)
                    .expect("serializing a JSON value cannot fail");
                push_field(out, &star_json);
            }
        }
    }
}

/// Write one length-prefixed field into a preimage buffer.
fn push_field(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(bytes);
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// A sealed POLARIS block.
///
/// Construction goes through [`Block::seal`], which computes the hash
/// from the other fields. The struct's fields are public for inspection
/// and serialization; treat them as read-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Zero-based position in the chain. Genesis is 0.
    pub height: u64,
    /// Unix timestamp in seconds, assigned at append time.
    pub timestamp: i64,
    /// Hash of the preceding block. `None` only for genesis.
    pub previous_hash: Option<[u8; 32]>,
    /// SHA-256 over this block's other fields in canonical order.
    pub hash: [u8; 32],
    /// Genesis marker or star claim.
    pub body: BlockBody,
}

impl Block {
    /// Seal a block: compute its hash over the given fields and return
    /// the finished record.
    ///
    /// The caller (the chain manager) decides height, timestamp, and
    /// linkage under its own lock; this function only makes the record
    /// tamper-evident.
    pub fn seal(
        height: u64,
        timestamp: i64,
        previous_hash: Option<[u8; 32]>,
        body: BlockBody,
    ) -> Self {
        let hash = compute_block_hash(height, timestamp, previous_hash.as_ref(), &body);
        Block {
            height,
            timestamp,
            previous_hash,
            hash,
            body,
        }
    }

    /// Recompute the hash from this block's current field values.
    ///
    /// Use this to check that `hash` still matches the actual content.
    pub fn compute_hash(&self) -> [u8; 32] {
        compute_block_hash(
            self.height,
            self.timestamp,
            self.previous_hash.as_ref(),
            &self.body,
        )
    }

    /// Verify block integrity: hash consistency and structural
    /// invariants.
    ///
    /// This checks:
    ///
    /// 1. The stored hash matches the recomputed hash.
    /// 2. Genesis blocks (height 0) have no previous hash and a genesis
    ///    body.
    /// 3. Non-genesis blocks have a previous hash.
    ///
    /// Linkage to the actual preceding block is a chain-level property
    /// and lives in the chain manager's validation pass.
    ///
    /// # Errors
    ///
    /// Returns a descriptive error string on any mismatch.
    pub fn verify(&self) -> Result<(), String> {
        // 1. Verify the stored hash.
        let expected_hash = self.compute_hash();
        if self.hash != expected_hash {
            return Err(format!(
                "block {} hash mismatch: stored={}, computed={}",
                self.height,
                hex::encode(self.hash),
                hex::encode(expected_hash),
            ));
        }

        // 2. Genesis-specific checks.
        if self.height == 0 {
            if self.previous_hash.is_some() {
                return Err("genesis block must not have a previous hash".to_string());
            }
            if !matches!(self.body, BlockBody::Genesis { .. }) {
                return Err("genesis block must carry the genesis body".to_string());
            }
        } else if self.previous_hash.is_none() {
            // 3. Everything after genesis must link backwards.
            return Err(format!(
                "block {} is missing its previous hash",
                self.height
            ));
        }

        Ok(())
    }

    /// The block hash as a hex string.
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// The previous-hash link as a hex string, if present.
    pub fn previous_hash_hex(&self) -> Option<String> {
        self.previous_hash.map(hex::encode)
    }
}

// ---------------------------------------------------------------------------
// Hash Computation
// ---------------------------------------------------------------------------

/// Compute the SHA-256 hash of a block from its constituent fields.
///
/// The hash covers `height || timestamp || previous_hash || body` in the
/// canonical encoding described in the module docs. The stored hash
/// field is never part of its own input.
fn compute_block_hash(
    height: u64,
    timestamp: i64,
    previous_hash: Option<&[u8; 32]>,
    body: &BlockBody,
) -> [u8; 32] {
    let mut preimage = Vec::with_capacity(192);
    preimage.extend_from_slice(&height.to_le_bytes());
    preimage.extend_from_slice(&timestamp.to_le_bytes());
    match previous_hash {
        Some(prev) => {
            preimage.push(1);
            preimage.extend_from_slice(prev);
        }
        None => preimage.push(0),
    }
    body.encode_into(&mut preimage);
    sha256_array(&preimage)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::WalletKeypair;
    use serde_json::json;

    fn test_address() -> StarAddress {
        let wallet = WalletKeypair::from_seed(&[9u8; 32]);
        StarAddress::from_public_key(&wallet.public_key())
    }

    fn claim_body(message: &str, star: serde_json::Value) -> BlockBody {
        BlockBody::StarClaim {
            address: test_address(),
            message: message.to_string(),
            star,
        }
    }

    #[test]
    fn genesis_block_properties() {
        let genesis = Block::seal(0, 1_700_000_000, None, BlockBody::genesis());
        assert_eq!(genesis.height, 0);
        assert!(genesis.previous_hash.is_none());
        assert!(matches!(genesis.body, BlockBody::Genesis { ref marker } if marker == GENESIS_MARKER));
    }

    #[test]
    fn genesis_block_verifies() {
        let genesis = Block::seal(0, 1_700_000_000, None, BlockBody::genesis());
        assert!(genesis.verify().is_ok());
    }

    #[test]
    fn seal_is_deterministic() {
        let b1 = Block::seal(0, 1_700_000_000, None, BlockBody::genesis());
        let b2 = Block::seal(0, 1_700_000_000, None, BlockBody::genesis());
        assert_eq!(b1.hash, b2.hash);
    }

    #[test]
    fn sealed_claim_block_verifies() {
        let genesis = Block::seal(0, 1_700_000_000, None, BlockBody::genesis());
        let block = Block::seal(
            1,
            1_700_000_010,
            Some(genesis.hash),
            claim_body("m", json!({"ra": "16h 29m", "dec": "-26d 26m"})),
        );
        assert_eq!(block.height, 1);
        assert_eq!(block.previous_hash, Some(genesis.hash));
        assert!(block.verify().is_ok());
    }

    #[test]
    fn tampered_hash_fails_verification() {
        let mut block = Block::seal(0, 1_700_000_000, None, BlockBody::genesis());
        block.hash[0] ^= 0xFF;
        assert!(block.verify().is_err());
    }

    #[test]
    fn tampered_body_fails_verification() {
        let genesis = Block::seal(0, 1_700_000_000, None, BlockBody::genesis());
        let mut block = Block::seal(
            1,
            1_700_000_010,
            Some(genesis.hash),
            claim_body("original", json!("Orion's belt")),
        );

        // Rewrite the star after sealing, leaving the stored hash alone.
        if let BlockBody::StarClaim { star, .. } = &mut block.body {
            *star = json!("someone else's star");
        }
        let err = block.verify().unwrap_err();
        assert!(err.contains("hash mismatch"), "unexpected error: {err}");
    }

    #[test]
    fn tampered_body_with_recomputed_hash_passes_self_check() {
        // A tamperer who also refreshes the stored hash defeats the
        // block-local check. Catching this is the chain validator's job,
        // via the broken link to the successor.
        let mut block = Block::seal(1, 1_700_000_010, Some([3u8; 32]), claim_body("m", json!(1)));
        if let BlockBody::StarClaim { star, .. } = &mut block.body {
            *star = json!(2);
        }
        block.hash = block.compute_hash();
        assert!(block.verify().is_ok());
    }

    #[test]
    fn non_genesis_block_requires_previous_hash() {
        let orphan = Block::seal(5, 1_700_000_000, None, claim_body("m", json!(null)));
        let err = orphan.verify().unwrap_err();
        assert!(err.contains("previous hash"), "unexpected error: {err}");
    }

    #[test]
    fn genesis_with_previous_hash_rejected() {
        let bogus = Block::seal(0, 1_700_000_000, Some([1u8; 32]), BlockBody::genesis());
        assert!(bogus.verify().is_err());
    }

    #[test]
    fn genesis_with_claim_body_rejected() {
        let bogus = Block::seal(0, 1_700_000_000, None, claim_body("m", json!(true)));
        assert!(bogus.verify().is_err());
    }

    #[test]
    fn hash_covers_every_field() {
        let base = Block::seal(1, 1_700_000_010, Some([3u8; 32]), claim_body("m", json!("s")));

        let other_height = Block::seal(2, 1_700_000_010, Some([3u8; 32]), claim_body("m", json!("s")));
        let other_time = Block::seal(1, 1_700_000_011, Some([3u8; 32]), claim_body("m", json!("s")));
        let other_prev = Block::seal(1, 1_700_000_010, Some([4u8; 32]), claim_body("m", json!("s")));
        let other_msg = Block::seal(1, 1_700_000_010, Some([3u8; 32]), claim_body("n", json!("s")));
        let other_star = Block::seal(1, 1_700_000_010, Some([3u8; 32]), claim_body("m", json!("t")));

        for other in [other_height, other_time, other_prev, other_msg, other_star] {
            assert_ne!(base.hash, other.hash);
        }
    }

    #[test]
    fn test_star_payload_key_order_is_canonical() {
        // The same JSON object written with keys in a different order must
        // hash identically, or re-derived hashes would depend on whoever
        // serialized the payload first.
        let a = Block::seal(
            1,
            1_700_000_010,
            Some([3u8; 32]),
            claim_body("m", serde_json::from_str(r#"{"ra":"1","dec":"2"}"#).unwrap()),
        );
        let b = Block::seal(
            1,
            1_700_000_010,
            Some([3u8; 32]),
            claim_body("m", serde_json::from_str(r#"{"dec":"2","ra":"1"}"#).unwrap()),
        );
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn body_json_is_kind_tagged() {
        let genesis = serde_json::to_value(BlockBody::genesis()).unwrap();
        assert_eq!(genesis["kind"], "genesis");

        let claim = serde_json::to_value(claim_body("m", json!(7))).unwrap();
        assert_eq!(claim["kind"], "star_claim");
        assert_eq!(claim["star"], json!(7));
    }

    #[test]
    fn block_serialization_roundtrip() {
        let genesis = Block::seal(0, 1_700_000_000, None, BlockBody::genesis());
        let block = Block::seal(
            1,
            1_700_000_010,
            Some(genesis.hash),
            claim_body("m", json!({"story": "first light"})),
        );
        let json = serde_json::to_string(&block).expect("serialize");
        let recovered: Block = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(block, recovered);
        assert!(recovered.verify().is_ok());
    }
}
