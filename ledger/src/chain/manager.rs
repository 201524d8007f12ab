//! # Chain Manager
//!
//! The `ChainManager` owns the block vector and is the only way blocks
//! come into existence. It exposes the full ledger surface: challenge
//! issuance, claim admission, queries, and integrity validation.
//!
//! ## Admission Pipeline
//!
//! ```text
//! submit_claim(address, message, signature, star)
//!     │
//!     ├─ 1. parse      message must be <address>:<ts>:starRegistry
//!     ├─ 2. freshness  now - ts must not exceed the 300s window
//!     ├─ 3. ownership  signature must verify against the address key
//!     └─ 4. append     seal a block under the write lock
//! ```
//!
//! Steps 1 to 3 reject without touching the chain. Only step 4 takes the
//! write lock, and it performs the whole read-modify-write (read tip,
//! derive height, seal, push) inside one critical section, so two
//! concurrent claims can never observe the same tip.
//!
//! ## Concurrency
//!
//! State is a single `parking_lot::RwLock<Vec<Block>>`. Queries take the
//! read lock and clone what they return; nothing holds a guard across an
//! await point. The manager is cheap to share behind an `Arc`.

use std::fmt;

use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::chain::block::{Block, BlockBody};
use crate::chain::challenge::{self, ChallengeParseError};
use crate::config::CHALLENGE_WINDOW_SECS;
use crate::crypto::keys::WalletSignature;
use crate::identity::StarAddress;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by ledger operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The signed challenge is older than the acceptance window.
    #[error("challenge expired: {elapsed}s since issuance, window is {window}s")]
    ChallengeExpired {
        /// Seconds between the embedded issue time and submission.
        elapsed: i64,
        /// The acceptance window in seconds.
        window: i64,
    },

    /// The signature does not verify against the claimed address's key.
    #[error("signature does not verify for {address}")]
    InvalidSignature {
        /// The address whose key rejected the signature.
        address: StarAddress,
    },

    /// No block carries the requested hash.
    #[error("no block with hash '{hash}'")]
    NotFound {
        /// The hash string the caller asked for, verbatim.
        hash: String,
    },

    /// The submitted message does not have the challenge structure.
    #[error("malformed challenge message: {0}")]
    MalformedChallenge(#[from] ChallengeParseError),
}

// ---------------------------------------------------------------------------
// Chain defects
// ---------------------------------------------------------------------------

/// A single problem found by [`ChainManager::validate`].
///
/// The `height` in each variant is the block's position in the chain,
/// not its stored height field. Positions stay truthful even when a
/// tamperer rewrote the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainDefect {
    /// The block fails its own integrity check (stored hash does not
    /// match the content, or a structural invariant is broken).
    TamperedBlock {
        /// Position of the offending block.
        height: u64,
        /// What the block-level check reported.
        reason: String,
    },

    /// The block's `previous_hash` does not equal the stored hash of
    /// the block before it.
    BrokenLink {
        /// Position of the block whose backlink is wrong.
        height: u64,
    },
}

impl fmt::Display for ChainDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TamperedBlock { height, reason } => {
                write!(f, "block {} failed integrity check: {}", height, reason)
            }
            Self::BrokenLink { height } => {
                write!(f, "block {} does not link to its predecessor", height)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Freshness
// ---------------------------------------------------------------------------

/// Check a challenge's age against the acceptance window.
///
/// `elapsed == window` is still fresh; only strictly-older challenges
/// are rejected. A negative elapsed (a clock that ran ahead at issuance)
/// also passes, since the challenge is certainly not stale.
///
/// The subtraction saturates: a timestamp so old that the true age
/// overflows `i64` clamps to `i64::MAX` and reads as expired. The
/// timestamp is attacker-supplied and this runs before signature
/// verification, so it must hold up under any input.
fn check_freshness(issued_at: i64, now: i64) -> Result<(), ChainError> {
    let elapsed = now.saturating_sub(issued_at);
    if elapsed > CHALLENGE_WINDOW_SECS {
        return Err(ChainError::ChallengeExpired {
            elapsed,
            window: CHALLENGE_WINDOW_SECS,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ChainManager
// ---------------------------------------------------------------------------

/// The in-memory star-claim ledger.
///
/// Holds the ordered block vector behind a single lock. A freshly
/// constructed manager already contains the genesis block, so the chain
/// is never empty and height queries never fail.
pub struct ChainManager {
    /// The chain itself. Index equals block height on an untampered
    /// chain.
    blocks: RwLock<Vec<Block>>,
}

impl fmt::Debug for ChainManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainManager")
            .field("blocks", &self.blocks.read().len())
            .finish()
    }
}

impl ChainManager {
    /// Create a manager with its genesis block already in place.
    ///
    /// Construction is async because it is part of the service's startup
    /// path; the returned chain is fully initialized and never empty.
    pub async fn new() -> Self {
        let manager = ChainManager {
            blocks: RwLock::new(Vec::new()),
        };
        manager.ensure_genesis();
        manager
    }

    /// Seed the genesis block if the chain is empty. No-op otherwise.
    fn ensure_genesis(&self) {
        let mut blocks = self.blocks.write();
        if !blocks.is_empty() {
            return;
        }
        let genesis = Block::seal(0, Utc::now().timestamp(), None, BlockBody::genesis());
        info!(hash = %genesis.hash_hex(), "genesis block created");
        blocks.push(genesis);
    }

    /// Seal a new block onto the tip and return it.
    ///
    /// The whole read-modify-write runs under the write lock: read the
    /// tip, derive height and backlink, stamp the time, seal, push.
    fn append(&self, body: BlockBody) -> Block {
        let mut blocks = self.blocks.write();
        let height = blocks.len() as u64;
        let previous_hash = blocks.last().map(|b| b.hash);
        let block = Block::seal(height, Utc::now().timestamp(), previous_hash, body);
        blocks.push(block.clone());
        info!(height, hash = %block.hash_hex(), "block appended");
        block
    }

    // -----------------------------------------------------------------------
    // Ownership protocol
    // -----------------------------------------------------------------------

    /// Issue a challenge message for the given address.
    ///
    /// The wallet must sign the returned string byte-for-byte and send
    /// it back with the claim. The ledger keeps no record of issued
    /// challenges; the embedded timestamp carries all the state.
    pub async fn request_challenge(&self, address: &StarAddress) -> String {
        let message = challenge::issue(address, Utc::now().timestamp());
        info!(address = %address, "challenge issued");
        message
    }

    /// Admit a star claim after verifying wallet ownership.
    ///
    /// Runs the full pipeline described in the module docs. On success
    /// the claim is already on the chain and the sealed block is
    /// returned.
    ///
    /// # Errors
    ///
    /// [`ChainError::MalformedChallenge`] when the message does not have
    /// the challenge structure, [`ChainError::ChallengeExpired`] when it
    /// is older than the window, and [`ChainError::InvalidSignature`]
    /// when the signature does not verify against the address's key.
    pub async fn submit_claim(
        &self,
        address: &StarAddress,
        message: &str,
        signature: &WalletSignature,
        star: Value,
    ) -> Result<Block, ChainError> {
        // 1. Structure: recover the issue time from the message itself.
        let issued_at = challenge::embedded_timestamp(message)?;

        // 2. Freshness.
        if let Err(err) = check_freshness(issued_at, Utc::now().timestamp()) {
            warn!(address = %address, %err, "claim rejected");
            return Err(err);
        }

        // 3. Ownership: the signature must cover the exact message and
        //    verify against the key the address encodes.
        if !address.public_key().verify(message.as_bytes(), signature) {
            warn!(address = %address, "claim rejected: signature does not verify");
            return Err(ChainError::InvalidSignature {
                address: address.clone(),
            });
        }

        // 4. Admission.
        let block = self.append(BlockBody::StarClaim {
            address: address.clone(),
            message: message.to_string(),
            star,
        });
        info!(address = %address, height = block.height, "star claim admitted");
        Ok(block)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Height of the chain tip. Genesis makes this 0 at minimum.
    pub async fn chain_height(&self) -> u64 {
        // The chain always holds at least genesis.
        (self.blocks.read().len() as u64).saturating_sub(1)
    }

    /// Look up a block by its hex-encoded hash.
    ///
    /// # Errors
    ///
    /// [`ChainError::NotFound`] when no block matches. Input that does
    /// not decode as a 32-byte hex string names no block and folds into
    /// the same error.
    pub async fn block_by_hash(&self, hash_hex: &str) -> Result<Block, ChainError> {
        decode_hash(hash_hex)
            .and_then(|needle| {
                self.blocks
                    .read()
                    .iter()
                    .find(|b| b.hash == needle)
                    .cloned()
            })
            .ok_or_else(|| ChainError::NotFound {
                hash: hash_hex.to_string(),
            })
    }

    /// Look up a block by height. `None` when the height is past the
    /// tip.
    pub async fn block_by_height(&self, height: u64) -> Option<Block> {
        let index = usize::try_from(height).ok()?;
        self.blocks.read().get(index).cloned()
    }

    /// All star payloads claimed by the given address, in chain order.
    ///
    /// Genesis carries no claim and never appears. An address with no
    /// claims gets an empty vector.
    pub async fn stars_by_address(&self, address: &StarAddress) -> Vec<Value> {
        self.blocks
            .read()
            .iter()
            .filter_map(|block| match &block.body {
                BlockBody::StarClaim {
                    address: owner,
                    star,
                    ..
                } if owner == address => Some(star.clone()),
                _ => None,
            })
            .collect()
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Audit the whole chain and report every defect found.
    ///
    /// Two independent checks run per block: the block's own integrity
    /// ([`Block::verify`]) and, from position 1 up, the backlink against
    /// the predecessor's stored hash. The pass never mutates anything
    /// and never stops early; an empty result means the chain is clean.
    pub async fn validate(&self) -> Vec<ChainDefect> {
        let blocks = self.blocks.read();
        let mut defects = Vec::new();

        for (position, block) in blocks.iter().enumerate() {
            if let Err(reason) = block.verify() {
                defects.push(ChainDefect::TamperedBlock {
                    height: position as u64,
                    reason,
                });
            }
            if position > 0 && block.previous_hash != Some(blocks[position - 1].hash) {
                defects.push(ChainDefect::BrokenLink {
                    height: position as u64,
                });
            }
        }

        if defects.is_empty() {
            info!(blocks = blocks.len(), "chain validated, no defects");
        } else {
            warn!(defects = defects.len(), "chain validation found defects");
        }
        defects
    }
}

/// Decode a hex string into a 32-byte hash, or `None` if it is not one.
fn decode_hash(hash_hex: &str) -> Option<[u8; 32]> {
    let bytes = hex::decode(hash_hex).ok()?;
    bytes.try_into().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
