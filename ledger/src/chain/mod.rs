//! # Chain Module
//!
//! The ledger itself: blocks, the ownership challenge, and the manager
//! that strings them together into an append-only chain.
//!
//! ## Architecture
//!
//! ```text
//! block.rs      — Block structure, genesis body, hash/verify operations
//! challenge.rs  — Ownership challenge message format and parsing
//! manager.rs    — ChainManager: admission pipeline, queries, validation
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! request_challenge ──▶ wallet signs ──▶ submit_claim
//!                                            │
//!                          parse ▸ freshness ▸ signature
//!                                            │
//!                                      Block::seal ──▶ chain tip
//! ```
//!
//! ## Design Decisions
//!
//! 1. **SHA-256 for block hashes.** A notarization chain lives or dies
//!    on auditability. Every auditor's toolbox can recompute SHA-256
//!    from the documented canonical encoding.
//!
//! 2. **Stateless challenges.** The issue timestamp rides inside the
//!    message the wallet signs, so the ledger holds no challenge table,
//!    nothing expires in the background, and restarts forget nothing
//!    they needed to remember.
//!
//! 3. **Memory is the database.** Blocks live in one `Vec` behind one
//!    lock. The chain's integrity comes from the hash links, not from
//!    where the bytes sleep; persistence can bolt on underneath without
//!    touching the admission pipeline.

pub mod block;
pub mod challenge;
pub mod manager;

pub use block::{Block, BlockBody};
pub use challenge::ChallengeParseError;
pub use manager::{ChainDefect, ChainError, ChainManager};
