//! # Cryptographic Primitives for POLARIS
//!
//! Everything security-related in the ledger flows through here:
//! the digest that seals blocks and the Ed25519 keys that prove a
//! claimant controls an address.
//!
//! We deliberately chose boring, well-audited cryptography:
//!
//! - **Ed25519** for signatures. Fast, deterministic, and nobody has
//!   broken it.
//! - **SHA-256** for block digests. Universally re-implementable, which
//!   matters more here than raw speed (auditors recompute our hashes).
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Everything here is a thin, type-safe wrapper around audited
//! implementations. If you're tempted to optimize these functions, please
//! reconsider. Then reconsider again. Then go read about timing attacks
//! and come back when you've lost the urge.

pub mod hash;
pub mod keys;

// Re-export the things people actually need so they don't have to memorize
// our module hierarchy.
pub use hash::sha256_array;
pub use keys::{KeyError, WalletKeypair, WalletPublicKey, WalletSignature};
