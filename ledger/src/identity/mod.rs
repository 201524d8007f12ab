//! # Identity Module
//!
//! Wallet identity for the POLARIS ledger. Every claimant is identified
//! by an Ed25519 keypair, and the public half is what the rest of the
//! system sees:
//!
//! 1. **Keypair** — Raw Ed25519 key material (see `crypto::keys`).
//!    Signs ownership challenges.
//! 2. **Star address** — Bech32-encoded public key with the `star` HRP.
//!    This is what users see, share, and claim stars under.
//!
//! ## Design Decisions
//!
//! - Bech32 (not Bech32m) for addresses. We're encoding a raw public
//!   key, not a witness program, and Bech32's error-detection properties
//!   are sufficient for our use case.
//! - The address embeds the raw key rather than a hash of it, so that
//!   signature verification needs nothing but the address string. The
//!   trade-offs are discussed in `address.rs`.

pub mod address;

pub use address::{AddressError, StarAddress};
