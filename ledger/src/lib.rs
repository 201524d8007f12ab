// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # POLARIS Ledger — Core Library
//!
//! POLARIS is a notarization chain for star claims: you point at a star,
//! prove you control a wallet, and the claim goes into an append-only,
//! hash-linked ledger that anyone can audit. No consensus theater, no
//! token, no fork-choice drama. One chain, one writer discipline, and
//! cryptography doing the only two jobs it is actually good at here:
//! proving who signed and proving nothing changed afterwards.
//!
//! The registry does not confer astronomical naming rights, and we are
//! at peace with that. What it does confer is a tamper-evident record
//! that a particular wallet claimed a particular star at a particular
//! time, which is more than a paper certificate ever did.
//!
//! ## Architecture
//!
//! The library is split into modules that mirror the actual concerns of
//! a notarization service:
//!
//! - **crypto** — Ed25519 signing and SHA-256 hashing. Don't roll your own.
//! - **identity** — Wallet keys and Bech32 star addresses.
//! - **chain** — Blocks, the ownership challenge, and the chain manager.
//! - **config** — Protocol constants in one auditable place.
//!
//! ## Design Philosophy
//!
//! 1. Everything on the chain is verifiable from the chain alone.
//! 2. Rejections are typed errors, not log lines you have to go fishing for.
//! 3. No unsafe code. A star registry is not where you spend that budget.
//! 4. If it can admit a block, it has tests. Plural.

pub mod chain;
pub mod config;
pub mod crypto;
pub mod identity;
