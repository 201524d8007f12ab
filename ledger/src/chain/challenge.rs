//! # Ownership Challenge
//!
//! Star claims are admitted only after the submitting wallet proves it
//! controls its address. Proof runs as a two-phase exchange:
//!
//! ```text
//! wallet                                 ledger
//!   │  request challenge (address)         │
//!   │ ────────────────────────────────────▶│
//!   │       "<address>:<ts>:starRegistry"  │
//!   │ ◀────────────────────────────────────│
//!   │                                      │
//!   │  sign the message, submit claim      │
//!   │  (address, message, signature, star) │
//!   │ ────────────────────────────────────▶│
//!   │         freshness + signature checks │
//! ```
//!
//! The challenge message is three colon-separated fields. The middle
//! field is the issue timestamp in Unix seconds; at submission time the
//! ledger re-reads it from the message itself (the ledger keeps no
//! per-challenge state) and rejects messages older than
//! [`CHALLENGE_WINDOW_SECS`](crate::config::CHALLENGE_WINDOW_SECS).
//! The trailing domain tag keeps these signatures from being confused
//! with signatures produced for any other purpose.
//!
//! Neither the address field nor the tag needs an equality check here:
//! the wallet signs the message byte-for-byte, so a message tied to a
//! different address or purpose simply fails signature verification
//! against the claimed key.

use thiserror::Error;

use crate::config::CHALLENGE_DOMAIN_TAG;
use crate::identity::StarAddress;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from parsing a submitted challenge message.
#[derive(Debug, Error)]
pub enum ChallengeParseError {
    /// The message does not split into exactly three colon-separated
    /// fields.
    #[error("expected 3 colon-separated fields, got {got}")]
    WrongFieldCount {
        /// Number of fields the message actually split into.
        got: usize,
    },

    /// The middle field is not an integer timestamp.
    #[error("timestamp field is not an integer: '{0}'")]
    InvalidTimestamp(String),
}

// ---------------------------------------------------------------------------
// Challenge message operations
// ---------------------------------------------------------------------------

/// Build the challenge message a wallet must sign to claim a star.
///
/// Format: `<address>:<issued_at>:starRegistry`. Both the address
/// (Bech32) and the domain tag are colon-free, so the field boundaries
/// are unambiguous.
pub fn issue(address: &StarAddress, issued_at: i64) -> String {
    format!("{address}:{issued_at}:{CHALLENGE_DOMAIN_TAG}")
}

/// Extract the issue timestamp embedded in a challenge message.
///
/// The message must have exactly three colon-separated fields and an
/// integer middle field. Nothing else about the content is judged here;
/// see the module docs for why that is enough.
///
/// # Errors
///
/// Returns [`ChallengeParseError`] when the structure or the timestamp
/// field is malformed.
pub fn embedded_timestamp(message: &str) -> Result<i64, ChallengeParseError> {
    let parts: Vec<&str> = message.split(':').collect();
    if parts.len() != 3 {
        return Err(ChallengeParseError::WrongFieldCount { got: parts.len() });
    }
    parts[1]
        .parse::<i64>()
        .map_err(|_| ChallengeParseError::InvalidTimestamp(parts[1].to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
