//! # Protocol Configuration & Constants
//!
//! Every magic number in POLARIS lives here. If you're hardcoding a
//! constant somewhere else, you're doing it wrong and you owe the team
//! coffee.
//!
//! These values define the shape of every chain this library produces.
//! Changing `GENESIS_MARKER` or the canonical encoding invalidates every
//! previously computed hash, so think twice and then think again.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Addressing
// ---------------------------------------------------------------------------

/// Human-readable prefix for wallet addresses. Bech32 HRP, so every
/// POLARIS address reads `star1...`. Short enough to type, on-brand
/// enough that nobody pastes a Bitcoin address here by accident.
pub const ADDRESS_HRP: &str = "star";

// ---------------------------------------------------------------------------
// Ownership Challenge
// ---------------------------------------------------------------------------

/// Domain tag appended to every ownership challenge message. This pins
/// signatures to the star-claim protocol: a wallet that signs
/// `addr:ts:starRegistry` has provably signed a POLARIS challenge and
/// not some other message a hostile service slipped in front of it.
///
/// Must never contain `:` or the challenge format stops being parseable.
/// There is a test for that, because "must never" without a test is a wish.
pub const CHALLENGE_DOMAIN_TAG: &str = "starRegistry";

/// Challenge freshness window. A signed challenge older than this is
/// rejected. Five minutes is generous: long enough to copy a message
/// into a wallet and sign it by hand, short enough that a leaked
/// signature goes stale before it is worth stealing.
pub const CHALLENGE_WINDOW: Duration = Duration::from_secs(300);

/// Freshness window as signed seconds, for arithmetic against Unix
/// timestamps. Keep in sync with `CHALLENGE_WINDOW` or face the wrath
/// of the integration tests.
pub const CHALLENGE_WINDOW_SECS: i64 = 300;

// ---------------------------------------------------------------------------
// Genesis
// ---------------------------------------------------------------------------

/// Marker embedded in the genesis block body. The chain's birth
/// certificate. (Satoshi had "The Times 03/Jan/2009"; we have this.)
pub const GENESIS_MARKER: &str = "POLARIS/2026: a fixed point to steer by";

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519. Deterministic signatures, 128-bit security, no nonce
/// management footguns. The only sane default in 2026.
pub const SIGNING_ALGORITHM: &str = "Ed25519";

/// The block digest function. SHA-256 rather than something flashier:
/// claim hashes are meant to be re-derivable by auditors in any
/// language, and every language ships SHA-256.
pub const DIGEST_ALGORITHM: &str = "SHA-256";

/// Ed25519 secret keys are 32 bytes.
pub const SIGNING_KEY_LENGTH: usize = 32;

/// Ed25519 public keys are 32 bytes. Also the payload length of every
/// address, since addresses embed the raw public key.
pub const VERIFYING_KEY_LENGTH: usize = 32;

/// Ed25519 signatures are 64 bytes. If yours isn't, something has gone
/// terribly wrong.
pub const SIGNATURE_LENGTH: usize = 64;

/// SHA-256 digest length in bytes.
pub const HASH_OUTPUT_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Node Defaults
// ---------------------------------------------------------------------------

/// Default HTTP API port. 7577 is "PLRS" typed on a phone keypad,
/// which is as close to numerology as this project gets.
pub const DEFAULT_API_PORT: u16 = 7577;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_window_constants_agree() {
        assert_eq!(CHALLENGE_WINDOW.as_secs() as i64, CHALLENGE_WINDOW_SECS);
    }

    #[test]
    fn domain_tag_is_colon_free() {
        // The challenge format is colon-delimited. A colon in the tag would
        // make every well-formed challenge unparseable.
        assert!(!CHALLENGE_DOMAIN_TAG.contains(':'));
        assert!(!CHALLENGE_DOMAIN_TAG.is_empty());
    }

    #[test]
    fn address_hrp_is_valid_bech32() {
        assert!(bech32::Hrp::parse(ADDRESS_HRP).is_ok());
        assert!(!ADDRESS_HRP.contains(':'));
    }

    #[test]
    fn genesis_marker_is_recognizable() {
        assert!(GENESIS_MARKER.contains("POLARIS"));
    }

    #[test]
    fn crypto_parameter_sizes() {
        assert_eq!(SIGNING_KEY_LENGTH, 32);
        assert_eq!(VERIFYING_KEY_LENGTH, 32);
        assert_eq!(SIGNATURE_LENGTH, 64);
        assert_eq!(HASH_OUTPUT_LENGTH, 32);
    }
}
