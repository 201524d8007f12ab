//! # Star Addresses
//!
//! A star address is the human-facing identity of a wallet on the
//! ledger. It is the Bech32 encoding of the wallet's raw Ed25519 public
//! key under the `star` prefix:
//!
//! ```text
//! public_key (32 bytes)
//!     -> Bech32("star", public_key) -> star1qw508d6qe...
//! ```
//!
//! The `star` human-readable prefix (HRP) makes addresses immediately
//! recognizable, and Bech32's checksum detects up to 4 character errors,
//! which matters when people are copy-pasting addresses into wallets.
//!
//! ## Why the raw public key and not a hash of it?
//!
//! Ownership verification here is stateless: given only `(message,
//! address, signature)`, the ledger must decide whether the signature
//! was produced by the key controlling the address. Embedding the raw
//! key means the verifier recovers it straight from the address string.
//! Hashing the key first would force a key registry, and a registry is
//! exactly the kind of shared mutable state this ledger refuses to grow.
//! The cost is transparency (addresses reveal their key), which is fine
//! for a public notarization chain.

use crate::config::ADDRESS_HRP;
use crate::crypto::keys::WalletPublicKey;
use bech32::{Bech32, Hrp};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while parsing a star address.
#[derive(Debug, Error)]
pub enum AddressError {
    /// The Bech32 string could not be decoded.
    #[error("bech32 decode error: {0}")]
    Bech32Decode(String),

    /// The decoded address has an unexpected human-readable prefix.
    #[error("invalid HRP: expected '{expected}', got '{got}'")]
    InvalidHrp {
        /// The expected HRP.
        expected: String,
        /// The HRP that was actually found.
        got: String,
    },

    /// The decoded data has an unexpected length.
    #[error("invalid address data length: expected {expected} bytes, got {got}")]
    InvalidDataLength {
        /// Expected number of bytes.
        expected: usize,
        /// Actual number of bytes.
        got: usize,
    },

    /// The decoded bytes are not a valid Ed25519 public key.
    #[error("address payload is not a valid Ed25519 public key")]
    InvalidKey,
}

// ---------------------------------------------------------------------------
// StarAddress
// ---------------------------------------------------------------------------

/// A wallet address: the Bech32-wrapped raw Ed25519 public key.
///
/// Internally stores the 32 key bytes; the `star1...` string form is
/// computed on the fly. Parsing validates the prefix, the checksum, the
/// payload length, and that the payload is an actual curve point, so a
/// `StarAddress` in hand is always verifiable against.
///
/// # Examples
///
/// ```
/// use polaris_ledger::crypto::keys::WalletKeypair;
/// use polaris_ledger::identity::StarAddress;
///
/// let wallet = WalletKeypair::generate();
/// let address = StarAddress::from_public_key(&wallet.public_key());
/// assert!(address.to_string().starts_with("star1"));
///
/// let recovered: StarAddress = address.to_string().parse().unwrap();
/// assert_eq!(address, recovered);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct StarAddress {
    /// Raw Ed25519 public key bytes. This is what gets Bech32-encoded
    /// into the address string, and what signatures verify against.
    key: [u8; 32],
}

impl StarAddress {
    /// Create an address from a wallet's public key.
    pub fn from_public_key(pk: &WalletPublicKey) -> Self {
        Self { key: *pk.as_bytes() }
    }

    /// Parse a Bech32-encoded `star1...` string back into an address.
    ///
    /// Validates the HRP, checksum, data length, and that the payload is
    /// a valid Ed25519 point. Rejecting non-points here means every
    /// parsed address can actually verify signatures later.
    pub fn parse(addr: &str) -> Result<Self, AddressError> {
        let (hrp, data) =
            bech32::decode(addr).map_err(|e| AddressError::Bech32Decode(e.to_string()))?;

        let expected_hrp = Hrp::parse(ADDRESS_HRP).expect("static HRP is valid");
        if hrp != expected_hrp {
            return Err(AddressError::InvalidHrp {
                expected: ADDRESS_HRP.to_string(),
                got: hrp.to_string(),
            });
        }

        if data.len() != 32 {
            return Err(AddressError::InvalidDataLength {
                expected: 32,
                got: data.len(),
            });
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&data);

        WalletPublicKey::try_from_slice(&key).map_err(|_| AddressError::InvalidKey)?;

        Ok(Self { key })
    }

    /// Encode this address as its Bech32 string form.
    pub fn encode(&self) -> String {
        let hrp = Hrp::parse(ADDRESS_HRP).expect("static HRP is valid");
        bech32::encode::<Bech32>(hrp, &self.key)
            .expect("encoding a 32-byte payload should never fail")
    }

    /// The public key embedded in this address.
    ///
    /// This is the Signature Verifier's entry point: challenge messages
    /// are checked with `address.public_key().verify(...)`.
    pub fn public_key(&self) -> WalletPublicKey {
        WalletPublicKey::from_bytes(self.key)
    }

    /// Raw key bytes underlying this address.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.key
    }
}

impl std::str::FromStr for StarAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::hash::Hash for StarAddress {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Display for StarAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl fmt::Debug for StarAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StarAddress({})", self.encode())
    }
}

impl Serialize for StarAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.encode())
        } else {
            serializer.serialize_bytes(&self.key)
        }
    }
}

impl<'de> Deserialize<'de> for StarAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            StarAddress::parse(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            if bytes.len() != 32 {
                return Err(serde::de::Error::custom(format!(
                    "expected 32-byte key, got {}",
                    bytes.len()
                )));
            }
            let mut key = [0u8; 32];
            key.copy_from_slice(&bytes);
            Ok(StarAddress { key })
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::WalletKeypair;

    #[test]
    fn address_starts_with_star1() {
        let wallet = WalletKeypair::generate();
        let addr = StarAddress::from_public_key(&wallet.public_key());
        assert!(addr.encode().starts_with("star1"), "address was: {}", addr);
    }

    #[test]
    fn address_roundtrip() {
        let wallet = WalletKeypair::generate();
        let addr = StarAddress::from_public_key(&wallet.public_key());
        let recovered = StarAddress::parse(&addr.encode()).unwrap();
        assert_eq!(addr, recovered);
    }

    #[test]
    fn different_keys_different_addresses() {
        let w1 = WalletKeypair::generate();
        let w2 = WalletKeypair::generate();
        let a1 = StarAddress::from_public_key(&w1.public_key());
        let a2 = StarAddress::from_public_key(&w2.public_key());
        assert_ne!(a1, a2);
    }

    #[test]
    fn deterministic_address_from_same_key() {
        let seed = [7u8; 32];
        let wallet = WalletKeypair::from_seed(&seed);
        let a1 = StarAddress::from_public_key(&wallet.public_key());
        let a2 = StarAddress::from_public_key(&wallet.public_key());
        assert_eq!(a1.encode(), a2.encode());
    }

    #[test]
    fn invalid_hrp_rejected() {
        let hrp = Hrp::parse("btc").unwrap();
        let wallet = WalletKeypair::generate();
        let encoded = bech32::encode::<Bech32>(hrp, &wallet.public_key_bytes()).unwrap();
        let err = StarAddress::parse(&encoded).unwrap_err();
        assert!(matches!(err, AddressError::InvalidHrp { .. }));
    }

    #[test]
    fn wrong_payload_length_rejected() {
        let hrp = Hrp::parse(ADDRESS_HRP).unwrap();
        let encoded = bech32::encode::<Bech32>(hrp, &[0u8; 20]).unwrap();
        let err = StarAddress::parse(&encoded).unwrap_err();
        assert!(matches!(err, AddressError::InvalidDataLength { .. }));
    }

    #[test]
    fn corrupted_address_rejected() {
        let wallet = WalletKeypair::generate();
        let addr = StarAddress::from_public_key(&wallet.public_key()).encode();
        // Corrupt one character in the middle of the data part. Bech32
        // guarantees single-substitution errors are caught.
        let mid = addr.len() / 2;
        let mut chars: Vec<char> = addr.chars().collect();
        chars[mid] = if chars[mid] == 'q' { 'p' } else { 'q' };
        let corrupted: String = chars.into_iter().collect();
        assert!(StarAddress::parse(&corrupted).is_err());
    }

    #[test]
    fn recovered_address_verifies_signatures() {
        // The whole point of embedding the raw key: parse the string form,
        // get a working verifier.
        let wallet = WalletKeypair::generate();
        let addr = StarAddress::from_public_key(&wallet.public_key());
        let recovered = StarAddress::parse(&addr.encode()).unwrap();

        let msg = b"prove you hold this wallet";
        let sig = wallet.sign(msg);
        assert!(recovered.public_key().verify(msg, &sig));
    }

    #[test]
    fn foreign_signature_rejected_via_address() {
        let w1 = WalletKeypair::generate();
        let w2 = WalletKeypair::generate();
        let addr = StarAddress::from_public_key(&w1.public_key());
        let sig = w2.sign(b"msg");
        assert!(!addr.public_key().verify(b"msg", &sig));
    }

    #[test]
    fn address_serde_json_roundtrip() {
        let wallet = WalletKeypair::generate();
        let addr = StarAddress::from_public_key(&wallet.public_key());
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.encode()));
        let recovered: StarAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(addr, recovered);
    }

    #[test]
    fn bech32_alphabet_excludes_colon() {
        // Challenge messages are colon-delimited, so the address field must
        // never be able to smuggle one in.
        let wallet = WalletKeypair::generate();
        let addr = StarAddress::from_public_key(&wallet.public_key());
        assert!(!addr.encode().contains(':'));
    }
}
