//! The 32-byte double-SHA-256 hash used for block and transaction
//! identifiers.
//!
//! Hashes travel the wire in little-endian byte order, matching the
//! internal representation. Human-readable forms (block explorers, log
//! output) reverse the bytes, so the [`fmt::Display`] implementation and
//! [`std::str::FromStr`] both work on the reversed hex string.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::error::{message_error, Error};

/// Size of a hash in bytes.
pub const HASH_SIZE: usize = 32;

/// Maximum length of a hash string (two hex digits per byte).
pub const MAX_HASH_STRING_SIZE: usize = HASH_SIZE * 2;

/// A double-SHA-256 hash in wire (little-endian) byte order.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ShaHash(pub [u8; HASH_SIZE]);

impl ShaHash {
    /// Wraps raw little-endian bytes.
    pub const fn new(bytes: [u8; HASH_SIZE]) -> ShaHash {
        ShaHash(bytes)
    }

    /// The raw little-endian bytes.
    pub const fn bytes(&self) -> [u8; HASH_SIZE] {
        self.0
    }

    /// Returns true if both hashes contain the same bytes.
    pub fn is_equal(&self, other: &ShaHash) -> bool {
        self == other
    }
}

impl fmt::Display for ShaHash {
    /// Prints the hash with its bytes reversed, the conventional
    /// big-endian form used by explorers and RPC interfaces.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        write!(f, "{}", hex::encode(reversed))
    }
}

impl fmt::Debug for ShaHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShaHash({})", self)
    }
}

impl FromStr for ShaHash {
    type Err = Error;

    /// Parses a big-endian hex string into a wire-order hash.
    ///
    /// Shorter strings are treated as the low-order bytes of the hash
    /// (the rest zero filled), and odd-length strings gain a leading
    /// zero digit, so truncated forms like the ones in historical test
    /// vectors parse the same way the original tooling parsed them.
    fn from_str(s: &str) -> Result<ShaHash, Error> {
        if s.len() > MAX_HASH_STRING_SIZE {
            let description = format!(
                "max hash string length is {} bytes [len {}]",
                MAX_HASH_STRING_SIZE,
                s.len()
            );
            return Err(message_error("ShaHash::from_str", description));
        }

        let padded;
        let normalized = if s.len() % 2 != 0 {
            padded = format!("0{}", s);
            padded.as_str()
        } else {
            s
        };

        let mut decoded = hex::decode(normalized)
            .map_err(|e| message_error("ShaHash::from_str", format!("invalid hash string: {}", e)))?;
        decoded.reverse();

        let mut bytes = [0u8; HASH_SIZE];
        bytes[..decoded.len()].copy_from_slice(&decoded);
        Ok(ShaHash(bytes))
    }
}

/// Computes SHA256(SHA256(bytes)).
///
/// The double construction is used throughout the protocol: message
/// checksums, block identifiers, and transaction identifiers.
pub fn double_sha256(bytes: &[u8]) -> ShaHash {
    let digest = Sha256::digest(Sha256::digest(bytes));
    let mut hash = [0u8; HASH_SIZE];
    hash.copy_from_slice(&digest);
    ShaHash(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Block 203707 hash, deliberately odd-length and truncated: parsing
    // must left-pad with a zero digit and zero-fill the high bytes.
    const BLOCK_203707: &str = "3264bc2ac36a60840790ba1d475d01367e7c723da941069e9dc";

    const BLOCK_203707_WIRE: [u8; HASH_SIZE] = [
        0xdc, 0xe9, 0x69, 0x10, 0x94, 0xda, 0x23, 0xc7, 0xe7, 0x67, 0x13, 0xd0, 0x75, 0xd4, 0xa1,
        0x0b, 0x79, 0x40, 0x08, 0xa6, 0x36, 0xac, 0xc2, 0x4b, 0x26, 0x03, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00,
    ];

    #[test]
    fn from_str_reverses_and_pads() {
        let hash: ShaHash = BLOCK_203707.parse().unwrap();
        assert_eq!(hash.bytes(), BLOCK_203707_WIRE);
    }

    #[test]
    fn display_reverses_back() {
        let hash = ShaHash::new(BLOCK_203707_WIRE);
        assert_eq!(
            hash.to_string(),
            "00000000000003264bc2ac36a60840790ba1d475d01367e7c723da941069e9dc",
        );
    }

    #[test]
    fn from_str_rejects_overlong_string() {
        let s = "0".repeat(MAX_HASH_STRING_SIZE + 1);
        assert!(s.parse::<ShaHash>().is_err());
    }

    #[test]
    fn from_str_rejects_non_hex() {
        assert!("zzzz".parse::<ShaHash>().is_err());
    }

    #[test]
    fn double_sha256_of_empty_input() {
        // First four bytes are the checksum of every zero-length payload.
        let hash = double_sha256(&[]);
        assert_eq!(&hash.bytes()[..4], &[0x5d, 0xf6, 0xe0, 0xe2]);
    }
}
