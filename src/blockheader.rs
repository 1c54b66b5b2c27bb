//! The fixed 80-byte block header.
//!
//! Layout (all fields little-endian):
//!
//! ```text
//! 4  bytes  version
//! 32 bytes  previous block hash
//! 32 bytes  merkle root
//! 4  bytes  timestamp (Unix epoch)
//! 4  bytes  nBits (compact target encoding)
//! 4  bytes  nonce
//! ```
//!
//! Reference:
//! https://developer.bitcoin.org/reference/block_chain.html#block-headers

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::Result;
use crate::hash::{double_sha256, ShaHash, HASH_SIZE};

/// Serialized size of a block header on the wire.
pub const BLOCK_HEADER_LEN: usize = 80;

/// Maximum payload of a bare block header: version 4 bytes + two hashes +
/// timestamp, bits, and nonce 4 bytes each.
pub const MAX_BLOCK_HEADER_PAYLOAD: u32 = 16 + 2 * HASH_SIZE as u32;

/// A block header as transmitted inside `block`, `headers`, and
/// `merkleblock` messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Block format version.
    pub version: i32,
    /// Hash of the previous block in the chain.
    pub prev_block: ShaHash,
    /// Merkle root of the block's transactions.
    pub merkle_root: ShaHash,
    /// Block creation time.
    pub timestamp: u32,
    /// Compact difficulty target.
    pub bits: u32,
    /// Proof-of-work nonce.
    pub nonce: u32,
}

impl BlockHeader {
    /// Creates a header with the current version and the given contents.
    pub fn new(prev_block: ShaHash, merkle_root: ShaHash, bits: u32, nonce: u32) -> BlockHeader {
        use std::time::{SystemTime, UNIX_EPOCH};
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);

        BlockHeader {
            version: 1,
            prev_block,
            merkle_root,
            timestamp,
            bits,
            nonce,
        }
    }

    /// Computes the block hash: SHA256(SHA256(serialized header)).
    ///
    /// The returned hash is in wire (little-endian) byte order; display it
    /// through [`ShaHash`]'s `Display` for the conventional reversed form.
    pub fn block_sha(&self) -> ShaHash {
        let mut bytes = Vec::with_capacity(BLOCK_HEADER_LEN);
        bytes.extend(&self.version.to_le_bytes());
        bytes.extend(&self.prev_block.bytes());
        bytes.extend(&self.merkle_root.bytes());
        bytes.extend(&self.timestamp.to_le_bytes());
        bytes.extend(&self.bits.to_le_bytes());
        bytes.extend(&self.nonce.to_le_bytes());
        double_sha256(&bytes)
    }

    pub(crate) fn decode<R: Read>(r: &mut R) -> Result<BlockHeader> {
        let version = r.read_i32::<LittleEndian>()?;

        let mut prev_block = [0u8; HASH_SIZE];
        r.read_exact(&mut prev_block)?;
        let mut merkle_root = [0u8; HASH_SIZE];
        r.read_exact(&mut merkle_root)?;

        let timestamp = r.read_u32::<LittleEndian>()?;
        let bits = r.read_u32::<LittleEndian>()?;
        let nonce = r.read_u32::<LittleEndian>()?;

        Ok(BlockHeader {
            version,
            prev_block: ShaHash::new(prev_block),
            merkle_root: ShaHash::new(merkle_root),
            timestamp,
            bits,
            nonce,
        })
    }

    pub(crate) fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_i32::<LittleEndian>(self.version)?;
        w.write_all(&self.prev_block.bytes())?;
        w.write_all(&self.merkle_root.bytes())?;
        w.write_u32::<LittleEndian>(self.timestamp)?;
        w.write_u32::<LittleEndian>(self.bits)?;
        w.write_u32::<LittleEndian>(self.nonce)?;
        Ok(())
    }
}
