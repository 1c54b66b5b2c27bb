//! The `merkleblock` message: a filtered block for BIP 0037 bloom-filter
//! clients. Carries the header, the total transaction count, the partial
//! merkle branch hashes, and the traversal flag bits.
//!
//! ```text
//! block_header  (80 bytes)
//! uint32        total_transactions
//! varint        hash_count
//! hash[]        hashes
//! varint        flag_byte_count
//! byte[]        flags
//! ```
//!
//! Only valid from [`BIP0037_VERSION`].
//!
//! Reference:
//! https://developer.bitcoin.org/reference/p2p_networking.html#merkleblock

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::blockheader::BlockHeader;
use crate::error::{message_error, Result};
use crate::hash::{ShaHash, HASH_SIZE};
use crate::messages::block::MAX_TX_PER_BLOCK;
use crate::messages::{Command, Payload};
use crate::protocol::{BIP0037_VERSION, MAX_BLOCK_PAYLOAD};
use crate::serialize::{read_var_bytes, read_var_int, write_var_bytes, write_var_int};

/// Most flag bytes a merkle block can need: one bit per transaction, plus
/// one byte for the partial remainder.
const MAX_FLAGS_PER_MERKLE_BLOCK: u32 = MAX_TX_PER_BLOCK / 8 + 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleBlockMessage {
    pub header: BlockHeader,
    /// Number of transactions in the full block, filtered or not.
    pub total_transactions: u32,
    /// Hashes of the partial merkle tree, depth first.
    pub hashes: Vec<ShaHash>,
    /// Traversal flag bits, packed eight per byte.
    pub flags: Vec<u8>,
}

impl MerkleBlockMessage {
    /// Creates an empty filtered block for `header`.
    pub fn new(header: BlockHeader) -> MerkleBlockMessage {
        MerkleBlockMessage {
            header,
            total_transactions: 0,
            hashes: Vec::new(),
            flags: Vec::new(),
        }
    }

    /// Appends a partial-merkle-tree hash, failing once the tree cannot
    /// belong to a valid block.
    pub fn add_tx_hash(&mut self, hash: ShaHash) -> Result<()> {
        if self.hashes.len() as u32 + 1 > MAX_TX_PER_BLOCK {
            let description =
                format!("too many tx hashes for message [max {}]", MAX_TX_PER_BLOCK);
            return Err(message_error("MerkleBlockMessage::add_tx_hash", description));
        }
        self.hashes.push(hash);
        Ok(())
    }
}

fn gate_check(pver: u32, func: &'static str) -> Result<()> {
    if pver < BIP0037_VERSION {
        let description = format!("merkleblock message invalid for protocol version {}", pver);
        return Err(message_error(func, description));
    }
    Ok(())
}

impl Payload for MerkleBlockMessage {
    const COMMAND: Command = Command::MerkleBlock;

    fn max_payload_length(_pver: u32) -> u32 {
        MAX_BLOCK_PAYLOAD
    }

    fn encode<W: Write>(&self, w: &mut W, pver: u32) -> Result<()> {
        gate_check(pver, "MerkleBlockMessage::encode")?;

        let hash_count = self.hashes.len() as u64;
        if hash_count > u64::from(MAX_TX_PER_BLOCK) {
            let description = format!(
                "too many transaction hashes for message [count {}, max {}]",
                hash_count, MAX_TX_PER_BLOCK
            );
            return Err(message_error("MerkleBlockMessage::encode", description));
        }
        if self.flags.len() as u32 > MAX_FLAGS_PER_MERKLE_BLOCK {
            let description = format!(
                "too many flag bytes for message [count {}, max {}]",
                self.flags.len(),
                MAX_FLAGS_PER_MERKLE_BLOCK
            );
            return Err(message_error("MerkleBlockMessage::encode", description));
        }

        self.header.encode(w)?;
        w.write_u32::<LittleEndian>(self.total_transactions)?;

        write_var_int(w, hash_count)?;
        for hash in &self.hashes {
            w.write_all(&hash.bytes())?;
        }

        write_var_bytes(w, &self.flags)?;
        Ok(())
    }

    fn decode(payload: &[u8], pver: u32) -> Result<Self> {
        gate_check(pver, "MerkleBlockMessage::decode")?;

        let mut r = Cursor::new(payload);

        let header = BlockHeader::decode(&mut r)?;
        let total_transactions = r.read_u32::<LittleEndian>()?;

        let hash_count = read_var_int(&mut r)?;
        if hash_count > u64::from(MAX_TX_PER_BLOCK) {
            let description = format!(
                "too many transaction hashes for message [count {}, max {}]",
                hash_count, MAX_TX_PER_BLOCK
            );
            return Err(message_error("MerkleBlockMessage::decode", description));
        }

        let mut hashes = Vec::with_capacity(hash_count as usize);
        for _ in 0..hash_count {
            let mut hash = [0u8; HASH_SIZE];
            r.read_exact(&mut hash)?;
            hashes.push(ShaHash::new(hash));
        }

        let flags = read_var_bytes(&mut r, MAX_FLAGS_PER_MERKLE_BLOCK, "merkle block flags")?;

        Ok(MerkleBlockMessage {
            header,
            total_transactions,
            hashes,
            flags,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PROTOCOL_VERSION;

    fn sample_header() -> BlockHeader {
        BlockHeader {
            version: 1,
            prev_block: ShaHash::new([0x11; HASH_SIZE]),
            merkle_root: ShaHash::new([0x22; HASH_SIZE]),
            timestamp: 1234567890,
            bits: 0x1d00ffff,
            nonce: 42,
        }
    }

    #[test]
    fn empty_merkle_block_is_86_bytes() {
        let msg = MerkleBlockMessage::new(sample_header());
        let mut buf = Vec::new();
        msg.encode(&mut buf, PROTOCOL_VERSION).unwrap();

        // 80 header + 4 total + 1 hash count + 1 flag count
        assert_eq!(buf.len(), 86);
        assert_eq!(buf[84], 0x00);
        assert_eq!(buf[85], 0x00);
    }

    #[test]
    fn round_trip() {
        let mut msg = MerkleBlockMessage::new(sample_header());
        msg.total_transactions = 3;
        msg.add_tx_hash(ShaHash::new([0x44; HASH_SIZE])).unwrap();
        msg.add_tx_hash(ShaHash::new([0x55; HASH_SIZE])).unwrap();
        msg.flags = vec![0b1011];

        let mut buf = Vec::new();
        msg.encode(&mut buf, PROTOCOL_VERSION).unwrap();

        let got = MerkleBlockMessage::decode(&buf, PROTOCOL_VERSION).unwrap();
        assert_eq!(got, msg);
    }

    #[test]
    fn rejected_before_bip37() {
        let msg = MerkleBlockMessage::new(sample_header());
        let mut buf = Vec::new();
        msg.encode(&mut buf, PROTOCOL_VERSION).unwrap();

        let pver = BIP0037_VERSION - 1;
        let mut sink = Vec::new();
        assert!(msg.encode(&mut sink, pver).unwrap_err().is_message_error());
        assert!(MerkleBlockMessage::decode(&buf, pver)
            .unwrap_err()
            .is_message_error());
    }

    #[test]
    fn forged_hash_count_rejected() {
        let mut buf = Vec::new();
        sample_header().encode(&mut buf).unwrap();
        buf.extend(&1u32.to_le_bytes());
        write_var_int(&mut buf, u64::from(MAX_TX_PER_BLOCK) + 1).unwrap();

        let err = MerkleBlockMessage::decode(&buf, PROTOCOL_VERSION).unwrap_err();
        assert!(err.is_message_error());
    }

    #[test]
    fn oversized_flag_list_rejected() {
        let mut buf = Vec::new();
        sample_header().encode(&mut buf).unwrap();
        buf.extend(&1u32.to_le_bytes());
        write_var_int(&mut buf, 0).unwrap();
        write_var_int(&mut buf, u64::from(MAX_FLAGS_PER_MERKLE_BLOCK) + 1).unwrap();

        let err = MerkleBlockMessage::decode(&buf, PROTOCOL_VERSION).unwrap_err();
        assert!(err.is_message_error());
    }

    #[test]
    fn truncated_hash_returns_io_error() {
        let mut msg = MerkleBlockMessage::new(sample_header());
        msg.add_tx_hash(ShaHash::new([0x44; HASH_SIZE])).unwrap();

        let mut buf = Vec::new();
        msg.encode(&mut buf, PROTOCOL_VERSION).unwrap();
        buf.truncate(buf.len() - 10);

        let err = MerkleBlockMessage::decode(&buf, PROTOCOL_VERSION).unwrap_err();
        assert!(!err.is_message_error());
    }
}
