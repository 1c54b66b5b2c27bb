//! The chain-walk request pair: `getblocks` asks for block inventory and
//! `getheaders` for bare headers. Both carry a block locator — a list of
//! hashes walking back from the requester's tip — plus a stop hash.
//!
//! Payload layout (identical for both commands):
//!
//! ```text
//! uint32  protocol_version
//! varint  hash_count
//! hash[]  block_locator_hashes  (up to 500)
//! hash    hash_stop             (zero hash = no stop)
//! ```
//!
//! The peer finds the first locator hash it recognizes in its chain and
//! responds with what follows it.
//!
//! Reference:
//! https://developer.bitcoin.org/reference/p2p_networking.html#getblocks

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{message_error, Result};
use crate::hash::{ShaHash, HASH_SIZE};
use crate::messages::{Command, Payload};
use crate::protocol::PROTOCOL_VERSION;
use crate::serialize::{read_var_int, write_var_int, MAX_VAR_INT_PAYLOAD};

/// Maximum number of block locator hashes per message.
pub const MAX_BLOCK_LOCATORS_PER_MSG: u32 = 500;

/// Version + count varint + full locator list + stop hash.
const MAX_LOCATOR_PAYLOAD: u32 =
    4 + MAX_VAR_INT_PAYLOAD + MAX_BLOCK_LOCATORS_PER_MSG * HASH_SIZE as u32 + HASH_SIZE as u32;

fn read_locator(
    r: &mut impl Read,
    func: &'static str,
) -> Result<(u32, Vec<ShaHash>, ShaHash)> {
    let protocol_version = r.read_u32::<LittleEndian>()?;

    let count = read_var_int(r)?;
    if count > u64::from(MAX_BLOCK_LOCATORS_PER_MSG) {
        let description = format!(
            "too many block locator hashes for message [count {}, max {}]",
            count, MAX_BLOCK_LOCATORS_PER_MSG
        );
        return Err(message_error(func, description));
    }

    let mut block_locator_hashes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let mut hash = [0u8; HASH_SIZE];
        r.read_exact(&mut hash)?;
        block_locator_hashes.push(ShaHash::new(hash));
    }

    let mut hash_stop = [0u8; HASH_SIZE];
    r.read_exact(&mut hash_stop)?;

    Ok((protocol_version, block_locator_hashes, ShaHash::new(hash_stop)))
}

fn write_locator(
    w: &mut impl Write,
    protocol_version: u32,
    block_locator_hashes: &[ShaHash],
    hash_stop: &ShaHash,
    func: &'static str,
) -> Result<()> {
    let count = block_locator_hashes.len() as u64;
    if count > u64::from(MAX_BLOCK_LOCATORS_PER_MSG) {
        let description = format!(
            "too many block locator hashes for message [count {}, max {}]",
            count, MAX_BLOCK_LOCATORS_PER_MSG
        );
        return Err(message_error(func, description));
    }

    w.write_u32::<LittleEndian>(protocol_version)?;
    write_var_int(w, count)?;
    for hash in block_locator_hashes {
        w.write_all(&hash.bytes())?;
    }
    w.write_all(&hash_stop.bytes())?;
    Ok(())
}

fn push_locator_hash(
    hashes: &mut Vec<ShaHash>,
    hash: ShaHash,
    func: &'static str,
) -> Result<()> {
    if hashes.len() as u32 + 1 > MAX_BLOCK_LOCATORS_PER_MSG {
        let description = format!(
            "too many block locator hashes in message [max {}]",
            MAX_BLOCK_LOCATORS_PER_MSG
        );
        return Err(message_error(func, description));
    }
    hashes.push(hash);
    Ok(())
}

/// The `getblocks` message: requests an `inv` of the blocks following the
/// locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetBlocksMessage {
    pub protocol_version: u32,
    pub block_locator_hashes: Vec<ShaHash>,
    /// Last block hash to announce; the zero hash means "as many as fit".
    pub hash_stop: ShaHash,
}

impl GetBlocksMessage {
    /// Creates a request with an empty locator and the given stop hash.
    pub fn new(hash_stop: ShaHash) -> GetBlocksMessage {
        GetBlocksMessage {
            protocol_version: PROTOCOL_VERSION,
            block_locator_hashes: Vec::new(),
            hash_stop,
        }
    }

    /// Appends a locator hash, failing once the locator is full.
    pub fn add_block_locator_hash(&mut self, hash: ShaHash) -> Result<()> {
        push_locator_hash(
            &mut self.block_locator_hashes,
            hash,
            "GetBlocksMessage::add_block_locator_hash",
        )
    }
}

impl Payload for GetBlocksMessage {
    const COMMAND: Command = Command::GetBlocks;

    fn max_payload_length(_pver: u32) -> u32 {
        MAX_LOCATOR_PAYLOAD
    }

    fn encode<W: Write>(&self, w: &mut W, _pver: u32) -> Result<()> {
        write_locator(
            w,
            self.protocol_version,
            &self.block_locator_hashes,
            &self.hash_stop,
            "GetBlocksMessage::encode",
        )
    }

    fn decode(payload: &[u8], _pver: u32) -> Result<Self> {
        let mut r = Cursor::new(payload);
        let (protocol_version, block_locator_hashes, hash_stop) =
            read_locator(&mut r, "GetBlocksMessage::decode")?;
        Ok(GetBlocksMessage {
            protocol_version,
            block_locator_hashes,
            hash_stop,
        })
    }
}

/// The `getheaders` message: like `getblocks`, but the peer answers with
/// a `headers` message instead of inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetHeadersMessage {
    pub protocol_version: u32,
    pub block_locator_hashes: Vec<ShaHash>,
    /// Last header to send; the zero hash means "up to 2000 headers".
    pub hash_stop: ShaHash,
}

impl GetHeadersMessage {
    /// Creates a request with an empty locator and no stop hash.
    pub fn new() -> GetHeadersMessage {
        GetHeadersMessage {
            protocol_version: PROTOCOL_VERSION,
            block_locator_hashes: Vec::new(),
            hash_stop: ShaHash::default(),
        }
    }

    /// Appends a locator hash, failing once the locator is full.
    pub fn add_block_locator_hash(&mut self, hash: ShaHash) -> Result<()> {
        push_locator_hash(
            &mut self.block_locator_hashes,
            hash,
            "GetHeadersMessage::add_block_locator_hash",
        )
    }
}

impl Default for GetHeadersMessage {
    fn default() -> GetHeadersMessage {
        GetHeadersMessage::new()
    }
}

impl Payload for GetHeadersMessage {
    const COMMAND: Command = Command::GetHeaders;

    fn max_payload_length(_pver: u32) -> u32 {
        MAX_LOCATOR_PAYLOAD
    }

    fn encode<W: Write>(&self, w: &mut W, _pver: u32) -> Result<()> {
        write_locator(
            w,
            self.protocol_version,
            &self.block_locator_hashes,
            &self.hash_stop,
            "GetHeadersMessage::encode",
        )
    }

    fn decode(payload: &[u8], _pver: u32) -> Result<Self> {
        let mut r = Cursor::new(payload);
        let (protocol_version, block_locator_hashes, hash_stop) =
            read_locator(&mut r, "GetHeadersMessage::decode")?;
        Ok(GetHeadersMessage {
            protocol_version,
            block_locator_hashes,
            hash_stop,
        })
    }
}
