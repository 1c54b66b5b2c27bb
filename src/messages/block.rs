//! The `block` message: an 80-byte header followed by the block's
//! transactions.
//!
//! ```text
//! block_header  (80 bytes)
//! varint        tx_count
//! tx[]          transactions
//! ```
//!
//! Reference:
//! https://developer.bitcoin.org/reference/block_chain.html#serialized-blocks

use std::io::{Cursor, Write};

use crate::blockheader::BlockHeader;
use crate::error::{message_error, Result};
use crate::hash::ShaHash;
use crate::messages::tx::{Tx, MIN_TX_PAYLOAD};
use crate::messages::{Command, Payload};
use crate::protocol::MAX_BLOCK_PAYLOAD;
use crate::serialize::{read_var_int, write_var_int};

/// Most transactions a block can physically hold, given the minimum
/// serialized transaction size. Used to reject forged counts before
/// allocating.
pub(crate) const MAX_TX_PER_BLOCK: u32 = MAX_BLOCK_PAYLOAD / MIN_TX_PAYLOAD + 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Tx>,
}

impl Block {
    pub fn new(header: BlockHeader) -> Block {
        Block {
            header,
            transactions: Vec::new(),
        }
    }

    pub fn add_transaction(&mut self, tx: Tx) {
        self.transactions.push(tx);
    }

    pub fn clear_transactions(&mut self) {
        self.transactions.clear();
    }

    /// The block hash — computed over the header only, never the
    /// transactions.
    pub fn block_sha(&self) -> ShaHash {
        self.header.block_sha()
    }

    /// Hashes of every transaction in the block, in block order.
    pub fn tx_shas(&self) -> Result<Vec<ShaHash>> {
        self.transactions.iter().map(|tx| tx.tx_sha()).collect()
    }
}

impl Payload for Block {
    const COMMAND: Command = Command::Block;

    fn max_payload_length(_pver: u32) -> u32 {
        MAX_BLOCK_PAYLOAD
    }

    fn encode<W: Write>(&self, w: &mut W, _pver: u32) -> Result<()> {
        self.header.encode(w)?;
        write_var_int(w, self.transactions.len() as u64)?;
        for tx in &self.transactions {
            tx.write(w)?;
        }
        Ok(())
    }

    fn decode(payload: &[u8], _pver: u32) -> Result<Self> {
        let mut r = Cursor::new(payload);

        let header = BlockHeader::decode(&mut r)?;

        let tx_count = read_var_int(&mut r)?;
        if tx_count > u64::from(MAX_TX_PER_BLOCK) {
            let description = format!(
                "too many transactions to fit into a block [count {}, max {}]",
                tx_count, MAX_TX_PER_BLOCK
            );
            return Err(message_error("Block::decode", description));
        }

        let mut transactions = Vec::with_capacity(tx_count as usize);
        for _ in 0..tx_count {
            transactions.push(Tx::read(&mut r, "Block::decode")?);
        }

        Ok(Block {
            header,
            transactions,
        })
    }
}
