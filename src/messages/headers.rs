//! The `headers` message: up to [`MAX_BLOCK_HEADERS_PER_MSG`] block
//! headers, each followed by a varint transaction count that is always
//! zero (the transaction data is never included).
//!
//! Reference:
//! https://developer.bitcoin.org/reference/p2p_networking.html#headers

use std::io::{Cursor, Write};

use crate::blockheader::{BlockHeader, MAX_BLOCK_HEADER_PAYLOAD};
use crate::error::{message_error, Result};
use crate::messages::{Command, Payload};
use crate::serialize::{read_var_int, write_var_int, MAX_VAR_INT_PAYLOAD};

/// Maximum number of headers per message.
pub const MAX_BLOCK_HEADERS_PER_MSG: u32 = 2000;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeadersMessage {
    pub headers: Vec<BlockHeader>,
}

impl HeadersMessage {
    pub fn new() -> HeadersMessage {
        HeadersMessage::default()
    }

    /// Appends a header, failing once the message is full.
    pub fn add_block_header(&mut self, header: BlockHeader) -> Result<()> {
        if self.headers.len() as u32 + 1 > MAX_BLOCK_HEADERS_PER_MSG {
            let description = format!(
                "too many block headers in message [max {}]",
                MAX_BLOCK_HEADERS_PER_MSG
            );
            return Err(message_error("HeadersMessage::add_block_header", description));
        }
        self.headers.push(header);
        Ok(())
    }
}

impl Payload for HeadersMessage {
    const COMMAND: Command = Command::Headers;

    fn max_payload_length(_pver: u32) -> u32 {
        // Count varint + max headers, each with its trailing tx-count
        // varint. That count is always zero, so a single byte per header
        // covers it.
        MAX_VAR_INT_PAYLOAD + MAX_BLOCK_HEADERS_PER_MSG * (MAX_BLOCK_HEADER_PAYLOAD + 1)
    }

    fn encode<W: Write>(&self, w: &mut W, _pver: u32) -> Result<()> {
        let count = self.headers.len() as u64;
        if count > u64::from(MAX_BLOCK_HEADERS_PER_MSG) {
            let description = format!(
                "too many block headers for message [count {}, max {}]",
                count, MAX_BLOCK_HEADERS_PER_MSG
            );
            return Err(message_error("HeadersMessage::encode", description));
        }

        write_var_int(w, count)?;
        for header in &self.headers {
            header.encode(w)?;
            // The protocol reserves space for a transaction list that is
            // never populated in a headers message.
            write_var_int(w, 0)?;
        }
        Ok(())
    }

    fn decode(payload: &[u8], _pver: u32) -> Result<Self> {
        let mut r = Cursor::new(payload);

        let count = read_var_int(&mut r)?;
        if count > u64::from(MAX_BLOCK_HEADERS_PER_MSG) {
            let description = format!(
                "too many block headers for message [count {}, max {}]",
                count, MAX_BLOCK_HEADERS_PER_MSG
            );
            return Err(message_error("HeadersMessage::decode", description));
        }

        let mut headers = Vec::with_capacity(count as usize);
        for _ in 0..count {
            headers.push(BlockHeader::decode(&mut r)?);

            let tx_count = read_var_int(&mut r)?;
            if tx_count > 0 {
                let description =
                    format!("block headers may not contain transactions [count {}]", tx_count);
                return Err(message_error("HeadersMessage::decode", description));
            }
        }

        Ok(HeadersMessage { headers })
    }
}
