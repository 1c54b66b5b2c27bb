//! The `mempool` message: asks a peer to inventory its unconfirmed
//! transactions. No payload; gated behind bloom-filter support.

use std::io::Write;

use crate::error::{message_error, Result};
use crate::messages::{Command, Payload};
use crate::protocol::BIP0037_VERSION;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemPoolMessage;

impl MemPoolMessage {
    pub fn new() -> MemPoolMessage {
        MemPoolMessage
    }
}

impl Payload for MemPoolMessage {
    const COMMAND: Command = Command::MemPool;

    fn max_payload_length(_pver: u32) -> u32 {
        0
    }

    fn encode<W: Write>(&self, _w: &mut W, pver: u32) -> Result<()> {
        if pver < BIP0037_VERSION {
            let description = format!("mempool message invalid for protocol version {}", pver);
            return Err(message_error("MemPoolMessage::encode", description));
        }
        Ok(())
    }

    fn decode(_payload: &[u8], pver: u32) -> Result<Self> {
        if pver < BIP0037_VERSION {
            let description = format!("mempool message invalid for protocol version {}", pver);
            return Err(message_error("MemPoolMessage::decode", description));
        }
        Ok(MemPoolMessage)
    }
}
