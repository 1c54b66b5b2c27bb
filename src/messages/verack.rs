//! The `verack` message: acknowledges a peer's `version` message. It has
//! no payload; the 24-byte header is the whole frame.

use std::io::Write;

use crate::error::Result;
use crate::messages::{Command, Payload};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VerAckMessage;

impl VerAckMessage {
    pub fn new() -> VerAckMessage {
        VerAckMessage
    }
}

impl Payload for VerAckMessage {
    const COMMAND: Command = Command::VerAck;

    fn max_payload_length(_pver: u32) -> u32 {
        0
    }

    fn encode<W: Write>(&self, _w: &mut W, _pver: u32) -> Result<()> {
        Ok(())
    }

    fn decode(_payload: &[u8], _pver: u32) -> Result<Self> {
        Ok(VerAckMessage)
    }
}
