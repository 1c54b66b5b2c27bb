//! The keep-alive pair.
//!
//! BIP 0031 (protocol versions *after* [`BIP0031_VERSION`]) gave `ping` a
//! nonce and introduced `pong` to echo it. Before that, ping was empty
//! and pong did not exist, so both codecs here branch on the same
//! comparison.
//!
//! Reference:
//! https://github.com/bitcoin/bips/blob/master/bip-0031.mediawiki

use std::io::{Cursor, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{message_error, Result};
use crate::messages::{Command, Payload};
use crate::protocol::BIP0031_VERSION;

/// The `ping` message. The nonce lets the sender match the eventual pong
/// to this ping; [`crate::protocol::random_uint64`] is the conventional
/// source for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PingMessage {
    pub nonce: u64,
}

impl PingMessage {
    pub fn new(nonce: u64) -> PingMessage {
        PingMessage { nonce }
    }
}

impl Payload for PingMessage {
    const COMMAND: Command = Command::Ping;

    fn max_payload_length(pver: u32) -> u32 {
        if pver > BIP0031_VERSION {
            8
        } else {
            0
        }
    }

    fn encode<W: Write>(&self, w: &mut W, pver: u32) -> Result<()> {
        if pver > BIP0031_VERSION {
            w.write_u64::<LittleEndian>(self.nonce)?;
        }
        Ok(())
    }

    fn decode(payload: &[u8], pver: u32) -> Result<Self> {
        let mut nonce = 0;
        if pver > BIP0031_VERSION {
            let mut r = Cursor::new(payload);
            nonce = r.read_u64::<LittleEndian>()?;
        }
        Ok(PingMessage { nonce })
    }
}

/// The `pong` message: echoes the nonce of the ping it answers. Does not
/// exist at or below [`BIP0031_VERSION`]; both directions refuse it
/// there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PongMessage {
    pub nonce: u64,
}

impl PongMessage {
    pub fn new(nonce: u64) -> PongMessage {
        PongMessage { nonce }
    }
}

impl Payload for PongMessage {
    const COMMAND: Command = Command::Pong;

    fn max_payload_length(pver: u32) -> u32 {
        if pver > BIP0031_VERSION {
            8
        } else {
            0
        }
    }

    fn encode<W: Write>(&self, w: &mut W, pver: u32) -> Result<()> {
        if pver <= BIP0031_VERSION {
            let description = format!("pong message invalid for protocol version {}", pver);
            return Err(message_error("PongMessage::encode", description));
        }
        w.write_u64::<LittleEndian>(self.nonce)?;
        Ok(())
    }

    fn decode(payload: &[u8], pver: u32) -> Result<Self> {
        if pver <= BIP0031_VERSION {
            let description = format!("pong message invalid for protocol version {}", pver);
            return Err(message_error("PongMessage::decode", description));
        }
        let mut r = Cursor::new(payload);
        let nonce = r.read_u64::<LittleEndian>()?;
        Ok(PongMessage { nonce })
    }
}
