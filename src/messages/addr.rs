//! The address relay pair: `getaddr` requests known peers, `addr` answers
//! with up to [`MAX_ADDR_PER_MSG`] of them.
//!
//! Reference:
//! https://developer.bitcoin.org/reference/p2p_networking.html#addr

use std::io::{Cursor, Write};

use crate::error::{message_error, Result};
use crate::messages::{Command, Payload};
use crate::netaddress::NetAddress;
use crate::protocol::MULTIPLE_ADDRESS_VERSION;
use crate::serialize::{read_var_int, write_var_int, MAX_VAR_INT_PAYLOAD};

/// Maximum number of addresses a single `addr` message may carry.
pub const MAX_ADDR_PER_MSG: u32 = 1000;

/// The `getaddr` message. No payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GetAddrMessage;

impl GetAddrMessage {
    pub fn new() -> GetAddrMessage {
        GetAddrMessage
    }
}

impl Payload for GetAddrMessage {
    const COMMAND: Command = Command::GetAddr;

    fn max_payload_length(_pver: u32) -> u32 {
        0
    }

    fn encode<W: Write>(&self, _w: &mut W, _pver: u32) -> Result<()> {
        Ok(())
    }

    fn decode(_payload: &[u8], _pver: u32) -> Result<Self> {
        Ok(GetAddrMessage)
    }
}

/// The `addr` message: a varint count followed by that many address
/// records (with timestamps, version permitting).
///
/// Peers older than [`MULTIPLE_ADDRESS_VERSION`] only ever exchanged a
/// single address per message; both encode and decode enforce that.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddrMessage {
    pub addr_list: Vec<NetAddress>,
}

impl AddrMessage {
    pub fn new() -> AddrMessage {
        AddrMessage::default()
    }

    /// Appends an address, failing once the message is full.
    pub fn add_address(&mut self, addr: NetAddress) -> Result<()> {
        if self.addr_list.len() as u32 + 1 > MAX_ADDR_PER_MSG {
            let description = format!("too many addresses in message [max {}]", MAX_ADDR_PER_MSG);
            return Err(message_error("AddrMessage::add_address", description));
        }
        self.addr_list.push(addr);
        Ok(())
    }

    /// Drops all addresses from the message.
    pub fn clear_addresses(&mut self) {
        self.addr_list.clear();
    }
}

impl Payload for AddrMessage {
    const COMMAND: Command = Command::Addr;

    fn max_payload_length(pver: u32) -> u32 {
        if pver < MULTIPLE_ADDRESS_VERSION {
            // Count varint + a single address.
            return MAX_VAR_INT_PAYLOAD + NetAddress::serialize_size(pver, true);
        }
        MAX_VAR_INT_PAYLOAD + MAX_ADDR_PER_MSG * NetAddress::serialize_size(pver, true)
    }

    fn encode<W: Write>(&self, w: &mut W, pver: u32) -> Result<()> {
        let count = self.addr_list.len() as u64;
        if count > u64::from(MAX_ADDR_PER_MSG) {
            let description = format!(
                "too many addresses for message [count {}, max {}]",
                count, MAX_ADDR_PER_MSG
            );
            return Err(message_error("AddrMessage::encode", description));
        }
        if pver < MULTIPLE_ADDRESS_VERSION && count > 1 {
            let description = format!(
                "too many addresses for message of protocol version {} [count {}, max 1]",
                pver, count
            );
            return Err(message_error("AddrMessage::encode", description));
        }

        write_var_int(w, count)?;
        for addr in &self.addr_list {
            addr.encode(w, pver, true)?;
        }
        Ok(())
    }

    fn decode(payload: &[u8], pver: u32) -> Result<Self> {
        let mut r = Cursor::new(payload);

        let count = read_var_int(&mut r)?;
        if count > u64::from(MAX_ADDR_PER_MSG) {
            let description = format!(
                "too many addresses for message [count {}, max {}]",
                count, MAX_ADDR_PER_MSG
            );
            return Err(message_error("AddrMessage::decode", description));
        }
        if pver < MULTIPLE_ADDRESS_VERSION && count > 1 {
            let description = format!(
                "too many addresses for message of protocol version {} [count {}, max 1]",
                pver, count
            );
            return Err(message_error("AddrMessage::decode", description));
        }

        let mut addr_list = Vec::with_capacity(count as usize);
        for _ in 0..count {
            addr_list.push(NetAddress::decode(&mut r, pver, true)?);
        }

        Ok(AddrMessage { addr_list })
    }
}
