//! The inventory list messages.
//!
//! `inv` advertises objects a peer has, `getdata` requests them, and
//! `notfound` reports requested objects the peer could not serve. All
//! three carry the same payload: a varint count followed by up to
//! [`MAX_INV_PER_MSG`] inventory vectors.
//!
//! Reference:
//! https://developer.bitcoin.org/reference/p2p_networking.html#inv

use std::io::{Cursor, Read, Write};

use crate::error::{message_error, Result};
use crate::invvect::{InvVect, MAX_INV_VECT_PAYLOAD};
use crate::messages::{Command, Payload};
use crate::serialize::{read_var_int, write_var_int, MAX_VAR_INT_PAYLOAD};

/// Maximum number of inventory vectors per message.
pub const MAX_INV_PER_MSG: u32 = 50000;

/// Count varint plus a full list of vectors; shared by all three
/// messages.
const MAX_INV_LIST_PAYLOAD: u32 = MAX_VAR_INT_PAYLOAD + MAX_INV_PER_MSG * MAX_INV_VECT_PAYLOAD;

fn read_inv_list(r: &mut impl Read, func: &'static str) -> Result<Vec<InvVect>> {
    let count = read_var_int(r)?;
    if count > u64::from(MAX_INV_PER_MSG) {
        let description = format!(
            "too many inventory vectors for message [count {}, max {}]",
            count, MAX_INV_PER_MSG
        );
        return Err(message_error(func, description));
    }

    let mut inv_list = Vec::with_capacity(count as usize);
    for _ in 0..count {
        inv_list.push(InvVect::decode(r)?);
    }
    Ok(inv_list)
}

fn write_inv_list(w: &mut impl Write, inv_list: &[InvVect], func: &'static str) -> Result<()> {
    let count = inv_list.len() as u64;
    if count > u64::from(MAX_INV_PER_MSG) {
        let description = format!(
            "too many inventory vectors for message [count {}, max {}]",
            count, MAX_INV_PER_MSG
        );
        return Err(message_error(func, description));
    }

    write_var_int(w, count)?;
    for iv in inv_list {
        iv.encode(w)?;
    }
    Ok(())
}

fn push_inv_vect(inv_list: &mut Vec<InvVect>, iv: InvVect, func: &'static str) -> Result<()> {
    if inv_list.len() as u32 + 1 > MAX_INV_PER_MSG {
        let description = format!(
            "too many inventory vectors in message [max {}]",
            MAX_INV_PER_MSG
        );
        return Err(message_error(func, description));
    }
    inv_list.push(iv);
    Ok(())
}

/// The `inv` message: advertises objects the sending peer has.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvMessage {
    pub inv_list: Vec<InvVect>,
}

impl InvMessage {
    pub fn new() -> InvMessage {
        InvMessage::default()
    }

    /// Creates a message with capacity reserved for `capacity` vectors
    /// (clamped to the per-message maximum).
    pub fn with_capacity(capacity: u32) -> InvMessage {
        InvMessage {
            inv_list: Vec::with_capacity(capacity.min(MAX_INV_PER_MSG) as usize),
        }
    }

    /// Appends an inventory vector, failing once the message is full.
    pub fn add_inv_vect(&mut self, iv: InvVect) -> Result<()> {
        push_inv_vect(&mut self.inv_list, iv, "InvMessage::add_inv_vect")
    }
}

impl Payload for InvMessage {
    const COMMAND: Command = Command::Inv;

    fn max_payload_length(_pver: u32) -> u32 {
        MAX_INV_LIST_PAYLOAD
    }

    fn encode<W: Write>(&self, w: &mut W, _pver: u32) -> Result<()> {
        write_inv_list(w, &self.inv_list, "InvMessage::encode")
    }

    fn decode(payload: &[u8], _pver: u32) -> Result<Self> {
        let mut r = Cursor::new(payload);
        let inv_list = read_inv_list(&mut r, "InvMessage::decode")?;
        Ok(InvMessage { inv_list })
    }
}

/// The `getdata` message: requests the objects named by its vectors,
/// typically in reply to an `inv`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetDataMessage {
    pub inv_list: Vec<InvVect>,
}

impl GetDataMessage {
    pub fn new() -> GetDataMessage {
        GetDataMessage::default()
    }

    /// Appends an inventory vector, failing once the message is full.
    pub fn add_inv_vect(&mut self, iv: InvVect) -> Result<()> {
        push_inv_vect(&mut self.inv_list, iv, "GetDataMessage::add_inv_vect")
    }
}

impl Payload for GetDataMessage {
    const COMMAND: Command = Command::GetData;

    fn max_payload_length(_pver: u32) -> u32 {
        MAX_INV_LIST_PAYLOAD
    }

    fn encode<W: Write>(&self, w: &mut W, _pver: u32) -> Result<()> {
        write_inv_list(w, &self.inv_list, "GetDataMessage::encode")
    }

    fn decode(payload: &[u8], _pver: u32) -> Result<Self> {
        let mut r = Cursor::new(payload);
        let inv_list = read_inv_list(&mut r, "GetDataMessage::decode")?;
        Ok(GetDataMessage { inv_list })
    }
}

/// The `notfound` message: names requested objects the peer does not
/// have.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotFoundMessage {
    pub inv_list: Vec<InvVect>,
}

impl NotFoundMessage {
    pub fn new() -> NotFoundMessage {
        NotFoundMessage::default()
    }

    /// Appends an inventory vector, failing once the message is full.
    pub fn add_inv_vect(&mut self, iv: InvVect) -> Result<()> {
        push_inv_vect(&mut self.inv_list, iv, "NotFoundMessage::add_inv_vect")
    }
}

impl Payload for NotFoundMessage {
    const COMMAND: Command = Command::NotFound;

    fn max_payload_length(_pver: u32) -> u32 {
        MAX_INV_LIST_PAYLOAD
    }

    fn encode<W: Write>(&self, w: &mut W, _pver: u32) -> Result<()> {
        write_inv_list(w, &self.inv_list, "NotFoundMessage::encode")
    }

    fn decode(payload: &[u8], _pver: u32) -> Result<Self> {
        let mut r = Cursor::new(payload);
        let inv_list = read_inv_list(&mut r, "NotFoundMessage::decode")?;
        Ok(NotFoundMessage { inv_list })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::ShaHash;
    use crate::invvect::InvType;
    use crate::protocol::PROTOCOL_VERSION;

    fn block_inv() -> InvVect {
        let hash: ShaHash = "3264bc2ac36a60840790ba1d475d01367e7c723da941069e9dc"
            .parse()
            .unwrap();
        InvVect::new(InvType::BLOCK, hash)
    }

    #[test]
    fn empty_inv_is_a_single_zero_byte() {
        let msg = InvMessage::new();
        let mut buf = Vec::new();
        msg.encode(&mut buf, PROTOCOL_VERSION).unwrap();
        assert_eq!(buf, vec![0x00]);
    }

    #[test]
    fn round_trip_all_three_commands() {
        let mut inv = InvMessage::new();
        inv.add_inv_vect(block_inv()).unwrap();
        let mut getdata = GetDataMessage::new();
        getdata.add_inv_vect(block_inv()).unwrap();
        let mut notfound = NotFoundMessage::new();
        notfound.add_inv_vect(block_inv()).unwrap();

        let mut buf = Vec::new();
        inv.encode(&mut buf, PROTOCOL_VERSION).unwrap();
        assert_eq!(buf.len(), 37);
        assert_eq!(InvMessage::decode(&buf, PROTOCOL_VERSION).unwrap(), inv);

        buf.clear();
        getdata.encode(&mut buf, PROTOCOL_VERSION).unwrap();
        assert_eq!(
            GetDataMessage::decode(&buf, PROTOCOL_VERSION).unwrap(),
            getdata
        );

        buf.clear();
        notfound.encode(&mut buf, PROTOCOL_VERSION).unwrap();
        assert_eq!(
            NotFoundMessage::decode(&buf, PROTOCOL_VERSION).unwrap(),
            notfound
        );
    }

    #[test]
    fn count_over_max_rejected_without_reading_entries() {
        let mut wire = Vec::new();
        write_var_int(&mut wire, u64::from(MAX_INV_PER_MSG) + 1).unwrap();

        let err = InvMessage::decode(&wire, PROTOCOL_VERSION).unwrap_err();
        assert!(err.is_message_error());
    }

    #[test]
    fn non_minimal_count_still_decodes() {
        // Count 1 spelled with the 3-byte form.
        let mut wire = vec![0xFD, 0x01, 0x00];
        block_inv().encode(&mut wire).unwrap();

        let got = InvMessage::decode(&wire, PROTOCOL_VERSION).unwrap();
        assert_eq!(got.inv_list, vec![block_inv()]);
    }

    #[test]
    fn truncated_entry_returns_io_error() {
        let mut wire = Vec::new();
        write_var_int(&mut wire, 2).unwrap();
        block_inv().encode(&mut wire).unwrap();
        // Second entry missing.

        let err = GetDataMessage::decode(&wire, PROTOCOL_VERSION).unwrap_err();
        assert!(!err.is_message_error());
    }

    #[test]
    fn max_payload_is_count_plus_full_list() {
        // 9 + 50000 * 36
        assert_eq!(InvMessage::max_payload_length(PROTOCOL_VERSION), 1800009);
        assert_eq!(
            GetDataMessage::max_payload_length(PROTOCOL_VERSION),
            1800009
        );
        assert_eq!(
            NotFoundMessage::max_payload_length(PROTOCOL_VERSION),
            1800009
        );
    }

    #[test]
    fn add_inv_vect_enforces_cap() {
        let mut msg = InvMessage::with_capacity(8);
        for _ in 0..8 {
            msg.add_inv_vect(block_inv()).unwrap();
        }
        msg.inv_list = vec![block_inv(); MAX_INV_PER_MSG as usize];
        assert!(msg.add_inv_vect(block_inv()).is_err());
    }
}
