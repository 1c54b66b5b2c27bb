//! The BIP 0037 bloom filter messages: `filterload` installs a filter on
//! the remote peer, `filteradd` extends it, and `filterclear` removes it.
//! All three are invalid before [`BIP0037_VERSION`].
//!
//! Reference:
//! https://github.com/bitcoin/bips/blob/master/bip-0037.mediawiki

use std::fmt;
use std::io::{Cursor, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{message_error, Result};
use crate::messages::{Command, Payload};
use crate::protocol::BIP0037_VERSION;
use crate::serialize::{read_var_bytes, write_var_bytes, MAX_VAR_INT_PAYLOAD};

/// Maximum size in bytes of the filter bit field.
pub const MAX_FILTER_LOAD_FILTER_SIZE: u32 = 36000;

/// Maximum number of hash functions a filter may use.
pub const MAX_FILTER_LOAD_HASH_FUNCS: u32 = 50;

/// Maximum size of a single `filteradd` data element.
pub const MAX_FILTER_ADD_DATA_SIZE: u32 = 520;

/// How the remote peer updates the filter when a match is found.
///
/// Unknown values round-trip untouched and render as
/// `"Unknown BloomUpdateType (N)"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BloomUpdateType(pub u8);

impl BloomUpdateType {
    /// The filter is never updated.
    pub const NONE: BloomUpdateType = BloomUpdateType(0);

    /// The outpoint of every match is added to the filter.
    pub const ALL: BloomUpdateType = BloomUpdateType(1);

    /// Matching outpoints are added only for pay-to-pubkey and multisig
    /// scripts.
    pub const P2PUBKEY_ONLY: BloomUpdateType = BloomUpdateType(2);
}

impl fmt::Display for BloomUpdateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            BloomUpdateType::NONE => write!(f, "BloomUpdateNone"),
            BloomUpdateType::ALL => write!(f, "BloomUpdateAll"),
            BloomUpdateType::P2PUBKEY_ONLY => write!(f, "BloomUpdateP2PubkeyOnly"),
            BloomUpdateType(other) => write!(f, "Unknown BloomUpdateType ({})", other),
        }
    }
}

fn gate_check(pver: u32, command: Command, func: &'static str) -> Result<()> {
    if pver < BIP0037_VERSION {
        let description = format!("{} message invalid for protocol version {}", command, pver);
        return Err(message_error(func, description));
    }
    Ok(())
}

/// The `filterload` message.
///
/// ```text
/// varbytes  filter    (up to 36000 bytes)
/// uint32    hash_funcs (up to 50)
/// uint32    tweak
/// uint8     flags
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterLoadMessage {
    /// The serialized bloom filter bit field.
    pub filter: Vec<u8>,
    /// Number of hash functions the filter was built with.
    pub hash_funcs: u32,
    /// Random value added to the hash seed.
    pub tweak: u32,
    /// Matched-element update behavior.
    pub flags: BloomUpdateType,
}

impl FilterLoadMessage {
    pub fn new(
        filter: Vec<u8>,
        hash_funcs: u32,
        tweak: u32,
        flags: BloomUpdateType,
    ) -> FilterLoadMessage {
        FilterLoadMessage {
            filter,
            hash_funcs,
            tweak,
            flags,
        }
    }
}

impl Payload for FilterLoadMessage {
    const COMMAND: Command = Command::FilterLoad;

    fn max_payload_length(_pver: u32) -> u32 {
        // Filter length varint + max filter + hash funcs + tweak + flags.
        MAX_VAR_INT_PAYLOAD + MAX_FILTER_LOAD_FILTER_SIZE + 4 + 4 + 1
    }

    fn encode<W: Write>(&self, w: &mut W, pver: u32) -> Result<()> {
        gate_check(pver, Command::FilterLoad, "FilterLoadMessage::encode")?;

        if self.filter.len() as u32 > MAX_FILTER_LOAD_FILTER_SIZE {
            let description = format!(
                "filterload filter size too large for message [size {}, max {}]",
                self.filter.len(),
                MAX_FILTER_LOAD_FILTER_SIZE
            );
            return Err(message_error("FilterLoadMessage::encode", description));
        }
        if self.hash_funcs > MAX_FILTER_LOAD_HASH_FUNCS {
            let description = format!(
                "too many filter hash functions for message [count {}, max {}]",
                self.hash_funcs, MAX_FILTER_LOAD_HASH_FUNCS
            );
            return Err(message_error("FilterLoadMessage::encode", description));
        }

        write_var_bytes(w, &self.filter)?;
        w.write_u32::<LittleEndian>(self.hash_funcs)?;
        w.write_u32::<LittleEndian>(self.tweak)?;
        w.write_u8(self.flags.0)?;
        Ok(())
    }

    fn decode(payload: &[u8], pver: u32) -> Result<Self> {
        gate_check(pver, Command::FilterLoad, "FilterLoadMessage::decode")?;

        let mut r = Cursor::new(payload);
        let filter = read_var_bytes(&mut r, MAX_FILTER_LOAD_FILTER_SIZE, "filterload filter")?;
        let hash_funcs = r.read_u32::<LittleEndian>()?;
        let tweak = r.read_u32::<LittleEndian>()?;
        let flags = BloomUpdateType(r.read_u8()?);

        if hash_funcs > MAX_FILTER_LOAD_HASH_FUNCS {
            let description = format!(
                "too many filter hash functions for message [count {}, max {}]",
                hash_funcs, MAX_FILTER_LOAD_HASH_FUNCS
            );
            return Err(message_error("FilterLoadMessage::decode", description));
        }

        Ok(FilterLoadMessage {
            filter,
            hash_funcs,
            tweak,
            flags,
        })
    }
}

/// The `filteradd` message: a single data element to add to the remote
/// peer's active filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterAddMessage {
    pub data: Vec<u8>,
}

impl FilterAddMessage {
    pub fn new(data: Vec<u8>) -> FilterAddMessage {
        FilterAddMessage { data }
    }
}

impl Payload for FilterAddMessage {
    const COMMAND: Command = Command::FilterAdd;

    fn max_payload_length(_pver: u32) -> u32 {
        MAX_VAR_INT_PAYLOAD + MAX_FILTER_ADD_DATA_SIZE
    }

    fn encode<W: Write>(&self, w: &mut W, pver: u32) -> Result<()> {
        gate_check(pver, Command::FilterAdd, "FilterAddMessage::encode")?;

        if self.data.len() as u32 > MAX_FILTER_ADD_DATA_SIZE {
            let description = format!(
                "filteradd size too large for message [size {}, max {}]",
                self.data.len(),
                MAX_FILTER_ADD_DATA_SIZE
            );
            return Err(message_error("FilterAddMessage::encode", description));
        }

        write_var_bytes(w, &self.data)
    }

    fn decode(payload: &[u8], pver: u32) -> Result<Self> {
        gate_check(pver, Command::FilterAdd, "FilterAddMessage::decode")?;

        let mut r = Cursor::new(payload);
        let data = read_var_bytes(&mut r, MAX_FILTER_ADD_DATA_SIZE, "filteradd data")?;
        Ok(FilterAddMessage { data })
    }
}

/// The `filterclear` message: removes the remote peer's filter. No
/// payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterClearMessage;

impl FilterClearMessage {
    pub fn new() -> FilterClearMessage {
        FilterClearMessage
    }
}

impl Payload for FilterClearMessage {
    const COMMAND: Command = Command::FilterClear;

    fn max_payload_length(_pver: u32) -> u32 {
        0
    }

    fn encode<W: Write>(&self, _w: &mut W, pver: u32) -> Result<()> {
        gate_check(pver, Command::FilterClear, "FilterClearMessage::encode")?;
        Ok(())
    }

    fn decode(_payload: &[u8], pver: u32) -> Result<Self> {
        gate_check(pver, Command::FilterClear, "FilterClearMessage::decode")?;
        Ok(FilterClearMessage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PROTOCOL_VERSION;

    #[test]
    fn bloom_update_type_stringer() {
        let tests: &[(BloomUpdateType, &str)] = &[
            (BloomUpdateType::NONE, "BloomUpdateNone"),
            (BloomUpdateType::ALL, "BloomUpdateAll"),
            (BloomUpdateType::P2PUBKEY_ONLY, "BloomUpdateP2PubkeyOnly"),
            (BloomUpdateType(0xff), "Unknown BloomUpdateType (255)"),
        ];

        for (flags, want) in tests {
            assert_eq!(flags.to_string(), *want);
        }
    }

    #[test]
    fn filterload_round_trip() {
        let msg = FilterLoadMessage::new(vec![0x01], 10, 0, BloomUpdateType::NONE);

        let mut buf = Vec::new();
        msg.encode(&mut buf, PROTOCOL_VERSION).unwrap();
        // (1 + 1) filter + 4 + 4 + 1
        assert_eq!(buf.len(), 11);

        let got = FilterLoadMessage::decode(&buf, PROTOCOL_VERSION).unwrap();
        assert_eq!(got, msg);
    }

    #[test]
    fn filterload_rejects_oversized_filter() {
        let msg = FilterLoadMessage::new(
            vec![0u8; MAX_FILTER_LOAD_FILTER_SIZE as usize + 1],
            10,
            0,
            BloomUpdateType::NONE,
        );
        let mut buf = Vec::new();
        assert!(msg
            .encode(&mut buf, PROTOCOL_VERSION)
            .unwrap_err()
            .is_message_error());
    }

    #[test]
    fn filterload_rejects_too_many_hash_funcs() {
        let msg = FilterLoadMessage::new(
            vec![0x01],
            MAX_FILTER_LOAD_HASH_FUNCS + 1,
            0,
            BloomUpdateType::NONE,
        );
        let mut buf = Vec::new();
        assert!(msg
            .encode(&mut buf, PROTOCOL_VERSION)
            .unwrap_err()
            .is_message_error());

        // Same violation arriving off the wire.
        let mut wire = Vec::new();
        write_var_bytes(&mut wire, &[0x01]).unwrap();
        wire.extend(&(MAX_FILTER_LOAD_HASH_FUNCS + 1).to_le_bytes());
        wire.extend(&0u32.to_le_bytes());
        wire.push(0);
        assert!(FilterLoadMessage::decode(&wire, PROTOCOL_VERSION)
            .unwrap_err()
            .is_message_error());
    }

    #[test]
    fn filteradd_round_trip() {
        let msg = FilterAddMessage::new(vec![0xAB]);
        let mut buf = Vec::new();
        msg.encode(&mut buf, PROTOCOL_VERSION).unwrap();
        assert_eq!(buf, vec![0x01, 0xAB]);

        let got = FilterAddMessage::decode(&buf, PROTOCOL_VERSION).unwrap();
        assert_eq!(got, msg);
    }

    #[test]
    fn filteradd_rejects_oversized_data() {
        let msg = FilterAddMessage::new(vec![0u8; MAX_FILTER_ADD_DATA_SIZE as usize + 1]);
        let mut buf = Vec::new();
        assert!(msg
            .encode(&mut buf, PROTOCOL_VERSION)
            .unwrap_err()
            .is_message_error());
    }

    #[test]
    fn all_three_rejected_before_gate() {
        let pver = BIP0037_VERSION - 1;
        let mut buf = Vec::new();

        assert!(FilterLoadMessage::default()
            .encode(&mut buf, pver)
            .unwrap_err()
            .is_message_error());
        assert!(FilterLoadMessage::decode(&[], pver)
            .unwrap_err()
            .is_message_error());

        assert!(FilterAddMessage::default()
            .encode(&mut buf, pver)
            .unwrap_err()
            .is_message_error());
        assert!(FilterAddMessage::decode(&[], pver)
            .unwrap_err()
            .is_message_error());

        assert!(FilterClearMessage::new()
            .encode(&mut buf, pver)
            .unwrap_err()
            .is_message_error());
        assert!(FilterClearMessage::decode(&[], pver)
            .unwrap_err()
            .is_message_error());
    }

    #[test]
    fn max_payloads() {
        // 9 + 36000 + 9
        assert_eq!(
            FilterLoadMessage::max_payload_length(PROTOCOL_VERSION),
            36018
        );
        // 9 + 520
        assert_eq!(
            FilterAddMessage::max_payload_length(PROTOCOL_VERSION),
            529
        );
        assert_eq!(FilterClearMessage::max_payload_length(PROTOCOL_VERSION), 0);
    }
}
