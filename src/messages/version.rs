//! The `version` message: the first message either side of a connection
//! sends, negotiating protocol version and capabilities.
//!
//! Payload layout:
//!
//! ```text
//! int32    protocol_version
//! uint64   services
//! int64    timestamp
//! net_addr addr_you   (never carries a timestamp)
//! net_addr addr_me    (never carries a timestamp)
//! uint64   nonce
//! var_str  user_agent
//! int32    last_block
//! bool     relay      (only from BIP0037_VERSION)
//! ```
//!
//! Everything after `addr_you` is optional on decode: ancient peers sent
//! shorter version messages, and the fields simply default when the
//! payload ends early. The `relay` flag defaults to true so that a peer
//! too old to know about BIP 0037 keeps receiving transactions.
//!
//! Reference:
//! https://developer.bitcoin.org/reference/p2p_networking.html#version

use std::io::{Cursor, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{message_error, Result};
use crate::messages::{Command, Payload};
use crate::netaddress::NetAddress;
use crate::protocol::{ServiceFlag, BIP0037_VERSION, PROTOCOL_VERSION};
use crate::serialize::{read_var_string, write_var_string, MAX_VAR_INT_PAYLOAD};

/// User agent advertised by this library.
pub const DEFAULT_USER_AGENT: &str = "/rddwire:0.1.0/";

/// Maximum allowed length of the user agent field.
pub const MAX_USER_AGENT_LEN: u32 = 2000;

#[derive(Debug, Clone, PartialEq)]
pub struct VersionMessage {
    /// Highest protocol version the sender speaks.
    pub protocol_version: i32,
    /// Services the sender provides.
    pub services: ServiceFlag,
    /// Sender's wall-clock time, Unix seconds.
    pub timestamp: i64,
    /// The address of the peer this message is being sent to, as the
    /// sender sees it.
    pub addr_you: NetAddress,
    /// The sender's own address.
    pub addr_me: NetAddress,
    /// Random value used to detect self-connections.
    pub nonce: u64,
    /// Free-form client identifier, e.g. `"/rddwire:0.1.0/"`.
    pub user_agent: String,
    /// Height of the sender's best block.
    pub last_block: i32,
    /// Whether the sender wants transactions relayed to it (BIP 0037).
    pub relay: bool,
}

impl VersionMessage {
    /// Creates a version message advertising [`DEFAULT_USER_AGENT`], the
    /// current protocol version, and the current time.
    pub fn new(addr_me: NetAddress, addr_you: NetAddress, nonce: u64, last_block: i32) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        VersionMessage {
            protocol_version: PROTOCOL_VERSION as i32,
            services: ServiceFlag::NONE,
            timestamp,
            addr_you,
            addr_me,
            nonce,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            last_block,
            relay: true,
        }
    }

    /// Adds `service` to the set this node advertises.
    pub fn add_service(&mut self, service: ServiceFlag) {
        self.services = self.services | service;
    }

    /// Returns true if the sender advertises `service`.
    pub fn has_service(&self, service: ServiceFlag) -> bool {
        self.services.contains(service)
    }
}

fn validate_user_agent(user_agent: &str) -> Result<()> {
    if user_agent.len() as u32 > MAX_USER_AGENT_LEN {
        let description = format!(
            "user agent too long [len {}, max {}]",
            user_agent.len(),
            MAX_USER_AGENT_LEN
        );
        return Err(message_error("VersionMessage", description));
    }
    Ok(())
}

impl Payload for VersionMessage {
    const COMMAND: Command = Command::Version;

    fn max_payload_length(pver: u32) -> u32 {
        // Protocol version 4 bytes + services 8 bytes + timestamp 8 bytes
        // + two net addresses + nonce 8 bytes + user agent varint and max
        // length + last block 4 bytes + relay flag 1 byte.
        33 + NetAddress::serialize_size(pver, true) * 2 + MAX_VAR_INT_PAYLOAD + MAX_USER_AGENT_LEN
    }

    fn encode<W: Write>(&self, w: &mut W, pver: u32) -> Result<()> {
        validate_user_agent(&self.user_agent)?;

        w.write_i32::<LittleEndian>(self.protocol_version)?;
        w.write_u64::<LittleEndian>(self.services.bits())?;
        w.write_i64::<LittleEndian>(self.timestamp)?;
        self.addr_you.encode(w, pver, false)?;
        self.addr_me.encode(w, pver, false)?;
        w.write_u64::<LittleEndian>(self.nonce)?;
        write_var_string(w, &self.user_agent)?;
        w.write_i32::<LittleEndian>(self.last_block)?;

        if pver >= BIP0037_VERSION {
            w.write_u8(u8::from(self.relay))?;
        }
        Ok(())
    }

    fn decode(payload: &[u8], pver: u32) -> Result<Self> {
        let len = payload.len() as u64;
        let mut r = Cursor::new(payload);

        let protocol_version = r.read_i32::<LittleEndian>()?;
        let services = ServiceFlag(r.read_u64::<LittleEndian>()?);
        let timestamp = r.read_i64::<LittleEndian>()?;
        let addr_you = NetAddress::decode(&mut r, pver, false)?;

        let mut msg = VersionMessage {
            protocol_version,
            services,
            timestamp,
            addr_you,
            addr_me: NetAddress::default(),
            nonce: 0,
            user_agent: String::new(),
            last_block: 0,
            relay: true,
        };

        // Older peers stop here; every remaining field is best-effort.
        if r.position() < len {
            msg.addr_me = NetAddress::decode(&mut r, pver, false)?;
        }
        if r.position() < len {
            msg.nonce = r.read_u64::<LittleEndian>()?;
        }
        if r.position() < len {
            msg.user_agent = read_var_string(&mut r)?;
            validate_user_agent(&msg.user_agent)?;
        }
        if r.position() < len {
            msg.last_block = r.read_i32::<LittleEndian>()?;
        }
        if r.position() < len && pver >= BIP0037_VERSION {
            msg.relay = r.read_u8()? != 0;
        }

        Ok(msg)
    }
}
