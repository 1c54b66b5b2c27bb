//! Network address records as carried in `version` and `addr` messages.
//!
//! The wire layout is:
//!
//! ```text
//! 4  bytes  timestamp (u32 LE) — only when the protocol version is at
//!           least NET_ADDRESS_TIME_VERSION and the address is not inside
//!           a version message
//! 8  bytes  services (u64 LE)
//! 16 bytes  IP address (IPv4 embedded as ::ffff:a.b.c.d)
//! 2  bytes  port, big-endian
//! ```
//!
//! The port is the single big-endian field in the whole protocol.
//!
//! Reference:
//! https://developer.bitcoin.org/reference/p2p_networking.html#addr

use std::io::{Read, Write};
use std::net::{IpAddr, Ipv6Addr};
use std::time::{SystemTime, UNIX_EPOCH};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::Result;
use crate::protocol::{ServiceFlag, NET_ADDRESS_TIME_VERSION};

/// A peer address record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetAddress {
    /// Last time the address was seen. Not present on the wire inside
    /// version messages (and on any peer older than
    /// [`NET_ADDRESS_TIME_VERSION`]), in which case it decodes as zero.
    pub timestamp: u32,
    /// Services the peer at this address advertises.
    pub services: ServiceFlag,
    /// Peer IP address.
    pub ip: IpAddr,
    /// Peer port.
    pub port: u16,
}

impl Default for NetAddress {
    /// The all-zero address: unspecified IPv6, port 0, no services. This
    /// is what the optional `addr_me` of a truncated version message
    /// decodes to.
    fn default() -> NetAddress {
        NetAddress {
            timestamp: 0,
            services: ServiceFlag::NONE,
            ip: IpAddr::V6(Ipv6Addr::UNSPECIFIED),
            port: 0,
        }
    }
}

impl NetAddress {
    /// Creates an address stamped with the current wall-clock time.
    pub fn new(ip: IpAddr, port: u16, services: ServiceFlag) -> NetAddress {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as u32)
            .unwrap_or(0);
        NetAddress::with_timestamp(timestamp, ip, port, services)
    }

    /// Creates an address with an explicit timestamp.
    pub fn with_timestamp(
        timestamp: u32,
        ip: IpAddr,
        port: u16,
        services: ServiceFlag,
    ) -> NetAddress {
        NetAddress {
            timestamp,
            services,
            ip,
            port,
        }
    }

    /// Returns true if the address advertises every service in `services`.
    pub fn has_service(&self, services: ServiceFlag) -> bool {
        self.services.contains(services)
    }

    /// Serialized size at `pver`, honoring the timestamp gate.
    pub(crate) fn serialize_size(pver: u32, include_timestamp: bool) -> u32 {
        if include_timestamp && pver >= NET_ADDRESS_TIME_VERSION {
            30
        } else {
            26
        }
    }

    /// Decodes an address from `r`.
    ///
    /// `include_timestamp` is false only for the two addresses embedded in
    /// a version message, which predate the timestamp field and never
    /// carry it regardless of protocol version.
    pub(crate) fn decode<R: Read>(
        r: &mut R,
        pver: u32,
        include_timestamp: bool,
    ) -> Result<NetAddress> {
        let timestamp = if include_timestamp && pver >= NET_ADDRESS_TIME_VERSION {
            r.read_u32::<LittleEndian>()?
        } else {
            0
        };

        let services = ServiceFlag(r.read_u64::<LittleEndian>()?);

        let mut ip_bytes = [0u8; 16];
        r.read_exact(&mut ip_bytes)?;
        let v6 = Ipv6Addr::from(ip_bytes);
        let ip = match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(v6),
        };

        let port = r.read_u16::<BigEndian>()?;

        Ok(NetAddress {
            timestamp,
            services,
            ip,
            port,
        })
    }

    /// Encodes the address to `w`.
    pub(crate) fn encode<W: Write>(
        &self,
        w: &mut W,
        pver: u32,
        include_timestamp: bool,
    ) -> Result<()> {
        if include_timestamp && pver >= NET_ADDRESS_TIME_VERSION {
            w.write_u32::<LittleEndian>(self.timestamp)?;
        }

        w.write_u64::<LittleEndian>(self.services.bits())?;

        let ip_bytes = match self.ip {
            IpAddr::V4(v4) => v4.to_ipv6_mapped().octets(),
            IpAddr::V6(v6) => v6.octets(),
        };
        w.write_all(&ip_bytes)?;

        w.write_u16::<BigEndian>(self.port)?;
        Ok(())
    }
}
