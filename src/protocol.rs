//! Protocol-level constants: version gates, network magic values, and
//! service flags.
//!
//! The Reddcoin P2P protocol is versioned; a handful of historical gates
//! change how individual fields are serialized. Each gate below names the
//! protocol version that introduced (or, for [`BIP0031_VERSION`],
//! immediately precedes) a wire-format change. The gates are consulted by
//! the per-message codecs, never by callers directly.

use std::fmt;

use rand::Rng;

/// Latest protocol version the codec speaks.
pub const PROTOCOL_VERSION: u32 = 70002;

/// Version after which an `addr` message may carry more than one address.
pub const MULTIPLE_ADDRESS_VERSION: u32 = 209;

/// Version from which network addresses outside of version messages carry
/// a timestamp.
pub const NET_ADDRESS_TIME_VERSION: u32 = 31402;

/// The protocol version *after which* the pong message and the nonce field
/// in ping were introduced (BIP 0031). A peer at exactly this version still
/// speaks the old form, so the codecs compare with `>` rather than `>=`.
///
/// https://github.com/bitcoin/bips/blob/master/bip-0031.mediawiki
pub const BIP0031_VERSION: u32 = 60000;

/// Version from which the mempool message family exists (BIP 0035).
///
/// https://github.com/bitcoin/bips/blob/master/bip-0035.mediawiki
pub const BIP0035_VERSION: u32 = 60002;

/// Version from which bloom filtering (filterload, filteradd, filterclear,
/// merkleblock), the version message relay flag, and the reject message
/// exist (BIP 0037).
///
/// https://github.com/bitcoin/bips/blob/master/bip-0037.mediawiki
pub const BIP0037_VERSION: u32 = 70001;

/// Hard ceiling on a single message payload: 32 MiB.
///
/// Nothing the protocol can express legitimately comes close; anything
/// larger is a hostile or broken peer and is rejected before the payload
/// is read.
pub const MAX_MESSAGE_PAYLOAD: u32 = 1024 * 1024 * 32;

/// Maximum serialized size of a block (and therefore of the `block`,
/// `tx`, and `merkleblock` payloads).
pub const MAX_BLOCK_PAYLOAD: u32 = 1_000_000;

/// Size of the command field in every message header.
pub const COMMAND_SIZE: usize = 12;

/// Size of the fixed message header: 4-byte magic + 12-byte command +
/// 4-byte payload length + 4-byte checksum.
pub const MESSAGE_HEADER_SIZE: usize = 24;

/// The network identifier that prefixes every message frame.
///
/// The magic doubles as a stream resynchronization marker: a peer on the
/// wrong network is detected from the very first four bytes. Values are
/// serialized little-endian, so [`ReddcoinNet::MAIN_NET`] appears on the
/// wire as `fb c0 b6 db`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReddcoinNet(pub u32);

impl ReddcoinNet {
    /// The main Reddcoin network.
    pub const MAIN_NET: ReddcoinNet = ReddcoinNet(0xdbb6c0fb);

    /// The regression test network.
    pub const TEST_NET: ReddcoinNet = ReddcoinNet(0xdcb7c1fc);

    /// The public test network (version 3).
    pub const TEST_NET3: ReddcoinNet = ReddcoinNet(0xddb9c3fe);

    /// The simulation test network.
    pub const SIM_NET: ReddcoinNet = ReddcoinNet(0x12141c16);

    /// Raw magic value as serialized on the wire.
    pub const fn magic(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ReddcoinNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ReddcoinNet::MAIN_NET => write!(f, "MainNet"),
            ReddcoinNet::TEST_NET => write!(f, "TestNet"),
            ReddcoinNet::TEST_NET3 => write!(f, "TestNet3"),
            ReddcoinNet::SIM_NET => write!(f, "SimNet"),
            ReddcoinNet(other) => write!(f, "Unknown ReddcoinNet ({})", other),
        }
    }
}

/// Service flags advertised in version messages and network addresses.
///
/// This is a forward-compatible u64 bitfield: unknown bits are preserved
/// on both encode and decode, and the [`fmt::Display`] implementation
/// renders them as a trailing hex remainder (e.g.
/// `"SFNodeNetwork|0xfffffffe"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ServiceFlag(pub u64);

impl ServiceFlag {
    /// No services.
    pub const NONE: ServiceFlag = ServiceFlag(0);

    /// Full node: can serve complete blocks.
    pub const NODE_NETWORK: ServiceFlag = ServiceFlag(1);

    /// Raw bitfield value as serialized on the wire.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Returns true if every bit in `other` is set in `self`.
    pub const fn contains(self, other: ServiceFlag) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl From<u64> for ServiceFlag {
    fn from(bits: u64) -> Self {
        ServiceFlag(bits)
    }
}

impl std::ops::BitOr for ServiceFlag {
    type Output = ServiceFlag;

    fn bitor(self, rhs: ServiceFlag) -> ServiceFlag {
        ServiceFlag(self.0 | rhs.0)
    }
}

// Named flags in the order they are rendered.
const SERVICE_FLAG_NAMES: &[(ServiceFlag, &str)] = &[(ServiceFlag::NODE_NETWORK, "SFNodeNetwork")];

impl fmt::Display for ServiceFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "0x0");
        }

        let mut remaining = self.0;
        let mut first = true;
        for (flag, name) in SERVICE_FLAG_NAMES {
            if remaining & flag.0 == flag.0 {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                remaining &= !flag.0;
                first = false;
            }
        }

        if remaining != 0 {
            if !first {
                write!(f, "|")?;
            }
            write!(f, "0x{:x}", remaining)?;
        }
        Ok(())
    }
}

/// Returns a random u64 suitable for the nonce fields of version and ping
/// messages.
pub fn random_uint64() -> u64 {
    rand::thread_rng().gen()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_flag_stringer() {
        let tests: &[(u64, &str)] = &[
            (0, "0x0"),
            (1, "SFNodeNetwork"),
            (0xffffffff, "SFNodeNetwork|0xfffffffe"),
        ];

        for (bits, want) in tests {
            assert_eq!(ServiceFlag(*bits).to_string(), *want);
        }
    }

    #[test]
    fn reddcoin_net_stringer() {
        let tests: &[(ReddcoinNet, &str)] = &[
            (ReddcoinNet::MAIN_NET, "MainNet"),
            (ReddcoinNet::TEST_NET, "TestNet"),
            (ReddcoinNet::TEST_NET3, "TestNet3"),
            (ReddcoinNet::SIM_NET, "SimNet"),
            (ReddcoinNet(0xffffffff), "Unknown ReddcoinNet (4294967295)"),
        ];

        for (net, want) in tests {
            assert_eq!(net.to_string(), *want);
        }
    }

    #[test]
    fn version_gates_are_monotonic() {
        assert!(MULTIPLE_ADDRESS_VERSION < NET_ADDRESS_TIME_VERSION);
        assert!(NET_ADDRESS_TIME_VERSION < BIP0031_VERSION);
        assert!(BIP0031_VERSION < BIP0035_VERSION);
        assert!(BIP0035_VERSION < BIP0037_VERSION);
        assert!(BIP0037_VERSION < PROTOCOL_VERSION);
    }

    #[test]
    fn service_flag_contains() {
        let flags = ServiceFlag::NODE_NETWORK | ServiceFlag(0x80);
        assert!(flags.contains(ServiceFlag::NODE_NETWORK));
        assert!(!ServiceFlag::NONE.contains(ServiceFlag::NODE_NETWORK));
    }
}
