//! Typed protocol messages and the command registry that maps wire
//! command strings to them.
//!
//! Every message implements [`Payload`]; [`Message`] is the closed sum of
//! all of them. Decoding dispatches through [`Message::decode_payload`],
//! which is the registry: an exhaustive match from [`Command`] to the
//! variant's decoder, fixed at compile time and safe for concurrent use.

use std::fmt;
use std::io::Write;

use crate::error::Result;
use crate::protocol::COMMAND_SIZE;

mod addr;
mod alert;
mod block;
mod filter;
mod getblocks;
mod headers;
mod inv;
mod mempool;
mod merkleblock;
mod ping;
mod reject;
mod tx;
mod verack;
mod version;

pub use addr::{AddrMessage, GetAddrMessage, MAX_ADDR_PER_MSG};
pub use alert::AlertMessage;
pub use block::Block;
pub use filter::{
    BloomUpdateType, FilterAddMessage, FilterClearMessage, FilterLoadMessage,
    MAX_FILTER_ADD_DATA_SIZE, MAX_FILTER_LOAD_FILTER_SIZE, MAX_FILTER_LOAD_HASH_FUNCS,
};
pub use getblocks::{GetBlocksMessage, GetHeadersMessage, MAX_BLOCK_LOCATORS_PER_MSG};
pub use headers::{HeadersMessage, MAX_BLOCK_HEADERS_PER_MSG};
pub use inv::{GetDataMessage, InvMessage, NotFoundMessage, MAX_INV_PER_MSG};
pub use mempool::MemPoolMessage;
pub use merkleblock::MerkleBlockMessage;
pub use ping::{PingMessage, PongMessage};
pub use reject::{RejectCode, RejectMessage};
pub use tx::{OutPoint, Tx, TxIn, TxOut, MIN_TX_PAYLOAD, TX_VERSION};
pub use verack::VerAckMessage;
pub use version::{VersionMessage, DEFAULT_USER_AGENT, MAX_USER_AGENT_LEN};

/// The closed set of protocol commands this codec speaks.
///
/// Each command's wire form is its ASCII name zero-padded to 12 bytes.
/// Every name is at most 12 bytes by construction, so an unencodable
/// command cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Version,
    VerAck,
    Addr,
    GetAddr,
    Inv,
    GetData,
    NotFound,
    GetBlocks,
    GetHeaders,
    Headers,
    Tx,
    Block,
    MerkleBlock,
    Ping,
    Pong,
    Alert,
    MemPool,
    FilterLoad,
    FilterAdd,
    FilterClear,
    Reject,
}

impl Command {
    /// The command name as it appears (unpadded) on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Version => "version",
            Command::VerAck => "verack",
            Command::Addr => "addr",
            Command::GetAddr => "getaddr",
            Command::Inv => "inv",
            Command::GetData => "getdata",
            Command::NotFound => "notfound",
            Command::GetBlocks => "getblocks",
            Command::GetHeaders => "getheaders",
            Command::Headers => "headers",
            Command::Tx => "tx",
            Command::Block => "block",
            Command::MerkleBlock => "merkleblock",
            Command::Ping => "ping",
            Command::Pong => "pong",
            Command::Alert => "alert",
            Command::MemPool => "mempool",
            Command::FilterLoad => "filterload",
            Command::FilterAdd => "filteradd",
            Command::FilterClear => "filterclear",
            Command::Reject => "reject",
        }
    }

    /// Looks up a registered command by its unpadded wire name.
    ///
    /// Returns `None` for anything not in the registry; the caller turns
    /// that into a protocol error that preserves the offending string.
    pub fn from_name(name: &str) -> Option<Command> {
        let command = match name {
            "version" => Command::Version,
            "verack" => Command::VerAck,
            "addr" => Command::Addr,
            "getaddr" => Command::GetAddr,
            "inv" => Command::Inv,
            "getdata" => Command::GetData,
            "notfound" => Command::NotFound,
            "getblocks" => Command::GetBlocks,
            "getheaders" => Command::GetHeaders,
            "headers" => Command::Headers,
            "tx" => Command::Tx,
            "block" => Command::Block,
            "merkleblock" => Command::MerkleBlock,
            "ping" => Command::Ping,
            "pong" => Command::Pong,
            "alert" => Command::Alert,
            "mempool" => Command::MemPool,
            "filterload" => Command::FilterLoad,
            "filteradd" => Command::FilterAdd,
            "filterclear" => Command::FilterClear,
            "reject" => Command::Reject,
            _ => return None,
        };
        Some(command)
    }

    /// The 12-byte zero-padded command field for the message header.
    pub fn wire_bytes(self) -> [u8; COMMAND_SIZE] {
        let name = self.as_str().as_bytes();
        let mut padded = [0u8; COMMAND_SIZE];
        padded[..name.len()].copy_from_slice(name);
        padded
    }

    /// Maximum payload a message with this command may declare at `pver`.
    ///
    /// Consulted by the stream driver before the payload buffer is
    /// allocated, so a forged length field cannot exhaust memory.
    pub fn max_payload_length(self, pver: u32) -> u32 {
        match self {
            Command::Version => VersionMessage::max_payload_length(pver),
            Command::VerAck => VerAckMessage::max_payload_length(pver),
            Command::Addr => AddrMessage::max_payload_length(pver),
            Command::GetAddr => GetAddrMessage::max_payload_length(pver),
            Command::Inv => InvMessage::max_payload_length(pver),
            Command::GetData => GetDataMessage::max_payload_length(pver),
            Command::NotFound => NotFoundMessage::max_payload_length(pver),
            Command::GetBlocks => GetBlocksMessage::max_payload_length(pver),
            Command::GetHeaders => GetHeadersMessage::max_payload_length(pver),
            Command::Headers => HeadersMessage::max_payload_length(pver),
            Command::Tx => Tx::max_payload_length(pver),
            Command::Block => Block::max_payload_length(pver),
            Command::MerkleBlock => MerkleBlockMessage::max_payload_length(pver),
            Command::Ping => PingMessage::max_payload_length(pver),
            Command::Pong => PongMessage::max_payload_length(pver),
            Command::Alert => AlertMessage::max_payload_length(pver),
            Command::MemPool => MemPoolMessage::max_payload_length(pver),
            Command::FilterLoad => FilterLoadMessage::max_payload_length(pver),
            Command::FilterAdd => FilterAddMessage::max_payload_length(pver),
            Command::FilterClear => FilterClearMessage::max_payload_length(pver),
            Command::Reject => RejectMessage::max_payload_length(pver),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message payload codec.
///
/// `decode` consumes the fully buffered, checksum-verified payload bytes;
/// `encode` writes the same bytes back out. Both honor the protocol
/// version gates for their fields. `max_payload_length` must be a true
/// upper bound for every value the type can encode at `pver` — the stream
/// driver trusts it to reject hostile length fields.
pub trait Payload: Sized {
    /// Wire command this payload travels under.
    const COMMAND: Command;

    /// Largest payload this message can legitimately declare at `pver`.
    fn max_payload_length(pver: u32) -> u32;

    /// Serializes the payload to `w` using the `pver` encoding.
    fn encode<W: Write>(&self, w: &mut W, pver: u32) -> Result<()>;

    /// Deserializes a payload from `payload` using the `pver` encoding.
    fn decode(payload: &[u8], pver: u32) -> Result<Self>;
}

/// A decoded protocol message.
///
/// One variant per registered command. The enum being closed is what
/// gives decode dispatch exhaustiveness checking and lets
/// `max_payload_length` be answered from the command alone.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Version(VersionMessage),
    VerAck(VerAckMessage),
    Addr(AddrMessage),
    GetAddr(GetAddrMessage),
    Inv(InvMessage),
    GetData(GetDataMessage),
    NotFound(NotFoundMessage),
    GetBlocks(GetBlocksMessage),
    GetHeaders(GetHeadersMessage),
    Headers(HeadersMessage),
    Tx(Tx),
    Block(Block),
    MerkleBlock(MerkleBlockMessage),
    Ping(PingMessage),
    Pong(PongMessage),
    Alert(AlertMessage),
    MemPool(MemPoolMessage),
    FilterLoad(FilterLoadMessage),
    FilterAdd(FilterAddMessage),
    FilterClear(FilterClearMessage),
    Reject(RejectMessage),
}

impl Message {
    /// The command this message travels under.
    pub fn command(&self) -> Command {
        match self {
            Message::Version(_) => Command::Version,
            Message::VerAck(_) => Command::VerAck,
            Message::Addr(_) => Command::Addr,
            Message::GetAddr(_) => Command::GetAddr,
            Message::Inv(_) => Command::Inv,
            Message::GetData(_) => Command::GetData,
            Message::NotFound(_) => Command::NotFound,
            Message::GetBlocks(_) => Command::GetBlocks,
            Message::GetHeaders(_) => Command::GetHeaders,
            Message::Headers(_) => Command::Headers,
            Message::Tx(_) => Command::Tx,
            Message::Block(_) => Command::Block,
            Message::MerkleBlock(_) => Command::MerkleBlock,
            Message::Ping(_) => Command::Ping,
            Message::Pong(_) => Command::Pong,
            Message::Alert(_) => Command::Alert,
            Message::MemPool(_) => Command::MemPool,
            Message::FilterLoad(_) => Command::FilterLoad,
            Message::FilterAdd(_) => Command::FilterAdd,
            Message::FilterClear(_) => Command::FilterClear,
            Message::Reject(_) => Command::Reject,
        }
    }

    /// Maximum payload this message may declare at `pver`.
    pub fn max_payload_length(&self, pver: u32) -> u32 {
        self.command().max_payload_length(pver)
    }

    /// Decodes the payload bytes for `command` into the matching variant.
    pub(crate) fn decode_payload(command: Command, payload: &[u8], pver: u32) -> Result<Message> {
        let message = match command {
            Command::Version => Message::Version(VersionMessage::decode(payload, pver)?),
            Command::VerAck => Message::VerAck(VerAckMessage::decode(payload, pver)?),
            Command::Addr => Message::Addr(AddrMessage::decode(payload, pver)?),
            Command::GetAddr => Message::GetAddr(GetAddrMessage::decode(payload, pver)?),
            Command::Inv => Message::Inv(InvMessage::decode(payload, pver)?),
            Command::GetData => Message::GetData(GetDataMessage::decode(payload, pver)?),
            Command::NotFound => Message::NotFound(NotFoundMessage::decode(payload, pver)?),
            Command::GetBlocks => Message::GetBlocks(GetBlocksMessage::decode(payload, pver)?),
            Command::GetHeaders => Message::GetHeaders(GetHeadersMessage::decode(payload, pver)?),
            Command::Headers => Message::Headers(HeadersMessage::decode(payload, pver)?),
            Command::Tx => Message::Tx(Tx::decode(payload, pver)?),
            Command::Block => Message::Block(Block::decode(payload, pver)?),
            Command::MerkleBlock => {
                Message::MerkleBlock(MerkleBlockMessage::decode(payload, pver)?)
            }
            Command::Ping => Message::Ping(PingMessage::decode(payload, pver)?),
            Command::Pong => Message::Pong(PongMessage::decode(payload, pver)?),
            Command::Alert => Message::Alert(AlertMessage::decode(payload, pver)?),
            Command::MemPool => Message::MemPool(MemPoolMessage::decode(payload, pver)?),
            Command::FilterLoad => Message::FilterLoad(FilterLoadMessage::decode(payload, pver)?),
            Command::FilterAdd => Message::FilterAdd(FilterAddMessage::decode(payload, pver)?),
            Command::FilterClear => {
                Message::FilterClear(FilterClearMessage::decode(payload, pver)?)
            }
            Command::Reject => Message::Reject(RejectMessage::decode(payload, pver)?),
        };
        Ok(message)
    }

    /// Encodes this message's payload to `w`.
    pub(crate) fn encode_payload<W: Write>(&self, w: &mut W, pver: u32) -> Result<()> {
        match self {
            Message::Version(msg) => msg.encode(w, pver),
            Message::VerAck(msg) => msg.encode(w, pver),
            Message::Addr(msg) => msg.encode(w, pver),
            Message::GetAddr(msg) => msg.encode(w, pver),
            Message::Inv(msg) => msg.encode(w, pver),
            Message::GetData(msg) => msg.encode(w, pver),
            Message::NotFound(msg) => msg.encode(w, pver),
            Message::GetBlocks(msg) => msg.encode(w, pver),
            Message::GetHeaders(msg) => msg.encode(w, pver),
            Message::Headers(msg) => msg.encode(w, pver),
            Message::Tx(msg) => msg.encode(w, pver),
            Message::Block(msg) => msg.encode(w, pver),
            Message::MerkleBlock(msg) => msg.encode(w, pver),
            Message::Ping(msg) => msg.encode(w, pver),
            Message::Pong(msg) => msg.encode(w, pver),
            Message::Alert(msg) => msg.encode(w, pver),
            Message::MemPool(msg) => msg.encode(w, pver),
            Message::FilterLoad(msg) => msg.encode(w, pver),
            Message::FilterAdd(msg) => msg.encode(w, pver),
            Message::FilterClear(msg) => msg.encode(w, pver),
            Message::Reject(msg) => msg.encode(w, pver),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_fit_the_header_field() {
        let commands = [
            Command::Version,
            Command::VerAck,
            Command::Addr,
            Command::GetAddr,
            Command::Inv,
            Command::GetData,
            Command::NotFound,
            Command::GetBlocks,
            Command::GetHeaders,
            Command::Headers,
            Command::Tx,
            Command::Block,
            Command::MerkleBlock,
            Command::Ping,
            Command::Pong,
            Command::Alert,
            Command::MemPool,
            Command::FilterLoad,
            Command::FilterAdd,
            Command::FilterClear,
            Command::Reject,
        ];

        for command in commands {
            assert!(command.as_str().len() <= COMMAND_SIZE);
            assert!(command.as_str().is_ascii());
            // The registry must be able to resolve its own names.
            assert_eq!(Command::from_name(command.as_str()), Some(command));
        }
    }

    #[test]
    fn wire_bytes_are_zero_padded() {
        assert_eq!(Command::VerAck.wire_bytes(), *b"verack\0\0\0\0\0\0");
        assert_eq!(Command::FilterClear.wire_bytes(), *b"filterclear\0");
    }

    #[test]
    fn payload_commands_match_their_variants() {
        assert_eq!(VersionMessage::COMMAND, Command::Version);
        assert_eq!(VerAckMessage::COMMAND, Command::VerAck);
        assert_eq!(AddrMessage::COMMAND, Command::Addr);
        assert_eq!(GetAddrMessage::COMMAND, Command::GetAddr);
        assert_eq!(InvMessage::COMMAND, Command::Inv);
        assert_eq!(GetDataMessage::COMMAND, Command::GetData);
        assert_eq!(NotFoundMessage::COMMAND, Command::NotFound);
        assert_eq!(GetBlocksMessage::COMMAND, Command::GetBlocks);
        assert_eq!(GetHeadersMessage::COMMAND, Command::GetHeaders);
        assert_eq!(HeadersMessage::COMMAND, Command::Headers);
        assert_eq!(Tx::COMMAND, Command::Tx);
        assert_eq!(Block::COMMAND, Command::Block);
        assert_eq!(MerkleBlockMessage::COMMAND, Command::MerkleBlock);
        assert_eq!(PingMessage::COMMAND, Command::Ping);
        assert_eq!(PongMessage::COMMAND, Command::Pong);
        assert_eq!(AlertMessage::COMMAND, Command::Alert);
        assert_eq!(MemPoolMessage::COMMAND, Command::MemPool);
        assert_eq!(FilterLoadMessage::COMMAND, Command::FilterLoad);
        assert_eq!(FilterAddMessage::COMMAND, Command::FilterAdd);
        assert_eq!(FilterClearMessage::COMMAND, Command::FilterClear);
        assert_eq!(RejectMessage::COMMAND, Command::Reject);
    }

    #[test]
    fn unknown_names_are_not_registered() {
        assert_eq!(Command::from_name("bogus"), None);
        assert_eq!(Command::from_name(""), None);
        // Registration is exact, not prefix-based.
        assert_eq!(Command::from_name("version2"), None);
    }
}
