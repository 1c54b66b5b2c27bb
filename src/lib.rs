//! Reddcoin P2P wire protocol encoding and decoding.
//!
//! This crate converts between typed protocol messages and their exact
//! byte representation on a peer connection. It implements:
//!
//! - The fixed 24-byte message header (magic, command, length, checksum)
//! - A typed codec for every supported command, from `version` through
//!   `reject`, honoring the historical protocol-version gates
//! - The primitive encodings they share: little-endian integers, varints,
//!   length-prefixed bytes and strings, 32-byte hashes, network addresses
//! - Defensive payload bounds so a hostile peer cannot make the decoder
//!   allocate unbounded memory
//!
//! The codec is synchronous and stateless: [`read_message`] and
//! [`write_message`] operate on any [`std::io::Read`] / [`std::io::Write`]
//! (a `TcpStream`, a `Cursor` in tests, a TLS stream). Connection policy
//! — who to dial, when to ping, what to relay — belongs to the caller.
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use rddwire::{
//!     read_message, write_message, Message, PingMessage, ReddcoinNet, PROTOCOL_VERSION,
//! };
//!
//! let ping = Message::Ping(PingMessage::new(rddwire::random_uint64()));
//!
//! let mut wire = Vec::new();
//! write_message(&mut wire, &ping, PROTOCOL_VERSION, ReddcoinNet::MAIN_NET).unwrap();
//!
//! let mut cursor = Cursor::new(&wire);
//! let (decoded, _payload) =
//!     read_message(&mut cursor, PROTOCOL_VERSION, ReddcoinNet::MAIN_NET).unwrap();
//! assert_eq!(decoded, ping);
//! ```
//!
//! Protocol reference:
//! https://developer.bitcoin.org/reference/p2p_networking.html

pub mod blockheader;
pub mod codec;
pub mod error;
pub mod hash;
pub mod invvect;
pub mod messages;
pub mod netaddress;
pub mod protocol;
pub mod serialize;

pub use blockheader::{BlockHeader, BLOCK_HEADER_LEN, MAX_BLOCK_HEADER_PAYLOAD};
pub use codec::{read_message, read_message_n, write_message, write_message_n};
pub use error::{Error, MessageError, Result};
pub use hash::{double_sha256, ShaHash, HASH_SIZE, MAX_HASH_STRING_SIZE};
pub use invvect::{InvType, InvVect, MAX_INV_VECT_PAYLOAD};
pub use messages::{
    AddrMessage, AlertMessage, Block, BloomUpdateType, Command, FilterAddMessage,
    FilterClearMessage, FilterLoadMessage, GetAddrMessage, GetBlocksMessage, GetDataMessage,
    GetHeadersMessage, HeadersMessage, InvMessage, MemPoolMessage, MerkleBlockMessage, Message,
    NotFoundMessage, OutPoint, Payload, PingMessage, PongMessage, RejectCode, RejectMessage, Tx,
    TxIn, TxOut, VerAckMessage, VersionMessage, DEFAULT_USER_AGENT, MAX_ADDR_PER_MSG,
    MAX_BLOCK_HEADERS_PER_MSG, MAX_BLOCK_LOCATORS_PER_MSG, MAX_FILTER_ADD_DATA_SIZE,
    MAX_FILTER_LOAD_FILTER_SIZE, MAX_FILTER_LOAD_HASH_FUNCS, MAX_INV_PER_MSG,
    MAX_USER_AGENT_LEN,
};
pub use netaddress::NetAddress;
pub use protocol::{
    random_uint64, ReddcoinNet, ServiceFlag, BIP0031_VERSION, BIP0035_VERSION, BIP0037_VERSION,
    COMMAND_SIZE, MAX_BLOCK_PAYLOAD, MAX_MESSAGE_PAYLOAD, MESSAGE_HEADER_SIZE,
    MULTIPLE_ADDRESS_VERSION, NET_ADDRESS_TIME_VERSION, PROTOCOL_VERSION,
};
pub use serialize::{
    read_var_bytes, read_var_int, read_var_string, var_int_serialize_size, write_var_bytes,
    write_var_int, write_var_string, MAX_VAR_INT_PAYLOAD,
};
