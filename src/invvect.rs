//! Inventory vectors: the (type, hash) pairs that `inv`, `getdata`, and
//! `notfound` messages use to advertise or request objects.
//!
//! Reference:
//! https://developer.bitcoin.org/reference/p2p_networking.html#data-messages

use std::fmt;
use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::Result;
use crate::hash::{ShaHash, HASH_SIZE};

/// Serialized size of an inventory vector: 4-byte type + 32-byte hash.
pub const MAX_INV_VECT_PAYLOAD: u32 = 4 + HASH_SIZE as u32;

/// The kind of object an inventory vector refers to.
///
/// Serialized as a little-endian u32. Unknown values are preserved on
/// decode rather than rejected — a newer peer may advertise object types
/// this codec predates, and dropping the connection over that would be
/// needlessly strict. They render as `"Unknown InvType (N)"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvType(pub u32);

impl InvType {
    /// Error / undefined.
    pub const ERROR: InvType = InvType(0);

    /// Transaction.
    pub const TX: InvType = InvType(1);

    /// Full block.
    pub const BLOCK: InvType = InvType(2);

    /// Filtered block (BIP 0037).
    pub const FILTERED_BLOCK: InvType = InvType(3);
}

impl fmt::Display for InvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            InvType::ERROR => write!(f, "ERROR"),
            InvType::TX => write!(f, "MSG_TX"),
            InvType::BLOCK => write!(f, "MSG_BLOCK"),
            InvType::FILTERED_BLOCK => write!(f, "MSG_FILTERED_BLOCK"),
            InvType(other) => write!(f, "Unknown InvType ({})", other),
        }
    }
}

/// A single inventory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvVect {
    /// Kind of object being advertised.
    pub inv_type: InvType,
    /// Hash of the object.
    pub hash: ShaHash,
}

impl InvVect {
    pub fn new(inv_type: InvType, hash: ShaHash) -> InvVect {
        InvVect { inv_type, hash }
    }

    pub(crate) fn decode<R: Read>(r: &mut R) -> Result<InvVect> {
        let inv_type = InvType(r.read_u32::<LittleEndian>()?);
        let mut hash = [0u8; HASH_SIZE];
        r.read_exact(&mut hash)?;
        Ok(InvVect {
            inv_type,
            hash: ShaHash::new(hash),
        })
    }

    pub(crate) fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_u32::<LittleEndian>(self.inv_type.0)?;
        w.write_all(&self.hash.bytes())?;
        Ok(())
    }
}
