//! Transactions and the `tx` message (the message payload *is* one
//! serialized transaction).
//!
//! Reddcoin descends from the proof-of-stake-velocity lineage, so unlike
//! plain Bitcoin a transaction carries its own timestamp between the
//! version and the input list:
//!
//! ```text
//! int32   version
//! uint32  time
//! varint  tx_in_count
//! tx_in[] inputs
//! varint  tx_out_count
//! tx_out[] outputs
//! uint32  lock_time
//! ```
//!
//! Reference (base layout, minus the timestamp):
//! https://developer.bitcoin.org/reference/transactions.html#raw-transaction-format

use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{message_error, Result};
use crate::hash::{double_sha256, ShaHash, HASH_SIZE};
use crate::messages::{Command, Payload};
use crate::protocol::{MAX_BLOCK_PAYLOAD, MAX_MESSAGE_PAYLOAD, PROTOCOL_VERSION};
use crate::serialize::{read_var_bytes, read_var_int, write_var_bytes, write_var_int};

/// Current transaction format version.
pub const TX_VERSION: i32 = 1;

/// Smallest possible serialized transaction: version + time + two empty
/// varint counts + lock time.
pub const MIN_TX_PAYLOAD: u32 = 14;

/// Smallest possible serialized input: 36-byte outpoint + script length
/// varint + sequence.
const MIN_TX_IN_PAYLOAD: u32 = HASH_SIZE as u32 + 4 + 1 + 4;

/// Most inputs a message can physically carry; used to reject forged
/// counts before allocating.
const MAX_TX_IN_PER_MESSAGE: u32 = MAX_MESSAGE_PAYLOAD / MIN_TX_IN_PAYLOAD + 1;

/// Smallest possible serialized output: 8-byte value + script length
/// varint.
const MIN_TX_OUT_PAYLOAD: u32 = 9;

/// Most outputs a message can physically carry.
const MAX_TX_OUT_PER_MESSAGE: u32 = MAX_MESSAGE_PAYLOAD / MIN_TX_OUT_PAYLOAD + 1;

/// A reference to an output of a previous transaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct OutPoint {
    pub hash: ShaHash,
    pub index: u32,
}

impl OutPoint {
    pub fn new(hash: ShaHash, index: u32) -> OutPoint {
        OutPoint { hash, index }
    }

    fn decode<R: Read>(r: &mut R) -> Result<OutPoint> {
        let mut hash = [0u8; HASH_SIZE];
        r.read_exact(&mut hash)?;
        let index = r.read_u32::<LittleEndian>()?;
        Ok(OutPoint {
            hash: ShaHash::new(hash),
            index,
        })
    }

    fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_all(&self.hash.bytes())?;
        w.write_u32::<LittleEndian>(self.index)?;
        Ok(())
    }
}

/// A transaction input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxIn {
    pub previous_outpoint: OutPoint,
    pub signature_script: Vec<u8>,
    pub sequence: u32,
}

impl TxIn {
    /// Creates an input spending `previous_outpoint` with the maximum
    /// sequence number (the final, non-replaceable form).
    pub fn new(previous_outpoint: OutPoint, signature_script: Vec<u8>) -> TxIn {
        TxIn {
            previous_outpoint,
            signature_script,
            sequence: u32::MAX,
        }
    }

    fn decode<R: Read>(r: &mut R) -> Result<TxIn> {
        let previous_outpoint = OutPoint::decode(r)?;
        let signature_script = read_var_bytes(
            r,
            MAX_MESSAGE_PAYLOAD,
            "transaction input signature script",
        )?;
        let sequence = r.read_u32::<LittleEndian>()?;
        Ok(TxIn {
            previous_outpoint,
            signature_script,
            sequence,
        })
    }

    fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        self.previous_outpoint.encode(w)?;
        write_var_bytes(w, &self.signature_script)?;
        w.write_u32::<LittleEndian>(self.sequence)?;
        Ok(())
    }
}

/// A transaction output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxOut {
    /// Amount in the smallest currency unit.
    pub value: i64,
    pub pk_script: Vec<u8>,
}

impl TxOut {
    pub fn new(value: i64, pk_script: Vec<u8>) -> TxOut {
        TxOut { value, pk_script }
    }

    fn decode<R: Read>(r: &mut R) -> Result<TxOut> {
        let value = r.read_i64::<LittleEndian>()?;
        let pk_script = read_var_bytes(
            r,
            MAX_MESSAGE_PAYLOAD,
            "transaction output public key script",
        )?;
        Ok(TxOut { value, pk_script })
    }

    fn encode<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_i64::<LittleEndian>(self.value)?;
        write_var_bytes(w, &self.pk_script)?;
        Ok(())
    }
}

/// A transaction; also the payload of the `tx` message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tx {
    pub version: i32,
    /// Transaction creation time (proof-of-stake-velocity field).
    pub time: u32,
    pub tx_in: Vec<TxIn>,
    pub tx_out: Vec<TxOut>,
    pub lock_time: u32,
}

impl Tx {
    /// Creates an empty transaction with the current version.
    pub fn new() -> Tx {
        Tx {
            version: TX_VERSION,
            time: 0,
            tx_in: Vec::new(),
            tx_out: Vec::new(),
            lock_time: 0,
        }
    }

    pub fn add_tx_in(&mut self, tx_in: TxIn) {
        self.tx_in.push(tx_in);
    }

    pub fn add_tx_out(&mut self, tx_out: TxOut) {
        self.tx_out.push(tx_out);
    }

    /// Computes the transaction hash: the double SHA-256 of the
    /// serialization at the current protocol version.
    pub fn tx_sha(&self) -> Result<ShaHash> {
        let mut buf = Vec::new();
        self.encode(&mut buf, PROTOCOL_VERSION)?;
        Ok(double_sha256(&buf))
    }

    /// Decodes a transaction from the middle of a larger stream (the
    /// `block` codec reads transactions back to back).
    pub(crate) fn read<R: Read>(r: &mut R, func: &'static str) -> Result<Tx> {
        let version = r.read_i32::<LittleEndian>()?;
        let time = r.read_u32::<LittleEndian>()?;

        let in_count = read_var_int(r)?;
        if in_count > u64::from(MAX_TX_IN_PER_MESSAGE) {
            let description = format!(
                "too many input transactions to fit into max message size [count {}, max {}]",
                in_count, MAX_TX_IN_PER_MESSAGE
            );
            return Err(message_error(func, description));
        }
        let mut tx_in = Vec::with_capacity(in_count as usize);
        for _ in 0..in_count {
            tx_in.push(TxIn::decode(r)?);
        }

        let out_count = read_var_int(r)?;
        if out_count > u64::from(MAX_TX_OUT_PER_MESSAGE) {
            let description = format!(
                "too many output transactions to fit into max message size [count {}, max {}]",
                out_count, MAX_TX_OUT_PER_MESSAGE
            );
            return Err(message_error(func, description));
        }
        let mut tx_out = Vec::with_capacity(out_count as usize);
        for _ in 0..out_count {
            tx_out.push(TxOut::decode(r)?);
        }

        let lock_time = r.read_u32::<LittleEndian>()?;

        Ok(Tx {
            version,
            time,
            tx_in,
            tx_out,
            lock_time,
        })
    }

    pub(crate) fn write<W: Write>(&self, w: &mut W) -> Result<()> {
        w.write_i32::<LittleEndian>(self.version)?;
        w.write_u32::<LittleEndian>(self.time)?;

        write_var_int(w, self.tx_in.len() as u64)?;
        for tx_in in &self.tx_in {
            tx_in.encode(w)?;
        }

        write_var_int(w, self.tx_out.len() as u64)?;
        for tx_out in &self.tx_out {
            tx_out.encode(w)?;
        }

        w.write_u32::<LittleEndian>(self.lock_time)?;
        Ok(())
    }
}

impl Payload for Tx {
    const COMMAND: Command = Command::Tx;

    fn max_payload_length(_pver: u32) -> u32 {
        // A transaction can be nearly as large as a full block.
        MAX_BLOCK_PAYLOAD
    }

    fn encode<W: Write>(&self, w: &mut W, _pver: u32) -> Result<()> {
        self.write(w)
    }

    fn decode(payload: &[u8], _pver: u32) -> Result<Self> {
        let mut r = Cursor::new(payload);
        Tx::read(&mut r, "Tx::decode")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx() -> Tx {
        let mut tx = Tx::new();
        tx.time = 0x5321a1db;
        tx.add_tx_in(TxIn::new(
            OutPoint::new(ShaHash::new([0x33; HASH_SIZE]), 1),
            vec![0x04, 0x31, 0xdc, 0x00, 0x1b, 0x01, 0x62],
        ));
        tx.add_tx_out(TxOut::new(
            5_000_000_000,
            vec![0x41, 0x04, 0xd6, 0x4b, 0xdf, 0xd0, 0x9e, 0xb1, 0xc5],
        ));
        tx
    }

    #[test]
    fn empty_tx_is_14_bytes() {
        let tx = Tx::new();
        let mut buf = Vec::new();
        tx.encode(&mut buf, PROTOCOL_VERSION).unwrap();

        assert_eq!(buf.len() as u32, MIN_TX_PAYLOAD);
        assert_eq!(&buf[0..4], &TX_VERSION.to_le_bytes());
        assert_eq!(&buf[4..8], &0u32.to_le_bytes()); // time
        assert_eq!(buf[8], 0); // no inputs
        assert_eq!(buf[9], 0); // no outputs
        assert_eq!(&buf[10..14], &0u32.to_le_bytes()); // lock time
    }

    #[test]
    fn round_trip() {
        let tx = sample_tx();
        let mut buf = Vec::new();
        tx.encode(&mut buf, PROTOCOL_VERSION).unwrap();

        let got = Tx::decode(&buf, PROTOCOL_VERSION).unwrap();
        assert_eq!(got, tx);
    }

    #[test]
    fn timestamp_sits_between_version_and_inputs() {
        let tx = sample_tx();
        let mut buf = Vec::new();
        tx.encode(&mut buf, PROTOCOL_VERSION).unwrap();

        assert_eq!(&buf[4..8], &0x5321a1dbu32.to_le_bytes());
        assert_eq!(buf[8], 1); // input count follows the timestamp
    }

    #[test]
    fn forged_input_count_rejected() {
        let mut buf = Vec::new();
        buf.extend(&TX_VERSION.to_le_bytes());
        buf.extend(&0u32.to_le_bytes());
        write_var_int(&mut buf, u64::from(MAX_TX_IN_PER_MESSAGE) + 1).unwrap();

        let err = Tx::decode(&buf, PROTOCOL_VERSION).unwrap_err();
        assert!(err.is_message_error());
    }

    #[test]
    fn forged_output_count_rejected() {
        let mut buf = Vec::new();
        buf.extend(&TX_VERSION.to_le_bytes());
        buf.extend(&0u32.to_le_bytes());
        write_var_int(&mut buf, 0).unwrap();
        write_var_int(&mut buf, u64::from(MAX_TX_OUT_PER_MESSAGE) + 1).unwrap();

        let err = Tx::decode(&buf, PROTOCOL_VERSION).unwrap_err();
        assert!(err.is_message_error());
    }

    #[test]
    fn truncated_script_returns_io_error() {
        let tx = sample_tx();
        let mut buf = Vec::new();
        tx.encode(&mut buf, PROTOCOL_VERSION).unwrap();
        buf.truncate(buf.len() - 20);

        let err = Tx::decode(&buf, PROTOCOL_VERSION).unwrap_err();
        assert!(!err.is_message_error());
    }

    #[test]
    fn tx_sha_matches_double_sha_of_serialization() {
        let tx = sample_tx();
        let mut buf = Vec::new();
        tx.encode(&mut buf, PROTOCOL_VERSION).unwrap();

        assert_eq!(tx.tx_sha().unwrap(), double_sha256(&buf));
    }

    #[test]
    fn max_payload_is_block_sized() {
        assert_eq!(Tx::max_payload_length(PROTOCOL_VERSION), MAX_BLOCK_PAYLOAD);
    }
}
