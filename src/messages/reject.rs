//! The `reject` message: tells a peer why one of its messages was
//! refused. Introduced alongside bloom filtering; invalid before
//! [`BIP0037_VERSION`].
//!
//! ```text
//! varstring  command  (the command being rejected)
//! uint8      code
//! varstring  reason
//! hash       (only when the rejected command is "block" or "tx")
//! ```
//!
//! Reference:
//! https://developer.bitcoin.org/reference/p2p_networking.html#reject

use std::fmt;
use std::io::{Cursor, Read, Write};

use byteorder::{ReadBytesExt, WriteBytesExt};

use crate::error::{message_error, Result};
use crate::hash::{ShaHash, HASH_SIZE};
use crate::messages::{Command, Payload};
use crate::protocol::{BIP0037_VERSION, MAX_MESSAGE_PAYLOAD};
use crate::serialize::{read_var_string, write_var_string};

/// Machine-readable rejection reason.
///
/// Unknown codes round-trip untouched and render as
/// `"Unknown RejectCode (N)"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RejectCode(pub u8);

impl RejectCode {
    pub const MALFORMED: RejectCode = RejectCode(0x01);
    pub const INVALID: RejectCode = RejectCode(0x10);
    pub const OBSOLETE: RejectCode = RejectCode(0x11);
    pub const DUPLICATE: RejectCode = RejectCode(0x12);
    pub const NONSTANDARD: RejectCode = RejectCode(0x40);
    pub const DUST: RejectCode = RejectCode(0x41);
    pub const INSUFFICIENT_FEE: RejectCode = RejectCode(0x42);
    pub const CHECKPOINT: RejectCode = RejectCode(0x43);
}

impl fmt::Display for RejectCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RejectCode::MALFORMED => write!(f, "REJECT_MALFORMED"),
            RejectCode::INVALID => write!(f, "REJECT_INVALID"),
            RejectCode::OBSOLETE => write!(f, "REJECT_OBSOLETE"),
            RejectCode::DUPLICATE => write!(f, "REJECT_DUPLICATE"),
            RejectCode::NONSTANDARD => write!(f, "REJECT_NONSTANDARD"),
            RejectCode::DUST => write!(f, "REJECT_DUST"),
            RejectCode::INSUFFICIENT_FEE => write!(f, "REJECT_INSUFFICIENTFEE"),
            RejectCode::CHECKPOINT => write!(f, "REJECT_CHECKPOINT"),
            RejectCode(other) => write!(f, "Unknown RejectCode ({})", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectMessage {
    /// The command of the message being rejected, e.g. `"block"`.
    pub cmd: String,
    /// Why it was rejected.
    pub code: RejectCode,
    /// Free-form explanation for humans.
    pub reason: String,
    /// Hash of the rejected object. Only on the wire when [`cmd`] is
    /// `"block"` or `"tx"`; otherwise it stays the zero hash.
    ///
    /// [`cmd`]: RejectMessage::cmd
    pub hash: ShaHash,
}

impl RejectMessage {
    pub fn new(cmd: impl Into<String>, code: RejectCode, reason: impl Into<String>) -> Self {
        RejectMessage {
            cmd: cmd.into(),
            code,
            reason: reason.into(),
            hash: ShaHash::default(),
        }
    }

    /// True when this rejection carries the hash of the offending object.
    fn has_hash(cmd: &str) -> bool {
        cmd == Command::Block.as_str() || cmd == Command::Tx.as_str()
    }
}

fn gate_check(pver: u32, func: &'static str) -> Result<()> {
    if pver < BIP0037_VERSION {
        let description = format!("reject message invalid for protocol version {}", pver);
        return Err(message_error(func, description));
    }
    Ok(())
}

impl Payload for RejectMessage {
    const COMMAND: Command = Command::Reject;

    fn max_payload_length(_pver: u32) -> u32 {
        // The reason string is unbounded, so only the global ceiling
        // applies.
        MAX_MESSAGE_PAYLOAD
    }

    fn encode<W: Write>(&self, w: &mut W, pver: u32) -> Result<()> {
        gate_check(pver, "RejectMessage::encode")?;

        write_var_string(w, &self.cmd)?;
        w.write_u8(self.code.0)?;
        write_var_string(w, &self.reason)?;

        if RejectMessage::has_hash(&self.cmd) {
            w.write_all(&self.hash.bytes())?;
        }
        Ok(())
    }

    fn decode(payload: &[u8], pver: u32) -> Result<Self> {
        gate_check(pver, "RejectMessage::decode")?;

        let mut r = Cursor::new(payload);

        let cmd = read_var_string(&mut r)?;
        let code = RejectCode(r.read_u8()?);
        let reason = read_var_string(&mut r)?;

        let mut hash = ShaHash::default();
        if RejectMessage::has_hash(&cmd) {
            let mut bytes = [0u8; HASH_SIZE];
            r.read_exact(&mut bytes)?;
            hash = ShaHash::new(bytes);
        }

        Ok(RejectMessage {
            cmd,
            code,
            reason,
            hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PROTOCOL_VERSION;

    #[test]
    fn reject_code_stringer() {
        let tests: &[(RejectCode, &str)] = &[
            (RejectCode::MALFORMED, "REJECT_MALFORMED"),
            (RejectCode::INVALID, "REJECT_INVALID"),
            (RejectCode::OBSOLETE, "REJECT_OBSOLETE"),
            (RejectCode::DUPLICATE, "REJECT_DUPLICATE"),
            (RejectCode::NONSTANDARD, "REJECT_NONSTANDARD"),
            (RejectCode::DUST, "REJECT_DUST"),
            (RejectCode::INSUFFICIENT_FEE, "REJECT_INSUFFICIENTFEE"),
            (RejectCode::CHECKPOINT, "REJECT_CHECKPOINT"),
            (RejectCode(0xff), "Unknown RejectCode (255)"),
        ];

        for (code, want) in tests {
            assert_eq!(code.to_string(), *want);
        }
    }

    #[test]
    fn rejected_block_carries_hash() {
        let mut msg = RejectMessage::new("block", RejectCode::DUPLICATE, "duplicate block");
        msg.hash = "3264bc2ac36a60840790ba1d475d01367e7c723da941069e9dc"
            .parse()
            .unwrap();

        let mut buf = Vec::new();
        msg.encode(&mut buf, PROTOCOL_VERSION).unwrap();
        // (1+5) cmd + 1 code + (1+15) reason + 32 hash
        assert_eq!(buf.len(), 55);

        let got = RejectMessage::decode(&buf, PROTOCOL_VERSION).unwrap();
        assert_eq!(got, msg);
    }

    #[test]
    fn rejected_tx_carries_hash() {
        let msg = RejectMessage::new("tx", RejectCode::DUST, "dust output");
        let mut buf = Vec::new();
        msg.encode(&mut buf, PROTOCOL_VERSION).unwrap();

        let got = RejectMessage::decode(&buf, PROTOCOL_VERSION).unwrap();
        assert_eq!(got, msg);
    }

    #[test]
    fn other_commands_carry_no_hash() {
        let msg = RejectMessage::new("version", RejectCode::OBSOLETE, "obsolete version");
        let mut buf = Vec::new();
        msg.encode(&mut buf, PROTOCOL_VERSION).unwrap();
        // (1+7) + 1 + (1+16), nothing after the reason
        assert_eq!(buf.len(), 26);

        let got = RejectMessage::decode(&buf, PROTOCOL_VERSION).unwrap();
        assert_eq!(got.hash, ShaHash::default());
    }

    #[test]
    fn rejected_before_gate() {
        let pver = BIP0037_VERSION - 1;
        let msg = RejectMessage::new("block", RejectCode::DUPLICATE, "duplicate block");

        let mut buf = Vec::new();
        assert!(msg.encode(&mut buf, pver).unwrap_err().is_message_error());
        assert!(RejectMessage::decode(&[], pver)
            .unwrap_err()
            .is_message_error());
    }

    #[test]
    fn missing_hash_returns_io_error() {
        let msg = RejectMessage::new("block", RejectCode::DUPLICATE, "duplicate block");
        let mut buf = Vec::new();
        msg.encode(&mut buf, PROTOCOL_VERSION).unwrap();
        buf.truncate(buf.len() - HASH_SIZE);

        let err = RejectMessage::decode(&buf, PROTOCOL_VERSION).unwrap_err();
        assert!(!err.is_message_error());
    }
}
