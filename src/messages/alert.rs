//! The `alert` message: a signed notification broadcast by the network
//! operators.
//!
//! The codec treats both fields as opaque byte strings — interpreting the
//! serialized alert payload and verifying its signature are higher-level
//! concerns.
//!
//! ```text
//! varbytes  serialized_payload
//! varbytes  signature
//! ```

use std::io::{Cursor, Write};

use crate::error::Result;
use crate::messages::{Command, Payload};
use crate::protocol::MAX_MESSAGE_PAYLOAD;
use crate::serialize::{read_var_bytes, write_var_bytes};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertMessage {
    /// The serialized alert body, opaque at this layer.
    pub serialized_payload: Vec<u8>,
    /// Signature over the payload by the alert key.
    pub signature: Vec<u8>,
}

impl AlertMessage {
    pub fn new(serialized_payload: Vec<u8>, signature: Vec<u8>) -> AlertMessage {
        AlertMessage {
            serialized_payload,
            signature,
        }
    }
}

impl Payload for AlertMessage {
    const COMMAND: Command = Command::Alert;

    fn max_payload_length(_pver: u32) -> u32 {
        // The payload is free-form; only the global ceiling applies.
        MAX_MESSAGE_PAYLOAD
    }

    fn encode<W: Write>(&self, w: &mut W, _pver: u32) -> Result<()> {
        write_var_bytes(w, &self.serialized_payload)?;
        write_var_bytes(w, &self.signature)?;
        Ok(())
    }

    fn decode(payload: &[u8], _pver: u32) -> Result<Self> {
        let mut r = Cursor::new(payload);
        let serialized_payload = read_var_bytes(&mut r, MAX_MESSAGE_PAYLOAD, "alert payload")?;
        let signature = read_var_bytes(&mut r, MAX_MESSAGE_PAYLOAD, "alert signature")?;
        Ok(AlertMessage {
            serialized_payload,
            signature,
        })
    }
}
