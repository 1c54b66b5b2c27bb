//! The message envelope framer and stream driver.
//!
//! Every message travels inside a fixed 24-byte header:
//!
//! ```text
//! +------------+--------------+---------------+-------------+
//! | magic (4)  | command (12) | length (4 LE) | checksum (4)|
//! +------------+--------------+---------------+-------------+
//! | payload (length bytes)                              ... |
//! +---------------------------------------------------------+
//! ```
//!
//! The checksum is the first 4 bytes of `SHA256(SHA256(payload))`; a
//! zero-length payload still gets a real checksum (`5d f6 e0 e2`).
//!
//! [`read_message_n`] and [`write_message_n`] report the number of bytes
//! actually consumed from / produced to the stream alongside the result,
//! so callers metering bandwidth get a correct figure even when the call
//! fails partway. The plain [`read_message`] / [`write_message`] wrappers
//! drop the count.
//!
//! Reference:
//! https://developer.bitcoin.org/reference/p2p_networking.html#message-headers

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{message_error, Result};
use crate::hash::double_sha256;
use crate::messages::{Command, Message};
use crate::protocol::{ReddcoinNet, MAX_MESSAGE_PAYLOAD, MESSAGE_HEADER_SIZE};
use crate::serialize::read_full;

/// Reads the next message from `r`, returning the bytes consumed along
/// with the decoded message and its raw payload.
///
/// The count is exact on every path: a header rejected for the wrong
/// magic still consumed 24 bytes, a stream that dies mid-payload counts
/// the bytes that did arrive. Payload bytes discarded to resynchronize
/// after an oversized-declaration error are not counted, matching the
/// fact that the caller never sees them.
pub fn read_message_n<R: Read>(
    r: &mut R,
    pver: u32,
    net: ReddcoinNet,
) -> (usize, Result<(Message, Vec<u8>)>) {
    let mut total = 0;
    let result = read_message_counted(r, pver, net, &mut total);
    (total, result)
}

/// Reads the next message from `r`. See [`read_message_n`] for the
/// counting variant.
pub fn read_message<R: Read>(r: &mut R, pver: u32, net: ReddcoinNet) -> Result<(Message, Vec<u8>)> {
    let (_, result) = read_message_n(r, pver, net);
    result
}

/// Writes `msg` to `w`, returning the bytes written alongside the result.
pub fn write_message_n<W: Write>(
    w: &mut W,
    msg: &Message,
    pver: u32,
    net: ReddcoinNet,
) -> (usize, Result<()>) {
    let mut total = 0;
    let result = write_message_counted(w, msg, pver, net, &mut total);
    (total, result)
}

/// Writes `msg` to `w`. See [`write_message_n`] for the counting variant.
pub fn write_message<W: Write>(
    w: &mut W,
    msg: &Message,
    pver: u32,
    net: ReddcoinNet,
) -> Result<()> {
    let (_, result) = write_message_n(w, msg, pver, net);
    result
}

fn read_message_counted<R: Read>(
    r: &mut R,
    pver: u32,
    net: ReddcoinNet,
    total: &mut usize,
) -> Result<(Message, Vec<u8>)> {
    let mut header = [0u8; MESSAGE_HEADER_SIZE];
    read_full(r, &mut header, total)?;

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&header[0..4]);
    let magic = u32::from_le_bytes(magic);

    let command_field = &header[4..16];

    let mut length = [0u8; 4];
    length.copy_from_slice(&header[16..20]);
    let length = u32::from_le_bytes(length);

    let mut checksum = [0u8; 4];
    checksum.copy_from_slice(&header[20..24]);

    // Wrong network: nothing else in the header can be trusted, but the
    // declared payload is still skipped so a tolerant caller could keep
    // reading the stream.
    if magic != net.magic() {
        discard_input(r, length);
        let description = format!("message from other network [{}]", ReddcoinNet(magic));
        return Err(message_error("read_message", description));
    }

    // The command is ASCII padded with trailing NULs out to 12 bytes.
    let name_len = command_field
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(command_field.len());
    let command_name = match std::str::from_utf8(&command_field[..name_len]) {
        Ok(name) => name,
        Err(_) => {
            discard_input(r, length);
            let description = format!("invalid command {:?}", &command_field[..name_len]);
            return Err(message_error("read_message", description));
        }
    };

    let command = match Command::from_name(command_name) {
        Some(command) => command,
        None => {
            discard_input(r, length);
            let description = format!("unhandled command [{}]", command_name);
            return Err(message_error("read_message", description));
        }
    };

    if length > MAX_MESSAGE_PAYLOAD {
        let description = format!(
            "message payload is too large - header indicates {} bytes, but max message payload is {} bytes",
            length, MAX_MESSAGE_PAYLOAD
        );
        return Err(message_error("read_message", description));
    }

    // A forged length field must be caught from the command's own bound
    // before the payload buffer is allocated. The declared bytes are
    // drained so the stream stays aligned on the next header.
    let mpl = command.max_payload_length(pver);
    if length > mpl {
        discard_input(r, length);
        let description = format!(
            "payload exceeds max length - header indicates {} bytes, but max payload size for messages of type [{}] is {}",
            length, command, mpl
        );
        return Err(message_error("read_message", description));
    }

    let mut payload = vec![0u8; length as usize];
    read_full(r, &mut payload, total)?;

    let computed = double_sha256(&payload);
    if computed.bytes()[..4] != checksum {
        let description = format!(
            "payload checksum failed - header indicates {}, but actual checksum is {}",
            hex::encode(checksum),
            hex::encode(&computed.bytes()[..4])
        );
        return Err(message_error("read_message", description));
    }

    let message = Message::decode_payload(command, &payload, pver)?;
    Ok((message, payload))
}

fn write_message_counted<W: Write>(
    w: &mut W,
    msg: &Message,
    pver: u32,
    net: ReddcoinNet,
    total: &mut usize,
) -> Result<()> {
    let command = msg.command();

    let mut payload = Vec::new();
    msg.encode_payload(&mut payload, pver)?;
    let length = payload.len();

    if length > MAX_MESSAGE_PAYLOAD as usize {
        let description = format!(
            "message payload is too large - encoded {} bytes, but maximum message payload is {} bytes",
            length, MAX_MESSAGE_PAYLOAD
        );
        return Err(message_error("write_message", description));
    }
    let mpl = command.max_payload_length(pver);
    if length > mpl as usize {
        let description = format!(
            "message payload is too large - encoded {} bytes, but maximum message payload size for messages of type [{}] is {}",
            length, command, mpl
        );
        return Err(message_error("write_message", description));
    }

    let checksum = double_sha256(&payload);

    let mut header = Vec::with_capacity(MESSAGE_HEADER_SIZE);
    header.write_u32::<LittleEndian>(net.magic())?;
    header.write_all(&command.wire_bytes())?;
    header.write_u32::<LittleEndian>(length as u32)?;
    header.write_all(&checksum.bytes()[..4])?;

    w.write_all(&header)?;
    *total += MESSAGE_HEADER_SIZE;

    if !payload.is_empty() {
        w.write_all(&payload)?;
        *total += length;
    }
    Ok(())
}

/// Drains up to `length` declared payload bytes after a rejected header,
/// leaving the stream positioned at the next message. Read failures are
/// deliberately ignored — the caller already has the real error to
/// report.
fn discard_input<R: Read>(r: &mut R, length: u32) {
    if length > 0 {
        let _ = io::copy(&mut r.take(u64::from(length)), &mut io::sink());
    }
}
