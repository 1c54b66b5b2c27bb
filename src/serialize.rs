//! Primitive wire codecs shared by every message type.
//!
//! All multi-byte integers on the Reddcoin wire are little-endian (the one
//! exception, the big-endian port inside a network address, lives in
//! [`crate::netaddress`]). Variable-length data uses the Bitcoin
//! `CompactSize` encoding, called a varint here.
//!
//! Reference:
//! https://developer.bitcoin.org/reference/transactions.html#compactsize-unsigned-integers

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{message_error, Result};
use crate::protocol::MAX_MESSAGE_PAYLOAD;

/// Maximum number of bytes a varint can occupy (0xFF discriminator plus a
/// u64).
pub const MAX_VAR_INT_PAYLOAD: u32 = 9;

/// Reads a varint from `r`.
///
/// The discriminator byte selects the width of the value that follows:
///
/// ```text
/// < 0xFD          value is the discriminator itself (1 byte total)
///   0xFD          u16 little-endian follows           (3 bytes total)
///   0xFE          u32 little-endian follows           (5 bytes total)
///   0xFF          u64 little-endian follows           (9 bytes total)
/// ```
///
/// Non-minimal encodings (e.g. the value 5 spelled as `FD 05 00`) are
/// accepted; historical peers emit them and rejecting them would break
/// otherwise-valid streams. [`write_var_int`] always produces the minimal
/// form.
pub fn read_var_int<R: Read>(r: &mut R) -> Result<u64> {
    let discriminant = r.read_u8()?;
    let value = match discriminant {
        0xFF => r.read_u64::<LittleEndian>()?,
        0xFE => u64::from(r.read_u32::<LittleEndian>()?),
        0xFD => u64::from(r.read_u16::<LittleEndian>()?),
        n => u64::from(n),
    };
    Ok(value)
}

/// Writes `value` to `w` using the smallest varint form that can hold it.
pub fn write_var_int<W: Write>(w: &mut W, value: u64) -> Result<()> {
    match value {
        0..=0xFC => w.write_u8(value as u8)?,
        0xFD..=0xFFFF => {
            w.write_u8(0xFD)?;
            w.write_u16::<LittleEndian>(value as u16)?;
        }
        0x1_0000..=0xFFFF_FFFF => {
            w.write_u8(0xFE)?;
            w.write_u32::<LittleEndian>(value as u32)?;
        }
        _ => {
            w.write_u8(0xFF)?;
            w.write_u64::<LittleEndian>(value)?;
        }
    }
    Ok(())
}

/// Number of bytes [`write_var_int`] produces for `value`.
pub fn var_int_serialize_size(value: u64) -> usize {
    match value {
        0..=0xFC => 1,
        0xFD..=0xFFFF => 3,
        0x1_0000..=0xFFFF_FFFF => 5,
        _ => 9,
    }
}

/// Reads a varint-prefixed byte slice from `r`.
///
/// `max_length` bounds the declared length *before* any allocation so a
/// hostile peer cannot make us reserve gigabytes with a 9-byte prefix.
/// `field_name` names the field in the resulting protocol error.
pub fn read_var_bytes<R: Read>(r: &mut R, max_length: u32, field_name: &str) -> Result<Vec<u8>> {
    let count = read_var_int(r)?;
    if count > u64::from(max_length) {
        let description = format!(
            "{} is larger than the max allowed size [count {}, max {}]",
            field_name, count, max_length
        );
        return Err(message_error("read_var_bytes", description));
    }

    let mut bytes = vec![0u8; count as usize];
    r.read_exact(&mut bytes)?;
    Ok(bytes)
}

/// Writes `bytes` to `w` as a varint length followed by the raw bytes.
pub fn write_var_bytes<W: Write>(w: &mut W, bytes: &[u8]) -> Result<()> {
    write_var_int(w, bytes.len() as u64)?;
    w.write_all(bytes)?;
    Ok(())
}

/// Reads a varint-prefixed UTF-8 string from `r`.
///
/// The declared length is capped at [`MAX_MESSAGE_PAYLOAD`] since no valid
/// string can be longer than the message that carries it.
pub fn read_var_string<R: Read>(r: &mut R) -> Result<String> {
    let bytes = read_var_bytes(r, MAX_MESSAGE_PAYLOAD, "variable length string")?;
    String::from_utf8(bytes)
        .map_err(|e| message_error("read_var_string", format!("invalid UTF-8 string: {}", e)))
}

/// Writes `s` to `w` as a varint length followed by its UTF-8 bytes.
pub fn write_var_string<W: Write>(w: &mut W, s: &str) -> Result<()> {
    write_var_bytes(w, s.as_bytes())
}

/// Fills `buf` from `r`, adding every byte actually read to `total` even
/// when the read fails partway.
///
/// This is what makes byte accounting in [`crate::codec`] exact: a stream
/// that dies mid-payload still reports how far it got. A read returning
/// zero bytes before `buf` is full surfaces as `ErrorKind::UnexpectedEof`.
pub(crate) fn read_full<R: Read>(r: &mut R, buf: &mut [u8], total: &mut usize) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "failed to fill whole buffer",
                )
                .into());
            }
            Ok(n) => {
                filled += n;
                *total += n;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn var_int_encodes_minimal_form() {
        let tests: &[(u64, &[u8])] = &[
            (0, &[0x00]),
            (0xFC, &[0xFC]),
            (0xFD, &[0xFD, 0xFD, 0x00]),
            (0xFFFF, &[0xFD, 0xFF, 0xFF]),
            (0x1_0000, &[0xFE, 0x00, 0x00, 0x01, 0x00]),
            (0xFFFF_FFFF, &[0xFE, 0xFF, 0xFF, 0xFF, 0xFF]),
            (
                0x1_0000_0000,
                &[0xFF, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00],
            ),
            (
                u64::MAX,
                &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF],
            ),
        ];

        for (value, want) in tests {
            let mut buf = Vec::new();
            write_var_int(&mut buf, *value).unwrap();
            assert_eq!(buf.as_slice(), *want, "encoding of {}", value);
            assert_eq!(buf.len(), var_int_serialize_size(*value));

            let got = read_var_int(&mut Cursor::new(&buf)).unwrap();
            assert_eq!(got, *value);
        }
    }

    #[test]
    fn var_int_accepts_non_minimal_encodings() {
        // The value 5 has a 1-byte minimal form; all wider spellings must
        // still decode.
        let non_minimal: &[&[u8]] = &[
            &[0xFD, 0x05, 0x00],
            &[0xFE, 0x05, 0x00, 0x00, 0x00],
            &[0xFF, 0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        ];

        for buf in non_minimal {
            let got = read_var_int(&mut Cursor::new(buf)).unwrap();
            assert_eq!(got, 5);
        }
    }

    #[test]
    fn var_int_truncated_returns_io_error() {
        // Discriminator promises a u16 but only one byte follows.
        let err = read_var_int(&mut Cursor::new(&[0xFD, 0x05])).unwrap_err();
        assert!(!err.is_message_error());
    }

    #[test]
    fn var_bytes_round_trip() {
        let data = vec![0xAB; 300];
        let mut buf = Vec::new();
        write_var_bytes(&mut buf, &data).unwrap();
        // 300 needs the 0xFD form.
        assert_eq!(&buf[..3], &[0xFD, 0x2C, 0x01]);

        let got = read_var_bytes(&mut Cursor::new(&buf), 512, "test bytes").unwrap();
        assert_eq!(got, data);
    }

    #[test]
    fn var_bytes_rejects_length_over_max() {
        let mut buf = Vec::new();
        write_var_int(&mut buf, 11).unwrap();
        buf.extend_from_slice(&[0u8; 11]);

        let err = read_var_bytes(&mut Cursor::new(&buf), 10, "test bytes").unwrap_err();
        assert!(err.is_message_error());
        assert!(err.to_string().contains("test bytes"));
    }

    #[test]
    fn var_string_round_trip() {
        let mut buf = Vec::new();
        write_var_string(&mut buf, "/rddwire:0.1.0/").unwrap();
        assert_eq!(buf[0], 15);

        let got = read_var_string(&mut Cursor::new(&buf)).unwrap();
        assert_eq!(got, "/rddwire:0.1.0/");
    }

    #[test]
    fn var_string_rejects_invalid_utf8() {
        let buf = [0x02, 0xFF, 0xFE];
        let err = read_var_string(&mut Cursor::new(&buf)).unwrap_err();
        assert!(err.is_message_error());
    }

    #[test]
    fn read_full_counts_partial_reads() {
        let mut total = 0;
        let mut buf = [0u8; 8];
        let err = read_full(&mut Cursor::new(&[1u8, 2, 3]), &mut buf, &mut total).unwrap_err();
        assert!(!err.is_message_error());
        assert_eq!(total, 3);
    }
}
