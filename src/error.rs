use std::fmt;
use std::io;

/// Result type returned by every fallible operation in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The two failure classes of the wire codec.
///
/// I/O errors come from the caller-supplied reader or writer and are passed
/// through untouched so callers can inspect the original
/// [`std::io::ErrorKind`] (a read that hits end-of-stream surfaces as
/// `ErrorKind::UnexpectedEof`). Everything the remote peer can get wrong —
/// bad magic, bad checksum, oversized payloads, malformed fields — is a
/// [`MessageError`].
///
/// The split matters operationally: an I/O error at a message boundary is a
/// normal connection close, while a `MessageError` means the peer violated
/// the protocol and the connection should be dropped.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Propagated verbatim from the underlying reader or writer.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The remote peer violated the wire protocol.
    #[error(transparent)]
    Message(#[from] MessageError),
}

impl Error {
    /// Returns true if this is a protocol violation rather than an
    /// I/O failure.
    pub fn is_message_error(&self) -> bool {
        matches!(self, Error::Message(_))
    }
}

/// A protocol-level error with an optional label naming the operation that
/// detected it.
///
/// Rendered as `"label: description"` when a label is present, otherwise
/// just the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageError {
    /// Operation that raised the error, e.g. `"read_message"`.
    pub func: Option<&'static str>,
    /// Human-readable problem description.
    pub description: String,
}

impl MessageError {
    pub fn new(func: &'static str, description: impl Into<String>) -> MessageError {
        MessageError {
            func: Some(func),
            description: description.into(),
        }
    }
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.func {
            Some(func) => write!(f, "{}: {}", func, self.description),
            None => write!(f, "{}", self.description),
        }
    }
}

impl std::error::Error for MessageError {}

/// Shorthand used throughout the codec to raise a labelled protocol error.
pub(crate) fn message_error(func: &'static str, description: impl Into<String>) -> Error {
    Error::Message(MessageError::new(func, description))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_error_without_label() {
        let err = MessageError {
            func: None,
            description: "something bad happened".to_string(),
        };
        assert_eq!(err.to_string(), "something bad happened");
    }

    #[test]
    fn message_error_with_label() {
        let err = MessageError::new("foo", "something bad happened");
        assert_eq!(err.to_string(), "foo: something bad happened");
    }

    #[test]
    fn io_errors_keep_their_kind() {
        let err = Error::from(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert!(!err.is_message_error());
        match err {
            Error::Io(inner) => assert_eq!(inner.kind(), io::ErrorKind::UnexpectedEof),
            Error::Message(_) => panic!("expected Error::Io"),
        }
    }
}
