//! Protocol Data Types
//!
//! This module defines the two values that cross the wire:
//!
//! - [`Arguments`]: a fully decoded command (name plus arguments)
//! - [`Reply`]: the response a handler produces for one command
//!
//! ## Reply Encoding
//!
//! Replies use a small fixed vocabulary. Sentinels carry no payload:
//!
//! OK: `+OK\r\n`
//! Nil: `$-1\r\n`
//! True: `:1\r\n`
//! False: `:0\r\n`
//!
//! Value-carrying replies:
//!
//! Bulk String: `$5\r\nhello\r\n`
//! Error: `-ERR HGETALL is not implemented\r\n`

use bytes::Bytes;
use std::fmt;

/// The CRLF terminator used by the protocol
pub const CRLF: &[u8] = b"\r\n";

/// Protocol type prefixes
pub mod prefix {
    pub const SIMPLE_STRING: u8 = b'+';
    pub const ERROR: u8 = b'-';
    pub const INTEGER: u8 = b':';
    pub const BULK_STRING: u8 = b'$';
    pub const MULTI_BULK: u8 = b'*';
}

/// A decoded command: index 0 is the command name, the rest are its
/// arguments in wire order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Arguments(Vec<Bytes>);

impl Arguments {
    /// Creates an argument vector from already-split parts.
    pub fn new(parts: Vec<Bytes>) -> Self {
        Arguments(parts)
    }

    /// Builds an argument vector from string slices (mostly for tests and benches).
    pub fn from_strs(parts: &[&str]) -> Self {
        Arguments(
            parts
                .iter()
                .map(|p| Bytes::copy_from_slice(p.as_bytes()))
                .collect(),
        )
    }

    /// The command name, if any argument was decoded.
    pub fn name(&self) -> Option<&[u8]> {
        self.0.first().map(|b| b.as_ref())
    }

    /// Returns the argument at `index` (0 is the command name).
    pub fn get(&self, index: usize) -> Option<&Bytes> {
        self.0.get(index)
    }

    /// Number of parts including the command name.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Bytes] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bytes> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Bytes> {
        self.0
    }
}

impl From<Vec<Bytes>> for Arguments {
    fn from(parts: Vec<Bytes>) -> Self {
        Arguments(parts)
    }
}

/// Renders one numbered line per argument: `1 'HGET'`.
impl fmt::Display for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arg) in self.0.iter().enumerate() {
            writeln!(f, "{} '{}'", i + 1, String::from_utf8_lossy(arg))?;
        }
        Ok(())
    }
}

/// The response to a single command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Successful mutation.
    /// Format: `+OK\r\n`
    Ok,

    /// Absent key.
    /// Format: `$-1\r\n`
    Nil,

    /// Boolean true (e.g. a key was deleted).
    /// Format: `:1\r\n`
    True,

    /// Boolean false (e.g. nothing to delete).
    /// Format: `:0\r\n`
    False,

    /// A stored value, binary-safe.
    /// Format: `$<length>\r\n<data>\r\n`
    BulkString(Bytes),

    /// An error line. The message includes its `ERR` token.
    /// Format: `-<message>\r\n`
    Error(String),
}

impl Reply {
    /// Creates a bulk string reply.
    ///
    /// # Example
    /// ```
    /// use tidekv::protocol::Reply;
    /// let reply = Reply::bulk_string("hello");
    /// assert_eq!(reply.serialize(), b"$5\r\nhello\r\n");
    /// ```
    pub fn bulk_string(data: impl Into<Bytes>) -> Self {
        Reply::BulkString(data.into())
    }

    /// Creates an error reply.
    pub fn error(message: impl Into<String>) -> Self {
        Reply::Error(message.into())
    }

    /// Maps a boolean outcome onto the True/False sentinels.
    pub fn from_bool(value: bool) -> Self {
        if value {
            Reply::True
        } else {
            Reply::False
        }
    }

    /// The error produced for commands nobody implements.
    pub fn not_implemented(command: &[u8]) -> Self {
        Reply::Error(format!(
            "ERR {} is not implemented",
            String::from_utf8_lossy(command)
        ))
    }

    /// Serializes the reply into its wire form.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.serialize_into(&mut buf);
        buf
    }

    /// Serializes the reply into an existing buffer.
    ///
    /// The session adapter uses this to batch every reply produced by one
    /// read into a single write.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        match self {
            Reply::Ok => {
                buf.push(prefix::SIMPLE_STRING);
                buf.extend_from_slice(b"OK");
                buf.extend_from_slice(CRLF);
            }
            Reply::Nil => {
                buf.push(prefix::BULK_STRING);
                buf.extend_from_slice(b"-1");
                buf.extend_from_slice(CRLF);
            }
            Reply::True => {
                buf.push(prefix::INTEGER);
                buf.push(b'1');
                buf.extend_from_slice(CRLF);
            }
            Reply::False => {
                buf.push(prefix::INTEGER);
                buf.push(b'0');
                buf.extend_from_slice(CRLF);
            }
            Reply::BulkString(data) => {
                buf.push(prefix::BULK_STRING);
                buf.extend_from_slice(data.len().to_string().as_bytes());
                buf.extend_from_slice(CRLF);
                buf.extend_from_slice(data);
                buf.extend_from_slice(CRLF);
            }
            Reply::Error(message) => {
                buf.push(prefix::ERROR);
                buf.extend_from_slice(message.as_bytes());
                buf.extend_from_slice(CRLF);
            }
        }
    }

    /// Returns true for the payload-free sentinel replies.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Reply::Ok | Reply::Nil | Reply::True | Reply::False)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Reply::Error(_))
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Ok => write!(f, "OK"),
            Reply::Nil => write!(f, "(nil)"),
            Reply::True => write!(f, "(true)"),
            Reply::False => write!(f, "(false)"),
            Reply::BulkString(data) => match std::str::from_utf8(data) {
                Ok(s) => write!(f, "\"{}\"", s),
                Err(_) => write!(f, "(binary data, {} bytes)", data.len()),
            },
            Reply::Error(message) => write!(f, "(error) {}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_serialize() {
        assert_eq!(Reply::Ok.serialize(), b"+OK\r\n");
        assert_eq!(Reply::Nil.serialize(), b"$-1\r\n");
        assert_eq!(Reply::True.serialize(), b":1\r\n");
        assert_eq!(Reply::False.serialize(), b":0\r\n");
    }

    #[test]
    fn test_bulk_string_serialize() {
        let reply = Reply::bulk_string(Bytes::from("hello"));
        assert_eq!(reply.serialize(), b"$5\r\nhello\r\n");
    }

    #[test]
    fn test_empty_bulk_string_serialize() {
        assert_eq!(Reply::bulk_string(Bytes::new()).serialize(), b"$0\r\n\r\n");
    }

    #[test]
    fn test_not_implemented_serialize() {
        let reply = Reply::not_implemented(b"CAS");
        assert_eq!(reply.serialize(), b"-ERR CAS is not implemented\r\n");
        assert!(reply.is_error());
        assert!(!reply.is_sentinel());
    }

    #[test]
    fn test_serialize_into_appends() {
        let mut buf = Vec::new();
        Reply::Ok.serialize_into(&mut buf);
        Reply::bulk_string("v").serialize_into(&mut buf);
        assert_eq!(buf, b"+OK\r\n$1\r\nv\r\n");
    }

    #[test]
    fn test_from_bool() {
        assert_eq!(Reply::from_bool(true), Reply::True);
        assert_eq!(Reply::from_bool(false), Reply::False);
    }

    #[test]
    fn test_arguments_accessors() {
        let args = Arguments::from_strs(&["HSET", "k", "v"]);
        assert_eq!(args.len(), 3);
        assert_eq!(args.name(), Some(&b"HSET"[..]));
        assert_eq!(args.get(2), Some(&Bytes::from("v")));
        assert!(args.get(3).is_none());
        assert!(Arguments::default().name().is_none());
    }

    #[test]
    fn test_arguments_display() {
        let args = Arguments::from_strs(&["HGET", "key"]);
        assert_eq!(args.to_string(), "1 'HGET'\n2 'key'\n");
    }
}
