//! Incremental Command Decoder
//!
//! TCP hands us bytes in whatever pieces it likes: half a command, three
//! commands at once, a bulk argument split across ten reads. The decoder
//! owns one connection's unconsumed bytes and turns them into complete
//! [`Arguments`], one command at a time.
//!
//! ## Framing Modes
//!
//! The first byte of every command picks the framing:
//!
//! - `*` starts a **multi-bulk** command: `*<argc>\r\n` followed by `argc`
//!   repetitions of `$<len>\r\n<len raw bytes>\r\n`
//! - anything else is an **inline** command: one line of
//!   whitespace-separated tokens
//!
//! ## State Machine
//!
//! ```text
//!              ┌──────────┐  '*'   ┌─────────────────┐  *N\r\n  ┌───────────────┐
//!   reset ───> │  Unset   │──────> │ MultiBulkHeader │────────> │ MultiBulkArgs │
//!              └────┬─────┘        └─────────────────┘          └───────┬───────┘
//!                   │ other                                             │ N args
//!                   ▼                                                   ▼
//!              ┌──────────┐                 line                 ┌────────────┐
//!              │  Inline  │ ───────────────────────────────────> │  dispatch  │
//!              └──────────┘                                      └────────────┘
//! ```
//!
//! Every state can answer "need more data", in which case nothing is
//! consumed and the same state is retried after the next [`Decoder::feed`].
//! Malformed input resets the machine and discards the offending fragment;
//! the connection stays usable.
//!
//! ## Buffer Management
//!
//! Bytes are released from the front of the buffer as soon as they are
//! consumed, so the buffer only ever holds input that has not been decoded
//! yet. Decoded arguments are zero-copy slices of the frozen fragment.

use crate::protocol::types::{prefix, Arguments, CRLF};
use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tracing::{debug, trace};

/// Maximum size for a single bulk argument (512 MB, same as Redis)
pub const MAX_BULK_SIZE: usize = 512 * 1024 * 1024;

/// Maximum declared argument count of a multi-bulk command (same as Redis)
pub const MAX_MULTI_BULK_ARGS: usize = 1024 * 1024;

/// Upper bound on argument slots reserved from an untrusted `*<argc>` header
const MAX_PREALLOCATED_ARGS: usize = 1024;

/// Initial decode buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Ways the input can be malformed.
///
/// None of these are fatal: the decoder logs them, resets, and keeps going.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// An inline line contained nothing but whitespace
    #[error("empty inline command")]
    EmptyInline,

    /// The `*<argc>` header did not parse, was negative or was too large
    #[error("invalid multi-bulk count: {0:?}")]
    InvalidArgumentCount(String),

    /// The `$<len>` header did not parse or was negative
    #[error("invalid bulk length: {0:?}")]
    InvalidBulkLength(String),

    /// The `$<len>` header declared more than we accept
    #[error("bulk length too large: {size} bytes (max: {max})")]
    BulkTooLarge { size: usize, max: usize },

    /// The bytes following an argument's payload were not CRLF
    #[error("argument not terminated by CRLF")]
    MissingTerminator,
}

/// The framing of the command currently being decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FramingMode {
    /// Between commands
    #[default]
    Unset,
    Inline,
    MultiBulk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unset,
    Inline,
    MultiBulkHeader,
    MultiBulkArgs,
}

/// A parsed `$<len>\r\n` header whose payload has not fully arrived.
#[derive(Debug, Clone, Copy)]
struct PendingArgument {
    header_len: usize,
    len: usize,
}

/// Per-connection incremental decoder.
///
/// # Example
///
/// ```
/// use tidekv::protocol::{Arguments, Decoder};
///
/// let mut decoder = Decoder::new();
/// let mut commands = Vec::new();
///
/// decoder.feed(b"*2\r\n$4\r\nHGET\r\n", |args| commands.push(args));
/// assert!(commands.is_empty());
///
/// decoder.feed(b"$3\r\nkey\r\n", |args| commands.push(args));
/// assert_eq!(commands, vec![Arguments::from_strs(&["HGET", "key"])]);
/// ```
#[derive(Debug)]
pub struct Decoder {
    state: State,

    /// Declared argument count of the current multi-bulk command
    expected: usize,

    /// Arguments still to be read for the current multi-bulk command
    remaining: usize,

    /// Length header of the argument being waited on
    pending: Option<PendingArgument>,

    /// Arguments decoded so far for the current command
    arguments: Vec<Bytes>,

    /// Payload bytes held by `arguments`
    held: usize,

    /// Unconsumed input
    buffer: BytesMut,

    /// Total bytes consumed over the decoder's lifetime
    consumed: u64,

    /// Commands handed out
    decoded: u64,

    /// Malformed fragments discarded
    malformed: u64,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Creates a decoder with an empty buffer.
    pub fn new() -> Self {
        Self {
            state: State::Unset,
            expected: 0,
            remaining: 0,
            pending: None,
            arguments: Vec::new(),
            held: 0,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            consumed: 0,
            decoded: 0,
            malformed: 0,
        }
    }

    /// Appends `data` and hands every complete command to `on_command`, in
    /// wire order.
    ///
    /// Returns once the buffer no longer holds a complete command. Partial
    /// input stays buffered for the next call.
    ///
    /// # Returns
    ///
    /// The number of commands dispatched by this call.
    pub fn feed<F>(&mut self, data: &[u8], mut on_command: F) -> usize
    where
        F: FnMut(Arguments),
    {
        self.extend(data);

        let mut dispatched = 0;
        while let Some(arguments) = self.decode_next() {
            on_command(arguments);
            dispatched += 1;
        }
        dispatched
    }

    /// Appends `data` without decoding anything.
    ///
    /// Pair with [`Decoder::decode_next`] to pull commands one at a time.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Decodes the next complete command from the buffer, if there is one.
    ///
    /// Malformed fragments are discarded along the way, so a `None` always
    /// means "need more data".
    pub fn decode_next(&mut self) -> Option<Arguments> {
        loop {
            match self.step() {
                Ok(Some(arguments)) => {
                    self.decoded += 1;
                    trace!(
                        arguments = arguments.len(),
                        buffered = self.buffer.len(),
                        "Decoded command"
                    );
                    self.reset();
                    return Some(arguments);
                }
                Ok(None) => return None,
                Err(e) => {
                    debug!(error = %e, consumed = self.consumed, "Malformed input, resetting");
                    self.malformed += 1;
                    self.reset();
                }
            }
        }
    }

    /// Clears the per-command parse state.
    ///
    /// Buffered input is kept, so pipelined commands after the current one
    /// still decode.
    pub fn reset(&mut self) {
        self.state = State::Unset;
        self.expected = 0;
        self.remaining = 0;
        self.pending = None;
        self.arguments.clear();
        self.held = 0;
    }

    /// The framing of the command in progress.
    pub fn framing(&self) -> FramingMode {
        match self.state {
            State::Unset => FramingMode::Unset,
            State::Inline => FramingMode::Inline,
            State::MultiBulkHeader | State::MultiBulkArgs => FramingMode::MultiBulk,
        }
    }

    /// Declared argument count of the multi-bulk command in progress.
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Arguments still missing from the multi-bulk command in progress.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Bytes received but not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes this decoder keeps alive: unconsumed input plus the payloads
    /// of arguments already decoded for the command in progress.
    pub fn held(&self) -> usize {
        self.buffer.len() + self.held
    }

    /// Total bytes consumed. Never decreases.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Total commands decoded.
    pub fn decoded(&self) -> u64 {
        self.decoded
    }

    /// Total malformed fragments discarded.
    pub fn malformed(&self) -> u64 {
        self.malformed
    }

    /// True when no partial command is buffered or in progress.
    pub fn is_idle(&self) -> bool {
        self.state == State::Unset && self.buffer.is_empty()
    }

    /// Runs the state machine until it completes a command, runs out of
    /// input, or hits malformed input.
    fn step(&mut self) -> Result<Option<Arguments>, DecodeError> {
        loop {
            match self.state {
                State::Unset => match self.buffer.first() {
                    None => return Ok(None),
                    Some(&prefix::MULTI_BULK) => self.state = State::MultiBulkHeader,
                    Some(_) => self.state = State::Inline,
                },
                State::Inline => return self.parse_inline(),
                State::MultiBulkHeader => {
                    if !self.parse_header()? {
                        return Ok(None);
                    }
                }
                State::MultiBulkArgs => return self.parse_arguments(),
            }
        }
    }

    /// Inline: `HSET key value\r\n`
    fn parse_inline(&mut self) -> Result<Option<Arguments>, DecodeError> {
        let Some(newline) = find_newline(&self.buffer) else {
            return Ok(None);
        };

        let line = self.consume(newline + 1);
        let arguments: Vec<Bytes> = line
            .split(|b| b.is_ascii_whitespace())
            .filter(|part| !part.is_empty())
            .map(|part| line.slice_ref(part))
            .collect();

        if arguments.is_empty() {
            return Err(DecodeError::EmptyInline);
        }

        Ok(Some(Arguments::new(arguments)))
    }

    /// Multi-bulk header: `*<argc>\r\n`
    ///
    /// Returns `false` when the header line has not fully arrived.
    fn parse_header(&mut self) -> Result<bool, DecodeError> {
        let Some(newline) = find_newline(&self.buffer) else {
            return Ok(false);
        };

        let line = self.consume(newline + 1);
        let count = match parse_length_line(&line, prefix::MULTI_BULK) {
            Some(n) if n >= 0 && n as u64 <= MAX_MULTI_BULK_ARGS as u64 => n as usize,
            _ => return Err(DecodeError::InvalidArgumentCount(lossy(&line))),
        };

        self.expected = count;
        self.remaining = count;
        self.arguments.reserve(count.min(MAX_PREALLOCATED_ARGS));
        self.state = State::MultiBulkArgs;

        trace!(arguments = count, "Multi-bulk header");
        Ok(true)
    }

    /// Multi-bulk arguments: `$<len>\r\n<bytes>\r\n`, `remaining` times.
    ///
    /// An argument is consumed only once its header, payload and terminator
    /// are all buffered.
    fn parse_arguments(&mut self) -> Result<Option<Arguments>, DecodeError> {
        while self.remaining > 0 {
            let pending = match self.pending {
                Some(pending) => pending,
                None => {
                    let pending = self.parse_argument_header()?;
                    match pending {
                        Some(pending) => {
                            self.pending = Some(pending);
                            pending
                        }
                        None => return Ok(None),
                    }
                }
            };

            let data_end = pending.header_len + pending.len;
            let total = data_end + CRLF.len();
            if self.buffer.len() < total {
                trace!(
                    needed = total,
                    buffered = self.buffer.len(),
                    "Incomplete argument"
                );
                return Ok(None);
            }

            let fragment = self.consume(total);
            self.pending = None;
            if &fragment[data_end..] != CRLF {
                return Err(DecodeError::MissingTerminator);
            }

            self.arguments
                .push(fragment.slice(pending.header_len..data_end));
            self.held += pending.len;
            self.remaining -= 1;
        }

        self.held = 0;
        Ok(Some(Arguments::new(std::mem::take(&mut self.arguments))))
    }

    /// Reads a `$<len>\r\n` header without consuming it.
    ///
    /// A bad header is consumed before the error is returned.
    fn parse_argument_header(&mut self) -> Result<Option<PendingArgument>, DecodeError> {
        let Some(newline) = find_newline(&self.buffer) else {
            return Ok(None);
        };
        let header_len = newline + 1;

        let len = match parse_length_line(&self.buffer[..header_len], prefix::BULK_STRING) {
            Some(n) if n >= 0 => n as usize,
            _ => {
                let line = self.consume(header_len);
                return Err(DecodeError::InvalidBulkLength(lossy(&line)));
            }
        };

        if len > MAX_BULK_SIZE {
            self.consume(header_len);
            return Err(DecodeError::BulkTooLarge {
                size: len,
                max: MAX_BULK_SIZE,
            });
        }

        Ok(Some(PendingArgument { header_len, len }))
    }

    /// Removes `n` bytes from the front of the buffer.
    fn consume(&mut self, n: usize) -> Bytes {
        self.consumed += n as u64;
        self.buffer.split_to(n).freeze()
    }
}

/// Position of the first `\n` in the buffer.
#[inline]
fn find_newline(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|&b| b == b'\n')
}

/// Parses `<prefix><integer>\r\n`. The integer is an optional `-` and
/// decimal digits; no `+` sign.
fn parse_length_line(line: &[u8], expected_prefix: u8) -> Option<i64> {
    let body = line.strip_prefix(&[expected_prefix])?.strip_suffix(CRLF)?;
    match body.first() {
        Some(b) if b.is_ascii_digit() || *b == b'-' => {}
        _ => return None,
    }
    std::str::from_utf8(body).ok()?.parse().ok()
}

fn lossy(line: &[u8]) -> String {
    String::from_utf8_lossy(line).trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(decoder: &mut Decoder, data: &[u8]) -> Vec<Arguments> {
        let mut commands = Vec::new();
        decoder.feed(data, |args| commands.push(args));
        commands
    }

    #[test]
    fn test_multi_bulk_command() {
        let mut decoder = Decoder::new();
        let commands = decode_all(&mut decoder, b"*3\r\n$4\r\nHSET\r\n$1\r\nk\r\n$1\r\nv\r\n");

        assert_eq!(commands, vec![Arguments::from_strs(&["HSET", "k", "v"])]);
        assert_eq!(decoder.buffered(), 0);
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_inline_command() {
        let mut decoder = Decoder::new();
        let commands = decode_all(&mut decoder, b"HSET key value\r\n");
        assert_eq!(commands, vec![Arguments::from_strs(&["HSET", "key", "value"])]);
    }

    #[test]
    fn test_inline_lf_only_and_extra_whitespace() {
        let mut decoder = Decoder::new();
        let commands = decode_all(&mut decoder, b"  HGET\t key   \n");
        assert_eq!(commands, vec![Arguments::from_strs(&["HGET", "key"])]);
    }

    #[test]
    fn test_inline_incomplete_consumes_nothing() {
        let mut decoder = Decoder::new();
        assert!(decode_all(&mut decoder, b"HGET ke").is_empty());
        assert_eq!(decoder.consumed(), 0);
        assert_eq!(decoder.framing(), FramingMode::Inline);

        let commands = decode_all(&mut decoder, b"y\r\n");
        assert_eq!(commands, vec![Arguments::from_strs(&["HGET", "key"])]);
    }

    #[test]
    fn test_empty_inline_is_discarded() {
        let mut decoder = Decoder::new();
        let commands = decode_all(&mut decoder, b"   \r\nHGET k\r\n");

        assert_eq!(commands, vec![Arguments::from_strs(&["HGET", "k"])]);
        assert_eq!(decoder.malformed(), 1);
    }

    #[test]
    fn test_fragmentation_at_every_offset() {
        let input: &[u8] = b"*3\r\n$4\r\nHSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n";
        let expected = vec![Arguments::from_strs(&["HSET", "key", "value"])];

        for split in 0..=input.len() {
            let mut decoder = Decoder::new();
            let mut commands = decode_all(&mut decoder, &input[..split]);
            commands.extend(decode_all(&mut decoder, &input[split..]));
            assert_eq!(commands, expected, "split at {}", split);
        }
    }

    #[test]
    fn test_byte_at_a_time() {
        let input: &[u8] = b"*2\r\n$4\r\nHGET\r\n$3\r\nkey\r\nHDEL key\r\n";
        let mut decoder = Decoder::new();
        let mut commands = Vec::new();

        for byte in input {
            decoder.feed(std::slice::from_ref(byte), |args| commands.push(args));
        }

        assert_eq!(
            commands,
            vec![
                Arguments::from_strs(&["HGET", "key"]),
                Arguments::from_strs(&["HDEL", "key"]),
            ]
        );
    }

    #[test]
    fn test_pipelined_commands_in_one_feed() {
        let mut decoder = Decoder::new();
        let mut commands = Vec::new();
        let dispatched = decoder.feed(
            b"*3\r\n$4\r\nHSET\r\n$1\r\na\r\n$1\r\n1\r\n*2\r\n$4\r\nHGET\r\n$1\r\na\r\n",
            |args| commands.push(args),
        );

        assert_eq!(dispatched, 2);
        assert_eq!(
            commands,
            vec![
                Arguments::from_strs(&["HSET", "a", "1"]),
                Arguments::from_strs(&["HGET", "a"]),
            ]
        );
    }

    #[test]
    fn test_malformed_length_recovers() {
        let mut decoder = Decoder::new();
        assert!(decode_all(&mut decoder, b"*2\r\n$3\r\nabc\r\n$BAD\r\n").is_empty());
        assert_eq!(decoder.malformed(), 1);
        assert_eq!(decoder.framing(), FramingMode::Unset);

        let commands = decode_all(&mut decoder, b"*2\r\n$4\r\nHGET\r\n$1\r\nk\r\n");
        assert_eq!(commands, vec![Arguments::from_strs(&["HGET", "k"])]);
    }

    #[test]
    fn test_negative_and_garbage_counts_are_malformed() {
        let mut decoder = Decoder::new();
        assert!(decode_all(&mut decoder, b"*-1\r\n*abc\r\n").is_empty());
        assert_eq!(decoder.malformed(), 2);
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_header_without_carriage_return_is_malformed() {
        let mut decoder = Decoder::new();
        let commands = decode_all(&mut decoder, b"*1\n*1\r\n$4\r\nHGET\r\n");
        assert_eq!(commands, vec![Arguments::from_strs(&["HGET"])]);
        assert_eq!(decoder.malformed(), 1);
    }

    #[test]
    fn test_zero_argument_multi_bulk_dispatches_empty() {
        let mut decoder = Decoder::new();
        let commands = decode_all(&mut decoder, b"*0\r\n");
        assert_eq!(commands, vec![Arguments::default()]);
        assert_eq!(decoder.malformed(), 0);
    }

    #[test]
    fn test_bad_terminator_discards_argument() {
        let mut decoder = Decoder::new();
        let commands = decode_all(&mut decoder, b"*1\r\n$3\r\nabcXY*1\r\n$4\r\nHGET\r\n");

        assert_eq!(commands, vec![Arguments::from_strs(&["HGET"])]);
        assert_eq!(decoder.malformed(), 1);
    }

    #[test]
    fn test_negative_bulk_length_is_malformed() {
        let mut decoder = Decoder::new();
        assert!(decode_all(&mut decoder, b"*1\r\n$-1\r\n").is_empty());
        assert_eq!(decoder.malformed(), 1);
    }

    #[test]
    fn test_oversized_bulk_length_is_malformed() {
        let mut decoder = Decoder::new();
        let header = format!("*1\r\n${}\r\n", MAX_BULK_SIZE + 1);
        assert!(decode_all(&mut decoder, header.as_bytes()).is_empty());
        assert_eq!(decoder.malformed(), 1);
        assert!(decoder.is_idle());
    }

    #[test]
    fn test_oversized_argument_count_is_malformed() {
        let mut decoder = Decoder::new();
        let header = format!("*{}\r\n", MAX_MULTI_BULK_ARGS + 1);
        assert!(decode_all(&mut decoder, header.as_bytes()).is_empty());
        assert_eq!(decoder.malformed(), 1);
        assert!(decoder.is_idle());

        let header = format!("*{}\r\n", MAX_MULTI_BULK_ARGS);
        decode_all(&mut decoder, header.as_bytes());
        assert_eq!(decoder.malformed(), 1);
        assert_eq!(decoder.remaining(), MAX_MULTI_BULK_ARGS);
    }

    #[test]
    fn test_held_counts_decoded_arguments() {
        let mut decoder = Decoder::new();
        decode_all(&mut decoder, b"*100000\r\n");

        let chunk = b"$10\r\naaaaaaaaaa\r\n".repeat(200);
        decode_all(&mut decoder, &chunk);

        assert_eq!(decoder.buffered(), 0);
        assert_eq!(decoder.remaining(), 100_000 - 200);
        assert_eq!(decoder.held(), 2000);

        decoder.reset();
        assert_eq!(decoder.held(), 0);
    }

    #[test]
    fn test_held_drops_after_dispatch() {
        let mut decoder = Decoder::new();
        decode_all(&mut decoder, b"*2\r\n$4\r\nHGET\r\n");
        assert_eq!(decoder.held(), 4);

        decode_all(&mut decoder, b"$1\r\nk\r\nHG");
        assert_eq!(decoder.held(), 2);
    }

    #[test]
    fn test_plus_signed_lengths_are_malformed() {
        let mut decoder = Decoder::new();
        assert!(decode_all(&mut decoder, b"*+1\r\n").is_empty());
        assert_eq!(decoder.malformed(), 1);

        assert!(decode_all(&mut decoder, b"*1\r\n$+4\r\n").is_empty());
        assert_eq!(decoder.malformed(), 2);

        let commands = decode_all(&mut decoder, b"*1\r\n$4\r\nHGET\r\n");
        assert_eq!(commands, vec![Arguments::from_strs(&["HGET"])]);
    }

    #[test]
    fn test_partial_argument_does_not_advance_cursor() {
        let mut decoder = Decoder::new();
        assert!(decode_all(&mut decoder, b"*1\r\n$5\r\nhel").is_empty());

        // Only the `*1\r\n` header is consumed
        assert_eq!(decoder.consumed(), 4);
        assert_eq!(decoder.buffered(), 7);
        assert_eq!(decoder.framing(), FramingMode::MultiBulk);
        assert_eq!(decoder.expected(), 1);
        assert_eq!(decoder.remaining(), 1);

        let commands = decode_all(&mut decoder, b"lo\r\n");
        assert_eq!(commands, vec![Arguments::from_strs(&["hello"])]);
        assert_eq!(decoder.consumed(), 15);
    }

    #[test]
    fn test_remaining_counts_down() {
        let mut decoder = Decoder::new();
        decode_all(&mut decoder, b"*3\r\n$4\r\nHSET\r\n");
        assert_eq!(decoder.expected(), 3);
        assert_eq!(decoder.remaining(), 2);

        decode_all(&mut decoder, b"$1\r\nk\r\n");
        assert_eq!(decoder.remaining(), 1);

        decode_all(&mut decoder, b"$1\r\nv\r\n");
        assert_eq!(decoder.remaining(), 0);
        assert_eq!(decoder.decoded(), 1);
    }

    #[test]
    fn test_consumed_is_monotonic() {
        let input: &[u8] = b"*2\r\n$4\r\nHGET\r\n$1\r\nk\r\n   \r\n*x\r\nHDEL k\r\n";
        let mut decoder = Decoder::new();
        let mut last = 0;

        for chunk in input.chunks(3) {
            decoder.feed(chunk, |_| {});
            assert!(decoder.consumed() >= last);
            last = decoder.consumed();
        }

        assert_eq!(last, input.len() as u64);
        assert_eq!(decoder.decoded(), 2);
        assert_eq!(decoder.malformed(), 2);
    }

    #[test]
    fn test_binary_safe_arguments() {
        let mut decoder = Decoder::new();
        let commands = decode_all(&mut decoder, b"*3\r\n$4\r\nHSET\r\n$1\r\nk\r\n$5\r\na\r\n\0b\r\n");

        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].get(2), Some(&Bytes::from_static(b"a\r\n\0b")));
    }

    #[test]
    fn test_pull_api() {
        let mut decoder = Decoder::new();
        decoder.extend(b"HGET a\r\nHGET b\r\nHGE");

        assert_eq!(decoder.decode_next(), Some(Arguments::from_strs(&["HGET", "a"])));
        assert_eq!(decoder.decode_next(), Some(Arguments::from_strs(&["HGET", "b"])));
        assert_eq!(decoder.decode_next(), None);
        assert_eq!(decoder.buffered(), 3);
    }

    #[test]
    fn test_reset_keeps_buffered_input() {
        let mut decoder = Decoder::new();
        decoder.extend(b"*2\r\n$4\r\nHGET\r\n");
        assert!(decoder.decode_next().is_none());

        decoder.reset();
        assert_eq!(decoder.framing(), FramingMode::Unset);
        assert_eq!(decoder.remaining(), 0);

        decoder.extend(b"HGET k\r\n");
        assert_eq!(decoder.decode_next(), Some(Arguments::from_strs(&["HGET", "k"])));
    }
}
