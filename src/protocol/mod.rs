//! Wire Protocol
//!
//! Commands arrive in one of two framings:
//!
//! - Inline: `HGET key\r\n`
//! - Multi-bulk: `*2\r\n$4\r\nHGET\r\n$3\r\nkey\r\n`
//!
//! ## Modules
//!
//! - `decoder`: resumable state machine turning byte chunks into [`Arguments`]
//! - `types`: [`Arguments`], [`Reply`] and reply serialization
//!
//! ## Example
//!
//! ```
//! use tidekv::protocol::{Decoder, Reply};
//!
//! let mut decoder = Decoder::new();
//! let mut replies = Vec::new();
//!
//! decoder.feed(b"HGET missing\r\n", |_args| {
//!     Reply::Nil.serialize_into(&mut replies);
//! });
//!
//! assert_eq!(replies, b"$-1\r\n");
//! ```

pub mod decoder;
pub mod types;

pub use decoder::{DecodeError, Decoder, FramingMode, MAX_BULK_SIZE, MAX_MULTI_BULK_ARGS};
pub use types::{Arguments, Reply};
