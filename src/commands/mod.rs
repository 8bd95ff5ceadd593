//! Command Module
//!
//! This module turns decoded [`Arguments`](crate::protocol::Arguments) into
//! [`Reply`](crate::protocol::Reply) values by running them against the
//! storage engine.
//!
//! ## Architecture
//!
//! ```text
//! Client Request
//!       │
//!       ▼
//! ┌─────────────────┐
//! │    Decoder      │  (protocol module)
//! └────────┬────────┘
//!          │ Arguments
//!          ▼
//! ┌─────────────────┐
//! │ CommandRegistry │  (this module)
//! │                 │
//! │  - find         │
//! │  - arity check  │
//! │  - execute      │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ StorageEngine   │  (storage module)
//! └─────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `HGET`, `HSET`, `HDEL`
//! - `HMAP` when a script engine is configured
//! - `GET`, `SET`, `DEL`, `INC`, `DEC`, `CAS`, `STATUS`, `SHUTDOWN` are
//!   reserved and answer "not implemented"

pub mod registry;
pub mod script;

pub use registry::{Arity, CommandRegistry, Handler, RESERVED_COMMANDS};
pub use script::{Script, ScriptEngine, ScriptError};
