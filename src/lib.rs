//! # TideKV - An In-Memory Key-Value Cache Server
//!
//! TideKV keeps a single binary-safe key/value map in memory and serves it
//! over TCP with a Redis-style request protocol. Clients may send inline
//! commands (`HGET key\r\n`) or multi-bulk frames
//! (`*2\r\n$4\r\nHGET\r\n$3\r\nkey\r\n`), fragmented or pipelined.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                              TideKV                              │
//! │                                                                  │
//! │  ┌─────────────┐    ┌─────────────┐    ┌─────────────────┐       │
//! │  │ TCP Server  │───>│ Connection  │───>│ CommandRegistry │       │
//! │  │ (Listener)  │    │  Handler    │    │                 │       │
//! │  └─────────────┘    └──────┬──────┘    └────────┬────────┘       │
//! │                            │                    │                │
//! │                            ▼                    ▼                │
//! │                     ┌─────────────┐    ┌─────────────────┐       │
//! │                     │   Decoder   │    │  StorageEngine  │       │
//! │                     │ (per conn)  │    │ RwLock<HashMap> │       │
//! │                     └─────────────┘    └─────────────────┘       │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Supported Commands
//!
//! - `HGET key` returns the value or nil
//! - `HSET key value` stores the value and replies OK
//! - `HDEL key` replies true if something was removed
//! - `HMAP source` rewrites every value through a script, when the
//!   registry was built with a [`ScriptEngine`](commands::ScriptEngine)
//!
//! Anything else answers `-ERR <name> is not implemented`.
//!
//! ## Module Overview
//!
//! - [`protocol`]: request decoder and reply encoding
//! - [`storage`]: the shared store
//! - [`commands`]: command lookup, arity checks and handlers
//! - [`connection`]: per-client session loop
//! - [`config`]: server settings

pub mod commands;
pub mod config;
pub mod connection;
pub mod protocol;
pub mod storage;

// Re-export commonly used types for convenience
pub use commands::{CommandRegistry, ScriptEngine};
pub use config::{ConfigError, ServerConfig};
pub use connection::{handle_connection, ConnectionStats};
pub use protocol::{Arguments, Decoder, Reply};
pub use storage::{StorageEngine, StorageStats};

/// The default port TideKV listens on
pub const DEFAULT_PORT: u16 = 6379;

/// The default host TideKV binds to
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Version of TideKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
