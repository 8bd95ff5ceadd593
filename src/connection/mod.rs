//! Connection Module
//!
//! One async task per client. Each task owns its [`Decoder`](crate::protocol::Decoder)
//! and shares the [`CommandRegistry`](crate::commands::CommandRegistry) with
//! every other connection.
//!
//! ```text
//!   TcpListener (main.rs)
//!          │ accept()
//!          ▼
//!   spawn ConnectionHandler
//!          │
//!          ▼
//!   read ──> Decoder.feed ──> registry.execute ──> batched write
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use tidekv::commands::CommandRegistry;
//! use tidekv::connection::{handle_connection, ConnectionStats};
//! use tidekv::storage::StorageEngine;
//! use std::sync::Arc;
//!
//! let storage = Arc::new(StorageEngine::new());
//! let registry = Arc::new(CommandRegistry::new(storage));
//! let stats = Arc::new(ConnectionStats::new());
//!
//! let (stream, addr) = listener.accept().await?;
//! tokio::spawn(handle_connection(stream, addr, registry, stats, 64 * 1024 * 1024));
//! ```

pub mod handler;

pub use handler::{handle_connection, ConnectionError, ConnectionHandler, ConnectionStats};
