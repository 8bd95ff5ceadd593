//! Storage Module
//!
//! This module provides the process-wide key-value store shared by every
//! connection.
//!
//! ## Features
//!
//! - **RwLock**: Multiple concurrent readers, exclusive writers
//! - **Upgradable writes**: `set`/`delete` wait alongside readers and hold the
//!   exclusive lock only for the mutation
//! - **Consistent iteration**: `for_each` under the read lock, or a
//!   point-in-time `snapshot`
//!
//! ## Example
//!
//! ```
//! use tidekv::storage::StorageEngine;
//! use bytes::Bytes;
//! use std::sync::Arc;
//!
//! let engine = Arc::new(StorageEngine::new());
//!
//! engine.set(Bytes::from("name"), Bytes::from("tide"));
//! assert_eq!(engine.get(b"name"), Some(Bytes::from("tide")));
//! ```

pub mod engine;

pub use engine::{StorageEngine, StorageStats, ValueUpdate};
