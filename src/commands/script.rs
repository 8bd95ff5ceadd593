//! Scripting Boundary
//!
//! `HMAP <source>` rewrites every stored value through a user script. The
//! script runtime itself lives outside this crate; it plugs in through two
//! traits:
//!
//! - [`ScriptEngine`] compiles source text into a [`Script`]
//! - [`Script`] maps one `(key, value)` pair to a new value
//!
//! The command runs over a point-in-time snapshot of the store, so scripts
//! never execute under the store lock. New values are written back in one
//! exclusive hold, and only if every call succeeded: a failing script
//! leaves the store exactly as it was. A key that another client deleted
//! or rewrote while the script ran keeps that newer state.

use crate::protocol::Reply;
use crate::storage::{StorageEngine, ValueUpdate};
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, error};

/// Failures reported by the scripting collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScriptError {
    /// The source did not compile or did not evaluate to a callable
    #[error("compile error: {0}")]
    Compile(String),

    /// A call raised or returned something unusable
    #[error("runtime error: {0}")]
    Runtime(String),
}

/// A compiled per-entry transformation.
pub trait Script: Send {
    /// Returns the new value for `key`.
    fn call(&self, key: &[u8], value: &[u8]) -> Result<Bytes, ScriptError>;
}

impl<F> Script for F
where
    F: Fn(&[u8], &[u8]) -> Result<Bytes, ScriptError> + Send,
{
    fn call(&self, key: &[u8], value: &[u8]) -> Result<Bytes, ScriptError> {
        self(key, value)
    }
}

/// Compiles scripts for `HMAP`.
pub trait ScriptEngine: Send + Sync {
    fn compile(&self, source: &[u8]) -> Result<Box<dyn Script>, ScriptError>;
}

/// Runs `source` over every entry and stores the results.
///
/// # Returns
///
/// OK on success, or an error reply naming the script failure.
pub fn map_values(storage: &StorageEngine, engine: &dyn ScriptEngine, source: &[u8]) -> Reply {
    let script = match engine.compile(source) {
        Ok(script) => script,
        Err(e) => return script_failure(e),
    };

    let snapshot = storage.snapshot();
    let mut updates = Vec::with_capacity(snapshot.len());
    for (key, value) in snapshot {
        match script.call(&key, &value) {
            Ok(new_value) => updates.push(ValueUpdate::new(key, value, new_value)),
            Err(e) => return script_failure(e),
        }
    }

    let computed = updates.len();
    let updated = storage.update_many(updates);
    debug!(updated = updated, skipped = computed - updated, "Script applied");
    Reply::Ok
}

fn script_failure(e: ScriptError) -> Reply {
    error!(error = %e, "Script failed");
    Reply::error(format!("ERR script error: {}", e))
}
