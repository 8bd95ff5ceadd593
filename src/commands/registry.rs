//! Command Registry
//!
//! Maps command names to handler closures bound to the shared store. The
//! table is filled once at construction and only read afterwards, so one
//! registry can be shared by every connection through an `Arc`.
//!
//! ## Commands
//!
//! ### Store Commands
//! - `HGET key` - value as a bulk string, or nil
//! - `HSET key value` - insert or overwrite, replies OK
//! - `HDEL key` - true if the key was removed, false if it was absent
//!
//! ### Scripting
//! - `HMAP source` - rewrite every value through a script (only when a
//!   [`ScriptEngine`] is configured)
//!
//! ### Reserved
//! `GET`, `SET`, `DEL`, `INC`, `DEC`, `CAS`, `STATUS` and `SHUTDOWN` are
//! registered with the default handler, which replies
//! `-ERR <name> is not implemented`.

use crate::commands::script::{map_values, ScriptEngine};
use crate::protocol::{Arguments, Reply};
use crate::storage::StorageEngine;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Handler signature shared by every registry entry.
pub type Handler = Arc<dyn Fn(&Arguments) -> Reply + Send + Sync>;

/// Commands that are recognized but answered by the default handler.
pub const RESERVED_COMMANDS: &[&str] = &[
    "GET", "SET", "DEL", "INC", "DEC", "CAS", "STATUS", "SHUTDOWN",
];

/// Arity constraint, counted without the command name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Command must have exactly this many arguments.
    Exact(usize),
    /// Command must have at least this many arguments.
    AtLeast(usize),
}

impl Arity {
    fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exact(expected) => count == expected,
            Arity::AtLeast(minimum) => count >= minimum,
        }
    }
}

/// Static command table.
pub struct CommandRegistry {
    commands: HashMap<&'static str, Handler>,
    default: Handler,
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.commands.keys().collect();
        names.sort();
        f.debug_struct("CommandRegistry")
            .field("commands", &names)
            .finish()
    }
}

impl CommandRegistry {
    /// Builds the registry with store commands bound to `storage`.
    ///
    /// `HMAP` is registered with the default handler because there is no
    /// script engine to run it.
    pub fn new(storage: Arc<StorageEngine>) -> Self {
        Self::build(storage, None)
    }

    /// Builds the registry with `HMAP` backed by `engine`.
    pub fn with_script_engine(storage: Arc<StorageEngine>, engine: Arc<dyn ScriptEngine>) -> Self {
        Self::build(storage, Some(engine))
    }

    fn build(storage: Arc<StorageEngine>, engine: Option<Arc<dyn ScriptEngine>>) -> Self {
        let default: Handler = Arc::new(|args: &Arguments| {
            Reply::not_implemented(args.name().unwrap_or_default())
        });

        let mut registry = Self {
            commands: HashMap::new(),
            default,
        };

        let store = Arc::clone(&storage);
        registry.register("HGET", Arity::Exact(1), move |args| {
            match store.get(&args[1]) {
                Some(value) => Reply::bulk_string(value),
                None => Reply::Nil,
            }
        });

        let store = Arc::clone(&storage);
        registry.register("HSET", Arity::Exact(2), move |args| {
            store.set(args[1].clone(), args[2].clone());
            Reply::Ok
        });

        let store = Arc::clone(&storage);
        registry.register("HDEL", Arity::Exact(1), move |args| {
            Reply::from_bool(store.delete(&args[1]))
        });

        match engine {
            Some(engine) => {
                let store = Arc::clone(&storage);
                registry.register("HMAP", Arity::Exact(1), move |args| {
                    map_values(&store, &*engine, &args[1])
                });
            }
            None => registry.register_default("HMAP"),
        }

        for &name in RESERVED_COMMANDS {
            registry.register_default(name);
        }

        debug!(commands = registry.commands.len(), "Command registry built");
        registry
    }

    /// Binds `name` to `handler`, checking arity before the handler runs.
    ///
    /// The handler receives the full argument slice, name at index 0, and
    /// may index up to the arity it declared.
    fn register<F>(&mut self, name: &'static str, arity: Arity, handler: F)
    where
        F: Fn(&[Bytes]) -> Reply + Send + Sync + 'static,
    {
        let checked: Handler = Arc::new(move |args: &Arguments| {
            let parts = args.as_slice();
            if !arity.accepts(parts.len().saturating_sub(1)) {
                return Reply::error(format!(
                    "ERR wrong number of arguments for '{}' command",
                    name
                ));
            }
            handler(parts)
        });
        self.commands.insert(name, checked);
    }

    /// Binds `name` to the default handler.
    fn register_default(&mut self, name: &'static str) {
        self.commands.insert(name, Arc::clone(&self.default));
    }

    /// Returns the handler registered for `name`, or the default handler.
    ///
    /// Names are matched exactly; the protocol convention is upper case.
    pub fn find(&self, name: &[u8]) -> &Handler {
        std::str::from_utf8(name)
            .ok()
            .and_then(|name| self.commands.get(name))
            .unwrap_or(&self.default)
    }

    /// Returns true if `name` has a registry entry (default or not).
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Looks up the command named by `args[0]` and runs it.
    pub fn execute(&self, args: &Arguments) -> Reply {
        match args.name() {
            Some(name) => (self.find(name))(args),
            None => Reply::error("ERR empty command"),
        }
    }

    /// Number of registered names.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
