//! Connection Handler Module
//!
//! This module handles individual client connections.
//! Each client gets its own handler task that runs in a loop,
//! feeding bytes to its decoder and sending back replies.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects (TCP handshake)
//!        │
//!        ▼
//! 2. ConnectionHandler spawned
//!        │
//!        ▼
//! 3. ┌──────────────────────────────┐
//!    │      Main Loop               │
//!    │                              │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Read bytes from socket  │ │
//!    │  └───────────┬─────────────┘ │
//!    │              │               │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Decoder.feed            │ │
//!    │  │  └─ execute each cmd    │ │
//!    │  └───────────┬─────────────┘ │
//!    │              │               │
//!    │              ▼               │
//!    │  ┌─────────────────────────┐ │
//!    │  │ Send batched replies    │ │
//!    │  └───────────┬─────────────┘ │
//!    │              │               │
//!    │              ▼               │
//!    │         [Loop back]          │
//!    └──────────────────────────────┘
//!        │
//!        ▼
//! 4. Client disconnects / error
//!        │
//!        ▼
//! 5. Handler task ends
//! ```
//!
//! ## Buffer Management
//!
//! TCP is a stream protocol: a read may hold half a command or several.
//! Partial commands wait inside the [`Decoder`]; every reply produced by
//! one read is serialized into a single buffer and written with one flush.
//! A client that keeps sending without ever completing a command is cut off
//! once its decoder holds `max_buffer_size` bytes, counting both unconsumed
//! input and the arguments already decoded for the command in progress.

use crate::commands::CommandRegistry;
use crate::protocol::Decoder;
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, error, info, trace, warn};

/// Bytes requested from the socket per read
const READ_CHUNK_SIZE: usize = 4096;

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total commands processed
    pub commands_processed: AtomicU64,
    /// Total malformed fragments discarded
    pub malformed_commands: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn commands_processed(&self, count: usize) {
        self.commands_processed
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn malformed(&self, count: u64) {
        self.malformed_commands.fetch_add(count, Ordering::Relaxed);
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
///
/// Generic over the stream so anything that reads and writes bytes
/// asynchronously can be served, not just a `TcpStream`.
pub struct ConnectionHandler<S> {
    /// The client stream
    stream: BufWriter<S>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Bytes from the latest read, handed to the decoder
    read_buffer: BytesMut,

    /// Serialized replies waiting to be flushed
    replies: Vec<u8>,

    /// Per-connection protocol state
    decoder: Decoder,

    /// The command registry (shared across connections)
    registry: Arc<CommandRegistry>,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,

    /// Cap on bytes the decoder may hold
    max_buffer_size: usize,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The client stream
    /// * `addr` - The client's socket address
    /// * `registry` - The shared command registry
    /// * `stats` - Shared connection statistics
    /// * `max_buffer_size` - Bytes the decoder may hold before the client is dropped
    pub fn new(
        stream: S,
        addr: SocketAddr,
        registry: Arc<CommandRegistry>,
        stats: Arc<ConnectionStats>,
        max_buffer_size: usize,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            read_buffer: BytesMut::with_capacity(READ_CHUNK_SIZE),
            replies: Vec::new(),
            decoder: Decoder::new(),
            registry,
            stats,
            max_buffer_size,
        }
    }

    /// Runs the main connection loop.
    ///
    /// Reads, decodes, executes and replies until the client disconnects
    /// or the stream fails.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = self.main_loop().await;

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected gracefully"),
            Err(e) => match e {
                ConnectionError::ClientDisconnected => {
                    debug!(client = %self.addr, "Client disconnected")
                }
                ConnectionError::IoError(io_err)
                    if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
                {
                    debug!(client = %self.addr, "Connection reset by client")
                }
                _ => warn!(client = %self.addr, error = %e, "Connection error"),
            },
        }

        debug!(
            client = %self.addr,
            decoded = self.decoder.decoded(),
            malformed = self.decoder.malformed(),
            "Connection closed"
        );
        self.stats.malformed(self.decoder.malformed());
        self.stats.connection_closed();
        result
    }

    /// The main read-decode-respond loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            self.read_more_data().await?;
            self.process_commands();

            if !self.replies.is_empty() {
                self.send_replies().await?;
            }
        }
    }

    /// Feeds the latest read to the decoder, executing every complete
    /// command in wire order.
    fn process_commands(&mut self) {
        let registry = &self.registry;
        let replies = &mut self.replies;
        let addr = self.addr;

        let dispatched = self.decoder.feed(&self.read_buffer, |args| {
            trace!(client = %addr, arguments = args.len(), "Executing command");
            registry.execute(&args).serialize_into(replies);
        });
        self.read_buffer.clear();

        if dispatched > 0 {
            self.stats.commands_processed(dispatched);
        } else {
            trace!(
                client = %self.addr,
                buffered = self.decoder.buffered(),
                "Incomplete command, need more data"
            );
        }
    }

    /// Reads more data from the stream.
    async fn read_more_data(&mut self) -> Result<(), ConnectionError> {
        // Unconsumed input and decoded-but-undispatched arguments both count
        let held = self.decoder.held();
        if held >= self.max_buffer_size {
            error!(
                client = %self.addr,
                size = held,
                "Buffer size limit exceeded"
            );
            self.decoder.reset();
            return Err(ConnectionError::BufferFull {
                size: held,
                max: self.max_buffer_size,
            });
        }

        self.read_buffer.reserve(READ_CHUNK_SIZE);

        let n = match self.stream.get_mut().read_buf(&mut self.read_buffer).await {
            Ok(n) => n,
            Err(e) => {
                // Stream fault: the parse state is meaningless now
                self.decoder.reset();
                return Err(ConnectionError::IoError(e));
            }
        };

        if n == 0 {
            // Connection closed by client
            if self.decoder.is_idle() {
                return Err(ConnectionError::ClientDisconnected);
            } else {
                // Partial command in buffer
                return Err(ConnectionError::UnexpectedEof);
            }
        }

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");

        Ok(())
    }

    /// Writes and flushes every pending reply.
    async fn send_replies(&mut self) -> Result<(), ConnectionError> {
        self.stream.write_all(&self.replies).await?;
        self.stream.flush().await?;
        self.stats.bytes_written(self.replies.len());
        trace!(
            client = %self.addr,
            bytes = self.replies.len(),
            "Sent replies"
        );
        self.replies.clear();
        Ok(())
    }
}

/// Errors that end a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Client disconnected normally
    #[error("Client disconnected")]
    ClientDisconnected,

    /// Unexpected end of stream (partial command)
    #[error("Unexpected end of stream")]
    UnexpectedEof,

    /// Buffer size limit exceeded
    #[error("Buffer size limit exceeded: {size} bytes (max: {max})")]
    BufferFull { size: usize, max: usize },
}

/// Handles a client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    registry: Arc<CommandRegistry>,
    stats: Arc<ConnectionStats>,
    max_buffer_size: usize,
) {
    let handler = ConnectionHandler::new(stream, addr, registry, stats, max_buffer_size);
    if let Err(e) = handler.run().await {
        match e {
            ConnectionError::ClientDisconnected => {}
            ConnectionError::IoError(ref io_err)
                if io_err.kind() == std::io::ErrorKind::ConnectionReset => {}
            _ => {
                debug!(client = %addr, error = %e, "Connection ended with error");
            }
        }
    }
}
