//! TideKV - An In-Memory Key-Value Cache Server
//!
//! This is the main entry point for the TideKV server.
//! It sets up the TCP listener, storage engine, and handles incoming connections.

use clap::Parser;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tidekv::commands::CommandRegistry;
use tidekv::config::{ServerConfig, DEFAULT_MAX_BUFFER_SIZE};
use tidekv::connection::{handle_connection, ConnectionStats};
use tidekv::storage::StorageEngine;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// TideKV Server
#[derive(Parser, Debug)]
#[command(name = "tidekv")]
#[command(about = "In-memory key-value cache server")]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = tidekv::DEFAULT_HOST)]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = tidekv::DEFAULT_PORT)]
    port: u16,

    /// Runtime worker threads (defaults to the number of CPUs)
    #[arg(short, long)]
    workers: Option<usize>,

    /// Bytes a single connection may buffer before it is dropped
    #[arg(long, default_value_t = DEFAULT_MAX_BUFFER_SIZE)]
    max_buffer_size: usize,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> anyhow::Result<ServerConfig> {
        let mut builder = ServerConfig::builder()
            .host(self.host)
            .port(self.port)
            .max_buffer_size(self.max_buffer_size)
            .log_level(self.log_level);
        if let Some(workers) = self.workers {
            builder = builder.workers(workers);
        }
        Ok(builder.build()?)
    }
}

fn print_banner(config: &ServerConfig) {
    println!(
        r#"
TideKV v{} - In-Memory Key-Value Cache
──────────────────────────────────────────────
Server started on {}
Worker threads: {}
Ready to accept connections.

Use Ctrl+C to shutdown gracefully.
"#,
        tidekv::VERSION,
        config.bind_address(),
        config.workers
    );
}

fn main() -> anyhow::Result<()> {
    let config = Args::parse().into_config()?;

    // Set up logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(config.workers)
        .enable_all()
        .build()?;

    runtime.block_on(serve(config))
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    // Create the storage engine (shared across all connections)
    let storage = Arc::new(StorageEngine::new());
    let registry = Arc::new(CommandRegistry::new(Arc::clone(&storage)));
    info!(commands = registry.len(), "Command registry initialized");

    // Create connection statistics
    let stats = Arc::new(ConnectionStats::new());

    // Bind the TCP listener
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("Listening on {}", config.bind_address());

    print_banner(&config);

    // Main accept loop
    tokio::select! {
        _ = accept_loop(listener, registry, Arc::clone(&stats), config.max_buffer_size) => {}
        result = signal::ctrl_c() => {
            match result {
                Ok(()) => info!("Shutdown signal received, stopping server..."),
                Err(e) => error!(error = %e, "Failed to listen for shutdown signal"),
            }
        }
    }

    let store = storage.stats();
    info!(
        keys = store.keys,
        get_ops = store.get_ops,
        set_ops = store.set_ops,
        del_ops = store.del_ops,
        connections = stats.connections_accepted.load(Ordering::Relaxed),
        commands = stats.commands_processed.load(Ordering::Relaxed),
        malformed = stats.malformed_commands.load(Ordering::Relaxed),
        "Server shutdown complete"
    );
    Ok(())
}

/// Main loop that accepts incoming connections
async fn accept_loop(
    listener: TcpListener,
    registry: Arc<CommandRegistry>,
    stats: Arc<ConnectionStats>,
    max_buffer_size: usize,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let registry = Arc::clone(&registry);
                let stats = Arc::clone(&stats);

                // Spawn a task to handle this connection
                tokio::spawn(async move {
                    handle_connection(stream, addr, registry, stats, max_buffer_size).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
