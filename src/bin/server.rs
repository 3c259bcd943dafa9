//! jsondb Server Binary
//!
//! Starts the TCP server for jsondb.

use std::sync::Arc;

use clap::Parser;
use jsondb::network::{Server, ShutdownHandle};
use jsondb::{Config, Store};
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tracing_subscriber::{fmt, EnvFilter};

/// jsondb Server
#[derive(Parser, Debug)]
#[command(name = "jsondb-server")]
#[command(about = "Networked JSON document store")]
#[command(version)]
struct Args {
    /// Database file
    #[arg(short, long, default_value = "./data/db.json")]
    db: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:34567")]
    listen: String,

    /// Worker threads serving connections
    #[arg(short, long, default_value = "10")]
    workers: usize,

    /// Listen backlog
    #[arg(short, long, default_value = "50")]
    backlog: i32,

    /// How long shutdown waits for in-flight connections (ms)
    #[arg(long, default_value = "60000")]
    shutdown_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,jsondb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("jsondb Server v{}", jsondb::VERSION);
    tracing::info!("Database file: {}", args.db);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .db_path(&args.db)
        .listen_addr(&args.listen)
        .worker_threads(args.workers)
        .backlog(args.backlog)
        .shutdown_timeout_ms(args.shutdown_timeout_ms)
        .build();

    let store = Arc::new(Store::new(&config.db_path));

    let server = match Server::bind(config, store) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Server started!");

    if let Err(e) = install_signal_handler(server.shutdown_handle()) {
        tracing::warn!("Signal handlers not installed, Ctrl+C will not shut down cleanly: {}", e);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

/// Trigger a graceful shutdown on SIGINT/SIGTERM
fn install_signal_handler(handle: ShutdownHandle) -> std::io::Result<()> {
    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    std::thread::Builder::new()
        .name("jsondb-signals".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                tracing::info!("Received signal {}, initiating shutdown...", signal);
                handle.shutdown();
            }
        })?;
    Ok(())
}
