//! TCP Server
//!
//! Accepts connections and dispatches them to the worker pool.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};

use crate::config::Config;
use crate::error::Result;
use crate::router::CommandRouter;
use crate::store::Store;

use super::pool::{ShutdownOutcome, WorkerPool};
use super::registry::ConnectionRegistry;
use super::Connection;

const WAKE_TIMEOUT: Duration = Duration::from_secs(1);

/// Asks a running server to stop.
///
/// Sets the shutdown flag, then connects to the listener once so the
/// blocking `accept` returns and notices the flag.
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    wake_addr: SocketAddr,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        if self.flag.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = TcpStream::connect_timeout(&self.wake_addr, WAKE_TIMEOUT) {
            tracing::debug!("Wake-up connect to {} failed: {}", self.wake_addr, e);
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// TCP server for jsondb
pub struct Server {
    config: Config,
    listener: TcpListener,
    local_addr: SocketAddr,
    router: CommandRouter,
    pool: WorkerPool,
    registry: Arc<ConnectionRegistry>,
    shutdown: ShutdownHandle,
}

impl Server {
    /// Bind the listening socket and start the worker threads
    pub fn bind(config: Config, store: Arc<Store>) -> Result<Self> {
        config.validate()?;

        let addr = config.socket_addr()?;
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        socket.listen(config.backlog)?;
        let listener: TcpListener = socket.into();
        let local_addr = listener.local_addr()?;

        let registry = Arc::new(ConnectionRegistry::new());
        let mut pool = WorkerPool::new(config.worker_threads)?;
        {
            let registry = Arc::clone(&registry);
            pool.on_cancel(move || {
                let n = registry.shutdown_all();
                tracing::warn!("Force-closed {} in-flight connection(s)", n);
            });
        }

        let shutdown = ShutdownHandle {
            flag: Arc::new(AtomicBool::new(false)),
            wake_addr: wake_addr(local_addr),
        };

        Ok(Self {
            config,
            listener,
            local_addr,
            router: CommandRouter::new(store),
            pool,
            registry,
            shutdown,
        })
    }

    /// Address actually bound (useful when listening on port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle for stopping the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the accept loop until shutdown is requested or accept fails.
    ///
    /// Either way the same sequence follows: stop accepting, drain the
    /// pool (bounded wait, then force), close the listener. An accept
    /// error that was not caused by shutdown is returned afterwards.
    pub fn run(self) -> Result<()> {
        tracing::info!(
            "Listening on {} with {} workers",
            self.local_addr,
            self.pool.size()
        );

        let result = self.accept_loop();

        let Server {
            config,
            listener,
            local_addr,
            mut pool,
            registry,
            shutdown,
            ..
        } = self;

        shutdown.flag.store(true, Ordering::SeqCst);
        let timeout = config.shutdown_timeout();
        tracing::info!(
            "Shutting down: {} connection(s) in flight, {} queued, waiting up to {:?}",
            registry.len(),
            pool.queued(),
            timeout
        );
        match pool.shutdown(timeout) {
            ShutdownOutcome::Graceful => tracing::info!("All connections finished"),
            ShutdownOutcome::Forced => tracing::warn!("Shutdown was forced"),
        }

        drop(listener);
        tracing::info!("Listener on {} closed", local_addr);

        result
    }

    fn accept_loop(&self) -> Result<()> {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    if self.shutdown.is_shutdown() {
                        return Ok(());
                    }
                    self.dispatch(stream, peer);
                }
                Err(e) if self.shutdown.is_shutdown() => {
                    tracing::debug!("Accept error during shutdown ignored: {}", e);
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::error!("Accept failed, stopping server: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    /// Queue one connection on the pool
    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        let router = self.router.clone();
        let registry = Arc::clone(&self.registry);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        let job = move || {
            let _registration = match registry.register(&stream) {
                Ok(registration) => registration,
                Err(e) => {
                    tracing::debug!("Not serving {}: {}", peer, e);
                    return;
                }
            };

            let mut connection = match Connection::new(stream, router) {
                Ok(connection) => connection,
                Err(e) => {
                    tracing::warn!("Failed to set up connection from {}: {}", peer, e);
                    return;
                }
            };
            if let Err(e) = connection.set_timeouts(read_ms, write_ms) {
                tracing::warn!("Failed to set timeouts for {}: {}", peer, e);
            }
            if let Err(e) = connection.handle() {
                tracing::debug!("Connection from {} aborted: {}", peer, e);
            }
        };

        if let Err(e) = self.pool.execute(job) {
            tracing::warn!("Dropping connection from {}: {}", peer, e);
        }
    }
}

/// Where to connect to reach our own listener
fn wake_addr(local: SocketAddr) -> SocketAddr {
    match local.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), local.port())
        }
        IpAddr::V6(ip) if ip.is_unspecified() => {
            SocketAddr::new(IpAddr::V6(Ipv6Addr::LOCALHOST), local.port())
        }
        _ => local,
    }
}
