//! Live connection registry
//!
//! Keeps a handle to every socket a worker is serving so a forced shutdown
//! can unblock reads stuck on slow or silent clients.

use std::collections::HashMap;
use std::io;
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

#[derive(Default)]
struct Inner {
    streams: HashMap<u64, TcpStream>,
    closed: bool,
}

/// Sockets currently owned by connection handlers
#[derive(Default)]
pub struct ConnectionRegistry {
    next_id: AtomicU64,
    inner: Mutex<Inner>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `stream` until the returned registration is dropped.
    ///
    /// After `shutdown_all` the stream is shut down at once and an error
    /// returned instead.
    pub fn register(self: &Arc<Self>, stream: &TcpStream) -> io::Result<Registration> {
        let handle = stream.try_clone()?;
        let mut inner = self.inner.lock();
        if inner.closed {
            let _ = handle.shutdown(Shutdown::Both);
            return Err(io::Error::new(
                io::ErrorKind::ConnectionAborted,
                "server is shutting down",
            ));
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        inner.streams.insert(id, handle);
        Ok(Registration {
            id,
            registry: Arc::clone(self),
        })
    }

    /// Shut down every tracked socket and refuse new ones
    pub fn shutdown_all(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.closed = true;
        for stream in inner.streams.values() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        inner.streams.len()
    }

    /// Number of tracked sockets
    pub fn len(&self) -> usize {
        self.inner.lock().streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Removes its socket from the registry on drop
pub struct Registration {
    id: u64,
    registry: Arc<ConnectionRegistry>,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.inner.lock().streams.remove(&self.id);
    }
}
