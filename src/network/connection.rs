//! Connection Handler
//!
//! Serves the single request/response exchange on one client socket.

use std::io::{self, BufReader, BufWriter};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use crate::error::{DbError, Result};
use crate::protocol::{read_command, write_response, Command, Response};
use crate::router::CommandRouter;

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Dispatches the request to the store
    router: CommandRouter,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O on two handles to the same socket
    pub fn new(stream: TcpStream, router: CommandRouter) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            router,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 leaves the socket blocking forever)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Handle the exchange (blocking)
    ///
    /// Reads one request frame, routes it, writes one response frame.
    /// After an `exit` request the socket is shut down from this side.
    /// Returns an error if the request could not be read or the response
    /// could not be written; the caller only logs it.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        let command = match read_command(&mut self.reader) {
            Ok(cmd) => cmd,
            Err(DbError::Io(ref e)) if is_disconnect(e) => {
                tracing::debug!("Client {} went away before sending a request", self.peer_addr);
                return Ok(());
            }
            Err(e) => {
                tracing::warn!("Bad request from {}: {}", self.peer_addr, e);
                return Err(e);
            }
        };

        tracing::debug!("Received from {}: {}", self.peer_addr, command.to_json());

        let is_exit = matches!(command, Command::Exit);
        let response = self.router.route(command);

        if let Err(e) = self.send_response(&response) {
            if let DbError::Io(ref io_err) = e {
                if is_disconnect(io_err) {
                    tracing::debug!(
                        "Client {} disconnected before response could be sent: {}",
                        self.peer_addr,
                        e
                    );
                    return Ok(());
                }
            }
            tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
            return Err(e);
        }

        if is_exit {
            tracing::debug!("Closing connection to {} after exit", self.peer_addr);
            self.close();
        }

        Ok(())
    }

    /// Send a response to the client
    fn send_response(&mut self, response: &Response) -> Result<()> {
        write_response(&mut self.writer, response)?;
        tracing::debug!("Sent to {}: {:?}", self.peer_addr, response);
        Ok(())
    }

    /// Shut the socket down in both directions
    fn close(&mut self) {
        if let Err(e) = self.writer.get_ref().shutdown(Shutdown::Both) {
            tracing::trace!("Shutdown of {} failed: {}", self.peer_addr, e);
        }
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::UnexpectedEof
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe
    )
}
