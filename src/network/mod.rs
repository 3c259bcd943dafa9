//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread blocking on accept()
//! - Fixed worker pool; excess connections queue, never rejected
//! - One request and one response per connection, routed through CommandRouter
//! - Graceful shutdown: stop accepting → drain pool (bounded) → force → close listener

mod server;
mod connection;
mod pool;
mod registry;

pub use server::{Server, ShutdownHandle};
pub use connection::Connection;
pub use pool::{ShutdownOutcome, WorkerPool};
pub use registry::{ConnectionRegistry, Registration};
