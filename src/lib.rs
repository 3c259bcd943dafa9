//! # jsondb
//!
//! A small networked JSON document store with:
//! - Hierarchical key paths into one JSON tree
//! - Whole-file persistence, re-read on every operation
//! - Single-writer/multi-reader locking over the whole tree
//! - Length-prefixed JSON frames over TCP, one exchange per connection
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Acceptor (blocking accept)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  one job per connection
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │              Worker Pool (fixed size, queued)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │       Connection Handler (read frame → route → write)        │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Command Router                            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌───────────────┐        ┌──────────┐
//!               │ Document Store│◄──────►│ db.json  │
//!               │   (RwLock)    │        └──────────┘
//!               └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod store;
pub mod protocol;
pub mod router;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DbError, Result, StoreError};
pub use config::{Config, DEFAULT_PORT};
pub use store::{Document, KeyPath, Store};
pub use router::CommandRouter;
pub use client::Client;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of jsondb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
