//! Store Module
//!
//! The document tree and the file it lives in.
//!
//! ## Responsibilities
//! - Resolve key paths against a tree of nested JSON objects
//! - Create intermediate objects on set, refuse to overwrite scalars on the way
//! - Persist the whole tree as one JSON file after every mutation
//! - Serialize access with a single reader-writer lock over the whole tree
//!
//! ## Persistence Model
//! There is no in-memory cache. Every operation re-reads the file while
//! holding the lock, so the file is the only source of truth:
//!
//! ```text
//! set/delete:  write lock → load → mutate → save (tmp + rename) → unlock
//! get:         read lock  → load → traverse                    → unlock
//! ```

mod document_store;
mod path;

pub use document_store::Store;
pub use path::KeyPath;

/// A stored or exchanged value: object, array, string, number, bool or null.
///
/// Objects keep their keys in insertion order.
pub type Document = serde_json::Value;

/// An object node inside a document tree
pub type Object = serde_json::Map<String, Document>;
