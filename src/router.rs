//! Command Router
//!
//! Validates a parsed request and runs it against the store.
//!
//! | type    | needs              | on success     | on failure                                  |
//! |---------|--------------------|----------------|---------------------------------------------|
//! | set     | key and value      | OK             | Missing key or value / Failed to set value  |
//! | get     | key                | OK + value     | Missing key / No such key                   |
//! | delete  | key                | OK             | Missing key / No such key                   |
//! | exit    | -                  | OK             | -                                           |
//! | other   | -                  | -              | Invalid command                             |

use std::sync::Arc;

use crate::protocol::{Command, Reason, Response};
use crate::store::{KeyPath, Store};

/// Stateless dispatcher over a shared store
#[derive(Clone)]
pub struct CommandRouter {
    store: Arc<Store>,
}

impl CommandRouter {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Execute a command and build its response
    pub fn route(&self, command: Command) -> Response {
        match command {
            Command::Set { key, value } => {
                let (Some(path), Some(value)) = (KeyPath::new(key), value) else {
                    return Response::error(Reason::MissingKeyOrValue);
                };
                if self.store.set(&path, value) {
                    Response::ok()
                } else {
                    Response::error(Reason::FailedToSet)
                }
            }
            Command::Get { key } => {
                let Some(path) = KeyPath::new(key) else {
                    return Response::error(Reason::MissingKey);
                };
                match self.store.get(&path) {
                    Some(value) => Response::ok_with(value),
                    None => Response::error(Reason::NoSuchKey),
                }
            }
            Command::Delete { key } => {
                let Some(path) = KeyPath::new(key) else {
                    return Response::error(Reason::MissingKey);
                };
                if self.store.delete(&path) {
                    Response::ok()
                } else {
                    Response::error(Reason::NoSuchKey)
                }
            }
            Command::Exit => Response::ok(),
            Command::Invalid { type_name } => {
                tracing::debug!("invalid command type: {:?}", type_name);
                Response::error(Reason::InvalidCommand)
            }
        }
    }

    /// The store this router writes to
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }
}
