//! Command definitions
//!
//! Represents request envelopes from clients.

use serde_json::{json, Map};

use crate::error::{DbError, Result};
use crate::store::Document;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Set,
    Get,
    Delete,
    Exit,
}

impl CommandType {
    /// Parse the envelope's `type` field
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "set" => Some(CommandType::Set),
            "get" => Some(CommandType::Get),
            "delete" => Some(CommandType::Delete),
            "exit" => Some(CommandType::Exit),
            _ => None,
        }
    }

    /// Wire name of the command
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Set => "set",
            CommandType::Get => "get",
            CommandType::Delete => "delete",
            CommandType::Exit => "exit",
        }
    }
}

/// A parsed request envelope
///
/// Key lists are kept as sent (possibly empty); validating them is the
/// router's job so it can answer with the right reason.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Store a value at a key path
    Set {
        key: Vec<String>,
        value: Option<Document>,
    },

    /// Read the value at a key path
    Get { key: Vec<String> },

    /// Remove the value at a key path
    Delete { key: Vec<String> },

    /// Finish the exchange; the server closes the connection afterwards
    Exit,

    /// Unknown type, missing type, or a key that cannot be a path
    Invalid { type_name: Option<String> },
}

impl Command {
    /// Get the command type (None for invalid envelopes)
    pub fn command_type(&self) -> Option<CommandType> {
        match self {
            Command::Set { .. } => Some(CommandType::Set),
            Command::Get { .. } => Some(CommandType::Get),
            Command::Delete { .. } => Some(CommandType::Delete),
            Command::Exit => Some(CommandType::Exit),
            Command::Invalid { .. } => None,
        }
    }

    /// Parse a request from frame text.
    ///
    /// Text that is not a JSON object is a protocol error. Anything that is
    /// a JSON object becomes some `Command`, possibly `Invalid`.
    pub fn from_json(text: &str) -> Result<Self> {
        let document: Document = serde_json::from_str(text)?;
        match document {
            Document::Object(envelope) => Ok(Self::from_envelope(envelope)),
            _ => Err(DbError::Protocol(
                "request is not a JSON object".to_string(),
            )),
        }
    }

    /// Interpret the fields of a request object
    pub fn from_envelope(mut envelope: Map<String, Document>) -> Self {
        let type_name = match envelope.get("type") {
            Some(Document::String(name)) => name.clone(),
            _ => return Command::Invalid { type_name: None },
        };
        let Some(command_type) = CommandType::parse(&type_name) else {
            return Command::Invalid {
                type_name: Some(type_name),
            };
        };
        // exit ignores every other field, however malformed
        if command_type == CommandType::Exit {
            return Command::Exit;
        }

        let key = match envelope.get("key").map(key_segments) {
            None => Vec::new(),
            Some(Some(segments)) => segments,
            Some(None) => {
                return Command::Invalid {
                    type_name: Some(type_name),
                }
            }
        };

        match command_type {
            CommandType::Set => Command::Set {
                key,
                value: envelope.remove("value"),
            },
            CommandType::Get => Command::Get { key },
            CommandType::Delete => Command::Delete { key },
            CommandType::Exit => Command::Exit,
        }
    }

    /// Build the request envelope for this command
    pub fn to_envelope(&self) -> Document {
        match self {
            Command::Set { key, value } => {
                let mut envelope = json!({ "type": "set", "key": key });
                if let (Some(value), Some(map)) = (value, envelope.as_object_mut()) {
                    map.insert("value".to_string(), value.clone());
                }
                envelope
            }
            Command::Get { key } => json!({ "type": "get", "key": key }),
            Command::Delete { key } => json!({ "type": "delete", "key": key }),
            Command::Exit => json!({ "type": "exit" }),
            Command::Invalid { type_name: Some(name) } => json!({ "type": name }),
            Command::Invalid { type_name: None } => json!({}),
        }
    }

    /// Serialize to frame text
    pub fn to_json(&self) -> String {
        self.to_envelope().to_string()
    }
}

/// Turn a `key` field into path segments.
///
/// Accepts an array of scalars or a bare string (one segment). Numbers and
/// booleans are taken by their text. Returns None for anything else.
fn key_segments(key: &Document) -> Option<Vec<String>> {
    match key {
        Document::String(single) => Some(vec![single.clone()]),
        Document::Array(items) => items.iter().map(segment_text).collect(),
        _ => None,
    }
}

fn segment_text(item: &Document) -> Option<String> {
    match item {
        Document::String(s) => Some(s.clone()),
        Document::Number(n) => Some(n.to_string()),
        Document::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
