//! Response definitions
//!
//! Represents response envelopes sent to clients.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::Document;

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "ERROR")]
    Error,
}

/// Why a request failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    InvalidCommand,
    NoSuchKey,
    MissingKeyOrValue,
    MissingKey,
    FailedToSet,
}

impl Reason {
    /// Exact text sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::InvalidCommand => "Invalid command",
            Reason::NoSuchKey => "No such key",
            Reason::MissingKeyOrValue => "Missing key or value",
            Reason::MissingKey => "Missing key",
            Reason::FailedToSet => "Failed to set value",
        }
    }
}

/// A response envelope
///
/// Carries `value` only on a successful get and `reason` only on error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "response")]
    pub status: Status,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Document>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Response {
    /// Create an OK response without a value
    pub fn ok() -> Self {
        Self {
            status: Status::Ok,
            value: None,
            reason: None,
        }
    }

    /// Create an OK response carrying a value
    pub fn ok_with(value: Document) -> Self {
        Self {
            status: Status::Ok,
            value: Some(value),
            reason: None,
        }
    }

    /// Create an ERROR response
    pub fn error(reason: Reason) -> Self {
        Self {
            status: Status::Error,
            value: None,
            reason: Some(reason.as_str().to_string()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// Serialize to frame text
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse frame text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
