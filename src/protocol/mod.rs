//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Exchange
//! One connection carries exactly one request and one response, each as a
//! length-prefixed UTF-8 frame (see `codec`) holding a JSON envelope.
//!
//! ### Request Envelope
//! ```text
//! { "type": "set" | "get" | "delete" | "exit",
//!   "key":  ["segment", ...],        (optional)
//!   "value": <any JSON> }            (set only)
//! ```
//!
//! ### Response Envelope
//! ```text
//! { "response": "OK" | "ERROR",
//!   "value":  <any JSON>,            (successful get only)
//!   "reason": "<text>" }             (errors only)
//! ```
//!
//! ### Error Reasons
//! - "Invalid command"
//! - "No such key"
//! - "Missing key or value"
//! - "Missing key"
//! - "Failed to set value"

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Reason, Response, Status};
pub use codec::{
    decode_frame, encode_frame, read_command, read_frame, read_response, write_command,
    write_frame, write_response, HEADER_SIZE, MAX_FRAME_SIZE,
};
