//! Client
//!
//! Opens a fresh connection per message, sends one frame, reads one back.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::time::Duration;

use crate::error::Result;
use crate::protocol::{read_frame, write_frame, Command, CommandType, Response};
use crate::store::Document;

/// Talks to a jsondb server
#[derive(Debug, Clone)]
pub struct Client {
    addr: String,
    timeout: Option<Duration>,
}

impl Client {
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            timeout: None,
        }
    }

    /// Bound every read and write on the connection
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send raw request text and return the raw response text
    pub fn send_text(&self, message: &str) -> Result<String> {
        let stream = TcpStream::connect(&self.addr)?;
        stream.set_nodelay(true)?;
        if let Some(timeout) = self.timeout {
            stream.set_read_timeout(Some(timeout))?;
            stream.set_write_timeout(Some(timeout))?;
        }

        let mut writer = BufWriter::new(stream.try_clone()?);
        let mut reader = BufReader::new(stream);

        write_frame(&mut writer, message)?;
        read_frame(&mut reader)
    }

    /// Send a command and parse the response
    pub fn send(&self, command: &Command) -> Result<Response> {
        let text = self.send_text(&command.to_json())?;
        Response::from_json(&text)
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

/// Build a command from command-line style inputs.
///
/// `value` text that parses as JSON is sent as that JSON; anything else is
/// sent as a plain string. Unknown types are passed through so the server
/// can reject them.
pub fn build_command(type_name: &str, key: Vec<String>, value: Option<&str>) -> Command {
    match CommandType::parse(type_name) {
        Some(CommandType::Set) => Command::Set {
            key,
            value: value.map(parse_value),
        },
        Some(CommandType::Get) => Command::Get { key },
        Some(CommandType::Delete) => Command::Delete { key },
        Some(CommandType::Exit) => Command::Exit,
        None => Command::Invalid {
            type_name: Some(type_name.to_string()),
        },
    }
}

fn parse_value(text: &str) -> Document {
    serde_json::from_str(text).unwrap_or_else(|_| Document::String(text.to_string()))
}
