//! Protocol codec
//!
//! Length-prefixed UTF-8 frames carrying JSON envelopes.
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────┬─────────────────────────────┐
//! │ Len (2)  │     UTF-8 text (Len bytes)  │
//! └──────────┴─────────────────────────────┘
//! ```
//!
//! `Len` is an unsigned 16-bit big-endian byte count, so a frame carries at
//! most 65 535 bytes of text. Exactly one request frame and one response
//! frame are exchanged per connection.

use std::io::{Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{DbError, Result};
use super::{Command, Response};

/// Length prefix size: 2 bytes
pub const HEADER_SIZE: usize = 2;

/// Maximum text size in a single frame
pub const MAX_FRAME_SIZE: usize = u16::MAX as usize;

// =============================================================================
// Frame Encoding/Decoding
// =============================================================================

/// Encode text as a frame
///
/// Format: text_len (2) + text
pub fn encode_frame(text: &str) -> Result<Bytes> {
    let len = text.len();
    if len > MAX_FRAME_SIZE {
        return Err(DbError::Protocol(format!(
            "Frame too large: {} bytes (max {})",
            len, MAX_FRAME_SIZE
        )));
    }

    let mut frame = BytesMut::with_capacity(HEADER_SIZE + len);
    frame.put_u16(len as u16);
    frame.put_slice(text.as_bytes());
    Ok(frame.freeze())
}

/// Decode a frame from the front of `bytes`
///
/// Returns the text and the number of bytes consumed
pub fn decode_frame(bytes: &[u8]) -> Result<(String, usize)> {
    if bytes.len() < HEADER_SIZE {
        return Err(DbError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let text_len = u16::from_be_bytes([bytes[0], bytes[1]]) as usize;
    let total_len = HEADER_SIZE + text_len;
    if bytes.len() < total_len {
        return Err(DbError::Protocol(format!(
            "Incomplete frame: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    let text = decode_text(bytes[HEADER_SIZE..total_len].to_vec())?;
    Ok((text, total_len))
}

fn decode_text(payload: Vec<u8>) -> Result<String> {
    String::from_utf8(payload)
        .map_err(|e| DbError::Protocol(format!("Frame is not valid UTF-8: {}", e)))
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one complete frame from a stream
///
/// Blocks until the whole frame arrives or the stream fails
pub fn read_frame<R: Read>(reader: &mut R) -> Result<String> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let text_len = u16::from_be_bytes(header) as usize;
    let mut payload = vec![0u8; text_len];
    if text_len > 0 {
        reader.read_exact(&mut payload)?;
    }

    decode_text(payload)
}

/// Write one frame to a stream and flush it
pub fn write_frame<W: Write>(writer: &mut W, text: &str) -> Result<()> {
    let frame = encode_frame(text)?;
    writer.write_all(&frame)?;
    writer.flush()?;
    Ok(())
}

/// Read a request frame and parse the envelope
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let text = read_frame(reader)?;
    Command::from_json(&text)
}

/// Write a request frame
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    write_frame(writer, &command.to_json())
}

/// Read a response frame and parse the envelope
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let text = read_frame(reader)?;
    Response::from_json(&text)
}

/// Write a response frame
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    write_frame(writer, &response.to_json()?)
}
