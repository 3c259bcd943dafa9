//! Codec Tests
//!
//! Tests for frame encoding/decoding and envelope I/O over streams.

use std::io::Cursor;

use jsondb::protocol::{
    decode_frame, encode_frame, read_command, read_frame, read_response, write_command,
    write_frame, write_response, Command, Reason, Response, HEADER_SIZE, MAX_FRAME_SIZE,
};
use jsondb::DbError;
use serde_json::json;

// =============================================================================
// Frame Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_frame() {
    let encoded = encode_frame(r#"{"type":"exit"}"#).unwrap();
    let (text, consumed) = decode_frame(&encoded).unwrap();

    assert_eq!(text, r#"{"type":"exit"}"#);
    assert_eq!(consumed, encoded.len());
}

#[test]
fn test_empty_frame() {
    let encoded = encode_frame("").unwrap();
    assert_eq!(encoded.len(), HEADER_SIZE);

    let (text, consumed) = decode_frame(&encoded).unwrap();
    assert_eq!(text, "");
    assert_eq!(consumed, HEADER_SIZE);
}

#[test]
fn test_multibyte_text() {
    let original = r#"{"value":"日本語 ✓"}"#;
    let encoded = encode_frame(original).unwrap();

    let declared = u16::from_be_bytes([encoded[0], encoded[1]]) as usize;
    assert_eq!(declared, original.len());
    assert_eq!(decode_frame(&encoded).unwrap().0, original);
}

#[test]
fn test_decode_leaves_trailing_bytes() {
    let mut bytes = encode_frame("first").unwrap().to_vec();
    bytes.extend_from_slice(&encode_frame("second").unwrap());

    let (text, consumed) = decode_frame(&bytes).unwrap();
    assert_eq!(text, "first");
    assert_eq!(decode_frame(&bytes[consumed..]).unwrap().0, "second");
}

#[test]
fn test_largest_frame_accepted() {
    let text = "x".repeat(MAX_FRAME_SIZE);
    let encoded = encode_frame(&text).unwrap();
    assert_eq!(&encoded[..HEADER_SIZE], &[0xff, 0xff]);
}

#[test]
fn test_oversized_frame_rejected() {
    let text = "x".repeat(MAX_FRAME_SIZE + 1);
    assert!(matches!(encode_frame(&text), Err(DbError::Protocol(_))));
}

// =============================================================================
// Error Cases
// =============================================================================

#[test]
fn test_decode_incomplete_header() {
    assert!(matches!(decode_frame(&[0x00]), Err(DbError::Protocol(_))));
    assert!(matches!(decode_frame(&[]), Err(DbError::Protocol(_))));
}

#[test]
fn test_decode_incomplete_payload() {
    let bytes = [0x00, 0x0a, b'a', b'b'];
    assert!(matches!(decode_frame(&bytes), Err(DbError::Protocol(_))));
}

#[test]
fn test_read_frame_truncated_stream() {
    let mut cursor = Cursor::new(vec![0x00, 0x05, b'a', b'b']);
    match read_frame(&mut cursor) {
        Err(DbError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
        other => panic!("expected EOF error, got {:?}", other),
    }
}

#[test]
fn test_read_frame_invalid_utf8() {
    let mut cursor = Cursor::new(vec![0x00, 0x01, 0xc3]);
    assert!(matches!(read_frame(&mut cursor), Err(DbError::Protocol(_))));
}

#[test]
fn test_read_command_rejects_non_json() {
    let mut buffer = Vec::new();
    write_frame(&mut buffer, "hello there").unwrap();

    let mut cursor = Cursor::new(buffer);
    assert!(matches!(read_command(&mut cursor), Err(DbError::Json(_))));
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_command_exchange() {
    let command = Command::Set {
        key: vec!["person".into(), "name".into()],
        value: Some(json!({"first": "Ada", "last": "Lovelace"})),
    };

    let mut buffer = Vec::new();
    write_command(&mut buffer, &command).unwrap();

    let mut cursor = Cursor::new(buffer);
    assert_eq!(read_command(&mut cursor).unwrap(), command);
}

#[test]
fn test_stream_response_exchange() {
    let mut buffer = Vec::new();
    write_response(&mut buffer, &Response::error(Reason::FailedToSet)).unwrap();
    write_response(&mut buffer, &Response::ok_with(json!([1, 2]))).unwrap();

    let mut cursor = Cursor::new(buffer);
    assert_eq!(
        read_response(&mut cursor).unwrap(),
        Response::error(Reason::FailedToSet)
    );
    assert_eq!(
        read_response(&mut cursor).unwrap(),
        Response::ok_with(json!([1, 2]))
    );
}

#[test]
fn test_wire_bytes_of_ok_response() {
    let mut buffer = Vec::new();
    write_response(&mut buffer, &Response::ok()).unwrap();

    let body = br#"{"response":"OK"}"#;
    assert_eq!(&buffer[..2], &(body.len() as u16).to_be_bytes());
    assert_eq!(&buffer[2..], body);
}
