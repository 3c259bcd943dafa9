//! Tests for CommandRouter
//!
//! Every row of the dispatch table, driven through parsed request text
//! the way the connection handler drives it.

use std::sync::Arc;

use jsondb::protocol::{Command, Reason, Response, Status};
use jsondb::{CommandRouter, Store};
use serde_json::json;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_router() -> (TempDir, CommandRouter) {
    let temp_dir = TempDir::new().unwrap();
    let store = Arc::new(Store::new(temp_dir.path().join("db.json")));
    (temp_dir, CommandRouter::new(store))
}

fn request(router: &CommandRouter, text: &str) -> Response {
    router.route(Command::from_json(text).unwrap())
}

fn assert_error(response: &Response, reason: Reason) {
    assert_eq!(response.status, Status::Error);
    assert_eq!(response.reason.as_deref(), Some(reason.as_str()));
    assert!(response.value.is_none());
}

// =============================================================================
// Set Tests
// =============================================================================

#[test]
fn test_set_ok() {
    let (_temp, router) = setup_router();

    let response = request(&router, r#"{"type":"set","key":["user","name"],"value":"Alice"}"#);

    assert_eq!(response, Response::ok());
    assert_eq!(response.to_json().unwrap(), r#"{"response":"OK"}"#);
}

#[test]
fn test_set_missing_value() {
    let (_temp, router) = setup_router();

    let response = request(&router, r#"{"type":"set","key":["k"]}"#);

    assert_error(&response, Reason::MissingKeyOrValue);
}

#[test]
fn test_set_empty_key_leaves_store_unchanged() {
    let (_temp, router) = setup_router();

    let response = request(&router, r#"{"type":"set","key":[],"value":"x"}"#);

    assert_error(&response, Reason::MissingKeyOrValue);
    assert!(!router.store().path().exists());
}

#[test]
fn test_set_missing_key_field() {
    let (_temp, router) = setup_router();

    let response = request(&router, r#"{"type":"set","value":{"a":1}}"#);

    assert_error(&response, Reason::MissingKeyOrValue);
}

#[test]
fn test_set_conflict() {
    let (_temp, router) = setup_router();
    request(&router, r#"{"type":"set","key":["a"],"value":1}"#);

    let response = request(&router, r#"{"type":"set","key":["a","b"],"value":2}"#);

    assert_error(&response, Reason::FailedToSet);
    let get = request(&router, r#"{"type":"get","key":["a"]}"#);
    assert_eq!(get, Response::ok_with(json!(1)));
}

// =============================================================================
// Get Tests
// =============================================================================

#[test]
fn test_get_ok() {
    let (_temp, router) = setup_router();
    request(&router, r#"{"type":"set","key":["user"],"value":{"name":"Alice","tags":["a"]}}"#);

    let response = request(&router, r#"{"type":"get","key":["user"]}"#);

    assert_eq!(response, Response::ok_with(json!({"name": "Alice", "tags": ["a"]})));
    assert!(response.reason.is_none());
}

#[test]
fn test_get_no_such_key() {
    let (_temp, router) = setup_router();

    let response = request(&router, r#"{"type":"get","key":["nope"]}"#);

    assert_error(&response, Reason::NoSuchKey);
}

#[test]
fn test_get_missing_key() {
    let (_temp, router) = setup_router();

    assert_error(&request(&router, r#"{"type":"get","key":[]}"#), Reason::MissingKey);
    assert_error(&request(&router, r#"{"type":"get"}"#), Reason::MissingKey);
}

#[test]
fn test_get_stored_null_is_no_such_key() {
    let (_temp, router) = setup_router();
    let set = request(&router, r#"{"type":"set","key":["n"],"value":null}"#);
    assert_eq!(set, Response::ok());

    let response = request(&router, r#"{"type":"get","key":["n"]}"#);

    assert_error(&response, Reason::NoSuchKey);
}

#[test]
fn test_get_with_string_key() {
    let (_temp, router) = setup_router();
    request(&router, r#"{"type":"set","key":["name"],"value":"Bob"}"#);

    let response = request(&router, r#"{"type":"get","key":"name"}"#);

    assert_eq!(response, Response::ok_with(json!("Bob")));
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_then_delete_again() {
    let (_temp, router) = setup_router();
    request(&router, r#"{"type":"set","key":["k"],"value":1}"#);

    let first = request(&router, r#"{"type":"delete","key":["k"]}"#);
    let second = request(&router, r#"{"type":"delete","key":["k"]}"#);

    assert_eq!(first, Response::ok());
    assert_error(&second, Reason::NoSuchKey);
}

#[test]
fn test_delete_missing_key() {
    let (_temp, router) = setup_router();

    let response = request(&router, r#"{"type":"delete","key":[]}"#);

    assert_error(&response, Reason::MissingKey);
    assert!(!router.store().path().exists());
}

// =============================================================================
// Exit / Invalid Tests
// =============================================================================

#[test]
fn test_exit_always_ok() {
    let (_temp, router) = setup_router();

    assert_eq!(request(&router, r#"{"type":"exit"}"#), Response::ok());
    assert_eq!(
        request(&router, r#"{"type":"exit","key":["ignored"],"value":1}"#),
        Response::ok()
    );
}

#[test]
fn test_exit_with_malformed_key_is_ok() {
    let (_temp, router) = setup_router();

    assert_eq!(request(&router, r#"{"type":"exit","key":[null]}"#), Response::ok());
    assert_eq!(request(&router, r#"{"type":"exit","key":{"a":1}}"#), Response::ok());
}

#[test]
fn test_invalid_command_leaves_store_untouched() {
    let (_temp, router) = setup_router();

    let response = request(&router, r#"{"type":"update","key":["k"],"value":1}"#);

    assert_error(&response, Reason::InvalidCommand);
    assert!(!router.store().path().exists());
}

#[test]
fn test_missing_type_is_invalid() {
    let (_temp, router) = setup_router();

    assert_error(&request(&router, r#"{"key":["k"]}"#), Reason::InvalidCommand);
}

// =============================================================================
// End-to-end sequence through the router
// =============================================================================

#[test]
fn test_documented_sequence() {
    let (_temp, router) = setup_router();
    let steps = [
        (r#"{"type":"set","key":["user","name"],"value":"Alice"}"#, r#"{"response":"OK"}"#),
        (r#"{"type":"get","key":["user","name"]}"#, r#"{"response":"OK","value":"Alice"}"#),
        (r#"{"type":"delete","key":["user","name"]}"#, r#"{"response":"OK"}"#),
        (r#"{"type":"get","key":["user","name"]}"#, r#"{"response":"ERROR","reason":"No such key"}"#),
        (r#"{"type":"set","key":[],"value":"x"}"#, r#"{"response":"ERROR","reason":"Missing key or value"}"#),
    ];

    for (sent, expected) in steps {
        assert_eq!(request(&router, sent).to_json().unwrap(), expected, "request {}", sent);
    }
}
