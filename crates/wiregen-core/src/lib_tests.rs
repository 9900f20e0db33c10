#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

// LogLevel tests

#[test]
fn LogLevel___ordering___trace_less_than_debug() {
    assert!(LogLevel::Trace < LogLevel::Debug);
}

#[test]
fn LogLevel___ordering___warn_less_than_off() {
    assert!(LogLevel::Warn < LogLevel::Error);
    assert!(LogLevel::Error < LogLevel::Off);
}

#[test_case("trace", LogLevel::Trace)]
#[test_case("DEBUG", LogLevel::Debug)]
#[test_case("Info", LogLevel::Info)]
#[test_case("warning", LogLevel::Warn)]
#[test_case("error", LogLevel::Error)]
#[test_case("none", LogLevel::Off)]
fn LogLevel___from_str___accepts_any_case(input: &str, expected: LogLevel) {
    assert_eq!(input.parse::<LogLevel>().unwrap(), expected);
}

#[test]
fn LogLevel___from_str___unknown_is_error() {
    let result = "loud".parse::<LogLevel>();

    assert!(result.unwrap_err().contains("loud"));
}

#[test]
fn LogLevel___display___shows_uppercase() {
    assert_eq!(LogLevel::Trace.to_string(), "TRACE");
    assert_eq!(LogLevel::Off.to_string(), "OFF");
}

#[test]
fn LogLevel___serde___uses_lowercase_names() {
    let json = serde_json::to_string(&LogLevel::Warn).unwrap();

    assert_eq!(json, "\"warn\"");
    assert_eq!(
        serde_json::from_str::<LogLevel>("\"debug\"").unwrap(),
        LogLevel::Debug
    );
}

// MessageRef tests

#[test]
fn MessageRef___defined___only_for_defined_messages() {
    let schema = resolve(&SchemaDocument::from_toml_str("[[messages]]\nname = \"A\"\n").unwrap()).unwrap();
    let a = schema.find_message("A").unwrap();

    assert_eq!(MessageRef::Defined(a).defined(), Some(a));
    assert_eq!(MessageRef::Anonymous.defined(), None);
    assert_eq!(MessageRef::Null.defined(), None);
}

#[test_case(MessageRef::Null, "null")]
#[test_case(MessageRef::Anonymous, "message")]
fn MessageRef___sentinels___describe_by_keyword(message: MessageRef, expected: &str) {
    let schema = resolve(&SchemaDocument::default()).unwrap();

    assert_eq!(FieldType::Message(message).describe(&schema), expected);
}

#[test]
fn MessageRef___null_sentinel___references_no_message() {
    let schema = resolve(&SchemaDocument::default()).unwrap();

    assert_eq!(schema.referenced_message(&FieldType::Message(MessageRef::Null)), None);
}
