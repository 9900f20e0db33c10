#![allow(non_snake_case)]

use super::*;

struct Doubling;

impl ExternalConverter for Doubling {
    fn to_wire(&self, value: &Value) -> Result<WireValue, String> {
        match value {
            Value::Int(v) => Ok(WireValue::Int(v * 2)),
            other => Err(format!("cannot double {}", other.kind())),
        }
    }

    fn from_wire(&self, value: &WireValue) -> Result<Value, String> {
        match value {
            WireValue::Int(v) => Ok(Value::Int(v / 2)),
            _ => Err("not an int".to_string()),
        }
    }
}

#[test]
fn DecodeContext___new___is_empty() {
    let ctx = DecodeContext::new();

    assert!(ctx.is_empty());
    assert!(ctx.converter("x.Y").is_none());
}

#[test]
fn DecodeContext___with_converter___resolves_by_token() {
    let ctx = DecodeContext::new().with_converter("x.Doubled", Doubling);

    let converter = ctx.converter("x.Doubled").unwrap();

    assert_eq!(converter.to_wire(&Value::Int(4)), Ok(WireValue::Int(8)));
    assert_eq!(converter.from_wire(&WireValue::Int(8)), Ok(Value::Int(4)));
    assert_eq!(ctx.len(), 1);
}

#[test]
fn DecodeContext___register___replaces_previous_converter() {
    let ctx = DecodeContext::new().with_converter("x.T", Doubling);

    ctx.register("x.T", Arc::new(PassThroughConverter::new("x.T")));

    let converter = ctx.converter("x.T").unwrap();
    assert!(matches!(
        converter.from_wire(&WireValue::Int(8)),
        Ok(Value::External(_))
    ));
    assert_eq!(ctx.len(), 1);
}

#[test]
fn DecodeContext___debug___lists_tokens_sorted() {
    let ctx = DecodeContext::new()
        .with_converter("b.B", Doubling)
        .with_converter("a.A", Doubling);

    assert_eq!(
        format!("{ctx:?}"),
        r#"DecodeContext { converters: ["a.A", "b.B"] }"#
    );
}

#[test]
fn PassThroughConverter___round_trip___keeps_payload() {
    let converter = PassThroughConverter::new("x.Opaque");
    let payload = WireValue::String("blob".into());

    let value = converter.from_wire(&payload).unwrap();

    assert_eq!(
        value,
        Value::External(ExternalValue::new("x.Opaque", payload.clone()))
    );
    assert_eq!(converter.to_wire(&value), Ok(payload));
}

#[test]
fn PassThroughConverter___to_wire___rejects_plain_values() {
    let converter = PassThroughConverter::new("x.Opaque");

    let err = converter.to_wire(&Value::Int(1)).unwrap_err();

    assert!(err.contains("expected an external value"));
}
