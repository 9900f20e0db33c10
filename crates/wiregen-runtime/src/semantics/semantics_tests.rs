#![allow(non_snake_case)]

use super::*;
use crate::fixtures::{CATALOGUE, runtime};
use test_case::test_case;

#[test_case("" => 0 ; "empty")]
#[test_case("a" => 97 ; "single char")]
#[test_case("hello" => 99_162_322 ; "word")]
fn string_hash___matches_java_string_hash(s: &str) -> i32 {
    string_hash(s)
}

#[test]
fn long_hash___folds_high_bits() {
    assert_eq!(long_hash(1), 1);
    assert_eq!(long_hash(1 << 32), 1);
    assert_eq!(long_hash(-1), 0);
}

#[test]
fn double_hash___canonical_nan() {
    assert_eq!(double_hash(f64::NAN), double_hash(-f64::NAN));
    assert_eq!(double_hash(0.0), 0);
}

#[test]
fn Runtime___hash_code___point_matches_generated_chain() {
    let runtime = runtime(CATALOGUE);
    let point = runtime
        .construct("Point", vec![Value::Int(3), Value::Int(4)])
        .unwrap();

    assert_eq!(runtime.hash_code(&point), (31 + 3) * 31 + 4);
}

#[test]
fn Runtime___hash_code___stable_across_equal_instances() {
    let runtime = runtime(CATALOGUE);
    let a = runtime
        .construct("Bag", vec![Value::list(["x", "y"])])
        .unwrap();
    let b = runtime
        .construct("Bag", vec![Value::list(["x", "y"])])
        .unwrap();

    assert!(runtime.equals(&a, &b));
    assert_eq!(runtime.hash_code(&a), runtime.hash_code(&b));
}

#[test]
fn Runtime___hash_code___array_field_wrapped_once() {
    let runtime = runtime(CATALOGUE);
    let triangle = runtime
        .construct(
            "Triangle",
            vec![Value::array(vec![Value::Int(1), Value::Int(2), Value::Int(3)])],
        )
        .unwrap();

    let array = ValueSemantics::fold(1, [1, 2, 3]);
    assert_eq!(
        runtime.hash_code(&triangle),
        ValueSemantics::combine(1, ValueSemantics::combine(1, array))
    );
}

#[test]
fn Runtime___hash_code___overridden_base_slot_contributes_zero() {
    let runtime = runtime(CATALOGUE);
    let derived = runtime
        .construct("Derived", vec![Value::Int(7), Value::enum_label("RED")])
        .unwrap();

    let expected = ValueSemantics::fold(HASH_SEED, [0, 7, string_hash("RED")]);
    assert_eq!(runtime.hash_code(&derived), expected);
}

#[test]
fn Runtime___equals___different_concrete_types_differ() {
    let runtime = runtime(CATALOGUE);
    let base = runtime.construct("Base", vec![Value::Int(7)]).unwrap();
    let derived = runtime
        .construct("Derived", vec![Value::Int(7), Value::enum_label("RED")])
        .unwrap();

    assert!(!runtime.equals(&base, &derived));
}

#[test]
fn Runtime___equals___compares_arrays_by_content() {
    let runtime = runtime(CATALOGUE);
    let corners = || Value::array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    let a = runtime.construct("Triangle", vec![corners()]).unwrap();
    let b = runtime.construct("Triangle", vec![corners()]).unwrap();

    assert!(runtime.equals(&a, &b));
}

#[test]
fn Runtime___equals___detects_changed_field() {
    let runtime = runtime(CATALOGUE);
    let a = runtime.construct("Note", vec![]).unwrap();
    let b = runtime.construct("Note", vec![]).unwrap();

    runtime.set(&b, "text", "changed").unwrap();

    assert!(!runtime.equals(&a, &b));
}

#[test]
fn Runtime___render___lists_effective_fields() {
    let runtime = runtime(CATALOGUE);
    let square = runtime
        .construct("Square", vec![Value::from("sq"), Value::Double(2.0)])
        .unwrap();

    assert_eq!(runtime.render(&square), "Square[name=sq, side=2.0]");
}
