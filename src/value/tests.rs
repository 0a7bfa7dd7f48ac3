use rstest::rstest;

use super::*;

#[rstest]
#[case("42", 42.0)]
#[case(" 7 ", 7.0)]
#[case("", 0.0)]
#[case("-1.5", -1.5)]
#[case("1e3", 1000.0)]
#[case("0x1f", 31.0)]
#[case("0b101", 5.0)]
#[case("Infinity", f64::INFINITY)]
#[case("-Infinity", f64::NEG_INFINITY)]
fn parse_number_accepts(#[case] raw: &str, #[case] expected: f64) {
    assert_eq!(parse_number(raw), expected);
}

#[rstest]
#[case("abc")]
#[case("1a")]
#[case("inf")]
#[case("nan")]
#[case("0x")]
#[case("-0x10")]
#[case(".")]
fn parse_number_rejects(#[case] raw: &str) {
    assert!(parse_number(raw).is_nan());
}

#[test]
fn format_number_matches_query_text() {
    assert_eq!(format_number(42.0), "42");
    assert_eq!(format_number(1.5), "1.5");
    assert_eq!(format_number(-0.0), "0");
    assert_eq!(format_number(f64::NAN), "NaN");
    assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
}

#[rstest]
#[case(1e21, "1e+21")]
#[case(1.5e300, "1.5e+300")]
#[case(-1e21, "-1e+21")]
#[case(1e-7, "1e-7")]
#[case(-2.5e-10, "-2.5e-10")]
#[case(1e20, "100000000000000000000")]
#[case(0.000001, "0.000001")]
fn format_number_switches_to_exponent(#[case] n: f64, #[case] expected: &str) {
    assert_eq!(format_number(n), expected);
}

#[rstest]
#[case("42", Field::Number(42.0))]
#[case("1e+21", Field::Number(1e21))]
#[case("1e-7", Field::Number(1e-7))]
#[case("1e21", Field::String("1e21".into()))]
#[case("B", Field::String("B".into()))]
#[case("042", Field::String("042".into()))]
#[case("1.50", Field::String("1.50".into()))]
#[case("", Field::String("".into()))]
fn field_from_raw(#[case] raw: &str, #[case] expected: Field) {
    assert_eq!(Field::from_raw(raw), expected);
}

#[test]
fn kind_follows_variant() {
    assert_eq!(ParamValue::from("x").kind(), ParamKind::String);
    assert_eq!(ParamValue::from(1).kind(), ParamKind::Number);
    assert_eq!(ParamValue::from(true).kind(), ParamKind::Bool);
    assert_eq!(ParamValue::from(["a"]).kind(), ParamKind::Array);
    assert_eq!(ParamValue::from(ParamObject::new()).kind(), ParamKind::Object);
    assert_eq!(ParamKind::Bool.to_string(), "bool");
}

#[test]
fn identical_treats_nan_as_equal() {
    let nan = ParamValue::Number(f64::NAN);
    assert!(nan.is_identical(&nan.clone()));
    assert_ne!(nan, nan.clone());
    let a = ParamValue::from(object([("x", f64::NAN)]));
    assert!(a.is_identical(&a.clone()));
    assert!(!a.is_identical(&ParamValue::from(object([("y", f64::NAN)]))));
}

#[test]
fn serde_is_untagged() {
    let v: ParamValue = serde_json::from_str(r#"{"b":"B","c":42}"#).unwrap();
    assert_eq!(v, ParamValue::from(object([("b", Field::from("B")), ("c", Field::from(42.0))])));
    let v: ParamValue = serde_json::from_str(r#"["x","y"]"#).unwrap();
    assert_eq!(v, ParamValue::from(["x", "y"]));
    assert_eq!(serde_json::to_string(&ParamValue::from(true)).unwrap(), "true");
}
