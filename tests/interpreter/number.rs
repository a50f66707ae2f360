//! Number conversion and formatting tests

use super::{eval, s, throws_error};
use jsstep::Value;

#[test]
fn test_number_to_string_formatting() {
    assert_eq!(eval("String(0.1 + 0.2)"), s("0.30000000000000004"));
    assert_eq!(eval("String(1e21)"), s("1e+21"));
    assert_eq!(eval("String(123456789012)"), s("123456789012"));
    assert_eq!(eval("String(1.5e-7)"), s("1.5e-7"));
    assert_eq!(eval("String(-0)"), s("0"));
    assert_eq!(eval("String(1 / 0)"), s("Infinity"));
    assert_eq!(eval("String(0 / 0)"), s("NaN"));
}

#[test]
fn test_string_to_number() {
    assert_eq!(eval("Number('  42  ')"), Value::Number(42.0));
    assert_eq!(eval("Number('0x1f')"), Value::Number(31.0));
    assert_eq!(eval("Number('')"), Value::Number(0.0));
    assert_eq!(eval("Number('-Infinity')"), Value::Number(f64::NEG_INFINITY));
    assert_eq!(eval("isNaN(Number('12px'))"), Value::Boolean(true));
    assert_eq!(eval("isNaN(Number('inf'))"), Value::Boolean(true));
    assert_eq!(eval("+'1e3'"), Value::Number(1000.0));
}

#[test]
fn test_other_conversions() {
    assert_eq!(eval("Number(true) + Number(null)"), Value::Number(1.0));
    assert_eq!(eval("isNaN(Number(undefined))"), Value::Boolean(true));
    assert_eq!(eval("Number([5])"), Value::Number(5.0));
    assert_eq!(eval("Number(new Date(7))"), Value::Number(7.0));
    assert_eq!(eval("Number()"), Value::Number(0.0));
}

#[test]
fn test_constants() {
    assert_eq!(eval("Number.MAX_VALUE"), Value::Number(f64::MAX));
    assert_eq!(eval("Number.MIN_VALUE > 0"), Value::Boolean(true));
    assert_eq!(eval("Number.POSITIVE_INFINITY === Infinity"), Value::Boolean(true));
    assert_eq!(eval("Number.NEGATIVE_INFINITY === -Infinity"), Value::Boolean(true));
    assert_eq!(eval("Number.NaN !== Number.NaN"), Value::Boolean(true));
}

#[test]
fn test_constants_are_read_only() {
    assert_eq!(eval("Number.MAX_VALUE = 1; Number.MAX_VALUE"), Value::Number(f64::MAX));
}

#[test]
fn test_to_string_radix() {
    assert_eq!(eval("(255).toString(16)"), s("ff"));
    assert_eq!(eval("(10).toString(2)"), s("1010"));
    assert_eq!(eval("(-35).toString(36)"), s("-z"));
    assert_eq!(eval("(0.5).toString(2)"), s("0.1"));
    assert_eq!(eval("(12).toString()"), s("12"));
    assert!(throws_error("(1).toString(1)", "radix"));
}

#[test]
fn test_to_fixed() {
    assert_eq!(eval("(3.14159).toFixed(2)"), s("3.14"));
    assert_eq!(eval("(2.5).toFixed(0)"), s("3"));
    assert_eq!(eval("(1.005).toFixed(2)"), s("1.00"));
    assert_eq!(eval("(42).toFixed()"), s("42"));
    assert_eq!(eval("(-1.5).toFixed(0)"), s("-2"));
    assert_eq!(eval("(1e21).toFixed(2)"), s("1e+21"));
    assert!(throws_error("(1).toFixed(21)", "RangeError"));
}

#[test]
fn test_to_exponential_and_precision() {
    assert_eq!(eval("(123).toExponential(2)"), s("1.23e+2"));
    assert_eq!(eval("(0.00015).toExponential()"), s("1.5e-4"));
    assert_eq!(eval("(123.456).toPrecision(4)"), s("123.5"));
    assert_eq!(eval("(123456).toPrecision(2)"), s("1.2e+5"));
    assert_eq!(eval("(1.5).toPrecision()"), s("1.5"));
    assert!(throws_error("(1).toPrecision(0)", "RangeError"));
}

#[test]
fn test_wrapper_value_of() {
    assert_eq!(eval("new Number(3).valueOf()"), Value::Number(3.0));
    assert_eq!(eval("new Number(3).toFixed(1)"), s("3.0"));
    assert!(throws_error("Number.prototype.valueOf.call('x')", "TypeError"));
}

#[test]
fn test_integer_operators() {
    assert_eq!(eval("7 % 3"), Value::Number(1.0));
    assert_eq!(eval("-7 % 3"), Value::Number(-1.0));
    assert_eq!(eval("1 << 31"), Value::Number(-2147483648.0));
    assert_eq!(eval("-1 >>> 0"), Value::Number(4294967295.0));
    assert_eq!(eval("-16 >> 2"), Value::Number(-4.0));
    assert_eq!(eval("~5"), Value::Number(-6.0));
    assert_eq!(eval("5 & 3 | 8 ^ 1"), Value::Number(9.0));
}

#[test]
fn test_boolean_builtin() {
    assert_eq!(eval("Boolean('')"), Value::Boolean(false));
    assert_eq!(eval("Boolean('0')"), Value::Boolean(true));
    assert_eq!(eval("new Boolean(false).valueOf()"), Value::Boolean(false));
    assert_eq!(eval("true.toString()"), s("true"));
}
