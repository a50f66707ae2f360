//! Operators, literals and conversions

use super::{eval, s, throws_error};
use jsstep::Value;

#[test]
fn test_arithmetic() {
    assert_eq!(eval("1 + 2 * 3"), Value::Number(7.0));
    assert_eq!(eval("(1 + 2) * 3"), Value::Number(9.0));
    assert_eq!(eval("7 % 3"), Value::Number(1.0));
    assert_eq!(eval("-7 % 3"), Value::Number(-1.0));
    assert_eq!(eval("1 / 0"), Value::Number(f64::INFINITY));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(eval("'a' + 1 + 2"), s("a12"));
    assert_eq!(eval("1 + 2 + 'a'"), s("3a"));
    assert_eq!(eval("'x' + null + undefined"), s("xnullundefined"));
    assert_eq!(eval("[1, 2] + ''"), s("1,2"));
    assert_eq!(eval("({}) + ''"), s("[object Object]"));
}

#[test]
fn test_bitwise() {
    assert_eq!(eval("5 & 3"), Value::Number(1.0));
    assert_eq!(eval("5 | 3"), Value::Number(7.0));
    assert_eq!(eval("5 ^ 3"), Value::Number(6.0));
    assert_eq!(eval("~5"), Value::Number(-6.0));
    assert_eq!(eval("1 << 31"), Value::Number(-2147483648.0));
    assert_eq!(eval("-1 >>> 0"), Value::Number(4294967295.0));
    assert_eq!(eval("-8 >> 1"), Value::Number(-4.0));
}

#[test]
fn test_equality() {
    assert_eq!(eval("null == undefined"), Value::Boolean(true));
    assert_eq!(eval("null === undefined"), Value::Boolean(false));
    assert_eq!(eval("'1' == 1"), Value::Boolean(true));
    assert_eq!(eval("NaN == NaN"), Value::Boolean(false));
    assert_eq!(eval("var o = {}; o == o"), Value::Boolean(true));
    assert_eq!(eval("({}) == ({})"), Value::Boolean(false));
    assert_eq!(eval("true == 1"), Value::Boolean(true));
}

#[test]
fn test_typeof() {
    assert_eq!(eval("typeof 1"), s("number"));
    assert_eq!(eval("typeof 'a'"), s("string"));
    assert_eq!(eval("typeof null"), s("object"));
    assert_eq!(eval("typeof undefined"), s("undefined"));
    assert_eq!(eval("typeof notDeclared"), s("undefined"));
    assert_eq!(eval("typeof function () {}"), s("function"));
    assert_eq!(eval("typeof []"), s("object"));
}

#[test]
fn test_logical_operators_short_circuit() {
    assert_eq!(eval("var n = 0; false && n++; n"), Value::Number(0.0));
    assert_eq!(eval("var n = 0; true || n++; n"), Value::Number(0.0));
    assert_eq!(eval("0 || 'fallback'"), s("fallback"));
    assert_eq!(eval("1 && 2"), Value::Number(2.0));
}

#[test]
fn test_update_expressions() {
    assert_eq!(eval("var i = 5; i++"), Value::Number(5.0));
    assert_eq!(eval("var i = 5; ++i"), Value::Number(6.0));
    assert_eq!(eval("var o = {n: 1}; o.n += 2; o.n"), Value::Number(3.0));
    assert_eq!(eval("var a = [1]; a[0]--; a[0]"), Value::Number(0.0));
}

#[test]
fn test_conditional_and_comma() {
    assert_eq!(eval("true ? 'y' : 'n'"), s("y"));
    assert_eq!(eval("(1, 2, 3)"), Value::Number(3.0));
}

#[test]
fn test_in_and_instanceof() {
    assert_eq!(eval("'a' in {a: 1}"), Value::Boolean(true));
    assert_eq!(eval("'toString' in {}"), Value::Boolean(true));
    assert_eq!(eval("[] instanceof Array"), Value::Boolean(true));
    assert_eq!(eval("[] instanceof Object"), Value::Boolean(true));
    assert_eq!(eval("({}) instanceof Array"), Value::Boolean(false));
}

#[test]
fn test_undefined_variable_throws() {
    assert!(throws_error("missing + 1", "missing is not defined"));
}

#[test]
fn test_member_of_undefined_throws() {
    assert!(throws_error("var u; u.x", "Cannot read property 'x' of undefined"));
}

#[test]
fn test_delete() {
    assert_eq!(eval("var o = {a: 1}; delete o.a; 'a' in o"), Value::Boolean(false));
    assert_eq!(eval("var o = {a: 1}; delete o.a"), Value::Boolean(true));
}

#[test]
fn test_void() {
    assert_eq!(eval("void 0"), Value::Undefined);
}

#[test]
fn test_string_comparison() {
    assert_eq!(eval("'a' < 'b'"), Value::Boolean(true));
    assert_eq!(eval("'10' < '9'"), Value::Boolean(true));
    assert_eq!(eval("10 < 9"), Value::Boolean(false));
    assert_eq!(eval("'10' < 9"), Value::Boolean(false));
}
