//! Global functions and values

use super::{eval, s, throws_error};
use jsstep::Value;

#[test]
fn test_global_values() {
    assert_eq!(eval("isNaN(NaN)"), Value::Boolean(true));
    assert_eq!(eval("Infinity > 1e308"), Value::Boolean(true));
    assert_eq!(eval("typeof undefined"), s("undefined"));
    assert_eq!(eval("undefined = 1; typeof undefined"), s("undefined"));
    assert_eq!(eval("this === this.window || typeof this"), s("object"));
}

#[test]
fn test_parse_int() {
    assert_eq!(eval("parseInt('42px')"), Value::Number(42.0));
    assert_eq!(eval("parseInt('  -17')"), Value::Number(-17.0));
    assert_eq!(eval("parseInt('0x1A')"), Value::Number(26.0));
    assert_eq!(eval("parseInt('ff', 16)"), Value::Number(255.0));
    assert_eq!(eval("parseInt('777', 8)"), Value::Number(511.0));
    assert_eq!(eval("parseInt('12', 2)"), Value::Number(1.0));
    assert_eq!(eval("isNaN(parseInt('px'))"), Value::Boolean(true));
    assert_eq!(eval("parseInt(3.99)"), Value::Number(3.0));
}

#[test]
fn test_parse_float() {
    assert_eq!(eval("parseFloat('3.25 meters')"), Value::Number(3.25));
    assert_eq!(eval("parseFloat('.5')"), Value::Number(0.5));
    assert_eq!(eval("parseFloat('-1e3!')"), Value::Number(-1000.0));
    assert_eq!(eval("parseFloat('Infinityx')"), Value::Number(f64::INFINITY));
    assert_eq!(eval("isNaN(parseFloat('x1'))"), Value::Boolean(true));
}

#[test]
fn test_is_finite_and_is_nan_coerce() {
    assert_eq!(eval("isFinite('12')"), Value::Boolean(true));
    assert_eq!(eval("isFinite(Infinity)"), Value::Boolean(false));
    assert_eq!(eval("isNaN('abc')"), Value::Boolean(true));
    assert_eq!(eval("isNaN('')"), Value::Boolean(false));
}

#[test]
fn test_uri_component_functions() {
    assert_eq!(eval("encodeURIComponent('a b&c/d')"), s("a%20b%26c%2Fd"));
    assert_eq!(eval("encodeURIComponent('\\u00e9')"), s("%C3%A9"));
    assert_eq!(eval("decodeURIComponent('a%20b%26c')"), s("a b&c"));
    assert_eq!(eval("decodeURIComponent(encodeURIComponent('\\u4e2d\\u6587 ok'))"), s("\u{4e2d}\u{6587} ok"));
}

#[test]
fn test_uri_functions_keep_reserved() {
    assert_eq!(eval("encodeURI('http://x.y/a b?q=1#f')"), s("http://x.y/a%20b?q=1#f"));
    assert_eq!(eval("decodeURI('a%20b%2Fc')"), s("a b%2Fc"));
}

#[test]
fn test_malformed_uri_throws() {
    assert!(throws_error("decodeURIComponent('%E0%A4%A')", "URIError"));
    assert!(throws_error("decodeURI('%zz')", "URI malformed"));
}

#[test]
fn test_escape_and_unescape() {
    assert_eq!(eval("escape('a b+c\\u00e9\\u0100')"), s("a%20b+c%E9%u0100"));
    assert_eq!(eval("unescape('a%20b%u0100%zz')"), s("a b\u{0100}%zz"));
}

#[test]
fn test_global_object_properties() {
    assert_eq!(eval("var declared = 1; this.declared"), Value::Number(1.0));
    assert_eq!(eval("implicitGlobal = 2; this.implicitGlobal"), Value::Number(2.0));
    assert_eq!(eval("typeof this.parseInt"), s("function"));
}

#[test]
fn test_indirect_eval_uses_global_scope() {
    let code = r#"
        var x = 'global';
        function f() { var x = 'local'; var e = eval; return e('x'); }
        f()
    "#;
    assert_eq!(eval(code), s("global"));
}
