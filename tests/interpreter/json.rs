//! JSON.parse / JSON.stringify tests

use super::{eval, s, throws_error};
use jsstep::Value;

#[test]
fn test_stringify_primitives() {
    assert_eq!(eval("JSON.stringify(1.5)"), s("1.5"));
    assert_eq!(eval("JSON.stringify('a\"b')"), s("\"a\\\"b\""));
    assert_eq!(eval("JSON.stringify(null)"), s("null"));
    assert_eq!(eval("JSON.stringify(NaN)"), s("null"));
    assert_eq!(eval("JSON.stringify(undefined)"), Value::Undefined);
    assert_eq!(eval("JSON.stringify(function () {})"), Value::Undefined);
}

#[test]
fn test_stringify_objects_and_arrays() {
    assert_eq!(eval("JSON.stringify({b: 1, a: [true, 'x']})"), s("{\"b\":1,\"a\":[true,\"x\"]}"));
    assert_eq!(eval("JSON.stringify([undefined, function () {}, 1])"), s("[null,null,1]"));
    assert_eq!(eval("JSON.stringify({u: undefined, f: function () {}, n: null})"), s("{\"n\":null}"));
    assert_eq!(eval("JSON.stringify([1, , 3])"), s("[1,null,3]"));
    assert_eq!(eval("JSON.stringify({big: 1e21, small: 0.1})"), s("{\"big\":1e+21,\"small\":0.1}"));
}

#[test]
fn test_stringify_skips_non_enumerable_and_inherited() {
    let code = r#"
        var o = Object.create({inherited: 1});
        o.own = 2;
        Object.defineProperty(o, 'hidden', {value: 3});
        JSON.stringify(o)
    "#;
    assert_eq!(eval(code), s("{\"own\":2}"));
}

#[test]
fn test_stringify_wrappers() {
    assert_eq!(eval("JSON.stringify([new Number(1), new String('s'), new Boolean(false)])"), s("[1,\"s\",false]"));
}

#[test]
fn test_stringify_indent() {
    assert_eq!(
        eval("JSON.stringify({a: [1, 2], b: {}}, null, 2)"),
        s("{\n  \"a\": [\n    1,\n    2\n  ],\n  \"b\": {}\n}")
    );
    assert_eq!(eval("JSON.stringify([1], null, '--')"), s("[\n--1\n]"));
    assert_eq!(eval("JSON.stringify([1], null, 20)"), eval("JSON.stringify([1], null, 10)"));
}

#[test]
fn test_stringify_array_replacer() {
    assert_eq!(
        eval("JSON.stringify({a: 1, b: 2, c: {a: 3, d: 4}}, ['c', 'a'])"),
        s("{\"c\":{\"a\":3},\"a\":1}")
    );
}

#[test]
fn test_stringify_cycle_throws() {
    assert!(throws_error("var o = {}; o.self = o; JSON.stringify(o)", "circular"));
    let code = r#"
        var r;
        try { var a = []; a.push(a); JSON.stringify(a); } catch (e) { r = e instanceof TypeError; }
        r
    "#;
    assert_eq!(eval(code), Value::Boolean(true));
}

#[test]
fn test_stringify_repeated_reference_is_not_a_cycle() {
    assert_eq!(eval("var x = {v: 1}; JSON.stringify([x, x])"), s("[{\"v\":1},{\"v\":1}]"));
}

#[test]
fn test_parse() {
    assert_eq!(eval("JSON.parse('{\"a\": [1, 2, {\"b\": null}]}').a[2].b"), Value::Null);
    assert_eq!(eval("JSON.parse('\"str\"')"), s("str"));
    assert_eq!(eval("JSON.parse(' 42 ')"), Value::Number(42.0));
    assert_eq!(eval("Object.keys(JSON.parse('{\"z\": 1, \"y\": 2}')).join()"), s("z,y"));
    assert_eq!(eval("JSON.parse('[1, 2]') instanceof Array"), Value::Boolean(true));
}

#[test]
fn test_parse_errors_are_syntax_errors() {
    assert!(throws_error("JSON.parse('{bad}')", "SyntaxError"));
    let code = "var r; try { JSON.parse('[1,'); } catch (e) { r = e.name; } r";
    assert_eq!(eval(code), s("SyntaxError"));
}

#[test]
fn test_parse_stringify_preserves_structure() {
    let code = r#"
        var text = '{"list":[1,"two",false,null],"nested":{"k":"v"}}';
        JSON.stringify(JSON.parse(text)) === text
    "#;
    assert_eq!(eval(code), Value::Boolean(true));
}
