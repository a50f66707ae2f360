//! String builtin tests

use super::{eval, s};
use jsstep::Value;

#[test]
fn test_char_access() {
    assert_eq!(eval("'hello'.charAt(1)"), s("e"));
    assert_eq!(eval("'hello'.charAt(10)"), s(""));
    assert_eq!(eval("'A'.charCodeAt(0)"), Value::Number(65.0));
    assert_eq!(eval("isNaN('A'.charCodeAt(5))"), Value::Boolean(true));
    assert_eq!(eval("'abc'[2]"), s("c"));
}

#[test]
fn test_utf16_semantics() {
    assert_eq!(eval("'\\ud83d\\ude00'.length"), Value::Number(2.0));
    assert_eq!(eval("'a\\ud83d\\ude00b'.indexOf('b')"), Value::Number(3.0));
    assert_eq!(eval("'\\ud83d\\ude00'.charCodeAt(1)"), Value::Number(0xDE00 as f64));
}

#[test]
fn test_from_char_code() {
    assert_eq!(eval("String.fromCharCode(72, 105)"), s("Hi"));
    assert_eq!(eval("String.fromCharCode(0x10041)"), s("A"));
}

#[test]
fn test_search_methods() {
    assert_eq!(eval("'abcabc'.indexOf('c')"), Value::Number(2.0));
    assert_eq!(eval("'abcabc'.indexOf('c', 3)"), Value::Number(5.0));
    assert_eq!(eval("'abcabc'.lastIndexOf('a')"), Value::Number(3.0));
    assert_eq!(eval("'abc'.indexOf('')"), Value::Number(0.0));
    assert_eq!(eval("'abc'.indexOf('z')"), Value::Number(-1.0));
    assert_eq!(eval("'hello world'.search(/o/)"), Value::Number(4.0));
}

#[test]
fn test_extraction() {
    assert_eq!(eval("'hello'.slice(1, -1)"), s("ell"));
    assert_eq!(eval("'hello'.slice(-3)"), s("llo"));
    assert_eq!(eval("'hello'.substring(3, 1)"), s("el"));
    assert_eq!(eval("'hello'.substring(-5, 2)"), s("he"));
    assert_eq!(eval("'hello'.substr(1, 3)"), s("ell"));
    assert_eq!(eval("'hello'.substr(-2)"), s("lo"));
}

#[test]
fn test_case_and_trim() {
    assert_eq!(eval("'MiXeD'.toLowerCase()"), s("mixed"));
    assert_eq!(eval("'MiXeD'.toUpperCase()"), s("MIXED"));
    assert_eq!(eval("'  pad \\n'.trim()"), s("pad"));
    assert_eq!(eval("'  pad  '.trimLeft()"), s("pad  "));
    assert_eq!(eval("'  pad  '.trimRight()"), s("  pad"));
}

#[test]
fn test_concat_and_compare() {
    assert_eq!(eval("'a'.concat('b', 1)"), s("ab1"));
    assert_eq!(eval("'a'.localeCompare('b')"), Value::Number(-1.0));
    assert_eq!(eval("'b'.localeCompare('b')"), Value::Number(0.0));
}

#[test]
fn test_split() {
    assert_eq!(eval("'a,b,,c'.split(',').length"), Value::Number(4.0));
    assert_eq!(eval("'abc'.split('').join('|')"), s("a|b|c"));
    assert_eq!(eval("'a1b22c'.split(/\\d+/).join('|')"), s("a|b|c"));
    assert_eq!(eval("'a,b,c'.split(',', 2).join('|')"), s("a|b"));
    assert_eq!(eval("'abc'.split().length"), Value::Number(1.0));
    assert_eq!(eval("'a1b'.split(/(\\d)/).join('|')"), s("a|1|b"));
}

#[test]
fn test_replace_with_string() {
    assert_eq!(eval("'aaa'.replace('a', 'b')"), s("baa"));
    assert_eq!(eval("'aaa'.replace(/a/g, 'b')"), s("bbb"));
    assert_eq!(eval("'john smith'.replace(/(\\w+) (\\w+)/, '$2, $1')"), s("smith, john"));
    assert_eq!(eval("'abc'.replace('b', '[$&]')"), s("a[b]c"));
}

#[test]
fn test_replace_with_function() {
    let code = r#"
        'a1b2'.replace(/\d/g, function (digit, offset, whole) {
            return '<' + digit * 2 + '@' + offset + '/' + whole.length + '>';
        })
    "#;
    assert_eq!(eval(code), s("a<2@1/4>b<4@3/4>"));
    assert_eq!(eval("'x-y'.replace('-', function (m) { return m + m; })"), s("x--y"));
}

#[test]
fn test_match() {
    assert_eq!(eval("'a1b22'.match(/\\d+/g).join('|')"), s("1|22"));
    assert_eq!(eval("'abc'.match(/z/g)"), Value::Null);
    assert_eq!(eval("var m = 'key=value'.match(/(\\w+)=(\\w+)/); m[2] + m.index"), s("value0"));
}

#[test]
fn test_string_constructor() {
    assert_eq!(eval("String(123)"), s("123"));
    assert_eq!(eval("String(null)"), s("null"));
    assert_eq!(eval("String([1, 2])"), s("1,2"));
    assert_eq!(eval("typeof new String('x')"), s("object"));
    assert_eq!(eval("new String('x').valueOf()"), s("x"));
}

#[test]
fn test_methods_on_string_objects() {
    assert_eq!(eval("new String('abc').charAt(1)"), s("b"));
    assert_eq!(eval("String.prototype.toUpperCase.call(true)"), s("TRUE"));
}
