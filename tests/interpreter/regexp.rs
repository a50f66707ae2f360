//! RegExp tests, including the execution modes

use super::{eval, eval_with_config, s, throws_error};
use jsstep::{InterpreterConfig, JsError, RegexMode, Value};

fn config(mode: RegexMode) -> InterpreterConfig {
    InterpreterConfig {
        regex_mode: mode,
        ..InterpreterConfig::default()
    }
}

#[test]
fn test_literal_properties() {
    assert_eq!(eval("/ab+c/gi.source"), s("ab+c"));
    assert_eq!(eval("var r = /x/gm; [r.global, r.ignoreCase, r.multiline, r.lastIndex].join()"), s("true,false,true,0"));
    assert_eq!(eval("String(/a\\/b/g)"), s("/a\\/b/g"));
    assert_eq!(eval("new RegExp('').toString()"), s("/(?:)/"));
}

#[test]
fn test_exec_returns_groups_and_index() {
    let code = r#"
        var m = /(\d+)-(\d+)/.exec('call 555-1234 now');
        [m[0], m[1], m[2], m.index, m.input.length].join('|')
    "#;
    assert_eq!(eval(code), s("555-1234|555|1234|5|17"));
    assert_eq!(eval("/z/.exec('abc')"), Value::Null);
    assert_eq!(eval("/(a)|(b)/.exec('b')[1]"), Value::Undefined);
}

#[test]
fn test_global_exec_advances_last_index() {
    let code = r#"
        var re = /o/g, positions = [], m;
        while ((m = re.exec('foo boo')) !== null) {
            positions.push(m.index + ':' + re.lastIndex);
        }
        positions.join(',') + '|' + re.lastIndex
    "#;
    assert_eq!(eval(code), s("1:2,2:3,5:6,6:7|0"));
}

#[test]
fn test_non_global_exec_ignores_last_index() {
    assert_eq!(eval("var re = /a/; re.lastIndex = 3; re.exec('aaa').index"), Value::Number(0.0));
}

#[test]
fn test_test_method() {
    assert_eq!(eval("/^\\w+$/.test('hello')"), Value::Boolean(true));
    assert_eq!(eval("/^\\w+$/.test('hello world')"), Value::Boolean(false));
    assert_eq!(eval("var re = /a/g; [re.test('a'), re.test('a')].join()"), s("true,false"));
}

#[test]
fn test_flags() {
    assert_eq!(eval("/HELLO/i.test('say hello')"), Value::Boolean(true));
    assert_eq!(eval("'one\\ntwo'.match(/^two$/m) !== null"), Value::Boolean(true));
    assert_eq!(eval("'one\\ntwo'.match(/^two$/) === null"), Value::Boolean(true));
}

#[test]
fn test_constructor() {
    assert_eq!(eval("new RegExp('a+', 'g').test('caab')"), Value::Boolean(true));
    assert_eq!(eval("var r = /x/; RegExp(r) === r"), Value::Boolean(true));
    assert_eq!(eval("var r = /x/; new RegExp(r) === r"), Value::Boolean(false));
    assert!(throws_error("new RegExp('a', 'q')", "Invalid flags"));
    assert!(throws_error("new RegExp('(')", "SyntaxError"));
}

#[test]
fn test_utf16_indices() {
    assert_eq!(eval("/b/.exec('\\u00e9\\ud83d\\ude00b').index"), Value::Number(3.0));
}

#[test]
fn test_inline_mode_matches_thread_mode() {
    let code = "'a1b2c3'.replace(/\\d/g, '#') + /c/.exec('abc').index";
    let inline = eval_with_config(code, config(RegexMode::Inline));
    let thread = eval_with_config(code, config(RegexMode::Thread));
    match (inline, thread) {
        (Ok(a), Ok(b)) => {
            assert_eq!(a, s("a#b#c#2"));
            assert_eq!(a, b);
        }
        other => panic!("regex modes disagreed: {:?}", other),
    }
}

#[test]
fn test_refuse_mode_throws_on_use() {
    let result = eval_with_config("/a/.test('a')", config(RegexMode::Refuse));
    match result {
        Err(e @ JsError::RuntimeError { .. }) => {
            assert!(e.to_string().contains("Regular expressions are disabled"));
        }
        other => panic!("expected the regex to be refused, got {:?}", other),
    }
}

#[test]
fn test_refuse_mode_error_is_catchable() {
    let code = "var r; try { 'abc'.search(/b/); } catch (e) { r = e.message; } r";
    assert_eq!(
        eval_with_config(code, config(RegexMode::Refuse)).ok(),
        Some(s("Regular expressions are disabled"))
    );
}

#[test]
fn test_refuse_mode_allows_plain_string_methods() {
    let code = "'a-b'.replace('-', '+') + 'x,y'.split(',').length";
    assert_eq!(eval_with_config(code, config(RegexMode::Refuse)).ok(), Some(s("a+b2")));
}

#[test]
fn test_regex_mode_levels() {
    assert_eq!(RegexMode::from_level(0), Some(RegexMode::Refuse));
    assert_eq!(RegexMode::from_level(2), Some(RegexMode::Thread));
    assert_eq!(RegexMode::from_level(3), None);
}

#[test]
fn test_thread_mode_timeout_is_a_guest_error() {
    let code = r#"
        var input = new Array(41).join('a') + 'c';
        var outcome;
        try {
            outcome = /^(a|aa)+(?=b)$/.test(input);
        } catch (e) {
            outcome = e.name + ':' + e.message;
        }
        outcome
    "#;
    let config = InterpreterConfig {
        regex_mode: RegexMode::Thread,
        regex_timeout: std::time::Duration::from_millis(1),
        ..InterpreterConfig::default()
    };
    match eval_with_config(code, config) {
        Ok(Value::String(text)) => {
            assert!(
                text.as_str().starts_with("Error:RegExp Timeout: /^(a|aa)+(?=b)$/"),
                "unexpected outcome {}",
                text
            );
        }
        other => panic!("expected the timeout to be caught, got {:?}", other),
    }
}

#[test]
fn test_thread_mode_timeout_uncaught_reaches_host() {
    let config = InterpreterConfig {
        regex_mode: RegexMode::Thread,
        regex_timeout: std::time::Duration::from_millis(1),
        ..InterpreterConfig::default()
    };
    let code = "/^(a|aa)+(?=b)$/.test(new Array(41).join('a') + 'c')";
    match eval_with_config(code, config) {
        Err(e @ JsError::RuntimeError { .. }) => {
            assert!(e.to_string().starts_with("Error: RegExp Timeout"), "{}", e);
        }
        other => panic!("expected an uncaught timeout, got {:?}", other),
    }
}
