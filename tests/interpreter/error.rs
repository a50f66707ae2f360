//! Error objects, native errors surfacing in guest code, and host errors

use super::{eval, eval_result, s, throws_error};
use jsstep::{ErrorKind, JsError, Value};

#[test]
fn test_error_constructors() {
    assert_eq!(eval("new Error('boom').message"), s("boom"));
    assert_eq!(eval("Error('no new').message"), s("no new"));
    assert_eq!(eval("new RangeError('r').name"), s("RangeError"));
    assert_eq!(eval("new Error().message"), s(""));
    assert_eq!(eval("Object.keys(new Error('x')).length"), Value::Number(0.0));
}

#[test]
fn test_error_hierarchy() {
    let code = r#"
        var kinds = [EvalError, RangeError, ReferenceError, SyntaxError, TypeError, URIError];
        var ok = true;
        for (var i = 0; i < kinds.length; i++) {
            var e = new kinds[i]('m');
            if (!(e instanceof kinds[i]) || !(e instanceof Error)) ok = false;
        }
        ok
    "#;
    assert_eq!(eval(code), Value::Boolean(true));
    assert_eq!(eval("new TypeError('t') instanceof RangeError"), Value::Boolean(false));
    assert_eq!(eval("TypeError.prototype.constructor === TypeError"), Value::Boolean(true));
}

#[test]
fn test_error_to_string() {
    assert_eq!(eval("String(new TypeError('bad type'))"), s("TypeError: bad type"));
    assert_eq!(eval("String(new Error())"), s("Error"));
    assert_eq!(eval("var e = new Error('m'); e.name = 'Custom'; e.toString()"), s("Custom: m"));
    assert_eq!(eval("Error.prototype.toString.call({message: 'plain'})"), s("Error: plain"));
    assert!(throws_error("Error.prototype.toString.call(1)", "non-object"));
}

#[test]
fn test_stack_property() {
    let code = r#"
        function thrower() { throw new Error('s'); }
        var stack;
        try { thrower(); } catch (e) { stack = e.stack; }
        [stack.split('\n')[0], stack.indexOf('at thrower (') > 0].join('|')
    "#;
    assert_eq!(eval(code), s("Error: s|true"));
}

#[test]
fn test_stack_omits_calls_not_yet_entered() {
    let code = r#"
        var stack;
        try { Object.getOwnPropertyNames('ab').join(); } catch (e) { stack = e.stack; }
        [stack.split('\n')[0], stack.indexOf('at join') < 0].join('|')
    "#;
    assert_eq!(eval(code), s("TypeError: Object.getOwnPropertyNames called on non-object|true"));
}

#[test]
fn test_stack_lists_entered_callers() {
    let code = r#"
        function inner() { return null.x; }
        function outer() { return [1].concat(inner()); }
        var stack;
        try { outer(); } catch (e) { stack = e.stack; }
        [stack.indexOf('at inner (') > 0, stack.indexOf('at outer (') > 0, stack.indexOf('at concat') < 0].join()
    "#;
    assert_eq!(eval(code), s("true,true,true"));
}

#[test]
fn test_native_errors_are_catchable() {
    let code = r#"
        var names = [];
        try { undefinedVariable; } catch (e) { names.push(e.name); }
        try { null.x; } catch (e) { names.push(e.name); }
        try { new Array(-1); } catch (e) { names.push(e.name); }
        try { decodeURIComponent('%'); } catch (e) { names.push(e.name); }
        names.join(',')
    "#;
    assert_eq!(eval(code), s("ReferenceError,TypeError,RangeError,URIError"));
}

#[test]
fn test_native_error_messages() {
    let code = "var m; try { undefined.foo; } catch (e) { m = e.message; } m";
    assert_eq!(eval(code), s("Cannot read property 'foo' of undefined"));
    let code = "var m; try { missing; } catch (e) { m = e.message; } m";
    assert_eq!(eval(code), s("missing is not defined"));
}

#[test]
fn test_typeof_undeclared_does_not_throw() {
    assert_eq!(eval("typeof notDeclaredAnywhere"), s("undefined"));
}

#[test]
fn test_uncaught_error_kinds() {
    let cases = [
        ("undefinedThing", ErrorKind::ReferenceError),
        ("null.x", ErrorKind::TypeError),
        ("throw new SyntaxError('s')", ErrorKind::SyntaxError),
        ("throw new URIError('u')", ErrorKind::URIError),
    ];
    for (source, expected) in cases {
        match eval_result(source) {
            Err(JsError::RuntimeError { kind, .. }) => assert_eq!(kind, expected, "source: {}", source),
            other => panic!("{}: expected a runtime error, got {:?}", source, other),
        }
    }
}

#[test]
fn test_uncaught_custom_name_maps_to_error() {
    match eval_result("var e = new Error('m'); e.name = 'MyError'; throw e") {
        Err(JsError::RuntimeError { kind, message, .. }) => {
            assert_eq!(kind, ErrorKind::Error);
            assert_eq!(message, "m");
        }
        other => panic!("expected a runtime error, got {:?}", other),
    }
}

#[test]
fn test_uncaught_display() {
    match eval_result("throw new TypeError('shown')") {
        Err(e) => assert_eq!(e.to_string(), "TypeError: shown"),
        Ok(v) => panic!("expected an error, got {:?}", v),
    }
}

#[test]
fn test_syntax_error_at_parse_time() {
    match eval_result("var = 1;") {
        Err(JsError::SyntaxError { location, .. }) => assert_eq!(location.line, 1),
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn test_syntax_error_in_eval_is_catchable() {
    assert_eq!(eval("var r; try { eval('1 +'); } catch (e) { r = e.name; } r"), s("SyntaxError"));
}
