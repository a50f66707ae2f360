//! Statements, loops, labels and exception handling

use super::{eval, eval_result, s, throws_error};
use jsstep::{ErrorKind, JsError, Value};

#[test]
fn test_if_else() {
    assert_eq!(eval("var r; if (1 > 2) { r = 'a'; } else { r = 'b'; } r"), s("b"));
}

#[test]
fn test_loops() {
    assert_eq!(eval("var n = 0; for (var i = 0; i < 10; i++) { n += i; } n"), Value::Number(45.0));
    assert_eq!(eval("var i = 0; while (i < 5) { i++; } i"), Value::Number(5.0));
    assert_eq!(eval("var i = 10; do { i++; } while (i < 5); i"), Value::Number(11.0));
}

#[test]
fn test_break_and_continue() {
    assert_eq!(
        eval("var n = 0; for (var i = 0; i < 10; i++) { if (i % 2) continue; if (i > 6) break; n += i; } n"),
        Value::Number(12.0)
    );
}

#[test]
fn test_labeled_break_leaves_outer_loop() {
    let code = r#"
        var pairs = [];
        outer: for (var i = 0; i < 3; i++) {
            for (var j = 0; j < 3; j++) {
                if (j == 2) continue outer;
                if (i == 2) break outer;
                pairs.push(i + '' + j);
            }
        }
        pairs.join(',')
    "#;
    assert_eq!(eval(code), s("00,01,10,11"));
}

#[test]
fn test_labeled_block_break() {
    assert_eq!(eval("var r = 1; done: { r = 2; break done; r = 3; } r"), Value::Number(2.0));
}

#[test]
fn test_switch_fallthrough_and_default() {
    let code = r#"
        function classify(x) {
            var out = '';
            switch (x) {
                case 1: out += 'one';
                case 2: out += 'two'; break;
                default: out += 'other';
                case 3: out += 'three';
            }
            return out;
        }
        [classify(1), classify(2), classify(3), classify(9)].join('|')
    "#;
    assert_eq!(eval(code), s("onetwo|two|three|otherthree"));
}

#[test]
fn test_for_in_visits_each_key_once() {
    let code = r#"
        function Base() { this.own = 1; }
        Base.prototype.shared = 2;
        Base.prototype.own = 3;
        var seen = [];
        for (var k in new Base()) { seen.push(k); }
        seen.join(',')
    "#;
    assert_eq!(eval(code), s("own,shared"));
}

#[test]
fn test_for_in_skips_deleted_keys() {
    let code = r#"
        var o = {a: 1, b: 2, c: 3}, seen = [];
        for (var k in o) { seen.push(k); delete o.b; }
        seen.join(',')
    "#;
    assert_eq!(eval(code), s("a,c"));
}

#[test]
fn test_for_in_over_array_indices() {
    assert_eq!(eval("var r = ''; for (var i in ['x', 'y']) { r += i; } r"), s("01"));
}

#[test]
fn test_try_catch_finally_order() {
    let code = r#"
        var log = [];
        try {
            log.push('try');
            throw new Error('boom');
        } catch (e) {
            log.push('catch ' + e.message);
        } finally {
            log.push('finally');
        }
        log.join(', ')
    "#;
    assert_eq!(eval(code), s("try, catch boom, finally"));
}

#[test]
fn test_return_in_finally_overrides() {
    let code = r#"
        function f() {
            try { return 'try'; } finally { return 'finally'; }
        }
        f()
    "#;
    assert_eq!(eval(code), s("finally"));
}

#[test]
fn test_finally_runs_on_return() {
    let code = r#"
        var ran = false;
        function f() {
            try { return 1; } finally { ran = true; }
        }
        f() + (ran ? 10 : 0)
    "#;
    assert_eq!(eval(code), Value::Number(11.0));
}

#[test]
fn test_finally_overrides_throw_with_break() {
    let code = r#"
        var r = 'none';
        for (;;) {
            try { throw 'x'; } finally { r = 'broke'; break; }
        }
        r
    "#;
    assert_eq!(eval(code), s("broke"));
}

#[test]
fn test_throw_crosses_call_frames() {
    let code = r#"
        function inner() { throw new TypeError('deep'); }
        function middle() { inner(); return 'unreached'; }
        var caught;
        try { middle(); } catch (e) { caught = e.name + ':' + e.message; }
        caught
    "#;
    assert_eq!(eval(code), s("TypeError:deep"));
}

#[test]
fn test_rethrow_from_catch() {
    let code = r#"
        var r;
        try {
            try { throw 1; } catch (e) { throw e + 1; }
        } catch (e2) { r = e2; }
        r
    "#;
    assert_eq!(eval(code), Value::Number(2.0));
}

#[test]
fn test_catch_scope_is_local() {
    assert_eq!(
        eval("var e = 'outer'; try { throw 'inner'; } catch (e) { } e"),
        s("outer")
    );
}

#[test]
fn test_uncaught_throw_reaches_host() {
    let result = eval_result("throw new RangeError('too far')");
    match result {
        Err(JsError::RuntimeError { kind, message, .. }) => {
            assert_eq!(kind, ErrorKind::RangeError);
            assert_eq!(message, "too far");
        }
        other => panic!("expected a runtime error, got {:?}", other),
    }
}

#[test]
fn test_uncaught_primitive_throw() {
    assert!(throws_error("throw 'plain string'", "plain string"));
}

#[test]
fn test_with_statement() {
    assert_eq!(eval("var o = {x: 2}; var r; with (o) { r = x * 3; } r"), Value::Number(6.0));
    assert_eq!(eval("var o = {x: 2}; with (o) { x = 5; } o.x"), Value::Number(5.0));
}
