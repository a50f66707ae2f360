//! Functions, closures, `this`, call/apply/bind and the Function constructor

use super::{eval, s, throws_error};
use jsstep::Value;

#[test]
fn test_function_declaration_hoisting() {
    assert_eq!(eval("var r = twice(4); function twice(x) { return x * 2; } r"), Value::Number(8.0));
}

#[test]
fn test_var_hoisting_is_undefined() {
    assert_eq!(eval("var r = typeof later; var later = 1; r"), s("undefined"));
}

#[test]
fn test_closures_capture_variables() {
    let code = r#"
        function counter() {
            var n = 0;
            return function () { return ++n; };
        }
        var c = counter();
        c(); c();
        c()
    "#;
    assert_eq!(eval(code), Value::Number(3.0));
}

#[test]
fn test_parameter_shadowing() {
    let code = r#"
        var x = 'global';
        function f(x) { x = 'param'; return x; }
        f('arg') + ',' + x
    "#;
    assert_eq!(eval(code), s("param,global"));
}

#[test]
fn test_local_shadows_global() {
    let code = r#"
        var x = 1;
        function f() { var x = 2; return x; }
        f() + x
    "#;
    assert_eq!(eval(code), Value::Number(3.0));
}

#[test]
fn test_recursion() {
    assert_eq!(
        eval("function fib(n) { return n < 2 ? n : fib(n - 1) + fib(n - 2); } fib(15)"),
        Value::Number(610.0)
    );
}

#[test]
fn test_arguments_object() {
    assert_eq!(eval("function f() { return arguments.length; } f(1, 2, 3)"), Value::Number(3.0));
    assert_eq!(eval("function f(a) { return arguments[1]; } f(1, 'b')"), s("b"));
}

#[test]
fn test_missing_arguments_are_undefined() {
    assert_eq!(eval("function f(a, b) { return b; } f(1)"), Value::Undefined);
}

#[test]
fn test_named_function_expression_binding() {
    assert_eq!(
        eval("var f = function fact(n) { return n <= 1 ? 1 : n * fact(n - 1); }; f(5)"),
        Value::Number(120.0)
    );
}

#[test]
fn test_method_this() {
    assert_eq!(eval("var o = {v: 7, get: function () { return this.v; }}; o.get()"), Value::Number(7.0));
}

#[test]
fn test_constructor_and_prototype() {
    let code = r#"
        function Point(x, y) { this.x = x; this.y = y; }
        Point.prototype.sum = function () { return this.x + this.y; };
        var p = new Point(2, 3);
        p.sum() + (p instanceof Point ? 100 : 0)
    "#;
    assert_eq!(eval(code), Value::Number(105.0));
}

#[test]
fn test_constructor_returning_object() {
    assert_eq!(eval("function F() { return {tag: 'own'}; } new F().tag"), s("own"));
    assert_eq!(eval("function F() { this.tag = 'this'; return 1; } new F().tag"), s("this"));
}

#[test]
fn test_call_and_apply() {
    let code = r#"
        function describe(greeting, mark) { return greeting + ' ' + this.name + mark; }
        var who = {name: 'Ada'};
        describe.call(who, 'Hi', '!') + '|' + describe.apply(who, ['Bye', '?'])
    "#;
    assert_eq!(eval(code), s("Hi Ada!|Bye Ada?"));
}

#[test]
fn test_bind() {
    let code = r#"
        function add(a, b) { return this.base + a + b; }
        var bound = add.bind({base: 100}, 10);
        bound(1) + bound.length
    "#;
    assert_eq!(eval(code), Value::Number(112.0));
}

#[test]
fn test_function_length_and_name() {
    assert_eq!(eval("function f(a, b, c) {} f.length"), Value::Number(3.0));
    assert_eq!(eval("function named() {} named.name"), s("named"));
}

#[test]
fn test_function_constructor() {
    assert_eq!(eval("var add = new Function('a', 'b', 'return a + b'); add(2, 3)"), Value::Number(5.0));
    assert_eq!(eval("Function('return 42')()"), Value::Number(42.0));
}

#[test]
fn test_function_constructor_uses_global_scope() {
    let code = r#"
        var x = 'global';
        function f() { var x = 'local'; return Function('return x')(); }
        f()
    "#;
    assert_eq!(eval(code), s("global"));
}

#[test]
fn test_function_to_string_returns_source() {
    assert_eq!(eval("(function (a) { return a; }).toString()"), s("function (a) { return a; }"));
}

#[test]
fn test_calling_non_function_throws() {
    assert!(throws_error("var x = 1; x()", "is not a function"));
}

#[test]
fn test_strict_mode_this_is_undefined() {
    assert_eq!(eval("function f() { 'use strict'; return this; } f()"), Value::Undefined);
    assert_eq!(eval("function f() { return typeof this; } f()"), s("object"));
}

#[test]
fn test_eval_direct() {
    assert_eq!(eval("var a = 2; eval('a * 21')"), Value::Number(42.0));
    assert_eq!(eval("eval('var fromEval = 5'); fromEval"), Value::Number(5.0));
}
