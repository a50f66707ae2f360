//! Objects, prototypes, accessors and the Object builtins

use super::{eval, s, throws_error};
use jsstep::Value;

#[test]
fn test_object_literal_and_access() {
    assert_eq!(eval("var o = {a: 1, 'b c': 2, 3: 'three'}; o.a + o['b c']"), Value::Number(3.0));
    assert_eq!(eval("var o = {3: 'three'}; o[3]"), s("three"));
}

#[test]
fn test_prototype_chain_read() {
    let code = r#"
        var base = {greet: 'hello', shadowed: 'base'};
        var child = Object.create(base);
        child.shadowed = 'child';
        child.greet + ' ' + child.shadowed + ' ' + base.shadowed
    "#;
    assert_eq!(eval(code), s("hello child base"));
}

#[test]
fn test_write_creates_own_property() {
    let code = r#"
        var base = {v: 1};
        var child = Object.create(base);
        child.v = 2;
        base.v + ',' + child.v + ',' + child.hasOwnProperty('v')
    "#;
    assert_eq!(eval(code), s("1,2,true"));
}

#[test]
fn test_getter_and_setter_literal() {
    let code = r#"
        var o = {
            _v: 1,
            get v() { return this._v * 10; },
            set v(x) { this._v = x; }
        };
        o.v = 5;
        o.v
    "#;
    assert_eq!(eval(code), Value::Number(50.0));
}

#[test]
fn test_define_property_accessor() {
    let code = r#"
        var log = [];
        var o = {};
        Object.defineProperty(o, 'x', {
            get: function () { log.push('get'); return 42; },
            set: function (v) { log.push('set ' + v); },
            enumerable: false,
            configurable: true
        });
        o.x = 7;
        var r = o.x;
        log.join(',') + '|' + r + '|' + Object.keys(o).length
    "#;
    assert_eq!(eval(code), s("set 7,get|42|0"));
}

#[test]
fn test_inherited_setter_runs() {
    let code = r#"
        var seen;
        var proto = {};
        Object.defineProperty(proto, 'x', { set: function (v) { seen = v; } });
        var o = Object.create(proto);
        o.x = 'via proto';
        seen + ',' + o.hasOwnProperty('x')
    "#;
    assert_eq!(eval(code), s("via proto,false"));
}

#[test]
fn test_non_writable_property() {
    let code = r#"
        var o = {};
        Object.defineProperty(o, 'fixed', { value: 1, writable: false });
        o.fixed = 2;
        o.fixed
    "#;
    assert_eq!(eval(code), Value::Number(1.0));
}

#[test]
fn test_non_writable_property_strict_throws() {
    let code = r#"
        'use strict';
        var o = {};
        Object.defineProperty(o, 'fixed', { value: 1 });
        o.fixed = 2;
    "#;
    assert!(throws_error(code, "read only"));
}

#[test]
fn test_strict_program_rejects_undeclared_assignment() {
    assert!(throws_error("'use strict'; undeclared = 1; 'no error'", "ReferenceError: undeclared is not defined"));
    assert_eq!(eval("undeclared = 1; typeof undeclared"), s("number"));
}

#[test]
fn test_strict_program_rejects_frozen_write() {
    let code = r#"
        'use strict';
        var o = Object.freeze({});
        o.a = 1;
        'no error'
    "#;
    assert!(throws_error(code, "TypeError"));
    assert_eq!(eval("var o = Object.freeze({}); o.a = 1; typeof o.a"), s("undefined"));
}

#[test]
fn test_strict_program_delete_non_configurable_throws() {
    let code = r#"
        'use strict';
        var o = {};
        Object.defineProperty(o, 'fixed', { value: 1 });
        delete o.fixed;
    "#;
    assert!(throws_error(code, "Cannot delete property 'fixed'"));
}

#[test]
fn test_strict_program_caught_in_guest() {
    let code = r#"
        'use strict';
        var name;
        try { missing = 1; } catch (e) { name = e.name; }
        name
    "#;
    assert_eq!(eval(code), s("ReferenceError"));
}

#[test]
fn test_get_own_property_descriptor() {
    let code = r#"
        var d = Object.getOwnPropertyDescriptor({a: 1}, 'a');
        [d.value, d.writable, d.enumerable, d.configurable].join(',')
    "#;
    assert_eq!(eval(code), s("1,true,true,true"));
}

#[test]
fn test_define_properties_and_create_with_descriptors() {
    let code = r#"
        var o = Object.create({}, {
            a: { value: 1, enumerable: true },
            b: { value: 2 }
        });
        Object.defineProperties(o, { c: { value: 3, enumerable: true } });
        Object.keys(o).join(',') + '|' + Object.getOwnPropertyNames(o).join(',')
    "#;
    assert_eq!(eval(code), s("a,c|a,b,c"));
}

#[test]
fn test_keys_order_puts_indices_first() {
    assert_eq!(eval("Object.keys({b: 1, 2: 1, a: 1, 1: 1}).join(',')"), s("1,2,b,a"));
}

#[test]
fn test_freeze_and_seal() {
    let code = r#"
        var o = Object.freeze({a: 1});
        o.a = 2;
        o.b = 3;
        [o.a, o.b, Object.isFrozen(o), Object.isSealed(o), Object.isExtensible(o)].join(',')
    "#;
    assert_eq!(eval(code), s("1,,true,true,false"));

    let code = r#"
        var o = Object.seal({a: 1});
        o.a = 2;
        delete o.a;
        o.a + ',' + Object.isFrozen(o)
    "#;
    assert_eq!(eval(code), s("2,false"));
}

#[test]
fn test_prevent_extensions() {
    assert_eq!(
        eval("var o = Object.preventExtensions({}); o.x = 1; o.x"),
        Value::Undefined
    );
}

#[test]
fn test_get_prototype_of() {
    assert_eq!(eval("Object.getPrototypeOf([]) === Array.prototype"), Value::Boolean(true));
    assert_eq!(eval("var p = {}; Object.getPrototypeOf(Object.create(p)) === p"), Value::Boolean(true));
    assert_eq!(eval("Object.getPrototypeOf(Object.create(null))"), Value::Null);
}

#[test]
fn test_object_to_string_classes() {
    assert_eq!(eval("Object.prototype.toString.call([])"), s("[object Array]"));
    assert_eq!(eval("Object.prototype.toString.call(null)"), s("[object Null]"));
    assert_eq!(eval("Object.prototype.toString.call(new Date(0))"), s("[object Date]"));
    assert_eq!(eval("Object.prototype.toString.call(/x/)"), s("[object RegExp]"));
    assert_eq!(eval("Object.prototype.toString.call(function () {})"), s("[object Function]"));
}

#[test]
fn test_property_is_enumerable_and_is_prototype_of() {
    assert_eq!(eval("({a: 1}).propertyIsEnumerable('a')"), Value::Boolean(true));
    assert_eq!(eval("[].propertyIsEnumerable('length')"), Value::Boolean(false));
    assert_eq!(eval("Array.prototype.isPrototypeOf([])"), Value::Boolean(true));
}

#[test]
fn test_boxed_primitives() {
    assert_eq!(eval("typeof new Number(5)"), s("object"));
    assert_eq!(eval("new Number(5) + 1"), Value::Number(6.0));
    assert_eq!(eval("new String('ab').length"), Value::Number(2.0));
    assert_eq!(eval("new Boolean(false) ? 'truthy' : 'falsy'"), s("truthy"));
    assert_eq!(eval("'abc'.length"), Value::Number(3.0));
}

#[test]
fn test_object_constructor_wraps_primitives() {
    assert_eq!(eval("typeof Object('s')"), s("object"));
    assert_eq!(eval("var o = {}; Object(o) === o"), Value::Boolean(true));
}
