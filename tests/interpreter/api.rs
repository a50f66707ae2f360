//! Host embedding API: natives, asynchronous calls, property access and
//! native/guest value conversion

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::s;
use jsstep::{
    AsyncCallback, ErrorKind, Interpreter, InterpreterConfig, JsError, PropertyDescriptor,
    PropertyResult, SetResult, Value,
};
use serde_json::json;

fn interpreter_with<F>(code: &str, init: F) -> Interpreter
where
    F: FnOnce(&mut Interpreter, jsstep::ObjectId) -> Result<(), JsError>,
{
    match Interpreter::with_init(code, InterpreterConfig::default(), init) {
        Ok(interp) => interp,
        Err(e) => panic!("construction failed: {}", e),
    }
}

fn install(interp: &mut Interpreter, global: jsstep::ObjectId, name: &str, value: Value) -> Result<(), JsError> {
    interp.set_property(&Value::Object(global), name, value, None).map(|_| ())
}

#[test]
fn test_native_function_from_host() {
    let mut interp = interpreter_with("double(21) + ':' + double.name", |interp, global| {
        let double = interp.create_native_function(
            "double",
            |interp, _this, args| {
                let n = interp.to_number(args.first().unwrap_or(&Value::Undefined))?;
                Ok(Value::Number(n * 2.0))
            },
            1,
        );
        install(interp, global, "double", Value::Object(double))
    });
    assert!(matches!(interp.run(), Ok(false)));
    assert_eq!(interp.value(), s("42:double"));
}

#[test]
fn test_native_receives_this_and_captures_host_state() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let mut interp = interpreter_with("var o = {tag: 'obj', record: record}; o.record('a'); o.record('b');", move |interp, global| {
        let record = interp.create_native_function(
            "record",
            move |interp, this, args| {
                let tag = match interp.get_property(&this, "tag")? {
                    PropertyResult::Value(v) => interp.to_string(&v)?.to_string(),
                    PropertyResult::Accessor { .. } => String::from("?"),
                };
                let arg = interp.to_string(args.first().unwrap_or(&Value::Undefined))?;
                log.borrow_mut().push(format!("{}:{}", tag, arg));
                Ok(Value::Undefined)
            },
            1,
        );
        install(interp, global, "record", Value::Object(record))
    });
    assert!(matches!(interp.run(), Ok(false)));
    assert_eq!(*seen.borrow(), vec!["obj:a".to_string(), "obj:b".to_string()]);
}

#[test]
fn test_native_errors_become_guest_exceptions() {
    let mut interp = interpreter_with(
        "var r; try { fail(); } catch (e) { r = e.name + '/' + e.message; } r",
        |interp, global| {
            let fail = interp.create_native_function(
                "fail",
                |_, _, _| Err(JsError::type_error("host said no")),
                0,
            );
            install(interp, global, "fail", Value::Object(fail))
        },
    );
    assert!(matches!(interp.run(), Ok(false)));
    assert_eq!(interp.value(), s("TypeError/host said no"));
}

#[test]
fn test_native_can_throw_arbitrary_values() {
    let mut interp = interpreter_with(
        "var r; try { raise(); } catch (e) { r = e; } r",
        |interp, global| {
            let raise = interp.create_native_function("raise", |_, _, _| Err(JsError::Thrown(Value::Number(7.0))), 0);
            install(interp, global, "raise", Value::Object(raise))
        },
    );
    assert!(matches!(interp.run(), Ok(false)));
    assert_eq!(interp.value(), Value::Number(7.0));
}

#[test]
fn test_host_functions_are_not_constructors() {
    let mut interp = interpreter_with("var r; try { new f(); } catch (e) { r = e.name; } r", |interp, global| {
        let f = interp.create_native_function("f", |_, _, _| Ok(Value::Null), 0);
        install(interp, global, "f", Value::Object(f))
    });
    assert!(matches!(interp.run(), Ok(false)));
    assert_eq!(interp.value(), s("TypeError"));
}

/// Install `fetch(x)`: an asynchronous native recording its callback token
fn async_interpreter(code: &str) -> (Interpreter, Rc<Cell<Option<AsyncCallback>>>, Rc<RefCell<Vec<Value>>>) {
    let token = Rc::new(Cell::new(None));
    let calls = Rc::new(RefCell::new(Vec::new()));
    let (token_slot, call_log) = (Rc::clone(&token), Rc::clone(&calls));
    let interp = interpreter_with(code, move |interp, global| {
        let fetch = interp.create_async_function(
            "fetch",
            move |_, _, args, callback| {
                call_log.borrow_mut().push(args.first().cloned().unwrap_or_default());
                token_slot.set(Some(callback));
                Ok(())
            },
            1,
        );
        install(interp, global, "fetch", Value::Object(fetch))
    });
    (interp, token, calls)
}

#[test]
fn test_async_call_pauses_until_resumed() {
    let (mut interp, token, calls) = async_interpreter("var got = fetch('url'); 'got ' + got");
    assert!(matches!(interp.run(), Ok(true)));
    assert!(interp.is_paused());
    assert_eq!(*calls.borrow(), vec![s("url")]);

    // Stepping while paused makes no progress
    assert!(matches!(interp.step(), Ok(true)));
    assert!(interp.is_paused());

    let Some(callback) = token.get() else {
        panic!("async native never ran");
    };
    assert!(interp.resume_async(callback, s("data")).is_ok());
    assert!(!interp.is_paused());
    assert!(matches!(interp.run(), Ok(false)));
    assert_eq!(interp.value(), s("got data"));
}

#[test]
fn test_async_callback_is_single_use() {
    let (mut interp, token, _) = async_interpreter("fetch(1) + fetch(2)");
    assert!(matches!(interp.run(), Ok(true)));
    let Some(first) = token.get() else {
        panic!("async native never ran");
    };
    assert!(interp.resume_async(first, Value::Number(10.0)).is_ok());
    assert!(interp.resume_async(first, Value::Number(11.0)).is_err());

    assert!(matches!(interp.run(), Ok(true)));
    let Some(second) = token.get() else {
        panic!("async native never ran");
    };
    assert_ne!(first, second);
    assert!(interp.resume_async(second, Value::Number(5.0)).is_ok());
    assert!(matches!(interp.run(), Ok(false)));
    assert_eq!(interp.value(), Value::Number(15.0));
}

#[test]
fn test_async_call_rejected_by_host() {
    let code = "var r; try { fetch('x'); r = 'resolved'; } catch (e) { r = e.name + ': ' + e.message; } r";
    let (mut interp, token, _) = async_interpreter(code);
    assert!(matches!(interp.run(), Ok(true)));
    assert!(interp.throw_exception(ErrorKind::URIError, "unreachable host").is_ok());
    assert!(!interp.is_paused());
    assert!(matches!(interp.run(), Ok(false)));
    assert_eq!(interp.value(), s("URIError: unreachable host"));

    // The abandoned token no longer resumes anything
    if let Some(callback) = token.get() {
        assert!(interp.resume_async(callback, Value::Null).is_err());
    }
}

#[test]
fn test_uncaught_host_rejection_is_returned() {
    let (mut interp, _, _) = async_interpreter("fetch('x'); 'unreached'");
    assert!(matches!(interp.run(), Ok(true)));
    match interp.throw_exception(ErrorKind::Error, "offline") {
        Err(JsError::RuntimeError { kind, message, .. }) => {
            assert_eq!(kind, ErrorKind::Error);
            assert_eq!(message, "offline");
        }
        other => panic!("expected the rejection to escape, got {:?}", other),
    }
}

#[test]
fn test_get_and_set_property_from_host() {
    let mut interp = interpreter_with("var config = {mode: 'fast'}; var seen;", |_, _| Ok(()));
    assert!(matches!(interp.run(), Ok(false)));
    let global = Value::Object(interp.global_object());

    let config = match interp.get_property(&global, "config") {
        Ok(PropertyResult::Value(v)) => v,
        other => panic!("config missing: {:?}", other),
    };
    assert!(matches!(
        interp.get_property(&config, "mode"),
        Ok(PropertyResult::Value(Value::String(ref m))) if m.as_str() == "fast"
    ));

    assert_eq!(interp.set_property(&config, "mode", s("safe"), None).ok(), Some(SetResult::Done));
    let hidden = PropertyDescriptor {
        value: Some(Value::Number(3.0)),
        writable: Some(false),
        enumerable: Some(false),
        configurable: Some(false),
        ..PropertyDescriptor::default()
    };
    assert!(interp.set_property(&config, "limit", Value::Undefined, Some(&hidden)).is_ok());

    assert!(interp
        .append_code("config.limit = 99; seen = config.mode + ',' + config.limit + ',' + Object.keys(config).join('|'); seen")
        .is_ok());
    assert!(matches!(interp.run(), Ok(false)));
    assert_eq!(interp.value(), s("safe,3,mode"));
}

#[test]
fn test_accessor_property_reported_to_host() {
    let mut interp = interpreter_with("var o = {get lazy() { return 1; }};", |_, _| Ok(()));
    assert!(matches!(interp.run(), Ok(false)));
    let global = Value::Object(interp.global_object());
    let o = match interp.get_property(&global, "o") {
        Ok(PropertyResult::Value(v)) => v,
        other => panic!("o missing: {:?}", other),
    };
    assert!(matches!(interp.get_property(&o, "lazy"), Ok(PropertyResult::Accessor { .. })));
}

#[test]
fn test_native_to_pseudo() {
    let mut interp = interpreter_with("", |_, _| Ok(()));
    let value = interp.native_to_pseudo(&json!({"name": "x", "tags": [1, 2.5, null, true], "nested": {"k": "v"}}));
    let global = interp.global_object();
    assert!(install(&mut interp, global, "input", value).is_ok());
    assert!(interp
        .append_code("input.name + input.tags.length + input.tags[1] + input.nested.k + Object.keys(input).join()")
        .is_ok());
    assert!(matches!(interp.run(), Ok(false)));
    assert_eq!(interp.value(), s("x42.5vname,tags,nested"));
}

#[test]
fn test_pseudo_to_native() {
    let mut interp = interpreter_with(
        "({id: 7, ratio: 0.5, list: [1, 'two', undefined], skip: undefined, fn: function () {}, when: new Date(0)})",
        |_, _| Ok(()),
    );
    assert!(matches!(interp.run(), Ok(false)));
    let native = interp.pseudo_to_native(interp.value());
    assert_eq!(
        native.ok(),
        Some(json!({
            "id": 7,
            "ratio": 0.5,
            "list": [1, "two", null],
            "when": "1970-01-01T00:00:00.000Z"
        }))
    );
}

#[test]
fn test_pseudo_to_native_rejects_cycles() {
    let mut interp = interpreter_with("var a = {}; a.a = a; a", |_, _| Ok(()));
    assert!(matches!(interp.run(), Ok(false)));
    assert!(matches!(interp.pseudo_to_native(interp.value()), Err(JsError::TypeError { .. })));
}

#[test]
fn test_create_object_and_array_from_host() {
    let mut interp = interpreter_with("", |_, _| Ok(()));
    let list = interp.create_array(vec![Value::Number(1.0), s("b")]);
    let holder = interp.create_object();
    assert!(interp.set_property(&Value::Object(holder), "list", Value::Object(list), None).is_ok());
    let global = interp.global_object();
    assert!(install(&mut interp, global, "holder", Value::Object(holder)).is_ok());
    assert!(interp.append_code("Array.isArray(holder.list) && holder.list.join('+')").is_ok());
    assert!(matches!(interp.run(), Ok(false)));
    assert_eq!(interp.value(), s("1+b"));
}

#[test]
fn test_set_prototype_from_host() {
    let mut interp = interpreter_with("var base = {greet: function () { return 'hi ' + this.n; }}; var o = {n: 1};", |_, _| Ok(()));
    assert!(matches!(interp.run(), Ok(false)));
    let global = Value::Object(interp.global_object());
    let (Ok(PropertyResult::Value(Value::Object(base))), Ok(PropertyResult::Value(Value::Object(o)))) =
        (interp.get_property(&global, "base"), interp.get_property(&global, "o"))
    else {
        panic!("globals missing");
    };

    assert!(interp.set_prototype(o, Some(base)).is_ok());
    assert_eq!(interp.get_prototype(&Value::Object(o)).ok(), Some(Some(base)));
    assert!(matches!(interp.set_prototype(base, Some(o)), Err(JsError::TypeError { .. })));

    assert!(interp.append_code("o.greet()").is_ok());
    assert!(matches!(interp.run(), Ok(false)));
    assert_eq!(interp.value(), s("hi 1"));
}
