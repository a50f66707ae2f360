//! Boolean built-in

use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::interpreter::builtins::arg;
use crate::value::{ObjectKind, Value};

pub fn init_boolean(interp: &mut Interpreter) -> Result<(), JsError> {
    let proto = interp.realm.boolean_prototype;
    interp.register_constructor("Boolean", boolean_constructor, 1, proto)?;
    interp.register_method(proto, "toString", boolean_to_string, 0)?;
    interp.register_method(proto, "valueOf", boolean_value_of, 0)?;
    Ok(())
}

pub fn boolean_constructor(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let b = arg(args, 0).to_boolean();
    if interp.called_with_new() {
        if let Value::Object(id) = this {
            interp.heap.object_mut(id)?.kind = ObjectKind::Boolean(b);
            return Ok(this);
        }
    }
    Ok(Value::Boolean(b))
}

fn this_boolean(interp: &Interpreter, this: &Value) -> Result<bool, JsError> {
    match this {
        Value::Boolean(b) => Ok(*b),
        Value::Object(id) => match interp.heap.object(*id)?.kind {
            ObjectKind::Boolean(b) => Ok(b),
            _ => Err(JsError::type_error("Boolean.prototype method called on incompatible receiver")),
        },
        _ => Err(JsError::type_error("Boolean.prototype method called on incompatible receiver")),
    }
}

pub fn boolean_to_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    Ok(Value::from(if this_boolean(interp, &this)? { "true" } else { "false" }))
}

pub fn boolean_value_of(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    Ok(Value::Boolean(this_boolean(interp, &this)?))
}
