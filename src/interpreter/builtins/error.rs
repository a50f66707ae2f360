//! Error constructor built-in methods

use std::rc::Rc;

use crate::error::{ErrorKind, JsError};
use crate::interpreter::Interpreter;
use crate::interpreter::builtins::arg;
use crate::value::{FunctionKind, JsString, Property, Value};

/// Initialize Error and all derived error constructors and add them to globals
pub fn init_errors(interp: &mut Interpreter) -> Result<(), JsError> {
    for kind in ErrorKind::ALL {
        let proto = interp.error_prototype(kind);
        interp.register_value(proto, "name", Value::from(kind.name()))?;
        interp.register_value(proto, "message", Value::from(""))?;

        let constructor = interp.alloc_function(
            kind.name(),
            FunctionKind::Native {
                func: Rc::new(move |interp: &mut Interpreter, _this: Value, args: &[Value]| {
                    error_constructor(interp, kind, args)
                }),
                constructor: true,
            },
            1,
        );
        interp.heap.object_mut(constructor)?.properties.insert(
            JsString::from("prototype"),
            Property::frozen(Value::Object(proto)),
        );
        interp.register_value(proto, "constructor", Value::Object(constructor))?;
        interp.register_global(kind.name(), Value::Object(constructor))?;
    }

    let error_proto = interp.error_prototype(ErrorKind::Error);
    interp.register_method(error_proto, "toString", error_to_string, 0)?;
    Ok(())
}

/// `Error(message)` and `new Error(message)` both produce a fresh error
/// object carrying `message` and a `stack` trace of the current calls
fn error_constructor(interp: &mut Interpreter, kind: ErrorKind, args: &[Value]) -> Result<Value, JsError> {
    let message = match arg(args, 0) {
        Value::Undefined => JsString::from(""),
        value => interp.to_string(&value)?,
    };
    let error = interp.create_error(kind, message.as_str())?;
    Ok(Value::Object(error))
}

/// Error.prototype.toString()
pub fn error_to_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    if this.as_object().is_none() {
        return Err(JsError::type_error(
            "Error.prototype.toString called on non-object",
        ));
    }
    Ok(Value::from(interp.error_to_string(&this)?))
}
