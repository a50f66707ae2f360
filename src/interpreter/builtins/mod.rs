//! Built-in objects of the standard library
//!
//! Natives never run guest code. Methods that need callbacks (`forEach`,
//! `sort`, function replacers) are written in guest source and live in the
//! polyfills instead.

pub mod array;
pub mod boolean;
pub mod date;
pub mod error;
pub mod function;
pub mod global;
pub mod json;
pub mod math;
pub mod number;
pub mod object;
pub mod regexp;
pub mod string;

use std::rc::Rc;

use crate::error::JsError;
use crate::interpreter::{Interpreter, NativeMethod};
use crate::value::{FunctionKind, JsString, ObjectId, Property, Value};

/// Install every builtin on the global object
pub fn init_builtins(interp: &mut Interpreter) -> Result<(), JsError> {
    global::init_global(interp)?;
    object::init_object(interp)?;
    function::init_function(interp)?;
    array::init_array(interp)?;
    string::init_string(interp)?;
    number::init_number(interp)?;
    boolean::init_boolean(interp)?;
    date::init_date(interp)?;
    regexp::init_regexp(interp)?;
    error::init_errors(interp)?;
    math::init_math(interp)?;
    json::init_json(interp)?;
    Ok(())
}

/// Argument `index`, or undefined when missing
pub(crate) fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or_default()
}

impl Interpreter {
    /// Create a native constructor, link it with `prototype` and expose it
    /// as a global
    pub(crate) fn register_constructor(
        &mut self,
        name: &str,
        func: NativeMethod,
        arity: u32,
        prototype: ObjectId,
    ) -> Result<ObjectId, JsError> {
        let constructor = self.alloc_function(
            name,
            FunctionKind::Native {
                func: Rc::new(func),
                constructor: true,
            },
            arity,
        );
        self.heap.object_mut(constructor)?.properties.insert(
            JsString::from("prototype"),
            Property::frozen(Value::Object(prototype)),
        );
        self.heap.object_mut(prototype)?.properties.insert(
            JsString::from("constructor"),
            Property::hidden(Value::Object(constructor)),
        );
        self.register_global(name, Value::Object(constructor))?;
        Ok(constructor)
    }

    /// Non-enumerable property of the global object
    pub(crate) fn register_global(&mut self, name: &str, value: Value) -> Result<(), JsError> {
        let global = self.global_object();
        self.register_value(global, name, value)
    }

    /// Non-enumerable data property, e.g. a builtin object or method
    pub(crate) fn register_value(&mut self, target: ObjectId, name: &str, value: Value) -> Result<(), JsError> {
        self.heap
            .object_mut(target)?
            .properties
            .insert(JsString::from(name), Property::hidden(value));
        Ok(())
    }

    /// Read-only constant such as `Math.PI`
    pub(crate) fn register_constant(&mut self, target: ObjectId, name: &str, value: Value) -> Result<(), JsError> {
        self.heap
            .object_mut(target)?
            .properties
            .insert(JsString::from(name), Property::frozen(value));
        Ok(())
    }

    /// String value of argument `index` (undefined converts to "undefined")
    pub(crate) fn arg_string(&self, args: &[Value], index: usize) -> Result<JsString, JsError> {
        self.to_string(&arg(args, index))
    }

    pub(crate) fn arg_number(&self, args: &[Value], index: usize) -> Result<f64, JsError> {
        self.to_number(&arg(args, index))
    }
}
