//! Array built-in methods
//!
//! The mutators work on any array-like `this`: they read `length`, move
//! elements by index and write `length` back. Methods taking callbacks are
//! polyfills.

use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::interpreter::builtins::arg;
use crate::value::{JsObject, ObjectId, ObjectKind, Value, to_integer, to_uint32};

pub fn init_array(interp: &mut Interpreter) -> Result<(), JsError> {
    let proto = interp.realm.array_prototype;
    let constructor = interp.register_constructor("Array", array_constructor, 1, proto)?;
    interp.realm.array_constructor = Some(constructor);
    interp.register_method(constructor, "isArray", array_is_array, 1)?;

    interp.register_method(proto, "pop", array_pop, 0)?;
    interp.register_method(proto, "push", array_push, 1)?;
    interp.register_method(proto, "shift", array_shift, 0)?;
    interp.register_method(proto, "unshift", array_unshift, 1)?;
    interp.register_method(proto, "reverse", array_reverse, 0)?;
    interp.register_method(proto, "splice", array_splice, 2)?;
    interp.register_method(proto, "slice", array_slice, 2)?;
    interp.register_method(proto, "join", array_join, 1)?;
    interp.register_method(proto, "concat", array_concat, 1)?;
    interp.register_method(proto, "indexOf", array_index_of, 1)?;
    interp.register_method(proto, "lastIndexOf", array_last_index_of, 1)?;
    interp.register_method(proto, "toString", array_to_string, 0)?;
    Ok(())
}

/// `Array(n)` makes a sparse array of length `n`, anything else lists its
/// arguments
pub fn array_constructor(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    if let [Value::Number(n)] = args {
        let length = to_uint32(*n);
        if f64::from(length) != *n {
            return Err(JsError::range_error("Invalid array length"));
        }
        let array = interp.heap.alloc(JsObject::new(
            ObjectKind::Array { length },
            Some(interp.realm.array_prototype),
        ));
        return Ok(Value::Object(array));
    }
    Ok(Value::Object(interp.create_array(args.to_vec())))
}

pub fn array_is_array(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let is_array = match arg(args, 0) {
        Value::Object(id) => matches!(interp.heap.object(id)?.kind, ObjectKind::Array { .. }),
        _ => false,
    };
    Ok(Value::Boolean(is_array))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Array-like access
// ═══════════════════════════════════════════════════════════════════════════════

fn length_of(interp: &Interpreter, id: ObjectId) -> Result<u32, JsError> {
    let length = interp.get_data(&Value::Object(id), "length")?;
    Ok(to_uint32(interp.to_number(&length)?))
}

fn set_length(interp: &mut Interpreter, id: ObjectId, length: u32) -> Result<(), JsError> {
    interp.put(id, "length", Value::Number(f64::from(length)))
}

fn get_index(interp: &Interpreter, id: ObjectId, index: u32) -> Result<Value, JsError> {
    interp.get_data(&Value::Object(id), &index.to_string())
}

fn has_index(interp: &Interpreter, id: ObjectId, index: u32) -> Result<bool, JsError> {
    interp.has_property(&Value::Object(id), &index.to_string())
}

fn put_index(interp: &mut Interpreter, id: ObjectId, index: u32, value: Value) -> Result<(), JsError> {
    interp.put(id, &index.to_string(), value)
}

fn delete_index(interp: &mut Interpreter, id: ObjectId, index: u32) -> Result<(), JsError> {
    interp.delete_property(id, &index.to_string()).map(|_| ())
}

/// Move element `from` to `to`, preserving holes
fn move_index(interp: &mut Interpreter, id: ObjectId, from: u32, to: u32) -> Result<(), JsError> {
    if has_index(interp, id, from)? {
        let value = get_index(interp, id, from)?;
        put_index(interp, id, to, value)
    } else {
        delete_index(interp, id, to)
    }
}

/// Resolve a relative index argument against `length`
fn relative_index(interp: &Interpreter, value: &Value, length: u32, default: u32) -> Result<u32, JsError> {
    if value.is_undefined() {
        return Ok(default);
    }
    let relative = to_integer(interp.to_number(value)?);
    let length = f64::from(length);
    let index = if relative < 0.0 {
        (length + relative).max(0.0)
    } else {
        relative.min(length)
    };
    Ok(index as u32)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Mutators
// ═══════════════════════════════════════════════════════════════════════════════

pub fn array_pop(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let id = interp.to_object(&this)?;
    let length = length_of(interp, id)?;
    if length == 0 {
        set_length(interp, id, 0)?;
        return Ok(Value::Undefined);
    }
    let last = length - 1;
    let value = get_index(interp, id, last)?;
    delete_index(interp, id, last)?;
    set_length(interp, id, last)?;
    Ok(value)
}

pub fn array_push(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let id = interp.to_object(&this)?;
    let mut length = length_of(interp, id)?;
    for value in args {
        put_index(interp, id, length, value.clone())?;
        length = length.saturating_add(1);
    }
    set_length(interp, id, length)?;
    Ok(Value::Number(f64::from(length)))
}

pub fn array_shift(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let id = interp.to_object(&this)?;
    let length = length_of(interp, id)?;
    if length == 0 {
        set_length(interp, id, 0)?;
        return Ok(Value::Undefined);
    }
    let first = get_index(interp, id, 0)?;
    for i in 1..length {
        move_index(interp, id, i, i - 1)?;
    }
    delete_index(interp, id, length - 1)?;
    set_length(interp, id, length - 1)?;
    Ok(first)
}

pub fn array_unshift(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let id = interp.to_object(&this)?;
    let length = length_of(interp, id)?;
    let count = args.len() as u32;
    for i in (0..length).rev() {
        move_index(interp, id, i, i + count)?;
    }
    for (i, value) in args.iter().enumerate() {
        put_index(interp, id, i as u32, value.clone())?;
    }
    let new_length = length + count;
    set_length(interp, id, new_length)?;
    Ok(Value::Number(f64::from(new_length)))
}

pub fn array_reverse(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let id = interp.to_object(&this)?;
    let length = length_of(interp, id)?;
    let (mut lower, mut upper) = (0u32, length);
    while upper > lower + 1 {
        upper -= 1;
        let lower_value = has_index(interp, id, lower)?.then(|| get_index(interp, id, lower)).transpose()?;
        let upper_value = has_index(interp, id, upper)?.then(|| get_index(interp, id, upper)).transpose()?;
        match upper_value {
            Some(value) => put_index(interp, id, lower, value)?,
            None => delete_index(interp, id, lower)?,
        }
        match lower_value {
            Some(value) => put_index(interp, id, upper, value)?,
            None => delete_index(interp, id, upper)?,
        }
        lower += 1;
    }
    Ok(Value::Object(id))
}

pub fn array_splice(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let id = interp.to_object(&this)?;
    let length = length_of(interp, id)?;
    let start = relative_index(interp, &arg(args, 0), length, 0)?;
    let delete_count = match args.get(1) {
        None if args.is_empty() => 0,
        None => length - start,
        Some(value) => {
            let count = to_integer(interp.to_number(value)?).max(0.0);
            count.min(f64::from(length - start)) as u32
        }
    };
    let items = args.get(2..).unwrap_or_default();
    let item_count = items.len() as u32;

    let mut removed = Vec::with_capacity(delete_count as usize);
    for i in 0..delete_count {
        removed.push(get_index(interp, id, start + i)?);
    }

    if item_count < delete_count {
        for i in start..length - delete_count {
            move_index(interp, id, i + delete_count, i + item_count)?;
        }
        for i in (length - delete_count + item_count..length).rev() {
            delete_index(interp, id, i)?;
        }
    } else if item_count > delete_count {
        for i in (start..length - delete_count).rev() {
            move_index(interp, id, i + delete_count, i + item_count)?;
        }
    }
    for (i, item) in items.iter().enumerate() {
        put_index(interp, id, start + i as u32, item.clone())?;
    }
    set_length(interp, id, length - delete_count + item_count)?;
    Ok(Value::Object(interp.create_array(removed)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Accessors
// ═══════════════════════════════════════════════════════════════════════════════

pub fn array_slice(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let id = interp.to_object(&this)?;
    let length = length_of(interp, id)?;
    let start = relative_index(interp, &arg(args, 0), length, 0)?;
    let end = relative_index(interp, &arg(args, 1), length, length)?;

    let result = interp.create_array(Vec::new());
    let mut n = 0;
    for i in start..end.max(start) {
        if has_index(interp, id, i)? {
            let value = get_index(interp, id, i)?;
            put_index(interp, result, n, value)?;
        }
        n += 1;
    }
    set_length(interp, result, n)?;
    Ok(Value::Object(result))
}

pub fn array_join(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let id = interp.to_object(&this)?;
    let separator = match arg(args, 0) {
        Value::Undefined => ",".to_string(),
        other => interp.to_string(&other)?.to_string(),
    };
    Ok(Value::from(interp.join(id, &separator)?))
}

pub fn array_to_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let id = interp.to_object(&this)?;
    Ok(Value::from(interp.join(id, ",")?))
}

pub fn array_concat(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let id = interp.to_object(&this)?;
    let result = interp.create_array(Vec::new());
    let mut n = 0u32;
    for item in std::iter::once(Value::Object(id)).chain(args.iter().cloned()) {
        let spread = match &item {
            Value::Object(source) => matches!(interp.heap.object(*source)?.kind, ObjectKind::Array { .. }),
            _ => false,
        };
        match item {
            Value::Object(source) if spread => {
                let length = length_of(interp, source)?;
                for i in 0..length {
                    if has_index(interp, source, i)? {
                        let value = get_index(interp, source, i)?;
                        put_index(interp, result, n + i, value)?;
                    }
                }
                n += length;
            }
            value => {
                put_index(interp, result, n, value)?;
                n += 1;
            }
        }
    }
    set_length(interp, result, n)?;
    Ok(Value::Object(result))
}

pub fn array_index_of(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let id = interp.to_object(&this)?;
    let length = length_of(interp, id)?;
    let target = arg(args, 0);
    let start = relative_index(interp, &arg(args, 1), length, 0)?;
    for i in start..length {
        if has_index(interp, id, i)? && get_index(interp, id, i)?.strict_equals(&target) {
            return Ok(Value::Number(f64::from(i)));
        }
    }
    Ok(Value::Number(-1.0))
}

pub fn array_last_index_of(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let id = interp.to_object(&this)?;
    let length = length_of(interp, id)?;
    if length == 0 {
        return Ok(Value::Number(-1.0));
    }
    let target = arg(args, 0);
    let from = match args.get(1) {
        None => f64::from(length - 1),
        Some(value) => {
            let n = to_integer(interp.to_number(value)?);
            if n < 0.0 { f64::from(length) + n } else { n.min(f64::from(length - 1)) }
        }
    };
    if from < 0.0 {
        return Ok(Value::Number(-1.0));
    }
    for i in (0..=from as u32).rev() {
        if has_index(interp, id, i)? && get_index(interp, id, i)?.strict_equals(&target) {
            return Ok(Value::Number(f64::from(i)));
        }
    }
    Ok(Value::Number(-1.0))
}
