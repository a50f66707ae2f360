//! Object built-in methods

use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::interpreter::builtins::arg;
use crate::value::{ObjectId, PropertyDescriptor, PropertySlot, Value};

/// Create the Object constructor, its static methods and `Object.prototype`
/// methods
pub fn init_object(interp: &mut Interpreter) -> Result<(), JsError> {
    let proto = interp.realm.object_prototype;
    interp.register_method(proto, "toString", object_to_string, 0)?;
    interp.register_method(proto, "toLocaleString", object_to_locale_string, 0)?;
    interp.register_method(proto, "valueOf", object_value_of, 0)?;
    interp.register_method(proto, "hasOwnProperty", object_has_own_property, 1)?;
    interp.register_method(proto, "propertyIsEnumerable", object_property_is_enumerable, 1)?;
    interp.register_method(proto, "isPrototypeOf", object_is_prototype_of, 1)?;

    let constructor = interp.register_constructor("Object", object_constructor, 1, proto)?;

    // Prototypes
    interp.register_method(constructor, "getPrototypeOf", object_get_prototype_of, 1)?;
    interp.register_method(constructor, "setPrototypeOf", object_set_prototype_of, 2)?;
    interp.register_method(constructor, "create", object_create, 2)?;

    // Property descriptors
    interp.register_method(constructor, "defineProperty", object_define_property, 3)?;
    interp.register_method(constructor, "defineProperties", object_define_properties, 2)?;
    interp.register_method(
        constructor,
        "getOwnPropertyDescriptor",
        object_get_own_property_descriptor,
        2,
    )?;
    interp.register_method(constructor, "getOwnPropertyNames", object_get_own_property_names, 1)?;
    interp.register_method(constructor, "keys", object_keys, 1)?;

    // Freezing/sealing/extensibility
    interp.register_method(constructor, "preventExtensions", object_prevent_extensions, 1)?;
    interp.register_method(constructor, "isExtensible", object_is_extensible, 1)?;
    interp.register_method(constructor, "freeze", object_freeze, 1)?;
    interp.register_method(constructor, "isFrozen", object_is_frozen, 1)?;
    interp.register_method(constructor, "seal", object_seal, 1)?;
    interp.register_method(constructor, "isSealed", object_is_sealed, 1)?;
    Ok(())
}

/// The object argument of an `Object.*` static, or a TypeError
fn object_arg(args: &[Value], method: &str) -> Result<ObjectId, JsError> {
    match args.first() {
        Some(Value::Object(id)) => Ok(*id),
        _ => Err(JsError::type_error(format!(
            "Object.{} called on non-object",
            method
        ))),
    }
}

pub fn object_constructor(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    match arg(args, 0) {
        Value::Undefined | Value::Null => {
            if interp.called_with_new() {
                Ok(this)
            } else {
                Ok(Value::Object(interp.create_object()))
            }
        }
        value => Ok(Value::Object(interp.to_object(&value)?)),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Object.prototype
// ═══════════════════════════════════════════════════════════════════════════════

pub fn object_to_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let class = match &this {
        Value::Undefined => "Undefined",
        Value::Null => "Null",
        Value::Boolean(_) => "Boolean",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        Value::Object(id) => interp.heap.object(*id)?.kind.class_name(),
    };
    Ok(Value::from(format!("[object {}]", class)))
}

pub fn object_to_locale_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    Ok(Value::from(interp.to_string(&this)?))
}

pub fn object_value_of(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    Ok(Value::Object(interp.to_object(&this)?))
}

pub fn object_has_own_property(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let key = interp.to_property_key(&arg(args, 0))?;
    let id = interp.to_object(&this)?;
    Ok(Value::Boolean(interp.heap.object(id)?.has_own_property(key.as_str())))
}

pub fn object_property_is_enumerable(
    interp: &mut Interpreter,
    this: Value,
    args: &[Value],
) -> Result<Value, JsError> {
    let key = interp.to_property_key(&arg(args, 0))?;
    let id = interp.to_object(&this)?;
    let enumerable = interp
        .heap
        .object(id)?
        .own_property(key.as_str())
        .is_some_and(|property| property.enumerable);
    Ok(Value::Boolean(enumerable))
}

pub fn object_is_prototype_of(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let value = arg(args, 0);
    if !matches!(value, Value::Object(_)) {
        return Ok(Value::Boolean(false));
    }
    let proto = interp.to_object(&this)?;
    Ok(Value::Boolean(interp.inherits_from(&value, proto)?))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Prototypes
// ═══════════════════════════════════════════════════════════════════════════════

pub fn object_get_prototype_of(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let id = object_arg(args, "getPrototypeOf")?;
    Ok(interp
        .heap
        .object(id)?
        .proto
        .map(Value::Object)
        .unwrap_or(Value::Null))
}

pub fn object_set_prototype_of(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let target = arg(args, 0);
    let proto = match arg(args, 1) {
        Value::Object(id) => Some(id),
        Value::Null => None,
        _ => return Err(JsError::type_error("Object prototype may only be an Object or null")),
    };
    let Value::Object(id) = target else {
        return Ok(target);
    };
    interp.set_prototype(id, proto)?;
    Ok(target)
}

pub fn object_create(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let proto = match arg(args, 0) {
        Value::Object(id) => Some(id),
        Value::Null => None,
        _ => return Err(JsError::type_error("Object prototype may only be an Object or null")),
    };
    let id = interp.create_object();
    interp.heap.object_mut(id)?.proto = proto;
    let properties = arg(args, 1);
    if !properties.is_undefined() {
        interp.define_properties(id, &properties)?;
    }
    Ok(Value::Object(id))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Property descriptors
// ═══════════════════════════════════════════════════════════════════════════════

impl Interpreter {
    /// ToPropertyDescriptor over a guest descriptor object
    pub(crate) fn to_property_descriptor(&self, value: &Value) -> Result<PropertyDescriptor, JsError> {
        if !matches!(value, Value::Object(_)) {
            return Err(JsError::type_error(format!(
                "Property description must be an object: {}",
                self.to_string(value)?
            )));
        }
        let field = |name: &str| -> Result<Option<Value>, JsError> {
            if self.has_property(value, name)? {
                Ok(Some(self.get_data(value, name)?))
            } else {
                Ok(None)
            }
        };

        let mut descriptor = PropertyDescriptor {
            enumerable: field("enumerable")?.map(|v| v.to_boolean()),
            configurable: field("configurable")?.map(|v| v.to_boolean()),
            value: field("value")?,
            writable: field("writable")?.map(|v| v.to_boolean()),
            ..PropertyDescriptor::default()
        };
        for (name, slot) in [("get", &mut descriptor.get), ("set", &mut descriptor.set)] {
            let Some(accessor) = field(name)? else {
                continue;
            };
            let callable = match &accessor {
                Value::Undefined => true,
                Value::Object(id) => self.heap.object(*id)?.is_callable(),
                _ => false,
            };
            if !callable {
                let label = if name == "get" { "Getter" } else { "Setter" };
                return Err(JsError::type_error(format!(
                    "{} must be a function: {}",
                    label,
                    self.to_string(&accessor)?
                )));
            }
            *slot = Some(accessor);
        }
        if descriptor.is_accessor() && descriptor.is_data() {
            return Err(JsError::type_error(
                "Invalid property descriptor. Cannot both specify accessors and a value or writable attribute",
            ));
        }
        Ok(descriptor)
    }

    /// Guest object describing `descriptor`
    pub(crate) fn from_property_descriptor(&mut self, descriptor: &PropertyDescriptor) -> Result<ObjectId, JsError> {
        let id = self.create_object();
        let fields = [
            ("value", descriptor.value.clone()),
            ("writable", descriptor.writable.map(Value::Boolean)),
            ("get", descriptor.get.clone()),
            ("set", descriptor.set.clone()),
            ("enumerable", descriptor.enumerable.map(Value::Boolean)),
            ("configurable", descriptor.configurable.map(Value::Boolean)),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                self.put(id, name, value)?;
            }
        }
        Ok(id)
    }

    /// Define every enumerable own property of `properties` on `target`
    pub(crate) fn define_properties(&mut self, target: ObjectId, properties: &Value) -> Result<(), JsError> {
        let source = self.to_object(properties)?;
        let mut descriptors = Vec::new();
        for key in self.heap.object(source)?.own_keys() {
            let enumerable = self
                .heap
                .object(source)?
                .own_property(key.as_str())
                .is_some_and(|property| property.enumerable);
            if !enumerable {
                continue;
            }
            let value = self.get_data(&Value::Object(source), key.as_str())?;
            descriptors.push((key, self.to_property_descriptor(&value)?));
        }
        for (key, descriptor) in descriptors {
            self.define_property(target, key.as_str(), &descriptor)?;
        }
        Ok(())
    }
}

pub fn object_define_property(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let id = object_arg(args, "defineProperty")?;
    let key = interp.to_property_key(&arg(args, 1))?;
    let descriptor = interp.to_property_descriptor(&arg(args, 2))?;
    interp.define_property(id, key.as_str(), &descriptor)?;
    Ok(Value::Object(id))
}

pub fn object_define_properties(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let id = object_arg(args, "defineProperties")?;
    interp.define_properties(id, &arg(args, 1))?;
    Ok(Value::Object(id))
}

pub fn object_get_own_property_descriptor(
    interp: &mut Interpreter,
    _this: Value,
    args: &[Value],
) -> Result<Value, JsError> {
    let id = object_arg(args, "getOwnPropertyDescriptor")?;
    let key = interp.to_property_key(&arg(args, 1))?;
    let Some(property) = interp.heap.object(id)?.own_property(key.as_str()) else {
        return Ok(Value::Undefined);
    };
    let descriptor = interp.from_property_descriptor(&property.to_descriptor())?;
    Ok(Value::Object(descriptor))
}

pub fn object_get_own_property_names(
    interp: &mut Interpreter,
    _this: Value,
    args: &[Value],
) -> Result<Value, JsError> {
    let id = object_arg(args, "getOwnPropertyNames")?;
    let names = interp
        .heap
        .object(id)?
        .own_keys()
        .into_iter()
        .map(Value::String)
        .collect();
    Ok(Value::Object(interp.create_array(names)))
}

pub fn object_keys(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let id = object_arg(args, "keys")?;
    let object = interp.heap.object(id)?;
    let keys = object
        .own_keys()
        .into_iter()
        .filter(|key| {
            object
                .own_property(key.as_str())
                .is_some_and(|property| property.enumerable)
        })
        .map(Value::String)
        .collect();
    Ok(Value::Object(interp.create_array(keys)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Freezing/sealing/extensibility
// ═══════════════════════════════════════════════════════════════════════════════

pub fn object_prevent_extensions(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let target = arg(args, 0);
    if let Value::Object(id) = target {
        interp.heap.object_mut(id)?.extensible = false;
    }
    Ok(target)
}

pub fn object_is_extensible(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    match arg(args, 0) {
        Value::Object(id) => Ok(Value::Boolean(interp.heap.object(id)?.extensible)),
        _ => Ok(Value::Boolean(false)),
    }
}

pub fn object_freeze(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let target = arg(args, 0);
    if let Value::Object(id) = target {
        let object = interp.heap.object_mut(id)?;
        for property in object.properties.values_mut() {
            property.configurable = false;
            if let PropertySlot::Data { writable, .. } = &mut property.slot {
                *writable = false;
            }
        }
        object.extensible = false;
    }
    Ok(target)
}

pub fn object_is_frozen(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let Value::Object(id) = arg(args, 0) else {
        return Ok(Value::Boolean(true));
    };
    let object = interp.heap.object(id)?;
    let frozen = !object.extensible
        && object
            .properties
            .values()
            .all(|property| !property.configurable && !property.writable());
    Ok(Value::Boolean(frozen))
}

pub fn object_seal(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let target = arg(args, 0);
    if let Value::Object(id) = target {
        let object = interp.heap.object_mut(id)?;
        for property in object.properties.values_mut() {
            property.configurable = false;
        }
        object.extensible = false;
    }
    Ok(target)
}

pub fn object_is_sealed(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let Value::Object(id) = arg(args, 0) else {
        return Ok(Value::Boolean(true));
    };
    let object = interp.heap.object(id)?;
    let sealed = !object.extensible && object.properties.values().all(|property| !property.configurable);
    Ok(Value::Boolean(sealed))
}
