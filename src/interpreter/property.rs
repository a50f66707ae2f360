//! Property and scope access
//!
//! Reads and writes never run guest code themselves. When a getter or setter
//! is found the caller gets `PropertyResult::Accessor` / `SetResult::Setter`
//! back and is expected to push a call for it.

use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::interpreter::stack::Reference;
use crate::value::{
    CheapClone, JsObject, JsString, ObjectId, ObjectKind, Property, PropertyDescriptor,
    PropertySlot, ScopeId, Value, array_index, number_to_string, to_uint32,
};

/// Outcome of a property read
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyResult {
    Value(Value),
    /// A getter must be called with `this` to obtain the value
    Accessor { func: ObjectId, this: Value },
}

/// Outcome of a property write
#[derive(Debug, Clone, PartialEq)]
pub enum SetResult {
    Done,
    /// A setter must be called with `this` and the value
    Setter { func: ObjectId, this: Value },
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Undefined => "undefined",
        Value::Null => "null",
        Value::Boolean(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Object(_) => "object",
    }
}

fn accessor_id(value: Option<&Value>) -> Option<ObjectId> {
    match value {
        Some(Value::Object(id)) => Some(*id),
        _ => None,
    }
}

impl Interpreter {
    // ═══════════════════════════════════════════════════════════════════════════
    // Reads
    // ═══════════════════════════════════════════════════════════════════════════

    /// Object the prototype walk starts from for `base`
    fn lookup_start(&self, base: &Value, name: &str) -> Result<ObjectId, JsError> {
        match base {
            Value::Undefined | Value::Null => Err(JsError::type_error(format!(
                "Cannot read property '{}' of {}",
                name,
                describe(base)
            ))),
            Value::Boolean(_) => Ok(self.realm.boolean_prototype),
            Value::Number(_) => Ok(self.realm.number_prototype),
            Value::String(_) => Ok(self.realm.string_prototype),
            Value::Object(id) => Ok(*id),
        }
    }

    /// Read `base[name]`, walking the prototype chain
    pub fn get_property(&self, base: &Value, name: &str) -> Result<PropertyResult, JsError> {
        if let Value::String(s) = base {
            if name == "length" {
                return Ok(PropertyResult::Value(Value::Number(s.utf16_len() as f64)));
            }
            if let Some(index) = array_index(name) {
                if let Some(unit) = s.as_str().encode_utf16().nth(index as usize) {
                    return Ok(PropertyResult::Value(Value::from(String::from_utf16_lossy(&[
                        unit,
                    ]))));
                }
            }
        }

        let mut current = Some(self.lookup_start(base, name)?);
        while let Some(id) = current {
            let object = self.heap.object(id)?;
            if let Some(property) = object.own_property(name) {
                return Ok(match property.slot {
                    PropertySlot::Data { value, .. } => PropertyResult::Value(value),
                    PropertySlot::Accessor { get: Some(func), .. } => PropertyResult::Accessor {
                        func,
                        this: base.clone(),
                    },
                    PropertySlot::Accessor { get: None, .. } => {
                        PropertyResult::Value(Value::Undefined)
                    }
                });
            }
            current = object.proto;
        }
        Ok(PropertyResult::Value(Value::Undefined))
    }

    /// Read a data property, treating accessors as `undefined`. For natives,
    /// which cannot run guest getters.
    pub(crate) fn get_data(&self, base: &Value, name: &str) -> Result<Value, JsError> {
        match self.get_property(base, name)? {
            PropertyResult::Value(value) => Ok(value),
            PropertyResult::Accessor { .. } => Ok(Value::Undefined),
        }
    }

    /// `name in base`, walking the prototype chain
    pub fn has_property(&self, base: &Value, name: &str) -> Result<bool, JsError> {
        let mut current = match base {
            Value::Object(id) => Some(*id),
            _ => return Ok(false),
        };
        while let Some(id) = current {
            let object = self.heap.object(id)?;
            if object.has_own_property(name) {
                return Ok(true);
            }
            current = object.proto;
        }
        Ok(false)
    }

    pub fn get_prototype(&self, value: &Value) -> Result<Option<ObjectId>, JsError> {
        Ok(match value {
            Value::Undefined | Value::Null => None,
            Value::Boolean(_) => Some(self.realm.boolean_prototype),
            Value::Number(_) => Some(self.realm.number_prototype),
            Value::String(_) => Some(self.realm.string_prototype),
            Value::Object(id) => self.heap.object(*id)?.proto,
        })
    }

    /// Replace the prototype of `id`, refusing cycles and changes to
    /// non-extensible objects
    pub fn set_prototype(&mut self, id: ObjectId, proto: Option<ObjectId>) -> Result<(), JsError> {
        let mut current = proto;
        while let Some(ancestor) = current {
            if ancestor == id {
                return Err(JsError::type_error("Cyclic __proto__ value"));
            }
            current = self.heap.object(ancestor)?.proto;
        }
        let object = self.heap.object_mut(id)?;
        if object.proto != proto && !object.extensible {
            return Err(JsError::type_error("#<Object> is not extensible"));
        }
        object.proto = proto;
        Ok(())
    }

    /// Whether `prototype` appears on the prototype chain of `value`
    pub(crate) fn inherits_from(&self, value: &Value, prototype: ObjectId) -> Result<bool, JsError> {
        let Value::Object(id) = value else {
            return Ok(false);
        };
        let mut current = self.heap.object(*id)?.proto;
        while let Some(id) = current {
            if id == prototype {
                return Ok(true);
            }
            current = self.heap.object(id)?.proto;
        }
        Ok(false)
    }

    /// `value instanceof constructor` without running getters
    pub fn is_a(&self, value: &Value, constructor: ObjectId) -> Result<bool, JsError> {
        match self.get_data(&Value::Object(constructor), "prototype")? {
            Value::Object(prototype) => self.inherits_from(value, prototype),
            _ => Ok(false),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Writes
    // ═══════════════════════════════════════════════════════════════════════════

    /// Write `base[name] = value`, or define it when `descriptor` is given.
    /// Failures throw in strict code and are silent otherwise.
    pub fn set_property(
        &mut self,
        base: &Value,
        name: &str,
        value: Value,
        descriptor: Option<&PropertyDescriptor>,
    ) -> Result<SetResult, JsError> {
        let strict = self.is_strict();
        self.set_property_with(base, name, value, descriptor, strict)
    }

    /// Write from native code: failures always throw
    pub(crate) fn put(&mut self, object: ObjectId, name: &str, value: Value) -> Result<(), JsError> {
        self.set_property_with(&Value::Object(object), name, value, None, true)
            .map(|_| ())
    }

    /// Define an own property the way `Object.defineProperty` does
    pub(crate) fn define_property(
        &mut self,
        object: ObjectId,
        name: &str,
        descriptor: &PropertyDescriptor,
    ) -> Result<(), JsError> {
        let value = descriptor.value.clone().unwrap_or_default();
        self.set_property_with(&Value::Object(object), name, value, Some(descriptor), true)
            .map(|_| ())
    }

    pub(crate) fn set_property_with(
        &mut self,
        base: &Value,
        name: &str,
        value: Value,
        descriptor: Option<&PropertyDescriptor>,
        strict: bool,
    ) -> Result<SetResult, JsError> {
        let id = match base {
            Value::Undefined | Value::Null => {
                return Err(JsError::type_error(format!(
                    "Cannot set property '{}' of {}",
                    name,
                    describe(base)
                )));
            }
            Value::Object(id) => *id,
            _ => {
                if descriptor.is_some() || strict {
                    return Err(JsError::type_error(format!(
                        "Cannot create property '{}' on {}",
                        name,
                        describe(base)
                    )));
                }
                return Ok(SetResult::Done);
            }
        };

        let reject = |message: String| -> Result<SetResult, JsError> {
            if strict {
                Err(JsError::type_error(message))
            } else {
                Ok(SetResult::Done)
            }
        };

        let (read_only_string, array_length) = match &self.heap.object(id)?.kind {
            ObjectKind::String(s) => {
                let in_range = array_index(name).is_some_and(|i| (i as usize) < s.utf16_len());
                (name == "length" || in_range, false)
            }
            ObjectKind::Array { .. } => (false, name == "length"),
            _ => (false, false),
        };
        if read_only_string {
            return reject(format!(
                "Cannot assign to read only property '{}' of string",
                name
            ));
        }
        if array_length {
            let length = descriptor.and_then(|d| d.value.clone()).unwrap_or(value);
            self.set_array_length(id, &length)?;
            return Ok(SetResult::Done);
        }

        if let Some(descriptor) = descriptor {
            self.define_own_property(id, name, descriptor)?;
            self.bump_array_length(id, name)?;
            return Ok(SetResult::Done);
        }

        // Find the defining object along the chain
        let mut current = Some(id);
        while let Some(holder) = current {
            let object = self.heap.object(holder)?;
            if let Some(property) = object.own_property(name) {
                match property.slot {
                    PropertySlot::Accessor { set: Some(func), .. } => {
                        return Ok(SetResult::Setter {
                            func,
                            this: base.clone(),
                        });
                    }
                    PropertySlot::Accessor { set: None, .. } => {
                        return reject(format!(
                            "Cannot set property {} of #<Object> which has only a getter",
                            name
                        ));
                    }
                    PropertySlot::Data { writable: false, .. } => {
                        return reject(format!(
                            "Cannot assign to read only property '{}' of object",
                            name
                        ));
                    }
                    PropertySlot::Data { writable: true, .. } if holder == id => {
                        if let Some(Property {
                            slot: PropertySlot::Data { value: slot, .. },
                            ..
                        }) = self.heap.object_mut(id)?.properties.get_mut(name)
                        {
                            *slot = value;
                        }
                        return Ok(SetResult::Done);
                    }
                    PropertySlot::Data { writable: true, .. } => break,
                }
            }
            current = object.proto;
        }

        let object = self.heap.object_mut(id)?;
        if !object.extensible {
            return reject(format!(
                "Cannot add property {}, object is not extensible",
                name
            ));
        }
        object
            .properties
            .insert(JsString::from(name), Property::data(value));
        self.bump_array_length(id, name)?;
        Ok(SetResult::Done)
    }

    /// ES5 [[DefineOwnProperty]] with redefinition checks
    fn define_own_property(
        &mut self,
        id: ObjectId,
        name: &str,
        descriptor: &PropertyDescriptor,
    ) -> Result<(), JsError> {
        if descriptor.is_accessor() && descriptor.is_data() {
            return Err(JsError::type_error(
                "Invalid property descriptor. Cannot both specify accessors and a value or writable attribute",
            ));
        }
        let object = self.heap.object_mut(id)?;
        let Some(current) = object.own_property(name) else {
            if !object.extensible {
                return Err(JsError::type_error(format!(
                    "Cannot define property {}, object is not extensible",
                    name
                )));
            }
            let slot = if descriptor.is_accessor() {
                PropertySlot::Accessor {
                    get: accessor_id(descriptor.get.as_ref()),
                    set: accessor_id(descriptor.set.as_ref()),
                }
            } else {
                PropertySlot::Data {
                    value: descriptor.value.clone().unwrap_or_default(),
                    writable: descriptor.writable.unwrap_or(false),
                }
            };
            object.properties.insert(
                JsString::from(name),
                Property {
                    slot,
                    enumerable: descriptor.enumerable.unwrap_or(false),
                    configurable: descriptor.configurable.unwrap_or(false),
                },
            );
            return Ok(());
        };

        let redefine = || JsError::type_error(format!("Cannot redefine property: {}", name));
        if !current.configurable {
            if descriptor.configurable == Some(true) {
                return Err(redefine());
            }
            if descriptor.enumerable.is_some_and(|e| e != current.enumerable) {
                return Err(redefine());
            }
            match &current.slot {
                PropertySlot::Data { value, writable } => {
                    if descriptor.is_accessor() {
                        return Err(redefine());
                    }
                    if !writable {
                        if descriptor.writable == Some(true) {
                            return Err(redefine());
                        }
                        if descriptor.value.as_ref().is_some_and(|v| !v.same_value(value)) {
                            return Err(redefine());
                        }
                    }
                }
                PropertySlot::Accessor { get, set } => {
                    if descriptor.is_data() {
                        return Err(redefine());
                    }
                    if descriptor.get.is_some() && accessor_id(descriptor.get.as_ref()) != *get {
                        return Err(redefine());
                    }
                    if descriptor.set.is_some() && accessor_id(descriptor.set.as_ref()) != *set {
                        return Err(redefine());
                    }
                }
            }
        }

        let mut updated = current;
        if descriptor.is_accessor() {
            let (mut get, mut set) = match updated.slot {
                PropertySlot::Accessor { get, set } => (get, set),
                PropertySlot::Data { .. } => (None, None),
            };
            if descriptor.get.is_some() {
                get = accessor_id(descriptor.get.as_ref());
            }
            if descriptor.set.is_some() {
                set = accessor_id(descriptor.set.as_ref());
            }
            updated.slot = PropertySlot::Accessor { get, set };
        } else if descriptor.is_data() {
            let (mut value, mut writable) = match updated.slot {
                PropertySlot::Data { value, writable } => (value, writable),
                PropertySlot::Accessor { .. } => (Value::Undefined, false),
            };
            if let Some(new_value) = &descriptor.value {
                value = new_value.clone();
            }
            if let Some(new_writable) = descriptor.writable {
                writable = new_writable;
            }
            updated.slot = PropertySlot::Data { value, writable };
        }
        if let Some(enumerable) = descriptor.enumerable {
            updated.enumerable = enumerable;
        }
        if let Some(configurable) = descriptor.configurable {
            updated.configurable = configurable;
        }
        object.properties.insert(JsString::from(name), updated);
        Ok(())
    }

    /// Writing an index at or past `length` extends the array
    fn bump_array_length(&mut self, id: ObjectId, name: &str) -> Result<(), JsError> {
        let Some(index) = array_index(name) else {
            return Ok(());
        };
        if let ObjectKind::Array { length } = &mut self.heap.object_mut(id)?.kind {
            if index >= *length {
                *length = index + 1;
            }
        }
        Ok(())
    }

    /// Assign an array's `length`, deleting the indices that fall off the end
    pub(crate) fn set_array_length(&mut self, id: ObjectId, value: &Value) -> Result<(), JsError> {
        let number = self.to_number(value)?;
        let new_length = to_uint32(number);
        if f64::from(new_length) != number {
            return Err(JsError::range_error("Invalid array length"));
        }
        let object = self.heap.object_mut(id)?;
        object
            .properties
            .retain(|key, _| array_index(key.as_str()).is_none_or(|i| i < new_length));
        if let ObjectKind::Array { length } = &mut object.kind {
            *length = new_length;
        }
        Ok(())
    }

    /// `delete object[name]`. Returns `false` for non-configurable properties
    /// in sloppy code.
    pub fn delete_property(&mut self, id: ObjectId, name: &str) -> Result<bool, JsError> {
        let strict = self.is_strict();
        let object = self.heap.object_mut(id)?;
        match object.own_property(name) {
            None => Ok(true),
            Some(property) if !property.configurable => {
                if strict {
                    Err(JsError::type_error(format!(
                        "Cannot delete property '{}' of #<{}>",
                        name,
                        object.kind.class_name()
                    )))
                } else {
                    Ok(false)
                }
            }
            Some(_) => {
                object.properties.shift_remove(name);
                Ok(true)
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Scopes
    // ═══════════════════════════════════════════════════════════════════════════

    /// Resolve `name` through the scope chain. Unresolvable names are a
    /// ReferenceError unless they are the operand of `typeof`.
    pub(crate) fn get_value_from_scope(
        &self,
        scope: ScopeId,
        name: &str,
        typeof_operand: bool,
    ) -> Result<PropertyResult, JsError> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.heap.scope(id)?;
            let object = Value::Object(scope.object);
            if self.has_property(&object, name)? {
                return self.get_property(&object, name);
            }
            current = scope.parent;
        }
        if typeof_operand {
            Ok(PropertyResult::Value(Value::Undefined))
        } else {
            Err(JsError::reference_error(name))
        }
    }

    /// Assign to the nearest binding of `name`. Undeclared names land on the
    /// global object in sloppy code.
    pub(crate) fn set_value_to_scope(
        &mut self,
        scope: ScopeId,
        name: &str,
        value: Value,
    ) -> Result<SetResult, JsError> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let binding = self.heap.scope(id)?;
            let object = Value::Object(binding.object);
            if self.has_property(&object, name)? {
                return self.set_property(&object, name, value, None);
            }
            current = binding.parent;
        }
        if self.heap.scope(scope)?.strict {
            return Err(JsError::reference_error(name));
        }
        let global = Value::Object(self.global_object());
        self.set_property(&global, name, value, None)
    }

    /// Object holding the nearest binding of `name`, if any
    pub(crate) fn find_binding(&self, scope: ScopeId, name: &str) -> Result<Option<ObjectId>, JsError> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let binding = self.heap.scope(id)?;
            if self.has_property(&Value::Object(binding.object), name)? {
                return Ok(Some(binding.object));
            }
            current = binding.parent;
        }
        Ok(None)
    }

    pub(crate) fn get_reference_value(
        &self,
        scope: ScopeId,
        reference: &Reference,
    ) -> Result<PropertyResult, JsError> {
        match reference {
            Reference::Scope(name) => self.get_value_from_scope(scope, name.as_str(), false),
            Reference::Property(base, name) => self.get_property(base, name.as_str()),
        }
    }

    pub(crate) fn set_reference_value(
        &mut self,
        scope: ScopeId,
        reference: &Reference,
        value: Value,
    ) -> Result<SetResult, JsError> {
        match reference {
            Reference::Scope(name) => self.set_value_to_scope(scope, name.as_str(), value),
            Reference::Property(base, name) => self.set_property(base, name.as_str(), value, None),
        }
    }

    /// Create a variable binding directly on a scope's binding object
    pub(crate) fn define_binding(
        &mut self,
        object: ObjectId,
        name: &JsString,
        value: Value,
    ) -> Result<(), JsError> {
        self.heap
            .object_mut(object)?
            .properties
            .insert(name.cheap_clone(), Property::with_flags(value, true, true, false));
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Boxing
    // ═══════════════════════════════════════════════════════════════════════════

    /// ToObject: wrap primitives, reject null and undefined
    pub fn to_object(&mut self, value: &Value) -> Result<ObjectId, JsError> {
        let (kind, proto) = match value {
            Value::Undefined | Value::Null => {
                return Err(JsError::type_error(
                    "Cannot convert undefined or null to object",
                ));
            }
            Value::Object(id) => return Ok(*id),
            Value::Boolean(b) => (ObjectKind::Boolean(*b), self.realm.boolean_prototype),
            Value::Number(n) => (ObjectKind::Number(*n), self.realm.number_prototype),
            Value::String(s) => (ObjectKind::String(s.cheap_clone()), self.realm.string_prototype),
        };
        Ok(self.heap.alloc(JsObject::new(kind, Some(proto))))
    }

    /// Property key of a computed member access
    pub(crate) fn to_property_key(&self, value: &Value) -> Result<JsString, JsError> {
        match value {
            Value::String(s) => Ok(s.cheap_clone()),
            Value::Number(n) => Ok(JsString::from(number_to_string(*n))),
            other => self.to_string(other),
        }
    }
}
