//! Type conversions and operators
//!
//! ToPrimitive never calls back into guest code: objects convert by their
//! class (wrappers unwrap, dates format, arrays join, errors render as
//! `name: message`, everything else is `[object Class]`).

use crate::ast::BinaryOp;
use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::interpreter::builtins::date::date_to_string;
use crate::value::{
    CheapClone, FunctionKind, JsString, ObjectId, ObjectKind, Value, number_to_string,
    string_to_number, to_int32, to_uint32,
};

/// ToPrimitive hint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Hint {
    Number,
    String,
}

impl Interpreter {
    /// The `typeof` operator
    pub fn type_of(&self, value: &Value) -> Result<&'static str, JsError> {
        Ok(match value {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Object(id) => {
                if self.heap.object(*id)?.is_callable() {
                    "function"
                } else {
                    "object"
                }
            }
        })
    }

    pub(crate) fn to_primitive(&self, value: &Value, hint: Option<Hint>) -> Result<Value, JsError> {
        let Value::Object(id) = value else {
            return Ok(value.clone());
        };
        let object = self.heap.object(*id)?;
        Ok(match &object.kind {
            ObjectKind::Boolean(b) => Value::Boolean(*b),
            ObjectKind::Number(n) => Value::Number(*n),
            ObjectKind::String(s) => Value::String(s.cheap_clone()),
            ObjectKind::Date(t) if hint == Some(Hint::Number) => Value::Number(*t),
            _ => Value::from(self.object_to_string(*id, &mut Vec::new())?),
        })
    }

    /// ToNumber
    pub fn to_number(&self, value: &Value) -> Result<f64, JsError> {
        Ok(match value {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Boolean(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s.as_str()),
            Value::Object(_) => {
                let primitive = self.to_primitive(value, Some(Hint::Number))?;
                self.to_number(&primitive)?
            }
        })
    }

    /// ToString
    pub fn to_string(&self, value: &Value) -> Result<JsString, JsError> {
        Ok(match value {
            Value::Undefined => JsString::from("undefined"),
            Value::Null => JsString::from("null"),
            Value::Boolean(b) => JsString::from(if *b { "true" } else { "false" }),
            Value::Number(n) => JsString::from(number_to_string(*n)),
            Value::String(s) => s.cheap_clone(),
            Value::Object(_) => {
                let primitive = self.to_primitive(value, Some(Hint::String))?;
                self.to_string(&primitive)?
            }
        })
    }

    /// String form of an object by class. `cycles` holds the arrays being
    /// joined so self-containing arrays render as empty.
    fn object_to_string(&self, id: ObjectId, cycles: &mut Vec<ObjectId>) -> Result<String, JsError> {
        let object = self.heap.object(id)?;
        match &object.kind {
            ObjectKind::Array { .. } => self.join_with(id, ",", cycles),
            ObjectKind::Function(kind) => Ok(self.function_source(id, kind)?),
            ObjectKind::Error => self.error_to_string(&Value::Object(id)),
            ObjectKind::RegExp(data) => Ok(format!("/{}/{}", data.source, data.flags)),
            ObjectKind::Date(t) => Ok(date_to_string(*t)),
            ObjectKind::Boolean(b) => Ok(b.to_string()),
            ObjectKind::Number(n) => Ok(number_to_string(*n)),
            ObjectKind::String(s) => Ok(s.to_string()),
            ObjectKind::Plain => Ok("[object Object]".to_string()),
            ObjectKind::Arguments => Ok("[object Arguments]".to_string()),
        }
    }

    /// `Array.prototype.join` over any array-like object
    pub(crate) fn join(&self, id: ObjectId, separator: &str) -> Result<String, JsError> {
        self.join_with(id, separator, &mut Vec::new())
    }

    fn join_with(&self, id: ObjectId, separator: &str, cycles: &mut Vec<ObjectId>) -> Result<String, JsError> {
        if cycles.contains(&id) {
            return Ok(String::new());
        }
        let object = Value::Object(id);
        let length = to_uint32(self.to_number(&self.get_data(&object, "length")?)?);
        cycles.push(id);
        let mut parts = Vec::with_capacity(length as usize);
        for i in 0..length {
            let element = self.get_data(&object, &i.to_string())?;
            let part = match element {
                Value::Undefined | Value::Null => Ok(String::new()),
                Value::Object(inner) => self.object_to_string(inner, cycles),
                other => self.to_string(&other).map(|s| s.to_string()),
            };
            match part {
                Ok(part) => parts.push(part),
                Err(err) => {
                    cycles.pop();
                    return Err(err);
                }
            }
        }
        cycles.pop();
        Ok(parts.join(separator))
    }

    pub(crate) fn function_source(&self, id: ObjectId, kind: &FunctionKind) -> Result<String, JsError> {
        match kind {
            FunctionKind::Interpreted { node, .. } => Ok(node.source.to_string()),
            _ => {
                let name = self.get_data(&Value::Object(id), "name")?;
                let name = match name {
                    Value::String(s) => s.to_string(),
                    _ => String::new(),
                };
                Ok(format!("function {}() {{ [native code] }}", name))
            }
        }
    }

    /// `Error.prototype.toString` without running getters
    pub(crate) fn error_to_string(&self, value: &Value) -> Result<String, JsError> {
        let name = match self.get_data(value, "name")? {
            Value::Undefined => "Error".to_string(),
            other => self.to_string(&other)?.to_string(),
        };
        let message = match self.get_data(value, "message")? {
            Value::Undefined => String::new(),
            other => self.to_string(&other)?.to_string(),
        };
        Ok(if name.is_empty() {
            message
        } else if message.is_empty() {
            name
        } else {
            format!("{}: {}", name, message)
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Operators
    // ═══════════════════════════════════════════════════════════════════════════

    /// Abstract equality (==)
    pub(crate) fn loose_equals(&self, left: &Value, right: &Value) -> Result<bool, JsError> {
        Ok(match (left, right) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
            (Value::Number(a), Value::String(b)) => *a == string_to_number(b.as_str()),
            (Value::String(a), Value::Number(b)) => string_to_number(a.as_str()) == *b,
            (Value::Boolean(b), other) => {
                let n = Value::Number(if *b { 1.0 } else { 0.0 });
                return self.loose_equals(&n, other);
            }
            (other, Value::Boolean(b)) => {
                let n = Value::Number(if *b { 1.0 } else { 0.0 });
                return self.loose_equals(other, &n);
            }
            (Value::Object(_), Value::Number(_) | Value::String(_)) => {
                let primitive = self.to_primitive(left, None)?;
                return self.loose_equals(&primitive, right);
            }
            (Value::Number(_) | Value::String(_), Value::Object(_)) => {
                let primitive = self.to_primitive(right, None)?;
                return self.loose_equals(left, &primitive);
            }
            _ => left.strict_equals(right),
        })
    }

    /// Abstract relational comparison `left < right`; `None` when either side
    /// is NaN
    fn less_than(&self, left: &Value, right: &Value) -> Result<Option<bool>, JsError> {
        let left = self.to_primitive(left, Some(Hint::Number))?;
        let right = self.to_primitive(right, Some(Hint::Number))?;
        if let (Value::String(a), Value::String(b)) = (&left, &right) {
            let a: Vec<u16> = a.as_str().encode_utf16().collect();
            let b: Vec<u16> = b.as_str().encode_utf16().collect();
            return Ok(Some(a < b));
        }
        let a = self.to_number(&left)?;
        let b = self.to_number(&right)?;
        if a.is_nan() || b.is_nan() {
            return Ok(None);
        }
        Ok(Some(a < b))
    }

    /// The `+` operator
    pub(crate) fn add(&self, left: &Value, right: &Value) -> Result<Value, JsError> {
        let left = self.to_primitive(left, None)?;
        let right = self.to_primitive(right, None)?;
        if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
            let mut s = self.to_string(&left)?.to_string();
            s.push_str(self.to_string(&right)?.as_str());
            return Ok(Value::from(s));
        }
        Ok(Value::Number(self.to_number(&left)? + self.to_number(&right)?))
    }

    /// Every binary operator
    pub(crate) fn binary_operation(
        &mut self,
        op: BinaryOp,
        left: &Value,
        right: &Value,
    ) -> Result<Value, JsError> {
        let number = |interp: &Self, v: &Value| interp.to_number(v);
        Ok(match op {
            BinaryOp::Add => self.add(left, right)?,
            BinaryOp::Sub => Value::Number(number(self, left)? - number(self, right)?),
            BinaryOp::Mul => Value::Number(number(self, left)? * number(self, right)?),
            BinaryOp::Div => Value::Number(number(self, left)? / number(self, right)?),
            BinaryOp::Mod => Value::Number(number(self, left)? % number(self, right)?),
            BinaryOp::Eq => Value::Boolean(self.loose_equals(left, right)?),
            BinaryOp::NotEq => Value::Boolean(!self.loose_equals(left, right)?),
            BinaryOp::StrictEq => Value::Boolean(left.strict_equals(right)),
            BinaryOp::StrictNotEq => Value::Boolean(!left.strict_equals(right)),
            BinaryOp::Lt => Value::Boolean(self.less_than(left, right)? == Some(true)),
            BinaryOp::Gt => Value::Boolean(self.less_than(right, left)? == Some(true)),
            BinaryOp::LtEq => Value::Boolean(self.less_than(right, left)? == Some(false)),
            BinaryOp::GtEq => Value::Boolean(self.less_than(left, right)? == Some(false)),
            BinaryOp::BitAnd => {
                Value::Number(f64::from(to_int32(number(self, left)?) & to_int32(number(self, right)?)))
            }
            BinaryOp::BitOr => {
                Value::Number(f64::from(to_int32(number(self, left)?) | to_int32(number(self, right)?)))
            }
            BinaryOp::BitXor => {
                Value::Number(f64::from(to_int32(number(self, left)?) ^ to_int32(number(self, right)?)))
            }
            BinaryOp::LShift => {
                let shift = to_uint32(number(self, right)?) & 0x1f;
                Value::Number(f64::from(to_int32(number(self, left)?).wrapping_shl(shift)))
            }
            BinaryOp::RShift => {
                let shift = to_uint32(number(self, right)?) & 0x1f;
                Value::Number(f64::from(to_int32(number(self, left)?) >> shift))
            }
            BinaryOp::URShift => {
                let shift = to_uint32(number(self, right)?) & 0x1f;
                Value::Number(f64::from(to_uint32(number(self, left)?) >> shift))
            }
            BinaryOp::In => {
                if !matches!(right, Value::Object(_)) {
                    return Err(JsError::type_error(format!(
                        "Cannot use 'in' operator to search for '{}' in {}",
                        self.to_string(left)?,
                        self.to_string(right)?
                    )));
                }
                let key = self.to_property_key(left)?;
                Value::Boolean(self.has_property(right, key.as_str())?)
            }
            BinaryOp::Instanceof => Value::Boolean(self.instance_of(left, right)?),
        })
    }

    fn instance_of(&self, value: &Value, constructor: &Value) -> Result<bool, JsError> {
        let &Value::Object(mut id) = constructor else {
            return Err(JsError::type_error(
                "Right-hand side of 'instanceof' is not callable",
            ));
        };
        loop {
            let object = self.heap.object(id)?;
            match object.function_kind() {
                None => {
                    return Err(JsError::type_error(
                        "Right-hand side of 'instanceof' is not callable",
                    ));
                }
                Some(FunctionKind::Bound { target, .. }) => id = *target,
                Some(_) => return self.is_a(value, id),
            }
        }
    }
}
