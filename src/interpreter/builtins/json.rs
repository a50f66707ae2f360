//! JSON built-in methods and the host-facing conversions between guest values
//! and `serde_json::Value`

use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;

use crate::error::{ErrorKind, JsError};
use crate::interpreter::Interpreter;
use crate::interpreter::builtins::arg;
use crate::interpreter::builtins::date::iso_string;
use crate::value::{JsString, ObjectId, ObjectKind, Property, Value, number_to_string, to_integer};

/// Initialize the JSON object and add it to globals
pub fn init_json(interp: &mut Interpreter) -> Result<(), JsError> {
    let json = interp.create_object();
    interp.register_method(json, "parse", json_parse, 2)?;
    interp.register_method(json, "stringify", json_stringify, 3)?;
    interp.register_global("JSON", Value::Object(json))
}

impl Interpreter {
    /// Build guest values from a native JSON document. Objects and arrays
    /// are freshly allocated.
    pub fn native_to_pseudo(&mut self, json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::from(s.as_str()),
            serde_json::Value::Array(items) => {
                let elements = items.iter().map(|item| self.native_to_pseudo(item)).collect();
                Value::Object(self.create_array(elements))
            }
            serde_json::Value::Object(map) => {
                let entries: Vec<(JsString, Value)> = map
                    .iter()
                    .map(|(key, item)| (JsString::from(key.as_str()), self.native_to_pseudo(item)))
                    .collect();
                let object = self.create_object();
                if let Ok(target) = self.heap.object_mut(object) {
                    for (key, value) in entries {
                        target.properties.insert(key, Property::data(value));
                    }
                }
                Value::Object(object)
            }
        }
    }

    /// Convert a guest value into a native JSON document, following
    /// `JSON.stringify` rules. Values JSON cannot hold become `null`.
    pub fn pseudo_to_native(&self, value: Value) -> Result<serde_json::Value, JsError> {
        let converted = self.to_json(&value, None, &mut Vec::new())?;
        Ok(converted.unwrap_or(serde_json::Value::Null))
    }

    /// `None` means "omit": undefined and functions
    fn to_json(
        &self,
        value: &Value,
        allowed: Option<&[JsString]>,
        stack: &mut Vec<ObjectId>,
    ) -> Result<Option<serde_json::Value>, JsError> {
        let id = match value {
            Value::Undefined => return Ok(None),
            Value::Null => return Ok(Some(serde_json::Value::Null)),
            Value::Boolean(b) => return Ok(Some(serde_json::Value::Bool(*b))),
            Value::Number(n) => return Ok(Some(number_to_json(*n))),
            Value::String(s) => return Ok(Some(serde_json::Value::String(s.to_string()))),
            Value::Object(id) => *id,
        };

        let object = self.heap.object(id)?;
        match &object.kind {
            ObjectKind::Function(_) => return Ok(None),
            ObjectKind::Number(n) => return Ok(Some(number_to_json(*n))),
            ObjectKind::String(s) => return Ok(Some(serde_json::Value::String(s.to_string()))),
            ObjectKind::Boolean(b) => return Ok(Some(serde_json::Value::Bool(*b))),
            ObjectKind::Date(t) if t.is_finite() => {
                return Ok(Some(serde_json::Value::String(iso_string(*t))));
            }
            ObjectKind::Date(_) => return Ok(Some(serde_json::Value::Null)),
            _ => {}
        }

        if stack.contains(&id) {
            return Err(JsError::type_error("Converting circular structure to JSON"));
        }
        stack.push(id);
        let result = self.object_to_json(id, allowed, stack);
        stack.pop();
        result.map(Some)
    }

    fn object_to_json(
        &self,
        id: ObjectId,
        allowed: Option<&[JsString]>,
        stack: &mut Vec<ObjectId>,
    ) -> Result<serde_json::Value, JsError> {
        let base = Value::Object(id);
        let object = self.heap.object(id)?;

        if let ObjectKind::Array { length } = object.kind {
            let mut items = Vec::with_capacity(length as usize);
            for i in 0..length {
                let element = self.get_data(&base, &i.to_string())?;
                items.push(self.to_json(&element, allowed, stack)?.unwrap_or(serde_json::Value::Null));
            }
            return Ok(serde_json::Value::Array(items));
        }

        let keys: Vec<JsString> = match allowed {
            Some(list) => list
                .iter()
                .filter(|key| object.has_own_property(key.as_str()))
                .cloned()
                .collect(),
            None => object
                .own_keys()
                .into_iter()
                .filter(|key| {
                    object
                        .own_property(key.as_str())
                        .is_some_and(|property| property.enumerable)
                })
                .collect(),
        };

        let mut map = serde_json::Map::new();
        for key in keys {
            let item = self.get_data(&base, key.as_str())?;
            if let Some(converted) = self.to_json(&item, allowed, stack)? {
                map.insert(key.to_string(), converted);
            }
        }
        Ok(serde_json::Value::Object(map))
    }
}

/// Integral numbers in the safe range become JSON integers, the rest stay
/// floats (printed in JavaScript's number format by [`JsonFormatter`])
fn number_to_json(n: f64) -> serde_json::Value {
    if !n.is_finite() {
        return serde_json::Value::Null;
    }
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        return serde_json::Value::Number(serde_json::Number::from(n as i64));
    }
    serde_json::Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
}

/// Writes the `JSON.stringify` layout: compact when `indent` is empty,
/// otherwise one member per line with `": "` after keys
struct JsonFormatter<'a> {
    indent: &'a [u8],
    depth: usize,
    has_value: bool,
}

impl JsonFormatter<'_> {
    fn newline<W: ?Sized + io::Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.indent.is_empty() {
            return Ok(());
        }
        writer.write_all(b"\n")?;
        for _ in 0..self.depth {
            writer.write_all(self.indent)?;
        }
        Ok(())
    }

    fn begin<W: ?Sized + io::Write>(&mut self, writer: &mut W, open: &[u8]) -> io::Result<()> {
        self.depth += 1;
        self.has_value = false;
        writer.write_all(open)
    }

    fn end<W: ?Sized + io::Write>(&mut self, writer: &mut W, close: &[u8]) -> io::Result<()> {
        self.depth = self.depth.saturating_sub(1);
        if self.has_value {
            self.newline(writer)?;
        }
        writer.write_all(close)
    }

    fn member<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        if !first {
            writer.write_all(b",")?;
        }
        self.newline(writer)
    }
}

impl Formatter for JsonFormatter<'_> {
    fn write_f64<W: ?Sized + io::Write>(&mut self, writer: &mut W, value: f64) -> io::Result<()> {
        writer.write_all(number_to_string(value).as_bytes())
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.begin(writer, b"[")
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.end(writer, b"]")
    }

    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.member(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.begin(writer, b"{")
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.end(writer, b"}")
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.member(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(if self.indent.is_empty() { b":" } else { b": " })
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, _writer: &mut W) -> io::Result<()> {
        self.has_value = true;
        Ok(())
    }
}

/// Serialize `json` the way `JSON.stringify` lays text out
pub(crate) fn write_json(json: &serde_json::Value, indent: &str) -> Result<String, JsError> {
    let mut out = Vec::new();
    let formatter = JsonFormatter {
        indent: indent.as_bytes(),
        depth: 0,
        has_value: false,
    };
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    json.serialize(&mut serializer)
        .map_err(|e| JsError::internal(format!("JSON serialization failed: {}", e)))?;
    String::from_utf8(out).map_err(|e| JsError::internal(format!("JSON output is not UTF-8: {}", e)))
}

pub fn json_parse(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let text = interp.arg_string(args, 0)?;
    let json: serde_json::Value = serde_json::from_str(text.as_str()).map_err(|e| {
        JsError::runtime(ErrorKind::SyntaxError, format!("Unexpected token in JSON: {}", e))
    })?;
    Ok(interp.native_to_pseudo(&json))
}

/// JSON.stringify(value, replacer, space). An array replacer selects the
/// property names to keep; other replacers are ignored.
pub fn json_stringify(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let value = arg(args, 0);
    let allowed = replacer_keys(interp, &arg(args, 1))?;
    let indent = indent_string(interp, &arg(args, 2))?;

    let Some(json) = interp.to_json(&value, allowed.as_deref(), &mut Vec::new())? else {
        return Ok(Value::Undefined);
    };
    Ok(Value::from(write_json(&json, &indent)?))
}

/// Property whitelist from an array replacer, without duplicates
fn replacer_keys(interp: &Interpreter, replacer: &Value) -> Result<Option<Vec<JsString>>, JsError> {
    let Value::Object(id) = replacer else {
        return Ok(None);
    };
    if !matches!(interp.heap.object(*id)?.kind, ObjectKind::Array { .. }) {
        return Ok(None);
    }
    let mut keys: Vec<JsString> = Vec::new();
    for item in interp.array_like_to_vec(*id)? {
        let key = match &item {
            Value::String(s) => s.clone(),
            Value::Number(_) => interp.to_string(&item)?,
            Value::Object(inner) => match interp.heap.object(*inner)?.kind {
                ObjectKind::String(_) | ObjectKind::Number(_) => interp.to_string(&item)?,
                _ => continue,
            },
            _ => continue,
        };
        if !keys.contains(&key) {
            keys.push(key);
        }
    }
    Ok(Some(keys))
}

/// Gap string from the `space` argument: up to ten spaces or characters
fn indent_string(interp: &Interpreter, space: &Value) -> Result<String, JsError> {
    let space = interp.to_primitive(space, None)?;
    Ok(match space {
        Value::Number(n) => " ".repeat(to_integer(n).clamp(0.0, 10.0) as usize),
        Value::String(s) => s.as_str().chars().take(10).collect(),
        _ => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_json_compact() {
        let value = json!({"a": [1, 2.5, null], "b": "x\ny"});
        assert_eq!(write_json(&value, "").ok().as_deref(), Some(r#"{"a":[1,2.5,null],"b":"x\ny"}"#));
    }

    #[test]
    fn test_write_json_indented() {
        let value = json!({"a": [1], "b": {}, "c": []});
        let expected = "{\n  \"a\": [\n    1\n  ],\n  \"b\": {},\n  \"c\": []\n}";
        assert_eq!(write_json(&value, "  ").ok().as_deref(), Some(expected));
    }

    #[test]
    fn test_number_to_json() {
        assert_eq!(number_to_json(3.0), json!(3));
        assert_eq!(number_to_json(f64::NAN), serde_json::Value::Null);
        assert_eq!(write_json(&number_to_json(1e21), "").ok().as_deref(), Some("1e+21"));
    }
}
