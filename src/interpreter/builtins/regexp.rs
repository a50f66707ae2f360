//! RegExp built-in: construction, exec/test/toString, and the bridge to the
//! platform regex runner used by the String methods as well

use crate::error::{ErrorKind, JsError};
use crate::interpreter::Interpreter;
use crate::interpreter::builtins::arg;
use crate::interpreter::builtins::string::{byte_to_utf16, utf16_to_byte};
use crate::platform::regex::{self, RegexError, RegexMatch, RegexOp, RegexOutcome, RegexRequest};
use crate::value::{
    JsObject, JsString, ObjectId, ObjectKind, Property, RegExpData, RegExpFlags, Value, to_integer,
};

pub fn init_regexp(interp: &mut Interpreter) -> Result<(), JsError> {
    let proto = interp.realm.regexp_prototype;
    interp.register_constructor("RegExp", regexp_constructor, 2, proto)?;
    interp.register_method(proto, "exec", regexp_exec, 1)?;
    interp.register_method(proto, "test", regexp_test, 1)?;
    interp.register_method(proto, "toString", regexp_to_string, 0)?;
    Ok(())
}

impl Interpreter {
    /// Allocate a RegExp object for `pattern` and `flags`
    pub(crate) fn create_regexp(&mut self, pattern: &str, flags: &str) -> Result<ObjectId, JsError> {
        let Some(parsed) = RegExpFlags::parse(flags) else {
            return Err(JsError::runtime(
                ErrorKind::SyntaxError,
                format!("Invalid flags supplied to RegExp constructor '{}'", flags),
            ));
        };
        let source = if pattern.is_empty() { "(?:)" } else { pattern };
        if let Err(RegexError::Syntax(message)) = regex::validate(source, parsed.ignore_case, parsed.multiline) {
            return Err(JsError::runtime(
                ErrorKind::SyntaxError,
                format!("Invalid regular expression: /{}/: {}", source, message),
            ));
        }

        let mut object = JsObject::new(
            ObjectKind::RegExp(RegExpData {
                source: JsString::from(source),
                flags: parsed,
            }),
            Some(self.realm.regexp_prototype),
        );
        let properties = [
            ("source", Value::from(source)),
            ("global", Value::Boolean(parsed.global)),
            ("ignoreCase", Value::Boolean(parsed.ignore_case)),
            ("multiline", Value::Boolean(parsed.multiline)),
        ];
        for (name, value) in properties {
            object.properties.insert(JsString::from(name), Property::frozen(value));
        }
        object.properties.insert(
            JsString::from("lastIndex"),
            Property::with_flags(Value::Number(0.0), true, false, false),
        );
        Ok(self.heap.alloc(object))
    }

    /// Regex data of `value`, if it is a RegExp object
    pub(crate) fn regexp_data(&self, value: &Value) -> Result<Option<RegExpData>, JsError> {
        let Value::Object(id) = value else {
            return Ok(None);
        };
        match &self.heap.object(*id)?.kind {
            ObjectKind::RegExp(data) => Ok(Some(data.clone())),
            _ => Ok(None),
        }
    }

    /// Run one regex operation under the configured regex mode
    pub(crate) fn run_regex(&self, data: &RegExpData, input: &str, op: RegexOp) -> Result<RegexOutcome, JsError> {
        let request = RegexRequest {
            source: data.source.to_string(),
            ignore_case: data.flags.ignore_case,
            multiline: data.flags.multiline,
            input: input.to_string(),
            op,
        };
        regex::execute(request, self.config.regex_mode, self.config.regex_timeout).map_err(|err| match err {
            RegexError::Refused => JsError::runtime(
                ErrorKind::Error,
                "Regular expressions are disabled",
            ),
            RegexError::Timeout => {
                log::warn!(
                    "regex /{}/ timed out after {:?}",
                    data.source,
                    self.config.regex_timeout
                );
                JsError::runtime(ErrorKind::Error, format!("RegExp Timeout: /{}/", data.source))
            }
            RegexError::Syntax(message) => JsError::runtime(
                ErrorKind::SyntaxError,
                format!("Invalid regular expression: /{}/: {}", data.source, message),
            ),
            RegexError::Runtime(message) => JsError::runtime(ErrorKind::Error, message),
        })
    }

    /// First match at or after UTF-16 index `start`
    pub(crate) fn regex_exec_at(
        &self,
        data: &RegExpData,
        input: &str,
        start: usize,
    ) -> Result<Option<RegexMatch>, JsError> {
        let op = RegexOp::Exec {
            start: utf16_to_byte(input, start),
        };
        match self.run_regex(data, input, op)? {
            RegexOutcome::Match(found) => Ok(found),
            RegexOutcome::All(all) => Ok(all.into_iter().next()),
        }
    }

    pub(crate) fn regex_find_all(&self, data: &RegExpData, input: &str) -> Result<Vec<RegexMatch>, JsError> {
        match self.run_regex(data, input, RegexOp::FindAll)? {
            RegexOutcome::All(all) => Ok(all),
            RegexOutcome::Match(found) => Ok(found.into_iter().collect()),
        }
    }

    /// The array `exec` returns: whole match, groups, `index` and `input`
    pub(crate) fn match_to_array(&mut self, input: &JsString, found: &RegexMatch) -> Result<ObjectId, JsError> {
        let text = input.as_str();
        let elements = found
            .captures
            .iter()
            .map(|group| match group {
                Some((start, end)) => text
                    .get(*start..*end)
                    .map(Value::from)
                    .unwrap_or_default(),
                None => Value::Undefined,
            })
            .collect();
        let array = self.create_array(elements);
        let index = byte_to_utf16(text, found.start);
        self.put(array, "index", Value::Number(index as f64))?;
        self.put(array, "input", Value::String(input.clone()))?;
        Ok(array)
    }
}

/// RegExp data of `this`, or a TypeError naming `method`
fn this_regexp(interp: &Interpreter, this: &Value, method: &str) -> Result<(ObjectId, RegExpData), JsError> {
    if let (Value::Object(id), Some(data)) = (this, interp.regexp_data(this)?) {
        return Ok((*id, data));
    }
    Err(JsError::type_error(format!(
        "RegExp.prototype.{} requires that 'this' be a RegExp object",
        method
    )))
}

pub fn regexp_constructor(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let pattern = arg(args, 0);
    let flags = arg(args, 1);
    if let Some(data) = interp.regexp_data(&pattern)? {
        if !flags.is_undefined() {
            return Err(JsError::type_error(
                "Cannot supply flags when constructing one RegExp from another",
            ));
        }
        if !interp.called_with_new() {
            return Ok(pattern);
        }
        let copy = interp.create_regexp(data.source.as_str(), &data.flags.to_string())?;
        return Ok(Value::Object(copy));
    }

    let pattern = match pattern {
        Value::Undefined => JsString::from(""),
        other => interp.to_string(&other)?,
    };
    let flags = match flags {
        Value::Undefined => JsString::from(""),
        other => interp.to_string(&other)?,
    };
    Ok(Value::Object(interp.create_regexp(pattern.as_str(), flags.as_str())?))
}

/// RegExp.prototype.exec, honouring and updating `lastIndex` for global
/// expressions
pub fn regexp_exec(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let (id, data) = this_regexp(interp, &this, "exec")?;
    let input = interp.arg_string(args, 0)?;

    let last_index = if data.flags.global {
        to_integer(interp.to_number(&interp.get_data(&this, "lastIndex")?)?)
    } else {
        0.0
    };
    if last_index < 0.0 || last_index > input.utf16_len() as f64 {
        interp.put(id, "lastIndex", Value::Number(0.0))?;
        return Ok(Value::Null);
    }

    let Some(found) = interp.regex_exec_at(&data, input.as_str(), last_index as usize)? else {
        interp.put(id, "lastIndex", Value::Number(0.0))?;
        return Ok(Value::Null);
    };
    if data.flags.global {
        let end = byte_to_utf16(input.as_str(), found.end);
        interp.put(id, "lastIndex", Value::Number(end as f64))?;
    }
    Ok(Value::Object(interp.match_to_array(&input, &found)?))
}

pub fn regexp_test(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let result = regexp_exec(interp, this, args)?;
    Ok(Value::Boolean(!matches!(result, Value::Null)))
}

pub fn regexp_to_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let (_, data) = this_regexp(interp, &this, "toString")?;
    Ok(Value::from(format!("/{}/{}", data.source, data.flags)))
}
