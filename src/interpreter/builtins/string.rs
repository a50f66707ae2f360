//! String built-in methods
//!
//! Indices seen by guest code count UTF-16 code units. Methods convert to
//! unit vectors where positions matter; halves of a surrogate pair come back
//! as U+FFFD.

use std::cmp::Ordering;

use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::interpreter::builtins::arg;
use crate::platform::regex::RegexMatch;
use crate::value::{
    JsString, ObjectKind, RegExpData, Value, is_js_whitespace, to_integer, to_uint16, to_uint32,
};

pub fn init_string(interp: &mut Interpreter) -> Result<(), JsError> {
    let proto = interp.realm.string_prototype;
    let constructor = interp.register_constructor("String", string_constructor, 1, proto)?;
    interp.register_method(constructor, "fromCharCode", string_from_char_code, 1)?;

    // Character access
    interp.register_method(proto, "charAt", string_char_at, 1)?;
    interp.register_method(proto, "charCodeAt", string_char_code_at, 1)?;

    // Search methods
    interp.register_method(proto, "indexOf", string_index_of, 1)?;
    interp.register_method(proto, "lastIndexOf", string_last_index_of, 1)?;
    interp.register_method(proto, "search", string_search, 1)?;
    interp.register_method(proto, "match", string_match, 1)?;

    // Extraction methods
    interp.register_method(proto, "slice", string_slice, 2)?;
    interp.register_method(proto, "substring", string_substring, 2)?;
    interp.register_method(proto, "substr", string_substr, 2)?;

    // Case conversion
    interp.register_method(proto, "toLowerCase", string_to_lower_case, 0)?;
    interp.register_method(proto, "toUpperCase", string_to_upper_case, 0)?;
    interp.register_method(proto, "toLocaleLowerCase", string_to_lower_case, 0)?;
    interp.register_method(proto, "toLocaleUpperCase", string_to_upper_case, 0)?;

    // Whitespace handling
    interp.register_method(proto, "trim", string_trim, 0)?;
    interp.register_method(proto, "trimLeft", string_trim_left, 0)?;
    interp.register_method(proto, "trimRight", string_trim_right, 0)?;

    // Transformation methods
    interp.register_method(proto, "concat", string_concat, 1)?;
    interp.register_method(proto, "split", string_split, 2)?;
    interp.register_method(proto, "replace", string_replace, 2)?;

    // Comparison
    interp.register_method(proto, "localeCompare", string_locale_compare, 1)?;

    // Primitive conversion
    interp.register_method(proto, "toString", string_value_of, 0)?;
    interp.register_method(proto, "valueOf", string_value_of, 0)?;
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// UTF-16 helpers
// ═══════════════════════════════════════════════════════════════════════════════

fn units(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

fn from_units(units: &[u16]) -> Value {
    Value::from(String::from_utf16_lossy(units))
}

/// Byte offset of UTF-16 index `index`, rounding up out of a surrogate pair
/// and clamping to the end of `s`
pub(crate) fn utf16_to_byte(s: &str, index: usize) -> usize {
    let mut units = 0;
    for (byte, c) in s.char_indices() {
        if units >= index {
            return byte;
        }
        units += c.len_utf16();
    }
    s.len()
}

/// UTF-16 index of a byte offset that lies on a char boundary
pub(crate) fn byte_to_utf16(s: &str, byte: usize) -> usize {
    s.get(..byte).map_or_else(|| s.encode_utf16().count(), |prefix| prefix.encode_utf16().count())
}

/// First position at or after `from` where `needle` occurs in `haystack`
fn find_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return (from <= haystack.len()).then_some(from);
    }
    (from..haystack.len())
        .find(|&i| haystack.get(i..i + needle.len()) == Some(needle))
}

/// Last position at or before `from` where `needle` occurs in `haystack`
fn rfind_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    let last_start = haystack.len().checked_sub(needle.len())?;
    (0..=from.min(last_start))
        .rev()
        .find(|&i| haystack.get(i..i + needle.len()) == Some(needle))
}

/// Clamp a relative position (negative counts from the end) into `0..=len`
fn relative_position(position: f64, len: usize) -> usize {
    let len_f = len as f64;
    if position < 0.0 {
        (len_f + position).max(0.0) as usize
    } else {
        position.min(len_f) as usize
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Receivers
// ═══════════════════════════════════════════════════════════════════════════════

/// CheckObjectCoercible(this) then ToString(this)
fn this_string(interp: &Interpreter, this: &Value, method: &str) -> Result<JsString, JsError> {
    if this.is_null_or_undefined() {
        return Err(JsError::type_error(format!(
            "String.prototype.{} called on null or undefined",
            method
        )));
    }
    interp.to_string(this)
}

pub fn string_constructor(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let s = match args.first() {
        Some(value) => interp.to_string(value)?,
        None => JsString::from(""),
    };
    if interp.called_with_new() {
        if let Value::Object(id) = this {
            interp.heap.object_mut(id)?.kind = ObjectKind::String(s);
            return Ok(this);
        }
    }
    Ok(Value::String(s))
}

pub fn string_from_char_code(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let units = args
        .iter()
        .map(|value| interp.to_number(value).map(to_uint16))
        .collect::<Result<Vec<u16>, JsError>>()?;
    Ok(from_units(&units))
}

/// toString and valueOf: only strings and String wrappers qualify
pub fn string_value_of(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    match &this {
        Value::String(s) => Ok(Value::String(s.clone())),
        Value::Object(id) => match &interp.heap.object(*id)?.kind {
            ObjectKind::String(s) => Ok(Value::String(s.clone())),
            _ => Err(JsError::type_error("String.prototype.valueOf requires that 'this' be a String")),
        },
        _ => Err(JsError::type_error("String.prototype.valueOf requires that 'this' be a String")),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Character access and search
// ═══════════════════════════════════════════════════════════════════════════════

pub fn string_char_at(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let s = this_string(interp, &this, "charAt")?;
    let position = to_integer(interp.arg_number(args, 0)?);
    let units = units(s.as_str());
    if position < 0.0 || position >= units.len() as f64 {
        return Ok(Value::from(""));
    }
    Ok(units
        .get(position as usize)
        .map(|unit| from_units(&[*unit]))
        .unwrap_or_else(|| Value::from("")))
}

pub fn string_char_code_at(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let s = this_string(interp, &this, "charCodeAt")?;
    let position = to_integer(interp.arg_number(args, 0)?);
    if position < 0.0 {
        return Ok(Value::Number(f64::NAN));
    }
    let code = s.as_str().encode_utf16().nth(position as usize);
    Ok(Value::Number(code.map_or(f64::NAN, f64::from)))
}

pub fn string_index_of(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let s = this_string(interp, &this, "indexOf")?;
    let search = interp.arg_string(args, 0)?;
    let position = to_integer(interp.arg_number(args, 1)?);
    let haystack = units(s.as_str());
    let start = position.clamp(0.0, haystack.len() as f64) as usize;
    let found = find_units(&haystack, &units(search.as_str()), start);
    Ok(Value::Number(found.map_or(-1.0, |i| i as f64)))
}

pub fn string_last_index_of(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let s = this_string(interp, &this, "lastIndexOf")?;
    let search = interp.arg_string(args, 0)?;
    let position = interp.arg_number(args, 1)?;
    let haystack = units(s.as_str());
    let start = if position.is_nan() {
        haystack.len()
    } else {
        to_integer(position).clamp(0.0, haystack.len() as f64) as usize
    };
    let found = rfind_units(&haystack, &units(search.as_str()), start);
    Ok(Value::Number(found.map_or(-1.0, |i| i as f64)))
}

impl Interpreter {
    /// The RegExp for a `match`/`search`/`split` argument: RegExp objects as
    /// they are, anything else compiled from its string form
    fn regexp_argument(&mut self, value: &Value) -> Result<RegExpData, JsError> {
        if let Some(data) = self.regexp_data(value)? {
            return Ok(data);
        }
        let pattern = match value {
            Value::Undefined => JsString::from(""),
            other => self.to_string(other)?,
        };
        let id = self.create_regexp(pattern.as_str(), "")?;
        self.regexp_data(&Value::Object(id))?
            .ok_or_else(|| JsError::internal("RegExp without regex data"))
    }
}

pub fn string_search(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let s = this_string(interp, &this, "search")?;
    let data = interp.regexp_argument(&arg(args, 0))?;
    let index = match interp.regex_exec_at(&data, s.as_str(), 0)? {
        Some(found) => byte_to_utf16(s.as_str(), found.start) as f64,
        None => -1.0,
    };
    Ok(Value::Number(index))
}

pub fn string_match(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let s = this_string(interp, &this, "match")?;
    let pattern = arg(args, 0);
    let data = interp.regexp_argument(&pattern)?;
    if !data.flags.global {
        let Some(found) = interp.regex_exec_at(&data, s.as_str(), 0)? else {
            return Ok(Value::Null);
        };
        return Ok(Value::Object(interp.match_to_array(&s, &found)?));
    }

    if let Value::Object(id) = pattern {
        interp.put(id, "lastIndex", Value::Number(0.0))?;
    }
    let matches = interp.regex_find_all(&data, s.as_str())?;
    if matches.is_empty() {
        return Ok(Value::Null);
    }
    let elements = matches
        .iter()
        .map(|found| {
            s.as_str()
                .get(found.start..found.end)
                .map(Value::from)
                .unwrap_or_default()
        })
        .collect();
    Ok(Value::Object(interp.create_array(elements)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Extraction
// ═══════════════════════════════════════════════════════════════════════════════

pub fn string_slice(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let s = this_string(interp, &this, "slice")?;
    let units = units(s.as_str());
    let len = units.len();
    let start = relative_position(to_integer(interp.arg_number(args, 0)?), len);
    let end = match arg(args, 1) {
        Value::Undefined => len,
        value => relative_position(to_integer(interp.to_number(&value)?), len),
    };
    Ok(from_units(units.get(start..end.max(start)).unwrap_or_default()))
}

pub fn string_substring(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let s = this_string(interp, &this, "substring")?;
    let units = units(s.as_str());
    let len = units.len() as f64;
    let start = to_integer(interp.arg_number(args, 0)?).clamp(0.0, len) as usize;
    let end = match arg(args, 1) {
        Value::Undefined => units.len(),
        value => to_integer(interp.to_number(&value)?).clamp(0.0, len) as usize,
    };
    let (from, to) = if start <= end { (start, end) } else { (end, start) };
    Ok(from_units(units.get(from..to).unwrap_or_default()))
}

pub fn string_substr(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let s = this_string(interp, &this, "substr")?;
    let units = units(s.as_str());
    let len = units.len();
    let start = relative_position(to_integer(interp.arg_number(args, 0)?), len);
    let count = match arg(args, 1) {
        Value::Undefined => len as f64,
        value => to_integer(interp.to_number(&value)?),
    };
    let end = (start as f64 + count.max(0.0)).min(len as f64) as usize;
    Ok(from_units(units.get(start..end.max(start)).unwrap_or_default()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Case and whitespace
// ═══════════════════════════════════════════════════════════════════════════════

pub fn string_to_lower_case(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let s = this_string(interp, &this, "toLowerCase")?;
    Ok(Value::from(s.as_str().to_lowercase()))
}

pub fn string_to_upper_case(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let s = this_string(interp, &this, "toUpperCase")?;
    Ok(Value::from(s.as_str().to_uppercase()))
}

pub fn string_trim(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let s = this_string(interp, &this, "trim")?;
    Ok(Value::from(s.as_str().trim_matches(is_js_whitespace)))
}

pub fn string_trim_left(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let s = this_string(interp, &this, "trimLeft")?;
    Ok(Value::from(s.as_str().trim_start_matches(is_js_whitespace)))
}

pub fn string_trim_right(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let s = this_string(interp, &this, "trimRight")?;
    Ok(Value::from(s.as_str().trim_end_matches(is_js_whitespace)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Transformation
// ═══════════════════════════════════════════════════════════════════════════════

pub fn string_concat(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let s = this_string(interp, &this, "concat")?;
    let mut result = s.to_string();
    for value in args {
        result.push_str(interp.to_string(value)?.as_str());
    }
    Ok(Value::from(result))
}

pub fn string_split(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let s = this_string(interp, &this, "split")?;
    let limit = match arg(args, 1) {
        Value::Undefined => u32::MAX as usize,
        value => to_uint32(interp.to_number(&value)?) as usize,
    };
    let separator = arg(args, 0);
    let mut parts: Vec<Value> = Vec::new();

    if let Some(data) = interp.regexp_data(&separator)? {
        let text = s.as_str();
        if text.is_empty() {
            if interp.regex_exec_at(&data, text, 0)?.is_none() {
                parts.push(Value::String(s.clone()));
            }
        } else {
            let mut position = 0;
            for found in interp.regex_find_all(&data, text)? {
                if found.end == position || found.start >= text.len() {
                    continue;
                }
                parts.push(text.get(position..found.start).map(Value::from).unwrap_or_default());
                for group in found.captures.iter().skip(1) {
                    parts.push(
                        group
                            .and_then(|(start, end)| text.get(start..end))
                            .map(Value::from)
                            .unwrap_or_default(),
                    );
                }
                position = found.end;
            }
            parts.push(text.get(position..).map(Value::from).unwrap_or_default());
        }
    } else if separator.is_undefined() {
        parts.push(Value::String(s.clone()));
    } else {
        let separator = interp.to_string(&separator)?;
        if separator.is_empty() {
            parts.extend(s.as_str().encode_utf16().map(|unit| from_units(&[unit])));
        } else {
            parts.extend(s.as_str().split(separator.as_str()).map(Value::from));
        }
    }

    parts.truncate(limit);
    Ok(Value::Object(interp.create_array(parts)))
}

/// Expand `$$`, `$&`, `` $` ``, `$'` and `$n`/`$nn` in a replacement string.
/// Offsets in `found` are byte offsets into `input`.
fn expand_replacement(replacement: &str, input: &str, found: &RegexMatch) -> String {
    let group = |n: usize| -> Option<&str> {
        let (start, end) = found.captures.get(n).copied().flatten()?;
        input.get(start..end)
    };
    let group_count = found.captures.len().saturating_sub(1);
    let chars: Vec<char> = replacement.chars().collect();
    let mut result = String::with_capacity(replacement.len());
    let mut i = 0;

    while let Some(&c) = chars.get(i) {
        if c != '$' {
            result.push(c);
            i += 1;
            continue;
        }
        match chars.get(i + 1).copied() {
            Some('$') => {
                result.push('$');
                i += 2;
            }
            Some('&') => {
                result.push_str(input.get(found.start..found.end).unwrap_or_default());
                i += 2;
            }
            Some('`') => {
                result.push_str(input.get(..found.start).unwrap_or_default());
                i += 2;
            }
            Some('\'') => {
                result.push_str(input.get(found.end..).unwrap_or_default());
                i += 2;
            }
            Some(d) if d.is_ascii_digit() => {
                let first = d.to_digit(10).unwrap_or(0) as usize;
                let two = chars
                    .get(i + 2)
                    .and_then(|next| next.to_digit(10))
                    .map(|second| first * 10 + second as usize);
                match two {
                    Some(n) if n >= 1 && n <= group_count => {
                        result.push_str(group(n).unwrap_or_default());
                        i += 3;
                    }
                    _ if first >= 1 && first <= group_count => {
                        result.push_str(group(first).unwrap_or_default());
                        i += 2;
                    }
                    _ => {
                        result.push('$');
                        i += 1;
                    }
                }
            }
            _ => {
                result.push('$');
                i += 1;
            }
        }
    }
    result
}

/// String.prototype.replace with a string replacement. A function
/// replacement is routed here by the polyfill after it has been called.
pub fn string_replace(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let s = this_string(interp, &this, "replace")?;
    let pattern = arg(args, 0);
    let replacement = interp.arg_string(args, 1)?;
    let text = s.as_str();

    let matches = if let Some(data) = interp.regexp_data(&pattern)? {
        if data.flags.global {
            if let Value::Object(id) = pattern {
                interp.put(id, "lastIndex", Value::Number(0.0))?;
            }
            interp.regex_find_all(&data, text)?
        } else {
            interp.regex_exec_at(&data, text, 0)?.into_iter().collect()
        }
    } else {
        let needle = interp.to_string(&pattern)?;
        text.find(needle.as_str())
            .map(|start| {
                let end = start + needle.as_str().len();
                RegexMatch {
                    start,
                    end,
                    captures: vec![Some((start, end))],
                }
            })
            .into_iter()
            .collect()
    };

    let mut result = String::with_capacity(text.len());
    let mut last = 0;
    for found in &matches {
        result.push_str(text.get(last..found.start).unwrap_or_default());
        result.push_str(&expand_replacement(replacement.as_str(), text, found));
        last = found.end;
    }
    result.push_str(text.get(last..).unwrap_or_default());
    Ok(Value::from(result))
}

pub fn string_locale_compare(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let s = this_string(interp, &this, "localeCompare")?;
    let other = interp.arg_string(args, 0)?;
    let order = match s.as_str().cmp(other.as_str()) {
        Ordering::Less => -1.0,
        Ordering::Equal => 0.0,
        Ordering::Greater => 1.0,
    };
    Ok(Value::Number(order))
}
