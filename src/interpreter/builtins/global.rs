//! Global functions and constants (parseInt, parseFloat, URI functions, etc.)

use crate::error::{ErrorKind, JsError};
use crate::interpreter::Interpreter;
use crate::interpreter::builtins::arg;
use crate::value::{FunctionKind, JsString, Value, is_js_whitespace, to_int32};

/// Register global constants and functions on the global object
pub fn init_global(interp: &mut Interpreter) -> Result<(), JsError> {
    let global = interp.global_object();
    interp.register_constant(global, "NaN", Value::Number(f64::NAN))?;
    interp.register_constant(global, "Infinity", Value::Number(f64::INFINITY))?;
    interp.register_constant(global, "undefined", Value::Undefined)?;

    let eval = interp.alloc_function("eval", FunctionKind::Eval, 1);
    interp.register_global("eval", Value::Object(eval))?;

    interp.register_method(global, "isNaN", global_is_nan, 1)?;
    interp.register_method(global, "isFinite", global_is_finite, 1)?;
    interp.register_method(global, "parseInt", global_parse_int, 2)?;
    interp.register_method(global, "parseFloat", global_parse_float, 1)?;
    interp.register_method(global, "encodeURI", global_encode_uri, 1)?;
    interp.register_method(global, "decodeURI", global_decode_uri, 1)?;
    interp.register_method(global, "encodeURIComponent", global_encode_uri_component, 1)?;
    interp.register_method(global, "decodeURIComponent", global_decode_uri_component, 1)?;
    interp.register_method(global, "escape", global_escape, 1)?;
    interp.register_method(global, "unescape", global_unescape, 1)?;
    Ok(())
}

pub fn global_is_nan(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    Ok(Value::Boolean(interp.arg_number(args, 0)?.is_nan()))
}

pub fn global_is_finite(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    Ok(Value::Boolean(interp.arg_number(args, 0)?.is_finite()))
}

pub fn global_parse_int(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let string = interp.arg_string(args, 0)?;
    let radix = to_int32(interp.to_number(&arg(args, 1))?);
    Ok(Value::Number(parse_int(string.as_str(), radix)))
}

/// The parseInt algorithm: optional sign, optional hex prefix, then the
/// longest run of digits valid in `radix`
pub(crate) fn parse_int(input: &str, radix: i32) -> f64 {
    let s = input.trim_start_matches(is_js_whitespace);
    let (negative, s) = if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    };

    let mut radix = radix;
    let mut s = s;
    if radix == 0 || radix == 16 {
        if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            s = rest;
            radix = 16;
        }
    }
    if radix == 0 {
        radix = 10;
    }
    if !(2..=36).contains(&radix) {
        return f64::NAN;
    }

    let mut result = 0.0;
    let mut found_digit = false;
    for c in s.chars() {
        let Some(digit) = c.to_digit(radix as u32) else {
            break;
        };
        found_digit = true;
        result = result * f64::from(radix) + f64::from(digit);
    }
    if !found_digit {
        return f64::NAN;
    }
    if negative { -result } else { result }
}

pub fn global_parse_float(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let string = interp.arg_string(args, 0)?;
    Ok(Value::Number(parse_float(string.as_str())))
}

/// Longest prefix that forms a decimal literal
pub(crate) fn parse_float(input: &str) -> f64 {
    let s = input.trim_start_matches(is_js_whitespace);
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    if unsigned.starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let mut end = s.len() - unsigned.len();
    let mut has_dot = false;
    let mut has_digit = false;
    let mut valid_end = 0;
    let bytes = unsigned.as_bytes();
    let mut i = 0;
    while let Some(&b) = bytes.get(i) {
        match b {
            b'0'..=b'9' => {
                has_digit = true;
                valid_end = i + 1;
            }
            b'.' if !has_dot => has_dot = true,
            b'e' | b'E' if has_digit => {
                let mut j = i + 1;
                if matches!(bytes.get(j), Some(b'+' | b'-')) {
                    j += 1;
                }
                let digits_start = j;
                while matches!(bytes.get(j), Some(b'0'..=b'9')) {
                    j += 1;
                }
                if j > digits_start {
                    valid_end = j;
                }
                break;
            }
            _ => break,
        }
        i += 1;
    }
    if !has_digit {
        return f64::NAN;
    }
    end += valid_end;
    s.get(..end)
        .and_then(|prefix| prefix.parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

// ═══════════════════════════════════════════════════════════════════════════════
// URI functions
// ═══════════════════════════════════════════════════════════════════════════════

const URI_UNESCAPED: &str = "-_.!~*'()";
const URI_RESERVED: &str = ";/?:@&=+$,#";

fn uri_error() -> JsError {
    JsError::runtime(ErrorKind::URIError, "URI malformed")
}

fn encode(input: &str, keep: &str) -> String {
    let mut result = String::with_capacity(input.len());
    for c in input.chars() {
        if c.is_ascii_alphanumeric() || keep.contains(c) {
            result.push(c);
        } else {
            let mut buffer = [0u8; 4];
            for byte in c.encode_utf8(&mut buffer).bytes() {
                result.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    result
}

/// Percent-decode `input`. With `preserve_reserved`, escapes of reserved
/// characters stay encoded (decodeURI).
fn decode(input: &str, preserve_reserved: bool) -> Result<String, JsError> {
    let bytes = input.as_bytes();
    let hex_at = |i: usize| -> Option<u8> {
        let digits = input.get(i + 1..i + 3)?;
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        u8::from_str_radix(digits, 16).ok()
    };

    let mut result = String::with_capacity(input.len());
    let mut i = 0;
    while let Some(&b) = bytes.get(i) {
        if b != b'%' {
            let rest = input.get(i..).unwrap_or_default();
            let Some(c) = rest.chars().next() else {
                break;
            };
            result.push(c);
            i += c.len_utf8();
            continue;
        }

        let first = hex_at(i).ok_or_else(uri_error)?;
        if first < 0x80 {
            let c = char::from(first);
            if preserve_reserved && URI_RESERVED.contains(c) {
                result.push_str(input.get(i..i + 3).unwrap_or_default());
            } else {
                result.push(c);
            }
            i += 3;
            continue;
        }

        let width = match first {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => return Err(uri_error()),
        };
        let mut sequence = vec![first];
        for k in 1..width {
            let at = i + 3 * k;
            if bytes.get(at) != Some(&b'%') {
                return Err(uri_error());
            }
            sequence.push(hex_at(at).ok_or_else(uri_error)?);
        }
        let decoded = std::str::from_utf8(&sequence).map_err(|_| uri_error())?;
        result.push_str(decoded);
        i += 3 * width;
    }
    Ok(result)
}

pub fn global_encode_uri(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let s = interp.arg_string(args, 0)?;
    let keep = format!("{}{}", URI_UNESCAPED, URI_RESERVED);
    Ok(Value::from(encode(s.as_str(), &keep)))
}

pub fn global_encode_uri_component(
    interp: &mut Interpreter,
    _this: Value,
    args: &[Value],
) -> Result<Value, JsError> {
    let s = interp.arg_string(args, 0)?;
    Ok(Value::from(encode(s.as_str(), URI_UNESCAPED)))
}

pub fn global_decode_uri(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let s = interp.arg_string(args, 0)?;
    Ok(Value::from(decode(s.as_str(), true)?))
}

pub fn global_decode_uri_component(
    interp: &mut Interpreter,
    _this: Value,
    args: &[Value],
) -> Result<Value, JsError> {
    let s = interp.arg_string(args, 0)?;
    Ok(Value::from(decode(s.as_str(), false)?))
}

pub fn global_escape(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let s = interp.arg_string(args, 0)?;
    let mut result = String::new();
    for unit in s.as_str().encode_utf16() {
        match char::from_u32(u32::from(unit)) {
            Some(c) if c.is_ascii_alphanumeric() || "@*_+-./".contains(c) => result.push(c),
            _ if unit < 256 => result.push_str(&format!("%{:02X}", unit)),
            _ => result.push_str(&format!("%u{:04X}", unit)),
        }
    }
    Ok(Value::from(result))
}

pub fn global_unescape(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let s = interp.arg_string(args, 0)?;
    let units: Vec<u16> = s.as_str().encode_utf16().collect();
    let hex = |range: &[u16]| -> Option<u16> {
        let text = String::from_utf16(range).ok()?;
        if !text.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        u16::from_str_radix(&text, 16).ok()
    };

    let mut result = Vec::with_capacity(units.len());
    let mut i = 0;
    while let Some(&unit) = units.get(i) {
        if unit == u16::from(b'%') {
            if units.get(i + 1) == Some(&u16::from(b'u')) {
                if let Some(decoded) = units.get(i + 2..i + 6).and_then(hex) {
                    result.push(decoded);
                    i += 6;
                    continue;
                }
            } else if let Some(decoded) = units.get(i + 1..i + 3).and_then(hex) {
                result.push(decoded);
                i += 3;
                continue;
            }
        }
        result.push(unit);
        i += 1;
    }
    Ok(Value::from(JsString::from(String::from_utf16_lossy(&result))))
}
