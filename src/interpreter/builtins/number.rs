//! Number built-in methods

use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::interpreter::builtins::arg;
use crate::value::{ObjectKind, Value, number_to_string, to_integer};

/// Create the Number constructor with its constants and Number.prototype
pub fn init_number(interp: &mut Interpreter) -> Result<(), JsError> {
    let proto = interp.realm.number_prototype;
    let constructor = interp.register_constructor("Number", number_constructor, 1, proto)?;

    let constants = [
        ("MAX_VALUE", f64::MAX),
        ("MIN_VALUE", 5e-324),
        ("NaN", f64::NAN),
        ("POSITIVE_INFINITY", f64::INFINITY),
        ("NEGATIVE_INFINITY", f64::NEG_INFINITY),
    ];
    for (name, value) in constants {
        interp.register_constant(constructor, name, Value::Number(value))?;
    }

    interp.register_method(proto, "toString", number_to_string_method, 1)?;
    interp.register_method(proto, "toLocaleString", number_to_locale_string, 0)?;
    interp.register_method(proto, "toFixed", number_to_fixed, 1)?;
    interp.register_method(proto, "toExponential", number_to_exponential, 1)?;
    interp.register_method(proto, "toPrecision", number_to_precision, 1)?;
    interp.register_method(proto, "valueOf", number_value_of, 0)?;
    Ok(())
}

/// Number(value) converts; `new Number(value)` makes a wrapper
pub fn number_constructor(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let n = match args.first() {
        Some(value) => interp.to_number(value)?,
        None => 0.0,
    };
    if interp.called_with_new() {
        if let Value::Object(id) = this {
            interp.heap.object_mut(id)?.kind = ObjectKind::Number(n);
            return Ok(this);
        }
    }
    Ok(Value::Number(n))
}

/// Helper to extract the number value from `this`
/// Works for both primitive numbers and Number wrapper objects
fn this_number(interp: &Interpreter, this: &Value) -> Result<f64, JsError> {
    match this {
        Value::Number(n) => Ok(*n),
        Value::Object(id) => match interp.heap.object(*id)?.kind {
            ObjectKind::Number(n) => Ok(n),
            _ => Err(JsError::type_error(
                "Number.prototype method called on incompatible receiver",
            )),
        },
        _ => Err(JsError::type_error(
            "Number.prototype method called on incompatible receiver",
        )),
    }
}

/// Digit-count argument of toFixed/toExponential/toPrecision
fn digits_arg(interp: &Interpreter, args: &[Value], range: std::ops::RangeInclusive<i32>, method: &str) -> Result<Option<usize>, JsError> {
    let value = arg(args, 0);
    if value.is_undefined() {
        return Ok(None);
    }
    let digits = to_integer(interp.to_number(&value)?);
    if digits < f64::from(*range.start()) || digits > f64::from(*range.end()) {
        return Err(JsError::range_error(format!(
            "{}() digits argument must be between {} and {}",
            method,
            range.start(),
            range.end()
        )));
    }
    Ok(Some(digits as usize))
}

pub fn number_value_of(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    Ok(Value::Number(this_number(interp, &this)?))
}

pub fn number_to_locale_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    Ok(Value::from(number_to_string(this_number(interp, &this)?)))
}

pub fn number_to_string_method(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let n = this_number(interp, &this)?;
    let radix = match arg(args, 0) {
        Value::Undefined => 10.0,
        value => to_integer(interp.to_number(&value)?),
    };
    if !(2.0..=36.0).contains(&radix) {
        return Err(JsError::range_error("toString() radix must be between 2 and 36"));
    }
    if radix == 10.0 || !n.is_finite() {
        return Ok(Value::from(number_to_string(n)));
    }
    Ok(Value::from(to_radix_string(n, radix as u32)))
}

/// Digits of `n` in base `radix` (2..=36), with up to 52 fractional digits
pub(crate) fn to_radix_string(n: f64, radix: u32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let digit = |d: u32| DIGITS.get(d as usize).map_or('0', |&b| char::from(b));
    let base = f64::from(radix);

    let mut integer = n.abs().trunc();
    let mut fraction = n.abs() - integer;

    let mut int_digits = Vec::new();
    if integer == 0.0 {
        int_digits.push('0');
    }
    while integer >= 1.0 {
        let d = (integer % base) as u32;
        int_digits.push(digit(d));
        integer = (integer / base).trunc();
    }
    let mut result: String = if n < 0.0 { "-".to_string() } else { String::new() };
    result.extend(int_digits.iter().rev());

    if fraction > 0.0 {
        result.push('.');
        let mut count = 0;
        while fraction > 0.0 && count < 52 {
            fraction *= base;
            let d = fraction.trunc();
            result.push(digit(d as u32));
            fraction -= d;
            count += 1;
        }
    }
    result
}

pub fn number_to_fixed(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let n = this_number(interp, &this)?;
    let digits = digits_arg(interp, args, 0..=20, "toFixed")?.unwrap_or(0);
    if !n.is_finite() || n.abs() >= 1e21 {
        return Ok(Value::from(number_to_string(n)));
    }
    Ok(Value::from(to_fixed(n, digits)))
}

/// Fixed-point formatting, rounding exact ties away from zero
pub(crate) fn to_fixed(n: f64, digits: usize) -> String {
    let scale = 10f64.powi(digits as i32);
    let scaled = n.abs() * scale;
    let is_tie = scaled.fract() == 0.5 && scaled / scale == n.abs() && scaled < 9e15;
    let magnitude = if is_tie {
        let rounded = format!("{}", scaled.trunc() as u64 + 1);
        if digits == 0 {
            rounded
        } else {
            let padded = format!("{:0>width$}", rounded, width = digits + 1);
            let split = padded.len() - digits;
            format!(
                "{}.{}",
                padded.get(..split).unwrap_or("0"),
                padded.get(split..).unwrap_or_default()
            )
        }
    } else {
        format!("{:.prec$}", n.abs(), prec = digits)
    };
    let is_zero = magnitude.chars().all(|c| c == '0' || c == '.');
    if n < 0.0 && !is_zero {
        format!("-{}", magnitude)
    } else {
        magnitude
    }
}

pub fn number_to_exponential(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let n = this_number(interp, &this)?;
    let digits = digits_arg(interp, args, 0..=20, "toExponential")?;
    if !n.is_finite() {
        return Ok(Value::from(number_to_string(n)));
    }
    Ok(Value::from(to_exponential(n, digits)))
}

/// `1.23e+2` style; `None` picks the shortest round-tripping mantissa
pub(crate) fn to_exponential(n: f64, digits: Option<usize>) -> String {
    let formatted = match digits {
        Some(prec) => format!("{:.prec$e}", n),
        None => format!("{:e}", n),
    };
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if exponent.starts_with('-') => format!("{}e{}", mantissa, exponent),
        Some((mantissa, exponent)) => format!("{}e+{}", mantissa, exponent),
        None => formatted,
    }
}

pub fn number_to_precision(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let n = this_number(interp, &this)?;
    if arg(args, 0).is_undefined() {
        return Ok(Value::from(number_to_string(n)));
    }
    let precision = digits_arg(interp, args, 1..=21, "toPrecision")?.unwrap_or(1);
    if !n.is_finite() {
        return Ok(Value::from(number_to_string(n)));
    }
    Ok(Value::from(to_precision(n, precision)))
}

pub(crate) fn to_precision(n: f64, precision: usize) -> String {
    if n == 0.0 {
        return to_fixed(0.0, precision - 1);
    }
    let exponential = format!("{:.prec$e}", n, prec = precision - 1);
    let exponent: i32 = exponential
        .split_once('e')
        .and_then(|(_, e)| e.parse().ok())
        .unwrap_or(0);
    if exponent < -6 || exponent >= precision as i32 {
        return to_exponential(n, Some(precision - 1));
    }
    let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
    to_fixed(n, decimals)
}
