//! Math built-in methods

use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::platform;
use crate::value::Value;

/// Create the Math object with all math methods and constants
pub fn init_math(interp: &mut Interpreter) -> Result<(), JsError> {
    let math = interp.create_object();
    interp.register_global("Math", Value::Object(math))?;

    let constants = [
        ("PI", std::f64::consts::PI),
        ("E", std::f64::consts::E),
        ("LN2", std::f64::consts::LN_2),
        ("LN10", std::f64::consts::LN_10),
        ("LOG2E", std::f64::consts::LOG2_E),
        ("LOG10E", std::f64::consts::LOG10_E),
        ("SQRT2", std::f64::consts::SQRT_2),
        ("SQRT1_2", std::f64::consts::FRAC_1_SQRT_2),
    ];
    for (name, value) in constants {
        interp.register_constant(math, name, Value::Number(value))?;
    }

    // Rounding
    interp.register_method(math, "abs", math_abs, 1)?;
    interp.register_method(math, "floor", math_floor, 1)?;
    interp.register_method(math, "ceil", math_ceil, 1)?;
    interp.register_method(math, "round", math_round, 1)?;

    interp.register_method(math, "min", math_min, 2)?;
    interp.register_method(math, "max", math_max, 2)?;

    // Powers, roots and logarithms
    interp.register_method(math, "pow", math_pow, 2)?;
    interp.register_method(math, "sqrt", math_sqrt, 1)?;
    interp.register_method(math, "exp", math_exp, 1)?;
    interp.register_method(math, "log", math_log, 1)?;

    // Trigonometry
    interp.register_method(math, "sin", math_sin, 1)?;
    interp.register_method(math, "cos", math_cos, 1)?;
    interp.register_method(math, "tan", math_tan, 1)?;
    interp.register_method(math, "asin", math_asin, 1)?;
    interp.register_method(math, "acos", math_acos, 1)?;
    interp.register_method(math, "atan", math_atan, 1)?;
    interp.register_method(math, "atan2", math_atan2, 2)?;

    interp.register_method(math, "random", math_random, 0)?;
    Ok(())
}

/// Natives that apply a one-argument libm function to ToNumber(arg 0)
macro_rules! unary_math {
    ($($name:ident => $func:path),* $(,)?) => {
        $(
            pub fn $name(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
                Ok(Value::Number($func(interp.arg_number(args, 0)?)))
            }
        )*
    };
}

unary_math! {
    math_abs => libm::fabs,
    math_floor => libm::floor,
    math_ceil => libm::ceil,
    math_sqrt => libm::sqrt,
    math_exp => libm::exp,
    math_log => libm::log,
    math_sin => libm::sin,
    math_cos => libm::cos,
    math_tan => libm::tan,
    math_asin => libm::asin,
    math_acos => libm::acos,
    math_atan => libm::atan,
}

/// Round half up; values in [-0.5, 0) round to -0
pub(crate) fn js_round(x: f64) -> f64 {
    if !x.is_finite() || x == 0.0 {
        return x;
    }
    if (-0.5..0.0).contains(&x) {
        return -0.0;
    }
    let floor = libm::floor(x);
    if x - floor >= 0.5 { floor + 1.0 } else { floor }
}

pub fn math_round(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    Ok(Value::Number(js_round(interp.arg_number(args, 0)?)))
}

/// `pow` with the cases where JavaScript disagrees with C
pub(crate) fn js_pow(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    libm::pow(base, exponent)
}

pub fn math_pow(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let base = interp.arg_number(args, 0)?;
    let exponent = interp.arg_number(args, 1)?;
    Ok(Value::Number(js_pow(base, exponent)))
}

pub fn math_atan2(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let y = interp.arg_number(args, 0)?;
    let x = interp.arg_number(args, 1)?;
    Ok(Value::Number(libm::atan2(y, x)))
}

pub fn math_max(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let mut max = f64::NEG_INFINITY;
    let mut saw_nan = false;
    for arg in args {
        let n = interp.to_number(arg)?;
        if n.is_nan() {
            saw_nan = true;
        } else if n > max || (n == 0.0 && max == 0.0 && max.is_sign_negative()) {
            max = n;
        }
    }
    Ok(Value::Number(if saw_nan { f64::NAN } else { max }))
}

pub fn math_min(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let mut min = f64::INFINITY;
    let mut saw_nan = false;
    for arg in args {
        let n = interp.to_number(arg)?;
        if n.is_nan() {
            saw_nan = true;
        } else if n < min || (n == 0.0 && min == 0.0 && n.is_sign_negative()) {
            min = n;
        }
    }
    Ok(Value::Number(if saw_nan { f64::NAN } else { min }))
}

pub fn math_random(interp: &mut Interpreter, _this: Value, _args: &[Value]) -> Result<Value, JsError> {
    Ok(Value::Number(platform::next_random(&mut interp.rng_state)))
}
