//! Integration tests for the interpreter, organized by feature
//!
//! These tests exercise the interpreter through the public API only.

mod api;
mod array;
mod basics;
mod control_flow;
mod date;
mod error;
mod function;
mod global;
mod json;
mod math;
mod number;
mod object;
mod regexp;
mod step;
mod string;

use jsstep::{Interpreter, InterpreterConfig, JsError, Value};

/// Evaluate `source` to completion and return the final completion value
#[allow(clippy::expect_used)]
pub fn eval(source: &str) -> Value {
    eval_result(source).expect("eval failed")
}

/// Evaluate and return the Result for error testing
pub fn eval_result(source: &str) -> Result<Value, JsError> {
    eval_with_config(source, InterpreterConfig::default())
}

pub fn eval_with_config(source: &str, config: InterpreterConfig) -> Result<Value, JsError> {
    let mut interp = Interpreter::with_config(source, config)?;
    if interp.run()? {
        return Err(JsError::internal("test program paused on an async call"));
    }
    Ok(interp.value())
}

/// Check whether evaluation throws an error whose text contains `error_contains`
pub fn throws_error(source: &str, error_contains: &str) -> bool {
    match eval_result(source) {
        Err(e) => e.to_string().contains(error_contains),
        Ok(_) => false,
    }
}

/// Drive `source` with `step()` only. Returns the final value and the number
/// of steps taken.
pub fn run_stepwise(source: &str) -> Result<(Value, usize), JsError> {
    let mut interp = Interpreter::new(source)?;
    let mut steps = 0;
    while interp.step()? {
        steps += 1;
        if steps > 10_000_000 {
            return Err(JsError::internal("step limit exceeded"));
        }
    }
    Ok((interp.value(), steps))
}

/// Shorthand for string results
pub fn s(text: &str) -> Value {
    Value::from(text)
}
