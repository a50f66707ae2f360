//! Math object tests

use super::eval;
use jsstep::Value;

#[test]
fn test_constants() {
    assert_eq!(eval("Math.PI"), Value::Number(std::f64::consts::PI));
    assert_eq!(eval("Math.E"), Value::Number(std::f64::consts::E));
    assert_eq!(eval("Math.SQRT2 * Math.SQRT1_2 > 0.99"), Value::Boolean(true));
    assert_eq!(eval("Math.PI = 3; Math.PI"), Value::Number(std::f64::consts::PI));
}

#[test]
fn test_rounding() {
    assert_eq!(eval("Math.floor(-1.5)"), Value::Number(-2.0));
    assert_eq!(eval("Math.ceil(1.2)"), Value::Number(2.0));
    assert_eq!(eval("Math.round(2.5)"), Value::Number(3.0));
    assert_eq!(eval("Math.round(-2.5)"), Value::Number(-2.0));
    assert_eq!(eval("1 / Math.round(-0.2)"), Value::Number(f64::NEG_INFINITY));
    assert_eq!(eval("Math.abs(-7)"), Value::Number(7.0));
}

#[test]
fn test_min_max() {
    assert_eq!(eval("Math.max(1, 5, 3)"), Value::Number(5.0));
    assert_eq!(eval("Math.min(1, -5, 3)"), Value::Number(-5.0));
    assert_eq!(eval("Math.max()"), Value::Number(f64::NEG_INFINITY));
    assert_eq!(eval("Math.min()"), Value::Number(f64::INFINITY));
    assert_eq!(eval("isNaN(Math.max(1, NaN, 3))"), Value::Boolean(true));
    assert_eq!(eval("1 / Math.min(0, -0)"), Value::Number(f64::NEG_INFINITY));
    assert_eq!(eval("Math.max('7', 2)"), Value::Number(7.0));
}

#[test]
fn test_powers_and_logs() {
    assert_eq!(eval("Math.pow(2, 10)"), Value::Number(1024.0));
    assert_eq!(eval("isNaN(Math.pow(1, Infinity))"), Value::Boolean(true));
    assert_eq!(eval("Math.pow(NaN, 0)"), Value::Number(1.0));
    assert_eq!(eval("Math.sqrt(16)"), Value::Number(4.0));
    assert_eq!(eval("isNaN(Math.sqrt(-1))"), Value::Boolean(true));
    assert_eq!(eval("Math.exp(0)"), Value::Number(1.0));
    assert_eq!(eval("Math.log(1)"), Value::Number(0.0));
    assert_eq!(eval("Math.log(0)"), Value::Number(f64::NEG_INFINITY));
}

#[test]
fn test_trigonometry() {
    assert_eq!(eval("Math.sin(0)"), Value::Number(0.0));
    assert_eq!(eval("Math.cos(0)"), Value::Number(1.0));
    assert_eq!(eval("Math.atan2(1, 1) * 4 === Math.PI"), Value::Boolean(true));
    assert_eq!(eval("Math.abs(Math.asin(1) - Math.PI / 2) < 1e-15"), Value::Boolean(true));
}

#[test]
fn test_random_range() {
    let code = r#"
        var ok = true;
        for (var i = 0; i < 200; i++) {
            var r = Math.random();
            if (r < 0 || r >= 1) ok = false;
        }
        ok
    "#;
    assert_eq!(eval(code), Value::Boolean(true));
}

#[test]
fn test_math_is_not_callable() {
    assert_eq!(eval("typeof Math"), Value::from("object"));
    assert_eq!(eval("var r; try { Math(); } catch (e) { r = e.name; } r"), Value::from("TypeError"));
}
