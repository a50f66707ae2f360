//! Date tests. Local time is UTC, so every result here is deterministic.

use super::{eval, s, throws_error};
use jsstep::Value;

#[test]
fn test_epoch_formats() {
    assert_eq!(eval("new Date(0).toISOString()"), s("1970-01-01T00:00:00.000Z"));
    assert_eq!(eval("new Date(0).toString()"), s("Thu Jan 01 1970 00:00:00 GMT+0000 (UTC)"));
    assert_eq!(eval("new Date(0).toUTCString()"), s("Thu, 01 Jan 1970 00:00:00 GMT"));
    assert_eq!(eval("new Date(0).toDateString()"), s("Thu Jan 01 1970"));
    assert_eq!(eval("new Date(0).toTimeString()"), s("00:00:00 GMT+0000 (UTC)"));
    assert_eq!(eval("new Date(0) + ''"), s("Thu Jan 01 1970 00:00:00 GMT+0000 (UTC)"));
}

#[test]
fn test_component_constructor() {
    let code = r#"
        var d = new Date(2024, 1, 29, 13, 45, 30, 250);
        [d.getFullYear(), d.getMonth(), d.getDate(), d.getDay(),
         d.getHours(), d.getMinutes(), d.getSeconds(), d.getMilliseconds()].join(',')
    "#;
    assert_eq!(eval(code), s("2024,1,29,4,13,45,30,250"));
}

#[test]
fn test_month_overflow_normalizes() {
    assert_eq!(eval("new Date(2023, 12, 1).toISOString()"), s("2024-01-01T00:00:00.000Z"));
    assert_eq!(eval("new Date(2023, 0, 0).getDate()"), Value::Number(31.0));
}

#[test]
fn test_two_digit_years() {
    assert_eq!(eval("new Date(99, 0).getFullYear()"), Value::Number(1999.0));
    assert_eq!(eval("new Date(0).getYear()"), Value::Number(70.0));
}

#[test]
fn test_date_utc() {
    assert_eq!(eval("Date.UTC(1970, 0, 2)"), Value::Number(86_400_000.0));
    assert_eq!(eval("Date.UTC(2000, 0)"), Value::Number(946_684_800_000.0));
}

#[test]
fn test_parse_iso() {
    assert_eq!(eval("Date.parse('1970-01-02T00:00:00Z')"), Value::Number(86_400_000.0));
    assert_eq!(eval("Date.parse('1970-01-01')"), Value::Number(0.0));
    assert_eq!(eval("Date.parse('2000-01-01T01:00:00+01:00')"), Value::Number(946_684_800_000.0));
    assert_eq!(eval("new Date('2024-03-15T10:20:30.400Z').getTime()"), eval("Date.UTC(2024, 2, 15, 10, 20, 30, 400)"));
}

#[test]
fn test_parse_own_output_formats() {
    assert_eq!(eval("var d = new Date(123456789000); Date.parse(d.toString()) === 123456789000"), Value::Boolean(true));
    assert_eq!(eval("var d = new Date(123456789000); Date.parse(d.toUTCString()) === 123456789000"), Value::Boolean(true));
    assert_eq!(eval("Date.parse('January 2, 1970')"), Value::Number(86_400_000.0));
    assert_eq!(eval("Date.parse('1/2/1970')"), Value::Number(86_400_000.0));
}

#[test]
fn test_invalid_dates() {
    assert_eq!(eval("isNaN(Date.parse('not a date'))"), Value::Boolean(true));
    assert_eq!(eval("new Date('garbage').toString()"), s("Invalid Date"));
    assert_eq!(eval("isNaN(new Date(NaN).getMonth())"), Value::Boolean(true));
    assert_eq!(eval("isNaN(new Date(8.64e15 + 1).getTime())"), Value::Boolean(true));
    assert!(throws_error("new Date(NaN).toISOString()", "Invalid time value"));
}

#[test]
fn test_setters() {
    let code = r#"
        var d = new Date(0);
        d.setFullYear(2001);
        d.setMonth(5, 15);
        d.setHours(8, 30);
        d.toISOString()
    "#;
    assert_eq!(eval(code), s("2001-06-15T08:30:00.000Z"));
    assert_eq!(eval("var d = new Date(0); d.setUTCDate(3)"), Value::Number(172_800_000.0));
    assert_eq!(eval("var d = new Date(0); d.setTime(42); d.valueOf()"), Value::Number(42.0));
    assert_eq!(eval("var d = new Date(0); d.setSeconds(90); d.getMinutes()"), Value::Number(1.0));
}

#[test]
fn test_setter_on_invalid_date() {
    assert_eq!(eval("var d = new Date(NaN); isNaN(d.setHours(1))"), Value::Boolean(true));
    assert_eq!(eval("var d = new Date(NaN); d.setFullYear(1970); d.getTime()"), Value::Number(0.0));
}

#[test]
fn test_date_arithmetic_and_comparison() {
    assert_eq!(eval("new Date(5000) - new Date(2000)"), Value::Number(3000.0));
    assert_eq!(eval("new Date(1) < new Date(2)"), Value::Boolean(true));
    assert_eq!(eval("new Date(new Date(77)).getTime()"), Value::Number(77.0));
}

#[test]
fn test_date_without_new_returns_string() {
    assert_eq!(eval("typeof Date()"), s("string"));
    assert_eq!(eval("typeof Date.now()"), s("number"));
}

#[test]
fn test_timezone_is_utc() {
    assert_eq!(eval("new Date(0).getTimezoneOffset()"), Value::Number(0.0));
    assert_eq!(eval("new Date(0).getUTCHours() === new Date(0).getHours()"), Value::Boolean(true));
}

#[test]
fn test_methods_require_date_receiver() {
    assert!(throws_error("Date.prototype.getTime.call({})", "TypeError"));
}

#[test]
fn test_to_json() {
    assert_eq!(eval("new Date(0).toJSON()"), s("1970-01-01T00:00:00.000Z"));
    assert_eq!(eval("JSON.stringify({at: new Date(0)})"), s("{\"at\":\"1970-01-01T00:00:00.000Z\"}"));
}
