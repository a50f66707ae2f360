//! Date built-in methods
//!
//! Time values are milliseconds since the epoch. The local time zone is UTC,
//! so every `getX`/`setX` pair behaves like its `getUTCX`/`setUTCX` twin.

use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::interpreter::builtins::arg;
use crate::platform;
use crate::value::{ObjectKind, Value, to_integer};

const MS_PER_SECOND: f64 = 1000.0;
const MS_PER_MINUTE: f64 = 60_000.0;
const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_DAY: f64 = 86_400_000.0;
const MAX_TIME: f64 = 8.64e15;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// Field positions in a broken-down time
const YEAR: usize = 0;
const MONTH: usize = 1;
const DATE: usize = 2;
const HOURS: usize = 3;
const MINUTES: usize = 4;
const SECONDS: usize = 5;
const MILLIS: usize = 6;

pub fn init_date(interp: &mut Interpreter) -> Result<(), JsError> {
    let proto = interp.realm.date_prototype;
    let constructor = interp.register_constructor("Date", date_constructor, 7, proto)?;
    interp.register_method(constructor, "now", date_now, 0)?;
    interp.register_method(constructor, "parse", date_parse, 1)?;
    interp.register_method(constructor, "UTC", date_utc, 7)?;

    let getters: [(&str, crate::interpreter::NativeMethod); 9] = [
        ("FullYear", date_get_full_year),
        ("Month", date_get_month),
        ("Date", date_get_date),
        ("Day", date_get_day),
        ("Hours", date_get_hours),
        ("Minutes", date_get_minutes),
        ("Seconds", date_get_seconds),
        ("Milliseconds", date_get_milliseconds),
        ("Time", date_get_time),
    ];
    for (field, func) in getters {
        interp.register_method(proto, &format!("get{}", field), func, 0)?;
        if field != "Time" {
            interp.register_method(proto, &format!("getUTC{}", field), func, 0)?;
        }
    }
    interp.register_method(proto, "getYear", date_get_year, 0)?;
    interp.register_method(proto, "getTimezoneOffset", date_get_timezone_offset, 0)?;

    let setters: [(&str, crate::interpreter::NativeMethod, u32); 7] = [
        ("FullYear", date_set_full_year, 3),
        ("Month", date_set_month, 2),
        ("Date", date_set_date, 1),
        ("Hours", date_set_hours, 4),
        ("Minutes", date_set_minutes, 3),
        ("Seconds", date_set_seconds, 2),
        ("Milliseconds", date_set_milliseconds, 1),
    ];
    for (field, func, arity) in setters {
        interp.register_method(proto, &format!("set{}", field), func, arity)?;
        interp.register_method(proto, &format!("setUTC{}", field), func, arity)?;
    }
    interp.register_method(proto, "setTime", date_set_time, 1)?;
    interp.register_method(proto, "setYear", date_set_year, 1)?;

    interp.register_method(proto, "toString", date_to_string_method, 0)?;
    interp.register_method(proto, "toDateString", date_to_date_string, 0)?;
    interp.register_method(proto, "toTimeString", date_to_time_string, 0)?;
    interp.register_method(proto, "toLocaleString", date_to_string_method, 0)?;
    interp.register_method(proto, "toLocaleDateString", date_to_date_string, 0)?;
    interp.register_method(proto, "toLocaleTimeString", date_to_time_string, 0)?;
    interp.register_method(proto, "toUTCString", date_to_utc_string, 0)?;
    interp.register_method(proto, "toGMTString", date_to_utc_string, 0)?;
    interp.register_method(proto, "toISOString", date_to_iso_string, 0)?;
    interp.register_method(proto, "toJSON", date_to_json, 1)?;
    interp.register_method(proto, "valueOf", date_get_time, 0)?;
    Ok(())
}

// Calendar arithmetic

/// Days since 1970-01-01 of a proleptic Gregorian date (`month` is 1-based)
fn days_from_civil(year: i64, month: i64, day: i64) -> i64 {
    let y = if month <= 2 { year - 1 } else { year };
    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = y - era * 400;
    let mp = if month > 2 { month - 3 } else { month + 9 };
    let doy = (153 * mp + 2) / 5 + day - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`]: `(year, month 1..=12, day 1..=31)`
fn civil_from_days(days: i64) -> (i64, i64, i64) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

/// Day number for a year, a zero-based month that may overflow, and a date
fn make_day(year: f64, month: f64, date: f64) -> f64 {
    if !year.is_finite() || !month.is_finite() || !date.is_finite() {
        return f64::NAN;
    }
    let year = to_integer(year) + (to_integer(month) / 12.0).floor();
    let month = to_integer(month).rem_euclid(12.0);
    if year.abs() > 400_000.0 {
        return f64::NAN;
    }
    days_from_civil(year as i64, month as i64 + 1, 1) as f64 + to_integer(date) - 1.0
}

fn make_time(hours: f64, minutes: f64, seconds: f64, millis: f64) -> f64 {
    if !hours.is_finite() || !minutes.is_finite() || !seconds.is_finite() || !millis.is_finite() {
        return f64::NAN;
    }
    to_integer(hours) * MS_PER_HOUR
        + to_integer(minutes) * MS_PER_MINUTE
        + to_integer(seconds) * MS_PER_SECOND
        + to_integer(millis)
}

fn make_date(day: f64, time: f64) -> f64 {
    if !day.is_finite() || !time.is_finite() {
        return f64::NAN;
    }
    day * MS_PER_DAY + time
}

/// Clamp a time value to the representable range
fn time_clip(t: f64) -> f64 {
    if !t.is_finite() || t.abs() > MAX_TIME {
        return f64::NAN;
    }
    to_integer(t) + 0.0
}

/// Time value from year, month, date, hours, minutes, seconds, millis
fn from_fields(fields: &[f64; 7]) -> f64 {
    let [year, month, date, hours, minutes, seconds, millis] = *fields;
    make_date(make_day(year, month, date), make_time(hours, minutes, seconds, millis))
}

/// Broken-down time in the same order as [`from_fields`], `t` must be finite
fn to_fields(t: f64) -> [f64; 7] {
    let days = (t / MS_PER_DAY).floor();
    let ms_in_day = t - days * MS_PER_DAY;
    let (year, month, day) = civil_from_days(days as i64);
    [
        year as f64,
        (month - 1) as f64,
        day as f64,
        (ms_in_day / MS_PER_HOUR).floor(),
        (ms_in_day / MS_PER_MINUTE).floor() % 60.0,
        (ms_in_day / MS_PER_SECOND).floor() % 60.0,
        ms_in_day % MS_PER_SECOND,
    ]
}

fn week_day(t: f64) -> usize {
    ((t / MS_PER_DAY).floor() + 4.0).rem_euclid(7.0) as usize
}

fn year_string(year: f64) -> String {
    if year < 0.0 {
        format!("-{:06}", -year)
    } else {
        format!("{:04}", year)
    }
}

fn date_part(t: f64) -> String {
    let fields = to_fields(t);
    format!(
        "{} {} {:02} {}",
        WEEKDAYS.get(week_day(t)).unwrap_or(&"Sun"),
        MONTHS.get(fields[MONTH] as usize).unwrap_or(&"Jan"),
        fields[DATE],
        year_string(fields[YEAR])
    )
}

fn time_part(t: f64) -> String {
    let fields = to_fields(t);
    format!(
        "{:02}:{:02}:{:02} GMT+0000 (UTC)",
        fields[HOURS], fields[MINUTES], fields[SECONDS]
    )
}

/// `Date.prototype.toString` format, e.g. "Thu Jan 01 1970 00:00:00 GMT+0000 (UTC)"
pub fn date_to_string(t: f64) -> String {
    if t.is_nan() {
        return "Invalid Date".to_string();
    }
    format!("{} {}", date_part(t), time_part(t))
}

pub(crate) fn iso_string(t: f64) -> String {
    let fields = to_fields(t);
    let year = fields[YEAR];
    let year = if (0.0..=9999.0).contains(&year) {
        format!("{:04}", year)
    } else if year < 0.0 {
        format!("-{:06}", -year)
    } else {
        format!("+{:06}", year)
    };
    format!(
        "{}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        year,
        fields[MONTH] + 1.0,
        fields[DATE],
        fields[HOURS],
        fields[MINUTES],
        fields[SECONDS],
        fields[MILLIS]
    )
}

fn utc_string(t: f64) -> String {
    let fields = to_fields(t);
    format!(
        "{}, {:02} {} {} {:02}:{:02}:{:02} GMT",
        WEEKDAYS.get(week_day(t)).unwrap_or(&"Sun"),
        fields[DATE],
        MONTHS.get(fields[MONTH] as usize).unwrap_or(&"Jan"),
        year_string(fields[YEAR]),
        fields[HOURS],
        fields[MINUTES],
        fields[SECONDS]
    )
}

// Parsing

/// Parse an ISO 8601 date or one of the formats `toString`/`toUTCString`
/// produce. Unrecognized input is NaN.
pub(crate) fn parse_date(input: &str) -> f64 {
    let input = input.trim();
    // Full timestamps with an offset, in either standard form
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(input) {
        return time_clip(dt.timestamp_millis() as f64);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc2822(input) {
        return time_clip(dt.timestamp_millis() as f64);
    }
    match parse_iso(input) {
        Some(t) => time_clip(t),
        None => parse_informal(input).map_or(f64::NAN, time_clip),
    }
}

struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Exactly `count` decimal digits
    fn digits(&mut self, count: usize) -> Option<f64> {
        let mut value = 0.0;
        for _ in 0..count {
            let byte = self.peek().filter(u8::is_ascii_digit)?;
            value = value * 10.0 + f64::from(byte - b'0');
            self.pos += 1;
        }
        Some(value)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }
}

fn parse_iso(input: &str) -> Option<f64> {
    let mut cursor = Cursor {
        bytes: input.as_bytes(),
        pos: 0,
    };
    let year = match cursor.peek()? {
        b'+' | b'-' => {
            let negative = cursor.eat(b'-');
            if !negative {
                cursor.eat(b'+');
            }
            let year = cursor.digits(6)?;
            if negative { -year } else { year }
        }
        _ => cursor.digits(4)?,
    };
    let mut fields = [year, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
    if cursor.eat(b'-') {
        fields[MONTH] = cursor.digits(2)? - 1.0;
        if cursor.eat(b'-') {
            fields[DATE] = cursor.digits(2)?;
        }
    }
    let mut offset = 0.0;
    if cursor.eat(b'T') || cursor.eat(b' ') {
        fields[HOURS] = cursor.digits(2)?;
        if !cursor.eat(b':') {
            return None;
        }
        fields[MINUTES] = cursor.digits(2)?;
        if cursor.eat(b':') {
            fields[SECONDS] = cursor.digits(2)?;
            if cursor.eat(b'.') {
                let start = cursor.pos;
                let mut millis = 0.0;
                while let Some(byte) = cursor.peek().filter(u8::is_ascii_digit) {
                    if cursor.pos - start < 3 {
                        millis = millis * 10.0 + f64::from(byte - b'0');
                    }
                    cursor.pos += 1;
                }
                let taken = (cursor.pos - start).min(3);
                if taken == 0 {
                    return None;
                }
                fields[MILLIS] = millis * 10f64.powi(3 - taken as i32);
            }
        }
        if !cursor.eat(b'Z') {
            if let Some(sign) = cursor.peek().filter(|b| *b == b'+' || *b == b'-') {
                cursor.pos += 1;
                let hours = cursor.digits(2)?;
                cursor.eat(b':');
                let minutes = cursor.digits(2)?;
                let magnitude = hours * MS_PER_HOUR + minutes * MS_PER_MINUTE;
                offset = if sign == b'-' { -magnitude } else { magnitude };
            }
        }
    }
    if !cursor.at_end() {
        return None;
    }
    if fields[MONTH] > 11.0
        || fields[DATE] < 1.0
        || fields[DATE] > 31.0
        || fields[HOURS] > 24.0
        || fields[MINUTES] > 59.0
        || fields[SECONDS] > 59.0
    {
        return None;
    }
    Some(from_fields(&fields) - offset)
}

fn month_from_name(word: &str) -> Option<f64> {
    let lower = word.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|m| lower.starts_with(&m.to_ascii_lowercase()))
        .map(|i| i as f64)
}

/// Offset such as `+0100`, `-05:30`
fn parse_offset(text: &str) -> Option<f64> {
    let (sign, rest) = match text.chars().next()? {
        '+' => (1.0, text.get(1..)?),
        '-' => (-1.0, text.get(1..)?),
        _ => return None,
    };
    let digits: String = rest.chars().filter(char::is_ascii_digit).collect();
    let value: f64 = digits.parse().ok()?;
    let (hours, minutes) = if digits.len() <= 2 {
        (value, 0.0)
    } else {
        ((value / 100.0).trunc(), value % 100.0)
    };
    Some(sign * (hours * MS_PER_HOUR + minutes * MS_PER_MINUTE))
}

/// Month-name formats like "Thu Jan 01 1970 00:00:00 GMT+0000",
/// "Thu, 01 Jan 1970 00:00:00 GMT" or "January 1, 1970", and "M/D/YYYY"
fn parse_informal(input: &str) -> Option<f64> {
    let without_comment = match input.find('(') {
        Some(open) => input.get(..open)?,
        None => input,
    };

    let mut year = None;
    let mut month = None;
    let mut day = None;
    let mut time = [0.0; 3];
    let mut offset = 0.0;
    let mut pm = None;

    for token in without_comment.split(|c: char| c.is_whitespace() || c == ',') {
        if token.is_empty() {
            continue;
        }
        let upper = token.to_ascii_uppercase();
        if token.contains(':') {
            for (slot, part) in time.iter_mut().zip(token.split(':')) {
                *slot = part.parse().ok()?;
            }
        } else if let Some(rest) = upper.strip_prefix("GMT").or_else(|| upper.strip_prefix("UTC")) {
            if !rest.is_empty() {
                offset = parse_offset(rest)?;
            }
        } else if upper == "Z" {
            continue;
        } else if token.starts_with('+') || (token.starts_with('-') && year.is_some()) {
            offset = parse_offset(token)?;
        } else if token.contains('/') {
            let mut parts = token.split('/');
            month = Some(parts.next()?.parse::<f64>().ok()? - 1.0);
            day = Some(parts.next()?.parse::<f64>().ok()?);
            year = Some(parts.next()?.parse::<f64>().ok()?);
        } else if upper == "AM" || upper == "PM" {
            pm = Some(upper == "PM");
        } else if token.chars().all(|c| c.is_ascii_alphabetic() || c == '.') {
            if let Some(m) = month_from_name(token) {
                month = Some(m);
            } else if !WEEKDAYS
                .iter()
                .any(|w| upper.starts_with(&w.to_ascii_uppercase()))
            {
                return None;
            }
        } else {
            let value: f64 = token.parse().ok()?;
            if day.is_none() && token.len() <= 2 && year.is_none() {
                day = Some(value);
            } else if year.is_none() {
                year = Some(value);
            } else {
                return None;
            }
        }
    }

    let mut hours = time[0];
    match pm {
        Some(true) if hours < 12.0 => hours += 12.0,
        Some(false) if hours == 12.0 => hours = 0.0,
        _ => {}
    }
    let fields = [year?, month?, day?, hours, time[1], time[2], 0.0];
    Some(from_fields(&fields) - offset)
}

// Natives

/// Time value of a Date `this`
fn this_time(interp: &Interpreter, this: &Value) -> Result<f64, JsError> {
    if let Value::Object(id) = this {
        if let ObjectKind::Date(t) = interp.heap.object(*id)?.kind {
            return Ok(t);
        }
    }
    Err(JsError::type_error("this is not a Date object."))
}

fn set_this_time(interp: &mut Interpreter, this: &Value, t: f64) -> Result<Value, JsError> {
    let Value::Object(id) = this else {
        return Err(JsError::type_error("this is not a Date object."));
    };
    let object = interp.heap.object_mut(*id)?;
    match object.kind {
        ObjectKind::Date(_) => {
            object.kind = ObjectKind::Date(t);
            Ok(Value::Number(t))
        }
        _ => Err(JsError::type_error("this is not a Date object.")),
    }
}

/// Fields from constructor-style arguments `(year, month[, date, h, m, s, ms])`
fn fields_from_args(interp: &Interpreter, args: &[Value]) -> Result<[f64; 7], JsError> {
    let mut fields = [f64::NAN, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];
    for (slot, value) in fields.iter_mut().zip(args) {
        *slot = interp.to_number(value)?;
    }
    let year = to_integer(fields[YEAR]);
    if fields[YEAR].is_finite() && (0.0..=99.0).contains(&year) {
        fields[YEAR] = 1900.0 + year;
    }
    Ok(fields)
}

pub fn date_constructor(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    if !interp.called_with_new() {
        return Ok(Value::from(date_to_string(platform::now_millis())));
    }
    let t = match args {
        [] => platform::now_millis(),
        [value] => {
            let existing = match value {
                Value::Object(id) => match interp.heap.object(*id)?.kind {
                    ObjectKind::Date(t) => Some(t),
                    _ => None,
                },
                _ => None,
            };
            match existing {
                Some(t) => t,
                None => match interp.to_primitive(value, None)? {
                    Value::String(s) => parse_date(s.as_str()),
                    primitive => time_clip(interp.to_number(&primitive)?),
                },
            }
        }
        _ => time_clip(from_fields(&fields_from_args(interp, args)?)),
    };
    if let Value::Object(id) = this {
        interp.heap.object_mut(id)?.kind = ObjectKind::Date(t);
    }
    Ok(this)
}

pub fn date_now(_interp: &mut Interpreter, _this: Value, _args: &[Value]) -> Result<Value, JsError> {
    Ok(Value::Number(platform::now_millis()))
}

pub fn date_parse(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let input = interp.arg_string(args, 0)?;
    Ok(Value::Number(parse_date(input.as_str())))
}

pub fn date_utc(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let fields = fields_from_args(interp, args)?;
    Ok(Value::Number(time_clip(from_fields(&fields))))
}

fn get_field(interp: &Interpreter, this: &Value, index: usize) -> Result<Value, JsError> {
    let t = this_time(interp, this)?;
    if t.is_nan() {
        return Ok(Value::Number(f64::NAN));
    }
    Ok(Value::Number(to_fields(t).get(index).copied().unwrap_or(f64::NAN)))
}

pub fn date_get_time(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    Ok(Value::Number(this_time(interp, &this)?))
}

pub fn date_get_full_year(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    get_field(interp, &this, YEAR)
}

pub fn date_get_year(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    match get_field(interp, &this, YEAR)? {
        Value::Number(year) => Ok(Value::Number(year - 1900.0)),
        other => Ok(other),
    }
}

pub fn date_get_month(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    get_field(interp, &this, MONTH)
}

pub fn date_get_date(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    get_field(interp, &this, DATE)
}

pub fn date_get_day(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let t = this_time(interp, &this)?;
    if t.is_nan() {
        return Ok(Value::Number(f64::NAN));
    }
    Ok(Value::Number(week_day(t) as f64))
}

pub fn date_get_hours(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    get_field(interp, &this, HOURS)
}

pub fn date_get_minutes(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    get_field(interp, &this, MINUTES)
}

pub fn date_get_seconds(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    get_field(interp, &this, SECONDS)
}

pub fn date_get_milliseconds(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    get_field(interp, &this, MILLIS)
}

pub fn date_get_timezone_offset(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let t = this_time(interp, &this)?;
    Ok(Value::Number(if t.is_nan() { f64::NAN } else { 0.0 }))
}

/// Shared body of the setters: overwrite up to `count` fields starting at
/// `first`, leaving fields whose argument is absent untouched
fn set_fields(
    interp: &mut Interpreter,
    this: &Value,
    args: &[Value],
    first: usize,
    count: usize,
) -> Result<Value, JsError> {
    let t = this_time(interp, this)?;
    let mut fields = if t.is_nan() {
        if first != YEAR {
            return Ok(Value::Number(f64::NAN));
        }
        to_fields(0.0)
    } else {
        to_fields(t)
    };
    let provided = args.len().clamp(1, count);
    for offset in 0..provided {
        let value = interp.to_number(&arg(args, offset))?;
        if let Some(slot) = fields.get_mut(first + offset) {
            *slot = value;
        }
    }
    let t = time_clip(from_fields(&fields));
    set_this_time(interp, this, t)
}

pub fn date_set_time(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    this_time(interp, &this)?;
    let t = time_clip(interp.arg_number(args, 0)?);
    set_this_time(interp, &this, t)
}

pub fn date_set_full_year(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    set_fields(interp, &this, args, YEAR, 3)
}

pub fn date_set_year(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let year = interp.arg_number(args, 0)?;
    let year = if year.is_finite() && (0.0..=99.0).contains(&to_integer(year)) {
        1900.0 + to_integer(year)
    } else {
        year
    };
    set_fields(interp, &this, &[Value::Number(year)], YEAR, 1)
}

pub fn date_set_month(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    set_fields(interp, &this, args, MONTH, 2)
}

pub fn date_set_date(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    set_fields(interp, &this, args, DATE, 1)
}

pub fn date_set_hours(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    set_fields(interp, &this, args, HOURS, 4)
}

pub fn date_set_minutes(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    set_fields(interp, &this, args, MINUTES, 3)
}

pub fn date_set_seconds(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    set_fields(interp, &this, args, SECONDS, 2)
}

pub fn date_set_milliseconds(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    set_fields(interp, &this, args, MILLIS, 1)
}

/// Date.prototype.toString()
pub fn date_to_string_method(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    Ok(Value::from(date_to_string(this_time(interp, &this)?)))
}

/// Date.prototype.toDateString(), e.g. "Thu Jan 01 1970"
pub fn date_to_date_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let t = this_time(interp, &this)?;
    if t.is_nan() {
        return Ok(Value::from("Invalid Date"));
    }
    Ok(Value::from(date_part(t)))
}

/// Date.prototype.toTimeString(), e.g. "00:00:00 GMT+0000 (UTC)"
pub fn date_to_time_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let t = this_time(interp, &this)?;
    if t.is_nan() {
        return Ok(Value::from("Invalid Date"));
    }
    Ok(Value::from(time_part(t)))
}

pub fn date_to_utc_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let t = this_time(interp, &this)?;
    if t.is_nan() {
        return Ok(Value::from("Invalid Date"));
    }
    Ok(Value::from(utc_string(t)))
}

pub fn date_to_iso_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let t = this_time(interp, &this)?;
    if t.is_nan() {
        return Err(JsError::range_error("Invalid time value"));
    }
    Ok(Value::from(iso_string(t)))
}

/// Date.prototype.toJSON(): null for an invalid date, otherwise the ISO form
pub fn date_to_json(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let t = this_time(interp, &this)?;
    if !t.is_finite() {
        return Ok(Value::Null);
    }
    Ok(Value::from(iso_string(t)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_civil_round_trip() {
        assert_eq!(days_from_civil(1970, 1, 1), 0);
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(days_from_civil(2000, 2, 29)), (2000, 2, 29));
        assert_eq!(civil_from_days(-1), (1969, 12, 31));
    }

    #[test]
    fn test_make_day_overflow() {
        // Month 12 rolls into January of the next year; date 0 is the last day
        // of the previous month
        assert_eq!(make_day(2023.0, 12.0, 1.0), days_from_civil(2024, 1, 1) as f64);
        assert_eq!(make_day(2024.0, 2.0, 0.0), days_from_civil(2024, 2, 29) as f64);
    }

    #[test]
    fn test_to_string_formats() {
        assert_eq!(date_to_string(0.0), "Thu Jan 01 1970 00:00:00 GMT+0000 (UTC)");
        assert_eq!(date_to_string(f64::NAN), "Invalid Date");
        assert_eq!(iso_string(1_000_000_000_123.0), "2001-09-09T01:46:40.123Z");
        assert_eq!(utc_string(0.0), "Thu, 01 Jan 1970 00:00:00 GMT");
    }

    #[test]
    fn test_parse_iso() {
        assert_eq!(parse_date("1970-01-01"), 0.0);
        assert_eq!(parse_date("1970-01-01T00:00:01.5Z"), 1500.0);
        assert_eq!(parse_date("1970-01-01T01:00:00+01:00"), 0.0);
        assert_eq!(parse_date("2001-09-09T01:46:40.123Z"), 1_000_000_000_123.0);
        assert!(parse_date("1970-13-01").is_nan());
    }

    #[test]
    fn test_parse_informal() {
        assert_eq!(parse_date("Thu Jan 01 1970 00:00:00 GMT+0000 (UTC)"), 0.0);
        assert_eq!(parse_date("Thu, 01 Jan 1970 00:00:00 GMT"), 0.0);
        assert_eq!(parse_date("Fri, 02 Jan 1970 02:00:00 +0200"), MS_PER_DAY);
        assert_eq!(parse_date("January 2, 1970"), MS_PER_DAY);
        assert_eq!(parse_date("1/2/1970"), MS_PER_DAY);
        assert!(parse_date("not a date").is_nan());
    }
}
