//! JavaScript value representation
//!
//! Values, the object arena and the scope arena. Objects never move and are
//! never collected; an `ObjectId` stays valid for the lifetime of its heap.

use std::fmt;
use std::rc::Rc;

use crate::ast::FunctionNode;
use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::prelude::{IndexMap, index_map_new};

/// Trait for types that have cheap (O(1), reference-counted) clones.
///
/// Regular `.clone()` still works; `cheap_clone()` documents at the call
/// site that only a reference count is bumped.
pub trait CheapClone: Clone {
    fn cheap_clone(&self) -> Self {
        self.clone()
    }
}

impl<T: ?Sized> CheapClone for Rc<T> {}

/// A JavaScript value
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
    Object(ObjectId),
}

impl Value {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, Value::Null | Value::Undefined)
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, Value::Object(_))
    }

    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            Value::Object(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Convert to boolean (ToBoolean)
    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) => true,
        }
    }

    /// Strict equality (===)
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            // NaN !== NaN, +0 === -0
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }

    /// SameValue, used when validating property redefinition
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b && a.is_sign_negative() == b.is_sign_negative()
                }
            }
            _ => self.strict_equals(other),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(JsString::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(JsString::from(s))
    }
}

impl From<JsString> for Value {
    fn from(s: JsString) -> Self {
        Value::String(s)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Object(id)
    }
}

/// Reference-counted string for efficient string handling
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsString(Rc<str>);

impl CheapClone for JsString {}

impl JsString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in UTF-16 code units, as seen by guest code
    pub fn utf16_len(&self) -> usize {
        self.0.encode_utf16().count()
    }
}

impl AsRef<str> for JsString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for JsString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for JsString {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for JsString {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        JsString(s.into())
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        JsString(s.into())
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::ops::Add<&str> for JsString {
    type Output = JsString;

    fn add(self, other: &str) -> JsString {
        let mut s = String::with_capacity(self.0.len() + other.len());
        s.push_str(&self.0);
        s.push_str(other);
        JsString::from(s)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Number conversions
// ═══════════════════════════════════════════════════════════════════════════════

/// Number to string (Number::toString with radix 10)
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        ryu_js::Buffer::new().format(n).to_string()
    }
}

/// Whitespace and line terminators trimmed by StringToNumber and `trim`
pub fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}'
            | '\u{000B}'
            | '\u{000C}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{FEFF}'
            | '\u{000A}'
            | '\u{000D}'
            | '\u{2028}'
            | '\u{2029}'
    ) || (c.is_whitespace() && !c.is_ascii())
}

/// String to number (StringToNumber)
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(is_js_whitespace);
    if trimmed.is_empty() {
        return 0.0;
    }

    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        if hex.is_empty() {
            return f64::NAN;
        }
        return hex.chars().try_fold(0.0, |acc, c| {
            c.to_digit(16).map(|d| acc * 16.0 + f64::from(d))
        })
        .unwrap_or(f64::NAN);
    }

    let unsigned = trimmed
        .strip_prefix('+')
        .or_else(|| trimmed.strip_prefix('-'))
        .unwrap_or(trimmed);
    if unsigned == "Infinity" {
        return if trimmed.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    // Rust accepts "inf" and "nan", JavaScript does not
    let valid = unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !valid || !unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// ToInteger: truncate toward zero, NaN becomes 0
pub fn to_integer(n: f64) -> f64 {
    if n.is_nan() { 0.0 } else { n.trunc() }
}

/// ToUint32
pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    let modulo = n.trunc().rem_euclid(4_294_967_296.0);
    modulo as u32
}

/// ToInt32
pub fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

/// ToUint16, used by `String.fromCharCode`
pub fn to_uint16(n: f64) -> u16 {
    to_uint32(n) as u16
}

/// Parse a canonical array index ("0", "17", but not "017" or "4294967295")
pub fn array_index(name: &str) -> Option<u32> {
    let first = name.bytes().next()?;
    if !first.is_ascii_digit() || (first == b'0' && name.len() > 1) {
        return None;
    }
    if !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match name.parse::<u32>() {
        Ok(index) if index != u32::MAX => Some(index),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Arena handles
// ═══════════════════════════════════════════════════════════════════════════════

/// Handle to an object in the heap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u32);

/// Handle to a scope in the heap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub(crate) u32);

// ═══════════════════════════════════════════════════════════════════════════════
// Properties
// ═══════════════════════════════════════════════════════════════════════════════

/// Storage of a single property
#[derive(Debug, Clone, PartialEq)]
pub enum PropertySlot {
    Data { value: Value, writable: bool },
    Accessor {
        get: Option<ObjectId>,
        set: Option<ObjectId>,
    },
}

/// An own property with its attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub slot: PropertySlot,
    pub enumerable: bool,
    pub configurable: bool,
}

impl Property {
    /// Writable, enumerable and configurable: what plain assignment creates
    pub fn data(value: Value) -> Self {
        Self::with_flags(value, true, true, true)
    }

    /// Writable and configurable but not enumerable: builtin methods
    pub fn hidden(value: Value) -> Self {
        Self::with_flags(value, true, false, true)
    }

    /// Neither writable, enumerable nor configurable
    pub fn frozen(value: Value) -> Self {
        Self::with_flags(value, false, false, false)
    }

    pub fn with_flags(value: Value, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self {
            slot: PropertySlot::Data { value, writable },
            enumerable,
            configurable,
        }
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self.slot, PropertySlot::Accessor { .. })
    }

    pub fn writable(&self) -> bool {
        matches!(self.slot, PropertySlot::Data { writable: true, .. })
    }

    pub fn to_descriptor(&self) -> PropertyDescriptor {
        let mut descriptor = PropertyDescriptor {
            enumerable: Some(self.enumerable),
            configurable: Some(self.configurable),
            ..PropertyDescriptor::default()
        };
        match &self.slot {
            PropertySlot::Data { value, writable } => {
                descriptor.value = Some(value.clone());
                descriptor.writable = Some(*writable);
            }
            PropertySlot::Accessor { get, set } => {
                descriptor.get = Some(get.map(Value::Object).unwrap_or_default());
                descriptor.set = Some(set.map(Value::Object).unwrap_or_default());
            }
        }
        descriptor
    }
}

/// A possibly partial property descriptor, as passed to `Object.defineProperty`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDescriptor {
    pub value: Option<Value>,
    pub writable: Option<bool>,
    pub get: Option<Value>,
    pub set: Option<Value>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    pub fn is_accessor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    pub fn is_data(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    /// Descriptor of a plain data property with the given attributes
    pub fn data(value: Value, writable: bool, enumerable: bool, configurable: bool) -> Self {
        Self {
            value: Some(value),
            writable: Some(writable),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
            ..Self::default()
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Objects
// ═══════════════════════════════════════════════════════════════════════════════

/// Native function signature: (interpreter, this, arguments)
pub type NativeFn = Rc<dyn Fn(&mut Interpreter, Value, &[Value]) -> Result<Value, JsError>>;

/// Asynchronous native: receives a token the host later hands to
/// `Interpreter::resume_async`
pub type AsyncFn =
    Rc<dyn Fn(&mut Interpreter, Value, &[Value], AsyncCallback) -> Result<(), JsError>>;

/// Token identifying one outstanding asynchronous native call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsyncCallback {
    pub(crate) id: u64,
}

/// Flags of a regular expression object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegExpFlags {
    pub global: bool,
    pub ignore_case: bool,
    pub multiline: bool,
}

impl RegExpFlags {
    /// Parse a flags string; duplicate or unknown flags are rejected
    pub fn parse(flags: &str) -> Option<Self> {
        let mut result = RegExpFlags::default();
        for c in flags.chars() {
            let slot = match c {
                'g' => &mut result.global,
                'i' => &mut result.ignore_case,
                'm' => &mut result.multiline,
                _ => return None,
            };
            if *slot {
                return None;
            }
            *slot = true;
        }
        Some(result)
    }
}

impl fmt::Display for RegExpFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.global {
            f.write_str("g")?;
        }
        if self.ignore_case {
            f.write_str("i")?;
        }
        if self.multiline {
            f.write_str("m")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegExpData {
    pub source: JsString,
    pub flags: RegExpFlags,
}

/// The callable part of a function object
#[derive(Clone)]
pub enum FunctionKind {
    Interpreted {
        node: Rc<FunctionNode>,
        scope: ScopeId,
    },
    Native {
        func: NativeFn,
        /// `false` means `new` on this function is a TypeError
        constructor: bool,
    },
    Async {
        func: AsyncFn,
    },
    Bound {
        target: ObjectId,
        this: Value,
        args: Vec<Value>,
    },
    /// The global `eval`, which the call machinery handles itself
    Eval,
}

impl fmt::Debug for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionKind::Interpreted { node, scope } => f
                .debug_struct("Interpreted")
                .field("name", &node.id)
                .field("scope", scope)
                .finish(),
            FunctionKind::Native { constructor, .. } => f
                .debug_struct("Native")
                .field("constructor", constructor)
                .finish_non_exhaustive(),
            FunctionKind::Async { .. } => f.debug_struct("Async").finish_non_exhaustive(),
            FunctionKind::Bound { target, this, args } => f
                .debug_struct("Bound")
                .field("target", target)
                .field("this", this)
                .field("args", args)
                .finish(),
            FunctionKind::Eval => f.write_str("Eval"),
        }
    }
}

/// What kind of object this is, with its internal data
#[derive(Debug, Clone)]
pub enum ObjectKind {
    Plain,
    Array { length: u32 },
    Function(FunctionKind),
    Error,
    Date(f64),
    RegExp(RegExpData),
    Boolean(bool),
    Number(f64),
    String(JsString),
    Arguments,
}

impl ObjectKind {
    /// The legacy `[[Class]]` tag
    pub fn class_name(&self) -> &'static str {
        match self {
            ObjectKind::Plain => "Object",
            ObjectKind::Array { .. } => "Array",
            ObjectKind::Function(_) => "Function",
            ObjectKind::Error => "Error",
            ObjectKind::Date(_) => "Date",
            ObjectKind::RegExp(_) => "RegExp",
            ObjectKind::Boolean(_) => "Boolean",
            ObjectKind::Number(_) => "Number",
            ObjectKind::String(_) => "String",
            ObjectKind::Arguments => "Arguments",
        }
    }
}

/// A JavaScript object
#[derive(Debug, Clone)]
pub struct JsObject {
    pub proto: Option<ObjectId>,
    pub properties: IndexMap<JsString, Property>,
    pub extensible: bool,
    pub kind: ObjectKind,
}

impl JsObject {
    pub fn new(kind: ObjectKind, proto: Option<ObjectId>) -> Self {
        Self {
            proto,
            properties: index_map_new(),
            extensible: true,
            kind,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.kind, ObjectKind::Function(_))
    }

    pub fn function_kind(&self) -> Option<&FunctionKind> {
        match &self.kind {
            ObjectKind::Function(kind) => Some(kind),
            _ => None,
        }
    }

    /// Own property lookup, including the virtual `length` of arrays and
    /// the `length` and index properties of boxed strings
    pub fn own_property(&self, name: &str) -> Option<Property> {
        match &self.kind {
            ObjectKind::Array { length } if name == "length" => Some(Property::with_flags(
                Value::Number(f64::from(*length)),
                true,
                false,
                false,
            )),
            ObjectKind::String(s) => {
                if name == "length" {
                    return Some(Property::frozen(Value::Number(s.utf16_len() as f64)));
                }
                if let Some(index) = array_index(name) {
                    if let Some(unit) = s.as_str().encode_utf16().nth(index as usize) {
                        let ch = String::from_utf16_lossy(&[unit]);
                        return Some(Property::with_flags(Value::from(ch), false, true, false));
                    }
                }
                self.properties.get(name).cloned()
            }
            _ => self.properties.get(name).cloned(),
        }
    }

    pub fn has_own_property(&self, name: &str) -> bool {
        self.own_property(name).is_some()
    }

    /// Own property names: array indices ascending, then other names in
    /// insertion order. Virtual properties are included.
    pub fn own_keys(&self) -> Vec<JsString> {
        let mut indices: Vec<(u32, JsString)> = Vec::new();
        let mut names: Vec<JsString> = Vec::new();

        if let ObjectKind::String(s) = &self.kind {
            for i in 0..s.utf16_len() {
                indices.push((i as u32, JsString::from(i.to_string())));
            }
        }

        for key in self.properties.keys() {
            match array_index(key.as_str()) {
                Some(index) => indices.push((index, key.clone())),
                None => names.push(key.clone()),
            }
        }
        indices.sort_by_key(|(index, _)| *index);
        indices.dedup_by_key(|(index, _)| *index);

        if matches!(self.kind, ObjectKind::Array { .. } | ObjectKind::String(_)) {
            names.insert(0, JsString::from("length"));
        }

        indices.into_iter().map(|(_, key)| key).chain(names).collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Scopes and the heap
// ═══════════════════════════════════════════════════════════════════════════════

/// A lexical environment record backed by an object
#[derive(Debug, Clone)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub strict: bool,
    /// Binding object: the global object, a null-prototype object for
    /// function and catch scopes, or the target of a `with`
    pub object: ObjectId,
    /// Set for function, global and strict-eval scopes
    pub this_value: Option<Value>,
}

/// Arena holding every object and scope of one interpreter
#[derive(Debug, Default, Clone)]
pub struct Heap {
    objects: Vec<JsObject>,
    scopes: Vec<Scope>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, object: JsObject) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(object);
        id
    }

    pub fn alloc_scope(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(scope);
        id
    }

    pub fn object(&self, id: ObjectId) -> Result<&JsObject, JsError> {
        self.objects
            .get(id.0 as usize)
            .ok_or_else(|| JsError::internal(format!("dangling object handle {}", id.0)))
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Result<&mut JsObject, JsError> {
        self.objects
            .get_mut(id.0 as usize)
            .ok_or_else(|| JsError::internal(format!("dangling object handle {}", id.0)))
    }

    pub fn scope(&self, id: ScopeId) -> Result<&Scope, JsError> {
        self.scopes
            .get(id.0 as usize)
            .ok_or_else(|| JsError::internal(format!("dangling scope handle {}", id.0)))
    }

    pub fn scope_mut(&mut self, id: ScopeId) -> Result<&mut Scope, JsError> {
        self.scopes
            .get_mut(id.0 as usize)
            .ok_or_else(|| JsError::internal(format!("dangling scope handle {}", id.0)))
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}
