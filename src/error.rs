//! Error types for the interpreter

use std::fmt;

use thiserror::Error;

use crate::value::Value;

/// Source location information for error messages
#[derive(Debug, Clone, PartialEq)]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The family of a guest error, as named by its `name` property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Error,
    EvalError,
    RangeError,
    ReferenceError,
    SyntaxError,
    TypeError,
    URIError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Error,
        ErrorKind::EvalError,
        ErrorKind::RangeError,
        ErrorKind::ReferenceError,
        ErrorKind::SyntaxError,
        ErrorKind::TypeError,
        ErrorKind::URIError,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::EvalError => "EvalError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::URIError => "URIError",
        }
    }

    /// Map a guest error name onto a kind. Unknown names fall back to `Error`.
    pub fn from_name(name: &str) -> Self {
        ErrorKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .unwrap_or(ErrorKind::Error)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Main error type for the interpreter
#[derive(Debug, Error)]
pub enum JsError {
    #[error("SyntaxError: {message} at {location}")]
    SyntaxError {
        message: String,
        location: SourceLocation,
    },

    #[error("TypeError: {message}")]
    TypeError { message: String },

    #[error("ReferenceError: {name} is not defined")]
    ReferenceError { name: String },

    #[error("RangeError: {message}")]
    RangeError { message: String },

    /// A guest throw nobody caught, converted for the host
    #[error("{kind}: {message}")]
    RuntimeError {
        kind: ErrorKind,
        message: String,
        stack: String,
    },

    /// Marker used by natives to throw an arbitrary guest value
    #[error("Thrown")]
    Thrown(Value),

    /// A defect in the interpreter itself. Never visible to guest code.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl JsError {
    pub fn syntax_error(message: impl Into<String>, line: u32, column: u32) -> Self {
        JsError::SyntaxError {
            message: message.into(),
            location: SourceLocation { line, column },
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        JsError::TypeError {
            message: message.into(),
        }
    }

    pub fn reference_error(name: impl Into<String>) -> Self {
        JsError::ReferenceError { name: name.into() }
    }

    pub fn range_error(message: impl Into<String>) -> Self {
        JsError::RangeError {
            message: message.into(),
        }
    }

    /// An error of any kind, raised inside guest code (e.g. `URIError`)
    pub fn runtime(kind: ErrorKind, message: impl Into<String>) -> Self {
        JsError::RuntimeError {
            kind,
            message: message.into(),
            stack: String::new(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        JsError::Internal(message.into())
    }

    /// The kind of guest error this becomes when thrown into guest code
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            JsError::SyntaxError { .. } => Some(ErrorKind::SyntaxError),
            JsError::TypeError { .. } => Some(ErrorKind::TypeError),
            JsError::ReferenceError { .. } => Some(ErrorKind::ReferenceError),
            JsError::RangeError { .. } => Some(ErrorKind::RangeError),
            JsError::RuntimeError { kind, .. } => Some(*kind),
            JsError::Thrown(_) | JsError::Internal(_) => None,
        }
    }

    /// The message a guest error object built from this error carries
    pub fn guest_message(&self) -> String {
        match self {
            JsError::SyntaxError { message, .. }
            | JsError::TypeError { message }
            | JsError::RangeError { message }
            | JsError::RuntimeError { message, .. } => message.clone(),
            JsError::ReferenceError { name } => format!("{} is not defined", name),
            JsError::Thrown(_) => String::new(),
            JsError::Internal(message) => message.clone(),
        }
    }
}
