//! Pausable, step-driven ES5 interpreter for embedding in applications
//!
//! Programs run one small step at a time on an explicit state stack, so the
//! host decides when to stop, can inspect or replace the stack between steps,
//! and can suspend execution on asynchronous natives.
//!
//! # Example
//!
//! ```
//! use jsstep::{Interpreter, Value};
//!
//! let mut interp = Interpreter::new("var x = [3, 1, 2]; x.sort().join()")?;
//! while interp.step()? {}
//! assert_eq!(interp.value(), Value::from("1,2,3"));
//! # Ok::<(), jsstep::JsError>(())
//! ```

pub mod ast;
pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod platform;
pub mod prelude;
pub mod value;

pub use error::{ErrorKind, JsError};
pub use interpreter::{Interpreter, InterpreterConfig, PropertyResult, RegexMode, SetResult};
pub use parser::parse_program;
pub use value::{AsyncCallback, JsString, ObjectId, PropertyDescriptor, Value};
