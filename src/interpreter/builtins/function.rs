//! Function constructor and Function.prototype methods

use crate::ast::{Expression, Statement};
use crate::error::JsError;
use crate::interpreter::builtins::arg;
use crate::interpreter::{Interpreter, Redirect};
use crate::parser::Parser;
use crate::value::{FunctionKind, JsString, ObjectId, Value, to_uint32};

pub fn init_function(interp: &mut Interpreter) -> Result<(), JsError> {
    let proto = interp.realm.function_prototype;
    interp.register_method(proto, "toString", function_to_string, 0)?;
    interp.register_method(proto, "call", function_call, 1)?;
    interp.register_method(proto, "apply", function_apply, 2)?;
    interp.register_method(proto, "bind", function_bind, 1)?;
    interp.register_constructor("Function", function_constructor, 1, proto)?;
    Ok(())
}

/// `new Function(p1, p2, ..., body)`: compiled in the global scope
pub fn function_constructor(interp: &mut Interpreter, _this: Value, args: &[Value]) -> Result<Value, JsError> {
    let (body, params) = match args.split_last() {
        Some((body, params)) => (interp.to_string(body)?, params),
        None => (JsString::from(""), args),
    };
    let params = params
        .iter()
        .map(|param| interp.to_string(param).map(|p| p.to_string()))
        .collect::<Result<Vec<_>, _>>()?
        .join(",");

    let source = format!("(function anonymous({}\n) {{\n{}\n}})", params, body);
    let program = Parser::new(&source).parse_program()?;
    let node = match &*program.body {
        [Statement::Expression(statement)] => match &statement.expression {
            Expression::Function(node) => Some(node.clone()),
            _ => None,
        },
        _ => None,
    };
    let Some(node) = node else {
        return Err(JsError::syntax_error("Invalid function body", 1, 1));
    };
    let scope = interp.global_scope;
    Ok(Value::Object(interp.create_function(node, scope)?))
}

/// The function object behind `this`, or a TypeError naming `method`
fn this_function(interp: &Interpreter, this: &Value, method: &str) -> Result<ObjectId, JsError> {
    match this {
        Value::Object(id) if interp.heap.object(*id)?.is_callable() => Ok(*id),
        _ => Err(JsError::type_error(format!(
            "Function.prototype.{} called on non-function",
            method
        ))),
    }
}

pub fn function_to_string(interp: &mut Interpreter, this: Value, _args: &[Value]) -> Result<Value, JsError> {
    let id = this_function(interp, &this, "toString")?;
    let Some(kind) = interp.heap.object(id)?.function_kind().cloned() else {
        return Err(JsError::type_error("Function.prototype.toString called on non-function"));
    };
    Ok(Value::from(interp.function_source(id, &kind)?))
}

/// Re-target the current call frame; the stepper performs the actual call
pub fn function_call(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    this_function(interp, &this, "call")?;
    interp.redirect = Some(Redirect {
        func: this,
        this: arg(args, 0),
        args: args.get(1..).map(<[Value]>::to_vec).unwrap_or_default(),
    });
    Ok(Value::Undefined)
}

pub fn function_apply(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    this_function(interp, &this, "apply")?;
    let list = match arg(args, 1) {
        Value::Undefined | Value::Null => Vec::new(),
        Value::Object(id) => interp.array_like_to_vec(id)?,
        _ => {
            return Err(JsError::type_error(
                "CreateListFromArrayLike called on non-object",
            ));
        }
    };
    interp.redirect = Some(Redirect {
        func: this,
        this: arg(args, 0),
        args: list,
    });
    Ok(Value::Undefined)
}

pub fn function_bind(interp: &mut Interpreter, this: Value, args: &[Value]) -> Result<Value, JsError> {
    let target = this_function(interp, &this, "bind")?;
    let bound_args: Vec<Value> = args.get(1..).map(<[Value]>::to_vec).unwrap_or_default();

    let target_length = match interp.get_data(&this, "length")? {
        Value::Number(n) => n,
        _ => 0.0,
    };
    let length = (target_length - bound_args.len() as f64).max(0.0);
    let name = interp.get_data(&this, "name")?;
    let name = format!("bound {}", interp.to_string(&name)?);

    let bound = interp.alloc_function(
        &name,
        FunctionKind::Bound {
            target,
            this: arg(args, 0),
            args: bound_args,
        },
        to_uint32(length),
    );
    Ok(Value::Object(bound))
}

impl Interpreter {
    /// Elements `0..length` of an array-like object, holes read as undefined
    pub(crate) fn array_like_to_vec(&self, id: ObjectId) -> Result<Vec<Value>, JsError> {
        let object = Value::Object(id);
        let length = to_uint32(self.to_number(&self.get_data(&object, "length")?)?);
        (0..length)
            .map(|i| self.get_data(&object, &i.to_string()))
            .collect()
    }
}
