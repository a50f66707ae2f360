//! Calls: function entry, native and asynchronous natives, `new`, and `eval`

use std::rc::Rc;

use crate::ast::{Declarations, FunctionNode};
use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::interpreter::property::PropertyResult;
use crate::interpreter::stack::{CallFrame, CallPhase, Frame, Reference, State};
use crate::parser::Parser;
use crate::value::{
    CheapClone, FunctionKind, JsObject, JsString, ObjectId, ObjectKind, Property, Scope, ScopeId,
    Value,
};

impl Interpreter {
    pub(super) fn step_call(&mut self, mut state: State, mut frame: Box<CallFrame>) -> Result<(), JsError> {
        let scope = state.scope;
        loop {
            match frame.phase {
                CallPhase::Start => {
                    let Some(node) = frame.node.clone() else {
                        frame.phase = CallPhase::Invoke;
                        continue;
                    };
                    if node.callee.is_reference() {
                        frame.phase = CallPhase::CalleeReference;
                        state.frame = Frame::Call(frame);
                        self.stack.push(state);
                        return self.push_reference(&node.callee, scope);
                    }
                    frame.phase = CallPhase::CalleeValue;
                    state.frame = Frame::Call(frame);
                    self.stack.push(state);
                    self.push_expression(&node.callee, scope);
                    return Ok(());
                }
                CallPhase::CalleeReference => {
                    let Some(reference) = state.reference.take() else {
                        return Err(JsError::internal("callee did not produce a reference"));
                    };
                    frame.this = match &reference {
                        Reference::Property(base, _) => base.clone(),
                        Reference::Scope(_) => Value::Undefined,
                    };
                    frame.direct_eval = matches!(&reference, Reference::Scope(name) if name == "eval");
                    match self.get_reference_value(scope, &reference)? {
                        PropertyResult::Value(func) => {
                            frame.func = func;
                            frame.phase = CallPhase::Arguments;
                        }
                        PropertyResult::Accessor { func, this } => {
                            let span = state.span;
                            frame.phase = CallPhase::CalleeGetter;
                            state.frame = Frame::Call(frame);
                            self.stack.push(state);
                            self.push_call(CallFrame::synthetic(func, this, Vec::new()), scope, span);
                            return Ok(());
                        }
                    }
                }
                CallPhase::CalleeValue | CallPhase::CalleeGetter => {
                    frame.func = std::mem::take(&mut state.value);
                    frame.phase = CallPhase::Arguments;
                }
                CallPhase::Arguments => {
                    if frame.args.len() < frame.arg_index {
                        frame.args.push(std::mem::take(&mut state.value));
                    }
                    let next = frame
                        .node
                        .as_ref()
                        .and_then(|node| node.arguments.get(frame.arg_index).cloned());
                    match next {
                        Some(argument) => {
                            frame.arg_index += 1;
                            state.frame = Frame::Call(frame);
                            self.stack.push(state);
                            self.push_expression(&argument, scope);
                            return Ok(());
                        }
                        None => frame.phase = CallPhase::Invoke,
                    }
                }
                CallPhase::Invoke => return self.invoke(state, frame),
                CallPhase::Returned => {
                    let mut result = std::mem::take(&mut state.value);
                    if let (true, Some(construct)) = (frame.is_new, frame.construct) {
                        if result.is_primitive() {
                            result = Value::Object(construct);
                        }
                    }
                    self.ascend(result);
                    return Ok(());
                }
                CallPhase::AwaitAsync => {
                    match self.take_async_result() {
                        Some(result) => self.ascend(result),
                        None => {
                            state.frame = Frame::Call(frame);
                            self.stack.push(state);
                        }
                    }
                    return Ok(());
                }
            }
        }
    }

    fn invoke(&mut self, mut state: State, mut frame: Box<CallFrame>) -> Result<(), JsError> {
        let scope = state.scope;
        let (func_id, kind) = loop {
            let func_id = match &frame.func {
                Value::Object(id) if self.heap.object(*id)?.is_callable() => *id,
                _ => {
                    let what = if frame.is_new {
                        "is not a constructor"
                    } else {
                        "is not a function"
                    };
                    return Err(JsError::type_error(format!("{} {}", frame.name, what)));
                }
            };
            let Some(kind) = self.heap.object(func_id)?.function_kind().cloned() else {
                return Err(JsError::internal("callable object without a function kind"));
            };
            match kind {
                FunctionKind::Bound { target, this, args } => {
                    frame.func = Value::Object(target);
                    if !frame.is_new {
                        frame.this = this;
                    }
                    let mut bound_args = args;
                    bound_args.append(&mut frame.args);
                    frame.args = bound_args;
                }
                kind => break (func_id, kind),
            }
        };

        if frame.is_new && frame.construct.is_none() {
            let constructible = match &kind {
                FunctionKind::Interpreted { .. } => true,
                FunctionKind::Native { constructor, .. } => *constructor,
                FunctionKind::Async { .. } | FunctionKind::Eval | FunctionKind::Bound { .. } => false,
            };
            if !constructible {
                return Err(JsError::type_error(format!("{} is not a constructor", frame.name)));
            }
            // The Array constructor builds its own array
            if Some(func_id) != self.realm.array_constructor {
                let proto = match self.get_data(&Value::Object(func_id), "prototype")? {
                    Value::Object(proto) => proto,
                    _ => self.realm.object_prototype,
                };
                let construct = self.heap.alloc(JsObject::new(ObjectKind::Plain, Some(proto)));
                frame.construct = Some(construct);
                frame.this = Value::Object(construct);
            }
        }

        match kind {
            FunctionKind::Interpreted { node, scope: closure } => {
                let this = if frame.is_new {
                    frame.this.clone()
                } else {
                    self.coerce_this(node.strict, &frame.this)?
                };
                let function_scope =
                    self.create_function_scope(func_id, &node, closure, this, &frame.args)?;
                let body = node.body.cheap_clone();
                frame.phase = CallPhase::Returned;
                state.frame = Frame::Call(frame);
                state.value = Value::Undefined;
                self.stack.push(state);
                self.stack.push(State::new(
                    Frame::Block { body, index: 0 },
                    function_scope,
                    node.span,
                ));
                Ok(())
            }
            FunctionKind::Native { func, .. } => {
                let this = frame.this.clone();
                self.redirect = None;
                self.set_called_with_new(frame.is_new);
                let result = func(self, this, &frame.args);
                self.set_called_with_new(false);
                let result = result?;

                if let Some(redirect) = self.redirect.take() {
                    frame.func = redirect.func;
                    frame.this = redirect.this;
                    frame.args = redirect.args;
                    frame.is_new = false;
                    frame.construct = None;
                    frame.phase = CallPhase::Invoke;
                    state.frame = Frame::Call(frame);
                    self.stack.push(state);
                    return Ok(());
                }

                let result = match (frame.is_new, frame.construct) {
                    (true, Some(construct)) if result.is_primitive() => Value::Object(construct),
                    _ => result,
                };
                self.ascend(result);
                Ok(())
            }
            FunctionKind::Async { func } => {
                let callback = self.begin_async();
                let this = frame.this.clone();
                if let Err(err) = func(self, this, &frame.args, callback) {
                    self.cancel_async();
                    return Err(err);
                }
                log::debug!("paused in asynchronous call to {}", frame.name);
                frame.phase = CallPhase::AwaitAsync;
                state.frame = Frame::Call(frame);
                self.stack.push(state);
                Ok(())
            }
            FunctionKind::Eval => self.invoke_eval(state, frame, scope),
            FunctionKind::Bound { .. } => Err(JsError::internal("bound function was not unwrapped")),
        }
    }

    /// Direct eval runs in the caller's scope, indirect eval in the global
    /// scope; strict code gets a scope of its own
    fn invoke_eval(&mut self, mut state: State, mut frame: Box<CallFrame>, caller: ScopeId) -> Result<(), JsError> {
        let code = match frame.args.first() {
            Some(Value::String(code)) => code.cheap_clone(),
            other => {
                let value = other.cloned().unwrap_or_default();
                self.ascend(value);
                return Ok(());
            }
        };
        let program = Parser::new(code.as_str()).parse_program()?;

        let base = if frame.direct_eval { caller } else { self.global_scope };
        let strict = program.strict || (frame.direct_eval && self.heap.scope(base)?.strict);
        let scope = if strict {
            let object = self.heap.alloc(JsObject::new(ObjectKind::Plain, None));
            self.heap.alloc_scope(Scope {
                parent: Some(base),
                strict: true,
                object,
                this_value: None,
            })
        } else {
            base
        };
        self.populate_scope(scope, &program.declarations)?;
        self.set_completion_value(Value::Undefined);

        frame.phase = CallPhase::Returned;
        state.frame = Frame::Call(frame);
        state.value = Value::Undefined;
        self.stack.push(state);
        self.stack.push(State::new(
            Frame::EvalProgram {
                body: program.body,
                index: 0,
            },
            scope,
            program.span,
        ));
        Ok(())
    }

    /// `this` for a sloppy-mode callee: null and undefined become the global
    /// object, primitives are boxed
    fn coerce_this(&mut self, strict: bool, this: &Value) -> Result<Value, JsError> {
        if strict {
            return Ok(this.clone());
        }
        match this {
            Value::Undefined | Value::Null => Ok(Value::Object(self.global_object())),
            Value::Object(_) => Ok(this.clone()),
            primitive => Ok(Value::Object(self.to_object(primitive)?)),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Function entry
    // ═══════════════════════════════════════════════════════════════════════════

    fn create_function_scope(
        &mut self,
        func: ObjectId,
        node: &FunctionNode,
        parent: ScopeId,
        this: Value,
        args: &[Value],
    ) -> Result<ScopeId, JsError> {
        let object = self.heap.alloc(JsObject::new(ObjectKind::Plain, None));
        let scope = self.heap.alloc_scope(Scope {
            parent: Some(parent),
            strict: node.strict,
            object,
            this_value: Some(this),
        });

        if node.is_expression {
            if let Some(name) = &node.id {
                self.define_binding(object, name, Value::Object(func))?;
            }
        }
        for (i, param) in node.params.iter().enumerate() {
            let value = args.get(i).cloned().unwrap_or_default();
            self.define_binding(object, param, value)?;
        }
        if !node.params.iter().any(|param| param == "arguments") {
            let arguments = self.create_arguments(args)?;
            self.define_binding(object, &JsString::from("arguments"), Value::Object(arguments))?;
        }
        self.populate_scope(scope, &node.declarations)?;
        Ok(scope)
    }

    /// Hoist `var` names (without overwriting) and function declarations
    pub(crate) fn populate_scope(&mut self, scope: ScopeId, declarations: &Declarations) -> Result<(), JsError> {
        let object = self.heap.scope(scope)?.object;
        for name in &declarations.vars {
            if !self.heap.object(object)?.has_own_property(name.as_str()) {
                self.define_binding(object, name, Value::Undefined)?;
            }
        }
        for function in &declarations.functions {
            let Some(name) = function.id.clone() else {
                continue;
            };
            let closure = self.create_function(function.cheap_clone(), scope)?;
            self.define_binding(object, &name, Value::Object(closure))?;
        }
        Ok(())
    }

    fn create_arguments(&mut self, args: &[Value]) -> Result<ObjectId, JsError> {
        let mut arguments = JsObject::new(ObjectKind::Arguments, Some(self.realm.object_prototype));
        for (i, arg) in args.iter().enumerate() {
            arguments
                .properties
                .insert(JsString::from(i.to_string()), Property::data(arg.clone()));
        }
        arguments.properties.insert(
            JsString::from("length"),
            Property::hidden(Value::Number(args.len() as f64)),
        );
        Ok(self.heap.alloc(arguments))
    }

    /// A closure over `scope`, with a fresh `prototype` object
    pub(crate) fn create_function(&mut self, node: Rc<FunctionNode>, scope: ScopeId) -> Result<ObjectId, JsError> {
        let name = node.id.clone().unwrap_or_else(|| JsString::from(""));
        let arity = node.params.len() as u32;
        let func = self.alloc_function(name.as_str(), FunctionKind::Interpreted { node, scope }, arity);
        let prototype = self.create_object();
        self.heap
            .object_mut(prototype)?
            .properties
            .insert(JsString::from("constructor"), Property::hidden(Value::Object(func)));
        self.heap.object_mut(func)?.properties.insert(
            JsString::from("prototype"),
            Property::with_flags(Value::Object(prototype), true, false, false),
        );
        Ok(func)
    }
}
