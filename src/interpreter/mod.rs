//! Step-driven interpreter
//!
//! The interpreter keeps an explicit stack of `State`s instead of recursing
//! through the AST. `step()` advances the topmost state by one small unit of
//! work, so a host can stop between any two steps, snapshot the stack, or wait
//! for an asynchronous native to complete.

pub mod builtins;
mod call;
mod conversions;
mod expressions;
mod polyfills;
pub mod property;
pub mod stack;
mod statements;
mod unwind;

use std::rc::Rc;
use std::time::Duration;

use crate::ast::{Expression, Program, Statement};
use crate::error::{ErrorKind, JsError};
use crate::lexer::Span;
use crate::parser::{Parser, parse_program};
use crate::value::{
    AsyncCallback, AsyncFn, CheapClone, FunctionKind, Heap, JsObject, JsString, NativeFn,
    ObjectId, ObjectKind, Property, Scope, ScopeId, Value,
};

pub use property::{PropertyResult, SetResult};
pub use stack::{Frame, Reference, State};

use stack::{
    AssignPhase, BinaryPhase, BranchPhase, CallFrame, CallPhase, CompletionKind, ForInFrame, ForInPhase,
    LoopPhase, MemberPhase, SwitchFrame, SwitchPhase, TryPhase, UnaryPhase, UpdatePhase,
    VariablePhase, WithPhase,
};

// ═══════════════════════════════════════════════════════════════════════════════
// Configuration
// ═══════════════════════════════════════════════════════════════════════════════

/// How regular expressions are executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegexMode {
    /// Every regex operation throws a guest error
    Refuse,
    /// Run on the interpreter thread with no time limit
    Inline,
    /// Run on a worker thread, abandoned after `regex_timeout`
    #[default]
    Thread,
}

impl RegexMode {
    /// Numeric levels 0, 1 and 2, as hosts configure them
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(RegexMode::Refuse),
            1 => Some(RegexMode::Inline),
            2 => Some(RegexMode::Thread),
            _ => None,
        }
    }
}

/// Interpreter configuration
#[derive(Debug, Clone)]
pub struct InterpreterConfig {
    /// Upper bound on micro-steps one `step()` may coalesce while running
    /// position-less (polyfill) code
    pub step_budget: usize,
    pub regex_mode: RegexMode,
    pub regex_timeout: Duration,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            step_budget: 10_000,
            regex_mode: RegexMode::default(),
            regex_timeout: Duration::from_millis(1000),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Interpreter
// ═══════════════════════════════════════════════════════════════════════════════

/// Signature of builtin methods registered with `register_method`
pub type NativeMethod = fn(&mut Interpreter, Value, &[Value]) -> Result<Value, JsError>;

/// Prototypes and constructors the evaluator needs by identity
#[derive(Debug, Clone, Copy)]
pub(crate) struct Realm {
    pub object_prototype: ObjectId,
    pub function_prototype: ObjectId,
    pub array_prototype: ObjectId,
    pub string_prototype: ObjectId,
    pub number_prototype: ObjectId,
    pub boolean_prototype: ObjectId,
    pub date_prototype: ObjectId,
    pub regexp_prototype: ObjectId,
    /// Indexed like `ErrorKind::ALL`
    pub error_prototypes: [ObjectId; 7],
    pub array_constructor: Option<ObjectId>,
}

/// Host-visible redirect requested by `Function.prototype.call`/`apply`
#[derive(Debug, Clone)]
pub(crate) struct Redirect {
    pub func: Value,
    pub this: Value,
    pub args: Vec<Value>,
}

#[derive(Debug, Clone)]
struct PendingAsync {
    id: u64,
    result: Option<Value>,
}

/// The interpreter
pub struct Interpreter {
    pub(crate) heap: Heap,
    pub(crate) stack: Vec<State>,
    pub(crate) realm: Realm,
    pub(crate) global_scope: ScopeId,
    global_object: ObjectId,
    pub(crate) config: InterpreterConfig,
    /// Completion value of the last expression statement
    value: Value,
    pending_async: Option<PendingAsync>,
    next_async_id: u64,
    /// Set by `call`/`apply` to re-target the current call frame
    pub(crate) redirect: Option<Redirect>,
    /// The running native was invoked through `new`
    called_with_new: bool,
    /// Scope of the state being stepped
    pub(crate) current_scope: ScopeId,
    /// Position of the state being stepped
    current_span: Span,
    pub(crate) rng_state: u64,
}

impl Interpreter {
    /// Parse `code` and prepare it to run with the default configuration
    pub fn new(code: &str) -> Result<Self, JsError> {
        Self::with_config(code, InterpreterConfig::default())
    }

    pub fn with_config(code: &str, config: InterpreterConfig) -> Result<Self, JsError> {
        Self::with_init(code, config, |_, _| Ok(()))
    }

    /// Like `with_config`, running `init` once with the global object before
    /// any user code so the host can install its own natives
    pub fn with_init<F>(code: &str, config: InterpreterConfig, init: F) -> Result<Self, JsError>
    where
        F: FnOnce(&mut Interpreter, ObjectId) -> Result<(), JsError>,
    {
        let program = parse_program(code)?;
        Self::from_program(program, config, init)
    }

    /// Build an interpreter around an already parsed program
    pub fn from_program<F>(program: Program, config: InterpreterConfig, init: F) -> Result<Self, JsError>
    where
        F: FnOnce(&mut Interpreter, ObjectId) -> Result<(), JsError>,
    {
        let mut interp = Self::bootstrap(config)?;
        let global = interp.global_object;
        init(&mut interp, global)?;

        let scope = interp.global_scope;
        interp.heap.scope_mut(scope)?.strict = program.strict;
        interp.populate_scope(scope, &program.declarations)?;
        interp.stack.push(State::new(
            Frame::Program {
                body: program.body,
                index: 0,
                done: false,
            },
            scope,
            program.span,
        ));
        log::debug!(
            "interpreter ready: {} objects after bootstrap",
            interp.heap.object_count()
        );
        Ok(interp)
    }

    /// Allocate the realm, the global scope and every builtin, then run the
    /// polyfills to completion
    fn bootstrap(config: InterpreterConfig) -> Result<Self, JsError> {
        let mut heap = Heap::new();
        let object_prototype = heap.alloc(JsObject::new(ObjectKind::Plain, None));
        let noop: NativeFn = Rc::new(|_, _, _| Ok(Value::Undefined));
        let function_prototype = heap.alloc(JsObject::new(
            ObjectKind::Function(FunctionKind::Native {
                func: noop,
                constructor: false,
            }),
            Some(object_prototype),
        ));
        let mut with_proto = |kind: ObjectKind| heap.alloc(JsObject::new(kind, Some(object_prototype)));
        let array_prototype = with_proto(ObjectKind::Array { length: 0 });
        let string_prototype = with_proto(ObjectKind::String(JsString::from("")));
        let number_prototype = with_proto(ObjectKind::Number(0.0));
        let boolean_prototype = with_proto(ObjectKind::Boolean(false));
        let date_prototype = with_proto(ObjectKind::Plain);
        let regexp_prototype = with_proto(ObjectKind::Plain);
        let error_prototype = with_proto(ObjectKind::Plain);
        let global_object = with_proto(ObjectKind::Plain);

        let mut error_prototypes = [error_prototype; 7];
        for slot in error_prototypes.iter_mut().skip(1) {
            *slot = heap.alloc(JsObject::new(ObjectKind::Plain, Some(error_prototype)));
        }

        let global_scope = heap.alloc_scope(Scope {
            parent: None,
            strict: false,
            object: global_object,
            this_value: Some(Value::Object(global_object)),
        });

        let mut interp = Self {
            heap,
            stack: Vec::new(),
            realm: Realm {
                object_prototype,
                function_prototype,
                array_prototype,
                string_prototype,
                number_prototype,
                boolean_prototype,
                date_prototype,
                regexp_prototype,
                error_prototypes,
                array_constructor: None,
            },
            global_scope,
            global_object,
            config,
            value: Value::Undefined,
            pending_async: None,
            next_async_id: 0,
            redirect: None,
            called_with_new: false,
            current_scope: global_scope,
            current_span: Span::default(),
            rng_state: crate::platform::random_seed(),
        };

        builtins::init_builtins(&mut interp)?;
        interp.run_polyfills()?;
        Ok(interp)
    }

    /// Execute the bundled guest-source polyfills in a throwaway program
    fn run_polyfills(&mut self) -> Result<(), JsError> {
        let program = Parser::synthetic(polyfills::POLYFILLS).parse_program()?;
        let scope = self.global_scope;
        self.populate_scope(scope, &program.declarations)?;
        self.stack.push(State::new(
            Frame::Program {
                body: program.body,
                index: 0,
                done: false,
            },
            scope,
            program.span,
        ));
        while self.step_raw()? {}
        self.stack.clear();
        self.value = Value::Undefined;
        log::debug!("polyfills installed");
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Stepping
    // ═══════════════════════════════════════════════════════════════════════════

    /// Execute one step. Returns `Ok(true)` if there is more work to do (or the
    /// interpreter is paused on an asynchronous call), `Ok(false)` when the
    /// program has finished.
    pub fn step(&mut self) -> Result<bool, JsError> {
        if self.is_paused() {
            return Ok(true);
        }
        let mut budget = self.config.step_budget.max(1);
        loop {
            if !self.has_work() {
                return Ok(false);
            }
            let span = self.stack.last().map(|state| state.span).unwrap_or_default();
            self.step_once()?;
            budget -= 1;
            if !span.is_synthetic() || budget == 0 || self.is_paused() {
                break;
            }
        }
        Ok(self.has_work() || self.is_paused())
    }

    /// Step until the program finishes or pauses. Returns `Ok(true)` if paused.
    pub fn run(&mut self) -> Result<bool, JsError> {
        while !self.is_paused() && self.step()? {}
        Ok(self.is_paused())
    }

    /// Single micro-step with no coalescing, used for the bootstrap program
    fn step_raw(&mut self) -> Result<bool, JsError> {
        if !self.has_work() {
            return Ok(false);
        }
        self.step_once()?;
        Ok(self.has_work())
    }

    fn has_work(&self) -> bool {
        match self.stack.last() {
            None => false,
            Some(State {
                frame: Frame::Program { done, .. },
                ..
            }) => !done,
            Some(_) => true,
        }
    }

    fn step_once(&mut self) -> Result<(), JsError> {
        let Some(mut state) = self.stack.pop() else {
            return Ok(());
        };
        let frame = std::mem::replace(&mut state.frame, Frame::Empty);
        log::trace!(
            "step {} at {}:{}",
            frame.name(),
            state.span.line,
            state.span.column
        );
        self.current_scope = state.scope;
        if !state.span.is_synthetic() {
            self.current_span = state.span;
        }

        match self.dispatch(state, frame) {
            Ok(()) => Ok(()),
            Err(JsError::Internal(message)) => Err(JsError::Internal(message)),
            Err(err) => {
                let value = self.error_to_value(err)?;
                self.unwind(CompletionKind::Throw, value, None)
            }
        }
    }

    fn dispatch(&mut self, state: State, frame: Frame) -> Result<(), JsError> {
        match frame {
            Frame::Program { body, index, .. } => self.step_program(state, body, index),
            Frame::EvalProgram { body, index } => self.step_eval_program(state, body, index),
            Frame::Block { body, index } => self.step_block(state, body, index),
            Frame::Empty => Ok(()),
            Frame::Expression { node, done } => self.step_expression_statement(state, node, done),
            Frame::VariableDeclaration { node, index, phase } => {
                self.step_variable_declaration(state, node, index, phase)
            }
            Frame::If { node, phase } => self.step_if(state, node, phase),
            Frame::Labeled(node) => self.step_labeled(state, node),
            Frame::Break(node) => self.unwind(CompletionKind::Break, Value::Undefined, node.label.clone()),
            Frame::Continue(node) => {
                self.unwind(CompletionKind::Continue, Value::Undefined, node.label.clone())
            }
            Frame::Return { node, done } => self.step_return(state, node, done),
            Frame::Throw { node, done } => self.step_throw(state, node, done),
            Frame::With { node, phase } => self.step_with(state, node, phase),
            Frame::Switch(frame) => self.step_switch(state, frame),
            Frame::Try {
                node,
                phase,
                completion,
            } => self.step_try(state, node, phase, completion),
            Frame::While { node, phase } => self.step_while(state, node, phase),
            Frame::DoWhile { node, phase } => self.step_do_while(state, node, phase),
            Frame::For { node, phase } => self.step_for(state, node, phase),
            Frame::ForIn(frame) => self.step_for_in(state, frame),
            Frame::Literal(node) => self.step_literal(node),
            Frame::Identifier {
                node,
                awaiting_getter,
            } => self.step_identifier(state, node, awaiting_getter),
            Frame::This => {
                let this = self.this_value(state.scope)?;
                self.ascend(this);
                Ok(())
            }
            Frame::Array { node, array, index } => self.step_array(state, node, array, index),
            Frame::Object {
                node,
                object,
                index,
            } => self.step_object(state, node, object, index),
            Frame::Function(node) => {
                let func = self.create_function(node, state.scope)?;
                self.ascend(Value::Object(func));
                Ok(())
            }
            Frame::Unary { node, phase } => self.step_unary(state, node, phase),
            Frame::Update {
                node,
                phase,
                result,
            } => self.step_update(state, node, phase, result),
            Frame::Binary { node, phase, left } => self.step_binary(state, node, phase, left),
            Frame::Logical { node, phase } => self.step_logical(state, node, phase),
            Frame::Conditional { node, phase } => self.step_conditional(state, node, phase),
            Frame::Assignment {
                node,
                phase,
                left,
                result,
            } => self.step_assignment(state, node, phase, left, result),
            Frame::Sequence { node, index } => self.step_sequence(state, node, index),
            Frame::Member {
                node,
                phase,
                object,
            } => self.step_member(state, node, phase, object, false),
            Frame::Reference {
                node,
                phase,
                object,
            } => self.step_member(state, node, phase, object, true),
            Frame::Call(frame) => self.step_call(state, frame),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Stack helpers
    // ═══════════════════════════════════════════════════════════════════════════

    /// Push a state for a statement
    pub(crate) fn push_statement(&mut self, statement: &Statement, scope: ScopeId, labels: Vec<JsString>) {
        let frame = match statement {
            Statement::Empty(_) | Statement::Debugger(_) | Statement::FunctionDeclaration(_) => {
                Frame::Empty
            }
            Statement::Expression(node) => Frame::Expression {
                node: node.cheap_clone(),
                done: false,
            },
            Statement::Block(node) => Frame::Block {
                body: node.body.cheap_clone(),
                index: 0,
            },
            Statement::VariableDeclaration(node) => Frame::VariableDeclaration {
                node: node.cheap_clone(),
                index: 0,
                phase: VariablePhase::Next,
            },
            Statement::If(node) => Frame::If {
                node: node.cheap_clone(),
                phase: BranchPhase::Start,
            },
            Statement::Labeled(node) => Frame::Labeled(node.cheap_clone()),
            Statement::Break(node) => Frame::Break(node.cheap_clone()),
            Statement::Continue(node) => Frame::Continue(node.cheap_clone()),
            Statement::Return(node) => Frame::Return {
                node: node.cheap_clone(),
                done: false,
            },
            Statement::Throw(node) => Frame::Throw {
                node: node.cheap_clone(),
                done: false,
            },
            Statement::With(node) => Frame::With {
                node: node.cheap_clone(),
                phase: WithPhase::Start,
            },
            Statement::Switch(node) => Frame::Switch(Box::new(SwitchFrame {
                node: node.cheap_clone(),
                phase: SwitchPhase::Start,
                discriminant: Value::Undefined,
                case_index: 0,
                statement_index: 0,
                default_case: None,
                matched: false,
                tested: false,
            })),
            Statement::Try(node) => Frame::Try {
                node: node.cheap_clone(),
                phase: TryPhase::Start,
                completion: None,
            },
            Statement::While(node) => Frame::While {
                node: node.cheap_clone(),
                phase: LoopPhase::Start,
            },
            Statement::DoWhile(node) => Frame::DoWhile {
                node: node.cheap_clone(),
                phase: LoopPhase::Start,
            },
            Statement::For(node) => Frame::For {
                node: node.cheap_clone(),
                phase: LoopPhase::Start,
            },
            Statement::ForIn(node) => Frame::ForIn(Box::new(ForInFrame {
                node: node.cheap_clone(),
                phase: ForInPhase::Start,
                object: Value::Undefined,
                keys: None,
                key_index: 0,
                visited: Default::default(),
                name: JsString::from(""),
            })),
        };
        self.stack
            .push(State::new(frame, scope, statement.span()).with_labels(labels));
    }

    /// Push a state that evaluates an expression to a value
    pub(crate) fn push_expression(&mut self, expression: &Expression, scope: ScopeId) {
        let frame = match expression {
            Expression::Literal(node) => Frame::Literal(node.cheap_clone()),
            Expression::Identifier(node) => Frame::Identifier {
                node: node.cheap_clone(),
                awaiting_getter: false,
            },
            Expression::This(_) => Frame::This,
            Expression::Array(node) => Frame::Array {
                node: node.cheap_clone(),
                array: None,
                index: 0,
            },
            Expression::Object(node) => Frame::Object {
                node: node.cheap_clone(),
                object: None,
                index: 0,
            },
            Expression::Function(node) => Frame::Function(node.cheap_clone()),
            Expression::Unary(node) => Frame::Unary {
                node: node.cheap_clone(),
                phase: UnaryPhase::Start,
            },
            Expression::Update(node) => Frame::Update {
                node: node.cheap_clone(),
                phase: UpdatePhase::Start,
                result: Value::Undefined,
            },
            Expression::Binary(node) => Frame::Binary {
                node: node.cheap_clone(),
                phase: BinaryPhase::Start,
                left: Value::Undefined,
            },
            Expression::Logical(node) => Frame::Logical {
                node: node.cheap_clone(),
                phase: BinaryPhase::Start,
            },
            Expression::Conditional(node) => Frame::Conditional {
                node: node.cheap_clone(),
                phase: BranchPhase::Start,
            },
            Expression::Assignment(node) => Frame::Assignment {
                node: node.cheap_clone(),
                phase: AssignPhase::Start,
                left: Value::Undefined,
                result: Value::Undefined,
            },
            Expression::Sequence(node) => Frame::Sequence {
                node: node.cheap_clone(),
                index: 0,
            },
            Expression::Member(node) => Frame::Member {
                node: node.cheap_clone(),
                phase: MemberPhase::Start,
                object: Value::Undefined,
            },
            Expression::Call(node) => Frame::Call(Box::new(CallFrame::from_node(node.cheap_clone(), false))),
            Expression::New(node) => Frame::Call(Box::new(CallFrame::from_node(node.cheap_clone(), true))),
        };
        self.stack.push(State::new(frame, scope, expression.span()));
    }

    /// Evaluate an expression to a `Reference` for the state on top. Plain
    /// identifiers resolve immediately; member expressions push a state.
    pub(crate) fn push_reference(&mut self, expression: &Expression, scope: ScopeId) -> Result<(), JsError> {
        match expression {
            Expression::Identifier(node) => {
                self.ascend_reference(Reference::Scope(node.name.cheap_clone()));
                Ok(())
            }
            Expression::Member(node) => {
                self.stack.push(State::new(
                    Frame::Reference {
                        node: node.cheap_clone(),
                        phase: MemberPhase::Start,
                        object: Value::Undefined,
                    },
                    scope,
                    node.span,
                ));
                Ok(())
            }
            _ => Err(JsError::internal("expression is not a reference")),
        }
    }

    /// Push a synthetic call, typically of an accessor
    pub(crate) fn push_call(&mut self, frame: CallFrame, scope: ScopeId, span: Span) {
        self.stack
            .push(State::new(Frame::Call(Box::new(frame)), scope, span));
    }

    /// Hand a result to the state below
    pub(crate) fn ascend(&mut self, value: Value) {
        if let Some(parent) = self.stack.last_mut() {
            parent.value = value;
        }
    }

    pub(crate) fn ascend_reference(&mut self, reference: Reference) {
        if let Some(parent) = self.stack.last_mut() {
            parent.reference = Some(reference);
        }
    }

    /// Strictness of the code currently being stepped
    pub(crate) fn is_strict(&self) -> bool {
        self.heap
            .scope(self.current_scope)
            .map(|scope| scope.strict)
            .unwrap_or(false)
    }

    /// Resolve `this` by walking to the nearest scope that binds it
    pub(crate) fn this_value(&self, scope: ScopeId) -> Result<Value, JsError> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.heap.scope(id)?;
            if let Some(this) = &scope.this_value {
                return Ok(this.clone());
            }
            current = scope.parent;
        }
        Ok(Value::Object(self.global_object))
    }

    /// Lines of the form `    at name (line:column)` for every active call,
    /// innermost first
    pub(crate) fn stack_trace(&self) -> String {
        let mut lines = Vec::new();
        if !self.current_span.is_synthetic() {
            lines.push(format!(
                "    at {}:{}",
                self.current_span.line, self.current_span.column
            ));
        }
        for state in self.stack.iter().rev() {
            if let Frame::Call(call) = &state.frame {
                // Only calls whose callee has been entered
                let entered = matches!(call.phase, CallPhase::Returned | CallPhase::AwaitAsync);
                if entered && call.node.is_some() && !state.span.is_synthetic() {
                    lines.push(format!(
                        "    at {} ({}:{})",
                        call.name, state.span.line, state.span.column
                    ));
                }
            }
        }
        lines.join("\n")
    }

    pub(crate) fn error_prototype(&self, kind: ErrorKind) -> ObjectId {
        let [error, eval, range, reference, syntax, type_error, uri] = self.realm.error_prototypes;
        match kind {
            ErrorKind::Error => error,
            ErrorKind::EvalError => eval,
            ErrorKind::RangeError => range,
            ErrorKind::ReferenceError => reference,
            ErrorKind::SyntaxError => syntax,
            ErrorKind::TypeError => type_error,
            ErrorKind::URIError => uri,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Public API
    // ═══════════════════════════════════════════════════════════════════════════

    /// Completion value of the most recent expression statement
    pub fn value(&self) -> Value {
        self.value.clone()
    }

    pub(crate) fn set_completion_value(&mut self, value: Value) {
        self.value = value;
    }

    pub fn global_object(&self) -> ObjectId {
        self.global_object
    }

    /// Waiting for the host to complete an asynchronous native call
    pub fn is_paused(&self) -> bool {
        matches!(&self.pending_async, Some(PendingAsync { result: None, .. }))
    }

    /// Whether the running native was invoked with `new`
    pub fn called_with_new(&self) -> bool {
        self.called_with_new
    }

    /// Parse more code and queue it behind the current program
    pub fn append_code(&mut self, code: &str) -> Result<(), JsError> {
        let program = parse_program(code)?;
        let Some(root) = self.stack.first() else {
            return Err(JsError::internal("expected a Program state at the bottom of the stack"));
        };
        let Frame::Program { body, index, .. } = &root.frame else {
            return Err(JsError::internal("expected a Program state at the bottom of the stack"));
        };
        let index = *index;
        let merged: Rc<[Statement]> = body.iter().chain(program.body.iter()).cloned().collect();
        let scope = root.scope;
        // A directive in appended code makes the rest of the program strict
        if program.strict {
            self.heap.scope_mut(scope)?.strict = true;
        }
        self.populate_scope(scope, &program.declarations)?;
        if let Some(root) = self.stack.first_mut() {
            root.frame = Frame::Program {
                body: merged,
                index,
                done: false,
            };
        }
        log::debug!("appended {} statements", program.body.len());
        Ok(())
    }

    /// Snapshot of the evaluation stack
    pub fn get_state_stack(&self) -> Vec<State> {
        self.stack.clone()
    }

    /// Replace the evaluation stack, e.g. with an earlier snapshot
    pub fn set_state_stack(&mut self, stack: Vec<State>) {
        self.stack = stack;
    }

    /// Create a native function object. It is not a constructor.
    pub fn create_native_function<F>(&mut self, name: &str, func: F, arity: u32) -> ObjectId
    where
        F: Fn(&mut Interpreter, Value, &[Value]) -> Result<Value, JsError> + 'static,
    {
        self.alloc_function(
            name,
            FunctionKind::Native {
                func: Rc::new(func),
                constructor: false,
            },
            arity,
        )
    }

    /// Create a native that suspends the interpreter until the host calls
    /// `resume_async` with the token it receives
    pub fn create_async_function<F>(&mut self, name: &str, func: F, arity: u32) -> ObjectId
    where
        F: Fn(&mut Interpreter, Value, &[Value], AsyncCallback) -> Result<(), JsError> + 'static,
    {
        let func: AsyncFn = Rc::new(func);
        self.alloc_function(name, FunctionKind::Async { func }, arity)
    }

    /// Complete an outstanding asynchronous call with its result
    pub fn resume_async(&mut self, callback: AsyncCallback, value: Value) -> Result<(), JsError> {
        match &mut self.pending_async {
            Some(pending) if pending.id == callback.id && pending.result.is_none() => {
                pending.result = Some(value);
                log::debug!("async call {} resumed", callback.id);
                Ok(())
            }
            _ => Err(JsError::internal(format!(
                "no pending asynchronous call with id {}",
                callback.id
            ))),
        }
    }

    /// Throw a new guest error of `kind` at the current position. Also usable
    /// by the host to reject a pending asynchronous call.
    pub fn throw_exception(&mut self, kind: ErrorKind, message: &str) -> Result<(), JsError> {
        let error = self.create_error(kind, message)?;
        self.unwind(CompletionKind::Throw, Value::Object(error), None)
    }

    /// Register a builtin method as a non-enumerable property of `target`
    pub fn register_method(
        &mut self,
        target: ObjectId,
        name: &str,
        func: NativeMethod,
        arity: u32,
    ) -> Result<(), JsError> {
        let method = self.create_native_function(name, func, arity);
        self.heap
            .object_mut(target)?
            .properties
            .insert(JsString::from(name), Property::hidden(Value::Object(method)));
        Ok(())
    }

    /// Create a plain object inheriting from `Object.prototype`
    pub fn create_object(&mut self) -> ObjectId {
        self.heap.alloc(JsObject::new(
            ObjectKind::Plain,
            Some(self.realm.object_prototype),
        ))
    }

    /// Create an array holding `elements`
    pub fn create_array(&mut self, elements: Vec<Value>) -> ObjectId {
        let mut array = JsObject::new(
            ObjectKind::Array {
                length: elements.len() as u32,
            },
            Some(self.realm.array_prototype),
        );
        for (i, element) in elements.into_iter().enumerate() {
            array
                .properties
                .insert(JsString::from(i.to_string()), Property::data(element));
        }
        self.heap.alloc(array)
    }

    /// Borrow an object of the heap
    pub fn object(&self, id: ObjectId) -> Result<&JsObject, JsError> {
        self.heap.object(id)
    }

    pub(crate) fn alloc_function(&mut self, name: &str, kind: FunctionKind, arity: u32) -> ObjectId {
        let mut object = JsObject::new(
            ObjectKind::Function(kind),
            Some(self.realm.function_prototype),
        );
        object.properties.insert(
            JsString::from("length"),
            Property::frozen(Value::Number(f64::from(arity))),
        );
        object.properties.insert(
            JsString::from("name"),
            Property::with_flags(Value::from(name), false, false, true),
        );
        self.heap.alloc(object)
    }

    /// Take the result of a completed asynchronous call, leaving the pause
    pub(crate) fn take_async_result(&mut self) -> Option<Value> {
        match self.pending_async.take() {
            Some(PendingAsync {
                result: Some(value),
                ..
            }) => Some(value),
            pending => {
                self.pending_async = pending;
                None
            }
        }
    }

    pub(crate) fn begin_async(&mut self) -> AsyncCallback {
        self.next_async_id += 1;
        let id = self.next_async_id;
        self.pending_async = Some(PendingAsync { id, result: None });
        AsyncCallback { id }
    }

    pub(crate) fn cancel_async(&mut self) {
        self.pending_async = None;
    }

    pub(crate) fn set_called_with_new(&mut self, value: bool) {
        self.called_with_new = value;
    }
}
