//! The explicit evaluation stack
//!
//! Each `State` is one pending AST node. Its `Frame` records how far the
//! node has progressed, so execution can stop between any two steps and
//! resume later. Children report back by writing into the `value` (or
//! `reference`) slot of the state below them.

use std::rc::Rc;

use crate::ast::{
    ArrayExpression, AssignmentExpression, BinaryExpression, CallExpression,
    ConditionalExpression, Expression, ExpressionStatement, ForInStatement, ForStatement, FunctionNode,
    Identifier, IfStatement, JumpStatement, LabeledStatement, Literal, LogicalExpression,
    MemberExpression, MemberProperty, ObjectExpression, ReturnStatement, SequenceExpression, Statement,
    SwitchStatement, ThrowStatement, TryStatement, UnaryExpression, UpdateExpression,
    VariableDeclaration, WhileStatement, WithStatement,
};
use crate::lexer::Span;
use crate::prelude::FxHashSet;
use crate::value::{JsString, ObjectId, ScopeId, Value};

// ═══════════════════════════════════════════════════════════════════════════════
// Stack Types
// ═══════════════════════════════════════════════════════════════════════════════

/// One entry of the evaluation stack
#[derive(Debug, Clone)]
pub struct State {
    pub frame: Frame,
    pub scope: ScopeId,
    /// Result slot written by the child that just finished
    pub value: Value,
    /// Result slot written by a reference child
    pub reference: Option<Reference>,
    /// Labels of an enclosing labeled statement
    pub labels: Vec<JsString>,
    pub span: Span,
}

impl State {
    pub fn new(frame: Frame, scope: ScopeId, span: Span) -> Self {
        Self {
            frame,
            scope,
            value: Value::Undefined,
            reference: None,
            labels: Vec::new(),
            span,
        }
    }

    pub fn with_labels(mut self, labels: Vec<JsString>) -> Self {
        self.labels = labels;
        self
    }

    pub fn is_loop(&self) -> bool {
        matches!(
            self.frame,
            Frame::While { .. } | Frame::DoWhile { .. } | Frame::For { .. } | Frame::ForIn(_)
        )
    }

    pub fn is_switch(&self) -> bool {
        matches!(self.frame, Frame::Switch(_))
    }

    pub fn has_label(&self, label: &JsString) -> bool {
        self.labels.contains(label)
    }
}

/// An evaluated assignment target
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    /// A name resolved through the scope chain
    Scope(JsString),
    /// A property of a base value
    Property(Value, JsString),
}

/// Completion type for abrupt control flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    Break,
    Continue,
    Return,
    Throw,
}

/// A pending abrupt completion recorded on a `try` frame
#[derive(Debug, Clone)]
pub struct Completion {
    pub kind: CompletionKind,
    pub value: Value,
    pub label: Option<JsString>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Frames
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-node evaluation progress
#[derive(Debug, Clone)]
pub enum Frame {
    // ═══════════════════════════════════════════════════════════════════════
    // Statements
    // ═══════════════════════════════════════════════════════════════════════
    /// Root of the program. Never popped so more code can be appended.
    Program {
        body: Rc<[Statement]>,
        index: usize,
        done: bool,
    },
    /// Body of a direct or indirect `eval`
    EvalProgram {
        body: Rc<[Statement]>,
        index: usize,
    },
    /// A statement list (block or function body)
    Block {
        body: Rc<[Statement]>,
        index: usize,
    },
    /// Empty statement, `debugger` and hoisted function declarations
    Empty,
    Expression {
        node: Rc<ExpressionStatement>,
        done: bool,
    },
    VariableDeclaration {
        node: Rc<VariableDeclaration>,
        index: usize,
        phase: VariablePhase,
    },
    If {
        node: Rc<IfStatement>,
        phase: BranchPhase,
    },
    Labeled(Rc<LabeledStatement>),
    Break(Rc<JumpStatement>),
    Continue(Rc<JumpStatement>),
    Return {
        node: Rc<ReturnStatement>,
        done: bool,
    },
    Throw {
        node: Rc<ThrowStatement>,
        done: bool,
    },
    With {
        node: Rc<WithStatement>,
        phase: WithPhase,
    },
    Switch(Box<SwitchFrame>),
    Try {
        node: Rc<TryStatement>,
        phase: TryPhase,
        completion: Option<Completion>,
    },
    While {
        node: Rc<WhileStatement>,
        phase: LoopPhase,
    },
    DoWhile {
        node: Rc<WhileStatement>,
        phase: LoopPhase,
    },
    For {
        node: Rc<ForStatement>,
        phase: LoopPhase,
    },
    ForIn(Box<ForInFrame>),

    // ═══════════════════════════════════════════════════════════════════════
    // Expressions
    // ═══════════════════════════════════════════════════════════════════════
    Literal(Rc<Literal>),
    Identifier {
        node: Rc<Identifier>,
        awaiting_getter: bool,
    },
    This,
    Array {
        node: Rc<ArrayExpression>,
        array: Option<ObjectId>,
        index: usize,
    },
    Object {
        node: Rc<ObjectExpression>,
        object: Option<ObjectId>,
        index: usize,
    },
    Function(Rc<FunctionNode>),
    Unary {
        node: Rc<UnaryExpression>,
        phase: UnaryPhase,
    },
    Update {
        node: Rc<UpdateExpression>,
        phase: UpdatePhase,
        result: Value,
    },
    Binary {
        node: Rc<BinaryExpression>,
        phase: BinaryPhase,
        left: Value,
    },
    Logical {
        node: Rc<LogicalExpression>,
        phase: BinaryPhase,
    },
    Conditional {
        node: Rc<ConditionalExpression>,
        phase: BranchPhase,
    },
    Assignment {
        node: Rc<AssignmentExpression>,
        phase: AssignPhase,
        left: Value,
        result: Value,
    },
    Sequence {
        node: Rc<SequenceExpression>,
        index: usize,
    },
    Member {
        node: Rc<MemberExpression>,
        phase: MemberPhase,
        object: Value,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // Internal
    // ═══════════════════════════════════════════════════════════════════════
    /// Evaluates a member expression to a `Reference` instead of a value
    Reference {
        node: Rc<MemberExpression>,
        phase: MemberPhase,
        object: Value,
    },
    Call(Box<CallFrame>),
}

impl Frame {
    /// Node kind name, for tracing
    pub fn name(&self) -> &'static str {
        match self {
            Frame::Program { .. } => "Program",
            Frame::EvalProgram { .. } => "EvalProgram",
            Frame::Block { .. } => "Block",
            Frame::Empty => "Empty",
            Frame::Expression { .. } => "ExpressionStatement",
            Frame::VariableDeclaration { .. } => "VariableDeclaration",
            Frame::If { .. } => "IfStatement",
            Frame::Labeled(_) => "LabeledStatement",
            Frame::Break(_) => "BreakStatement",
            Frame::Continue(_) => "ContinueStatement",
            Frame::Return { .. } => "ReturnStatement",
            Frame::Throw { .. } => "ThrowStatement",
            Frame::With { .. } => "WithStatement",
            Frame::Switch(_) => "SwitchStatement",
            Frame::Try { .. } => "TryStatement",
            Frame::While { .. } => "WhileStatement",
            Frame::DoWhile { .. } => "DoWhileStatement",
            Frame::For { .. } => "ForStatement",
            Frame::ForIn(_) => "ForInStatement",
            Frame::Literal(_) => "Literal",
            Frame::Identifier { .. } => "Identifier",
            Frame::This => "ThisExpression",
            Frame::Array { .. } => "ArrayExpression",
            Frame::Object { .. } => "ObjectExpression",
            Frame::Function(_) => "FunctionExpression",
            Frame::Unary { .. } => "UnaryExpression",
            Frame::Update { .. } => "UpdateExpression",
            Frame::Binary { .. } => "BinaryExpression",
            Frame::Logical { .. } => "LogicalExpression",
            Frame::Conditional { .. } => "ConditionalExpression",
            Frame::Assignment { .. } => "AssignmentExpression",
            Frame::Sequence { .. } => "SequenceExpression",
            Frame::Member { .. } => "MemberExpression",
            Frame::Reference { .. } => "Reference",
            Frame::Call(call) if call.is_new => "NewExpression",
            Frame::Call(_) => "CallExpression",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariablePhase {
    Next,
    Assign,
}

/// Shared by `if` and `?:`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchPhase {
    Start,
    Test,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithPhase {
    Start,
    Object,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryPhase {
    Start,
    Block,
    Handler,
    Finalizer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Start,
    Test,
    CheckTest,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchPhase {
    Start,
    Discriminant,
    Cases,
}

#[derive(Debug, Clone)]
pub struct SwitchFrame {
    pub node: Rc<SwitchStatement>,
    pub phase: SwitchPhase,
    pub discriminant: Value,
    pub case_index: usize,
    pub statement_index: usize,
    pub default_case: Option<usize>,
    pub matched: bool,
    /// The current case test has been evaluated into `State::value`
    pub tested: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForInPhase {
    Start,
    Init,
    Object,
    Next,
    Assign,
    Body,
}

#[derive(Debug, Clone)]
pub struct ForInFrame {
    pub node: Rc<ForInStatement>,
    pub phase: ForInPhase,
    /// Object whose own keys are being walked; moves up the prototype chain
    pub object: Value,
    pub keys: Option<Vec<JsString>>,
    pub key_index: usize,
    pub visited: FxHashSet<JsString>,
    pub name: JsString,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryPhase {
    Start,
    Operand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePhase {
    Start,
    Reference,
    Getter,
    Setter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryPhase {
    Start,
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignPhase {
    Start,
    Target,
    Getter,
    Value,
    Setter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberPhase {
    Start,
    Object,
    Property,
    Getter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallPhase {
    Start,
    CalleeReference,
    CalleeValue,
    CalleeGetter,
    Arguments,
    Invoke,
    /// The callee is running; whatever lands in `State::value` is the result
    Returned,
    AwaitAsync,
}

/// A call in progress: user call sites, `new`, and synthetic accessor calls
#[derive(Debug, Clone)]
pub struct CallFrame {
    /// `None` for calls the interpreter synthesizes (getters, setters)
    pub node: Option<Rc<CallExpression>>,
    pub is_new: bool,
    pub phase: CallPhase,
    pub func: Value,
    pub this: Value,
    pub args: Vec<Value>,
    pub arg_index: usize,
    /// Callee was the plain identifier `eval`
    pub direct_eval: bool,
    /// Object under construction for `new`
    pub construct: Option<ObjectId>,
    /// Name used in stack traces and error messages
    pub name: JsString,
}

impl CallFrame {
    /// A call or `new` written in the source
    pub fn from_node(node: Rc<CallExpression>, is_new: bool) -> Self {
        let name = match &node.callee {
            Expression::Identifier(id) => id.name.clone(),
            Expression::Member(member) => match &member.property {
                MemberProperty::Identifier(name) => name.clone(),
                MemberProperty::Expression(_) => JsString::from("<computed>"),
            },
            Expression::Function(func) => func
                .id
                .clone()
                .unwrap_or_else(|| JsString::from("<anonymous>")),
            _ => JsString::from("<anonymous>"),
        };
        Self {
            node: Some(node),
            is_new,
            phase: CallPhase::Start,
            func: Value::Undefined,
            this: Value::Undefined,
            args: Vec::new(),
            arg_index: 0,
            direct_eval: false,
            construct: None,
            name,
        }
    }

    /// A call the interpreter inserts itself, e.g. for a getter
    pub fn synthetic(func: ObjectId, this: Value, args: Vec<Value>) -> Self {
        Self {
            node: None,
            is_new: false,
            phase: CallPhase::Invoke,
            func: Value::Object(func),
            this,
            args,
            arg_index: 0,
            direct_eval: false,
            construct: None,
            name: JsString::from("<accessor>"),
        }
    }
}
