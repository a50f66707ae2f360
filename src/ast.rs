//! Abstract Syntax Tree types for ES5
//!
//! Child links are reference counted so that evaluator frames can hold on to
//! the node they are stepping through without borrowing the whole program.

use std::rc::Rc;

use crate::lexer::Span;
use crate::value::JsString;

/// A complete program
#[derive(Debug, Clone)]
pub struct Program {
    pub body: Rc<[Statement]>,
    pub declarations: Rc<Declarations>,
    /// Body starts with a `"use strict"` directive
    pub strict: bool,
    pub span: Span,
}

/// Hoisted declarations of a function body or program
#[derive(Debug, Clone, Default)]
pub struct Declarations {
    /// `var` names in source order, without duplicates
    pub vars: Vec<JsString>,
    /// Function declarations, later ones win on name clashes
    pub functions: Vec<Rc<FunctionNode>>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Statements
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub enum Statement {
    Empty(Span),
    Debugger(Span),
    Expression(Rc<ExpressionStatement>),
    Block(Rc<BlockStatement>),
    VariableDeclaration(Rc<VariableDeclaration>),
    FunctionDeclaration(Rc<FunctionNode>),
    If(Rc<IfStatement>),
    Labeled(Rc<LabeledStatement>),
    Break(Rc<JumpStatement>),
    Continue(Rc<JumpStatement>),
    Return(Rc<ReturnStatement>),
    Throw(Rc<ThrowStatement>),
    With(Rc<WithStatement>),
    Switch(Rc<SwitchStatement>),
    Try(Rc<TryStatement>),
    While(Rc<WhileStatement>),
    DoWhile(Rc<WhileStatement>),
    For(Rc<ForStatement>),
    ForIn(Rc<ForInStatement>),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Empty(span) | Statement::Debugger(span) => *span,
            Statement::Expression(s) => s.span,
            Statement::Block(s) => s.span,
            Statement::VariableDeclaration(s) => s.span,
            Statement::FunctionDeclaration(f) => f.span,
            Statement::If(s) => s.span,
            Statement::Labeled(s) => s.span,
            Statement::Break(s) | Statement::Continue(s) => s.span,
            Statement::Return(s) => s.span,
            Statement::Throw(s) => s.span,
            Statement::With(s) => s.span,
            Statement::Switch(s) => s.span,
            Statement::Try(s) => s.span,
            Statement::While(s) | Statement::DoWhile(s) => s.span,
            Statement::For(s) => s.span,
            Statement::ForIn(s) => s.span,
        }
    }

    /// Node type name as used in stack traces and logs
    pub fn type_name(&self) -> &'static str {
        match self {
            Statement::Empty(_) => "EmptyStatement",
            Statement::Debugger(_) => "DebuggerStatement",
            Statement::Expression(_) => "ExpressionStatement",
            Statement::Block(_) => "BlockStatement",
            Statement::VariableDeclaration(_) => "VariableDeclaration",
            Statement::FunctionDeclaration(_) => "FunctionDeclaration",
            Statement::If(_) => "IfStatement",
            Statement::Labeled(_) => "LabeledStatement",
            Statement::Break(_) => "BreakStatement",
            Statement::Continue(_) => "ContinueStatement",
            Statement::Return(_) => "ReturnStatement",
            Statement::Throw(_) => "ThrowStatement",
            Statement::With(_) => "WithStatement",
            Statement::Switch(_) => "SwitchStatement",
            Statement::Try(_) => "TryStatement",
            Statement::While(_) => "WhileStatement",
            Statement::DoWhile(_) => "DoWhileStatement",
            Statement::For(_) => "ForStatement",
            Statement::ForIn(_) => "ForInStatement",
        }
    }
}

#[derive(Debug)]
pub struct ExpressionStatement {
    pub expression: Expression,
    pub span: Span,
}

#[derive(Debug)]
pub struct BlockStatement {
    pub body: Rc<[Statement]>,
    pub span: Span,
}

#[derive(Debug)]
pub struct VariableDeclaration {
    pub declarations: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug)]
pub struct VariableDeclarator {
    pub id: JsString,
    pub init: Option<Expression>,
    pub span: Span,
}

#[derive(Debug)]
pub struct IfStatement {
    pub test: Expression,
    pub consequent: Statement,
    pub alternate: Option<Statement>,
    pub span: Span,
}

#[derive(Debug)]
pub struct LabeledStatement {
    pub label: JsString,
    pub body: Statement,
    pub span: Span,
}

/// `break label;` / `continue label;`
#[derive(Debug)]
pub struct JumpStatement {
    pub label: Option<JsString>,
    pub span: Span,
}

#[derive(Debug)]
pub struct ReturnStatement {
    pub argument: Option<Expression>,
    pub span: Span,
}

#[derive(Debug)]
pub struct ThrowStatement {
    pub argument: Expression,
    pub span: Span,
}

#[derive(Debug)]
pub struct WithStatement {
    pub object: Expression,
    pub body: Statement,
    pub span: Span,
}

#[derive(Debug)]
pub struct SwitchStatement {
    pub discriminant: Expression,
    pub cases: Vec<SwitchCase>,
    pub span: Span,
}

#[derive(Debug)]
pub struct SwitchCase {
    /// None for `default:`
    pub test: Option<Expression>,
    pub consequent: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug)]
pub struct TryStatement {
    pub block: Rc<BlockStatement>,
    pub handler: Option<CatchClause>,
    pub finalizer: Option<Rc<BlockStatement>>,
    pub span: Span,
}

#[derive(Debug)]
pub struct CatchClause {
    pub param: JsString,
    pub body: Rc<BlockStatement>,
    pub span: Span,
}

/// Shared by `while` and `do ... while`
#[derive(Debug)]
pub struct WhileStatement {
    pub test: Expression,
    pub body: Statement,
    pub span: Span,
}

#[derive(Debug)]
pub struct ForStatement {
    pub init: Option<ForInit>,
    pub test: Option<Expression>,
    pub update: Option<Expression>,
    pub body: Statement,
    pub span: Span,
}

#[derive(Debug)]
pub enum ForInit {
    Variable(Rc<VariableDeclaration>),
    Expression(Expression),
}

#[derive(Debug)]
pub struct ForInStatement {
    pub left: ForInTarget,
    pub right: Expression,
    pub body: Statement,
    pub span: Span,
}

#[derive(Debug)]
pub enum ForInTarget {
    /// `for (var x in o)` with the legacy initializer `for (var x = 1 in o)`
    Variable {
        name: JsString,
        init: Option<Expression>,
    },
    Pattern(Expression),
}

// ═══════════════════════════════════════════════════════════════════════════════
// Functions
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct FunctionNode {
    pub id: Option<JsString>,
    pub params: Vec<JsString>,
    pub body: Rc<[Statement]>,
    pub declarations: Declarations,
    /// Body starts with a `"use strict"` directive
    pub strict: bool,
    /// Function expressions bind their own name inside the body
    pub is_expression: bool,
    /// Source text, for `Function.prototype.toString`
    pub source: JsString,
    pub span: Span,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Expressions
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub enum Expression {
    Literal(Rc<Literal>),
    Identifier(Rc<Identifier>),
    This(Span),
    Array(Rc<ArrayExpression>),
    Object(Rc<ObjectExpression>),
    Function(Rc<FunctionNode>),
    Unary(Rc<UnaryExpression>),
    Update(Rc<UpdateExpression>),
    Binary(Rc<BinaryExpression>),
    Logical(Rc<LogicalExpression>),
    Conditional(Rc<ConditionalExpression>),
    Assignment(Rc<AssignmentExpression>),
    Sequence(Rc<SequenceExpression>),
    Member(Rc<MemberExpression>),
    Call(Rc<CallExpression>),
    New(Rc<CallExpression>),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Literal(e) => e.span,
            Expression::Identifier(e) => e.span,
            Expression::This(span) => *span,
            Expression::Array(e) => e.span,
            Expression::Object(e) => e.span,
            Expression::Function(f) => f.span,
            Expression::Unary(e) => e.span,
            Expression::Update(e) => e.span,
            Expression::Binary(e) => e.span,
            Expression::Logical(e) => e.span,
            Expression::Conditional(e) => e.span,
            Expression::Assignment(e) => e.span,
            Expression::Sequence(e) => e.span,
            Expression::Member(e) => e.span,
            Expression::Call(e) | Expression::New(e) => e.span,
        }
    }

    /// Valid target of assignment, `++`/`--` and for-in
    pub fn is_reference(&self) -> bool {
        matches!(self, Expression::Identifier(_) | Expression::Member(_))
    }
}

#[derive(Debug)]
pub struct Literal {
    pub value: LiteralValue,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum LiteralValue {
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
    RegExp { pattern: JsString, flags: JsString },
}

#[derive(Debug)]
pub struct Identifier {
    pub name: JsString,
    pub span: Span,
}

#[derive(Debug)]
pub struct ArrayExpression {
    /// `None` marks an elision hole: `[1, , 3]`
    pub elements: Vec<Option<Expression>>,
    pub span: Span,
}

#[derive(Debug)]
pub struct ObjectExpression {
    pub properties: Vec<ObjectProperty>,
    pub span: Span,
}

#[derive(Debug)]
pub struct ObjectProperty {
    pub key: JsString,
    pub value: Expression,
    pub kind: PropertyKind,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    Init,
    Get,
    Set,
}

#[derive(Debug)]
pub struct UnaryExpression {
    pub operator: UnaryOp,
    pub argument: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Minus,
    Plus,
    Not,
    BitNot,
    Typeof,
    Void,
    Delete,
}

#[derive(Debug)]
pub struct UpdateExpression {
    pub operator: UpdateOp,
    pub prefix: bool,
    pub argument: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

#[derive(Debug)]
pub struct BinaryExpression {
    pub operator: BinaryOp,
    pub left: Expression,
    pub right: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // Comparison
    Eq,
    NotEq,
    StrictEq,
    StrictNotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,

    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    LShift,
    RShift,
    URShift,

    // Other
    In,
    Instanceof,
}

#[derive(Debug)]
pub struct LogicalExpression {
    pub operator: LogicalOp,
    pub left: Expression,
    pub right: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

#[derive(Debug)]
pub struct ConditionalExpression {
    pub test: Expression,
    pub consequent: Expression,
    pub alternate: Expression,
    pub span: Span,
}

#[derive(Debug)]
pub struct AssignmentExpression {
    pub operator: AssignmentOp,
    pub target: Expression,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    LShiftAssign,
    RShiftAssign,
    URShiftAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
}

impl AssignmentOp {
    /// The binary operator a compound assignment applies
    pub fn binary_op(self) -> Option<BinaryOp> {
        match self {
            AssignmentOp::Assign => None,
            AssignmentOp::AddAssign => Some(BinaryOp::Add),
            AssignmentOp::SubAssign => Some(BinaryOp::Sub),
            AssignmentOp::MulAssign => Some(BinaryOp::Mul),
            AssignmentOp::DivAssign => Some(BinaryOp::Div),
            AssignmentOp::ModAssign => Some(BinaryOp::Mod),
            AssignmentOp::LShiftAssign => Some(BinaryOp::LShift),
            AssignmentOp::RShiftAssign => Some(BinaryOp::RShift),
            AssignmentOp::URShiftAssign => Some(BinaryOp::URShift),
            AssignmentOp::BitAndAssign => Some(BinaryOp::BitAnd),
            AssignmentOp::BitOrAssign => Some(BinaryOp::BitOr),
            AssignmentOp::BitXorAssign => Some(BinaryOp::BitXor),
        }
    }
}

#[derive(Debug)]
pub struct SequenceExpression {
    pub expressions: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug)]
pub struct MemberExpression {
    pub object: Expression,
    pub property: MemberProperty,
    pub span: Span,
}

#[derive(Debug)]
pub enum MemberProperty {
    /// `obj.name`
    Identifier(JsString),
    /// `obj[expr]`
    Expression(Expression),
}

/// Shared by calls and `new`
#[derive(Debug)]
pub struct CallExpression {
    pub callee: Expression,
    pub arguments: Vec<Expression>,
    pub span: Span,
}
