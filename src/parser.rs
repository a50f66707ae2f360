//! Parser for ES5 source code
//!
//! Recursive descent for statements, precedence climbing for binary
//! expressions. Hoisted declarations are collected while parsing so the
//! evaluator never has to walk a function body twice.

use std::mem;
use std::rc::Rc;

use crate::ast::*;
use crate::error::JsError;
use crate::lexer::{Lexer, Span, Token, TokenKind};
use crate::value::{JsString, number_to_string};

/// Parse a complete program
pub fn parse_program(source: &str) -> Result<Program, JsError> {
    Parser::new(source).parse_program()
}

/// Binary-level operator found at the current token
#[derive(Debug, Clone, Copy)]
enum InfixOp {
    Binary(BinaryOp),
    Logical(LogicalOp),
}

#[derive(Debug, Clone)]
struct Label {
    name: JsString,
    is_loop: bool,
}

/// Per-function parsing state
#[derive(Debug, Default)]
struct FunctionContext {
    in_function: bool,
    strict: bool,
    labels: Vec<Label>,
    iteration_depth: usize,
    switch_depth: usize,
    declarations: Declarations,
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    previous: Token,
    /// A line terminator separates `previous` and `current`
    newline_before: bool,
    /// Strip source positions from every node
    synthetic: bool,
    /// `in` is not a binary operator (for-statement heads)
    no_in: bool,
    context: FunctionContext,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        let newline_before = lexer.had_newline_before();
        Self {
            lexer,
            previous: Token::eof(0, 1, 1),
            current,
            newline_before,
            synthetic: false,
            no_in: false,
            context: FunctionContext::default(),
        }
    }

    /// A parser whose nodes carry no source positions. Code parsed this way
    /// is treated as interpreter-internal by the stepper.
    pub fn synthetic(source: &'a str) -> Self {
        let mut parser = Self::new(source);
        parser.synthetic = true;
        parser
    }

    pub fn parse_program(&mut self) -> Result<Program, JsError> {
        let start = self.current.span;
        let body = self.parse_body(&TokenKind::Eof)?;
        if !self.check(&TokenKind::Eof) {
            return Err(self.unexpected_token());
        }
        let context = mem::take(&mut self.context);
        Ok(Program {
            body: body.into(),
            declarations: Rc::new(context.declarations),
            strict: context.strict,
            span: self.span_from(start),
        })
    }

    /// Parse statements up to `end`, honouring a leading `"use strict"`
    fn parse_body(&mut self, end: &TokenKind) -> Result<Vec<Statement>, JsError> {
        let mut body = Vec::new();
        let mut prologue = true;

        while !self.check(end) && !self.check(&TokenKind::Eof) {
            let directive = prologue && self.is_use_strict_directive();
            let statement = self.parse_statement()?;
            if prologue {
                match &statement {
                    Statement::Expression(s) if is_string_literal(&s.expression) => {
                        if directive {
                            self.context.strict = true;
                        }
                    }
                    _ => prologue = false,
                }
            }
            body.push(statement);
        }

        Ok(body)
    }

    fn is_use_strict_directive(&self) -> bool {
        if !matches!(self.current.kind, TokenKind::String(_)) {
            return false;
        }
        let raw = self
            .lexer
            .source()
            .get(self.current.span.start..self.current.span.end);
        matches!(raw, Some("\"use strict\"" | "'use strict'"))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Statements
    // ═══════════════════════════════════════════════════════════════════════════

    fn parse_statement(&mut self) -> Result<Statement, JsError> {
        let labeled =
            matches!(self.current.kind, TokenKind::Identifier(_)) && self.peek_is(&TokenKind::Colon);
        match &self.current.kind {
            TokenKind::LBrace => Ok(Statement::Block(self.parse_block_statement()?)),
            TokenKind::Var => {
                let decl = self.parse_variable_declaration()?;
                self.expect_semicolon()?;
                Ok(Statement::VariableDeclaration(decl))
            }
            TokenKind::Semicolon => {
                let span = self.current.span;
                self.advance();
                Ok(Statement::Empty(self.node_span(span)))
            }
            TokenKind::Function => {
                let function = self.parse_function(false)?;
                self.context
                    .declarations
                    .functions
                    .push(Rc::clone(&function));
                Ok(Statement::FunctionDeclaration(function))
            }
            TokenKind::If => self.parse_if_statement(),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_while_statement(),
            TokenKind::Break => self.parse_break_statement(),
            TokenKind::Continue => self.parse_continue_statement(),
            TokenKind::Return => self.parse_return_statement(),
            TokenKind::Throw => self.parse_throw_statement(),
            TokenKind::Try => self.parse_try_statement(),
            TokenKind::Switch => self.parse_switch_statement(),
            TokenKind::With => self.parse_with_statement(),
            TokenKind::Debugger => {
                let start = self.current.span;
                self.advance();
                self.expect_semicolon()?;
                Ok(Statement::Debugger(self.span_from(start)))
            }
            TokenKind::Identifier(_) if labeled => {
                self.parse_labeled_statement()
            }
            _ => self.parse_expression_statement(),
        }
    }

    fn parse_block_statement(&mut self) -> Result<Rc<BlockStatement>, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBrace)?;
        let mut body = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.check(&TokenKind::Eof) {
            body.push(self.parse_statement()?);
        }
        self.require_token(&TokenKind::RBrace)?;
        Ok(Rc::new(BlockStatement {
            body: body.into(),
            span: self.span_from(start),
        }))
    }

    fn parse_variable_declaration(&mut self) -> Result<Rc<VariableDeclaration>, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Var)?;

        let mut declarations = Vec::new();
        loop {
            let decl_start = self.current.span;
            let id = self.parse_binding_identifier()?;
            let init = if self.match_token(&TokenKind::Eq) {
                Some(self.parse_assignment_expression()?)
            } else {
                None
            };
            self.declare_var(&id);
            declarations.push(VariableDeclarator {
                id,
                init,
                span: self.span_from(decl_start),
            });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        Ok(Rc::new(VariableDeclaration {
            declarations,
            span: self.span_from(start),
        }))
    }

    fn declare_var(&mut self, name: &JsString) {
        let vars = &mut self.context.declarations.vars;
        if !vars.contains(name) {
            vars.push(name.clone());
        }
    }

    fn parse_binding_identifier(&mut self) -> Result<JsString, JsError> {
        match &self.current.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                if self.context.strict && (name == "eval" || name == "arguments") {
                    return Err(self.error("Unexpected eval or arguments in strict mode".to_string()));
                }
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected_token()),
        }
    }

    fn parse_if_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.advance();
        self.require_token(&TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.require_token(&TokenKind::RParen)?;
        let consequent = self.parse_statement()?;
        let alternate = if self.match_token(&TokenKind::Else) {
            Some(self.parse_statement()?)
        } else {
            None
        };
        Ok(Statement::If(Rc::new(IfStatement {
            test,
            consequent,
            alternate,
            span: self.span_from(start),
        })))
    }

    fn parse_for_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.advance();
        self.require_token(&TokenKind::LParen)?;

        let mut init = None;
        if self.check(&TokenKind::Var) {
            let decl = self.without_in(|p| p.parse_variable_declaration())?;
            if self.check(&TokenKind::In) {
                let [declarator] = decl.declarations.as_slice() else {
                    return Err(self.error("Invalid left-hand side in for-in loop".to_string()));
                };
                let left = ForInTarget::Variable {
                    name: declarator.id.clone(),
                    init: declarator.init.clone(),
                };
                return self.finish_for_in(start, left);
            }
            init = Some(ForInit::Variable(decl));
        } else if !self.check(&TokenKind::Semicolon) {
            let expression = self.without_in(|p| p.parse_expression())?;
            if self.check(&TokenKind::In) {
                if !expression.is_reference() {
                    return Err(self.error("Invalid left-hand side in for-in loop".to_string()));
                }
                return self.finish_for_in(start, ForInTarget::Pattern(expression));
            }
            init = Some(ForInit::Expression(expression));
        }

        self.require_token(&TokenKind::Semicolon)?;
        let test = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.require_token(&TokenKind::Semicolon)?;
        let update = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.require_token(&TokenKind::RParen)?;
        let body = self.parse_loop_body()?;

        Ok(Statement::For(Rc::new(ForStatement {
            init,
            test,
            update,
            body,
            span: self.span_from(start),
        })))
    }

    fn finish_for_in(&mut self, start: Span, left: ForInTarget) -> Result<Statement, JsError> {
        self.require_token(&TokenKind::In)?;
        let right = self.parse_expression()?;
        self.require_token(&TokenKind::RParen)?;
        let body = self.parse_loop_body()?;
        Ok(Statement::ForIn(Rc::new(ForInStatement {
            left,
            right,
            body,
            span: self.span_from(start),
        })))
    }

    fn parse_loop_body(&mut self) -> Result<Statement, JsError> {
        self.context.iteration_depth += 1;
        let body = self.parse_statement();
        self.context.iteration_depth -= 1;
        body
    }

    fn parse_while_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.advance();
        self.require_token(&TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.require_token(&TokenKind::RParen)?;
        let body = self.parse_loop_body()?;
        Ok(Statement::While(Rc::new(WhileStatement {
            test,
            body,
            span: self.span_from(start),
        })))
    }

    fn parse_do_while_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.advance();
        let body = self.parse_loop_body()?;
        self.require_token(&TokenKind::While)?;
        self.require_token(&TokenKind::LParen)?;
        let test = self.parse_expression()?;
        self.require_token(&TokenKind::RParen)?;
        // ASI always applies after do-while
        self.match_token(&TokenKind::Semicolon);
        Ok(Statement::DoWhile(Rc::new(WhileStatement {
            test,
            body,
            span: self.span_from(start),
        })))
    }

    fn parse_jump_label(&mut self) -> Option<JsString> {
        if self.newline_before {
            return None;
        }
        match &self.current.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Some(name)
            }
            _ => None,
        }
    }

    fn parse_break_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.advance();
        let label = self.parse_jump_label();
        match &label {
            Some(name) => {
                if !self.context.labels.iter().any(|l| &l.name == name) {
                    return Err(self.error(format!("Undefined label '{}'", name)));
                }
            }
            None => {
                if self.context.iteration_depth == 0 && self.context.switch_depth == 0 {
                    return Err(self.error("Illegal break statement".to_string()));
                }
            }
        }
        self.expect_semicolon()?;
        Ok(Statement::Break(Rc::new(JumpStatement {
            label,
            span: self.span_from(start),
        })))
    }

    fn parse_continue_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.advance();
        let label = self.parse_jump_label();
        match &label {
            Some(name) => {
                if !self
                    .context
                    .labels
                    .iter()
                    .any(|l| &l.name == name && l.is_loop)
                {
                    return Err(self.error(format!("Undefined label '{}'", name)));
                }
            }
            None => {
                if self.context.iteration_depth == 0 {
                    return Err(self.error("Illegal continue statement".to_string()));
                }
            }
        }
        self.expect_semicolon()?;
        Ok(Statement::Continue(Rc::new(JumpStatement {
            label,
            span: self.span_from(start),
        })))
    }

    fn parse_return_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        if !self.context.in_function {
            return Err(self.error("Illegal return statement".to_string()));
        }
        self.advance();
        let argument = if self.check(&TokenKind::Semicolon)
            || self.check(&TokenKind::RBrace)
            || self.check(&TokenKind::Eof)
            || self.newline_before
        {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect_semicolon()?;
        Ok(Statement::Return(Rc::new(ReturnStatement {
            argument,
            span: self.span_from(start),
        })))
    }

    fn parse_throw_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.advance();
        if self.newline_before {
            return Err(self.error("Illegal newline after throw".to_string()));
        }
        let argument = self.parse_expression()?;
        self.expect_semicolon()?;
        Ok(Statement::Throw(Rc::new(ThrowStatement {
            argument,
            span: self.span_from(start),
        })))
    }

    fn parse_try_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.advance();
        let block = self.parse_block_statement()?;

        let handler = if self.check(&TokenKind::Catch) {
            let catch_start = self.current.span;
            self.advance();
            self.require_token(&TokenKind::LParen)?;
            let param = self.parse_binding_identifier()?;
            self.require_token(&TokenKind::RParen)?;
            let body = self.parse_block_statement()?;
            Some(CatchClause {
                param,
                body,
                span: self.span_from(catch_start),
            })
        } else {
            None
        };

        let finalizer = if self.match_token(&TokenKind::Finally) {
            Some(self.parse_block_statement()?)
        } else {
            None
        };

        if handler.is_none() && finalizer.is_none() {
            return Err(self.error("Missing catch or finally after try".to_string()));
        }

        Ok(Statement::Try(Rc::new(TryStatement {
            block,
            handler,
            finalizer,
            span: self.span_from(start),
        })))
    }

    fn parse_switch_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        self.advance();
        self.require_token(&TokenKind::LParen)?;
        let discriminant = self.parse_expression()?;
        self.require_token(&TokenKind::RParen)?;
        self.require_token(&TokenKind::LBrace)?;

        self.context.switch_depth += 1;
        let mut cases = Vec::new();
        let mut seen_default = false;
        while !self.check(&TokenKind::RBrace) {
            let case_start = self.current.span;
            let test = if self.match_token(&TokenKind::Case) {
                Some(self.parse_expression()?)
            } else if self.match_token(&TokenKind::Default) {
                if seen_default {
                    return Err(self.error("More than one default clause in switch statement".to_string()));
                }
                seen_default = true;
                None
            } else {
                return Err(self.unexpected_token());
            };
            self.require_token(&TokenKind::Colon)?;

            let mut consequent = Vec::new();
            while !matches!(
                self.current.kind,
                TokenKind::Case | TokenKind::Default | TokenKind::RBrace | TokenKind::Eof
            ) {
                consequent.push(self.parse_statement()?);
            }
            cases.push(SwitchCase {
                test,
                consequent,
                span: self.span_from(case_start),
            });
        }
        self.context.switch_depth -= 1;
        self.require_token(&TokenKind::RBrace)?;

        Ok(Statement::Switch(Rc::new(SwitchStatement {
            discriminant,
            cases,
            span: self.span_from(start),
        })))
    }

    fn parse_with_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        if self.context.strict {
            return Err(self.error("Strict mode code may not include a with statement".to_string()));
        }
        self.advance();
        self.require_token(&TokenKind::LParen)?;
        let object = self.parse_expression()?;
        self.require_token(&TokenKind::RParen)?;
        let body = self.parse_statement()?;
        Ok(Statement::With(Rc::new(WithStatement {
            object,
            body,
            span: self.span_from(start),
        })))
    }

    fn parse_labeled_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        let TokenKind::Identifier(label) = self.current.kind.clone() else {
            return Err(self.unexpected_token());
        };
        self.advance();
        self.require_token(&TokenKind::Colon)?;

        if self.context.labels.iter().any(|l| l.name == label) {
            return Err(self.error(format!("Label '{}' has already been declared", label)));
        }
        let is_loop = matches!(
            self.current.kind,
            TokenKind::For | TokenKind::While | TokenKind::Do
        );
        self.context.labels.push(Label {
            name: label.clone(),
            is_loop,
        });
        let body = self.parse_statement();
        self.context.labels.pop();

        Ok(Statement::Labeled(Rc::new(LabeledStatement {
            label,
            body: body?,
            span: self.span_from(start),
        })))
    }

    fn parse_expression_statement(&mut self) -> Result<Statement, JsError> {
        let start = self.current.span;
        let expression = self.parse_expression()?;
        self.expect_semicolon()?;
        Ok(Statement::Expression(Rc::new(ExpressionStatement {
            expression,
            span: self.span_from(start),
        })))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Functions
    // ═══════════════════════════════════════════════════════════════════════════

    fn parse_function(&mut self, is_expression: bool) -> Result<Rc<FunctionNode>, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::Function)?;

        let id = if let TokenKind::Identifier(name) = &self.current.kind {
            let name = name.clone();
            self.advance();
            Some(name)
        } else if is_expression {
            None
        } else {
            return Err(self.unexpected_token());
        };

        self.require_token(&TokenKind::LParen)?;
        let mut params: Vec<JsString> = Vec::new();
        while !self.check(&TokenKind::RParen) {
            params.push(self.parse_binding_identifier()?);
            if !self.check(&TokenKind::RParen) {
                self.require_token(&TokenKind::Comma)?;
            }
        }
        self.require_token(&TokenKind::RParen)?;
        self.require_token(&TokenKind::LBrace)?;

        let strict = self.context.strict;
        let outer = mem::replace(
            &mut self.context,
            FunctionContext {
                in_function: true,
                strict,
                ..FunctionContext::default()
            },
        );
        let saved_no_in = mem::replace(&mut self.no_in, false);
        let body = self.parse_body(&TokenKind::RBrace);
        self.no_in = saved_no_in;
        let context = mem::replace(&mut self.context, outer);
        let body = body?;
        self.require_token(&TokenKind::RBrace)?;

        if context.strict {
            for (i, param) in params.iter().enumerate() {
                if param == "eval" || param == "arguments" || params.iter().skip(i + 1).any(|p| p == param) {
                    return Err(self.error(format!("Invalid parameter name '{}' in strict mode", param)));
                }
            }
        }

        let source = self
            .lexer
            .source()
            .get(start.start..self.previous.span.end)
            .unwrap_or("function () { [native code] }");

        Ok(Rc::new(FunctionNode {
            id,
            params,
            body: body.into(),
            declarations: context.declarations,
            strict: context.strict,
            is_expression,
            source: JsString::from(source),
            span: self.span_from(start),
        }))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Expressions
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn parse_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        let first = self.parse_assignment_expression()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }

        let mut expressions = vec![first];
        while self.match_token(&TokenKind::Comma) {
            expressions.push(self.parse_assignment_expression()?);
        }
        Ok(Expression::Sequence(Rc::new(SequenceExpression {
            expressions,
            span: self.span_from(start),
        })))
    }

    fn parse_assignment_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        let target = self.parse_conditional_expression()?;

        let Some(operator) = self.current_assignment_op() else {
            return Ok(target);
        };
        if !target.is_reference() {
            return Err(self.error("Invalid left-hand side in assignment".to_string()));
        }
        self.check_strict_target(&target)?;
        self.advance();
        let value = self.parse_assignment_expression()?;

        Ok(Expression::Assignment(Rc::new(AssignmentExpression {
            operator,
            target,
            value,
            span: self.span_from(start),
        })))
    }

    fn current_assignment_op(&self) -> Option<AssignmentOp> {
        let op = match self.current.kind {
            TokenKind::Eq => AssignmentOp::Assign,
            TokenKind::PlusEq => AssignmentOp::AddAssign,
            TokenKind::MinusEq => AssignmentOp::SubAssign,
            TokenKind::StarEq => AssignmentOp::MulAssign,
            TokenKind::SlashEq => AssignmentOp::DivAssign,
            TokenKind::PercentEq => AssignmentOp::ModAssign,
            TokenKind::LtLtEq => AssignmentOp::LShiftAssign,
            TokenKind::GtGtEq => AssignmentOp::RShiftAssign,
            TokenKind::GtGtGtEq => AssignmentOp::URShiftAssign,
            TokenKind::AmpEq => AssignmentOp::BitAndAssign,
            TokenKind::PipeEq => AssignmentOp::BitOrAssign,
            TokenKind::CaretEq => AssignmentOp::BitXorAssign,
            _ => return None,
        };
        Some(op)
    }

    /// `eval = 1` and `arguments++` are early errors in strict code
    fn check_strict_target(&self, target: &Expression) -> Result<(), JsError> {
        if let Expression::Identifier(id) = target {
            if self.context.strict && (id.name == "eval" || id.name == "arguments") {
                return Err(self.error("Unexpected eval or arguments in strict mode".to_string()));
            }
        }
        Ok(())
    }

    fn parse_conditional_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        let test = self.parse_binary_expression(0)?;

        if !self.match_token(&TokenKind::Question) {
            return Ok(test);
        }
        let consequent = self.with_in(|p| p.parse_assignment_expression())?;
        self.require_token(&TokenKind::Colon)?;
        let alternate = self.parse_assignment_expression()?;

        Ok(Expression::Conditional(Rc::new(ConditionalExpression {
            test,
            consequent,
            alternate,
            span: self.span_from(start),
        })))
    }

    fn parse_binary_expression(&mut self, min_prec: u8) -> Result<Expression, JsError> {
        let start = self.current.span;
        let mut left = self.parse_unary_expression()?;

        while let Some((op, prec)) = self.current_binary_op() {
            if prec < min_prec {
                break;
            }
            self.advance();
            let right = self.parse_binary_expression(prec + 1)?;
            let span = self.span_from(start);
            left = match op {
                InfixOp::Binary(operator) => Expression::Binary(Rc::new(BinaryExpression {
                    operator,
                    left,
                    right,
                    span,
                })),
                InfixOp::Logical(operator) => Expression::Logical(Rc::new(LogicalExpression {
                    operator,
                    left,
                    right,
                    span,
                })),
            };
        }

        Ok(left)
    }

    fn current_binary_op(&self) -> Option<(InfixOp, u8)> {
        use InfixOp::{Binary, Logical};
        let op = match self.current.kind {
            TokenKind::PipePipe => (Logical(LogicalOp::Or), 1),
            TokenKind::AmpAmp => (Logical(LogicalOp::And), 2),
            TokenKind::Pipe => (Binary(BinaryOp::BitOr), 3),
            TokenKind::Caret => (Binary(BinaryOp::BitXor), 4),
            TokenKind::Amp => (Binary(BinaryOp::BitAnd), 5),
            TokenKind::EqEq => (Binary(BinaryOp::Eq), 6),
            TokenKind::BangEq => (Binary(BinaryOp::NotEq), 6),
            TokenKind::EqEqEq => (Binary(BinaryOp::StrictEq), 6),
            TokenKind::BangEqEq => (Binary(BinaryOp::StrictNotEq), 6),
            TokenKind::Lt => (Binary(BinaryOp::Lt), 7),
            TokenKind::LtEq => (Binary(BinaryOp::LtEq), 7),
            TokenKind::Gt => (Binary(BinaryOp::Gt), 7),
            TokenKind::GtEq => (Binary(BinaryOp::GtEq), 7),
            TokenKind::Instanceof => (Binary(BinaryOp::Instanceof), 7),
            TokenKind::In if !self.no_in => (Binary(BinaryOp::In), 7),
            TokenKind::LtLt => (Binary(BinaryOp::LShift), 8),
            TokenKind::GtGt => (Binary(BinaryOp::RShift), 8),
            TokenKind::GtGtGt => (Binary(BinaryOp::URShift), 8),
            TokenKind::Plus => (Binary(BinaryOp::Add), 9),
            TokenKind::Minus => (Binary(BinaryOp::Sub), 9),
            TokenKind::Star => (Binary(BinaryOp::Mul), 10),
            TokenKind::Slash => (Binary(BinaryOp::Div), 10),
            TokenKind::Percent => (Binary(BinaryOp::Mod), 10),
            _ => return None,
        };
        Some(op)
    }

    fn parse_unary_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;

        let operator = match self.current.kind {
            TokenKind::Minus => Some(UnaryOp::Minus),
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitNot),
            TokenKind::Typeof => Some(UnaryOp::Typeof),
            TokenKind::Void => Some(UnaryOp::Void),
            TokenKind::Delete => Some(UnaryOp::Delete),
            _ => None,
        };
        if let Some(operator) = operator {
            self.advance();
            let argument = self.parse_unary_expression()?;
            if operator == UnaryOp::Delete
                && self.context.strict
                && matches!(argument, Expression::Identifier(_))
            {
                return Err(self.error("Delete of an unqualified identifier in strict mode.".to_string()));
            }
            return Ok(Expression::Unary(Rc::new(UnaryExpression {
                operator,
                argument,
                span: self.span_from(start),
            })));
        }

        let update = match self.current.kind {
            TokenKind::PlusPlus => Some(UpdateOp::Increment),
            TokenKind::MinusMinus => Some(UpdateOp::Decrement),
            _ => None,
        };
        if let Some(operator) = update {
            self.advance();
            let argument = self.parse_unary_expression()?;
            return self.finish_update(start, operator, true, argument);
        }

        self.parse_postfix_expression()
    }

    fn parse_postfix_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        let expr = self.parse_left_hand_side_expression()?;

        if self.newline_before {
            return Ok(expr);
        }
        let operator = match self.current.kind {
            TokenKind::PlusPlus => UpdateOp::Increment,
            TokenKind::MinusMinus => UpdateOp::Decrement,
            _ => return Ok(expr),
        };
        self.advance();
        self.finish_update(start, operator, false, expr)
    }

    fn finish_update(
        &mut self,
        start: Span,
        operator: UpdateOp,
        prefix: bool,
        argument: Expression,
    ) -> Result<Expression, JsError> {
        if !argument.is_reference() {
            return Err(self.error(format!(
                "Invalid left-hand side expression in {} operation",
                if prefix { "prefix" } else { "postfix" }
            )));
        }
        self.check_strict_target(&argument)?;
        Ok(Expression::Update(Rc::new(UpdateExpression {
            operator,
            prefix,
            argument,
            span: self.span_from(start),
        })))
    }

    fn parse_left_hand_side_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        let mut expr = if self.check(&TokenKind::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };

        loop {
            if self.check(&TokenKind::LParen) {
                let arguments = self.parse_arguments()?;
                expr = Expression::Call(Rc::new(CallExpression {
                    callee: expr,
                    arguments,
                    span: self.span_from(start),
                }));
            } else if let Some(member) = self.parse_member_suffix(start, &expr)? {
                expr = member;
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// `new Foo.bar(args)`: member accesses bind tighter than the `new`
    fn parse_new_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::New)?;

        let mut callee = if self.check(&TokenKind::New) {
            self.parse_new_expression()?
        } else {
            self.parse_primary_expression()?
        };
        while let Some(member) = self.parse_member_suffix(start, &callee)? {
            callee = member;
        }

        let arguments = if self.check(&TokenKind::LParen) {
            self.parse_arguments()?
        } else {
            Vec::new()
        };

        Ok(Expression::New(Rc::new(CallExpression {
            callee,
            arguments,
            span: self.span_from(start),
        })))
    }

    fn parse_member_suffix(
        &mut self,
        start: Span,
        object: &Expression,
    ) -> Result<Option<Expression>, JsError> {
        let property = if self.match_token(&TokenKind::Dot) {
            let Some(name) = token_name(&self.current.kind) else {
                return Err(self.unexpected_token());
            };
            self.advance();
            MemberProperty::Identifier(name)
        } else if self.match_token(&TokenKind::LBracket) {
            let property = self.with_in(|p| p.parse_expression())?;
            self.require_token(&TokenKind::RBracket)?;
            MemberProperty::Expression(property)
        } else {
            return Ok(None);
        };

        Ok(Some(Expression::Member(Rc::new(MemberExpression {
            object: object.clone(),
            property,
            span: self.span_from(start),
        }))))
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expression>, JsError> {
        self.require_token(&TokenKind::LParen)?;
        let mut arguments = Vec::new();
        while !self.check(&TokenKind::RParen) {
            arguments.push(self.with_in(|p| p.parse_assignment_expression())?);
            if !self.check(&TokenKind::RParen) {
                self.require_token(&TokenKind::Comma)?;
            }
        }
        self.require_token(&TokenKind::RParen)?;
        Ok(arguments)
    }

    fn parse_primary_expression(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;

        let literal = match &self.current.kind {
            TokenKind::Number(n) => Some(LiteralValue::Number(*n)),
            TokenKind::String(s) => Some(LiteralValue::String(s.clone())),
            TokenKind::True => Some(LiteralValue::Boolean(true)),
            TokenKind::False => Some(LiteralValue::Boolean(false)),
            TokenKind::Null => Some(LiteralValue::Null),
            _ => None,
        };
        if let Some(value) = literal {
            self.advance();
            return Ok(self.literal(value, start));
        }

        match self.current.kind.clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Ok(Expression::Identifier(Rc::new(Identifier {
                    name,
                    span: self.span_from(start),
                })))
            }
            TokenKind::This => {
                self.advance();
                Ok(Expression::This(self.span_from(start)))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.with_in(|p| p.parse_expression())?;
                self.require_token(&TokenKind::RParen)?;
                Ok(expr)
            }
            TokenKind::LBracket => self.with_in(|p| p.parse_array_literal()),
            TokenKind::LBrace => self.with_in(|p| p.parse_object_literal()),
            TokenKind::Function => Ok(Expression::Function(self.parse_function(true)?)),
            TokenKind::Slash | TokenKind::SlashEq => {
                let token = self.lexer.rescan_as_regexp(self.current.span);
                let TokenKind::RegExp(pattern, flags) = token.kind.clone() else {
                    return Err(self.error("Invalid regular expression: missing /".to_string()));
                };
                self.current = token;
                self.advance();
                Ok(self.literal(
                    LiteralValue::RegExp {
                        pattern: JsString::from(pattern),
                        flags: JsString::from(flags),
                    },
                    start,
                ))
            }
            _ => Err(self.unexpected_token()),
        }
    }

    fn literal(&self, value: LiteralValue, start: Span) -> Expression {
        Expression::Literal(Rc::new(Literal {
            value,
            span: self.span_from(start),
        }))
    }

    fn parse_array_literal(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBracket)?;

        let mut elements = Vec::new();
        while !self.check(&TokenKind::RBracket) {
            if self.match_token(&TokenKind::Comma) {
                elements.push(None);
                continue;
            }
            elements.push(Some(self.parse_assignment_expression()?));
            if !self.check(&TokenKind::RBracket) {
                self.require_token(&TokenKind::Comma)?;
            }
        }
        self.require_token(&TokenKind::RBracket)?;

        Ok(Expression::Array(Rc::new(ArrayExpression {
            elements,
            span: self.span_from(start),
        })))
    }

    fn parse_object_literal(&mut self) -> Result<Expression, JsError> {
        let start = self.current.span;
        self.require_token(&TokenKind::LBrace)?;

        let mut properties = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            properties.push(self.parse_object_property()?);
            if !self.check(&TokenKind::RBrace) {
                self.require_token(&TokenKind::Comma)?;
            }
        }
        self.require_token(&TokenKind::RBrace)?;

        Ok(Expression::Object(Rc::new(ObjectExpression {
            properties,
            span: self.span_from(start),
        })))
    }

    fn parse_object_property(&mut self) -> Result<ObjectProperty, JsError> {
        let start = self.current.span;

        // `get name() {}` / `set name(v) {}`
        if let TokenKind::Identifier(word) = &self.current.kind {
            let kind = match word.as_str() {
                "get" => Some(PropertyKind::Get),
                "set" => Some(PropertyKind::Set),
                _ => None,
            };
            if let Some(kind) = kind {
                if !self.peek_is(&TokenKind::Colon) && !self.peek_is(&TokenKind::Comma) && !self.peek_is(&TokenKind::RBrace) {
                    self.advance();
                    let key = self.parse_property_key()?;
                    let function = self.parse_accessor_function(kind)?;
                    return Ok(ObjectProperty {
                        key,
                        value: Expression::Function(function),
                        kind,
                        span: self.span_from(start),
                    });
                }
            }
        }

        let key = self.parse_property_key()?;
        self.require_token(&TokenKind::Colon)?;
        let value = self.parse_assignment_expression()?;
        Ok(ObjectProperty {
            key,
            value,
            kind: PropertyKind::Init,
            span: self.span_from(start),
        })
    }

    fn parse_property_key(&mut self) -> Result<JsString, JsError> {
        let key = match &self.current.kind {
            TokenKind::String(s) => s.clone(),
            TokenKind::Number(n) => JsString::from(number_to_string(*n)),
            kind => match token_name(kind) {
                Some(name) => name,
                None => return Err(self.unexpected_token()),
            },
        };
        self.advance();
        Ok(key)
    }

    /// The parameter list and body of an accessor, shaped as a function expression
    fn parse_accessor_function(&mut self, kind: PropertyKind) -> Result<Rc<FunctionNode>, JsError> {
        let start = self.current.span;
        let expected_params = if kind == PropertyKind::Get { 0 } else { 1 };

        self.require_token(&TokenKind::LParen)?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) {
            params.push(self.parse_binding_identifier()?);
            if !self.check(&TokenKind::RParen) {
                self.require_token(&TokenKind::Comma)?;
            }
        }
        self.require_token(&TokenKind::RParen)?;
        if params.len() != expected_params {
            return Err(self.error(if kind == PropertyKind::Get {
                "Getter must not have any formal parameters.".to_string()
            } else {
                "Setter must have exactly one formal parameter.".to_string()
            }));
        }
        self.require_token(&TokenKind::LBrace)?;

        let strict = self.context.strict;
        let outer = mem::replace(
            &mut self.context,
            FunctionContext {
                in_function: true,
                strict,
                ..FunctionContext::default()
            },
        );
        let body = self.parse_body(&TokenKind::RBrace);
        let context = mem::replace(&mut self.context, outer);
        let body = body?;
        self.require_token(&TokenKind::RBrace)?;

        let source = self
            .lexer
            .source()
            .get(start.start..self.previous.span.end)
            .unwrap_or("");

        Ok(Rc::new(FunctionNode {
            id: None,
            params,
            body: body.into(),
            declarations: context.declarations,
            strict: context.strict,
            is_expression: true,
            source: JsString::from(format!("function {}", source)),
            span: self.span_from(start),
        }))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // Helpers
    // ═══════════════════════════════════════════════════════════════════════════

    fn advance(&mut self) {
        let next = self.lexer.next_token();
        self.newline_before = self.lexer.had_newline_before();
        self.previous = mem::replace(&mut self.current, next);
    }

    fn check(&self, kind: &TokenKind) -> bool {
        mem::discriminant(&self.current.kind) == mem::discriminant(kind)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn require_token(&mut self, kind: &TokenKind) -> Result<(), JsError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected_token())
        }
    }

    /// Check whether the token after the current one has the given kind
    fn peek_is(&mut self, kind: &TokenKind) -> bool {
        let checkpoint = self.lexer.checkpoint();
        let next = self.lexer.next_token();
        self.lexer.restore(checkpoint);
        mem::discriminant(&next.kind) == mem::discriminant(kind)
    }

    fn expect_semicolon(&mut self) -> Result<(), JsError> {
        if self.match_token(&TokenKind::Semicolon) {
            return Ok(());
        }
        if self.check(&TokenKind::RBrace) || self.check(&TokenKind::Eof) || self.newline_before {
            return Ok(());
        }
        Err(self.unexpected_token())
    }

    fn with_in<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, JsError>) -> Result<T, JsError> {
        let saved = mem::replace(&mut self.no_in, false);
        let result = f(self);
        self.no_in = saved;
        result
    }

    fn without_in<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T, JsError>) -> Result<T, JsError> {
        let saved = mem::replace(&mut self.no_in, true);
        let result = f(self);
        self.no_in = saved;
        result
    }

    fn node_span(&self, span: Span) -> Span {
        if self.synthetic { Span::default() } else { span }
    }

    fn span_from(&self, start: Span) -> Span {
        self.node_span(Span::new(
            start.start,
            self.previous.span.end.max(start.end),
            start.line,
            start.column,
        ))
    }

    fn error(&self, message: String) -> JsError {
        JsError::syntax_error(message, self.current.span.line, self.current.span.column)
    }

    fn unexpected_token(&self) -> JsError {
        let message = match &self.current.kind {
            TokenKind::Eof => "Unexpected end of input".to_string(),
            TokenKind::Invalid(c) => format!("Invalid or unexpected token '{}'", c),
            TokenKind::Number(_) => "Unexpected number".to_string(),
            TokenKind::String(_) => "Unexpected string".to_string(),
            TokenKind::Identifier(name) => format!("Unexpected identifier '{}'", name),
            kind => match token_name(kind) {
                Some(word) => format!("Unexpected token '{}'", word),
                None => {
                    let raw = self
                        .lexer
                        .source()
                        .get(self.current.span.start..self.current.span.end)
                        .unwrap_or("?");
                    format!("Unexpected token '{}'", raw)
                }
            },
        };
        self.error(message)
    }
}

fn is_string_literal(expr: &Expression) -> bool {
    matches!(expr, Expression::Literal(lit) if matches!(lit.value, LiteralValue::String(_)))
}

/// Identifier-like tokens usable as property names (`a.default`, `{ new: 1 }`)
fn token_name(kind: &TokenKind) -> Option<JsString> {
    let word = match kind {
        TokenKind::Identifier(name) => return Some(name.clone()),
        TokenKind::True => "true",
        TokenKind::False => "false",
        TokenKind::Null => "null",
        TokenKind::Var => "var",
        TokenKind::Function => "function",
        TokenKind::Return => "return",
        TokenKind::If => "if",
        TokenKind::Else => "else",
        TokenKind::For => "for",
        TokenKind::While => "while",
        TokenKind::Do => "do",
        TokenKind::Break => "break",
        TokenKind::Continue => "continue",
        TokenKind::Switch => "switch",
        TokenKind::Case => "case",
        TokenKind::Default => "default",
        TokenKind::Try => "try",
        TokenKind::Catch => "catch",
        TokenKind::Finally => "finally",
        TokenKind::Throw => "throw",
        TokenKind::New => "new",
        TokenKind::This => "this",
        TokenKind::Typeof => "typeof",
        TokenKind::Instanceof => "instanceof",
        TokenKind::In => "in",
        TokenKind::Void => "void",
        TokenKind::Delete => "delete",
        TokenKind::With => "with",
        TokenKind::Debugger => "debugger",
        _ => return None,
    };
    Some(JsString::from(word))
}
