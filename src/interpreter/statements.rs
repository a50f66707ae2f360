//! Statement handlers

use std::rc::Rc;

use crate::ast::{
    ExpressionStatement, ForInTarget, ForInit, ForStatement, IfStatement, LabeledStatement,
    ReturnStatement, Statement, ThrowStatement, TryStatement, VariableDeclaration, WhileStatement,
    WithStatement,
};
use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::interpreter::property::SetResult;
use crate::interpreter::stack::{
    BranchPhase, CallFrame, Completion, CompletionKind, ForInFrame, ForInPhase, Frame, LoopPhase,
    Reference, State, SwitchFrame, SwitchPhase, TryPhase, VariablePhase, WithPhase,
};
use crate::value::{CheapClone, JsObject, JsString, ObjectKind, Scope, Value};

impl Interpreter {
    pub(super) fn step_program(
        &mut self,
        mut state: State,
        body: Rc<[Statement]>,
        index: usize,
    ) -> Result<(), JsError> {
        let scope = state.scope;
        let next = body.get(index).cloned();
        state.frame = Frame::Program {
            body,
            index: index + usize::from(next.is_some()),
            done: next.is_none(),
        };
        self.stack.push(state);
        if let Some(statement) = next {
            self.push_statement(&statement, scope, Vec::new());
        }
        Ok(())
    }

    pub(super) fn step_eval_program(
        &mut self,
        mut state: State,
        body: Rc<[Statement]>,
        index: usize,
    ) -> Result<(), JsError> {
        let Some(statement) = body.get(index).cloned() else {
            let value = self.value();
            self.ascend(value);
            return Ok(());
        };
        let scope = state.scope;
        state.frame = Frame::EvalProgram {
            body,
            index: index + 1,
        };
        self.stack.push(state);
        self.push_statement(&statement, scope, Vec::new());
        Ok(())
    }

    pub(super) fn step_block(
        &mut self,
        mut state: State,
        body: Rc<[Statement]>,
        index: usize,
    ) -> Result<(), JsError> {
        let Some(statement) = body.get(index).cloned() else {
            return Ok(());
        };
        let scope = state.scope;
        state.frame = Frame::Block {
            body,
            index: index + 1,
        };
        self.stack.push(state);
        self.push_statement(&statement, scope, Vec::new());
        Ok(())
    }

    pub(super) fn step_expression_statement(
        &mut self,
        mut state: State,
        node: Rc<ExpressionStatement>,
        done: bool,
    ) -> Result<(), JsError> {
        if done {
            self.set_completion_value(state.value);
            return Ok(());
        }
        let scope = state.scope;
        state.frame = Frame::Expression {
            node: node.cheap_clone(),
            done: true,
        };
        self.stack.push(state);
        self.push_expression(&node.expression, scope);
        Ok(())
    }

    pub(super) fn step_variable_declaration(
        &mut self,
        mut state: State,
        node: Rc<VariableDeclaration>,
        mut index: usize,
        phase: VariablePhase,
    ) -> Result<(), JsError> {
        let scope = state.scope;
        if phase == VariablePhase::Assign {
            let Some(declarator) = node.declarations.get(index) else {
                return Err(JsError::internal("variable declarator out of range"));
            };
            let value = std::mem::take(&mut state.value);
            let result = self.set_value_to_scope(scope, declarator.id.as_str(), value.clone())?;
            index += 1;
            if let SetResult::Setter { func, this } = result {
                let span = state.span;
                state.frame = Frame::VariableDeclaration {
                    node,
                    index,
                    phase: VariablePhase::Next,
                };
                self.stack.push(state);
                self.push_call(CallFrame::synthetic(func, this, vec![value]), scope, span);
                return Ok(());
            }
        }

        while let Some(declarator) = node.declarations.get(index) {
            if let Some(init) = declarator.init.clone() {
                state.frame = Frame::VariableDeclaration {
                    node: node.cheap_clone(),
                    index,
                    phase: VariablePhase::Assign,
                };
                self.stack.push(state);
                self.push_expression(&init, scope);
                return Ok(());
            }
            index += 1;
        }
        Ok(())
    }

    pub(super) fn step_if(
        &mut self,
        mut state: State,
        node: Rc<IfStatement>,
        phase: BranchPhase,
    ) -> Result<(), JsError> {
        let scope = state.scope;
        match phase {
            BranchPhase::Start => {
                state.frame = Frame::If {
                    node: node.cheap_clone(),
                    phase: BranchPhase::Test,
                };
                self.stack.push(state);
                self.push_expression(&node.test, scope);
            }
            BranchPhase::Test => {
                let branch = if state.value.to_boolean() {
                    Some(&node.consequent)
                } else {
                    node.alternate.as_ref()
                };
                if let Some(branch) = branch.cloned() {
                    state.frame = Frame::If {
                        node: node.cheap_clone(),
                        phase: BranchPhase::Done,
                    };
                    self.stack.push(state);
                    self.push_statement(&branch, scope, Vec::new());
                }
            }
            BranchPhase::Done => {}
        }
        Ok(())
    }

    pub(super) fn step_labeled(&mut self, state: State, node: Rc<LabeledStatement>) -> Result<(), JsError> {
        let mut labels = state.labels;
        labels.push(node.label.cheap_clone());
        self.push_statement(&node.body, state.scope, labels);
        Ok(())
    }

    pub(super) fn step_return(
        &mut self,
        mut state: State,
        node: Rc<ReturnStatement>,
        done: bool,
    ) -> Result<(), JsError> {
        match (&node.argument, done) {
            (Some(argument), false) => {
                let scope = state.scope;
                let argument = argument.clone();
                state.frame = Frame::Return { node, done: true };
                self.stack.push(state);
                self.push_expression(&argument, scope);
                Ok(())
            }
            _ => self.unwind(CompletionKind::Return, state.value, None),
        }
    }

    pub(super) fn step_throw(
        &mut self,
        mut state: State,
        node: Rc<ThrowStatement>,
        done: bool,
    ) -> Result<(), JsError> {
        if done {
            return self.unwind(CompletionKind::Throw, state.value, None);
        }
        let scope = state.scope;
        state.frame = Frame::Throw {
            node: node.cheap_clone(),
            done: true,
        };
        self.stack.push(state);
        self.push_expression(&node.argument, scope);
        Ok(())
    }

    pub(super) fn step_with(
        &mut self,
        mut state: State,
        node: Rc<WithStatement>,
        phase: WithPhase,
    ) -> Result<(), JsError> {
        match phase {
            WithPhase::Start => {
                let scope = state.scope;
                state.frame = Frame::With {
                    node: node.cheap_clone(),
                    phase: WithPhase::Object,
                };
                self.stack.push(state);
                self.push_expression(&node.object, scope);
            }
            WithPhase::Object => {
                let object = self.to_object(&state.value)?;
                let strict = self.heap.scope(state.scope)?.strict;
                let scope = self.heap.alloc_scope(Scope {
                    parent: Some(state.scope),
                    strict,
                    object,
                    this_value: None,
                });
                state.frame = Frame::With {
                    node: node.cheap_clone(),
                    phase: WithPhase::Body,
                };
                self.stack.push(state);
                self.push_statement(&node.body, scope, Vec::new());
            }
            WithPhase::Body => {}
        }
        Ok(())
    }

    pub(super) fn step_switch(&mut self, mut state: State, mut frame: Box<SwitchFrame>) -> Result<(), JsError> {
        let scope = state.scope;
        match frame.phase {
            SwitchPhase::Start => {
                frame.phase = SwitchPhase::Discriminant;
                let node = frame.node.cheap_clone();
                state.frame = Frame::Switch(frame);
                self.stack.push(state);
                self.push_expression(&node.discriminant, scope);
                return Ok(());
            }
            SwitchPhase::Discriminant => {
                frame.discriminant = std::mem::take(&mut state.value);
                frame.phase = SwitchPhase::Cases;
            }
            SwitchPhase::Cases => {}
        }

        let node = frame.node.cheap_clone();
        loop {
            let index = frame.case_index;
            let case = node.cases.get(index);

            if let Some(case) = case {
                if !frame.matched && case.test.is_none() {
                    // Remember the default case and come back to it
                    frame.default_case = Some(index);
                    frame.case_index = index + 1;
                    continue;
                }
            } else if !frame.matched {
                if let Some(default) = frame.default_case {
                    frame.matched = true;
                    frame.case_index = default;
                    continue;
                }
            }

            let Some(case) = case else {
                return Ok(());
            };

            if !frame.matched && !frame.tested {
                if let Some(test) = &case.test {
                    frame.tested = true;
                    state.frame = Frame::Switch(frame);
                    self.stack.push(state);
                    self.push_expression(test, scope);
                    return Ok(());
                }
            }

            if frame.matched || state.value.strict_equals(&frame.discriminant) {
                frame.matched = true;
                if let Some(statement) = case.consequent.get(frame.statement_index) {
                    frame.statement_index += 1;
                    state.frame = Frame::Switch(frame);
                    self.stack.push(state);
                    self.push_statement(statement, scope, Vec::new());
                    return Ok(());
                }
            }

            frame.tested = false;
            frame.statement_index = 0;
            frame.case_index = index + 1;
        }
    }

    pub(super) fn step_try(
        &mut self,
        mut state: State,
        node: Rc<TryStatement>,
        phase: TryPhase,
        completion: Option<Completion>,
    ) -> Result<(), JsError> {
        let scope = state.scope;
        match phase {
            TryPhase::Start => {
                state.frame = Frame::Try {
                    node: node.cheap_clone(),
                    phase: TryPhase::Block,
                    completion: None,
                };
                self.stack.push(state);
                self.push_statement(&Statement::Block(node.block.cheap_clone()), scope, Vec::new());
                return Ok(());
            }
            TryPhase::Block => {
                if let (Some(handler), Some(thrown)) = (&node.handler, &completion) {
                    if thrown.kind == CompletionKind::Throw {
                        let strict = self.heap.scope(scope)?.strict;
                        let object = self.heap.alloc(JsObject::new(ObjectKind::Plain, None));
                        self.define_binding(object, &handler.param, thrown.value.clone())?;
                        let catch_scope = self.heap.alloc_scope(Scope {
                            parent: Some(scope),
                            strict,
                            object,
                            this_value: None,
                        });
                        let body = handler.body.cheap_clone();
                        state.frame = Frame::Try {
                            node,
                            phase: TryPhase::Handler,
                            completion: None,
                        };
                        self.stack.push(state);
                        self.push_statement(&Statement::Block(body), catch_scope, Vec::new());
                        return Ok(());
                    }
                }
            }
            TryPhase::Handler | TryPhase::Finalizer => {}
        }

        if phase != TryPhase::Finalizer {
            if let Some(finalizer) = node.finalizer.clone() {
                state.frame = Frame::Try {
                    node,
                    phase: TryPhase::Finalizer,
                    completion,
                };
                self.stack.push(state);
                self.push_statement(&Statement::Block(finalizer), scope, Vec::new());
                return Ok(());
            }
        }

        match completion {
            Some(Completion { kind, value, label }) => self.unwind(kind, value, label),
            None => Ok(()),
        }
    }

    pub(super) fn step_while(
        &mut self,
        mut state: State,
        node: Rc<WhileStatement>,
        phase: LoopPhase,
    ) -> Result<(), JsError> {
        let scope = state.scope;
        match phase {
            LoopPhase::CheckTest => {
                if state.value.to_boolean() {
                    state.frame = Frame::While {
                        node: node.cheap_clone(),
                        phase: LoopPhase::Start,
                    };
                    self.stack.push(state);
                    self.push_statement(&node.body, scope, Vec::new());
                }
            }
            _ => {
                state.frame = Frame::While {
                    node: node.cheap_clone(),
                    phase: LoopPhase::CheckTest,
                };
                self.stack.push(state);
                self.push_expression(&node.test, scope);
            }
        }
        Ok(())
    }

    pub(super) fn step_do_while(
        &mut self,
        mut state: State,
        node: Rc<WhileStatement>,
        phase: LoopPhase,
    ) -> Result<(), JsError> {
        let scope = state.scope;
        let run_body = match phase {
            LoopPhase::Start => true,
            LoopPhase::CheckTest => state.value.to_boolean(),
            LoopPhase::Test | LoopPhase::Update => {
                state.frame = Frame::DoWhile {
                    node: node.cheap_clone(),
                    phase: LoopPhase::CheckTest,
                };
                self.stack.push(state);
                self.push_expression(&node.test, scope);
                return Ok(());
            }
        };
        if run_body {
            state.frame = Frame::DoWhile {
                node: node.cheap_clone(),
                phase: LoopPhase::Test,
            };
            self.stack.push(state);
            self.push_statement(&node.body, scope, Vec::new());
        }
        Ok(())
    }

    pub(super) fn step_for(
        &mut self,
        mut state: State,
        node: Rc<ForStatement>,
        mut phase: LoopPhase,
    ) -> Result<(), JsError> {
        let scope = state.scope;
        loop {
            match phase {
                LoopPhase::Start => {
                    state.frame = Frame::For {
                        node: node.cheap_clone(),
                        phase: LoopPhase::Test,
                    };
                    match &node.init {
                        Some(ForInit::Variable(declaration)) => {
                            self.stack.push(state);
                            let statement = Statement::VariableDeclaration(declaration.cheap_clone());
                            self.push_statement(&statement, scope, Vec::new());
                        }
                        Some(ForInit::Expression(init)) => {
                            self.stack.push(state);
                            self.push_expression(init, scope);
                        }
                        None => {
                            phase = LoopPhase::Test;
                            continue;
                        }
                    }
                    return Ok(());
                }
                LoopPhase::Test => match &node.test {
                    Some(test) => {
                        state.frame = Frame::For {
                            node: node.cheap_clone(),
                            phase: LoopPhase::CheckTest,
                        };
                        self.stack.push(state);
                        self.push_expression(test, scope);
                        return Ok(());
                    }
                    None => {
                        state.value = Value::Boolean(true);
                        phase = LoopPhase::CheckTest;
                    }
                },
                LoopPhase::CheckTest => {
                    if !state.value.to_boolean() {
                        return Ok(());
                    }
                    state.frame = Frame::For {
                        node: node.cheap_clone(),
                        phase: LoopPhase::Update,
                    };
                    self.stack.push(state);
                    self.push_statement(&node.body, scope, Vec::new());
                    return Ok(());
                }
                LoopPhase::Update => match &node.update {
                    Some(update) => {
                        state.frame = Frame::For {
                            node: node.cheap_clone(),
                            phase: LoopPhase::Test,
                        };
                        self.stack.push(state);
                        self.push_expression(update, scope);
                        return Ok(());
                    }
                    None => phase = LoopPhase::Test,
                },
            }
        }
    }

    pub(super) fn step_for_in(&mut self, mut state: State, mut frame: Box<ForInFrame>) -> Result<(), JsError> {
        let scope = state.scope;
        let node = frame.node.cheap_clone();
        loop {
            match frame.phase {
                ForInPhase::Start => {
                    if let ForInTarget::Variable {
                        init: Some(init), ..
                    } = &node.left
                    {
                        if self.heap.scope(scope)?.strict {
                            return Err(JsError::syntax_error(
                                "for-in loop variable declaration may not have an initializer.",
                                state.span.line,
                                state.span.column,
                            ));
                        }
                        frame.phase = ForInPhase::Init;
                        state.frame = Frame::ForIn(frame);
                        self.stack.push(state);
                        self.push_expression(init, scope);
                        return Ok(());
                    }
                    frame.phase = ForInPhase::Object;
                    state.frame = Frame::ForIn(frame);
                    self.stack.push(state);
                    self.push_expression(&node.right, scope);
                    return Ok(());
                }
                ForInPhase::Init => {
                    let ForInTarget::Variable { name, .. } = &node.left else {
                        return Err(JsError::internal("for-in initializer without a variable"));
                    };
                    let value = std::mem::take(&mut state.value);
                    let result = self.set_value_to_scope(scope, name.as_str(), value.clone())?;
                    let span = state.span;
                    frame.phase = ForInPhase::Object;
                    state.frame = Frame::ForIn(frame);
                    self.stack.push(state);
                    self.push_expression(&node.right, scope);
                    // The setter runs before the right-hand side
                    if let SetResult::Setter { func, this } = result {
                        self.push_call(CallFrame::synthetic(func, this, vec![value]), scope, span);
                    }
                    return Ok(());
                }
                ForInPhase::Object => {
                    frame.object = std::mem::take(&mut state.value);
                    frame.phase = ForInPhase::Next;
                }
                ForInPhase::Next => {
                    let Some(key) = self.next_for_in_key(&mut frame)? else {
                        return Ok(());
                    };
                    frame.name = key;
                    match &node.left {
                        ForInTarget::Variable { name, .. } => {
                            state.reference = Some(Reference::Scope(name.cheap_clone()));
                            frame.phase = ForInPhase::Assign;
                        }
                        ForInTarget::Pattern(target) => {
                            frame.phase = ForInPhase::Assign;
                            state.frame = Frame::ForIn(frame);
                            self.stack.push(state);
                            self.push_reference(target, scope)?;
                            return Ok(());
                        }
                    }
                }
                ForInPhase::Assign => {
                    let Some(reference) = state.reference.take() else {
                        return Err(JsError::internal("for-in target did not produce a reference"));
                    };
                    let key = Value::String(frame.name.cheap_clone());
                    let result = self.set_reference_value(scope, &reference, key.clone())?;
                    frame.phase = ForInPhase::Body;
                    if let SetResult::Setter { func, this } = result {
                        let span = state.span;
                        state.frame = Frame::ForIn(frame);
                        self.stack.push(state);
                        self.push_call(CallFrame::synthetic(func, this, vec![key]), scope, span);
                        return Ok(());
                    }
                }
                ForInPhase::Body => {
                    frame.phase = ForInPhase::Next;
                    state.frame = Frame::ForIn(frame);
                    self.stack.push(state);
                    self.push_statement(&node.body, scope, Vec::new());
                    return Ok(());
                }
            }
        }
    }

    /// Next enumerable name, own keys first and then up the prototype chain.
    /// Names already seen, deleted since listing, or non-enumerable are skipped.
    fn next_for_in_key(&self, frame: &mut ForInFrame) -> Result<Option<JsString>, JsError> {
        loop {
            if frame.object.is_null_or_undefined() {
                return Ok(None);
            }
            if frame.keys.is_none() {
                frame.keys = Some(match &frame.object {
                    Value::Object(id) => self.heap.object(*id)?.own_keys(),
                    Value::String(s) => (0..s.utf16_len())
                        .map(|i| JsString::from(i.to_string()))
                        .collect(),
                    _ => Vec::new(),
                });
                frame.key_index = 0;
            }

            while let Some(key) = frame
                .keys
                .as_ref()
                .and_then(|keys| keys.get(frame.key_index))
                .cloned()
            {
                frame.key_index += 1;
                let enumerable = match &frame.object {
                    Value::Object(id) => self
                        .heap
                        .object(*id)?
                        .own_property(key.as_str())
                        .map(|property| property.enumerable),
                    // String primitive indices
                    _ => Some(true),
                };
                let Some(enumerable) = enumerable else {
                    continue;
                };
                if !frame.visited.insert(key.cheap_clone()) || !enumerable {
                    continue;
                }
                return Ok(Some(key));
            }

            frame.object = match self.get_prototype(&frame.object)? {
                Some(proto) => Value::Object(proto),
                None => Value::Null,
            };
            frame.keys = None;
        }
    }
}
