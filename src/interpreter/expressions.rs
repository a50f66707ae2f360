//! Expression handlers

use std::rc::Rc;

use crate::ast::{
    ArrayExpression, AssignmentExpression, AssignmentOp, BinaryExpression, ConditionalExpression,
    Identifier, Literal, LiteralValue, LogicalExpression, LogicalOp, MemberExpression,
    MemberProperty, ObjectExpression, PropertyKind, SequenceExpression, UnaryExpression, UnaryOp,
    UpdateExpression, UpdateOp,
};
use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::interpreter::property::{PropertyResult, SetResult};
use crate::interpreter::stack::{
    AssignPhase, BinaryPhase, BranchPhase, CallFrame, Frame, MemberPhase, Reference, State,
    UnaryPhase, UpdatePhase,
};
use crate::value::{CheapClone, JsString, ObjectId, Property, PropertySlot, ScopeId, Value, to_int32};

impl Interpreter {
    pub(super) fn step_literal(&mut self, node: Rc<Literal>) -> Result<(), JsError> {
        let value = match &node.value {
            LiteralValue::Null => Value::Null,
            LiteralValue::Boolean(b) => Value::Boolean(*b),
            LiteralValue::Number(n) => Value::Number(*n),
            LiteralValue::String(s) => Value::String(s.cheap_clone()),
            LiteralValue::RegExp { pattern, flags } => {
                Value::Object(self.create_regexp(pattern.as_str(), flags.as_str())?)
            }
        };
        self.ascend(value);
        Ok(())
    }

    pub(super) fn step_identifier(
        &mut self,
        mut state: State,
        node: Rc<Identifier>,
        awaiting_getter: bool,
    ) -> Result<(), JsError> {
        if awaiting_getter {
            self.ascend(state.value);
            return Ok(());
        }
        let typeof_operand = matches!(
            self.stack.last().map(|parent| &parent.frame),
            Some(Frame::Unary { node, .. }) if node.operator == UnaryOp::Typeof
        );
        match self.get_value_from_scope(state.scope, node.name.as_str(), typeof_operand)? {
            PropertyResult::Value(value) => self.ascend(value),
            PropertyResult::Accessor { func, this } => {
                let (scope, span) = (state.scope, state.span);
                state.frame = Frame::Identifier {
                    node,
                    awaiting_getter: true,
                };
                self.stack.push(state);
                self.push_call(CallFrame::synthetic(func, this, Vec::new()), scope, span);
            }
        }
        Ok(())
    }

    pub(super) fn step_array(
        &mut self,
        mut state: State,
        node: Rc<ArrayExpression>,
        array: Option<ObjectId>,
        mut index: usize,
    ) -> Result<(), JsError> {
        let array = match array {
            Some(array) => {
                // The element pushed last has landed in `value`
                let value = std::mem::take(&mut state.value);
                let key = JsString::from(index.saturating_sub(1).to_string());
                self.heap
                    .object_mut(array)?
                    .properties
                    .insert(key, Property::data(value));
                array
            }
            None => self.create_array(Vec::new()),
        };

        while let Some(element) = node.elements.get(index) {
            index += 1;
            if let Some(element) = element.clone() {
                let scope = state.scope;
                state.frame = Frame::Array {
                    node,
                    array: Some(array),
                    index,
                };
                self.stack.push(state);
                self.push_expression(&element, scope);
                return Ok(());
            }
        }

        let length = Value::Number(node.elements.len() as f64);
        self.set_array_length(array, &length)?;
        self.ascend(Value::Object(array));
        Ok(())
    }

    pub(super) fn step_object(
        &mut self,
        mut state: State,
        node: Rc<ObjectExpression>,
        object: Option<ObjectId>,
        index: usize,
    ) -> Result<(), JsError> {
        let object = match object {
            Some(object) => {
                let Some(property) = node.properties.get(index.saturating_sub(1)) else {
                    return Err(JsError::internal("object literal property out of range"));
                };
                let value = std::mem::take(&mut state.value);
                self.define_literal_property(object, property.key.cheap_clone(), property.kind, value)?;
                object
            }
            None => self.create_object(),
        };

        if let Some(property) = node.properties.get(index) {
            let value = property.value.clone();
            let scope = state.scope;
            state.frame = Frame::Object {
                node,
                object: Some(object),
                index: index + 1,
            };
            self.stack.push(state);
            self.push_expression(&value, scope);
            return Ok(());
        }
        self.ascend(Value::Object(object));
        Ok(())
    }

    fn define_literal_property(
        &mut self,
        object: ObjectId,
        key: JsString,
        kind: PropertyKind,
        value: Value,
    ) -> Result<(), JsError> {
        let target = self.heap.object_mut(object)?;
        let func = value.as_object();
        let property = match kind {
            PropertyKind::Init => Property::data(value),
            PropertyKind::Get | PropertyKind::Set => {
                let (mut get, mut set) = match target.properties.get(&key).map(|p| &p.slot) {
                    Some(PropertySlot::Accessor { get, set }) => (*get, *set),
                    _ => (None, None),
                };
                if kind == PropertyKind::Get {
                    get = func;
                } else {
                    set = func;
                }
                Property {
                    slot: PropertySlot::Accessor { get, set },
                    enumerable: true,
                    configurable: true,
                }
            }
        };
        target.properties.insert(key, property);
        Ok(())
    }

    pub(super) fn step_unary(
        &mut self,
        mut state: State,
        node: Rc<UnaryExpression>,
        phase: UnaryPhase,
    ) -> Result<(), JsError> {
        let scope = state.scope;
        if phase == UnaryPhase::Start {
            state.frame = Frame::Unary {
                node: node.cheap_clone(),
                phase: UnaryPhase::Operand,
            };
            self.stack.push(state);
            if node.operator == UnaryOp::Delete && node.argument.is_reference() {
                self.push_reference(&node.argument, scope)?;
            } else {
                self.push_expression(&node.argument, scope);
            }
            return Ok(());
        }

        let value = state.value;
        let result = match node.operator {
            UnaryOp::Minus => Value::Number(-self.to_number(&value)?),
            UnaryOp::Plus => Value::Number(self.to_number(&value)?),
            UnaryOp::Not => Value::Boolean(!value.to_boolean()),
            UnaryOp::BitNot => Value::Number(f64::from(!to_int32(self.to_number(&value)?))),
            UnaryOp::Typeof => Value::from(self.type_of(&value)?),
            UnaryOp::Void => Value::Undefined,
            UnaryOp::Delete => Value::Boolean(match state.reference {
                Some(reference) => self.delete_reference(scope, reference)?,
                None => true,
            }),
        };
        self.ascend(result);
        Ok(())
    }

    fn delete_reference(&mut self, scope: ScopeId, reference: Reference) -> Result<bool, JsError> {
        match reference {
            Reference::Scope(name) => match self.find_binding(scope, name.as_str())? {
                Some(object) => self.delete_property(object, name.as_str()),
                None => Ok(true),
            },
            Reference::Property(base, name) => {
                let object = self.to_object(&base)?;
                self.delete_property(object, name.as_str())
            }
        }
    }

    pub(super) fn step_update(
        &mut self,
        mut state: State,
        node: Rc<UpdateExpression>,
        phase: UpdatePhase,
        result: Value,
    ) -> Result<(), JsError> {
        let scope = state.scope;
        let old = match phase {
            UpdatePhase::Start => {
                state.frame = Frame::Update {
                    node: node.cheap_clone(),
                    phase: UpdatePhase::Reference,
                    result,
                };
                self.stack.push(state);
                return self.push_reference(&node.argument, scope);
            }
            UpdatePhase::Reference => {
                let Some(reference) = &state.reference else {
                    return Err(JsError::internal("update target did not produce a reference"));
                };
                match self.get_reference_value(scope, reference)? {
                    PropertyResult::Value(value) => value,
                    PropertyResult::Accessor { func, this } => {
                        let span = state.span;
                        state.frame = Frame::Update {
                            node,
                            phase: UpdatePhase::Getter,
                            result,
                        };
                        self.stack.push(state);
                        self.push_call(CallFrame::synthetic(func, this, Vec::new()), scope, span);
                        return Ok(());
                    }
                }
            }
            UpdatePhase::Getter => std::mem::take(&mut state.value),
            UpdatePhase::Setter => {
                self.ascend(result);
                return Ok(());
            }
        };

        let old = self.to_number(&old)?;
        let new = match node.operator {
            UpdateOp::Increment => old + 1.0,
            UpdateOp::Decrement => old - 1.0,
        };
        let result = Value::Number(if node.prefix { new } else { old });
        let Some(reference) = state.reference.take() else {
            return Err(JsError::internal("update target did not produce a reference"));
        };
        match self.set_reference_value(scope, &reference, Value::Number(new))? {
            SetResult::Done => self.ascend(result),
            SetResult::Setter { func, this } => {
                let span = state.span;
                state.frame = Frame::Update {
                    node,
                    phase: UpdatePhase::Setter,
                    result,
                };
                self.stack.push(state);
                self.push_call(
                    CallFrame::synthetic(func, this, vec![Value::Number(new)]),
                    scope,
                    span,
                );
            }
        }
        Ok(())
    }

    pub(super) fn step_binary(
        &mut self,
        mut state: State,
        node: Rc<BinaryExpression>,
        phase: BinaryPhase,
        left: Value,
    ) -> Result<(), JsError> {
        let scope = state.scope;
        match phase {
            BinaryPhase::Start => {
                state.frame = Frame::Binary {
                    node: node.cheap_clone(),
                    phase: BinaryPhase::Left,
                    left,
                };
                self.stack.push(state);
                self.push_expression(&node.left, scope);
            }
            BinaryPhase::Left => {
                let left = std::mem::take(&mut state.value);
                state.frame = Frame::Binary {
                    node: node.cheap_clone(),
                    phase: BinaryPhase::Right,
                    left,
                };
                self.stack.push(state);
                self.push_expression(&node.right, scope);
            }
            BinaryPhase::Right => {
                let result = self.binary_operation(node.operator, &left, &state.value)?;
                self.ascend(result);
            }
        }
        Ok(())
    }

    pub(super) fn step_logical(
        &mut self,
        mut state: State,
        node: Rc<LogicalExpression>,
        phase: BinaryPhase,
    ) -> Result<(), JsError> {
        let scope = state.scope;
        match phase {
            BinaryPhase::Start => {
                state.frame = Frame::Logical {
                    node: node.cheap_clone(),
                    phase: BinaryPhase::Left,
                };
                self.stack.push(state);
                self.push_expression(&node.left, scope);
            }
            BinaryPhase::Left => {
                let truthy = state.value.to_boolean();
                let short_circuit = match node.operator {
                    LogicalOp::And => !truthy,
                    LogicalOp::Or => truthy,
                };
                if short_circuit {
                    self.ascend(state.value);
                } else {
                    state.frame = Frame::Logical {
                        node: node.cheap_clone(),
                        phase: BinaryPhase::Right,
                    };
                    self.stack.push(state);
                    self.push_expression(&node.right, scope);
                }
            }
            BinaryPhase::Right => self.ascend(state.value),
        }
        Ok(())
    }

    pub(super) fn step_conditional(
        &mut self,
        mut state: State,
        node: Rc<ConditionalExpression>,
        phase: BranchPhase,
    ) -> Result<(), JsError> {
        let scope = state.scope;
        match phase {
            BranchPhase::Start => {
                state.frame = Frame::Conditional {
                    node: node.cheap_clone(),
                    phase: BranchPhase::Test,
                };
                self.stack.push(state);
                self.push_expression(&node.test, scope);
            }
            BranchPhase::Test => {
                let branch = if state.value.to_boolean() {
                    node.consequent.clone()
                } else {
                    node.alternate.clone()
                };
                state.frame = Frame::Conditional {
                    node,
                    phase: BranchPhase::Done,
                };
                self.stack.push(state);
                self.push_expression(&branch, scope);
            }
            BranchPhase::Done => self.ascend(state.value),
        }
        Ok(())
    }

    pub(super) fn step_assignment(
        &mut self,
        mut state: State,
        node: Rc<AssignmentExpression>,
        phase: AssignPhase,
        left: Value,
        result: Value,
    ) -> Result<(), JsError> {
        let scope = state.scope;
        let span = state.span;
        match phase {
            AssignPhase::Start => {
                state.frame = Frame::Assignment {
                    node: node.cheap_clone(),
                    phase: AssignPhase::Target,
                    left,
                    result,
                };
                self.stack.push(state);
                self.push_reference(&node.target, scope)
            }
            AssignPhase::Target => {
                if node.operator == AssignmentOp::Assign {
                    return self.assignment_value(state, node, left);
                }
                let Some(reference) = &state.reference else {
                    return Err(JsError::internal("assignment target did not produce a reference"));
                };
                match self.get_reference_value(scope, reference)? {
                    PropertyResult::Value(left) => self.assignment_value(state, node, left),
                    PropertyResult::Accessor { func, this } => {
                        state.frame = Frame::Assignment {
                            node,
                            phase: AssignPhase::Getter,
                            left,
                            result,
                        };
                        self.stack.push(state);
                        self.push_call(CallFrame::synthetic(func, this, Vec::new()), scope, span);
                        Ok(())
                    }
                }
            }
            AssignPhase::Getter => {
                let left = std::mem::take(&mut state.value);
                self.assignment_value(state, node, left)
            }
            AssignPhase::Value => {
                let right = std::mem::take(&mut state.value);
                let value = match node.operator.binary_op() {
                    Some(op) => self.binary_operation(op, &left, &right)?,
                    None => right,
                };
                let Some(reference) = state.reference.take() else {
                    return Err(JsError::internal("assignment target did not produce a reference"));
                };
                match self.set_reference_value(scope, &reference, value.clone())? {
                    SetResult::Done => self.ascend(value),
                    SetResult::Setter { func, this } => {
                        state.frame = Frame::Assignment {
                            node,
                            phase: AssignPhase::Setter,
                            left: Value::Undefined,
                            result: value.clone(),
                        };
                        self.stack.push(state);
                        self.push_call(CallFrame::synthetic(func, this, vec![value]), scope, span);
                    }
                }
                Ok(())
            }
            AssignPhase::Setter => {
                self.ascend(result);
                Ok(())
            }
        }
    }

    /// Evaluate the right-hand side once the target (and its old value for
    /// compound operators) is known
    fn assignment_value(
        &mut self,
        mut state: State,
        node: Rc<AssignmentExpression>,
        left: Value,
    ) -> Result<(), JsError> {
        let scope = state.scope;
        state.frame = Frame::Assignment {
            node: node.cheap_clone(),
            phase: AssignPhase::Value,
            left,
            result: Value::Undefined,
        };
        self.stack.push(state);
        self.push_expression(&node.value, scope);
        Ok(())
    }

    pub(super) fn step_sequence(
        &mut self,
        mut state: State,
        node: Rc<SequenceExpression>,
        index: usize,
    ) -> Result<(), JsError> {
        let Some(expression) = node.expressions.get(index).cloned() else {
            self.ascend(state.value);
            return Ok(());
        };
        let scope = state.scope;
        state.frame = Frame::Sequence {
            node,
            index: index + 1,
        };
        self.stack.push(state);
        self.push_expression(&expression, scope);
        Ok(())
    }

    /// Member access, producing either a value or (for `Frame::Reference`) a
    /// `Reference` for the parent
    pub(super) fn step_member(
        &mut self,
        mut state: State,
        node: Rc<MemberExpression>,
        phase: MemberPhase,
        object: Value,
        as_reference: bool,
    ) -> Result<(), JsError> {
        let scope = state.scope;
        let rebuild = |node: Rc<MemberExpression>, phase: MemberPhase, object: Value| {
            if as_reference {
                Frame::Reference {
                    node,
                    phase,
                    object,
                }
            } else {
                Frame::Member {
                    node,
                    phase,
                    object,
                }
            }
        };

        let (object, name) = match phase {
            MemberPhase::Start => {
                state.frame = rebuild(node.cheap_clone(), MemberPhase::Object, object);
                self.stack.push(state);
                self.push_expression(&node.object, scope);
                return Ok(());
            }
            MemberPhase::Object => {
                let object = std::mem::take(&mut state.value);
                match &node.property {
                    MemberProperty::Identifier(name) => (object, name.cheap_clone()),
                    MemberProperty::Expression(property) => {
                        let property = property.clone();
                        state.frame = rebuild(node, MemberPhase::Property, object);
                        self.stack.push(state);
                        self.push_expression(&property, scope);
                        return Ok(());
                    }
                }
            }
            MemberPhase::Property => {
                let name = self.to_property_key(&state.value)?;
                (object, name)
            }
            MemberPhase::Getter => {
                self.ascend(state.value);
                return Ok(());
            }
        };

        if as_reference {
            if object.is_null_or_undefined() {
                return Err(JsError::type_error(format!(
                    "Cannot read property '{}' of {}",
                    name,
                    self.to_string(&object)?
                )));
            }
            self.ascend_reference(Reference::Property(object, name));
            return Ok(());
        }

        match self.get_property(&object, name.as_str())? {
            PropertyResult::Value(value) => self.ascend(value),
            PropertyResult::Accessor { func, this } => {
                let span = state.span;
                state.frame = rebuild(node, MemberPhase::Getter, object);
                self.stack.push(state);
                self.push_call(CallFrame::synthetic(func, this, Vec::new()), scope, span);
            }
        }
        Ok(())
    }
}
