//! Abrupt completions: break, continue, return and throw

use crate::error::{ErrorKind, JsError};
use crate::interpreter::Interpreter;
use crate::interpreter::stack::{CallPhase, Completion, CompletionKind, Frame};
use crate::value::{JsObject, JsString, ObjectId, ObjectKind, Property, Value};

/// What a frame does with a completion passing through it
enum Stop {
    /// Keep walking, popping this frame
    Pass,
    /// The frame absorbed the completion and stays on the stack
    Keep,
    /// The frame is the break target and is popped
    Pop,
    /// Reached the root program
    Program,
}

impl Interpreter {
    /// Walk the stack with an abrupt completion until something handles it
    pub(crate) fn unwind(
        &mut self,
        kind: CompletionKind,
        value: Value,
        label: Option<JsString>,
    ) -> Result<(), JsError> {
        let mut value = Some(value);
        let mut cancel_async = false;
        while let Some(state) = self.stack.last_mut() {
            let targeted = match &label {
                Some(label) => state.has_label(label),
                None => match kind {
                    CompletionKind::Break => state.is_loop() || state.is_switch(),
                    CompletionKind::Continue => state.is_loop(),
                    _ => false,
                },
            };
            let stop = match &mut state.frame {
                Frame::Try { completion, .. } => {
                    *completion = Some(Completion {
                        kind,
                        value: value.take().unwrap_or_default(),
                        label: label.clone(),
                    });
                    Stop::Keep
                }
                Frame::Call(call) => match kind {
                    CompletionKind::Return => {
                        state.value = value.take().unwrap_or_default();
                        Stop::Keep
                    }
                    CompletionKind::Throw => {
                        cancel_async |= call.phase == CallPhase::AwaitAsync;
                        Stop::Pass
                    }
                    CompletionKind::Break | CompletionKind::Continue => {
                        return Err(JsError::internal(
                            "break or continue crossed a function boundary",
                        ));
                    }
                },
                Frame::Program { done, .. } => {
                    *done = true;
                    Stop::Program
                }
                _ => match kind {
                    CompletionKind::Break if targeted => Stop::Pop,
                    CompletionKind::Continue if targeted => Stop::Keep,
                    _ => Stop::Pass,
                },
            };
            if std::mem::take(&mut cancel_async) {
                log::debug!("pending async call abandoned by a throw");
                self.cancel_async();
            }
            match stop {
                Stop::Keep => return Ok(()),
                Stop::Pop => {
                    self.stack.pop();
                    return Ok(());
                }
                Stop::Program => break,
                Stop::Pass => {
                    self.stack.pop();
                }
            }
        }

        let value = value.unwrap_or_default();
        match kind {
            CompletionKind::Throw => Err(self.uncaught_error(&value)?),
            _ => Err(JsError::internal(format!(
                "unhandled {:?} completion reached the program",
                kind
            ))),
        }
    }

    /// Convert a guest value nobody caught into a host error
    fn uncaught_error(&self, value: &Value) -> Result<JsError, JsError> {
        let error_prototype = self.error_prototype(ErrorKind::Error);
        let is_error = match value {
            Value::Object(id) => {
                matches!(self.heap.object(*id)?.kind, ObjectKind::Error)
                    || self.inherits_from(value, error_prototype)?
            }
            _ => false,
        };
        let err = if is_error {
            let name = self.get_data(value, "name")?;
            let message = self.get_data(value, "message")?;
            let stack = self.get_data(value, "stack")?;
            JsError::RuntimeError {
                kind: ErrorKind::from_name(self.to_string(&name)?.as_str()),
                message: match message {
                    Value::Undefined => String::new(),
                    other => self.to_string(&other)?.to_string(),
                },
                stack: match stack {
                    Value::String(s) => s.to_string(),
                    _ => String::new(),
                },
            }
        } else {
            JsError::RuntimeError {
                kind: ErrorKind::Error,
                message: self.to_string(value)?.to_string(),
                stack: String::new(),
            }
        };
        log::debug!("uncaught exception: {}", err);
        Ok(err)
    }

    /// Turn a handler error into the guest value that gets thrown
    pub(crate) fn error_to_value(&mut self, err: JsError) -> Result<Value, JsError> {
        match err {
            JsError::Thrown(value) => Ok(value),
            JsError::Internal(message) => Err(JsError::Internal(message)),
            other => {
                let kind = other.kind().unwrap_or(ErrorKind::Error);
                let error = self.create_error(kind, &other.guest_message())?;
                Ok(Value::Object(error))
            }
        }
    }

    /// A fresh guest error object with `message` and `stack`
    pub(crate) fn create_error(&mut self, kind: ErrorKind, message: &str) -> Result<ObjectId, JsError> {
        let proto = self.error_prototype(kind);
        let mut error = JsObject::new(ObjectKind::Error, Some(proto));
        if !message.is_empty() {
            error
                .properties
                .insert(JsString::from("message"), Property::hidden(Value::from(message)));
        }
        let header = if message.is_empty() {
            kind.name().to_string()
        } else {
            format!("{}: {}", kind, message)
        };
        let trace = self.stack_trace();
        let stack = if trace.is_empty() {
            header
        } else {
            format!("{}\n{}", header, trace)
        };
        error
            .properties
            .insert(JsString::from("stack"), Property::hidden(Value::from(stack)));
        Ok(self.heap.alloc(error))
    }
}
