use crate::error::ScriptError;
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

/// Evaluation bound to one frame's lexical scope.
pub trait FrameScope {
    fn eval_in_scope(&self, expression: &str) -> Result<Value, ScriptError>;
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub value: Value,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// One activation record as reported at a pause. Never mutated afterwards.
#[derive(Clone)]
pub struct StackFrame {
    pub name: String,
    pub filename: String,
    /// Variables in the order the engine reports them.
    pub scope: Vec<Variable>,
    scope_eval: Rc<dyn FrameScope>,
}

impl StackFrame {
    pub fn new(
        name: impl Into<String>,
        filename: impl Into<String>,
        scope: Vec<Variable>,
        scope_eval: Rc<dyn FrameScope>,
    ) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            scope,
            scope_eval,
        }
    }

    pub fn eval_in_scope(&self, expression: &str) -> Result<Value, ScriptError> {
        self.scope_eval.eval_in_scope(expression)
    }
}

impl fmt::Debug for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackFrame")
            .field("name", &self.name)
            .field("filename", &self.filename)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}
