use super::snapshot::CapturedFrame;
use crate::engine::{Engine, SessionId, StackFrame, StackOrder};
use crate::render::ValueRenderer;

/// One debug run: the engine plus the stack observed at the last pause.
///
/// A session is never reused for another run; reset builds a new one and
/// drops this one, engine included.
pub struct Session<E> {
    id: SessionId,
    engine: E,
    /// Outermost first; the last entry is the top-of-stack baseline.
    baseline: Vec<CapturedFrame>,
}

impl<E: Engine> Session<E> {
    pub fn new(id: SessionId, engine: E) -> Self {
        Self {
            id,
            engine,
            baseline: Vec::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Engine call stack, outermost frame first.
    pub fn call_stack(&self) -> Vec<StackFrame> {
        let mut stack = self.engine.call_stack();
        if self.engine.stack_order() == StackOrder::InnermostFirst {
            stack.reverse();
        }
        stack
    }

    pub fn capture(&self, renderer: &ValueRenderer) -> Vec<CapturedFrame> {
        self.call_stack()
            .iter()
            .map(|frame| CapturedFrame::capture(frame, renderer))
            .collect()
    }

    pub fn baseline_top(&self) -> Option<&CapturedFrame> {
        self.baseline.last()
    }

    pub fn set_baseline(&mut self, stack: Vec<CapturedFrame>) {
        self.baseline = stack;
    }
}
