//! Contract with the script-execution engine.
//!
//! The engine is external: it loads, runs, pauses and single-steps programs.
//! The controller only calls the primitives below and reacts to the events the
//! engine pushes into its [`EventSink`].

mod frame;

pub use frame::{FrameScope, StackFrame, Variable};

use crate::error::ScriptError;
use crate::value::Value;
use std::sync::mpsc::Sender;

/// Identifies one debug run. Every engine event carries the id of the session
/// whose engine produced it.
pub type SessionId = u64;

/// Position reported by the engine, in the engine's own line numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

/// Order in which an engine reports `call_stack`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackOrder {
    OutermostFirst,
    InnermostFirst,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEventKind {
    /// Execution paused (breakpoint hit or step finished).
    Breakpoint,
    /// Uncaught error in the controlled program.
    Error(ScriptError),
    /// Output from the program's console.
    Console(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineEvent {
    pub session: SessionId,
    pub kind: EngineEventKind,
}

/// Sending half handed to an engine at construction. Stamps every event with
/// the session the engine belongs to.
#[derive(Debug, Clone)]
pub struct EventSink {
    session: SessionId,
    tx: Sender<EngineEvent>,
}

impl EventSink {
    pub fn new(session: SessionId, tx: Sender<EngineEvent>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn breakpoint(&self) {
        self.send(EngineEventKind::Breakpoint);
    }

    pub fn error(&self, error: ScriptError) {
        self.send(EngineEventKind::Error(error));
    }

    pub fn console(&self, line: impl Into<String>) {
        self.send(EngineEventKind::Console(line.into()));
    }

    fn send(&self, kind: EngineEventKind) {
        // The controller may already be gone; nothing left to notify.
        let _ = self.tx.send(EngineEvent {
            session: self.session,
            kind,
        });
    }
}

/// Rendering surface an engine draws the document into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub name: String,
}

impl Surface {
    pub fn for_session(session: SessionId) -> Self {
        Self {
            name: format!("debug-surface-{}", session),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub session: SessionId,
    pub surface: Surface,
    pub events: EventSink,
}

pub trait Engine {
    /// Write document markup into the engine's rendering surface.
    fn write_document(&mut self, markup: &str);

    fn load(&mut self, source: &str, filename: &str) -> Result<(), ScriptError>;

    /// Start or resume execution.
    fn run(&mut self);
    fn step_in(&mut self);
    fn step_out(&mut self);
    fn step_over(&mut self);

    fn add_breakpoints(&mut self, filename: &str, lines: &[u32]);
    fn remove_breakpoints(&mut self, filename: &str, lines: &[u32]);

    fn call_stack(&self) -> Vec<StackFrame>;

    fn stack_order(&self) -> StackOrder {
        StackOrder::OutermostFirst
    }

    fn current_stack_frame(&self) -> Option<StackFrame>;
    fn current_location(&self) -> Option<Location>;
    fn is_paused(&self) -> bool;

    /// Evaluate in the global execution context.
    fn evaluate(&mut self, expression: &str) -> Result<Value, ScriptError>;
}

/// Builds engines for new sessions.
pub trait EngineFactory {
    type Engine: Engine;
    type Error: std::error::Error + Send + Sync + 'static;

    fn create(&mut self, config: EngineConfig) -> Result<Self::Engine, Self::Error>;
}
