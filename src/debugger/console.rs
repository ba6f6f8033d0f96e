use crate::engine::Engine;
use crate::error::ScriptError;
use crate::render::ValueRenderer;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConsoleEntry {
    /// The command as typed.
    Command { text: String },
    Result { text: String },
    /// Output written by the program.
    Log { text: String },
    Error { kind: String, message: String },
}

impl From<ScriptError> for ConsoleEntry {
    fn from(err: ScriptError) -> Self {
        ConsoleEntry::Error {
            kind: err.kind,
            message: err.message,
        }
    }
}

impl fmt::Display for ConsoleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleEntry::Command { text } => write!(f, "> {}", text),
            ConsoleEntry::Result { text } | ConsoleEntry::Log { text } => f.write_str(text),
            ConsoleEntry::Error { kind, message } => write!(f, "{}: {}", kind, message),
        }
    }
}

/// REPL evaluation against the paused program.
#[derive(Debug, Default)]
pub struct ConsoleBridge {
    renderer: ValueRenderer,
    history: Vec<ConsoleEntry>,
}

impl ConsoleBridge {
    pub fn new(renderer: ValueRenderer) -> Self {
        Self {
            renderer,
            history: Vec::new(),
        }
    }

    /// Evaluate in the current frame's scope, or globally when no frame is
    /// selected. Failures come back as error entries.
    pub fn evaluate<E: Engine>(&mut self, engine: Option<&mut E>, text: &str) -> ConsoleEntry {
        self.history.push(ConsoleEntry::Command {
            text: text.to_string(),
        });

        let result = match engine {
            Some(engine) => match engine.current_stack_frame() {
                Some(frame) => {
                    tracing::debug!(frame = %frame.name, "evaluating in frame scope");
                    frame.eval_in_scope(text)
                }
                None => engine.evaluate(text),
            },
            None => Err(ScriptError::new("Error", "no active debug session")),
        };

        let entry = match result {
            Ok(value) => ConsoleEntry::Result {
                text: self.renderer.summarize(&value),
            },
            Err(err) => err.into(),
        };
        self.history.push(entry.clone());
        entry
    }

    pub fn record(&mut self, entry: ConsoleEntry) {
        self.history.push(entry);
    }

    pub fn history(&self) -> &[ConsoleEntry] {
        &self.history
    }
}
