use thiserror::Error;

/// An error thrown inside the debuggee: by a console expression, by loading a
/// script, or by the controlled program itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ScriptError {
    /// Constructor name of the thrown error, e.g. `ReferenceError`.
    pub kind: String,
    pub message: String,
}

impl ScriptError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("failed to construct debug engine for session {session}")]
    EngineConstruction {
        session: u64,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("no script file named `{0}` in the session")]
    MissingScript(String),
    #[error("line {line} has no engine line at offset {offset}")]
    LineOutOfRange { line: u32, offset: u32 },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid debugger configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error("maxRenderDepth must be at least 1")]
    ZeroRenderDepth,
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("host transport failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed host message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("bad frame header: {0}")]
    Framing(String),
    #[error(transparent)]
    Controller(#[from] ControllerError),
}
