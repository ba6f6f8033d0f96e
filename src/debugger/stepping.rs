/// Execution requests the controller forwards to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepCommand {
    Resume,
    StepOver,
    StepIn,
    StepOut,
}

impl StepCommand {
    /// Accepts the command names hosts send, including the short aliases.
    pub fn from_command(command: &str) -> Option<Self> {
        match command {
            "continue" | "resume" => Some(StepCommand::Resume),
            "next" | "stepOver" => Some(StepCommand::StepOver),
            "stepIn" | "stepInto" => Some(StepCommand::StepIn),
            "stepOut" => Some(StepCommand::StepOut),
            _ => None,
        }
    }
}
