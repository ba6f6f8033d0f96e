mod breakpoints;
mod console;
mod controller;
mod diff;
mod session;
mod snapshot;
mod stepping;

pub use breakpoints::BreakpointRegistry;
pub use console::{ConsoleBridge, ConsoleEntry};
pub use controller::{DebugController, Notification, SessionState, DEFAULT_SCRIPT};
pub use diff::{DiffSegment, DiffTag, ScopeDiffer, ValueDiff, UNDEFINED_BASELINE};
pub use session::Session;
pub use snapshot::{
    CapturedFrame, CapturedVariable, FrameSummary, RenderedScope, RenderedSnapshot, ScopeEntry,
};
pub use stepping::StepCommand;
