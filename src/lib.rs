//! Control layer of a step-debugger.
//!
//! [`debugger::DebugController`] drives an external script engine (see
//! [`engine::Engine`]) through breakpointed runs. At every pause it captures the
//! call stack, renders the innermost frame's variables with
//! [`render::ValueRenderer`] and diffs them against the previous pause, then
//! hands the result to the host as a [`debugger::Notification`]. Console
//! commands are evaluated in the paused frame, or globally when nothing is
//! paused.
//!
//! ```text
//! editor/console ──▶ host ──▶ DebugController ──▶ Engine
//!                     ▲              │                │
//!                     └─ Notification┘◀── EngineEvent ┘
//! ```
//!
//! Engine events carry the id of the session that produced them; events from a
//! session that has since been reset are dropped.

pub mod config;
pub mod debugger;
pub mod engine;
pub mod error;
pub mod files;
pub mod host;
pub mod render;
pub mod value;

pub use config::DebuggerConfig;
pub use debugger::{DebugController, Notification, SessionState};
pub use error::{ControllerError, ScriptError};
