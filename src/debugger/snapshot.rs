//! Render-ready state handed to the document layer at each pause.

use super::diff::ValueDiff;
use crate::engine::StackFrame;
use crate::render::ValueRenderer;
use crate::value::Value;
use serde::Serialize;

/// A variable with its rendering fixed at capture time, so later mutation of
/// a shared value cannot rewrite what was observed.
#[derive(Debug, Clone)]
pub struct CapturedVariable {
    pub name: String,
    pub value: Value,
    pub rendered: String,
}

#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub name: String,
    pub filename: String,
    pub variables: Vec<CapturedVariable>,
}

impl CapturedFrame {
    pub fn capture(frame: &StackFrame, renderer: &ValueRenderer) -> Self {
        Self {
            name: frame.name.clone(),
            filename: frame.filename.clone(),
            variables: frame
                .scope
                .iter()
                .map(|var| CapturedVariable {
                    name: var.name.clone(),
                    value: var.value.clone(),
                    rendered: renderer.render(&var.value),
                })
                .collect(),
        }
    }
}

/// A scope variable annotated for display.
#[derive(Debug, Clone, Serialize)]
pub struct ScopeEntry {
    pub name: String,
    #[serde(skip)]
    pub value: Value,
    pub rendered: String,
    pub diff: ValueDiff,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedScope {
    pub name: String,
    pub filename: String,
    pub entries: Vec<ScopeEntry>,
}

impl RenderedScope {
    pub fn entry(&self, name: &str) -> Option<&ScopeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameSummary {
    pub name: String,
    pub filename: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedSnapshot {
    /// Outermost frame first.
    pub stack: Vec<FrameSummary>,
    /// Innermost frame's variables, diffed against the previous pause.
    pub scope: Option<RenderedScope>,
    /// Current line in editor numbering.
    pub line: Option<u32>,
}
