//! Scope diffing between consecutive pauses.
//!
//! Values are compared by their rendered markup, not structurally: both
//! renderings are split into tags, whitespace runs and words, and the token
//! sequences are diffed with Myers.

use super::snapshot::{CapturedFrame, RenderedScope, ScopeEntry};
use serde::Serialize;
use similar::{capture_diff_slices, Algorithm, DiffTag as OpTag};

/// Rendering of `undefined`, the baseline for variables with no previous value.
pub const UNDEFINED_BASELINE: &str = "undefined";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffTag {
    Equal,
    Inserted,
    Removed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffSegment {
    pub tag: DiffTag,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueDiff {
    pub previous: String,
    pub current: String,
    pub segments: Vec<DiffSegment>,
}

impl ValueDiff {
    pub fn between(previous: &str, current: &str) -> Self {
        let old = tokenize(previous);
        let new = tokenize(current);
        let mut segments: Vec<DiffSegment> = Vec::new();

        for op in capture_diff_slices(Algorithm::Myers, &old[..], &new[..]) {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            match tag {
                OpTag::Equal => push_segment(&mut segments, DiffTag::Equal, &old[old_range]),
                OpTag::Delete => push_segment(&mut segments, DiffTag::Removed, &old[old_range]),
                OpTag::Insert => push_segment(&mut segments, DiffTag::Inserted, &new[new_range]),
                OpTag::Replace => {
                    push_segment(&mut segments, DiffTag::Removed, &old[old_range]);
                    push_segment(&mut segments, DiffTag::Inserted, &new[new_range]);
                }
            }
        }

        Self {
            previous: previous.to_string(),
            current: current.to_string(),
            segments,
        }
    }

    pub fn is_unchanged(&self) -> bool {
        self.segments.iter().all(|s| s.tag == DiffTag::Equal)
    }

    /// Current rendering with removed text in `<del>` and inserted text in
    /// `<ins>`. Only text is wrapped: inserted tags are emitted bare and removed
    /// tags are dropped, so the tag structure is exactly the current rendering's.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            let wrapper = match segment.tag {
                DiffTag::Equal => {
                    out.push_str(&segment.text);
                    continue;
                }
                DiffTag::Removed => "del",
                DiffTag::Inserted => "ins",
            };
            let mut run = String::new();
            for token in tokenize(&segment.text) {
                if token.starts_with('<') {
                    flush_run(&mut out, wrapper, &mut run);
                    if segment.tag == DiffTag::Inserted {
                        out.push_str(token);
                    }
                } else {
                    run.push_str(token);
                }
            }
            flush_run(&mut out, wrapper, &mut run);
        }
        out
    }
}

fn flush_run(out: &mut String, wrapper: &str, run: &mut String) {
    if run.is_empty() {
        return;
    }
    out.push_str(&format!("<{}>{}</{}>", wrapper, run, wrapper));
    run.clear();
}

fn push_segment(segments: &mut Vec<DiffSegment>, tag: DiffTag, tokens: &[&str]) {
    if tokens.is_empty() {
        return;
    }
    let text = tokens.concat();
    match segments.last_mut() {
        Some(last) if last.tag == tag => last.text.push_str(&text),
        _ => segments.push(DiffSegment { tag, text }),
    }
}

/// Split rendered markup into tags, whitespace runs and words.
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(first) = rest.chars().next() {
        let end = if first == '<' {
            rest.find('>').map(|i| i + 1).unwrap_or(rest.len())
        } else if first.is_whitespace() {
            rest.find(|c: char| !c.is_whitespace())
                .unwrap_or(rest.len())
        } else {
            rest.find(|c: char| c == '<' || c.is_whitespace())
                .unwrap_or(rest.len())
        };
        let (token, tail) = rest.split_at(end);
        tokens.push(token);
        rest = tail;
    }
    tokens
}

/// Compares a frame against the previous observation of the top of the stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScopeDiffer;

impl ScopeDiffer {
    pub fn same_scope(current: &CapturedFrame, previous: &CapturedFrame) -> bool {
        current.name == previous.name && current.filename == previous.filename
    }

    /// Annotate every variable of `current`. Within the same frame identity a
    /// variable is compared with the previous variable of the same name; new
    /// names and foreign or missing frames compare against `undefined`.
    pub fn diff(&self, current: &CapturedFrame, previous: Option<&CapturedFrame>) -> RenderedScope {
        let baseline = previous.filter(|prev| Self::same_scope(current, prev));

        let entries = current
            .variables
            .iter()
            .map(|var| {
                let old = baseline
                    .and_then(|prev| prev.variables.iter().find(|p| p.name == var.name))
                    .map(|p| p.rendered.as_str())
                    .unwrap_or(UNDEFINED_BASELINE);
                ScopeEntry {
                    name: var.name.clone(),
                    value: var.value.clone(),
                    rendered: var.rendered.clone(),
                    diff: ValueDiff::between(old, &var.rendered),
                }
            })
            .collect();

        RenderedScope {
            name: current.name.clone(),
            filename: current.filename.clone(),
            entries,
        }
    }
}
