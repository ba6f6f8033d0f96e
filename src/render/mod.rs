//! Value rendering for the scope and console panes.
//!
//! `render` produces the table markup the scope template embeds; `summarize`
//! produces a one-line echo for console results. Both walk arbitrary object
//! graphs, so they carry the set of structures on the current path and a depth
//! counter, and emit a placeholder instead of recursing past either bound.

use crate::value::{format_number, Value};
use std::collections::HashSet;

pub const CIRCULAR_PLACEHOLDER: &str = "…circular…";
pub const DEPTH_PLACEHOLDER: &str = "…depth-limit…";
pub const DEFAULT_MAX_DEPTH: usize = 8;

#[derive(Debug, Clone, Copy)]
pub struct ValueRenderer {
    max_depth: usize,
}

impl Default for ValueRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

/// Path state threaded through one render call.
struct Walk {
    on_path: HashSet<usize>,
    max_depth: usize,
}

enum Enter {
    Circular,
    TooDeep,
    Ok,
}

impl Walk {
    fn new(max_depth: usize) -> Self {
        Self {
            on_path: HashSet::new(),
            max_depth,
        }
    }

    fn enter(&mut self, identity: usize, depth: usize) -> Enter {
        if self.on_path.contains(&identity) {
            Enter::Circular
        } else if depth >= self.max_depth {
            Enter::TooDeep
        } else {
            self.on_path.insert(identity);
            Enter::Ok
        }
    }

    fn leave(&mut self, identity: usize) {
        self.on_path.remove(&identity);
    }
}

impl ValueRenderer {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Render a value as a markup fragment. Total over all inputs.
    pub fn render(&self, value: &Value) -> String {
        let mut out = String::new();
        let mut walk = Walk::new(self.max_depth);
        render_into(value, 0, &mut walk, &mut out);
        out
    }

    /// One-line rendering used to echo console results.
    pub fn summarize(&self, value: &Value) -> String {
        let mut out = String::new();
        let mut walk = Walk::new(self.max_depth);
        summarize_into(value, 0, &mut walk, &mut out);
        out
    }
}

fn render_into(value: &Value, depth: usize, walk: &mut Walk, out: &mut String) {
    match value {
        Value::Undefined => out.push_str("undefined"),
        Value::Null => out.push_str("null"),
        Value::Function { .. } => out.push_str("function()"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&format_number(*n)),
        Value::String(s) => {
            out.push('"');
            out.push_str(&escape_markup(s));
            out.push('"');
        }
        Value::Other { display, .. } => out.push_str(&escape_markup(display)),
        Value::Array(arr) => {
            let id = arr.identity();
            match walk.enter(id, depth) {
                Enter::Circular => out.push_str(CIRCULAR_PLACEHOLDER),
                Enter::TooDeep => out.push_str(DEPTH_PLACEHOLDER),
                Enter::Ok => {
                    let items = arr.items();
                    out.push_str("<table class=\"array\"><tr>");
                    for index in 0..items.len() {
                        out.push_str(&format!("<th>{}</th>", index));
                    }
                    out.push_str("</tr><tr>");
                    for item in &items {
                        out.push_str("<td>");
                        render_into(item, depth + 1, walk, out);
                        out.push_str("</td>");
                    }
                    out.push_str("</tr></table>");
                    walk.leave(id);
                }
            }
        }
        Value::Object(obj) => {
            let id = obj.identity();
            match walk.enter(id, depth) {
                Enter::Circular => out.push_str(CIRCULAR_PLACEHOLDER),
                Enter::TooDeep => out.push_str(DEPTH_PLACEHOLDER),
                Enter::Ok => {
                    out.push_str("<table class=\"object\">");
                    for (key, prop) in obj.entries() {
                        out.push_str("<tr><td>");
                        out.push_str(&escape_markup(&key));
                        out.push_str("</td><td>");
                        render_into(&prop, depth + 1, walk, out);
                        out.push_str("</td></tr>");
                    }
                    out.push_str("</table>");
                    walk.leave(id);
                }
            }
        }
    }
}

fn summarize_into(value: &Value, depth: usize, walk: &mut Walk, out: &mut String) {
    match value {
        Value::String(s) => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
        Value::Other { display, .. } => out.push_str(display),
        Value::Array(arr) => {
            let id = arr.identity();
            match walk.enter(id, depth) {
                Enter::Circular => out.push_str(CIRCULAR_PLACEHOLDER),
                Enter::TooDeep => out.push_str(DEPTH_PLACEHOLDER),
                Enter::Ok => {
                    out.push('[');
                    for (i, item) in arr.items().iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        summarize_into(item, depth + 1, walk, out);
                    }
                    out.push(']');
                    walk.leave(id);
                }
            }
        }
        Value::Object(obj) => {
            let id = obj.identity();
            match walk.enter(id, depth) {
                Enter::Circular => out.push_str(CIRCULAR_PLACEHOLDER),
                Enter::TooDeep => out.push_str(DEPTH_PLACEHOLDER),
                Enter::Ok => {
                    let entries = obj.entries();
                    if entries.is_empty() {
                        out.push_str("{}");
                    } else {
                        out.push_str("{ ");
                        for (i, (key, prop)) in entries.iter().enumerate() {
                            if i > 0 {
                                out.push_str(", ");
                            }
                            out.push_str(key);
                            out.push_str(": ");
                            summarize_into(prop, depth + 1, walk, out);
                        }
                        out.push_str(" }");
                    }
                    walk.leave(id);
                }
            }
        }
        // scalars look the same in both forms
        scalar => render_into(scalar, depth, walk, out),
    }
}

/// Escape text for embedding in markup.
pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}
